use super::definition::Page;
use super::rules::{Destination, RuleKey};
use super::snapshot::ScriptSnapshot;
use ahash::{AHashMap, AHashSet};
use std::collections::VecDeque;
use std::fmt;

/// A problem found in an authored script.
///
/// None of these stop a run: the resolver degrades dangling rules to the end
/// of the script. They exist so authors can fix the graph before publishing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// A rule points at a page id that does not exist.
    DanglingDestination { rule: RuleKey, target: String },
    /// A rule points at a page that exists but is hidden, so runs end there instead.
    HiddenDestination { rule: RuleKey, target: String },
    /// A rule starts from a page that does not exist.
    UnknownSource { rule: RuleKey },
    /// A choice rule names a field or choice the source page does not have.
    UnknownChoice { rule: RuleKey },
    /// A visible page no run can reach from the first visible page.
    UnreachablePage { page_id: String },
    /// Two fields on one page share an apiName.
    DuplicateApiName { page_id: String, api_name: String },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::DanglingDestination { rule, target } => {
                write!(f, "Rule '{}' points at missing page '{}'", rule, target)
            }
            Diagnostic::HiddenDestination { rule, target } => {
                write!(f, "Rule '{}' points at hidden page '{}'", rule, target)
            }
            Diagnostic::UnknownSource { rule } => {
                write!(f, "Rule '{}' starts from a page that does not exist", rule)
            }
            Diagnostic::UnknownChoice { rule } => {
                write!(f, "Rule '{}' refers to a field or choice that does not exist", rule)
            }
            Diagnostic::UnreachablePage { page_id } => {
                write!(f, "Page '{}' cannot be reached from the first page", page_id)
            }
            Diagnostic::DuplicateApiName { page_id, api_name } => {
                write!(f, "apiName '{}' is used twice on page '{}'", api_name, page_id)
            }
        }
    }
}

/// Checks a script's page graph and returns every problem found.
pub fn validate(script: &ScriptSnapshot) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();
    let pages: AHashMap<&str, &Page> = script.pages().iter().map(|p| (p.id.as_str(), p)).collect();

    for page in script.pages() {
        let mut seen = AHashSet::new();
        for field in &page.fields {
            if !seen.insert(field.api_name.as_str()) {
                diagnostics.push(Diagnostic::DuplicateApiName {
                    page_id: page.id.clone(),
                    api_name: field.api_name.clone(),
                });
            }
        }
    }

    for rule in script.rules().iter() {
        let Some(source) = pages.get(rule.key.source()) else {
            diagnostics.push(Diagnostic::UnknownSource {
                rule: rule.key.clone(),
            });
            continue;
        };

        let choice_known = match &rule.key {
            RuleKey::FieldChoice {
                field_id,
                choice_id,
                ..
            } => source
                .field(field_id)
                .is_some_and(|f| f.has_choice(choice_id)),
            RuleKey::PageChoice { choice_id, .. } => source.choices.iter().any(|c| &c.id == choice_id),
            RuleKey::Page { .. } => true,
        };
        if !choice_known {
            diagnostics.push(Diagnostic::UnknownChoice {
                rule: rule.key.clone(),
            });
        }

        if let Destination::Page(target) = &rule.destination {
            match pages.get(target.as_str()) {
                None => diagnostics.push(Diagnostic::DanglingDestination {
                    rule: rule.key.clone(),
                    target: target.clone(),
                }),
                Some(page) if !page.visible => diagnostics.push(Diagnostic::HiddenDestination {
                    rule: rule.key.clone(),
                    target: target.clone(),
                }),
                Some(_) => {}
            }
        }
    }

    let reachable = reachable_pages(script);
    for page in script.pages().iter().filter(|p| p.visible) {
        if !reachable.contains(page.id.as_str()) {
            diagnostics.push(Diagnostic::UnreachablePage {
                page_id: page.id.clone(),
            });
        }
    }

    diagnostics
}

/// Breadth-first walk over every edge a run could take: all rule
/// destinations plus the sequential fallback.
fn reachable_pages(script: &ScriptSnapshot) -> AHashSet<&str> {
    let visible = script.visible_pages();
    let position: AHashMap<&str, usize> = visible
        .iter()
        .enumerate()
        .map(|(i, p)| (p.id.as_str(), i))
        .collect();

    let mut reached = AHashSet::new();
    let mut queue = VecDeque::new();
    if let Some(first) = visible.first() {
        reached.insert(first.id.as_str());
        queue.push_back(first.id.as_str());
    }

    while let Some(page_id) = queue.pop_front() {
        let rules = script.rules().rules_for(page_id);
        let mut next: Vec<&str> = rules
            .iter()
            .filter_map(|r| r.destination.page_id())
            .filter(|id| position.contains_key(id))
            .collect();

        // Without a page-level rule the run can still fall through to the next page.
        if script.rules().page_default(page_id).is_none() {
            if let Some(following) = position.get(page_id).and_then(|i| visible.get(i + 1)) {
                next.push(following.id.as_str());
            }
        }

        for id in next {
            if reached.insert(id) {
                queue.push_back(id);
            }
        }
    }

    reached
}
