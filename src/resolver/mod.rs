use crate::answer::{AnswerValue, Answers};
use crate::identity::OperatorIdentity;
use crate::script::{Destination, Field, FieldType, Page, RuleKey, RuleSet, ScriptSnapshot};
use ahash::AHashMap;

pub mod merge;
mod resolution;

pub use merge::{OperatorToken, available_variables, process_merge_variables};
pub use resolution::{Resolution, ResolutionReason};

/// How far a run has come through the visible pages.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Progress {
    pub step: usize,
    pub total: usize,
    /// `step / total * 100`, clamped to `0..=100`.
    pub percent: f64,
}

/// Computes progress from the pages visited so far.
pub fn progress(history: &[String], total_visible_pages: usize) -> Progress {
    let step = history.len();
    let percent = if total_visible_pages == 0 {
        0.0
    } else {
        (step as f64 / total_visible_pages as f64 * 100.0).clamp(0.0, 100.0)
    };
    Progress {
        step,
        total: total_visible_pages,
        percent,
    }
}

/// Whether a field's answer counts as filled in.
///
/// Checkboxes need the boolean `true`; everything else needs non-blank text.
pub fn is_answered(field: &Field, answers: &Answers) -> bool {
    match answers.get(&field.id) {
        None => false,
        Some(value) if field.field_type == FieldType::Checkbox => value.is_true(),
        Some(value) => value.has_text(),
    }
}

/// Required fields on `page` that still block progress, in declaration order.
pub fn unmet_required_fields<'p>(page: &'p Page, answers: &Answers) -> Vec<&'p Field> {
    page.active_fields()
        .iter()
        .filter(|f| f.required && !is_answered(f, answers))
        .collect()
}

/// True when every required field on the page is answered. Pages without
/// fields can always advance.
pub fn can_advance(page: &Page, answers: &Answers) -> bool {
    unmet_required_fields(page, answers).is_empty()
}

/// Determines the page that follows `current_page_id`, with the reason.
///
/// Hidden pages are removed from `pages` before anything else, so rules and
/// the sequential fallback only ever land on visible pages. Rules are tried
/// from most to least specific and the first match wins:
///
/// 1. a choice rule for the selected choice of each radio or multiple-choice
///    field, in field declaration order;
/// 2. a choice rule on the page's own flat choice list, for any answer equal
///    to one of those choices;
/// 3. the page's default rule;
/// 4. the next visible page.
///
/// The function never fails. An unknown current page, a rule to `"end"` or a
/// rule to a page that is missing or hidden all resolve to `None`.
pub fn resolve(
    current_page_id: &str,
    pages: &[Page],
    rules: &RuleSet,
    answers: &Answers,
) -> Resolution {
    let visible: Vec<&Page> = pages.iter().filter(|p| p.visible).collect();

    let Some(position) = visible.iter().position(|p| p.id == current_page_id) else {
        tracing::warn!(page_id = current_page_id, "Resolving from a page outside the visible sequence");
        return Resolution {
            next: None,
            reason: ResolutionReason::UnknownPage,
        };
    };
    let page = visible[position];

    if let Some((key, destination)) = match_rule(page, rules, answers) {
        return settle(key, destination, &visible);
    }

    match visible.get(position + 1) {
        Some(following) => Resolution {
            next: Some(following.id.clone()),
            reason: ResolutionReason::Sequential,
        },
        None => Resolution {
            next: None,
            reason: ResolutionReason::LastPage,
        },
    }
}

/// The id of the page after `current_page_id`, or `None` when the run ends.
pub fn resolve_next_page(
    current_page_id: &str,
    pages: &[Page],
    rules: &RuleSet,
    answers: &Answers,
) -> Option<String> {
    resolve(current_page_id, pages, rules, answers).next
}

fn match_rule<'r>(
    page: &Page,
    rules: &'r RuleSet,
    answers: &Answers,
) -> Option<(RuleKey, &'r Destination)> {
    // The first answered field with a matching rule wins, even if a later
    // field on the same page also has one.
    for field in page
        .active_fields()
        .iter()
        .filter(|f| f.field_type.branches_on_choice())
    {
        let Some(choice_id) = answers.get(&field.id).and_then(AnswerValue::as_choice_id) else {
            continue;
        };
        if let Some(destination) = rules.field_choice(&page.id, &field.id, choice_id) {
            return Some((RuleKey::field_choice(&page.id, &field.id, choice_id), destination));
        }
    }

    for choice in &page.choices {
        let selected = answers
            .values()
            .any(|v| v.as_choice_id() == Some(choice.id.as_str()));
        if !selected {
            continue;
        }
        if let Some(destination) = rules.page_choice(&page.id, &choice.id) {
            return Some((RuleKey::page_choice(&page.id, &choice.id), destination));
        }
    }

    rules
        .page_default(&page.id)
        .map(|destination| (RuleKey::page(&page.id), destination))
}

fn settle(key: RuleKey, destination: &Destination, visible: &[&Page]) -> Resolution {
    match destination {
        Destination::End => {
            tracing::debug!(rule = %key, "Rule ends the script");
            Resolution {
                next: None,
                reason: ResolutionReason::Rule {
                    key,
                    destination: Destination::End,
                },
            }
        }
        Destination::Page(target) if visible.iter().any(|p| &p.id == target) => {
            tracing::debug!(rule = %key, target = %target, "Rule matched");
            Resolution {
                next: Some(target.clone()),
                reason: ResolutionReason::Rule {
                    key,
                    destination: destination.clone(),
                },
            }
        }
        Destination::Page(target) => {
            tracing::warn!(rule = %key, target = %target, "Rule points at an unavailable page, ending script");
            Resolution {
                next: None,
                reason: ResolutionReason::DanglingReference {
                    key,
                    target: target.clone(),
                },
            }
        }
    }
}

/// The resolver for one script snapshot, shared by every place that runs or
/// previews a script.
pub struct Resolver<'a> {
    script: &'a ScriptSnapshot,
    aliases: AHashMap<String, OperatorToken>,
}

pub struct ResolverBuilder<'a> {
    script: &'a ScriptSnapshot,
    aliases: AHashMap<String, OperatorToken>,
}

impl<'a> ResolverBuilder<'a> {
    pub fn new(script: &'a ScriptSnapshot) -> Self {
        Self {
            script,
            aliases: AHashMap::new(),
        }
    }

    /// Makes `{{identifier}}` resolve to an operator attribute, on top of the
    /// built-in `user.*` and `agent*` identifiers.
    pub fn with_operator_alias(mut self, identifier: &str, token: OperatorToken) -> Self {
        self.aliases.insert(identifier.to_string(), token);
        self
    }

    pub fn build(self) -> Resolver<'a> {
        Resolver {
            script: self.script,
            aliases: self.aliases,
        }
    }
}

impl<'a> Resolver<'a> {
    pub fn new(script: &'a ScriptSnapshot) -> Self {
        ResolverBuilder::new(script).build()
    }

    pub fn builder(script: &'a ScriptSnapshot) -> ResolverBuilder<'a> {
        ResolverBuilder::new(script)
    }

    pub fn script(&self) -> &'a ScriptSnapshot {
        self.script
    }

    pub fn can_advance(&self, page: &Page, answers: &Answers) -> bool {
        can_advance(page, answers)
    }

    pub fn resolve(&self, current_page_id: &str, answers: &Answers) -> Resolution {
        resolve(current_page_id, self.script.pages(), self.script.rules(), answers)
    }

    pub fn next_page(&self, current_page_id: &str, answers: &Answers) -> Option<String> {
        self.resolve(current_page_id, answers).next
    }

    pub fn progress(&self, history: &[String]) -> Progress {
        progress(history, self.script.visible_pages().len())
    }

    /// Substitutes merge variables in `text` using this script's fields.
    pub fn render(
        &self,
        text: &str,
        answers: &Answers,
        identity: Option<&OperatorIdentity>,
    ) -> String {
        merge::substitute(text, answers, self.script.pages(), identity, &self.aliases)
    }
}
