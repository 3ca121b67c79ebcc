use super::definition::Page;
use ahash::AHashMap;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Reserved destination meaning "terminate the script normally".
pub const END_SENTINEL: &str = "end";

/// Where a rule sends the run.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Destination {
    Page(String),
    End,
}

impl Destination {
    /// Parses a stored destination, normalizing the `"end"` sentinel.
    pub fn parse(raw: &str) -> Self {
        if raw == END_SENTINEL {
            Destination::End
        } else {
            Destination::Page(raw.to_string())
        }
    }

    pub fn page_id(&self) -> Option<&str> {
        match self {
            Destination::Page(id) => Some(id),
            Destination::End => None,
        }
    }

    pub fn as_stored(&self) -> &str {
        match self {
            Destination::Page(id) => id,
            Destination::End => END_SENTINEL,
        }
    }
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Destination::Page(id) => write!(f, "page '{}'", id),
            Destination::End => write!(f, "end of script"),
        }
    }
}

/// What a rule is attached to, ordered from most to least specific.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RuleKey {
    /// A specific choice of a choice field on the source page.
    FieldChoice {
        source: String,
        field_id: String,
        choice_id: String,
    },
    /// A choice of the page's own flat `choices` list (older single-question pages).
    PageChoice { source: String, choice_id: String },
    /// The page's default exit.
    Page { source: String },
}

impl RuleKey {
    pub fn page(source: impl Into<String>) -> Self {
        RuleKey::Page {
            source: source.into(),
        }
    }

    pub fn field_choice(
        source: impl Into<String>,
        field_id: impl Into<String>,
        choice_id: impl Into<String>,
    ) -> Self {
        RuleKey::FieldChoice {
            source: source.into(),
            field_id: field_id.into(),
            choice_id: choice_id.into(),
        }
    }

    pub fn page_choice(source: impl Into<String>, choice_id: impl Into<String>) -> Self {
        RuleKey::PageChoice {
            source: source.into(),
            choice_id: choice_id.into(),
        }
    }

    pub fn source(&self) -> &str {
        match self {
            RuleKey::FieldChoice { source, .. }
            | RuleKey::PageChoice { source, .. }
            | RuleKey::Page { source } => source,
        }
    }

    /// The flat string key older builder exports use for this rule.
    pub fn to_legacy_key(&self) -> String {
        match self {
            RuleKey::FieldChoice {
                source,
                field_id,
                choice_id,
            } => format!("{}-{}-{}", source, field_id, choice_id),
            RuleKey::PageChoice { source, choice_id } => format!("{}-{}", source, choice_id),
            RuleKey::Page { source } => source.clone(),
        }
    }
}

impl fmt::Display for RuleKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleKey::FieldChoice {
                source,
                field_id,
                choice_id,
            } => write!(f, "{}[{}={}]", source, field_id, choice_id),
            RuleKey::PageChoice { source, choice_id } => write!(f, "{}[{}]", source, choice_id),
            RuleKey::Page { source } => write!(f, "{}", source),
        }
    }
}

/// A directed edge of the page graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    pub key: RuleKey,
    pub destination: Destination,
}

/// All rules of a script, grouped by source page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RuleSet {
    by_source: AHashMap<String, Vec<Rule>>,
}

impl RuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a rule, replacing any rule with the same key. Returns the replaced destination.
    pub fn insert(&mut self, key: RuleKey, destination: Destination) -> Option<Destination> {
        let rules = self.by_source.entry(key.source().to_string()).or_default();
        if let Some(existing) = rules.iter_mut().find(|r| r.key == key) {
            return Some(std::mem::replace(&mut existing.destination, destination));
        }
        rules.push(Rule { key, destination });
        None
    }

    pub fn with_rule(mut self, key: RuleKey, destination: Destination) -> Self {
        self.insert(key, destination);
        self
    }

    pub fn remove(&mut self, key: &RuleKey) -> Option<Destination> {
        let rules = self.by_source.get_mut(key.source())?;
        let index = rules.iter().position(|r| &r.key == key)?;
        let removed = rules.remove(index);
        if rules.is_empty() {
            self.by_source.remove(key.source());
        }
        Some(removed.destination)
    }

    /// Keeps only the rules for which `keep` returns true.
    pub fn retain(&mut self, mut keep: impl FnMut(&Rule) -> bool) {
        for rules in self.by_source.values_mut() {
            rules.retain(&mut keep);
        }
        self.by_source.retain(|_, rules| !rules.is_empty());
    }

    pub fn rules_for(&self, source: &str) -> &[Rule] {
        self.by_source
            .get(source)
            .map(|rules| rules.as_slice())
            .unwrap_or_default()
    }

    pub fn get(&self, key: &RuleKey) -> Option<&Destination> {
        self.rules_for(key.source())
            .iter()
            .find(|r| &r.key == key)
            .map(|r| &r.destination)
    }

    pub fn field_choice(&self, source: &str, field_id: &str, choice_id: &str) -> Option<&Destination> {
        self.rules_for(source).iter().find_map(|r| match &r.key {
            RuleKey::FieldChoice {
                field_id: f,
                choice_id: c,
                ..
            } if f == field_id && c == choice_id => Some(&r.destination),
            _ => None,
        })
    }

    pub fn page_choice(&self, source: &str, choice_id: &str) -> Option<&Destination> {
        self.rules_for(source).iter().find_map(|r| match &r.key {
            RuleKey::PageChoice { choice_id: c, .. } if c == choice_id => Some(&r.destination),
            _ => None,
        })
    }

    pub fn page_default(&self, source: &str) -> Option<&Destination> {
        self.rules_for(source).iter().find_map(|r| match &r.key {
            RuleKey::Page { .. } => Some(&r.destination),
            _ => None,
        })
    }

    /// All rules, ordered by source page id for stable output.
    pub fn iter(&self) -> impl Iterator<Item = &Rule> {
        self.by_source
            .iter()
            .sorted_by(|a, b| a.0.cmp(b.0))
            .flat_map(|(_, rules)| rules.iter())
    }

    pub fn len(&self) -> usize {
        self.by_source.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.by_source.is_empty()
    }

    /// Imports the flat `key -> destination` mapping used by builder exports.
    ///
    /// Keys are matched against the known page, field and choice ids instead
    /// of being split on `-`, since ids may contain dashes themselves. Keys that
    /// match no page are returned in the second slot and left out of the set.
    pub fn from_legacy_keys<'k>(
        entries: impl IntoIterator<Item = (&'k str, &'k str)>,
        pages: &[Page],
    ) -> (Self, Vec<String>) {
        let mut rules = RuleSet::new();
        let mut skipped = Vec::new();

        for (raw_key, raw_destination) in entries.into_iter().sorted() {
            match parse_legacy_key(raw_key, pages) {
                Some(key) => {
                    rules.insert(key, Destination::parse(raw_destination));
                }
                None => {
                    tracing::warn!(key = raw_key, "Skipping rule key that matches no page");
                    skipped.push(raw_key.to_string());
                }
            }
        }

        (rules, skipped)
    }

    /// Exports the set back into the flat builder mapping.
    pub fn to_legacy_keys(&self) -> BTreeMap<String, String> {
        self.iter()
            .map(|r| (r.key.to_legacy_key(), r.destination.as_stored().to_string()))
            .collect()
    }
}

fn parse_legacy_key(key: &str, pages: &[Page]) -> Option<RuleKey> {
    if pages.iter().any(|p| p.id == key) {
        return Some(RuleKey::page(key));
    }

    // Longest page id first so "intro-2" wins over "intro" for "intro-2-c1".
    let candidates = pages
        .iter()
        .filter(|p| key.len() > p.id.len() + 1 && key.starts_with(&p.id) && key[p.id.len()..].starts_with('-'))
        .sorted_by(|a, b| b.id.len().cmp(&a.id.len()));

    for page in candidates {
        let rest = &key[page.id.len() + 1..];

        let field_split = |require_known_choice: bool| {
            page.fields.iter().find_map(|field| {
                let choice = rest.strip_prefix(field.id.as_str())?.strip_prefix('-')?;
                if choice.is_empty() || (require_known_choice && !field.has_choice(choice)) {
                    return None;
                }
                Some(RuleKey::field_choice(&page.id, &field.id, choice))
            })
        };

        if let Some(rule_key) = field_split(true) {
            return Some(rule_key);
        }
        if page.choices.iter().any(|c| c.id == rest) {
            return Some(RuleKey::page_choice(&page.id, rest));
        }
        if let Some(rule_key) = field_split(false) {
            return Some(rule_key);
        }

        // Ids we cannot match are kept positionally so validation can report them.
        return Some(match rest.split_once('-') {
            Some((field_id, choice_id)) if !field_id.is_empty() && !choice_id.is_empty() => {
                RuleKey::field_choice(&page.id, field_id, choice_id)
            }
            _ => RuleKey::page_choice(&page.id, rest),
        });
    }

    None
}
