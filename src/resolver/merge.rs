//! Merge-variable substitution for page text.
//!
//! Tokens look like `{{identifier}}`. Each is resolved once, against the
//! operator first and the run's answers second. Anything that does not
//! resolve stays in the text verbatim so script authors can spot it.

use crate::answer::{AnswerValue, Answers};
use crate::identity::OperatorIdentity;
use crate::script::{FieldType, Page};
use ahash::AHashMap;
use itertools::Itertools;
use regex::{Captures, Regex};
use std::sync::LazyLock;

static TOKEN_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{\s*([^{}]+?)\s*\}\}").expect("Valid merge token regex"));

/// Operator attributes a token can refer to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperatorToken {
    FirstName,
    LastName,
    FullName,
    Email,
    Username,
}

impl OperatorToken {
    /// Identifiers offered to authors in the variable picker.
    pub const BUILTIN: [&'static str; 5] = [
        "user.firstName",
        "user.lastName",
        "user.email",
        "user.username",
        "agentName",
    ];

    pub fn from_identifier(identifier: &str) -> Option<Self> {
        match identifier {
            "user.firstName" | "agent.firstName" | "agentFirstName" => Some(OperatorToken::FirstName),
            "user.lastName" | "agent.lastName" | "agentLastName" => Some(OperatorToken::LastName),
            "user.name" | "user.fullName" | "agent.name" | "agentName" => Some(OperatorToken::FullName),
            "user.email" | "agent.email" | "agentEmail" => Some(OperatorToken::Email),
            "user.username" | "agent.username" => Some(OperatorToken::Username),
            _ => None,
        }
    }

    pub fn resolve(self, identity: &OperatorIdentity) -> Option<String> {
        let value = match self {
            OperatorToken::FirstName => identity.first_name.clone(),
            OperatorToken::LastName => identity.last_name.clone(),
            OperatorToken::FullName => identity.full_name(),
            OperatorToken::Email => identity.email.clone(),
            OperatorToken::Username => identity.username.clone(),
        };
        value.filter(|v| !v.trim().is_empty())
    }
}

/// Replaces `{{identifier}}` tokens in `text`.
///
/// Resolution order per token:
/// 1. operator attributes such as `user.firstName` or `agentName`, when an identity is given;
/// 2. an answer keyed by the identifier as a field id;
/// 3. the first field anywhere in `pages` whose label, apiName or id equals the
///    identifier, looked up in `answers` by that field's id.
///
/// Unresolved tokens are left untouched. Substituted values are not scanned
/// again.
pub fn process_merge_variables(
    text: &str,
    answers: &Answers,
    pages: &[Page],
    identity: Option<&OperatorIdentity>,
) -> String {
    substitute(text, answers, pages, identity, &AHashMap::new())
}

pub(crate) fn substitute(
    text: &str,
    answers: &Answers,
    pages: &[Page],
    identity: Option<&OperatorIdentity>,
    aliases: &AHashMap<String, OperatorToken>,
) -> String {
    TOKEN_PATTERN
        .replace_all(text, |caps: &Captures| {
            resolve_token(&caps[1], answers, pages, identity, aliases)
                .unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

fn resolve_token(
    identifier: &str,
    answers: &Answers,
    pages: &[Page],
    identity: Option<&OperatorIdentity>,
    aliases: &AHashMap<String, OperatorToken>,
) -> Option<String> {
    let operator_token = aliases
        .get(identifier)
        .copied()
        .or_else(|| OperatorToken::from_identifier(identifier));
    if let Some(value) = operator_token
        .zip(identity)
        .and_then(|(token, identity)| token.resolve(identity))
    {
        return Some(value);
    }

    if let Some(value) = answered(answers, identifier) {
        return Some(value);
    }

    pages
        .iter()
        .flat_map(|p| p.fields.iter())
        .find(|f| f.label == identifier || f.api_name == identifier || f.id == identifier)
        .and_then(|f| answered(answers, &f.id))
}

fn answered(answers: &Answers, field_id: &str) -> Option<String> {
    match answers.get(field_id)? {
        AnswerValue::Null => None,
        value => Some(value.to_string()),
    }
}

/// Tokens an author can insert into page text: the operator built-ins
/// followed by the apiName of every answerable field, in page order.
pub fn available_variables(pages: &[Page]) -> Vec<String> {
    OperatorToken::BUILTIN
        .iter()
        .map(|s| s.to_string())
        .chain(
            pages
                .iter()
                .flat_map(|p| p.fields.iter())
                .filter(|f| f.field_type != FieldType::Content)
                .map(|f| f.api_name.clone()),
        )
        .unique()
        .collect()
}
