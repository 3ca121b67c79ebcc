use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Values entered so far in a run, keyed by field id.
pub type Answers = AHashMap<String, AnswerValue>;

/// A single answer recorded against a field.
///
/// Builder exports and answer files carry loosely typed JSON, so this
/// deserializes untagged: `true` stays a `Bool`, `1` a `Number`, `"true"` a `Text`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnswerValue {
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
    List(Vec<String>),
}

impl AnswerValue {
    /// Returns the selected choice id when the answer is a single text value.
    pub fn as_choice_id(&self) -> Option<&str> {
        match self {
            AnswerValue::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// True only for the boolean `true`.
    pub fn is_true(&self) -> bool {
        matches!(self, AnswerValue::Bool(true))
    }

    /// True when the stringified value has content after trimming.
    pub fn has_text(&self) -> bool {
        !self.to_string().trim().is_empty()
    }
}

impl From<&str> for AnswerValue {
    fn from(value: &str) -> Self {
        AnswerValue::Text(value.to_string())
    }
}

impl From<String> for AnswerValue {
    fn from(value: String) -> Self {
        AnswerValue::Text(value)
    }
}

impl From<bool> for AnswerValue {
    fn from(value: bool) -> Self {
        AnswerValue::Bool(value)
    }
}

impl From<f64> for AnswerValue {
    fn from(value: f64) -> Self {
        AnswerValue::Number(value)
    }
}

impl fmt::Display for AnswerValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnswerValue::Null => Ok(()),
            AnswerValue::Bool(b) => write!(f, "{}", b),
            AnswerValue::Number(n) => {
                // Large magnitudes would saturate the i64 cast.
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    write!(f, "{}", *n as i64)
                } else {
                    write!(f, "{}", n)
                }
            }
            AnswerValue::Text(s) => write!(f, "{}", s),
            AnswerValue::List(items) => write!(f, "{}", items.join(", ")),
        }
    }
}
