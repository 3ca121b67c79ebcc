use crate::script::{Destination, RuleKey};
use std::fmt;

/// Why the resolver picked the page it did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolutionReason {
    /// A rule matched and its destination is a page of the run, or the end.
    Rule {
        key: RuleKey,
        destination: Destination,
    },
    /// A rule matched but its destination is missing or hidden; the run ends.
    DanglingReference { key: RuleKey, target: String },
    /// No rule matched; the next page in visible order follows.
    Sequential,
    /// No rule matched and the current page is the last visible one.
    LastPage,
    /// The current page is not part of the visible sequence.
    UnknownPage,
}

/// The outcome of resolving the next page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// The page to show next. `None` means the run is complete.
    pub next: Option<String>,
    pub reason: ResolutionReason,
}

impl Resolution {
    pub fn is_end(&self) -> bool {
        self.next.is_none()
    }
}

impl fmt::Display for ResolutionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolutionReason::Rule { key, destination } => {
                let kind = match key {
                    RuleKey::FieldChoice { .. } => "field choice rule",
                    RuleKey::PageChoice { .. } => "page choice rule",
                    RuleKey::Page { .. } => "page rule",
                };
                write!(f, "{} {} -> {}", kind, key, destination)
            }
            ResolutionReason::DanglingReference { key, target } => {
                write!(f, "rule {} points at unavailable page '{}', ending script", key, target)
            }
            ResolutionReason::Sequential => write!(f, "no rule matched, continuing in page order"),
            ResolutionReason::LastPage => write!(f, "no rule matched on the last page"),
            ResolutionReason::UnknownPage => write!(f, "current page is not in the visible sequence"),
        }
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.next {
            Some(page_id) => write!(f, "-> '{}' ({})", page_id, self.reason),
            None => write!(f, "-> end ({})", self.reason),
        }
    }
}
