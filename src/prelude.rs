//! Prelude module for convenient imports
//!
//! This module re-exports the most commonly used types and functions from the
//! scriptflow crate, so callers can pull in the resolver, the script model and
//! the run state machine with a single `use`.
//!
//! # Example
//!
//! ```rust,no_run
//! use scriptflow::prelude::*;
//!
//! # fn run_example() -> Result<()> {
//! let script = ScriptSnapshot::from_file("path/to/script.script")?;
//! let resolver = Resolver::new(&script);
//!
//! let mut answers = Answers::new();
//! answers.insert("f1".to_string(), AnswerValue::from("c1"));
//!
//! let resolution = resolver.resolve("p1", &answers);
//! println!("Next: {:?} because {}", resolution.next, resolution.reason);
//! # Ok(())
//! # }
//! ```

// Resolver
pub use crate::resolver::{
    OperatorToken, Progress, Resolution, ResolutionReason, Resolver, available_variables,
    can_advance, process_merge_variables, progress, resolve, resolve_next_page,
    unmet_required_fields,
};

// Script model
pub use crate::script::{
    Choice, Destination, Diagnostic, END_SENTINEL, Field, FieldType, FileStore, IntoScript,
    MemoryStore, Page, PageType, Rule, RuleKey, RuleSet, ScriptEditor, ScriptSnapshot,
    ScriptStore, validate,
};
pub use crate::ui::UiScript;

// Runs and answers
pub use crate::answer::{AnswerValue, Answers};
pub use crate::identity::OperatorIdentity;
pub use crate::run::{RunState, ScriptRun, Transition};
pub use crate::submission::{
    JsonLinesSink, MemorySink, Submission, SubmissionSink, SubmitOutcome, submit_with_cancel,
};
pub use tokio_util::sync::CancellationToken;

// Error types
pub use crate::error::{
    ResolveError, RunError, ScriptConversionError, ScriptError, SnapshotError, StoreError,
    SubmitError,
};

// Result type alias for convenience
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;
