//! # scriptflow - Call Script Page-Graph Resolver
//!
//! **scriptflow** models the multi-page call scripts used for lead capture and
//! decides, while a script is being run, which page comes next. Scripts are
//! authored in a visual builder as pages, form fields and branching rules;
//! this crate takes a frozen snapshot of that graph and answers the questions
//! a live call screen or public preview asks on every click:
//!
//! - may the operator move on from this page (`can_advance`)?
//! - which page follows, given the answers so far (`resolve_next_page`)?
//! - what does the page text read with `{{merge}}` variables filled in?
//! - how far through the script is the run (`progress`)?
//!
//! ## Core Workflow
//!
//! 1.  **Load a script**: parse the builder's JSON export with
//!     `ScriptSnapshot::from_builder_json`, load a compiled snapshot file, or
//!     implement `IntoScript` for your own storage format.
//! 2.  **Start a run**: `ScriptRun::start` places the run on the first visible page.
//! 3.  **Collect answers and navigate**: `set_answer`, then `next` / `previous`.
//!     Rules are evaluated most-specific first; without a matching rule the run
//!     continues in page order.
//! 4.  **Submit**: once the run completes, hand the `Submission` to a
//!     `SubmissionSink`. A failed or cancelled submit leaves the run intact for a retry.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use scriptflow::prelude::*;
//! use std::sync::Arc;
//!
//! # async fn example() -> std::result::Result<(), Box<dyn std::error::Error>> {
//! let json = std::fs::read_to_string("path/to/script.json")?;
//! let script = Arc::new(ScriptSnapshot::from_builder_json(&json)?);
//!
//! let operator = OperatorIdentity::default().with_first_name("Sam");
//! let mut run = ScriptRun::start(script)?;
//!
//! while run.state() == RunState::InProgress {
//!     if let Some(page) = run.current_page() {
//!         println!("{}", run.render(&page.title, Some(&operator)));
//!     }
//!     // ... collect answers with `run.set_answer(field_id, value)` ...
//!     run.next()?;
//! }
//!
//! let sink = MemorySink::new();
//! let cancel = CancellationToken::new();
//! run.submit(&sink, Some(&operator), Some("docs"), &cancel).await?;
//! # Ok(())
//! # }
//! ```

pub mod answer;
pub mod error;
pub mod identity;
pub mod prelude;
pub mod resolver;
pub mod run;
pub mod script;
pub mod submission;
pub mod ui;
