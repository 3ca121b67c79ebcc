use crate::answer::{AnswerValue, Answers};
use crate::error::{ResolveError, RunError, SubmitError};
use crate::identity::OperatorIdentity;
use crate::resolver::{self, Progress, Resolution, Resolver};
use crate::script::{Page, ScriptSnapshot};
use crate::submission::{Submission, SubmissionSink, submit_with_cancel};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Where a run stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    InProgress,
    /// Resolution reached the end. Terminal.
    Completed,
    /// Abandoned by the operator. Terminal; the script itself is untouched.
    Aborted,
}

/// Result of a successful Next.
#[derive(Debug, Clone, PartialEq)]
pub enum Transition {
    Advanced { page_id: String, resolution: Resolution },
    Completed { resolution: Resolution },
}

/// One traversal of a script by an operator or public visitor.
///
/// The run owns its answers and page history; the script snapshot is shared
/// and never modified.
#[derive(Debug, Clone)]
pub struct ScriptRun {
    script: Arc<ScriptSnapshot>,
    history: Vec<String>,
    answers: Answers,
    state: RunState,
    submitted_at: Option<DateTime<Utc>>,
}

impl ScriptRun {
    /// Starts at the first visible page.
    pub fn start(script: Arc<ScriptSnapshot>) -> Result<Self, ResolveError> {
        let first = script
            .first_visible_page()
            .ok_or(ResolveError::NoVisiblePages)?
            .id
            .clone();
        Ok(Self::begin(script, first))
    }

    /// Starts at a specific page, which must be a visible page of the script.
    pub fn start_at(script: Arc<ScriptSnapshot>, page_id: &str) -> Result<Self, ResolveError> {
        match script.page(page_id) {
            None => Err(ResolveError::UnknownStartPage(page_id.to_string())),
            Some(page) if !page.visible => Err(ResolveError::HiddenStartPage(page_id.to_string())),
            Some(_) => Ok(Self::begin(script, page_id.to_string())),
        }
    }

    fn begin(script: Arc<ScriptSnapshot>, first_page_id: String) -> Self {
        tracing::info!(script_id = script.id(), page_id = %first_page_id, "Run started");
        Self {
            script,
            history: vec![first_page_id],
            answers: Answers::new(),
            state: RunState::InProgress,
            submitted_at: None,
        }
    }

    pub fn script(&self) -> &ScriptSnapshot {
        &self.script
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    /// Page ids visited so far, the current page last.
    pub fn history(&self) -> &[String] {
        &self.history
    }

    /// How many times `page_id` appears in the history. Rule graphs may
    /// contain cycles, so drivers without a human use this to stop a run
    /// that keeps revisiting the same page.
    pub fn visit_count(&self, page_id: &str) -> usize {
        self.history.iter().filter(|id| *id == page_id).count()
    }

    pub fn answers(&self) -> &Answers {
        &self.answers
    }

    pub fn submitted_at(&self) -> Option<DateTime<Utc>> {
        self.submitted_at
    }

    /// The page on screen while the run is in progress.
    pub fn current_page(&self) -> Option<&Page> {
        if self.state != RunState::InProgress {
            return None;
        }
        self.history.last().and_then(|id| self.script.page(id))
    }

    pub fn set_answer(
        &mut self,
        field_id: impl Into<String>,
        value: impl Into<AnswerValue>,
    ) -> Result<(), RunError> {
        self.ensure_in_progress()?;
        self.answers.insert(field_id.into(), value.into());
        Ok(())
    }

    pub fn clear_answer(&mut self, field_id: &str) -> Result<Option<AnswerValue>, RunError> {
        self.ensure_in_progress()?;
        Ok(self.answers.remove(field_id))
    }

    pub fn can_advance(&self) -> bool {
        self.current_page()
            .is_some_and(|page| resolver::can_advance(page, &self.answers))
    }

    /// Ids of required fields on the current page that are still empty.
    pub fn unmet_required_fields(&self) -> Vec<String> {
        self.current_page()
            .map(|page| {
                resolver::unmet_required_fields(page, &self.answers)
                    .into_iter()
                    .map(|f| f.id.clone())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Moves to the next page, or completes the run when resolution ends.
    pub fn next(&mut self) -> Result<Transition, RunError> {
        self.ensure_in_progress()?;
        let current = self.current_id().to_string();

        let unmet = self.unmet_required_fields();
        if !unmet.is_empty() {
            return Err(RunError::RequiredFieldsMissing {
                page_id: current,
                field_ids: unmet,
            });
        }

        let resolution = Resolver::new(&self.script).resolve(&current, &self.answers);
        tracing::debug!(from = %current, outcome = %resolution, "Resolved next page");

        match resolution.next.clone() {
            Some(page_id) => {
                self.history.push(page_id.clone());
                Ok(Transition::Advanced {
                    page_id,
                    resolution,
                })
            }
            None => {
                self.state = RunState::Completed;
                tracing::info!(script_id = self.script.id(), pages = self.history.len(), "Run completed");
                Ok(Transition::Completed { resolution })
            }
        }
    }

    /// Goes back one page by replaying history. Rules are not re-evaluated.
    /// Returns the id of the page now shown.
    pub fn previous(&mut self) -> Result<String, RunError> {
        self.ensure_in_progress()?;
        if self.history.len() <= 1 {
            return Err(RunError::AtFirstPage);
        }
        self.history.pop();
        Ok(self.current_id().to_string())
    }

    /// Abandons the run. Answers are dropped with the run; nothing is submitted.
    pub fn abort(&mut self) -> Result<(), RunError> {
        self.ensure_in_progress()?;
        self.state = RunState::Aborted;
        tracing::info!(script_id = self.script.id(), "Run aborted");
        Ok(())
    }

    pub fn progress(&self) -> Progress {
        Resolver::new(&self.script).progress(&self.history)
    }

    /// Renders page text with merge variables filled from this run's answers.
    pub fn render(&self, text: &str, identity: Option<&OperatorIdentity>) -> String {
        Resolver::new(&self.script).render(text, &self.answers, identity)
    }

    /// Builds the submission record for a completed run.
    pub fn submission(
        &self,
        identity: Option<&OperatorIdentity>,
        user_agent: Option<&str>,
    ) -> Result<Submission, RunError> {
        match self.state {
            RunState::Completed => {}
            RunState::Aborted => return Err(RunError::Aborted),
            RunState::InProgress => return Err(RunError::NotCompleted),
        }
        Ok(Submission {
            script_id: self.script.id().to_string(),
            script_name: self.script.name().to_string(),
            data: self
                .answers
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
            submitted_at: Utc::now(),
            user_agent: user_agent.map(str::to_string),
            operator: identity.cloned(),
        })
    }

    /// Submits a completed run. On failure or cancellation the run keeps its
    /// answers and history, so Submit can be retried.
    pub async fn submit(
        &mut self,
        sink: &dyn SubmissionSink,
        identity: Option<&OperatorIdentity>,
        user_agent: Option<&str>,
        cancel: &CancellationToken,
    ) -> Result<Submission, SubmitError> {
        if self.submitted_at.is_some() {
            return Err(RunError::AlreadySubmitted.into());
        }
        let submission = self.submission(identity, user_agent)?;
        submit_with_cancel(sink, &submission, cancel).await?;

        self.submitted_at = Some(submission.submitted_at);
        tracing::info!(script_id = %submission.script_id, "Run submitted");
        Ok(submission)
    }

    fn ensure_in_progress(&self) -> Result<(), RunError> {
        match self.state {
            RunState::InProgress => Ok(()),
            RunState::Completed => Err(RunError::Finished),
            RunState::Aborted => Err(RunError::Aborted),
        }
    }

    fn current_id(&self) -> &str {
        self.history.last().map(String::as_str).unwrap_or_default()
    }
}
