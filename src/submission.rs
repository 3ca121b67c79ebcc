use crate::answer::AnswerValue;
use crate::error::SubmitError;
use crate::identity::OperatorIdentity;
use crate::script::ScriptSnapshot;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

/// The record handed to the lead store when a run completes. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    pub script_id: String,
    pub script_name: String,
    /// Answers keyed by field id.
    pub data: BTreeMap<String, AnswerValue>,
    pub submitted_at: DateTime<Utc>,
    pub user_agent: Option<String>,
    pub operator: Option<OperatorIdentity>,
}

impl Submission {
    /// Re-keys the data by apiName, the key CRM and webhook consumers expect.
    /// Answers for ids no longer in the script keep their field id.
    pub fn keyed_by_api_name(&self, script: &ScriptSnapshot) -> BTreeMap<String, AnswerValue> {
        self.data
            .iter()
            .map(|(field_id, value)| {
                let key = script
                    .field(field_id)
                    .map(|f| f.api_name.clone())
                    .unwrap_or_else(|| field_id.clone());
                (key, value.clone())
            })
            .collect()
    }
}

/// What a sink reports back after a submission attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitOutcome {
    pub success: bool,
    pub error: Option<String>,
}

impl SubmitOutcome {
    pub fn ok() -> Self {
        Self {
            success: true,
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
        }
    }
}

/// The lead-ingestion collaborator. How the submission travels (HTTP, field
/// renaming for the CRM, ...) is the sink's business.
#[async_trait]
pub trait SubmissionSink: Send + Sync {
    async fn submit(&self, submission: &Submission) -> SubmitOutcome;
}

/// Hands `submission` to `sink`, giving up as soon as `cancel` fires.
///
/// A token that is already cancelled always wins, so nothing reaches the sink.
/// Once the sink has started, cancelling only stops waiting for it: work the
/// sink handed to the OS or another task may still finish.
pub async fn submit_with_cancel(
    sink: &dyn SubmissionSink,
    submission: &Submission,
    cancel: &CancellationToken,
) -> Result<(), SubmitError> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => {
            tracing::info!(script_id = %submission.script_id, "Submission cancelled");
            Err(SubmitError::Cancelled)
        }
        outcome = sink.submit(submission) => {
            if outcome.success {
                Ok(())
            } else {
                let message = outcome.error.unwrap_or_else(|| "unknown error".to_string());
                tracing::warn!(script_id = %submission.script_id, error = %message, "Submission rejected");
                Err(SubmitError::Rejected(message))
            }
        }
    }
}

/// Keeps submissions in memory. Can be told to reject everything.
#[derive(Debug, Default)]
pub struct MemorySink {
    submissions: Mutex<Vec<Submission>>,
    reject_with: Option<String>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rejecting(error: impl Into<String>) -> Self {
        Self {
            submissions: Mutex::new(Vec::new()),
            reject_with: Some(error.into()),
        }
    }

    pub async fn submissions(&self) -> Vec<Submission> {
        self.submissions.lock().await.clone()
    }
}

#[async_trait]
impl SubmissionSink for MemorySink {
    async fn submit(&self, submission: &Submission) -> SubmitOutcome {
        if let Some(error) = &self.reject_with {
            return SubmitOutcome::failed(error.clone());
        }
        self.submissions.lock().await.push(submission.clone());
        SubmitOutcome::ok()
    }
}

/// Appends each submission as one JSON object per line.
///
/// Cancellation is best-effort for this sink. `tokio::fs` performs the write on
/// the blocking pool, so a cancel arriving mid-append can still leave the line
/// in the file while the submit reports `Cancelled`. Readers should treat
/// `scriptId` plus `submittedAt` as the identity of a line when a retry followed
/// a cancel.
#[derive(Debug, Clone)]
pub struct JsonLinesSink {
    path: PathBuf,
}

impl JsonLinesSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    async fn append(&self, submission: &Submission) -> Result<(), String> {
        let mut line = serde_json::to_string(submission).map_err(|e| e.to_string())?;
        line.push('\n');

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(|e| format!("Could not open '{}': {}", self.path.display(), e))?;
        file.write_all(line.as_bytes())
            .await
            .map_err(|e| format!("Could not write to '{}': {}", self.path.display(), e))?;
        file.flush().await.map_err(|e| e.to_string())
    }
}

#[async_trait]
impl SubmissionSink for JsonLinesSink {
    async fn submit(&self, submission: &Submission) -> SubmitOutcome {
        match self.append(submission).await {
            Ok(()) => SubmitOutcome::ok(),
            Err(e) => SubmitOutcome::failed(e),
        }
    }
}
