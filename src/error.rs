use thiserror::Error;

/// Errors raised when a script snapshot is built or edited.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ScriptError {
    #[error("A script must contain at least one page")]
    NoPages,

    #[error("Page '{0}' is the only page left in the script and cannot be deleted")]
    LastPage(String),

    #[error("Page id '{0}' is used more than once")]
    DuplicatePageId(String),

    #[error("Field id '{field_id}' on page '{page_id}' is already used elsewhere in the script")]
    DuplicateFieldId { page_id: String, field_id: String },

    #[error("Page '{0}' not found in the script")]
    PageNotFound(String),

    #[error("Field '{field_id}' not found on page '{page_id}'")]
    FieldNotFound { page_id: String, field_id: String },

    #[error("Field '{0}' does not accept choices")]
    NotAChoiceField(String),

    #[error("Rule destination '{0}' does not reference a page of this script")]
    UnknownDestination(String),
}

/// Errors that can occur when converting a foreign script format into a `ScriptSnapshot`.
#[derive(Error, Debug, Clone)]
pub enum ScriptConversionError {
    #[error("Failed to parse script JSON: {0}")]
    JsonParseError(String),

    #[error("Invalid script data: {0}")]
    ValidationError(String),

    #[error(transparent)]
    Script(#[from] ScriptError),
}

/// Precondition violations when driving the resolver.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ResolveError {
    #[error("Start page '{0}' was never part of the script")]
    UnknownStartPage(String),

    #[error("Start page '{0}' is hidden and cannot begin a run")]
    HiddenStartPage(String),

    #[error("The script has no visible pages to run")]
    NoVisiblePages,
}

/// Errors for navigation requests a run in its current state cannot honour.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RunError {
    #[error("Required fields on page '{page_id}' are not filled: {}", field_ids.join(", "))]
    RequiredFieldsMissing {
        page_id: String,
        field_ids: Vec<String>,
    },

    #[error("Already on the first page, there is nothing to go back to")]
    AtFirstPage,

    #[error("The run has finished and accepts no further navigation")]
    Finished,

    #[error("The run was aborted")]
    Aborted,

    #[error("The run has not completed yet, so there is nothing to submit")]
    NotCompleted,

    #[error("The run was already submitted")]
    AlreadySubmitted,
}

/// Failures reported back from a submission attempt.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SubmitError {
    #[error("Submission rejected by sink: {0}")]
    Rejected(String),

    #[error("Submission was cancelled before the sink answered")]
    Cancelled,

    #[error(transparent)]
    Run(#[from] RunError),
}

/// Errors while encoding, decoding or moving compiled snapshot files.
#[derive(Error, Debug, Clone)]
pub enum SnapshotError {
    #[error("Serialization failed: {0}")]
    Encode(String),

    #[error("Deserialization failed: {0}")]
    Decode(String),

    #[error("Could not access '{path}': {message}")]
    Io { path: String, message: String },
}

/// Errors raised by a `ScriptStore`.
#[derive(Error, Debug, Clone)]
pub enum StoreError {
    #[error("Script '{0}' not found in store")]
    NotFound(String),

    #[error("Store entry '{requested}' holds script '{found}'")]
    IdMismatch { requested: String, found: String },

    #[error(transparent)]
    Snapshot(#[from] SnapshotError),
}
