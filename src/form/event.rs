use serde_json::{Value, json};

use super::criteria::{OrderBy, Severity};
use super::mode::Mode;
use crate::backend::protocol::SyncRequest;

/// Individually validated text-like input fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    TimeRange,
    FromDate,
    FromTime,
    ToDate,
    ToTime,
    Uid,
    Role,
    Hostname,
    Location,
    Referer,
    Name,
}

/// Explicit input messages consumed by the event handler. The raw
/// field values arrive pre-normalization; the validation layer decides
/// what actually lands in the criteria.
#[derive(Debug, Clone, PartialEq)]
pub enum FormEvent {
    Field { field: Field, value: String },
    SeverityAny { checked: bool },
    Severity { level: Severity, checked: bool },
    TypeAny { checked: bool },
    Type { tag: String, checked: bool },
    OrderBy { slot: usize, entry: Option<OrderBy> },
    /// The filter-identity selector changed; empty selects none.
    SelectFilter { name: String },
    Create,
    Edit,
    Delete,
    Cancel,
    Reset,
    /// Submit the in-progress create or edit.
    Save,
    List { offset: u64 },
    Purge { max: Option<u64> },
    /// Answer to the pending blocking confirmation.
    Confirm { accepted: bool },
}

/// The actionable next step offered with a user-visible notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recovery {
    Dismiss,
    Retry,
    Reload,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Info,
    Warning,
    Error,
}

/// A non-blocking message for the user, always paired with a next step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
    pub recovery: Recovery,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Info,
            message: message.into(),
            recovery: Recovery::Dismiss,
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Warning,
            message: message.into(),
            recovery: Recovery::Dismiss,
        }
    }

    pub fn error(message: impl Into<String>, recovery: Recovery) -> Self {
        Self {
            kind: NoticeKind::Error,
            message: message.into(),
            recovery,
        }
    }
}

/// Scope of a bulk log deletion, for confirmation wording.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PurgeScope {
    /// Name of the selected stored filter, when there is one.
    pub filter: Option<String>,
    /// Whether any condition at all narrows the delete.
    pub conditioned: bool,
    /// The row cap, when one is set.
    pub max: Option<u64>,
}

/// A blocking yes/no decision surfaced before a destructive action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmPrompt {
    /// Deleting the named stored filter itself.
    DeleteFilter { name: String },
    /// Bulk deletion of matching log entries.
    Purge(PurgeScope),
}

impl ConfirmPrompt {
    pub fn message(&self) -> String {
        match self {
            ConfirmPrompt::DeleteFilter { name } => {
                format!("Delete the saved filter '{name}'? The filter itself is removed; log entries are not touched.")
            }
            ConfirmPrompt::Purge(scope) => {
                let target = match &scope.filter {
                    Some(name) => format!("matching the saved filter '{name}'"),
                    None => "matching the current conditions".to_string(),
                };
                match (scope.conditioned, scope.max) {
                    (false, None) => "No conditions and no row cap are set: this permanently deletes ALL log entries, the entire log. There is no undo. Proceed?".to_string(),
                    (false, Some(max)) => format!(
                        "No conditions are set: this deletes the first {max} log entries regardless of content. Proceed?"
                    ),
                    (true, None) => format!(
                        "No row cap is set: this permanently deletes EVERY log entry {target}. Proceed?"
                    ),
                    (true, Some(max)) => {
                        format!("Delete up to {max} log entries {target}?")
                    }
                }
            }
        }
    }
}

/// What a confirmed prompt resolves to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PendingAction {
    DeleteFilter { name: String },
    Purge { max: Option<u64> },
}

/// Payload of a full-page submission: the mode field's value plus what
/// the backend needs to rebuild the page. The transport is the
/// embedding surface's concern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    /// Initial filter selection (or clearing it); the page reloads
    /// with the selection applied.
    SelectFilter { name: Option<String> },
    /// Confirmed deletion of the named stored filter.
    DeleteFilter { name: String },
}

impl Submission {
    pub fn mode(&self) -> Mode {
        match self {
            Submission::SelectFilter { name: Some(_) } => Mode::Stored,
            Submission::SelectFilter { name: None } => Mode::Default,
            Submission::DeleteFilter { .. } => Mode::DeleteFilter,
        }
    }

    pub fn payload(&self) -> Value {
        match self {
            Submission::SelectFilter { name } => json!({
                "mode": self.mode().as_str(),
                "name": name,
            }),
            Submission::DeleteFilter { name } => json!({
                "mode": self.mode().as_str(),
                "name": name,
            }),
        }
    }
}

/// The declarative result of one event: what, if anything, the
/// embedding surface must do next. Control visibility is not carried
/// here; surfaces re-read [`super::ControlSurface`] after every event.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    None,
    /// Show an inline, non-blocking notice.
    Notice(Notice),
    /// Ask a blocking yes/no question; answer with [`FormEvent::Confirm`].
    Confirm(ConfirmPrompt),
    /// Perform a full-page submission; the page is about to be replaced.
    Submit(Submission),
    /// Put an out-of-band request on the wire.
    Dispatch(SyncRequest),
}
