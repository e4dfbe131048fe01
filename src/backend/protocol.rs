use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::form::criteria::Criteria;

/// The four out-of-band operations the log store understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OpKind {
    FilterCreate,
    FilterEdit,
    ListLogs,
    DeleteLogs,
}

impl OpKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            OpKind::FilterCreate => "filter_create",
            OpKind::FilterEdit => "filter_edit",
            OpKind::ListLogs => "list_logs",
            OpKind::DeleteLogs => "delete_logs",
        }
    }

    /// Create/edit/delete share the single-flight guard; list does not.
    pub fn is_serialized(&self) -> bool {
        !matches!(self, OpKind::ListLogs)
    }
}

/// Request envelope sent to the log store daemon.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SyncRequest {
    pub op: OpKind,
    /// Monotonically increasing per session, so reconciliation can
    /// discard responses that arrive after a newer request.
    pub seq: u64,
    /// Anti-forgery token submitted with every request.
    pub token: String,
    #[serde(default)]
    pub args: Value,
}

impl SyncRequest {
    pub fn new(op: OpKind, seq: u64, token: impl Into<String>, args: Value) -> Self {
        Self {
            op,
            seq,
            token: token.into(),
            args,
        }
    }
}

/// Response envelope from the log store daemon.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SyncResponse {
    /// Whether the operation succeeded
    pub success: bool,
    /// Operation this response answers
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub op: Option<OpKind>,
    /// Sequence number echoed from the request
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seq: Option<u64>,
    /// Error code on failure
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_code: Option<i64>,
    /// Set when the backend noticed the session is gone
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_expired: Option<bool>,
    /// Operation-specific result data
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub data: Value,
}

impl SyncResponse {
    pub fn ok(op: OpKind, seq: u64, data: Value) -> Self {
        Self {
            success: true,
            op: Some(op),
            seq: Some(seq),
            error_code: None,
            session_expired: None,
            data,
        }
    }

    pub fn err(op: OpKind, seq: u64, code: ErrorCode) -> Self {
        Self {
            success: false,
            op: Some(op),
            seq: Some(seq),
            error_code: Some(code.wire()),
            session_expired: None,
            data: Value::Null,
        }
    }

    pub fn code(&self) -> Option<ErrorCode> {
        self.error_code.map(ErrorCode::from_wire)
    }
}

/// Error-code taxonomy. The first three are shared across operations
/// and handled centrally; the rest belong to their owning operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    PermissionDenied,
    SessionExpired,
    DatabaseFailure,
    BadName,
    NameTaken,
    FilterMissing,
    FilterRestricted,
    Unknown(i64),
}

impl ErrorCode {
    pub fn from_wire(code: i64) -> ErrorCode {
        match code {
            1 => ErrorCode::PermissionDenied,
            2 => ErrorCode::SessionExpired,
            3 => ErrorCode::DatabaseFailure,
            10 => ErrorCode::BadName,
            11 => ErrorCode::NameTaken,
            20 => ErrorCode::FilterMissing,
            21 => ErrorCode::FilterRestricted,
            other => ErrorCode::Unknown(other),
        }
    }

    pub fn wire(&self) -> i64 {
        match self {
            ErrorCode::PermissionDenied => 1,
            ErrorCode::SessionExpired => 2,
            ErrorCode::DatabaseFailure => 3,
            ErrorCode::BadName => 10,
            ErrorCode::NameTaken => 11,
            ErrorCode::FilterMissing => 20,
            ErrorCode::FilterRestricted => 21,
            ErrorCode::Unknown(code) => *code,
        }
    }

    /// Shared codes are handled before any operation-specific handler.
    pub fn is_shared(&self) -> bool {
        matches!(
            self,
            ErrorCode::PermissionDenied | ErrorCode::SessionExpired | ErrorCode::DatabaseFailure
        )
    }
}

/// Args payload for `filter_create`.
pub fn filter_create_args(name: &str, description: Option<&str>, criteria: &Criteria) -> Value {
    json!({
        "name": name,
        "description": description,
        "conditions": criteria.conditions_payload(),
        "order_by": criteria.order_by_payload(),
    })
}

/// Args payload for `filter_edit`.
pub fn filter_edit_args(name: &str, description: Option<&str>, criteria: &Criteria) -> Value {
    json!({
        "name": name,
        "description": description,
        "conditions": criteria.conditions_payload(),
        "order_by": criteria.order_by_payload(),
    })
}

/// Args payload for `list_logs`.
pub fn list_logs_args(criteria: &Criteria, offset: u64, max: u64) -> Value {
    json!({
        "conditions": criteria.conditions_payload(),
        "order_by": criteria.order_by_payload(),
        "offset": offset,
        "max": max,
    })
}

/// Args payload for `delete_logs`. `max` is the optional row cap; its
/// absence means the delete is unbounded.
pub fn delete_logs_args(criteria: &Criteria, offset: u64, max: Option<u64>) -> Value {
    json!({
        "conditions": criteria.conditions_payload(),
        "order_by": criteria.order_by_payload(),
        "offset": offset,
        "max": max,
    })
}

/// One matching log entry as returned by `list_logs`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LogEntry {
    pub id: u64,
    pub timestamp: i64,
    pub severity: u8,
    #[serde(rename = "type")]
    pub entry_type: String,
    pub message: String,
    #[serde(default)]
    pub uid: Option<u64>,
    #[serde(default)]
    pub hostname: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub referer: Option<String>,
}

/// A page of matching entries plus the total match count for paging.
#[derive(Debug, Clone, PartialEq)]
pub struct LogPage {
    pub entries: Vec<LogEntry>,
    pub total: u64,
    pub offset: u64,
}
