use serde_json::Value;

use super::protocol::{ErrorCode, LogEntry, LogPage, OpKind, SyncResponse};
use crate::form::{FormSession, Mode};

/// What reconciling one response produced for the embedding surface.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Stale or mismatched response, dropped without touching state.
    Discarded,
    /// Applied cleanly, with a user-facing confirmation.
    Applied(String),
    /// A page of matching entries from list_logs.
    Page(LogPage),
    /// Recognized failure; the user stays put and may retry.
    Rejected(String),
    /// Recognized failure whose only safe recovery is a full reload.
    ReloadRequired(String),
}

/// Reconcile a response envelope into the session. Routing is by
/// sequence number: the response must answer either the serialized
/// in-flight request or the newest list request; anything else is
/// stale and gets dropped.
pub fn apply(session: &mut FormSession, resp: &SyncResponse) -> Outcome {
    if let Some(inflight) = session.inflight.clone()
        && resp.seq == Some(inflight.seq)
    {
        if let Some(op) = resp.op
            && op != inflight.op
        {
            tracing::warn!(got = op.as_str(), sent = inflight.op.as_str(), "response op mismatch");
            return Outcome::Discarded;
        }
        // The round trip for the in-flight request is over; this is
        // the only place the single-flight guard is released.
        session.inflight = None;
        session.guard.finish();
        return apply_serialized(session, inflight.op, inflight.name.as_deref(), resp);
    }

    if resp.seq.is_some() && resp.seq == session.last_list_seq {
        return apply_list(resp);
    }

    tracing::debug!(seq = ?resp.seq, "discarding stale response");
    Outcome::Discarded
}

/// Map a transport-level failure onto the protocol taxonomy: a
/// forbidden transport maps to the shared permission path, anything
/// else is reported with a reload offered. Releases the guard; the
/// round trip is over either way.
pub fn transport_failure(session: &mut FormSession, err: &std::io::Error) -> Outcome {
    if session.inflight.take().is_some() {
        session.guard.finish();
    }
    if err.kind() == std::io::ErrorKind::PermissionDenied {
        Outcome::ReloadRequired(permission_message())
    } else {
        Outcome::ReloadRequired(format!(
            "Could not reach the log store ({err}). Reload and try again."
        ))
    }
}

fn apply_serialized(
    session: &mut FormSession,
    op: OpKind,
    name: Option<&str>,
    resp: &SyncResponse,
) -> Outcome {
    if resp.success {
        return match op {
            OpKind::FilterCreate => apply_create_ok(session, name),
            OpKind::FilterEdit => apply_edit_ok(session, name),
            OpKind::DeleteLogs => apply_purge_ok(resp),
            OpKind::ListLogs => {
                tracing::warn!("list_logs answered on the serialized path");
                Outcome::Discarded
            }
        };
    }

    if let Some(outcome) = shared_failure(resp) {
        return outcome;
    }

    let code = match resp.code() {
        Some(code) => code,
        None => {
            return Outcome::Rejected(
                "The operation failed without an error code. Nothing was changed; try again."
                    .to_string(),
            );
        }
    };
    match (op, code) {
        (OpKind::FilterCreate, ErrorCode::BadName) => Outcome::Rejected(
            "That name cannot be used as a filter name. Adjust it and save again.".to_string(),
        ),
        (OpKind::FilterCreate, ErrorCode::NameTaken) => Outcome::Rejected(
            "A filter with that name already exists. Pick another name and save again.".to_string(),
        ),
        (OpKind::FilterEdit, ErrorCode::FilterMissing) => Outcome::ReloadRequired(
            "This filter no longer exists. Reload to refresh the filter list.".to_string(),
        ),
        (OpKind::FilterEdit, ErrorCode::FilterRestricted) => Outcome::ReloadRequired(
            "You are not allowed to edit this filter. Reload to resynchronize what you can do."
                .to_string(),
        ),
        (_, code) => unknown_code(code),
    }
}

/// The shared error codes, handled centrally before any operation gets
/// a say. The `session_expired` hint counts even without a code.
fn shared_failure(resp: &SyncResponse) -> Option<Outcome> {
    if resp.session_expired == Some(true) {
        return Some(Outcome::ReloadRequired(session_expired_message()));
    }
    match resp.code()? {
        ErrorCode::PermissionDenied => Some(Outcome::ReloadRequired(permission_message())),
        ErrorCode::SessionExpired => Some(Outcome::ReloadRequired(session_expired_message())),
        ErrorCode::DatabaseFailure => Some(Outcome::Rejected(
            "The log database reported a failure. Nothing was changed; try again.".to_string(),
        )),
        _ => None,
    }
}

fn unknown_code(code: ErrorCode) -> Outcome {
    tracing::warn!(code = code.wire(), "unrecognized error code");
    Outcome::ReloadRequired(format!(
        "The log store reported an unknown error (code {}). Reload to get back to a known state.",
        code.wire()
    ))
}

fn permission_message() -> String {
    "You do not have permission to do this. Reload to resynchronize.".to_string()
}

fn session_expired_message() -> String {
    "Your session has expired. Log in again and reload.".to_string()
}

fn apply_create_ok(session: &mut FormSession, name: Option<&str>) -> Outcome {
    // Re-validate that the session still looks like the request we
    // sent; a slow response must not mutate a changed mode.
    if session.mode.mode != Mode::Create {
        tracing::warn!(mode = ?session.mode.mode, "create response arrived outside create mode");
        return Outcome::Discarded;
    }
    let name = match name {
        Some(n) => n.to_string(),
        None => session.mode.identity.name.clone(),
    };
    // Identity becomes the new name; origin keeps the filter this one
    // was based on. The excursion commits into in-place editing.
    session.mode.identity.name = name.clone();
    session.known_filters.insert(name.clone());
    session.mode.discard_stash();
    session.mode.enter(Mode::Edit);
    session.mode.previous = Mode::Stored;
    session.mode.stash_identity();
    Outcome::Applied(format!("Filter '{name}' was created; you are now editing it"))
}

fn apply_edit_ok(session: &mut FormSession, name: Option<&str>) -> Outcome {
    if session.mode.mode != Mode::Edit {
        tracing::warn!(mode = ?session.mode.mode, "edit response arrived outside edit mode");
        return Outcome::Discarded;
    }
    let name = match name {
        Some(n) => n.to_string(),
        None => session.mode.identity.name.clone(),
    };
    // A rename replaces the old entry in the known-name set.
    if let Some(stashed) = session.mode.stashed()
        && stashed.name != name
    {
        let old = stashed.name.clone();
        session.known_filters.remove(&old);
    }
    session.known_filters.insert(name.clone());
    session.mode.identity.name = name.clone();
    session.mode.identity.origin.clear();
    session.mode.discard_stash();
    session.mode.enter(Mode::Stored);
    Outcome::Applied(format!("Filter '{name}' was updated"))
}

fn apply_purge_ok(resp: &SyncResponse) -> Outcome {
    let deleted = resp.data.get("deleted").and_then(Value::as_u64).unwrap_or(0);
    Outcome::Applied(format!("Deleted {deleted} matching log entries"))
}

fn apply_list(resp: &SyncResponse) -> Outcome {
    if !resp.success {
        if let Some(outcome) = shared_failure(resp) {
            return outcome;
        }
        return match resp.code() {
            Some(code) => unknown_code(code),
            None => Outcome::Rejected(
                "Listing failed without an error code. Try again.".to_string(),
            ),
        };
    }
    let entries = match resp.data.get("entries") {
        Some(value) => match serde_json::from_value::<Vec<LogEntry>>(value.clone()) {
            Ok(entries) => entries,
            Err(err) => {
                tracing::warn!(error = %err, "unreadable list_logs entries");
                return Outcome::Rejected(
                    "The list response could not be read. Try again.".to_string(),
                );
            }
        },
        None => Vec::new(),
    };
    let total = resp.data.get("total").and_then(Value::as_u64).unwrap_or(entries.len() as u64);
    let offset = resp.data.get("offset").and_then(Value::as_u64).unwrap_or(0);
    Outcome::Page(LogPage {
        entries,
        total,
        offset,
    })
}
