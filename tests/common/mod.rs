use std::collections::BTreeSet;

use logsieve::event_handler::EventHandler;
use logsieve::form::{Effect, Field, FormEvent, FormSession};

/// A fresh session with no filter selected and no edit capability.
pub fn create_session() -> FormSession {
    FormSession::new("test-token", 50, false, BTreeSet::new())
}

/// A session for a viewer with edit capability and the given known
/// filter names.
pub fn create_editor_session(names: &[&str]) -> FormSession {
    FormSession::new("test-token", 50, true, known(names))
}

/// A session whose page arrived with `name` selected.
pub fn create_stored_session(name: &str, can_edit: bool) -> FormSession {
    FormSession::with_stored(name, "test-token", 50, can_edit, known(&[name]))
}

pub fn known(names: &[&str]) -> BTreeSet<String> {
    names.iter().map(|s| s.to_string()).collect()
}

/// Feed one event through the handler.
pub fn feed(session: &mut FormSession, event: FormEvent) -> Effect {
    EventHandler::new(session).handle(event)
}

/// Feed a raw field edit.
pub fn set_field(session: &mut FormSession, field: Field, value: &str) -> Effect {
    feed(
        session,
        FormEvent::Field {
            field,
            value: value.to_string(),
        },
    )
}
