use thiserror::Error;

use crate::backend::protocol::{self, OpKind, SyncRequest};
use crate::form::{
    ConfirmPrompt, Effect, Field, FilterIdentity, FormEvent, FormSession, Inflight, Mode, Notice,
    PendingAction, PurgeScope, Recovery, Submission,
};
use crate::validate::{self, datetime, machine_name};

/// Invariant violations: an action arrived that the current mode can
/// never legally produce. These indicate a wiring bug in the embedding
/// surface, not bad user input; the handler logs them and leaves the
/// session untouched.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum InvariantError {
    #[error("'{action}' is not available in mode {mode:?}")]
    IllegalAction { action: &'static str, mode: Mode },
    #[error("delete requires a selected filter name")]
    DeleteWithoutName,
    #[error("confirmation answered with nothing pending")]
    NoPendingConfirmation,
    #[error("selector offered unknown filter '{0}'")]
    UnknownFilter(String),
}

/// Which side of the time window an edit touched; a from/to violation
/// clears the side that was just edited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WindowSide {
    From,
    To,
}

pub struct EventHandler<'a> {
    session: &'a mut FormSession,
}

impl<'a> EventHandler<'a> {
    pub fn new(session: &'a mut FormSession) -> Self {
        Self { session }
    }

    /// The single transition entry point: `(state, event) -> effect`,
    /// with the state mutated in place. Invariant errors are caught
    /// here, logged, and reported; they never half-apply.
    pub fn handle(&mut self, event: FormEvent) -> Effect {
        // Once a full-page submission is issued the page is about to
        // be replaced; nothing may transition any more.
        if self.session.guard.is_submitted() {
            return Effect::None;
        }
        // A blocking confirmation is pending; only its answer counts.
        if self.session.pending().is_some() && !matches!(event, FormEvent::Confirm { .. }) {
            return Effect::Notice(Notice::warning(
                "Answer the pending confirmation before doing anything else",
            ));
        }
        match self.dispatch(event) {
            Ok(effect) => effect,
            Err(err) => {
                tracing::error!(error = %err, "form event aborted");
                Effect::Notice(Notice::error(
                    format!("Internal error: {err}. The action was not applied."),
                    Recovery::Reload,
                ))
            }
        }
    }

    fn dispatch(&mut self, event: FormEvent) -> Result<Effect, InvariantError> {
        match event {
            FormEvent::Field { field, value } => self.handle_field(field, &value),
            FormEvent::SeverityAny { checked } => {
                if checked && self.session.criteria.severity.set_any() {
                    Ok(self.criteria_changed())
                } else {
                    Ok(Effect::None)
                }
            }
            FormEvent::Severity { level, checked } => {
                if self.session.criteria.severity.toggle(level, checked) {
                    Ok(self.criteria_changed())
                } else {
                    Ok(Effect::None)
                }
            }
            FormEvent::TypeAny { checked } => {
                if checked && self.session.criteria.types.set_any() {
                    Ok(self.criteria_changed())
                } else {
                    Ok(Effect::None)
                }
            }
            FormEvent::Type { tag, checked } => {
                if self.session.criteria.types.toggle(&tag, checked) {
                    Ok(self.criteria_changed())
                } else {
                    Ok(Effect::None)
                }
            }
            FormEvent::OrderBy { slot, entry } => {
                if self.session.criteria.set_order_slot(slot, entry) {
                    Ok(self.criteria_changed())
                } else {
                    Ok(Effect::None)
                }
            }
            FormEvent::SelectFilter { name } => self.handle_select(name),
            FormEvent::Create => self.handle_create(),
            FormEvent::Edit => self.handle_edit(),
            FormEvent::Delete => self.handle_delete(),
            FormEvent::Cancel => self.handle_cancel(),
            FormEvent::Reset => self.handle_reset(),
            FormEvent::Save => self.handle_save(),
            FormEvent::List { offset } => self.handle_list(offset),
            FormEvent::Purge { max } => self.handle_purge(max),
            FormEvent::Confirm { accepted } => self.handle_confirm(accepted),
        }
    }

    // --- individual fields ---

    fn handle_field(&mut self, field: Field, raw: &str) -> Result<Effect, InvariantError> {
        match field {
            Field::TimeRange => match validate::normalize_positive_int(raw) {
                Ok(value) => {
                    if self.session.criteria.set_time_range(value) {
                        if value.is_some() {
                            self.session.window.clear();
                        }
                        Ok(self.criteria_changed())
                    } else {
                        Ok(Effect::None)
                    }
                }
                Err(err) => Ok(Effect::Notice(Notice::warning(format!("Time range: {err}")))),
            },
            Field::Uid => match validate::normalize_positive_int(raw) {
                Ok(value) => {
                    if self.session.criteria.set_uid(value) {
                        Ok(self.criteria_changed())
                    } else {
                        Ok(Effect::None)
                    }
                }
                Err(err) => Ok(Effect::Notice(Notice::warning(format!("User id: {err}")))),
            },
            Field::Role => {
                let value = validate::normalize_text(raw);
                if self.session.criteria.set_role(value) {
                    Ok(self.criteria_changed())
                } else {
                    Ok(Effect::None)
                }
            }
            Field::Hostname => {
                let value = validate::normalize_text(raw);
                if self.session.criteria.set_hostname(value) {
                    Ok(self.criteria_changed())
                } else {
                    Ok(Effect::None)
                }
            }
            Field::Location => match validate::normalize_url(raw) {
                Ok(value) => {
                    if self.session.criteria.set_location(value) {
                        Ok(self.criteria_changed())
                    } else {
                        Ok(Effect::None)
                    }
                }
                Err(err) => Ok(Effect::Notice(Notice::warning(format!("Location: {err}")))),
            },
            Field::Referer => match validate::normalize_referer(raw) {
                Ok(value) => {
                    if self.session.criteria.set_referer(value) {
                        Ok(self.criteria_changed())
                    } else {
                        Ok(Effect::None)
                    }
                }
                Err(err) => Ok(Effect::Notice(Notice::warning(format!("Referrer: {err}")))),
            },
            Field::FromDate | Field::FromTime | Field::ToDate | Field::ToTime => {
                self.handle_window_field(field, raw)
            }
            Field::Name => self.handle_name_field(raw),
        }
    }

    fn handle_window_field(&mut self, field: Field, raw: &str) -> Result<Effect, InvariantError> {
        let trimmed = raw.trim();
        let side = match field {
            Field::FromDate | Field::FromTime => WindowSide::From,
            _ => WindowSide::To,
        };
        match field {
            Field::FromDate | Field::ToDate => {
                let parsed = if trimmed.is_empty() {
                    None
                } else {
                    match datetime::parse_date(trimmed) {
                        Ok(date) => Some(date),
                        Err(err) => {
                            return Ok(Effect::Notice(Notice::warning(format!("Date: {err}"))));
                        }
                    }
                };
                match field {
                    Field::FromDate => self.session.window.from_date = parsed,
                    _ => self.session.window.to_date = parsed,
                }
            }
            _ => {
                let parsed = if trimmed.is_empty() {
                    None
                } else {
                    match datetime::parse_time(trimmed) {
                        Ok(time) => Some(time),
                        Err(err) => {
                            return Ok(Effect::Notice(Notice::warning(format!("Time: {err}"))));
                        }
                    }
                };
                match field {
                    Field::FromTime => self.session.window.from_time = parsed,
                    _ => self.session.window.to_time = parsed,
                }
            }
        }
        Ok(self.apply_window(side))
    }

    /// Re-derive the canonical timestamps from the proxy inputs and
    /// enforce `from <= to`. A violation clears the side that was just
    /// edited and warns; the values are never silently swapped.
    fn apply_window(&mut self, edited: WindowSide) -> Effect {
        let mut violation = false;
        if let (Some(from), Some(to)) = (
            self.session.window.from_timestamp(),
            self.session.window.to_timestamp(),
        ) && from > to
        {
            violation = true;
            match edited {
                WindowSide::From => {
                    self.session.window.from_date = None;
                    self.session.window.from_time = None;
                }
                WindowSide::To => {
                    self.session.window.to_date = None;
                    self.session.window.to_time = None;
                }
            }
        }

        let from = self.session.window.from_timestamp();
        let to = self.session.window.to_timestamp();
        let mut changed = self.session.criteria.set_time_from(from);
        changed |= self.session.criteria.set_time_to(to);

        let transition = if changed {
            self.criteria_changed()
        } else {
            Effect::None
        };
        if violation {
            Effect::Notice(Notice::warning(
                "'From' must not be after 'To'; the value just entered was cleared",
            ))
        } else {
            transition
        }
    }

    /// The candidate stored-filter name, converted to machine form as
    /// it is typed. Full validation waits for save.
    fn handle_name_field(&mut self, raw: &str) -> Result<Effect, InvariantError> {
        if !self.session.mode.mode.is_composing() {
            return Err(InvariantError::IllegalAction {
                action: "name",
                mode: self.session.mode.mode,
            });
        }
        self.session.mode.identity.name = machine_name::machine_name(raw);
        Ok(Effect::None)
    }

    /// A normalized criteria value actually changed: default forks to
    /// ad hoc, and a stored filter either forks (plain viewer) or goes
    /// into in-place edit (viewer with edit capability).
    fn criteria_changed(&mut self) -> Effect {
        match self.session.mode.mode {
            Mode::Default => self.session.mode.enter(Mode::Adhoc),
            Mode::Stored => {
                if self.session.can_edit {
                    self.session.mode.stash_identity();
                    self.session.mode.enter(Mode::Edit);
                } else {
                    self.session.mode.enter(Mode::Adhoc);
                }
            }
            Mode::Adhoc | Mode::Create | Mode::Edit | Mode::DeleteFilter => {}
        }
        Effect::None
    }

    // --- selector and buttons ---

    fn handle_select(&mut self, name: String) -> Result<Effect, InvariantError> {
        if self.session.mode.mode.is_composing() {
            // Switching away would discard in-progress metadata. The
            // session is left untouched, so re-reading it reverts the
            // selector to its previous value.
            return Ok(Effect::Notice(Notice::warning(
                "Save or cancel the filter you are editing first; the selection was reverted",
            )));
        }
        if !name.is_empty() && !self.session.known_filters.contains(&name) {
            return Err(InvariantError::UnknownFilter(name));
        }

        if name.is_empty() {
            self.session.mode.identity = FilterIdentity::default();
            self.session.mode.enter(Mode::Default);
            self.session.criteria.reset();
            self.session.window.clear();
        } else {
            self.session.mode.identity = FilterIdentity::named(&name);
            self.session.mode.enter(Mode::Stored);
        }
        // Selection loads via a full-page submission.
        self.session.guard.mark_submitted();
        let selected = if name.is_empty() { None } else { Some(name) };
        Ok(Effect::Submit(Submission::SelectFilter { name: selected }))
    }

    fn handle_create(&mut self) -> Result<Effect, InvariantError> {
        match self.session.mode.mode {
            Mode::Default | Mode::Adhoc | Mode::Stored => {
                self.session.mode.stash_identity();
                if self.session.mode.mode == Mode::Stored {
                    // The new filter is based on the prior one.
                    let prior = std::mem::take(&mut self.session.mode.identity.name);
                    self.session.mode.identity.origin = prior;
                }
                self.session.mode.enter(Mode::Create);
                Ok(Effect::None)
            }
            mode => Err(InvariantError::IllegalAction {
                action: "create",
                mode,
            }),
        }
    }

    fn handle_edit(&mut self) -> Result<Effect, InvariantError> {
        match self.session.mode.mode {
            Mode::Stored => {
                self.session.mode.stash_identity();
                self.session.mode.enter(Mode::Edit);
                Ok(Effect::None)
            }
            mode => Err(InvariantError::IllegalAction { action: "edit", mode }),
        }
    }

    fn handle_delete(&mut self) -> Result<Effect, InvariantError> {
        match self.session.mode.mode {
            Mode::Stored => {
                let name = self.session.mode.identity.name.clone();
                if name.is_empty() {
                    return Err(InvariantError::DeleteWithoutName);
                }
                self.session.mode.enter(Mode::DeleteFilter);
                self.session
                    .set_pending(PendingAction::DeleteFilter { name: name.clone() });
                Ok(Effect::Confirm(ConfirmPrompt::DeleteFilter { name }))
            }
            mode => Err(InvariantError::IllegalAction {
                action: "delete",
                mode,
            }),
        }
    }

    fn handle_cancel(&mut self) -> Result<Effect, InvariantError> {
        match self.session.mode.mode {
            Mode::Create | Mode::Edit => {
                self.session.mode.restore_identity();
                self.session.mode.revert();
                self.session.description = None;
                Ok(Effect::None)
            }
            mode => Err(InvariantError::IllegalAction {
                action: "cancel",
                mode,
            }),
        }
    }

    fn handle_reset(&mut self) -> Result<Effect, InvariantError> {
        match self.session.mode.mode {
            Mode::Default | Mode::Adhoc | Mode::Stored => {
                self.session.criteria.reset();
                self.session.window.clear();
                self.session.description = None;
                // Identity survives a criteria reset, so a named
                // session degrades to ad hoc rather than default.
                if self.session.mode.identity.is_named() {
                    self.session.mode.enter(Mode::Adhoc);
                } else {
                    self.session.mode.enter(Mode::Default);
                }
                Ok(Effect::Notice(Notice::info("Criteria reset to defaults")))
            }
            mode => Err(InvariantError::IllegalAction {
                action: "reset",
                mode,
            }),
        }
    }

    // --- submissions ---

    fn handle_save(&mut self) -> Result<Effect, InvariantError> {
        let mode = self.session.mode.mode;
        if !mode.is_composing() {
            return Err(InvariantError::IllegalAction { action: "save", mode });
        }

        let name = machine_name::machine_name(&self.session.mode.identity.name);
        let current = match mode {
            Mode::Edit => self.session.mode.stashed().map(|id| id.name.as_str()),
            _ => None,
        };
        if let Err(err) = machine_name::validate_name(&name, &self.session.known_filters, current) {
            return Ok(Effect::Notice(Notice::warning(format!("Cannot save: {err}"))));
        }

        // Single-flight: a second save while one is in flight is a
        // silent no-op behind the blocking overlay.
        if !self.session.guard.try_begin() {
            return Ok(Effect::None);
        }

        let op = match mode {
            Mode::Create => OpKind::FilterCreate,
            _ => OpKind::FilterEdit,
        };
        let args = match op {
            OpKind::FilterCreate => protocol::filter_create_args(
                &name,
                self.session.description.as_deref(),
                &self.session.criteria,
            ),
            _ => protocol::filter_edit_args(
                &name,
                self.session.description.as_deref(),
                &self.session.criteria,
            ),
        };
        let seq = self.session.next_seq();
        self.session.mode.identity.name = name.clone();
        self.session.inflight = Some(Inflight {
            op,
            seq,
            name: Some(name),
        });
        Ok(Effect::Dispatch(SyncRequest::new(
            op,
            seq,
            self.session.token.clone(),
            args,
        )))
    }

    fn handle_list(&mut self, offset: u64) -> Result<Effect, InvariantError> {
        if !self.session.surface().list_enabled {
            return Err(InvariantError::IllegalAction {
                action: "list",
                mode: self.session.mode.mode,
            });
        }
        // Listing is read-only and safe to retry; it does not take the
        // single-flight guard and never changes mode.
        let seq = self.session.next_seq();
        self.session.last_list_seq = Some(seq);
        let args = protocol::list_logs_args(&self.session.criteria, offset, self.session.page_size);
        Ok(Effect::Dispatch(SyncRequest::new(
            OpKind::ListLogs,
            seq,
            self.session.token.clone(),
            args,
        )))
    }

    fn handle_purge(&mut self, max: Option<u64>) -> Result<Effect, InvariantError> {
        if !self.session.surface().purge_enabled {
            return Err(InvariantError::IllegalAction {
                action: "purge",
                mode: self.session.mode.mode,
            });
        }
        let scope = PurgeScope {
            filter: (self.session.mode.mode == Mode::Stored)
                .then(|| self.session.mode.identity.name.clone()),
            conditioned: self.session.criteria.has_conditions(),
            max,
        };
        self.session.set_pending(PendingAction::Purge { max });
        Ok(Effect::Confirm(ConfirmPrompt::Purge(scope)))
    }

    fn handle_confirm(&mut self, accepted: bool) -> Result<Effect, InvariantError> {
        let Some(pending) = self.session.take_pending() else {
            return Err(InvariantError::NoPendingConfirmation);
        };
        match pending {
            PendingAction::DeleteFilter { name } => {
                if accepted {
                    self.session.guard.mark_submitted();
                    Ok(Effect::Submit(Submission::DeleteFilter { name }))
                } else {
                    // Declining is a no-op transition back to the mode
                    // held before the attempt.
                    self.session.mode.revert();
                    Ok(Effect::None)
                }
            }
            PendingAction::Purge { max } => {
                if !accepted {
                    return Ok(Effect::None);
                }
                if !self.session.guard.try_begin() {
                    return Ok(Effect::None);
                }
                let seq = self.session.next_seq();
                let args = protocol::delete_logs_args(&self.session.criteria, 0, max);
                self.session.inflight = Some(Inflight {
                    op: OpKind::DeleteLogs,
                    seq,
                    name: None,
                });
                Ok(Effect::Dispatch(SyncRequest::new(
                    OpKind::DeleteLogs,
                    seq,
                    self.session.token.clone(),
                    args,
                )))
            }
        }
    }
}
