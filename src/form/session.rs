use std::collections::BTreeSet;

use super::criteria::Criteria;
use super::event::PendingAction;
use super::guard::SubmitGuard;
use super::mode::ModeState;
use super::surface::ControlSurface;
use crate::backend::protocol::OpKind;
use crate::validate::datetime::TimeWindow;

/// Record of the serialized request currently in flight.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Inflight {
    pub op: OpKind,
    pub seq: u64,
    /// Candidate machine name carried by a filter_create/filter_edit.
    pub name: Option<String>,
}

/// One controller instance owning all mutable form state: mode,
/// criteria, guard flags, and request bookkeeping. Explicit and
/// injectable; the event handler and reconciliation receive it by
/// reference, so independent sessions never share state.
#[derive(Debug)]
pub struct FormSession {
    pub mode: ModeState,
    pub criteria: Criteria,
    pub guard: SubmitGuard,
    /// Date-picker and time-of-day proxies backing time_from/time_to.
    pub window: TimeWindow,
    /// Whether this viewer may edit stored filters in place.
    pub can_edit: bool,
    /// Names of stored filters known to this session, seeded at
    /// construction and extended on successful create.
    pub known_filters: BTreeSet<String>,
    /// Anti-forgery token submitted with every request.
    pub token: String,
    /// Page size for list requests.
    pub page_size: u64,
    /// Draft description metadata for the filter being composed.
    pub description: Option<String>,
    pub inflight: Option<Inflight>,
    /// Sequence of the most recently issued list request; older list
    /// responses are stale and get discarded.
    pub last_list_seq: Option<u64>,
    pending: Option<PendingAction>,
    next_seq: u64,
}

impl FormSession {
    pub fn new(
        token: impl Into<String>,
        page_size: u64,
        can_edit: bool,
        known_filters: BTreeSet<String>,
    ) -> Self {
        Self {
            mode: ModeState::new(),
            criteria: Criteria::default(),
            guard: SubmitGuard::new(),
            window: TimeWindow::default(),
            can_edit,
            known_filters,
            token: token.into(),
            page_size,
            description: None,
            inflight: None,
            last_list_seq: None,
            pending: None,
            next_seq: 0,
        }
    }

    /// A session whose page arrived with a stored filter selected.
    pub fn with_stored(
        name: impl Into<String>,
        token: impl Into<String>,
        page_size: u64,
        can_edit: bool,
        known_filters: BTreeSet<String>,
    ) -> Self {
        let mut session = Self::new(token, page_size, can_edit, known_filters);
        session.mode = ModeState::stored(name);
        session
    }

    /// The control set for the current (mode, identity) pair.
    pub fn surface(&self) -> ControlSurface {
        ControlSurface::for_state(self.mode.mode, &self.mode.identity)
    }

    /// Next request sequence number, monotonically increasing.
    pub fn next_seq(&mut self) -> u64 {
        self.next_seq += 1;
        self.next_seq
    }

    pub fn pending(&self) -> Option<&PendingAction> {
        self.pending.as_ref()
    }

    pub fn set_pending(&mut self, action: PendingAction) {
        self.pending = Some(action);
    }

    pub fn take_pending(&mut self) -> Option<PendingAction> {
        self.pending.take()
    }
}
