use serde::{Deserialize, Serialize};

/// The single discrete lifecycle state governing which filter actions
/// are legal and what the embedding surface displays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// No filter selected, criteria at their reset defaults.
    Default,
    /// No named filter selected, but criteria differ from defaults.
    Adhoc,
    /// A named, saved filter is selected and criteria reflect it.
    Stored,
    /// Composing a brand-new named filter.
    Create,
    /// Modifying the selected stored filter in place.
    Edit,
    /// Transient confirmation state for deleting the current filter.
    DeleteFilter,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Default => "default",
            Mode::Adhoc => "adhoc",
            Mode::Stored => "stored",
            Mode::Create => "create",
            Mode::Edit => "edit",
            Mode::DeleteFilter => "delete_filter",
        }
    }

    /// Create and edit freeze the selector and the immediate submit
    /// controls so in-progress metadata cannot be lost.
    pub fn is_composing(&self) -> bool {
        matches!(self, Mode::Create | Mode::Edit)
    }
}

/// Identity of the current filter. `name` is the selected stored
/// filter (empty = none/ad hoc); `origin` records the stored filter
/// the current draft state was derived from, for restore after cancel.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FilterIdentity {
    pub name: String,
    pub origin: String,
}

impl FilterIdentity {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            origin: String::new(),
        }
    }

    pub fn is_named(&self) -> bool {
        !self.name.is_empty()
    }
}

/// Mode plus the bookkeeping the transitions need: the previous mode
/// for cancel/resume, and the identity stashed before a create/edit
/// excursion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModeState {
    pub mode: Mode,
    pub previous: Mode,
    pub identity: FilterIdentity,
    stashed: Option<FilterIdentity>,
}

impl Default for ModeState {
    fn default() -> Self {
        Self {
            mode: Mode::Default,
            previous: Mode::Default,
            identity: FilterIdentity::default(),
            stashed: None,
        }
    }
}

impl ModeState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Construct directly in `Stored` with the given filter selected,
    /// the shape a session has after the page loads with a selection.
    pub fn stored(name: impl Into<String>) -> Self {
        Self {
            mode: Mode::Stored,
            previous: Mode::Stored,
            identity: FilterIdentity::named(name),
            stashed: None,
        }
    }

    /// Move to `mode`, remembering the current mode for cancel/resume.
    pub fn enter(&mut self, mode: Mode) {
        self.previous = self.mode;
        self.mode = mode;
    }

    /// Fall back to the previous mode without committing a transition,
    /// the path a declined confirmation takes.
    pub fn revert(&mut self) {
        self.mode = self.previous;
    }

    /// Stash the identity before a create/edit excursion.
    pub fn stash_identity(&mut self) {
        self.stashed = Some(self.identity.clone());
    }

    /// The identity as it was before the current excursion, if any.
    pub fn stashed(&self) -> Option<&FilterIdentity> {
        self.stashed.as_ref()
    }

    /// Restore the pre-excursion identity, if one was stashed.
    pub fn restore_identity(&mut self) {
        if let Some(identity) = self.stashed.take() {
            self.identity = identity;
        }
    }

    /// Drop the stash without restoring (the excursion committed).
    pub fn discard_stash(&mut self) {
        self.stashed = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enter_remembers_previous_mode() {
        let mut state = ModeState::stored("errors_today");
        state.enter(Mode::Create);
        assert_eq!(state.mode, Mode::Create);
        assert_eq!(state.previous, Mode::Stored);
    }

    #[test]
    fn stash_and_restore_identity() {
        let mut state = ModeState::stored("errors_today");
        state.stash_identity();
        state.identity.origin = std::mem::take(&mut state.identity.name);
        assert!(!state.identity.is_named());

        state.restore_identity();
        assert_eq!(state.identity.name, "errors_today");
        assert_eq!(state.identity.origin, "");
    }

    #[test]
    fn restore_without_stash_is_a_noop() {
        let mut state = ModeState::new();
        state.identity.name = "kept".to_string();
        state.restore_identity();
        assert_eq!(state.identity.name, "kept");
    }

    #[test]
    fn mode_wire_names() {
        assert_eq!(Mode::DeleteFilter.as_str(), "delete_filter");
        assert_eq!(Mode::Adhoc.as_str(), "adhoc");
    }
}
