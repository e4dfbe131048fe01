use super::mode::{FilterIdentity, Mode};

/// The set of visible and enabled controls for one (mode, identity)
/// pair. A pure function of that pair, reasserted on every transition
/// so the rendering can never drift from the machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlSurface {
    pub title: &'static str,
    pub selector_enabled: bool,
    pub name_field_visible: bool,
    pub create_visible: bool,
    pub edit_visible: bool,
    pub delete_visible: bool,
    pub save_visible: bool,
    pub cancel_visible: bool,
    pub reset_visible: bool,
    pub list_enabled: bool,
    pub purge_enabled: bool,
}

impl ControlSurface {
    pub fn for_state(mode: Mode, identity: &FilterIdentity) -> Self {
        match mode {
            Mode::Default => Self {
                title: "No filter",
                selector_enabled: true,
                name_field_visible: false,
                create_visible: true,
                edit_visible: false,
                delete_visible: false,
                save_visible: false,
                cancel_visible: false,
                reset_visible: true,
                list_enabled: true,
                purge_enabled: true,
            },
            Mode::Adhoc => Self {
                title: "Ad hoc filter",
                selector_enabled: true,
                name_field_visible: false,
                create_visible: true,
                edit_visible: false,
                delete_visible: false,
                save_visible: false,
                cancel_visible: false,
                reset_visible: true,
                list_enabled: true,
                purge_enabled: true,
            },
            Mode::Stored => Self {
                title: "Saved filter",
                selector_enabled: true,
                name_field_visible: false,
                create_visible: true,
                edit_visible: identity.is_named(),
                delete_visible: identity.is_named(),
                save_visible: false,
                cancel_visible: false,
                reset_visible: true,
                list_enabled: true,
                purge_enabled: true,
            },
            Mode::Create => Self {
                title: "New filter",
                selector_enabled: false,
                name_field_visible: true,
                create_visible: false,
                edit_visible: false,
                delete_visible: false,
                save_visible: true,
                cancel_visible: true,
                reset_visible: false,
                list_enabled: false,
                purge_enabled: false,
            },
            Mode::Edit => Self {
                title: "Edit filter",
                selector_enabled: false,
                name_field_visible: true,
                create_visible: false,
                edit_visible: false,
                delete_visible: false,
                save_visible: true,
                cancel_visible: true,
                reset_visible: false,
                list_enabled: false,
                purge_enabled: false,
            },
            Mode::DeleteFilter => Self {
                title: "Delete filter?",
                selector_enabled: false,
                name_field_visible: false,
                create_visible: false,
                edit_visible: false,
                delete_visible: false,
                save_visible: false,
                cancel_visible: false,
                reset_visible: false,
                list_enabled: false,
                purge_enabled: false,
            },
        }
    }

    /// Compact rendering of the surface for display and snapshots.
    pub fn describe(&self) -> String {
        let mut buttons = Vec::new();
        if self.create_visible {
            buttons.push("create");
        }
        if self.edit_visible {
            buttons.push("edit");
        }
        if self.delete_visible {
            buttons.push("delete");
        }
        if self.save_visible {
            buttons.push("save");
        }
        if self.cancel_visible {
            buttons.push("cancel");
        }
        if self.reset_visible {
            buttons.push("reset");
        }

        let mut submit = Vec::new();
        if self.list_enabled {
            submit.push("list");
        }
        if self.purge_enabled {
            submit.push("purge");
        }

        let join = |parts: Vec<&str>| {
            if parts.is_empty() {
                "none".to_string()
            } else {
                parts.join(", ")
            }
        };

        format!(
            "title: {}\nselector: {}\nname field: {}\nbuttons: {}\nsubmit: {}",
            self.title,
            if self.selector_enabled { "enabled" } else { "disabled" },
            if self.name_field_visible { "shown" } else { "hidden" },
            join(buttons),
            join(submit),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use insta::assert_snapshot;

    #[test]
    fn surface_for_default() {
        let surface = ControlSurface::for_state(Mode::Default, &FilterIdentity::default());
        assert_snapshot!(surface.describe(), @r"
        title: No filter
        selector: enabled
        name field: hidden
        buttons: create, reset
        submit: list, purge
        ");
    }

    #[test]
    fn surface_for_adhoc() {
        let surface = ControlSurface::for_state(Mode::Adhoc, &FilterIdentity::default());
        assert_snapshot!(surface.describe(), @r"
        title: Ad hoc filter
        selector: enabled
        name field: hidden
        buttons: create, reset
        submit: list, purge
        ");
    }

    #[test]
    fn surface_for_stored() {
        let surface = ControlSurface::for_state(Mode::Stored, &FilterIdentity::named("errors_today"));
        assert_snapshot!(surface.describe(), @r"
        title: Saved filter
        selector: enabled
        name field: hidden
        buttons: create, edit, delete, reset
        submit: list, purge
        ");
    }

    #[test]
    fn surface_for_create_and_edit_freeze_selector_and_submit() {
        for mode in [Mode::Create, Mode::Edit] {
            let surface = ControlSurface::for_state(mode, &FilterIdentity::default());
            assert!(!surface.selector_enabled);
            assert!(!surface.list_enabled);
            assert!(!surface.purge_enabled);
            assert!(surface.save_visible);
            assert!(surface.cancel_visible);
        }
    }

    #[test]
    fn surface_for_delete_filter() {
        let surface =
            ControlSurface::for_state(Mode::DeleteFilter, &FilterIdentity::named("errors_today"));
        assert_snapshot!(surface.describe(), @r"
        title: Delete filter?
        selector: disabled
        name field: hidden
        buttons: none
        submit: none
        ");
    }

    #[test]
    fn surface_depends_only_on_mode_and_identity() {
        let a = ControlSurface::for_state(Mode::Stored, &FilterIdentity::named("x"));
        let b = ControlSurface::for_state(Mode::Stored, &FilterIdentity::named("x"));
        assert_eq!(a, b);
    }
}
