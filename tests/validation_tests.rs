mod common;

use common::*;
use logsieve::form::{Effect, Field, FormEvent, Mode, NoticeKind, Severity};

// --- numeric fields ---

#[test]
fn zero_is_rejected_with_its_own_message() {
    let mut session = create_session();
    match set_field(&mut session, Field::TimeRange, "0") {
        Effect::Notice(notice) => {
            assert_eq!(notice.kind, NoticeKind::Warning);
            assert!(notice.message.contains("zero"));
        }
        other => panic!("expected a warning, got {other:?}"),
    }
    match set_field(&mut session, Field::TimeRange, "abc") {
        Effect::Notice(notice) => {
            assert!(notice.message.contains("positive whole number"));
        }
        other => panic!("expected a warning, got {other:?}"),
    }
    // Rejected input never reaches the criteria or the mode.
    assert!(session.criteria.time_range.is_none());
    assert_eq!(session.mode.mode, Mode::Default);
}

#[test]
fn time_range_clears_the_absolute_window() {
    let mut session = create_session();
    set_field(&mut session, Field::FromDate, "2026-08-01");
    set_field(&mut session, Field::ToDate, "2026-08-05");
    assert!(session.criteria.time_from.is_some());

    set_field(&mut session, Field::TimeRange, "3600");
    assert_eq!(session.criteria.time_range, Some(3600));
    assert!(session.criteria.time_from.is_none());
    assert!(session.criteria.time_to.is_none());

    // And the other way around.
    set_field(&mut session, Field::FromDate, "2026-08-01");
    assert!(session.criteria.time_range.is_none());
}

// --- URL fields ---

#[test]
fn location_gets_one_scheme_correction() {
    let mut session = create_session();
    set_field(&mut session, Field::Location, "example.com/admin");
    assert_eq!(
        session.criteria.location.as_deref(),
        Some("http://example.com/admin")
    );

    match set_field(&mut session, Field::Location, "not a url") {
        Effect::Notice(notice) => assert_eq!(notice.kind, NoticeKind::Warning),
        other => panic!("expected a warning, got {other:?}"),
    }
    // The last good value stays.
    assert_eq!(
        session.criteria.location.as_deref(),
        Some("http://example.com/admin")
    );
}

#[test]
fn referer_accepts_the_none_sentinel() {
    let mut session = create_session();
    set_field(&mut session, Field::Referer, "none");
    assert_eq!(session.criteria.referer.as_deref(), Some("none"));
}

// --- date/time pair ---

#[test]
fn window_violation_clears_the_edited_side_and_warns() {
    let mut session = create_session();
    set_field(&mut session, Field::FromDate, "2026-08-10");
    match set_field(&mut session, Field::ToDate, "2026-08-06") {
        Effect::Notice(notice) => {
            assert_eq!(notice.kind, NoticeKind::Warning);
            assert!(notice.message.contains("cleared"));
        }
        other => panic!("expected a warning, got {other:?}"),
    }
    // The offending side was cleared, never swapped.
    assert!(session.criteria.time_from.is_some());
    assert!(session.criteria.time_to.is_none());
    assert!(session.window.to_date.is_none());
}

#[test]
fn editing_from_after_to_clears_from() {
    let mut session = create_session();
    set_field(&mut session, Field::ToDate, "2026-08-06");
    set_field(&mut session, Field::FromDate, "2026-08-10");
    assert!(session.criteria.time_from.is_none());
    assert!(session.criteria.time_to.is_some());
}

#[test]
fn same_day_window_extends_to_end_of_day() {
    let mut session = create_session();
    set_field(&mut session, Field::FromDate, "2026-08-06");
    set_field(&mut session, Field::ToDate, "2026-08-06");
    let from = session.criteria.time_from.unwrap();
    let to = session.criteria.time_to.unwrap();
    assert_eq!(to - from, 86_399);
}

#[test]
fn all_three_date_layouts_agree() {
    let mut a = create_session();
    let mut b = create_session();
    let mut c = create_session();
    set_field(&mut a, Field::FromDate, "2025-12-24");
    set_field(&mut b, Field::FromDate, "12-24-2025");
    set_field(&mut c, Field::FromDate, "24.12.2025");
    assert_eq!(a.criteria.time_from, b.criteria.time_from);
    assert_eq!(b.criteria.time_from, c.criteria.time_from);
}

#[test]
fn impossible_dates_are_rejected_at_entry() {
    let mut session = create_session();
    match set_field(&mut session, Field::FromDate, "2025-02-29") {
        Effect::Notice(notice) => {
            assert_eq!(notice.kind, NoticeKind::Warning);
            assert!(notice.message.contains("calendar"));
        }
        other => panic!("expected a warning, got {other:?}"),
    }
    assert!(session.window.from_date.is_none());
    assert_eq!(session.mode.mode, Mode::Default);
}

#[test]
fn time_of_day_composes_into_the_timestamp() {
    let mut session = create_session();
    set_field(&mut session, Field::FromDate, "2026-08-06");
    set_field(&mut session, Field::FromTime, "09:30");
    set_field(&mut session, Field::ToDate, "2026-08-06");
    set_field(&mut session, Field::ToTime, "10:30:30");
    let from = session.criteria.time_from.unwrap();
    let to = session.criteria.time_to.unwrap();
    assert_eq!(to - from, 3_630);
}

// --- exclusivity groups ---

#[test]
fn severity_is_exactly_any_or_a_nonempty_subset() {
    let mut session = create_session();
    assert!(session.criteria.severity.is_any());

    feed(
        &mut session,
        FormEvent::Severity {
            level: Severity::Error,
            checked: true,
        },
    );
    assert!(!session.criteria.severity.is_any());

    feed(
        &mut session,
        FormEvent::Severity {
            level: Severity::Error,
            checked: false,
        },
    );
    // Unchecking the last level restores "any"; never empty-and-some.
    assert!(session.criteria.severity.is_any());
}

#[test]
fn checking_any_discards_the_specific_levels() {
    let mut session = create_session();
    feed(
        &mut session,
        FormEvent::Severity {
            level: Severity::Warning,
            checked: true,
        },
    );
    feed(&mut session, FormEvent::SeverityAny { checked: true });
    assert!(session.criteria.severity.is_any());
}

#[test]
fn type_tags_share_the_any_some_exclusivity() {
    let mut session = create_session();
    feed(
        &mut session,
        FormEvent::Type {
            tag: "php".to_string(),
            checked: true,
        },
    );
    assert!(!session.criteria.types.is_any());
    feed(
        &mut session,
        FormEvent::Type {
            tag: "php".to_string(),
            checked: false,
        },
    );
    assert!(session.criteria.types.is_any());
}

// --- machine names ---

#[test]
fn typed_names_convert_to_machine_form() {
    let mut session = create_editor_session(&[]);
    feed(&mut session, FormEvent::Create);
    set_field(&mut session, Field::Name, "Admin Errors");
    assert_eq!(session.mode.identity.name, "admin_errors");

    set_field(&mut session, Field::Name, "Café-Crème");
    assert_eq!(session.mode.identity.name, "cafe_creme");
}

#[test]
fn save_rejects_reserved_and_taken_names() {
    let mut session = create_editor_session(&["admin_errors"]);
    feed(&mut session, FormEvent::Create);

    set_field(&mut session, Field::Name, "adhoc");
    match feed(&mut session, FormEvent::Save) {
        Effect::Notice(notice) => assert!(notice.message.contains("reserved")),
        other => panic!("expected a warning, got {other:?}"),
    }

    set_field(&mut session, Field::Name, "Admin Errors");
    match feed(&mut session, FormEvent::Save) {
        Effect::Notice(notice) => assert!(notice.message.contains("already exists")),
        other => panic!("expected a warning, got {other:?}"),
    }
    // Still composing; nothing was sent.
    assert_eq!(session.mode.mode, Mode::Create);
    assert!(!session.guard.is_busy());
}

#[test]
fn save_rejects_too_short_names() {
    let mut session = create_editor_session(&[]);
    feed(&mut session, FormEvent::Create);
    set_field(&mut session, Field::Name, "x");
    match feed(&mut session, FormEvent::Save) {
        Effect::Notice(notice) => assert!(notice.message.contains("at least 2")),
        other => panic!("expected a warning, got {other:?}"),
    }
}
