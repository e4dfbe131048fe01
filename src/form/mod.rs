// Form controller state: criteria model, mode state machine, control
// surface, and the guard flags, composed into one injectable session.

pub mod criteria;
pub mod event;
pub mod guard;
pub mod mode;
pub mod session;
pub mod surface;

pub use criteria::{
    Criteria, OrderBy, OrderField, Severity, SeveritySelection, SortDirection, TypeSelection, Who,
};
pub use event::{
    ConfirmPrompt, Effect, Field, FormEvent, Notice, NoticeKind, PendingAction, PurgeScope,
    Recovery, Submission,
};
pub use guard::SubmitGuard;
pub use mode::{FilterIdentity, Mode, ModeState};
pub use session::{FormSession, Inflight};
pub use surface::ControlSurface;
