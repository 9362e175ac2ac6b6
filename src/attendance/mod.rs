//! Attendance state machine.
//!
//! Governs one worker's daily clock-in/clock-out lifecycle: schedule
//! conformance, no-show locks, discipline escalation and the exception
//! requests administrators resolve.
//!
//! The pure core is [`apply_transition`]; [`clock_in`], [`clock_out`] and the
//! review functions wrap it with a repository read and a single commit.

mod board;
mod clock;
mod review;
mod schedule;
mod submissions;
mod toggle;
mod transition;

pub use board::{AdminBoard, admin_board};
pub use clock::{clock_in, clock_out, record_event};
pub use review::{
    ApprovalEffect, ReviewOutcome, approve_request, archive_view, clear_discipline,
    reject_request, restore_request,
};
pub use schedule::{ScheduleSource, ScheduledShift, resolve_scheduled_shift, scheduled_shift};
pub use submissions::{
    EDITABLE_PROFILE_FIELDS, ExpenseClaimForm, ProfileEditForm, TimeCorrectionForm,
    submit_expense_claim, submit_profile_edit, submit_time_correction,
};
pub use toggle::{ToggleResult, toggle_or_create_exception_request};
pub use transition::{
    AttendanceEvent, ClockInOutcome, ClockOutOutcome, Transition, TransitionOutcome,
    WorkerSnapshot, apply_transition, clock_in_transition, clock_out_transition,
};
