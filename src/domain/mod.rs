//! Domain rules module
//!
//! Pure business rules for the event lifecycle and participation admission.
//! Everything here operates on plain data records so the rules stay
//! unit-testable without a database.

pub mod admission;
pub mod lifecycle;

pub use admission::{admit_batch, admit_single, cancel_own_request, BatchOutcome, SingleAdmission};
pub use lifecycle::{
    admin_transition, apply_field_updates, user_transition, validate_event_date,
    validate_new_event, validate_update_fields, LeadTimes, Transition,
};
