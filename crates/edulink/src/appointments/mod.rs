//! Appointment scheduling: availability slots, exceptions, the availability
//! resolver, the appointment lifecycle and reminders.

pub mod availability;
pub mod domain;
pub mod lifecycle;
pub mod reminders;
pub mod repository;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use availability::{AvailabilityResolver, DaySchedule, MAX_HORIZON_DAYS};
pub use domain::{
    weekday_index, Appointment, AppointmentException, AppointmentReminder, AppointmentRequest,
    AppointmentSlot, AppointmentStatus, AvailableSlot, CancelRequest, ExceptionDraft,
    NextAvailable, RescheduleRequest, SlotDraft, MAX_DURATION_MINUTES,
};
pub use lifecycle::{Action, Party};
pub use repository::AppointmentRepository;
pub use router::appointment_router;
pub use service::AppointmentService;

use chrono::NaiveDateTime;

use crate::auth::AccessDenied;
use crate::store::RepositoryError;
use crate::validation::ValidationErrors;

#[derive(Debug, thiserror::Error)]
pub enum AppointmentError {
    #[error(transparent)]
    Validation(#[from] ValidationErrors),
    #[error("appointment not found")]
    NotFound,
    #[error("slot not found")]
    SlotNotFound,
    #[error("recipient not found")]
    RecipientNotFound,
    #[error("requested time is outside the recipient's availability")]
    Unavailable,
    #[error("requested time collides with another appointment")]
    DoubleBooked,
    #[error("cannot {action} an appointment that is {from}")]
    InvalidTransition {
        from: &'static str,
        action: &'static str,
    },
    #[error(transparent)]
    Forbidden(#[from] AccessDenied),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Shared window checks for new and moved appointments.
pub(crate) fn validate_window(
    schedule_time: NaiveDateTime,
    duration_minutes: u32,
    now: NaiveDateTime,
) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();
    errors.check(
        duration_minutes == 0,
        "duration_minutes",
        "duration must be positive",
    );
    errors.check(
        duration_minutes > MAX_DURATION_MINUTES,
        "duration_minutes",
        "duration must not exceed 8 hours",
    );
    errors.check(
        schedule_time <= now,
        "schedule_time",
        "appointments must be scheduled in the future",
    );
    errors.into_result()
}
