//! Appointment status transitions and who may trigger them.

use chrono::NaiveDateTime;
use serde::Serialize;

use super::domain::{end_of, Appointment, AppointmentStatus};
use super::AppointmentError;
use crate::auth::AccessDenied;
use crate::ids::UserId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Party {
    Requester,
    Recipient,
}

impl Party {
    pub fn of(appointment: &Appointment, user: &UserId) -> Result<Self, AccessDenied> {
        if appointment.recipient == *user {
            Ok(Self::Recipient)
        } else if appointment.requester == *user {
            Ok(Self::Requester)
        } else {
            Err(AccessDenied(
                "only participants may change an appointment".to_string(),
            ))
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Confirm,
    Complete,
    Cancel,
    NoShow,
    Reschedule,
}

impl Action {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Confirm => "confirm",
            Self::Complete => "complete",
            Self::Cancel => "cancel",
            Self::NoShow => "no_show",
            Self::Reschedule => "reschedule",
        }
    }

    pub const fn target(self) -> AppointmentStatus {
        match self {
            Self::Confirm => AppointmentStatus::Confirmed,
            Self::Complete => AppointmentStatus::Completed,
            Self::Cancel => AppointmentStatus::Cancelled,
            Self::NoShow => AppointmentStatus::NoShow,
            Self::Reschedule => AppointmentStatus::Rescheduled,
        }
    }

    const fn recipient_only(self) -> bool {
        matches!(self, Self::Confirm | Self::Complete | Self::NoShow)
    }

    /// Source statuses from which the action is legal.
    pub const fn allowed_from(self, status: AppointmentStatus) -> bool {
        use AppointmentStatus::*;
        match self {
            Self::Confirm => matches!(status, Pending | Rescheduled),
            Self::Complete | Self::NoShow => matches!(status, Confirmed | Rescheduled),
            Self::Cancel | Self::Reschedule => matches!(status, Pending | Confirmed | Rescheduled),
        }
    }
}

/// Validate `action` for `party` against the appointment's current status.
pub fn check(
    appointment: &Appointment,
    party: Party,
    action: Action,
) -> Result<AppointmentStatus, AppointmentError> {
    if action.recipient_only() && party != Party::Recipient {
        return Err(AccessDenied(format!(
            "only the recipient may {} an appointment",
            action.label()
        ))
        .into());
    }
    if !action.allowed_from(appointment.status) {
        return Err(AppointmentError::InvalidTransition {
            from: appointment.status.label(),
            action: action.label(),
        });
    }
    Ok(action.target())
}

impl Appointment {
    /// Apply a status-only transition (everything except reschedule).
    pub fn transition(
        &mut self,
        party: Party,
        action: Action,
        reason: Option<String>,
        now: NaiveDateTime,
    ) -> Result<(), AppointmentError> {
        let next = check(self, party, action)?;
        if action == Action::Reschedule {
            return Err(AppointmentError::InvalidTransition {
                from: self.status.label(),
                action: action.label(),
            });
        }
        self.status = next;
        if action == Action::Cancel {
            self.cancellation_reason = reason
                .map(|reason| reason.trim().to_string())
                .filter(|reason| !reason.is_empty());
        }
        self.updated_at = now;
        Ok(())
    }

    /// Move the appointment and recompute `end_time = new_start + duration`.
    pub fn reschedule(
        &mut self,
        party: Party,
        schedule_time: NaiveDateTime,
        duration_minutes: Option<u32>,
        now: NaiveDateTime,
    ) -> Result<(), AppointmentError> {
        let next = check(self, party, Action::Reschedule)?;
        let duration = duration_minutes.unwrap_or(self.duration_minutes);
        super::validate_window(schedule_time, duration, now)?;
        self.status = next;
        self.schedule_time = schedule_time;
        self.duration_minutes = duration;
        self.end_time = end_of(schedule_time, duration);
        self.updated_at = now;
        Ok(())
    }
}
