use chrono::{NaiveDate, NaiveDateTime};

use super::domain::{
    Appointment, AppointmentException, AppointmentReminder, AppointmentSlot, AppointmentStatus,
};
use crate::ids::{AppointmentId, ReminderId, SlotId, UserId};
use crate::store::RepositoryError;

/// Storage abstraction for slots, exceptions, appointments and reminders.
///
/// `insert_if_free` and `update_if_free` check for an overlapping non-terminal
/// appointment of the same recipient and write in one critical section, so two
/// concurrent bookings of one window cannot both succeed. A collision is
/// reported as [`RepositoryError::Conflict`].
///
/// Writes to an existing appointment carry the status the caller read. When
/// the stored status differs, the write is refused with
/// [`RepositoryError::Stale`] and nothing changes.
pub trait AppointmentRepository: Send + Sync {
    fn insert_slot(&self, slot: AppointmentSlot) -> Result<AppointmentSlot, RepositoryError>;
    fn update_slot(&self, slot: AppointmentSlot) -> Result<(), RepositoryError>;
    fn fetch_slot(&self, id: &SlotId) -> Result<Option<AppointmentSlot>, RepositoryError>;
    fn slots_for(&self, owner: &UserId) -> Result<Vec<AppointmentSlot>, RepositoryError>;

    fn insert_exception(
        &self,
        exception: AppointmentException,
    ) -> Result<AppointmentException, RepositoryError>;
    fn exceptions_on(
        &self,
        owner: &UserId,
        date: NaiveDate,
    ) -> Result<Vec<AppointmentException>, RepositoryError>;

    fn insert_if_free(
        &self,
        appointment: Appointment,
        reminders: Vec<AppointmentReminder>,
    ) -> Result<Appointment, RepositoryError>;
    /// Persist a moved appointment and replace its reminders.
    fn update_if_free(
        &self,
        appointment: Appointment,
        expected: AppointmentStatus,
        reminders: Vec<AppointmentReminder>,
    ) -> Result<Appointment, RepositoryError>;
    /// Persist a status change. Terminal statuses drop pending reminders.
    fn update_if_status(
        &self,
        appointment: Appointment,
        expected: AppointmentStatus,
    ) -> Result<(), RepositoryError>;
    fn fetch(&self, id: &AppointmentId) -> Result<Option<Appointment>, RepositoryError>;
    /// Appointments where `user` is requester or recipient.
    fn appointments_for(&self, user: &UserId) -> Result<Vec<Appointment>, RepositoryError>;
    /// Recipient appointments overlapping `[from, to)`.
    fn agenda(
        &self,
        recipient: &UserId,
        from: NaiveDateTime,
        to: NaiveDateTime,
    ) -> Result<Vec<Appointment>, RepositoryError>;
    fn all_appointments(&self) -> Result<Vec<Appointment>, RepositoryError>;

    fn reminders_for(
        &self,
        appointment: &AppointmentId,
    ) -> Result<Vec<AppointmentReminder>, RepositoryError>;
    fn due_reminders(&self, now: NaiveDateTime) -> Result<Vec<AppointmentReminder>, RepositoryError>;
    fn mark_reminder_sent(&self, id: &ReminderId) -> Result<(), RepositoryError>;
}
