use std::sync::Arc;

use chrono::{Duration, NaiveDate, NaiveDateTime};
use tracing::{debug, info};

use super::availability::{AvailabilityResolver, DaySchedule, MAX_HORIZON_DAYS};
use super::domain::{
    Appointment, AppointmentException, AppointmentRequest, AppointmentSlot, AppointmentStatus,
    AvailableSlot, ExceptionDraft, NextAvailable, RescheduleRequest, SlotDraft,
};
use super::lifecycle::{Action, Party};
use super::reminders;
use super::repository::AppointmentRepository;
use super::{validate_window, AppointmentError};
use crate::accounts::AccountRepository;
use crate::auth::{AccessDenied, Actor};
use crate::config::SchedulingConfig;
use crate::ids::{AppointmentId, ExceptionId, SlotId, UserId};
use crate::notifications::{notify_best_effort, Notification, NotificationKind, Notifier};
use crate::store::RepositoryError;
use crate::validation::ValidationErrors;

/// Scheduling service: slots and exceptions, availability queries, bookings,
/// lifecycle transitions and reminder dispatch.
pub struct AppointmentService<R, U, N> {
    repository: Arc<R>,
    accounts: Arc<U>,
    notifier: Arc<N>,
    resolver: AvailabilityResolver,
    reminder_offsets: Vec<u32>,
}

impl<R, U, N> AppointmentService<R, U, N>
where
    R: AppointmentRepository + 'static,
    U: AccountRepository + 'static,
    N: Notifier + 'static,
{
    pub fn new(
        repository: Arc<R>,
        accounts: Arc<U>,
        notifier: Arc<N>,
        config: &SchedulingConfig,
    ) -> Self {
        Self {
            repository,
            accounts,
            notifier,
            resolver: AvailabilityResolver::from_config(config),
            reminder_offsets: config.reminder_offsets.clone(),
        }
    }

    pub fn resolver(&self) -> &AvailabilityResolver {
        &self.resolver
    }

    pub fn create_slot(
        &self,
        actor: &Actor,
        draft: SlotDraft,
        now: NaiveDateTime,
    ) -> Result<AppointmentSlot, AppointmentError> {
        actor.require_verified_staff("offer appointment slots")?;
        draft.validate()?;
        let slot = self.repository.insert_slot(AppointmentSlot {
            id: SlotId::new(),
            owner: actor.user_id,
            day_of_week: draft.day_of_week,
            start_time: draft.start_time,
            end_time: draft.end_time,
            recurring: draft.recurring,
            start_date: draft.start_date,
            end_date: draft.end_date,
            active: true,
            created_at: now,
        })?;
        info!(slot_id = %slot.id, owner = %slot.owner, day = slot.day_of_week, "slot created");
        Ok(slot)
    }

    /// Slots of `owner`. Other users only see active ones.
    pub fn slots_for(
        &self,
        viewer: &Actor,
        owner: &UserId,
    ) -> Result<Vec<AppointmentSlot>, AppointmentError> {
        let mut slots: Vec<AppointmentSlot> = self
            .repository
            .slots_for(owner)?
            .into_iter()
            .filter(|slot| slot.active || viewer.user_id == *owner)
            .collect();
        slots.sort_by(|a, b| {
            (a.day_of_week, a.start_time).cmp(&(b.day_of_week, b.start_time))
        });
        Ok(slots)
    }

    pub fn deactivate_slot(
        &self,
        actor: &Actor,
        slot: &SlotId,
    ) -> Result<AppointmentSlot, AppointmentError> {
        let mut slot = self
            .repository
            .fetch_slot(slot)?
            .ok_or(AppointmentError::SlotNotFound)?;
        if slot.owner != actor.user_id {
            return Err(AccessDenied("only the owner may remove a slot".to_string()).into());
        }
        slot.active = false;
        self.repository.update_slot(slot.clone())?;
        info!(slot_id = %slot.id, "slot deactivated");
        Ok(slot)
    }

    pub fn add_exception(
        &self,
        actor: &Actor,
        draft: ExceptionDraft,
        now: NaiveDateTime,
    ) -> Result<AppointmentException, AppointmentError> {
        actor.require_verified_staff("manage availability")?;
        draft.validate()?;
        let (start_time, end_time) = if draft.all_day {
            (None, None)
        } else {
            (draft.start_time, draft.end_time)
        };
        let exception = self.repository.insert_exception(AppointmentException {
            id: ExceptionId::new(),
            owner: actor.user_id,
            date: draft.date,
            start_time,
            end_time,
            all_day: draft.all_day,
            reason: draft
                .reason
                .map(|reason| reason.trim().to_string())
                .filter(|reason| !reason.is_empty()),
            created_at: now,
        })?;
        info!(
            exception_id = %exception.id,
            date = %exception.date,
            all_day = exception.all_day,
            "availability exception added"
        );
        Ok(exception)
    }

    pub fn availability(
        &self,
        recipient: &UserId,
        date: NaiveDate,
        now: NaiveDateTime,
    ) -> Result<Vec<AvailableSlot>, AppointmentError> {
        let schedule = self.day_schedule(recipient, date, None)?;
        Ok(self.resolver.resolve(&schedule, date, now))
    }

    pub fn next_available(
        &self,
        recipient: &UserId,
        from: Option<NaiveDate>,
        horizon_days: Option<u32>,
        now: NaiveDateTime,
    ) -> Result<Option<NextAvailable>, AppointmentError> {
        if let Some(days) = horizon_days {
            let mut errors = ValidationErrors::new();
            errors.check(
                days == 0 || days > MAX_HORIZON_DAYS,
                "horizon_days",
                "horizon must be between 1 and 365 days",
            );
            errors.into_result()?;
        }
        let from = from.unwrap_or_else(|| now.date());
        let found = self.resolver.next_available(from, horizon_days, now, |date| {
            self.day_schedule(recipient, date, None)
        })?;
        Ok(found)
    }

    /// Book time with `recipient`; the window must sit inside their bookable
    /// increments and must not collide with another live appointment.
    pub fn request(
        &self,
        actor: &Actor,
        request: AppointmentRequest,
        now: NaiveDateTime,
    ) -> Result<Appointment, AppointmentError> {
        let mut errors = ValidationErrors::new();
        errors.check(
            request.recipient == actor.user_id,
            "recipient",
            "you cannot book an appointment with yourself",
        );
        if let Err(window) = validate_window(request.schedule_time, request.duration_minutes, now) {
            errors.merge(window);
        }
        let subject = request.subject.trim().to_string();
        errors.check(
            subject.chars().count() > 200,
            "subject",
            "ensure this field has at most 200 characters",
        );
        let notes = request
            .notes
            .map(|notes| notes.trim().to_string())
            .filter(|notes| !notes.is_empty());
        errors.check(
            notes.as_ref().map_or(false, |notes| notes.chars().count() > 2000),
            "notes",
            "ensure this field has at most 2000 characters",
        );
        errors.into_result()?;

        let recipient = self
            .accounts
            .fetch(&request.recipient)?
            .filter(|user| user.is_active)
            .ok_or(AppointmentError::RecipientNotFound)?;

        let appointment = Appointment::pending(
            actor.user_id,
            recipient.id,
            request.schedule_time,
            request.duration_minutes,
            if subject.is_empty() { "Appointment".to_string() } else { subject },
            notes,
            now,
        );
        let schedule = self.day_schedule(&recipient.id, appointment.schedule_time.date(), None)?;
        if !self
            .resolver
            .covers(&schedule, appointment.schedule_time, appointment.end_time, now)
        {
            debug!(recipient = %recipient.id, start = %appointment.schedule_time, "booking outside availability");
            return Err(AppointmentError::Unavailable);
        }

        let planned = reminders::plan(&appointment, &self.reminder_offsets, now);
        let stored = match self.repository.insert_if_free(appointment, planned) {
            Ok(stored) => stored,
            Err(RepositoryError::Conflict) => return Err(AppointmentError::DoubleBooked),
            Err(other) => return Err(other.into()),
        };
        info!(
            appointment_id = %stored.id,
            requester = %stored.requester,
            recipient = %stored.recipient,
            start = %stored.schedule_time,
            "appointment requested"
        );
        self.notify(
            stored.recipient,
            format!(
                "New appointment request for {}",
                stored.schedule_time.format("%Y-%m-%d %H:%M")
            ),
            now,
        );
        Ok(stored)
    }

    pub fn confirm(
        &self,
        actor: &Actor,
        id: &AppointmentId,
        now: NaiveDateTime,
    ) -> Result<Appointment, AppointmentError> {
        self.act(actor, id, Action::Confirm, None, now)
    }

    pub fn complete(
        &self,
        actor: &Actor,
        id: &AppointmentId,
        now: NaiveDateTime,
    ) -> Result<Appointment, AppointmentError> {
        self.act(actor, id, Action::Complete, None, now)
    }

    pub fn mark_no_show(
        &self,
        actor: &Actor,
        id: &AppointmentId,
        now: NaiveDateTime,
    ) -> Result<Appointment, AppointmentError> {
        self.act(actor, id, Action::NoShow, None, now)
    }

    pub fn cancel(
        &self,
        actor: &Actor,
        id: &AppointmentId,
        reason: Option<String>,
        now: NaiveDateTime,
    ) -> Result<Appointment, AppointmentError> {
        self.act(actor, id, Action::Cancel, reason, now)
    }

    pub fn reschedule(
        &self,
        actor: &Actor,
        id: &AppointmentId,
        request: RescheduleRequest,
        now: NaiveDateTime,
    ) -> Result<Appointment, AppointmentError> {
        let mut appointment = self.load(id)?;
        let party = Party::of(&appointment, &actor.user_id)?;
        let from = appointment.status;
        appointment.reschedule(party, request.schedule_time, request.duration_minutes, now)?;

        let schedule = self.day_schedule(
            &appointment.recipient,
            appointment.schedule_time.date(),
            Some(appointment.id),
        )?;
        if !self
            .resolver
            .covers(&schedule, appointment.schedule_time, appointment.end_time, now)
        {
            return Err(AppointmentError::Unavailable);
        }

        let planned = reminders::plan(&appointment, &self.reminder_offsets, now);
        let stored = match self.repository.update_if_free(appointment, from, planned) {
            Ok(stored) => stored,
            Err(RepositoryError::Conflict) => return Err(AppointmentError::DoubleBooked),
            Err(RepositoryError::Stale) => return Err(self.superseded(id, Action::Reschedule)),
            Err(RepositoryError::NotFound) => return Err(AppointmentError::NotFound),
            Err(other) => return Err(other.into()),
        };
        info!(
            appointment_id = %stored.id,
            start = %stored.schedule_time,
            end = %stored.end_time,
            "appointment rescheduled"
        );
        self.notify(
            stored.counterpart(&actor.user_id),
            format!(
                "Appointment moved to {}",
                stored.schedule_time.format("%Y-%m-%d %H:%M")
            ),
            now,
        );
        Ok(stored)
    }

    /// Participants and administrators may read an appointment.
    pub fn get(&self, actor: &Actor, id: &AppointmentId) -> Result<Appointment, AppointmentError> {
        let appointment = self.load(id)?;
        if !appointment.involves(&actor.user_id) && !actor.is_admin() {
            return Err(AccessDenied("only participants may view an appointment".to_string()).into());
        }
        Ok(appointment)
    }

    pub fn list_for(
        &self,
        actor: &Actor,
        status: Option<AppointmentStatus>,
    ) -> Result<Vec<Appointment>, AppointmentError> {
        let mut appointments: Vec<Appointment> = self
            .repository
            .appointments_for(&actor.user_id)?
            .into_iter()
            .filter(|appointment| status.map_or(true, |status| appointment.status == status))
            .collect();
        appointments.sort_by(|a, b| a.schedule_time.cmp(&b.schedule_time));
        Ok(appointments)
    }

    /// Send every reminder due at `now` to both participants and mark it sent.
    pub fn dispatch_due_reminders(&self, now: NaiveDateTime) -> Result<usize, AppointmentError> {
        let mut sent = 0;
        for reminder in self.repository.due_reminders(now)? {
            if let Some(appointment) = self.repository.fetch(&reminder.appointment)? {
                if !appointment.status.is_terminal() {
                    let message = format!(
                        "Reminder: \"{}\" starts {}",
                        appointment.subject,
                        reminders::describe_lead(reminder.minutes_before)
                    );
                    self.notify(appointment.requester, message.clone(), now);
                    self.notify(appointment.recipient, message, now);
                    sent += 1;
                }
            }
            self.repository.mark_reminder_sent(&reminder.id)?;
        }
        if sent > 0 {
            info!(sent, "appointment reminders dispatched");
        }
        Ok(sent)
    }

    fn act(
        &self,
        actor: &Actor,
        id: &AppointmentId,
        action: Action,
        reason: Option<String>,
        now: NaiveDateTime,
    ) -> Result<Appointment, AppointmentError> {
        let mut appointment = self.load(id)?;
        let party = Party::of(&appointment, &actor.user_id)?;
        let from = appointment.status;
        if let Err(err) = appointment.transition(party, action, reason, now) {
            debug!(appointment_id = %id, action = action.label(), from = from.label(), "transition rejected");
            return Err(err);
        }
        match self.repository.update_if_status(appointment.clone(), from) {
            Ok(()) => {}
            Err(RepositoryError::Stale) => return Err(self.superseded(id, action)),
            Err(RepositoryError::NotFound) => return Err(AppointmentError::NotFound),
            Err(other) => return Err(other.into()),
        }
        info!(
            appointment_id = %id,
            from = from.label(),
            to = appointment.status.label(),
            "appointment status changed"
        );
        self.notify(
            appointment.counterpart(&actor.user_id),
            format!(
                "Appointment on {} is now {}",
                appointment.schedule_time.format("%Y-%m-%d %H:%M"),
                appointment.status.label()
            ),
            now,
        );
        Ok(appointment)
    }

    /// The appointment moved on between our read and our write; report the
    /// transition against the status it holds now.
    fn superseded(&self, id: &AppointmentId, action: Action) -> AppointmentError {
        match self.load(id) {
            Ok(current) => {
                debug!(
                    appointment_id = %id,
                    action = action.label(),
                    status = current.status.label(),
                    "appointment changed concurrently"
                );
                AppointmentError::InvalidTransition {
                    from: current.status.label(),
                    action: action.label(),
                }
            }
            Err(err) => err,
        }
    }

    fn day_schedule(
        &self,
        recipient: &UserId,
        date: NaiveDate,
        exclude: Option<AppointmentId>,
    ) -> Result<DaySchedule, RepositoryError> {
        let from = date.and_time(chrono::NaiveTime::MIN);
        let to = from + Duration::days(1);
        let appointments = self
            .repository
            .agenda(recipient, from, to)?
            .into_iter()
            .filter(|appointment| Some(appointment.id) != exclude)
            .collect();
        Ok(DaySchedule {
            slots: self.repository.slots_for(recipient)?,
            exceptions: self.repository.exceptions_on(recipient, date)?,
            appointments,
        })
    }

    fn load(&self, id: &AppointmentId) -> Result<Appointment, AppointmentError> {
        self.repository
            .fetch(id)?
            .ok_or(AppointmentError::NotFound)
    }

    fn notify(&self, recipient: UserId, message: String, now: NaiveDateTime) {
        notify_best_effort(
            self.notifier.as_ref(),
            Notification::new(recipient, NotificationKind::Appointment, message, now),
        );
    }
}
