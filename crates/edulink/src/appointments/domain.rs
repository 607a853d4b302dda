use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::ids::{AppointmentId, ExceptionId, ReminderId, SlotId, UserId};
use crate::timefmt::{hhmm, hhmm_option};
use crate::validation::ValidationErrors;

/// Longest bookable appointment, in minutes.
pub const MAX_DURATION_MINUTES: u32 = 8 * 60;

/// Day of week with Monday = 0, as stored on slots.
pub fn weekday_index(date: NaiveDate) -> u8 {
    date.weekday().num_days_from_monday() as u8
}

/// A weekly availability window owned by the appointment recipient.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppointmentSlot {
    pub id: SlotId,
    pub owner: UserId,
    pub day_of_week: u8,
    #[serde(with = "hhmm")]
    pub start_time: NaiveTime,
    #[serde(with = "hhmm")]
    pub end_time: NaiveTime,
    pub recurring: bool,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub active: bool,
    pub created_at: NaiveDateTime,
}

impl AppointmentSlot {
    /// Whether the slot applies on `date`: active, same weekday, inside its range.
    ///
    /// Non-recurring slots always carry both bounds; recurring slots honour any
    /// bound that is present.
    pub fn is_available(&self, date: NaiveDate) -> bool {
        if !self.active || weekday_index(date) != self.day_of_week {
            return false;
        }
        if !self.recurring && (self.start_date.is_none() || self.end_date.is_none()) {
            return false;
        }
        let after_start = self.start_date.map_or(true, |start| date >= start);
        let before_end = self.end_date.map_or(true, |end| date <= end);
        after_start && before_end
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SlotDraft {
    pub day_of_week: u8,
    #[serde(with = "hhmm")]
    pub start_time: NaiveTime,
    #[serde(with = "hhmm")]
    pub end_time: NaiveTime,
    #[serde(default = "default_recurring")]
    pub recurring: bool,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
}

fn default_recurring() -> bool {
    true
}

impl SlotDraft {
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.check(
            self.day_of_week > 6,
            "day_of_week",
            "day of week must be between 0 (Monday) and 6 (Sunday)",
        );
        errors.check(
            self.end_time <= self.start_time,
            "end_time",
            "end time must be after start time",
        );
        if let (Some(start), Some(end)) = (self.start_date, self.end_date) {
            errors.check(end < start, "end_date", "end date must not precede start date");
        }
        if !self.recurring {
            errors.check(
                self.start_date.is_none(),
                "start_date",
                "a one-off slot needs a start date",
            );
            errors.check(
                self.end_date.is_none(),
                "end_date",
                "a one-off slot needs an end date",
            );
        }
        errors.into_result()
    }
}

/// Date-specific unavailability overriding the owner's slots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppointmentException {
    pub id: ExceptionId,
    pub owner: UserId,
    pub date: NaiveDate,
    #[serde(default, with = "hhmm_option")]
    pub start_time: Option<NaiveTime>,
    #[serde(default, with = "hhmm_option")]
    pub end_time: Option<NaiveTime>,
    pub all_day: bool,
    pub reason: Option<String>,
    pub created_at: NaiveDateTime,
}

impl AppointmentException {
    /// Whether the exception removes the `[start, end)` window on its date.
    pub fn blocks(&self, start: NaiveTime, end: NaiveTime) -> bool {
        if self.all_day {
            return true;
        }
        match (self.start_time, self.end_time) {
            (Some(from), Some(to)) => start < to && from < end,
            _ => false,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExceptionDraft {
    pub date: NaiveDate,
    #[serde(default, with = "hhmm_option")]
    pub start_time: Option<NaiveTime>,
    #[serde(default, with = "hhmm_option")]
    pub end_time: Option<NaiveTime>,
    #[serde(default)]
    pub all_day: bool,
    #[serde(default)]
    pub reason: Option<String>,
}

impl ExceptionDraft {
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if !self.all_day {
            match (self.start_time, self.end_time) {
                (Some(start), Some(end)) => {
                    errors.check(end <= start, "end_time", "end time must be after start time")
                }
                _ => errors.add(
                    "start_time",
                    "a partial exception needs both a start and an end time",
                ),
            }
        }
        errors.into_result()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    Pending,
    Confirmed,
    Rescheduled,
    Cancelled,
    Completed,
    NoShow,
}

impl AppointmentStatus {
    pub const fn ordered() -> [Self; 6] {
        [
            Self::Pending,
            Self::Confirmed,
            Self::Rescheduled,
            Self::Cancelled,
            Self::Completed,
            Self::NoShow,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Rescheduled => "rescheduled",
            Self::Cancelled => "cancelled",
            Self::Completed => "completed",
            Self::NoShow => "no_show",
        }
    }

    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Cancelled | Self::Completed | Self::NoShow)
    }

    /// Statuses that remove time from the recipient's published availability.
    pub const fn occupies_availability(self) -> bool {
        matches!(self, Self::Confirmed | Self::Rescheduled)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Appointment {
    pub id: AppointmentId,
    pub requester: UserId,
    pub recipient: UserId,
    pub schedule_time: NaiveDateTime,
    pub duration_minutes: u32,
    pub end_time: NaiveDateTime,
    pub status: AppointmentStatus,
    pub subject: String,
    pub notes: Option<String>,
    pub cancellation_reason: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Appointment {
    /// Build a pending appointment; `end_time` is derived from the duration.
    pub fn pending(
        requester: UserId,
        recipient: UserId,
        schedule_time: NaiveDateTime,
        duration_minutes: u32,
        subject: String,
        notes: Option<String>,
        now: NaiveDateTime,
    ) -> Self {
        Self {
            id: AppointmentId::new(),
            requester,
            recipient,
            schedule_time,
            duration_minutes,
            end_time: end_of(schedule_time, duration_minutes),
            status: AppointmentStatus::Pending,
            subject,
            notes,
            cancellation_reason: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn overlaps(&self, start: NaiveDateTime, end: NaiveDateTime) -> bool {
        self.schedule_time < end && start < self.end_time
    }

    pub fn involves(&self, user: &UserId) -> bool {
        self.requester == *user || self.recipient == *user
    }

    /// The other participant, from `user`'s point of view.
    pub fn counterpart(&self, user: &UserId) -> UserId {
        if self.requester == *user {
            self.recipient
        } else {
            self.requester
        }
    }
}

pub(crate) fn end_of(start: NaiveDateTime, duration_minutes: u32) -> NaiveDateTime {
    start + Duration::minutes(i64::from(duration_minutes))
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppointmentRequest {
    pub recipient: UserId,
    pub schedule_time: NaiveDateTime,
    pub duration_minutes: u32,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RescheduleRequest {
    pub schedule_time: NaiveDateTime,
    #[serde(default)]
    pub duration_minutes: Option<u32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CancelRequest {
    #[serde(default)]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppointmentReminder {
    pub id: ReminderId,
    pub appointment: AppointmentId,
    pub minutes_before: u32,
    pub remind_at: NaiveDateTime,
    pub sent: bool,
}

/// One bookable increment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct AvailableSlot {
    #[serde(with = "hhmm")]
    pub start: NaiveTime,
    #[serde(with = "hhmm")]
    pub end: NaiveTime,
    pub timestamp: NaiveDateTime,
}

impl AvailableSlot {
    pub fn ends_at(&self) -> NaiveDateTime {
        self.timestamp.date().and_time(self.end)
    }
}

/// First day with bookable time, as returned by the next-available scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NextAvailable {
    pub date: NaiveDate,
    pub slots: Vec<AvailableSlot>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    fn time(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).expect("valid time")
    }

    fn one_off_monday_slot() -> AppointmentSlot {
        AppointmentSlot {
            id: SlotId::new(),
            owner: UserId::new(),
            day_of_week: 0,
            start_time: time(9, 0),
            end_time: time(11, 0),
            recurring: false,
            start_date: Some(date(2031, 3, 3)),
            end_date: Some(date(2031, 3, 17)),
            active: true,
            created_at: date(2031, 1, 1).and_time(time(8, 0)),
        }
    }

    #[test]
    fn non_recurring_slot_is_unavailable_outside_its_range() {
        let slot = one_off_monday_slot();
        assert!(!slot.is_available(date(2031, 2, 24)));
        assert!(slot.is_available(date(2031, 3, 3)));
        assert!(slot.is_available(date(2031, 3, 17)));
        assert!(!slot.is_available(date(2031, 3, 24)));
    }

    #[test]
    fn slot_requires_matching_weekday_and_active_flag() {
        let mut slot = one_off_monday_slot();
        assert!(!slot.is_available(date(2031, 3, 4)));
        slot.active = false;
        assert!(!slot.is_available(date(2031, 3, 10)));
    }

    #[test]
    fn recurring_slot_without_range_applies_every_week() {
        let mut slot = one_off_monday_slot();
        slot.recurring = true;
        slot.start_date = None;
        slot.end_date = None;
        assert!(slot.is_available(date(2030, 1, 7)));
        assert!(slot.is_available(date(2035, 6, 4)));
    }

    #[test]
    fn slot_draft_rejects_inverted_times_and_missing_one_off_dates() {
        let draft = SlotDraft {
            day_of_week: 7,
            start_time: time(11, 0),
            end_time: time(9, 0),
            recurring: false,
            start_date: None,
            end_date: None,
        };
        let errors = draft.validate().expect_err("invalid draft");
        assert!(errors.has("day_of_week"));
        assert!(errors.has("end_time"));
        assert!(errors.has("start_date"));
        assert!(errors.has("end_date"));
    }

    #[test]
    fn partial_exception_blocks_overlapping_windows_only() {
        let exception = AppointmentException {
            id: ExceptionId::new(),
            owner: UserId::new(),
            date: date(2031, 3, 3),
            start_time: Some(time(10, 0)),
            end_time: Some(time(10, 30)),
            all_day: false,
            reason: None,
            created_at: date(2031, 1, 1).and_time(time(8, 0)),
        };
        assert!(exception.blocks(time(10, 0), time(10, 30)));
        assert!(exception.blocks(time(9, 45), time(10, 15)));
        assert!(!exception.blocks(time(9, 30), time(10, 0)));
        assert!(!exception.blocks(time(10, 30), time(11, 0)));
    }

    #[test]
    fn pending_appointment_derives_end_time() {
        let start = date(2031, 3, 3).and_time(time(9, 30));
        let appointment = Appointment::pending(
            UserId::new(),
            UserId::new(),
            start,
            45,
            "Career chat".to_string(),
            None,
            date(2031, 3, 1).and_time(time(8, 0)),
        );
        assert_eq!(appointment.end_time, date(2031, 3, 3).and_time(time(10, 15)));
        assert!(appointment.end_time > appointment.schedule_time);
    }
}
