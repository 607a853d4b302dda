//! Availability resolution: carve a recipient's weekly slots into bookable
//! increments for one date, minus exceptions and occupied time.

use chrono::{Duration, NaiveDate, NaiveDateTime};

use super::domain::{Appointment, AppointmentException, AppointmentSlot, AvailableSlot, NextAvailable};
use crate::config::SchedulingConfig;

/// Longest forward scan accepted by the next-available search.
pub const MAX_HORIZON_DAYS: u32 = 365;

/// Everything the resolver needs to know about one recipient on one date.
#[derive(Debug, Clone, Default)]
pub struct DaySchedule {
    pub slots: Vec<AppointmentSlot>,
    pub exceptions: Vec<AppointmentException>,
    /// Appointments of the recipient touching the date, in any status.
    pub appointments: Vec<Appointment>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AvailabilityResolver {
    increment: Duration,
    horizon_days: u32,
}

impl AvailabilityResolver {
    pub fn new(increment_minutes: u32, horizon_days: u32) -> Self {
        Self {
            increment: Duration::minutes(i64::from(increment_minutes.max(1))),
            horizon_days: horizon_days.clamp(1, MAX_HORIZON_DAYS),
        }
    }

    pub fn from_config(config: &SchedulingConfig) -> Self {
        Self::new(config.increment_minutes, config.horizon_days)
    }

    pub fn increment(&self) -> Duration {
        self.increment
    }

    pub fn horizon_days(&self) -> u32 {
        self.horizon_days
    }

    /// Bookable increments on `date`, sorted and deduplicated.
    pub fn resolve(
        &self,
        schedule: &DaySchedule,
        date: NaiveDate,
        now: NaiveDateTime,
    ) -> Vec<AvailableSlot> {
        if date < now.date() {
            return Vec::new();
        }
        let exceptions: Vec<&AppointmentException> = schedule
            .exceptions
            .iter()
            .filter(|exception| exception.date == date)
            .collect();
        if exceptions.iter().any(|exception| exception.all_day) {
            return Vec::new();
        }
        let occupied: Vec<&Appointment> = schedule
            .appointments
            .iter()
            .filter(|appointment| appointment.status.occupies_availability())
            .collect();

        let mut available = Vec::new();
        for slot in schedule.slots.iter().filter(|slot| slot.is_available(date)) {
            let slot_end = date.and_time(slot.end_time);
            let mut cursor = date.and_time(slot.start_time);
            while cursor + self.increment <= slot_end {
                let next = cursor + self.increment;
                let (start, end) = (cursor.time(), next.time());
                let in_past = cursor < now;
                let excepted = exceptions
                    .iter()
                    .any(|exception| exception.blocks(start, end));
                let booked = occupied
                    .iter()
                    .any(|appointment| appointment.overlaps(cursor, next));
                if !(in_past || excepted || booked) {
                    available.push(AvailableSlot {
                        start,
                        end,
                        timestamp: cursor,
                    });
                }
                cursor = next;
            }
        }
        available.sort();
        available.dedup();
        available
    }

    /// Scan forward day by day from `from` and return the first date with any
    /// bookable increment. `load` fetches the schedule for a date.
    pub fn next_available<F, E>(
        &self,
        from: NaiveDate,
        horizon_days: Option<u32>,
        now: NaiveDateTime,
        mut load: F,
    ) -> Result<Option<NextAvailable>, E>
    where
        F: FnMut(NaiveDate) -> Result<DaySchedule, E>,
    {
        let horizon = horizon_days
            .unwrap_or(self.horizon_days)
            .clamp(1, MAX_HORIZON_DAYS);
        let start = from.max(now.date());
        for offset in 0..horizon {
            let Some(date) = start.checked_add_signed(Duration::days(i64::from(offset))) else {
                break;
            };
            let schedule = load(date)?;
            let slots = self.resolve(&schedule, date, now);
            if !slots.is_empty() {
                return Ok(Some(NextAvailable { date, slots }));
            }
        }
        Ok(None)
    }

    /// Whether `[start, end)` is fully covered by bookable increments of its date.
    pub fn covers(
        &self,
        schedule: &DaySchedule,
        start: NaiveDateTime,
        end: NaiveDateTime,
        now: NaiveDateTime,
    ) -> bool {
        if end <= start {
            return false;
        }
        let available = self.resolve(schedule, start.date(), now);
        let mut cursor = start;
        while cursor < end {
            match available
                .iter()
                .find(|slot| slot.timestamp <= cursor && cursor < slot.ends_at())
            {
                Some(slot) => cursor = slot.ends_at(),
                None => return false,
            }
        }
        true
    }
}
