//! Reminder planning: one reminder per configured offset before the start time.

use chrono::{Duration, NaiveDateTime};

use super::domain::{Appointment, AppointmentReminder};
use crate::ids::ReminderId;

/// Build reminders for `appointment`, skipping offsets whose fire time has passed.
pub fn plan(
    appointment: &Appointment,
    offsets_minutes: &[u32],
    now: NaiveDateTime,
) -> Vec<AppointmentReminder> {
    let mut offsets = offsets_minutes.to_vec();
    offsets.sort_unstable_by(|a, b| b.cmp(a));
    offsets.dedup();
    offsets
        .into_iter()
        .filter_map(|minutes_before| {
            let remind_at = appointment.schedule_time - Duration::minutes(i64::from(minutes_before));
            (remind_at > now).then(|| AppointmentReminder {
                id: ReminderId::new(),
                appointment: appointment.id,
                minutes_before,
                remind_at,
                sent: false,
            })
        })
        .collect()
}

/// Human-readable lead time used in reminder messages.
pub fn describe_lead(minutes_before: u32) -> String {
    match minutes_before {
        m if m >= 1440 && m % 1440 == 0 => match m / 1440 {
            1 => "in 1 day".to_string(),
            days => format!("in {days} days"),
        },
        m if m >= 60 && m % 60 == 0 => match m / 60 {
            1 => "in 1 hour".to_string(),
            hours => format!("in {hours} hours"),
        },
        1 => "in 1 minute".to_string(),
        m => format!("in {m} minutes"),
    }
}
