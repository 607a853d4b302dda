use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use crate::accounts::{AccountRepository, Role, VerificationStatus};
use crate::appointments::{
    Appointment, AppointmentRequest, AppointmentService, AvailableSlot, SlotDraft,
};
use crate::auth::Actor;
use crate::config::SchedulingConfig;
use crate::notifications::NotificationCenter;
use crate::store::memory::{MemoryAccounts, MemoryAppointments};
use crate::testing::{at, member};

pub(super) type Service = AppointmentService<MemoryAppointments, MemoryAccounts, NotificationCenter>;

pub(super) struct Fixture {
    pub(super) service: Arc<Service>,
    pub(super) repository: Arc<MemoryAppointments>,
    pub(super) accounts: Arc<MemoryAccounts>,
    pub(super) inbox: Arc<NotificationCenter>,
    pub(super) advisor: Actor,
}

/// Saturday morning before the Monday used throughout these tests.
pub(super) fn now() -> NaiveDateTime {
    at(3, 1, 8, 0)
}

pub(super) fn monday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2031, 3, 3).expect("valid date")
}

pub(super) fn time(hour: u32, minute: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).expect("valid time")
}

pub(super) fn build_fixture() -> Fixture {
    let accounts = Arc::new(MemoryAccounts::default());
    let inbox = Arc::new(NotificationCenter::default());
    let repository = Arc::new(MemoryAppointments::default());
    let service = Arc::new(AppointmentService::new(
        repository.clone(),
        accounts.clone(),
        inbox.clone(),
        &SchedulingConfig::default(),
    ));
    let advisor = enroll(&accounts, Role::Advisor);
    service
        .create_slot(
            &advisor,
            SlotDraft {
                day_of_week: 0,
                start_time: time(9, 0),
                end_time: time(11, 0),
                recurring: true,
                start_date: None,
                end_date: None,
            },
            now(),
        )
        .expect("monday slot");
    Fixture {
        service,
        repository,
        accounts,
        inbox,
        advisor,
    }
}

pub(super) fn enroll(accounts: &MemoryAccounts, role: Role) -> Actor {
    let user = accounts
        .insert(member(role, VerificationStatus::Verified))
        .expect("user stored");
    Actor::from_user(&user)
}

pub(super) fn booking(
    recipient: &Actor,
    hour: u32,
    minute: u32,
    duration_minutes: u32,
) -> AppointmentRequest {
    AppointmentRequest {
        recipient: recipient.user_id,
        schedule_time: monday().and_time(time(hour, minute)),
        duration_minutes,
        subject: "Choosing a university programme".to_string(),
        notes: None,
    }
}

pub(super) fn book(fixture: &Fixture, requester: &Actor, hour: u32, minute: u32) -> Appointment {
    fixture
        .service
        .request(requester, booking(&fixture.advisor, hour, minute, 30), now())
        .expect("appointment booked")
}

pub(super) fn labels(slots: &[AvailableSlot]) -> Vec<String> {
    slots
        .iter()
        .map(|slot| format!("{}-{}", slot.start.format("%H:%M"), slot.end.format("%H:%M")))
        .collect()
}
