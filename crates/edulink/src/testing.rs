//! Fixtures shared by the component test modules.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request};
use axum::response::Response;
use chrono::{NaiveDate, NaiveDateTime};
use serde_json::Value;

use crate::accounts::password::PasswordHash;
use crate::accounts::{
    AccountRepository, AdminScope, AdministratorProfile, AdvisorProfile, PupilProfile, Role,
    RoleProfile, StudentProfile, TeacherProfile, User, VerificationStatus,
};
use crate::auth::{Actor, SessionRegistry};
use crate::ids::UserId;
use crate::store::memory::MemoryAccounts;

pub(crate) const PASSWORD: &str = "correct-horse-42";

pub(crate) fn at(month: u32, day: u32, hour: u32, minute: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2031, month, day)
        .and_then(|date| date.and_hms_opt(hour, minute, 0))
        .expect("valid timestamp")
}

pub(crate) fn profile_for(role: Role) -> RoleProfile {
    match role {
        Role::Student => RoleProfile::Student(StudentProfile {
            institution: None,
            field_of_study: "Computer science".to_string(),
            level: "bachelor".to_string(),
        }),
        Role::Pupil => RoleProfile::Pupil(PupilProfile {
            grade: "terminale".to_string(),
            guardian_email: None,
        }),
        Role::Teacher => RoleProfile::Teacher(TeacherProfile {
            subjects: vec!["Mathematics".to_string()],
            school: None,
        }),
        Role::Advisor => RoleProfile::Advisor(AdvisorProfile {
            specialties: vec!["Engineering careers".to_string()],
            organization: "Orientation Centre".to_string(),
            cv_document: None,
        }),
        Role::Administrator => RoleProfile::Administrator(AdministratorProfile {
            scope: AdminScope::Platform,
        }),
    }
}

pub(crate) fn member(role: Role, verification: VerificationStatus) -> User {
    let id = UserId::new();
    let handle = format!("{}-{}", role.label(), &id.to_string()[..8]);
    User {
        id,
        email: format!("{handle}@edulink.test"),
        display_name: handle.clone(),
        username: handle,
        password_hash: PasswordHash::derive(PASSWORD),
        role,
        profile: profile_for(role),
        verification,
        verification_document: None,
        rejection_reason: None,
        is_active: true,
        created_at: at(1, 1, 9, 0),
        verified_at: (verification == VerificationStatus::Verified).then(|| at(1, 1, 9, 0)),
    }
}

pub(crate) fn actor(role: Role) -> Actor {
    Actor {
        user_id: UserId::new(),
        role,
        verification: VerificationStatus::Verified,
    }
}

pub(crate) fn unverified(role: Role) -> Actor {
    Actor {
        user_id: UserId::new(),
        role,
        verification: VerificationStatus::Unverified,
    }
}

/// An account store plus session registry for driving routers end to end.
#[derive(Clone)]
pub(crate) struct Sessions {
    pub(crate) accounts: Arc<MemoryAccounts>,
    pub(crate) registry: SessionRegistry,
}

impl Sessions {
    pub(crate) fn new() -> Self {
        let accounts = Arc::new(MemoryAccounts::default());
        let registry = SessionRegistry::new(accounts.clone());
        Self { accounts, registry }
    }

    pub(crate) fn enroll(&self, role: Role, verification: VerificationStatus) -> (Actor, String) {
        let user = self
            .accounts
            .insert(member(role, verification))
            .expect("user stored");
        let token = self.registry.issue(user.id).expect("session issued");
        (Actor::from_user(&user), token)
    }
}

pub(crate) fn request(method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(&body).expect("json body")))
            .expect("request builds"),
        None => builder.body(Body::empty()).expect("request builds"),
    }
}

pub(crate) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
