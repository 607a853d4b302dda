//! EduLink: an education networking platform library.
//!
//! Each component (accounts, schools, resources, forum, appointments,
//! orientation, analytics) exposes a repository trait, a synchronous service
//! and an axum router. [`platform::Platform`] wires them over the in-memory
//! store.

pub mod accounts;
pub mod analytics;
pub mod appointments;
pub mod auth;
pub mod config;
pub mod error;
pub mod forum;
pub mod ids;
pub mod notifications;
pub mod orientation;
pub mod platform;
pub mod resources;
pub mod schools;
pub mod store;
pub mod telemetry;
#[cfg(test)]
pub(crate) mod testing;
pub mod timefmt;
pub mod validation;

use chrono::NaiveDateTime;

/// Wall-clock time in the server's local zone; services take it as a parameter.
pub(crate) fn local_now() -> NaiveDateTime {
    chrono::Local::now().naive_local()
}
