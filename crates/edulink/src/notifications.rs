//! In-app notifications raised as side effects of other components.
//!
//! Delivery is best-effort: callers go through [`notify_best_effort`] so a failing
//! transport is logged and never fails the operation that triggered it.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::auth::Actor;
use crate::error::AppError;
use crate::ids::{NotificationId, UserId};
use crate::store::{lock, RepositoryError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    Welcome,
    Verification,
    Appointment,
    Forum,
    Report,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub id: NotificationId,
    pub recipient: UserId,
    pub kind: NotificationKind,
    pub message: String,
    pub read: bool,
    pub created_at: NaiveDateTime,
}

impl Notification {
    pub fn new(
        recipient: UserId,
        kind: NotificationKind,
        message: impl Into<String>,
        now: NaiveDateTime,
    ) -> Self {
        Self {
            id: NotificationId::new(),
            recipient,
            kind,
            message: message.into(),
            read: false,
            created_at: now,
        }
    }
}

/// Outbound notification hook (in-app inbox, e-mail adapters, ...).
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification) -> Result<(), NotifyError>;
}

#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("notification transport unavailable: {0}")]
    Transport(String),
}

/// Deliver a notification, logging instead of failing when the transport errors.
pub fn notify_best_effort<N>(notifier: &N, notification: Notification)
where
    N: Notifier + ?Sized,
{
    let recipient = notification.recipient;
    let kind = notification.kind;
    if let Err(err) = notifier.notify(notification) {
        warn!(%recipient, ?kind, error = %err, "notification dropped");
    }
}

/// In-memory inbox used by the HTTP service and tests.
#[derive(Debug, Default, Clone)]
pub struct NotificationCenter {
    entries: Arc<Mutex<Vec<Notification>>>,
}

impl NotificationCenter {
    pub fn list_for(&self, user: &UserId) -> Result<Vec<Notification>, RepositoryError> {
        let guard = lock(&self.entries, "notification")?;
        let mut items: Vec<Notification> = guard
            .iter()
            .filter(|entry| entry.recipient == *user)
            .cloned()
            .collect();
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(items)
    }

    pub fn mark_read(
        &self,
        user: &UserId,
        id: &NotificationId,
    ) -> Result<Notification, RepositoryError> {
        let mut guard = lock(&self.entries, "notification")?;
        let entry = guard
            .iter_mut()
            .find(|entry| entry.id == *id && entry.recipient == *user)
            .ok_or(RepositoryError::NotFound)?;
        entry.read = true;
        Ok(entry.clone())
    }

    pub fn unread_count(&self, user: &UserId) -> Result<usize, RepositoryError> {
        let guard = lock(&self.entries, "notification")?;
        Ok(guard
            .iter()
            .filter(|entry| entry.recipient == *user && !entry.read)
            .count())
    }
}

impl Notifier for NotificationCenter {
    fn notify(&self, notification: Notification) -> Result<(), NotifyError> {
        let mut guard = self
            .entries
            .lock()
            .map_err(|_| NotifyError::Transport("notification mutex poisoned".to_string()))?;
        guard.push(notification);
        Ok(())
    }
}

#[derive(Debug, Serialize)]
struct InboxView {
    unread: usize,
    notifications: Vec<Notification>,
}

pub fn notification_router(center: Arc<NotificationCenter>) -> Router {
    Router::new()
        .route("/api/v1/notifications", get(inbox_handler))
        .route(
            "/api/v1/notifications/:notification_id/read",
            post(mark_read_handler),
        )
        .with_state(center)
}

async fn inbox_handler(
    State(center): State<Arc<NotificationCenter>>,
    actor: Actor,
) -> Result<Json<InboxView>, AppError> {
    let notifications = center.list_for(&actor.user_id)?;
    let unread = notifications.iter().filter(|entry| !entry.read).count();
    Ok(Json(InboxView {
        unread,
        notifications,
    }))
}

async fn mark_read_handler(
    State(center): State<Arc<NotificationCenter>>,
    actor: Actor,
    Path(notification_id): Path<NotificationId>,
) -> Result<Json<Notification>, AppError> {
    let notification = center.mark_read(&actor.user_id, &notification_id)?;
    Ok(Json(notification))
}
