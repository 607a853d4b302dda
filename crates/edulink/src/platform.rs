//! Wiring of every component over the in-memory store.

use std::sync::Arc;

use axum::{Extension, Router};

use crate::accounts::{account_router, AccountService};
use crate::analytics::{analytics_router, AnalyticsService, MetricSource, RepositoryMetricSource};
use crate::appointments::{appointment_router, AppointmentService};
use crate::auth::SessionRegistry;
use crate::config::AppConfig;
use crate::forum::{forum_router, ForumService};
use crate::notifications::{notification_router, NotificationCenter};
use crate::orientation::{orientation_router, OrientationService};
use crate::resources::{resource_router, ResourceService};
use crate::schools::{school_router, SchoolService};
use crate::store::memory::{
    MemoryAccounts, MemoryAppointments, MemoryForum, MemoryOrientation, MemoryResources,
    MemoryScheduledReports, MemorySchools,
};

pub type Accounts = AccountService<MemoryAccounts, NotificationCenter>;
pub type Schools = SchoolService<MemorySchools>;
pub type Resources = ResourceService<MemoryResources>;
pub type Forum = ForumService<MemoryForum, NotificationCenter>;
pub type Appointments = AppointmentService<MemoryAppointments, MemoryAccounts, NotificationCenter>;
pub type Orientation = OrientationService<MemoryOrientation>;
pub type Analytics = AnalyticsService<MemoryScheduledReports, NotificationCenter>;

/// All services sharing one store, one session registry and one inbox.
#[derive(Clone)]
pub struct Platform {
    pub sessions: SessionRegistry,
    pub notifications: Arc<NotificationCenter>,
    pub accounts: Arc<Accounts>,
    pub schools: Arc<Schools>,
    pub resources: Arc<Resources>,
    pub forum: Arc<Forum>,
    pub appointments: Arc<Appointments>,
    pub orientation: Arc<Orientation>,
    pub analytics: Arc<Analytics>,
}

impl Platform {
    pub fn in_memory(config: &AppConfig) -> Self {
        let account_store = Arc::new(MemoryAccounts::default());
        let resource_store = Arc::new(MemoryResources::default());
        let appointment_store = Arc::new(MemoryAppointments::default());
        let orientation_store = Arc::new(MemoryOrientation::default());
        let notifications = Arc::new(NotificationCenter::default());
        let sessions = SessionRegistry::new(account_store.clone());

        let metrics: Arc<dyn MetricSource> = Arc::new(RepositoryMetricSource::new(
            account_store.clone(),
            resource_store.clone(),
            appointment_store.clone(),
            orientation_store.clone(),
        ));

        Self {
            accounts: Arc::new(AccountService::new(
                account_store.clone(),
                notifications.clone(),
                sessions.clone(),
            )),
            schools: Arc::new(SchoolService::new(Arc::new(MemorySchools::default()))),
            resources: Arc::new(ResourceService::new(resource_store)),
            forum: Arc::new(ForumService::new(
                Arc::new(MemoryForum::default()),
                notifications.clone(),
            )),
            appointments: Arc::new(AppointmentService::new(
                appointment_store,
                account_store,
                notifications.clone(),
                &config.scheduling,
            )),
            orientation: Arc::new(OrientationService::new(orientation_store)),
            analytics: Arc::new(AnalyticsService::new(
                metrics,
                Arc::new(MemoryScheduledReports::default()),
                notifications.clone(),
                &config.reporting,
            )),
            notifications,
            sessions,
        }
    }

    /// Every `/api/v1` route, with the session registry installed for [`crate::auth::Actor`].
    pub fn router(&self) -> Router {
        Router::new()
            .merge(account_router(self.accounts.clone()))
            .merge(school_router(self.schools.clone()))
            .merge(resource_router(self.resources.clone()))
            .merge(forum_router(self.forum.clone()))
            .merge(appointment_router(self.appointments.clone()))
            .merge(orientation_router(self.orientation.clone()))
            .merge(analytics_router(self.analytics.clone()))
            .merge(notification_router(self.notifications.clone()))
            .layer(Extension(self.sessions.clone()))
    }
}
