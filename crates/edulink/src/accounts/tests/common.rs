use std::sync::Arc;

use axum::{Extension, Router};

use crate::accounts::{
    account_router, AccountRepository, AccountService, RegistrationRequest, Role, User,
};
use crate::auth::SessionRegistry;
use crate::ids::UserId;
use crate::notifications::NotificationCenter;
use crate::store::memory::MemoryAccounts;
use crate::store::RepositoryError;
use crate::testing::{profile_for, Sessions, PASSWORD};

pub(super) type Service = AccountService<MemoryAccounts, NotificationCenter>;

pub(super) fn build_service() -> (Arc<Service>, Sessions, Arc<NotificationCenter>) {
    let sessions = Sessions::new();
    let inbox = Arc::new(NotificationCenter::default());
    let service = Arc::new(AccountService::new(
        sessions.accounts.clone(),
        inbox.clone(),
        sessions.registry.clone(),
    ));
    (service, sessions, inbox)
}

pub(super) fn router_with(service: Arc<Service>, sessions: &Sessions) -> Router {
    account_router(service).layer(Extension(sessions.registry.clone()))
}

pub(super) fn registration(username: &str, role: Role) -> RegistrationRequest {
    RegistrationRequest {
        username: username.to_string(),
        email: format!("{username}@edulink.test"),
        display_name: "Amina Diallo".to_string(),
        password: PASSWORD.to_string(),
        password_confirmation: PASSWORD.to_string(),
        profile: profile_for(role),
        verification_document: None,
    }
}

pub(super) struct UnavailableAccounts;

impl AccountRepository for UnavailableAccounts {
    fn insert(&self, _user: User) -> Result<User, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn update(&self, _user: User) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch(&self, _id: &UserId) -> Result<Option<User>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn find_by_login(&self, _login: &str) -> Result<Option<User>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn taken(&self, _username: &str, _email: &str) -> Result<(bool, bool), RepositoryError> {
        Ok((false, false))
    }

    fn list(&self) -> Result<Vec<User>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

pub(super) fn unavailable_service() -> Arc<AccountService<UnavailableAccounts, NotificationCenter>> {
    let accounts = Arc::new(UnavailableAccounts);
    Arc::new(AccountService::new(
        accounts.clone(),
        Arc::new(NotificationCenter::default()),
        SessionRegistry::new(accounts),
    ))
}
