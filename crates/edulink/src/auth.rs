//! Bearer-token sessions and the authenticated [`Actor`] extractor.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header, request::Parts, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::json;
use uuid::Uuid;

use crate::accounts::{AccountRepository, Role, User, UserView, VerificationStatus};
use crate::ids::UserId;
use crate::store::{lock, RepositoryError};

/// The authenticated user behind a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Actor {
    pub user_id: UserId,
    pub role: Role,
    pub verification: VerificationStatus,
}

impl Actor {
    pub fn from_user(user: &User) -> Self {
        Self {
            user_id: user.id,
            role: user.role,
            verification: user.verification,
        }
    }

    pub fn from_view(view: &UserView) -> Self {
        Self {
            user_id: view.id,
            role: view.role,
            verification: view.verification,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Administrator
    }

    pub fn is_verified(&self) -> bool {
        self.verification == VerificationStatus::Verified
    }

    pub fn require_admin(&self, action: &str) -> Result<(), AccessDenied> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(AccessDenied(format!("only administrators may {action}")))
        }
    }

    pub fn require_role(&self, roles: &[Role], action: &str) -> Result<(), AccessDenied> {
        if roles.contains(&self.role) {
            Ok(())
        } else {
            Err(AccessDenied(format!(
                "role {} may not {action}",
                self.role.label()
            )))
        }
    }

    /// Staff features unlock once teachers and advisors pass verification.
    pub fn require_verified_staff(&self, action: &str) -> Result<(), AccessDenied> {
        if !self.role.is_staff() {
            return Err(AccessDenied(format!(
                "role {} may not {action}",
                self.role.label()
            )));
        }
        if self.role.requires_verification() && !self.is_verified() {
            return Err(AccessDenied(format!(
                "account must be verified to {action}"
            )));
        }
        Ok(())
    }
}

/// Authorization failure surfaced as HTTP 403.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("access denied: {0}")]
pub struct AccessDenied(pub String);

/// Authentication failure surfaced as HTTP 401.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("missing bearer token")]
    MissingCredentials,
    #[error("invalid or expired session")]
    InvalidToken,
    #[error("account is inactive")]
    Inactive,
    #[error(transparent)]
    Unavailable(#[from] RepositoryError),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = match self {
            AuthError::Unavailable(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AuthError::MissingCredentials | AuthError::InvalidToken | AuthError::Inactive => {
                StatusCode::UNAUTHORIZED
            }
        };
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

/// Token registry; resolves tokens against the account store on every request
/// so role and verification changes apply immediately.
#[derive(Clone)]
pub struct SessionRegistry {
    tokens: Arc<Mutex<HashMap<String, UserId>>>,
    accounts: Arc<dyn AccountRepository>,
}

impl SessionRegistry {
    pub fn new(accounts: Arc<dyn AccountRepository>) -> Self {
        Self {
            tokens: Arc::new(Mutex::new(HashMap::new())),
            accounts,
        }
    }

    pub fn issue(&self, user: UserId) -> Result<String, RepositoryError> {
        let token = Uuid::new_v4().simple().to_string();
        lock(&self.tokens, "session")?.insert(token.clone(), user);
        Ok(token)
    }

    pub fn revoke(&self, token: &str) -> Result<bool, RepositoryError> {
        Ok(lock(&self.tokens, "session")?.remove(token).is_some())
    }

    pub fn resolve(&self, token: &str) -> Result<Actor, AuthError> {
        let user_id = lock(&self.tokens, "session")?
            .get(token)
            .copied()
            .ok_or(AuthError::InvalidToken)?;
        let user = self
            .accounts
            .fetch(&user_id)?
            .ok_or(AuthError::InvalidToken)?;
        if !user.is_active {
            return Err(AuthError::Inactive);
        }
        Ok(Actor::from_user(&user))
    }
}

pub(crate) fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

#[async_trait]
impl<S> FromRequestParts<S> for Actor
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let sessions = parts
            .extensions
            .get::<SessionRegistry>()
            .cloned()
            .ok_or_else(|| {
                AuthError::Unavailable(RepositoryError::Unavailable(
                    "session registry not installed".to_string(),
                ))
            })?;
        let token = bearer_token(&parts.headers).ok_or(AuthError::MissingCredentials)?;
        sessions.resolve(token)
    }
}
