use crate::accounts::AccountError;
use crate::analytics::ReportError;
use crate::appointments::AppointmentError;
use crate::auth::{AccessDenied, AuthError};
use crate::config::ConfigError;
use crate::forum::ForumError;
use crate::orientation::OrientationError;
use crate::resources::ResourceError;
use crate::schools::SchoolError;
use crate::store::RepositoryError;
use crate::telemetry::TelemetryError;
use crate::validation::ValidationErrors;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::fmt;
use tracing::error;

#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    Server(axum::Error),
    Auth(AuthError),
    Access(AccessDenied),
    Validation(ValidationErrors),
    Repository(RepositoryError),
    Accounts(AccountError),
    Schools(SchoolError),
    Resources(ResourceError),
    Forum(ForumError),
    Appointments(AppointmentError),
    Orientation(OrientationError),
    Reports(ReportError),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Server(err) => write!(f, "server error: {}", err),
            AppError::Auth(err) => write!(f, "{}", err),
            AppError::Access(err) => write!(f, "{}", err),
            AppError::Validation(err) => write!(f, "{}", err),
            AppError::Repository(err) => write!(f, "storage error: {}", err),
            AppError::Accounts(err) => write!(f, "{}", err),
            AppError::Schools(err) => write!(f, "{}", err),
            AppError::Resources(err) => write!(f, "{}", err),
            AppError::Forum(err) => write!(f, "{}", err),
            AppError::Appointments(err) => write!(f, "{}", err),
            AppError::Orientation(err) => write!(f, "{}", err),
            AppError::Reports(err) => write!(f, "report error: {}", err),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::Server(err) => Some(err),
            AppError::Auth(err) => Some(err),
            AppError::Access(err) => Some(err),
            AppError::Validation(err) => Some(err),
            AppError::Repository(err) => Some(err),
            AppError::Accounts(err) => Some(err),
            AppError::Schools(err) => Some(err),
            AppError::Resources(err) => Some(err),
            AppError::Forum(err) => Some(err),
            AppError::Appointments(err) => Some(err),
            AppError::Orientation(err) => Some(err),
            AppError::Reports(err) => Some(err),
        }
    }
}

fn repository_status(err: &RepositoryError) -> StatusCode {
    match err {
        RepositoryError::Conflict | RepositoryError::Stale => StatusCode::CONFLICT,
        RepositoryError::NotFound => StatusCode::NOT_FOUND,
        RepositoryError::Unavailable(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Config(_)
            | AppError::Telemetry(_)
            | AppError::Io(_)
            | AppError::Server(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Auth(AuthError::Unavailable(err)) => repository_status(err),
            AppError::Auth(_) => StatusCode::UNAUTHORIZED,
            AppError::Access(_) => StatusCode::FORBIDDEN,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Repository(err) => repository_status(err),
            AppError::Accounts(err) => match err {
                AccountError::Validation(_) => StatusCode::BAD_REQUEST,
                AccountError::InvalidCredentials | AccountError::Inactive => {
                    StatusCode::UNAUTHORIZED
                }
                AccountError::NotFound => StatusCode::NOT_FOUND,
                AccountError::InvalidVerificationTransition { .. } => StatusCode::CONFLICT,
                AccountError::Forbidden(_) => StatusCode::FORBIDDEN,
                AccountError::Repository(err) => repository_status(err),
            },
            AppError::Schools(err) => match err {
                SchoolError::Validation(_) => StatusCode::BAD_REQUEST,
                SchoolError::NotFound => StatusCode::NOT_FOUND,
                SchoolError::Forbidden(_) => StatusCode::FORBIDDEN,
                SchoolError::Repository(err) => repository_status(err),
            },
            AppError::Resources(err) => match err {
                ResourceError::Validation(_) => StatusCode::BAD_REQUEST,
                ResourceError::NotFound | ResourceError::CollectionNotFound => {
                    StatusCode::NOT_FOUND
                }
                ResourceError::Forbidden(_) => StatusCode::FORBIDDEN,
                ResourceError::Repository(err) => repository_status(err),
            },
            AppError::Forum(err) => match err {
                ForumError::Validation(_) => StatusCode::BAD_REQUEST,
                ForumError::CategoryNotFound | ForumError::TopicNotFound => StatusCode::NOT_FOUND,
                ForumError::Locked => StatusCode::CONFLICT,
                ForumError::Forbidden(_) => StatusCode::FORBIDDEN,
                ForumError::Repository(err) => repository_status(err),
            },
            AppError::Appointments(err) => match err {
                AppointmentError::Validation(_) => StatusCode::BAD_REQUEST,
                AppointmentError::NotFound
                | AppointmentError::SlotNotFound
                | AppointmentError::RecipientNotFound => StatusCode::NOT_FOUND,
                AppointmentError::Unavailable
                | AppointmentError::DoubleBooked
                | AppointmentError::InvalidTransition { .. } => StatusCode::CONFLICT,
                AppointmentError::Forbidden(_) => StatusCode::FORBIDDEN,
                AppointmentError::Repository(err) => repository_status(err),
            },
            AppError::Orientation(err) => match err {
                OrientationError::Validation(_) => StatusCode::BAD_REQUEST,
                OrientationError::NotFound => StatusCode::NOT_FOUND,
                OrientationError::NotPublished => StatusCode::CONFLICT,
                OrientationError::Forbidden(_) => StatusCode::FORBIDDEN,
                OrientationError::Repository(err) => repository_status(err),
            },
            AppError::Reports(err) => match err {
                ReportError::Validation(_) => StatusCode::BAD_REQUEST,
                ReportError::NotFound => StatusCode::NOT_FOUND,
                ReportError::Forbidden(_) => StatusCode::FORBIDDEN,
                ReportError::Repository(err) => repository_status(err),
                ReportError::Csv(_) | ReportError::Spreadsheet(_) | ReportError::Encoding(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
        }
    }

    /// Field errors carried by any validation failure, whichever component raised it.
    pub fn validation(&self) -> Option<&ValidationErrors> {
        match self {
            AppError::Validation(errors)
            | AppError::Accounts(AccountError::Validation(errors))
            | AppError::Schools(SchoolError::Validation(errors))
            | AppError::Resources(ResourceError::Validation(errors))
            | AppError::Forum(ForumError::Validation(errors))
            | AppError::Appointments(AppointmentError::Validation(errors))
            | AppError::Orientation(OrientationError::Validation(errors))
            | AppError::Reports(ReportError::Validation(errors)) => Some(errors),
            _ => None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self.validation() {
            Some(errors) => json!({ "error": "validation failed", "fields": errors }),
            None if status == StatusCode::INTERNAL_SERVER_ERROR => {
                error!(error = %self, "request failed");
                json!({ "error": "internal server error" })
            }
            None => json!({ "error": self.to_string() }),
        };
        (status, Json(body)).into_response()
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<TelemetryError> for AppError {
    fn from(value: TelemetryError) -> Self {
        Self::Telemetry(value)
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<axum::Error> for AppError {
    fn from(value: axum::Error) -> Self {
        Self::Server(value)
    }
}

impl From<AuthError> for AppError {
    fn from(value: AuthError) -> Self {
        Self::Auth(value)
    }
}

impl From<AccessDenied> for AppError {
    fn from(value: AccessDenied) -> Self {
        Self::Access(value)
    }
}

impl From<ValidationErrors> for AppError {
    fn from(value: ValidationErrors) -> Self {
        Self::Validation(value)
    }
}

impl From<RepositoryError> for AppError {
    fn from(value: RepositoryError) -> Self {
        Self::Repository(value)
    }
}

impl From<AccountError> for AppError {
    fn from(value: AccountError) -> Self {
        Self::Accounts(value)
    }
}

impl From<SchoolError> for AppError {
    fn from(value: SchoolError) -> Self {
        Self::Schools(value)
    }
}

impl From<ResourceError> for AppError {
    fn from(value: ResourceError) -> Self {
        Self::Resources(value)
    }
}

impl From<ForumError> for AppError {
    fn from(value: ForumError) -> Self {
        Self::Forum(value)
    }
}

impl From<AppointmentError> for AppError {
    fn from(value: AppointmentError) -> Self {
        Self::Appointments(value)
    }
}

impl From<OrientationError> for AppError {
    fn from(value: OrientationError) -> Self {
        Self::Orientation(value)
    }
}

impl From<ReportError> for AppError {
    fn from(value: ReportError) -> Self {
        Self::Reports(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_of(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), 16 * 1024)
            .await
            .expect("body readable");
        serde_json::from_slice(&bytes).expect("json body")
    }

    #[tokio::test]
    async fn validation_errors_list_their_fields() {
        let err = AppError::from(AppointmentError::Validation(ValidationErrors::single(
            "duration_minutes",
            "duration must be positive",
        )));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_of(response).await;
        assert_eq!(body["error"], "validation failed");
        assert_eq!(body["fields"]["duration_minutes"][0], "duration must be positive");
    }

    #[tokio::test]
    async fn internal_failures_hide_details() {
        let err = AppError::from(RepositoryError::Unavailable("mutex poisoned".to_string()));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_of(response).await;
        assert_eq!(body["error"], "internal server error");
    }

    #[test]
    fn component_errors_map_to_statuses() {
        assert_eq!(
            AppError::from(AppointmentError::DoubleBooked).status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AppError::from(AuthError::MissingCredentials).status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AppError::from(AccessDenied("nope".to_string())).status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            AppError::from(ForumError::TopicNotFound).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::from(SchoolError::Repository(RepositoryError::Conflict)).status(),
            StatusCode::CONFLICT
        );
    }
}
