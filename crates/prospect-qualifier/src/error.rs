use crate::config::ConfigError;
use crate::telemetry::TelemetryError;
use crate::workflows::qualification::{QualificationServiceError, RepositoryError, SourceError};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::fmt;
use tracing::warn;

#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    Source(SourceError),
    Qualification(QualificationServiceError),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Source(err) => write!(f, "source error: {}", err),
            AppError::Qualification(err) => write!(f, "qualification error: {}", err),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::Source(err) => Some(err),
            AppError::Qualification(err) => Some(err),
        }
    }
}

impl AppError {
    /// Wraps a failure from a configured source file. Missing or malformed deployment
    /// files are server errors, unlike CSV uploaded with a request.
    pub fn configured(error: QualificationServiceError) -> Self {
        match error {
            QualificationServiceError::Source(source) => Self::Source(source),
            other => Self::Qualification(other),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Qualification(QualificationServiceError::Source(_)) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            AppError::Qualification(QualificationServiceError::Repository(
                RepositoryError::NotFound,
            )) => StatusCode::NOT_FOUND,
            AppError::Qualification(QualificationServiceError::Repository(
                RepositoryError::Unavailable(_),
            )) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Config(_)
            | AppError::Telemetry(_)
            | AppError::Io(_)
            | AppError::Source(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            warn!(error = %self, "request failed");
        }

        let body = Json(json!({ "error": self.to_string() }));
        (status, body).into_response()
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

impl From<SourceError> for AppError {
    fn from(value: SourceError) -> Self {
        Self::Source(value)
    }
}

impl From<QualificationServiceError> for AppError {
    fn from(value: QualificationServiceError) -> Self {
        Self::Qualification(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn missing(path: &str) -> SourceError {
        SourceError::NotFound {
            path: PathBuf::from(path),
        }
    }

    #[test]
    fn source_failures_during_qualification_are_client_errors() {
        let error = AppError::from(QualificationServiceError::Source(missing("prospects.csv")));
        assert_eq!(
            error.into_response().status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }

    #[test]
    fn configured_source_failures_are_server_errors() {
        let error = AppError::configured(QualificationServiceError::Source(missing(
            "prospects.csv",
        )));
        assert!(matches!(error, AppError::Source(_)));
        assert_eq!(error.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let error = AppError::configured(QualificationServiceError::Repository(
            RepositoryError::NotFound,
        ));
        assert_eq!(error.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn repository_failures_map_to_lookup_and_availability_statuses() {
        let error = AppError::from(QualificationServiceError::Repository(
            RepositoryError::NotFound,
        ));
        assert_eq!(error.into_response().status(), StatusCode::NOT_FOUND);

        let error = AppError::from(QualificationServiceError::Repository(
            RepositoryError::Unavailable("offline".to_string()),
        ));
        assert_eq!(
            error.into_response().status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[test]
    fn startup_failures_are_server_errors() {
        let error = AppError::from(missing("regions.json"));
        assert!(error.to_string().contains("regions.json"));
        assert_eq!(
            error.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
