use std::io::Cursor;
use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;

use super::evaluation::QualificationOutcome;
use super::repository::{ProspectKey, ProspectRecord, ProspectRepository};
use super::service::{ProspectQualificationService, QualificationSummary};
use crate::error::AppError;

/// Shared handler state: the service plus the configured prospects export.
pub struct QualificationState<R> {
    pub service: Arc<ProspectQualificationService<R>>,
    pub prospects_csv: Arc<PathBuf>,
}

impl<R> Clone for QualificationState<R> {
    fn clone(&self) -> Self {
        Self {
            service: Arc::clone(&self.service),
            prospects_csv: Arc::clone(&self.prospects_csv),
        }
    }
}

/// Inline CSV payload for ad-hoc qualification runs.
#[derive(Debug, Deserialize)]
pub struct InlineProspects {
    pub csv: String,
}

/// Single-location check for one user.
#[derive(Debug, Deserialize)]
pub struct CheckRequest {
    pub user_id: String,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub subdivision: Option<String>,
}

/// Router builder exposing the qualification endpoints.
pub fn qualification_router<R>(
    service: Arc<ProspectQualificationService<R>>,
    prospects_csv: PathBuf,
) -> Router
where
    R: ProspectRepository + 'static,
{
    let state = QualificationState {
        service,
        prospects_csv: Arc::new(prospects_csv),
    };

    Router::new()
        .route("/", get(root_handler))
        .route("/qualify", get(qualify_configured_handler::<R>))
        .route(
            "/api/v1/prospects/qualify",
            post(qualify_inline_handler::<R>),
        )
        .route(
            "/api/v1/prospects/qualified",
            get(qualified_list_handler::<R>),
        )
        .route(
            "/api/v1/prospects/:user_id/:prospect_id",
            get(prospect_handler::<R>),
        )
        .route(
            "/api/v1/qualification/check",
            post(check_handler::<R>),
        )
        .with_state(state)
}

pub(crate) async fn root_handler() -> Json<serde_json::Value> {
    Json(json!({ "message": "Welcome to the Prospect Qualification API" }))
}

pub(crate) async fn qualify_configured_handler<R>(
    State(state): State<QualificationState<R>>,
) -> Result<Json<QualificationSummary>, AppError>
where
    R: ProspectRepository + 'static,
{
    let report = state
        .service
        .qualify_from_path(state.prospects_csv.as_path())
        .map_err(AppError::configured)?;
    let summary = state.service.summary(report.processed)?;
    Ok(Json(summary))
}

pub(crate) async fn qualify_inline_handler<R>(
    State(state): State<QualificationState<R>>,
    Json(payload): Json<InlineProspects>,
) -> Result<Json<QualificationSummary>, AppError>
where
    R: ProspectRepository + 'static,
{
    let reader = Cursor::new(payload.csv.into_bytes());
    let report = state.service.qualify_from_reader(reader)?;
    let summary = state.service.summary(report.processed)?;
    Ok(Json(summary))
}

pub(crate) async fn qualified_list_handler<R>(
    State(state): State<QualificationState<R>>,
) -> Result<Json<Vec<ProspectRecord>>, AppError>
where
    R: ProspectRepository + 'static,
{
    Ok(Json(state.service.qualified_prospects()?))
}

pub(crate) async fn prospect_handler<R>(
    State(state): State<QualificationState<R>>,
    Path((user_id, prospect_id)): Path<(String, String)>,
) -> Result<Json<ProspectRecord>, AppError>
where
    R: ProspectRepository + 'static,
{
    let key = ProspectKey::new(user_id, prospect_id);
    Ok(Json(state.service.get(&key)?))
}

pub(crate) async fn check_handler<R>(
    State(state): State<QualificationState<R>>,
    Json(request): Json<CheckRequest>,
) -> Json<QualificationOutcome>
where
    R: ProspectRepository + 'static,
{
    Json(state.service.check(
        &request.user_id,
        request.country.as_deref(),
        request.subdivision.as_deref(),
    ))
}
