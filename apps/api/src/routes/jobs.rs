use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use uuid::Uuid;

use crate::auth::CurrentUser;
use crate::errors::AppError;
use crate::generation::require_text;
use crate::models::document::{Job, JobInput, JobUpdate};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct DeleteJobResponse {
    pub count: u64,
}

fn validate(title: &str, company: &str, description: &str) -> Result<(), AppError> {
    require_text("title", title)?;
    require_text("company", company)?;
    require_text("description", description)
}

/// GET /api/v1/jobs
pub async fn handle_list_jobs(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
) -> Result<Json<Vec<Job>>, AppError> {
    Ok(Json(state.store.list_jobs(user_id).await?))
}

/// POST /api/v1/jobs
pub async fn handle_create_job(
    State(state): State<AppState>,
    current: CurrentUser,
    Json(input): Json<JobInput>,
) -> Result<(StatusCode, Json<Job>), AppError> {
    validate(&input.title, &input.company, &input.description)?;
    let user = current.load(state.store.as_ref()).await?;
    let job = state.store.create_job(user.id, &input).await?;
    Ok((StatusCode::CREATED, Json(job)))
}

/// PUT /api/v1/jobs/:id
pub async fn handle_update_job(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(job_id): Path<Uuid>,
    Json(update): Json<JobUpdate>,
) -> Result<Json<Job>, AppError> {
    validate(&update.title, &update.company, &update.description)?;
    Ok(Json(state.store.update_job(user_id, job_id, &update).await?))
}

/// DELETE /api/v1/jobs/:id
///
/// Deleting someone else's job is a no-op reported as `count: 0`.
pub async fn handle_delete_job(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(job_id): Path<Uuid>,
) -> Result<Json<DeleteJobResponse>, AppError> {
    let count = state.store.delete_job(user_id, job_id).await?;
    Ok(Json(DeleteJobResponse { count }))
}
