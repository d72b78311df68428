//! Axum route handlers for the Generation API.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::auth::CurrentUser;
use crate::entitlement::credits::Charged;
use crate::errors::AppError;
use crate::generation::cover_letter::{
    self, GenerateCoverLetterRequest, UpdateCoverLetterRequest,
};
use crate::generation::edit::{self, GenerateEditRequest, Revision};
use crate::generation::resume::{self, EditResumeRequest, OptimizeResumeRequest};
use crate::models::document::{CoverLetter, OptimizedResume};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct EditCoverLetterRequest {
    pub content: String,
}

/// POST /api/v1/cover-letters
///
/// Paid. Generates a letter for one of the caller's jobs.
pub async fn handle_generate_cover_letter(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Json(request): Json<GenerateCoverLetterRequest>,
) -> Result<Json<Charged<CoverLetter>>, AppError> {
    let charged =
        cover_letter::generate_cover_letter(state.store.as_ref(), state.llm.as_ref(), user_id, request)
            .await?;
    Ok(Json(charged))
}

/// POST /api/v1/jobs/:id/cover-letter
///
/// Paid. Regenerates the job's letter from a revised description.
pub async fn handle_update_cover_letter(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(job_id): Path<Uuid>,
    Json(request): Json<UpdateCoverLetterRequest>,
) -> Result<Json<Charged<CoverLetter>>, AppError> {
    let charged = cover_letter::update_cover_letter(
        state.store.as_ref(),
        state.llm.as_ref(),
        user_id,
        job_id,
        request,
    )
    .await?;
    Ok(Json(charged))
}

/// PATCH /api/v1/cover-letters/:id
pub async fn handle_edit_cover_letter(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(cover_letter_id): Path<Uuid>,
    Json(request): Json<EditCoverLetterRequest>,
) -> Result<Json<CoverLetter>, AppError> {
    let letter = cover_letter::edit_cover_letter(
        state.store.as_ref(),
        user_id,
        cover_letter_id,
        &request.content,
    )
    .await?;
    Ok(Json(letter))
}

/// POST /api/v1/cover-letters/edits
///
/// Paid. Rewrites an isolated passage.
pub async fn handle_generate_edit(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Json(request): Json<GenerateEditRequest>,
) -> Result<Json<Charged<Revision>>, AppError> {
    let charged =
        edit::generate_edit(state.store.as_ref(), state.llm.as_ref(), user_id, request).await?;
    Ok(Json(charged))
}

/// POST /api/v1/resumes/optimize
///
/// Paid.
pub async fn handle_optimize_resume(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Json(request): Json<OptimizeResumeRequest>,
) -> Result<Json<Charged<OptimizedResume>>, AppError> {
    let charged =
        resume::optimize_resume(state.store.as_ref(), state.llm.as_ref(), user_id, request).await?;
    Ok(Json(charged))
}

/// PUT /api/v1/resumes/:id
///
/// Free. Re-parses hand-edited résumé text into the structured form.
pub async fn handle_edit_resume(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(resume_id): Path<Uuid>,
    Json(request): Json<EditResumeRequest>,
) -> Result<Json<OptimizedResume>, AppError> {
    let resume = resume::edit_resume(
        state.store.as_ref(),
        state.llm.as_ref(),
        user_id,
        resume_id,
        request,
    )
    .await?;
    Ok(Json(resume))
}
