use axum::{extract::State, Json};

use crate::auth::CurrentUser;
use crate::errors::AppError;
use crate::models::user::{UserPreferences, UserProfile};
use crate::state::AppState;

/// GET /api/v1/users/me
pub async fn handle_get_me(
    State(state): State<AppState>,
    current: CurrentUser,
) -> Result<Json<UserProfile>, AppError> {
    let user = current.load(state.store.as_ref()).await?;
    Ok(Json(user.into()))
}

/// PATCH /api/v1/users/me
///
/// Only `notify_payment_expires` and `gpt_model` are user-editable.
pub async fn handle_update_me(
    State(state): State<AppState>,
    current: CurrentUser,
    Json(prefs): Json<UserPreferences>,
) -> Result<Json<UserProfile>, AppError> {
    if prefs
        .gpt_model
        .as_deref()
        .is_some_and(|m| m.trim().is_empty())
    {
        return Err(AppError::Validation("gpt_model cannot be empty".to_string()));
    }
    let user = state.store.update_preferences(current.0, &prefs).await?;
    Ok(Json(user.into()))
}
