use axum::{extract::State, Json};

use crate::auth::CurrentUser;
use crate::entitlement::checker::{advise, Advice};
use crate::errors::AppError;
use crate::state::AppState;

/// GET /api/v1/entitlement
///
/// Advisory pre-check for the client. Paid endpoints decide again on their own.
pub async fn handle_get_entitlement(
    State(state): State<AppState>,
    current: CurrentUser,
) -> Result<Json<Advice>, AppError> {
    let user = current.load(state.store.as_ref()).await?;
    Ok(Json(advise(&user)))
}
