use axum::{
    extract::{Path, State},
    Json,
};

use crate::auth::CurrentUser;
use crate::checkout::{start_checkout, CheckoutResponse, Product};
use crate::errors::AppError;
use crate::state::AppState;

/// POST /api/v1/checkout/:product
///
/// `product` is `subscription`, `gpt4` or `credits`.
pub async fn handle_create_checkout(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(product): Path<String>,
) -> Result<Json<CheckoutResponse>, AppError> {
    let product = Product::from_slug(&product)
        .ok_or_else(|| AppError::NotFound(format!("Unknown product '{product}'")))?;
    let user = current.load(state.store.as_ref()).await?;

    let response = start_checkout(
        state.store.as_ref(),
        state.checkout.as_ref(),
        &state.config,
        &user,
        product,
    )
    .await?;
    Ok(Json(response))
}
