//! Caller identity.
//!
//! Sessions are terminated by the auth proxy in front of this service, which
//! forwards the authenticated user id in `x-user-id`. Handlers still load the
//! user row, so an id with no account is rejected as well.

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::user::User;
use crate::store::UserStore;

pub const USER_ID_HEADER: &str = "x-user-id";

/// Extractor for the authenticated user's id. Missing or malformed → 401.
#[derive(Debug, Clone, Copy)]
pub struct CurrentUser(pub Uuid);

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|h| h.to_str().ok())
            .and_then(|raw| Uuid::parse_str(raw.trim()).ok())
            .map(CurrentUser)
            .ok_or(AppError::Unauthorized)
    }
}

impl CurrentUser {
    /// Loads the caller's row; an unknown id is unauthenticated.
    pub async fn load<S: UserStore + ?Sized>(&self, store: &S) -> Result<User, AppError> {
        store.find_user(self.0).await?.ok_or(AppError::Unauthorized)
    }
}
