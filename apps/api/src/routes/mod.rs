pub mod health;
pub mod jobs;
pub mod users;

use axum::{
    routing::{get, patch, post, put},
    Router,
};

use crate::checkout::handlers as checkout;
use crate::entitlement::handlers as entitlement;
use crate::generation::handlers as generation;
use crate::lightning::handlers as lightning;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Account
        .route("/api/v1/entitlement", get(entitlement::handle_get_entitlement))
        .route(
            "/api/v1/users/me",
            get(users::handle_get_me).patch(users::handle_update_me),
        )
        // Jobs
        .route(
            "/api/v1/jobs",
            get(jobs::handle_list_jobs).post(jobs::handle_create_job),
        )
        .route(
            "/api/v1/jobs/:id",
            put(jobs::handle_update_job).delete(jobs::handle_delete_job),
        )
        // Generation (paid unless noted)
        .route(
            "/api/v1/jobs/:id/cover-letter",
            post(generation::handle_update_cover_letter),
        )
        .route(
            "/api/v1/cover-letters",
            post(generation::handle_generate_cover_letter),
        )
        .route(
            "/api/v1/cover-letters/edits",
            post(generation::handle_generate_edit),
        )
        .route(
            "/api/v1/cover-letters/:id",
            patch(generation::handle_edit_cover_letter),
        )
        .route(
            "/api/v1/resumes/optimize",
            post(generation::handle_optimize_resume),
        )
        .route("/api/v1/resumes/:id", put(generation::handle_edit_resume))
        // Lightning
        .route(
            "/api/v1/lightning/invoices",
            post(lightning::handle_create_invoice),
        )
        .route(
            "/api/v1/lightning/invoices/status",
            post(lightning::handle_refresh_status),
        )
        .route(
            "/api/v1/lightning/checkout",
            post(lightning::handle_checkout_stream),
        )
        // Stripe
        .route(
            "/api/v1/checkout/:product",
            post(checkout::handle_create_checkout),
        )
        .with_state(state)
}
