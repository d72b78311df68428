//! Axum route handlers for Lightning payments.
//!
//! Two ways to pay per action:
//! - `POST /api/v1/lightning/checkout` runs the whole settlement loop on the
//!   server and streams it as SSE: one `invoice` event, then one final
//!   `settled` or `error` event. Closing the stream cancels the loop.
//! - `POST /api/v1/lightning/invoices` plus repeated
//!   `POST /api/v1/lightning/invoices/status` lets the client drive the loop.

use axum::{
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
    Json,
};
use futures::stream::{self, Stream};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::auth::CurrentUser;
use crate::errors::AppError;
use crate::lightning::client::Invoice;
use crate::lightning::settlement::{needs_invoice, pay_if_required};
use crate::models::ln_payment::{LnPaymentRef, LnPaymentStatus};
use crate::models::user::User;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PaymentStatusResponse {
    pub pr: String,
    pub status: LnPaymentStatus,
}

#[derive(Debug, Serialize)]
struct ErrorEvent {
    message: String,
}

type EventResult = Result<Event, axum::Error>;

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/lightning/invoices
///
/// Mints an invoice for the caller and records it as `pending`.
pub async fn handle_create_invoice(
    State(state): State<AppState>,
    current: CurrentUser,
) -> Result<Json<Invoice>, AppError> {
    let user = current.load(state.store.as_ref()).await?;
    require_lightning(&user)?;
    let invoice = state.lightning.request_invoice(&user).await?;
    Ok(Json(invoice))
}

/// POST /api/v1/lightning/invoices/status
///
/// Re-checks one of the caller's invoices. Safe to repeat; settled and
/// failed invoices are returned as stored.
pub async fn handle_refresh_status(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Json(reference): Json<LnPaymentRef>,
) -> Result<Json<PaymentStatusResponse>, AppError> {
    let owned = state
        .store
        .find_payment(&reference.pr)
        .await?
        .is_some_and(|p| p.user_id == user_id);
    if !owned {
        return Err(AppError::NotFound("Invoice not found".to_string()));
    }

    let payment = state.lightning.refresh_status(&reference.pr).await?;
    Ok(Json(PaymentStatusResponse {
        pr: payment.pr,
        status: payment.status,
    }))
}

/// POST /api/v1/lightning/checkout
///
/// Server-driven settlement over SSE.
pub async fn handle_checkout_stream(
    State(state): State<AppState>,
    current: CurrentUser,
) -> Result<Sse<impl Stream<Item = EventResult>>, AppError> {
    let user = current.load(state.store.as_ref()).await?;
    require_lightning(&user)?;
    if !needs_invoice(&user) {
        return Err(AppError::Validation(
            "No Lightning payment is needed while credits remain".to_string(),
        ));
    }

    let (tx, rx) = mpsc::channel::<EventResult>(4);
    let cancel = CancellationToken::new();
    let disconnect = cancel.clone().drop_guard();
    let service = state.lightning.clone();
    let policy = state.config.poll_policy();

    tokio::spawn(async move {
        let present_tx = tx.clone();
        let paid = pay_if_required(&service, &user, policy, &cancel, move |invoice| {
            let _ = present_tx.try_send(Event::default().event("invoice").json_data(invoice));
        })
        .await;

        let last = match paid {
            Some(payment) => Event::default().event("settled").json_data(PaymentStatusResponse {
                pr: payment.pr,
                status: payment.status,
            }),
            None => Event::default().event("error").json_data(ErrorEvent {
                message: "Error processing payment, please try again".to_string(),
            }),
        };
        // The receiver is gone when the client disconnected.
        let _ = tx.send(last).await;
    });

    // The guard lives as long as the response stream.
    let events = stream::unfold((rx, disconnect), |(mut rx, disconnect)| async move {
        rx.recv().await.map(|event| (event, (rx, disconnect)))
    });

    Ok(Sse::new(events).keep_alive(KeepAlive::default()))
}

fn require_lightning(user: &User) -> Result<(), AppError> {
    if !user.is_using_ln {
        return Err(AppError::Validation(
            "Lightning payments are not enabled for this account".to_string(),
        ));
    }
    Ok(())
}
