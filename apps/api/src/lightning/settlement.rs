//! Lightning Settlement Loop.
//!
//! Request an invoice, persist it as `pending`, hand it to the payer, then
//! re-check the same `pr` on a fixed interval until it settles or fails.
//! Checks are strictly sequential: one round trip, then one sleep.
//!
//! The loop is bounded by `PollPolicy::max_attempts` and stops early when
//! the caller's `CancellationToken` fires. Neither exit touches the stored
//! status, so an invoice paid after a timeout still settles on the next
//! refresh.

use std::time::Duration;

use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::errors::AppError;
use crate::lightning::client::Invoice;
use crate::lightning::service::LightningService;
use crate::models::ln_payment::{LnPayment, LnPaymentStatus};
use crate::models::user::User;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub interval: Duration,
    pub max_attempts: u32,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(1000),
            max_attempts: 600,
        }
    }
}

#[derive(Debug, Error)]
pub enum SettlementError {
    #[error("Error processing payment: {0}")]
    InvoiceRequest(AppError),

    #[error("Error checking payment status: {0}")]
    Poll(AppError),

    #[error("Lightning payment failed")]
    Failed,

    #[error("Lightning settlement timed out after {attempts} checks")]
    TimedOut { attempts: u32 },

    #[error("Lightning settlement cancelled")]
    Cancelled,
}

impl From<SettlementError> for AppError {
    fn from(e: SettlementError) -> Self {
        AppError::Invoice(e.to_string())
    }
}

/// Only Lightning users without credits pay per action.
pub fn needs_invoice(user: &User) -> bool {
    user.is_using_ln && user.credits <= 0
}

/// Runs the whole flow for `user`. Returns `None` when no invoice is needed.
///
/// `present` is called once with the pending invoice before polling starts.
pub async fn settle<P>(
    service: &LightningService,
    user: &User,
    policy: PollPolicy,
    cancel: &CancellationToken,
    present: P,
) -> Result<Option<LnPayment>, SettlementError>
where
    P: FnOnce(&Invoice),
{
    if !needs_invoice(user) {
        return Ok(None);
    }

    let invoice = service
        .request_invoice(user)
        .await
        .map_err(SettlementError::InvoiceRequest)?;
    present(&invoice);

    await_settlement(service, &invoice.pr, policy, cancel)
        .await
        .map(Some)
}

/// Polls `pr` until it leaves `pending`, the attempts run out, or `cancel` fires.
pub async fn await_settlement(
    service: &LightningService,
    pr: &str,
    policy: PollPolicy,
    cancel: &CancellationToken,
) -> Result<LnPayment, SettlementError> {
    for attempt in 1..=policy.max_attempts {
        if cancel.is_cancelled() {
            return Err(SettlementError::Cancelled);
        }

        let payment = service
            .refresh_status(pr)
            .await
            .map_err(SettlementError::Poll)?;

        match payment.status {
            LnPaymentStatus::Success => {
                info!("Lightning invoice settled after {attempt} checks");
                return Ok(payment);
            }
            LnPaymentStatus::Failed => {
                warn!("Lightning invoice failed after {attempt} checks");
                return Err(SettlementError::Failed);
            }
            LnPaymentStatus::Pending => {}
        }

        if attempt == policy.max_attempts {
            break;
        }

        tokio::select! {
            _ = cancel.cancelled() => return Err(SettlementError::Cancelled),
            _ = tokio::time::sleep(policy.interval) => {}
        }
    }

    Err(SettlementError::TimedOut {
        attempts: policy.max_attempts,
    })
}

/// Client-side variant: any error is logged and yields no payment, which the
/// entitlement check then treats as unpaid.
pub async fn pay_if_required<P>(
    service: &LightningService,
    user: &User,
    policy: PollPolicy,
    cancel: &CancellationToken,
    present: P,
) -> Option<LnPayment>
where
    P: FnOnce(&Invoice),
{
    match settle(service, user, policy, cancel, present).await {
        Ok(payment) => payment,
        Err(e) => {
            error!("Error processing payment for user {}: {e}", user.id);
            None
        }
    }
}
