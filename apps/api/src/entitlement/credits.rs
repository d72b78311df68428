//! Credit Accounting: the one wrapper every paid operation goes through.
//!
//! 1. Reload the user and re-run `can_proceed` (402 on BLOCK).
//! 2. If the grant consumes a credit, decrement before the external call.
//!    A Lightning grant claims its invoice instead, so one invoice pays for
//!    one action.
//! 3. Run the operation.
//! 4. On any failure other than `PaymentRequired`, refund the credit (or
//!    release the invoice) and re-raise the original error.
//!
//! The decrement and the refund are separate statements around the external
//! call. A crash between them loses the credit. Two concurrent requests from
//! the same user can both pass the check; the guarded decrement lets only
//! one of them spend the last credit.

use std::future::Future;

use serde::Serialize;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::entitlement::checker::{can_proceed, is_low_balance, Decision, Grant};
use crate::errors::AppError;
use crate::models::ln_payment::LnPaymentRef;
use crate::models::user::User;
use crate::store::{LnPaymentStore, UserStore};

/// Result of a paid operation plus what it cost.
#[derive(Debug, Clone, Serialize)]
pub struct Charged<T> {
    pub result: T,
    pub grant: Grant,
    /// Balance after the decrement, when a credit was consumed.
    pub credits_remaining: Option<i32>,
    pub low_balance_warning: bool,
}

/// Runs `operation` behind the entitlement gate with compensating refund.
///
/// `label` names the operation in logs.
pub async fn charge<S, T, F, Fut>(
    store: &S,
    user_id: Uuid,
    ln_payment: Option<&LnPaymentRef>,
    label: &str,
    operation: F,
) -> Result<Charged<T>, AppError>
where
    S: UserStore + LnPaymentStore + ?Sized,
    F: FnOnce(User) -> Fut,
    Fut: Future<Output = Result<T, AppError>>,
{
    let user = store
        .find_user(user_id)
        .await?
        .ok_or(AppError::Unauthorized)?;

    let payment = match ln_payment {
        Some(reference) => store.find_payment(&reference.pr).await?,
        None => None,
    };

    let grant = match can_proceed(&user, payment.as_ref()) {
        Decision::Pass(grant) => grant,
        Decision::Block(reason) => {
            warn!("{label} blocked for user {user_id}: {reason:?}");
            return Err(AppError::PaymentRequired(reason.message().to_string()));
        }
    };

    let mut credits_remaining = None;
    let mut claimed_pr = None;
    match grant {
        Grant::Credits => match store.decrement_credit(user_id).await? {
            Some(left) => {
                info!("Decremented credits for user {user_id}: {left} left");
                credits_remaining = Some(left);
            }
            None => {
                // Another request spent the last credit after our check.
                warn!("{label}: user {user_id} ran out of credits before decrement");
                return Err(AppError::PaymentRequired(
                    "User has not paid or is out of credits".to_string(),
                ));
            }
        },
        Grant::Lightning => {
            let claimed = match payment.as_ref() {
                Some(p) => store.claim_payment(&p.pr, user_id).await?,
                None => None,
            };
            let Some(claimed) = claimed else {
                warn!("{label}: user {user_id} sent an invoice that is already spent");
                return Err(AppError::PaymentRequired(
                    "This lightning payment has already been used".to_string(),
                ));
            };
            claimed_pr = Some(claimed.pr);
        }
        Grant::Subscription => {}
    }

    match operation(user).await {
        Ok(result) => Ok(Charged {
            result,
            grant,
            credits_remaining,
            low_balance_warning: credits_remaining.is_some_and(is_low_balance),
        }),
        Err(err) => {
            if credits_remaining.is_some() && !err.is_payment_required() {
                match store.refund_credit(user_id).await {
                    Ok(balance) => info!("Refunded credit to user {user_id}: {balance} now"),
                    Err(refund_err) => {
                        error!("Credit refund failed for user {user_id}: {refund_err}")
                    }
                }
            }
            if let Some(pr) = claimed_pr.filter(|_| !err.is_payment_required()) {
                match store.release_payment(&pr).await {
                    Ok(()) => info!("Released lightning invoice for user {user_id}"),
                    Err(release_err) => {
                        error!("Invoice release failed for user {user_id}: {release_err}")
                    }
                }
            }
            error!("{label} failed for user {user_id}: {err}");
            Err(err)
        }
    }
}
