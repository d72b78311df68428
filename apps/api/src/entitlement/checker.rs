//! Entitlement Checker: decides whether a user may invoke a paid generation.
//!
//! Pure: no I/O, no mutation. The decision says whether a credit must be
//! consumed; `credits::charge` performs it.
//!
//! Evaluation order (first match wins):
//! 1. subscription past due        → BLOCK, send to billing
//! 2. Lightning user, no credits   → PASS only with a settled invoice
//!    Lightning user, credits left → PASS on credits, no invoice needed
//! 3. not subscribed, credits left → PASS, consume one credit
//! 4. subscribed                   → PASS, no mutation
//! 5. otherwise                    → BLOCK

use serde::Serialize;

use crate::models::ln_payment::{LnPayment, LnPaymentStatus};
use crate::models::user::User;

/// A post-decrement balance strictly below this (and above zero) triggers the warning.
pub const LOW_BALANCE_THRESHOLD: i32 = 3;

/// How a request was let through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Grant {
    Subscription,
    /// One credit is consumed around the paid call.
    Credits,
    /// A settled, unspent Lightning invoice covers this action.
    Lightning,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockReason {
    PastDue,
    LightningUnpaid,
    NoEntitlement,
}

impl BlockReason {
    pub fn message(&self) -> &'static str {
        match self {
            BlockReason::PastDue => {
                "Your subscription is past due. Please update your payment method."
            }
            BlockReason::LightningUnpaid => "Your lightning payment has not been paid",
            BlockReason::NoEntitlement => "User must pay to continue",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Pass(Grant),
    Block(BlockReason),
}

/// Server-side entitlement decision over freshly loaded state.
///
/// `ln_payment` must be the persisted row looked up by the client's `pr`;
/// it only counts when it is settled and belongs to `user`.
pub fn can_proceed(user: &User, ln_payment: Option<&LnPayment>) -> Decision {
    if user.is_past_due() {
        return Decision::Block(BlockReason::PastDue);
    }

    if user.is_using_ln {
        if user.credits <= 0 {
            let settled = ln_payment.is_some_and(|p| {
                p.status == LnPaymentStatus::Success && p.user_id == user.id
            });
            return if settled {
                Decision::Pass(Grant::Lightning)
            } else {
                Decision::Block(BlockReason::LightningUnpaid)
            };
        }
        // Existing credits take priority over the invoice flow.
        return Decision::Pass(if user.has_paid {
            Grant::Subscription
        } else {
            Grant::Credits
        });
    }

    if !user.has_paid && user.credits > 0 {
        return Decision::Pass(Grant::Credits);
    }

    if user.has_paid {
        return Decision::Pass(Grant::Subscription);
    }

    Decision::Block(BlockReason::NoEntitlement)
}

/// Non-blocking warning for a balance left after a decrement.
pub fn is_low_balance(remaining: i32) -> bool {
    remaining > 0 && remaining < LOW_BALANCE_THRESHOLD
}

/// What the client should do before submitting a paid action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ClientAction {
    Proceed,
    /// Subscription past due: send the user to billing.
    UpdateBilling,
    /// No subscription, credits, or Lightning opt-in.
    Purchase,
}

#[derive(Debug, Clone, Serialize)]
pub struct Advice {
    pub action: ClientAction,
    /// A Lightning invoice must be settled before submitting.
    pub invoice_required: bool,
    pub low_balance_warning: bool,
    pub credits: i32,
}

/// Advisory pre-check for clients. Cheaper than a round trip through a paid
/// endpoint, but never authoritative: the paid endpoints re-run `can_proceed`.
pub fn advise(user: &User) -> Advice {
    let low_balance = is_low_balance(user.credits);
    let (action, invoice_required, low_balance_warning) = if user.is_past_due() {
        (ClientAction::UpdateBilling, false, false)
    } else if user.is_using_ln {
        (ClientAction::Proceed, user.credits <= 0, low_balance)
    } else if !user.has_paid && user.credits > 0 {
        (ClientAction::Proceed, false, low_balance)
    } else if user.has_paid {
        (ClientAction::Proceed, false, false)
    } else {
        (ClientAction::Purchase, false, false)
    };

    Advice {
        action,
        invoice_required,
        low_balance_warning,
        credits: user.credits,
    }
}
