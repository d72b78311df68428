use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use thiserror::Error;
use uuid::Uuid;

/// Settlement state of a Lightning invoice.
///
/// Only `Pending` may transition; `Success` and `Failed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LnPaymentStatus {
    Pending,
    Success,
    Failed,
}

impl LnPaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LnPaymentStatus::Pending => "pending",
            LnPaymentStatus::Success => "success",
            LnPaymentStatus::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, LnPaymentStatus::Pending)
    }
}

impl fmt::Display for LnPaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
#[error("unknown invoice status '{0}'")]
pub struct UnknownStatus(pub String);

impl TryFrom<String> for LnPaymentStatus {
    type Error = UnknownStatus;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "pending" => Ok(LnPaymentStatus::Pending),
            "success" => Ok(LnPaymentStatus::Success),
            "failed" => Ok(LnPaymentStatus::Failed),
            _ => Err(UnknownStatus(value)),
        }
    }
}

/// A persisted Lightning invoice, keyed by its BOLT11 payment request.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct LnPayment {
    pub pr: String,
    pub user_id: Uuid,
    #[sqlx(try_from = "String")]
    pub status: LnPaymentStatus,
    pub verify_url: Option<String>,
    /// Set when a paid action spends this invoice. One invoice, one action.
    pub consumed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// What a client sends back with a generation request after paying.
/// Only the key is trusted; the status is always re-read server-side.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LnPaymentRef {
    pub pr: String,
}

#[cfg(test)]
impl LnPayment {
    pub fn test_payment(pr: &str, user_id: Uuid, status: LnPaymentStatus) -> Self {
        LnPayment {
            pr: pr.to_string(),
            user_id,
            status,
            verify_url: None,
            consumed_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }
}
