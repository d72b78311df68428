//! Lightning invoice boundary: LNURL-pay (LUD-06) for minting invoices and
//! LUD-21 `verify` URLs for settlement checks.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::ln_payment::{LnPayment, LnPaymentStatus};

const REQUEST_TIMEOUT_SECS: u64 = 15;

#[derive(Debug, Error)]
pub enum LightningError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Lightning service error: {0}")]
    Service(String),

    #[error("Invoice {0} has no verify URL")]
    MissingVerifyUrl(String),
}

/// An invoice as handed to the payer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invoice {
    /// BOLT11 payment request.
    pub pr: String,
    pub verify: Option<String>,
    pub status: LnPaymentStatus,
}

#[async_trait]
pub trait LightningProvider: Send + Sync {
    async fn request_invoice(&self, amount_sats: u64) -> Result<Invoice, LightningError>;

    async fn check_status(&self, payment: &LnPayment) -> Result<LnPaymentStatus, LightningError>;
}

/// Response of an LNURL-pay callback.
#[derive(Debug, Deserialize)]
pub struct PayCallbackResponse {
    pub pr: Option<String>,
    pub verify: Option<String>,
    pub status: Option<String>,
    pub reason: Option<String>,
}

/// Response of a LUD-21 verify URL.
#[derive(Debug, Deserialize)]
pub struct VerifyResponse {
    pub status: Option<String>,
    #[serde(default)]
    pub settled: bool,
    pub reason: Option<String>,
}

impl PayCallbackResponse {
    pub fn into_invoice(self) -> Result<Invoice, LightningError> {
        if is_error(self.status.as_deref()) {
            return Err(LightningError::Service(
                self.reason.unwrap_or_else(|| "invoice request rejected".to_string()),
            ));
        }
        let pr = self
            .pr
            .filter(|pr| !pr.trim().is_empty())
            .ok_or_else(|| LightningError::Service("callback returned no invoice".to_string()))?;
        Ok(Invoice {
            pr,
            verify: self.verify,
            status: LnPaymentStatus::Pending,
        })
    }
}

impl VerifyResponse {
    /// `settled` wins; an `ERROR` status (expired, unknown) is a failed payment.
    pub fn status(&self) -> LnPaymentStatus {
        if self.settled {
            LnPaymentStatus::Success
        } else if is_error(self.status.as_deref()) {
            LnPaymentStatus::Failed
        } else {
            LnPaymentStatus::Pending
        }
    }
}

fn is_error(status: Option<&str>) -> bool {
    status.is_some_and(|s| s.eq_ignore_ascii_case("error"))
}

/// LNURL-pay client bound to one receiving wallet's callback URL.
#[derive(Clone)]
pub struct LnurlClient {
    client: Client,
    callback_url: String,
}

impl LnurlClient {
    pub fn new(callback_url: String) -> Result<Self, LightningError> {
        Ok(Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
                .build()?,
            callback_url,
        })
    }
}

#[async_trait]
impl LightningProvider for LnurlClient {
    async fn request_invoice(&self, amount_sats: u64) -> Result<Invoice, LightningError> {
        let msats = amount_sats.saturating_mul(1000);
        let response: PayCallbackResponse = self
            .client
            .get(&self.callback_url)
            .query(&[("amount", msats)])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        response.into_invoice()
    }

    async fn check_status(&self, payment: &LnPayment) -> Result<LnPaymentStatus, LightningError> {
        let url = payment
            .verify_url
            .as_deref()
            .ok_or_else(|| LightningError::MissingVerifyUrl(payment.pr.clone()))?;
        let response: VerifyResponse = self.client.get(url).send().await?.json().await?;
        if let Some(reason) = &response.reason {
            tracing::debug!("Verify for {} returned reason: {reason}", payment.pr);
        }
        Ok(response.status())
    }
}
