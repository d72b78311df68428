use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

use crate::checkout::{CheckoutError, CheckoutProvider, CheckoutSession};

const STRIPE_API_URL: &str = "https://api.stripe.com/v1";
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Stripe REST client (form-encoded requests, secret key as bearer).
#[derive(Clone)]
pub struct StripeClient {
    client: Client,
    secret_key: String,
}

#[derive(Debug, Deserialize)]
struct Customer {
    id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CustomerList {
    #[serde(default)]
    data: Vec<Customer>,
}

#[derive(Debug, Deserialize)]
struct StripeErrorBody {
    error: StripeErrorDetail,
}

#[derive(Debug, Deserialize)]
struct StripeErrorDetail {
    message: Option<String>,
}

impl StripeClient {
    pub fn new(secret_key: String) -> Result<Self, CheckoutError> {
        Ok(Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
                .build()?,
            secret_key,
        })
    }
}

/// Decodes a Stripe reply, surfacing `error.message` on non-2xx.
async fn parse<T: DeserializeOwned>(response: Response) -> Result<T, CheckoutError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response.json().await?);
    }
    let body = response.text().await?;
    let message = serde_json::from_str::<StripeErrorBody>(&body)
        .ok()
        .and_then(|b| b.error.message)
        .unwrap_or(body);
    Err(CheckoutError::Stripe {
        status: status.as_u16(),
        message,
    })
}

#[async_trait]
impl CheckoutProvider for StripeClient {
    async fn find_or_create_customer(&self, email: &str) -> Result<String, CheckoutError> {
        let existing: CustomerList = parse(
            self.client
                .get(format!("{STRIPE_API_URL}/customers"))
                .bearer_auth(&self.secret_key)
                .query(&[("email", email), ("limit", "1")])
                .send()
                .await?,
        )
        .await?;

        if let Some(id) = existing.data.into_iter().find_map(|c| c.id) {
            debug!("Using existing Stripe customer");
            return Ok(id);
        }

        debug!("Creating Stripe customer");
        let created: Customer = parse(
            self.client
                .post(format!("{STRIPE_API_URL}/customers"))
                .bearer_auth(&self.secret_key)
                .form(&[("email", email)])
                .send()
                .await?,
        )
        .await?;
        created.id.ok_or(CheckoutError::MissingField("customer id"))
    }

    async fn create_session(
        &self,
        form: &[(&'static str, String)],
    ) -> Result<CheckoutSession, CheckoutError> {
        parse(
            self.client
                .post(format!("{STRIPE_API_URL}/checkout/sessions"))
                .bearer_auth(&self.secret_key)
                .form(form)
                .send()
                .await?,
        )
        .await
    }
}
