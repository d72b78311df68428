//! Stripe Checkout for the subscription, GPT-4 subscription and credit pack.

pub mod handlers;
pub mod stripe;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::config::Config;
use crate::errors::AppError;
use crate::models::user::User;
use crate::store::UserStore;

#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Stripe error (status {status}): {message}")]
    Stripe { status: u16, message: String },

    #[error("Stripe returned no {0}")]
    MissingField(&'static str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Product {
    Subscription,
    Gpt4Subscription,
    Credits,
}

impl Product {
    pub fn from_slug(slug: &str) -> Option<Self> {
        match slug {
            "subscription" => Some(Product::Subscription),
            "gpt4" | "gpt4-subscription" => Some(Product::Gpt4Subscription),
            "credits" => Some(Product::Credits),
            _ => None,
        }
    }

    pub fn is_subscription(&self) -> bool {
        !matches!(self, Product::Credits)
    }

    pub fn mode(&self) -> &'static str {
        if self.is_subscription() {
            "subscription"
        } else {
            "payment"
        }
    }

    pub fn price_id<'a>(&self, config: &'a Config) -> &'a str {
        match self {
            Product::Subscription => &config.product_price_id,
            Product::Gpt4Subscription => &config.gpt4_price_id,
            Product::Credits => &config.credits_price_id,
        }
    }

    fn success_query(&self) -> &'static str {
        if self.is_subscription() {
            "success=true"
        } else {
            "credits=true"
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CheckoutSession {
    pub id: String,
    pub url: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CheckoutResponse {
    pub session_url: Option<String>,
    pub session_id: String,
}

#[async_trait]
pub trait CheckoutProvider: Send + Sync {
    /// Returns the id of the customer registered under `email`, creating one if needed.
    async fn find_or_create_customer(&self, email: &str) -> Result<String, CheckoutError>;

    async fn create_session(
        &self,
        form: &[(&'static str, String)],
    ) -> Result<CheckoutSession, CheckoutError>;
}

/// Form body for `POST /v1/checkout/sessions`.
pub fn session_form(
    product: Product,
    price_id: &str,
    customer_id: &str,
    domain: &str,
) -> Vec<(&'static str, String)> {
    let domain = domain.trim_end_matches('/');
    vec![
        ("line_items[0][price]", price_id.to_string()),
        ("line_items[0][quantity]", "1".to_string()),
        ("mode", product.mode().to_string()),
        (
            "success_url",
            format!("{domain}/checkout?{}", product.success_query()),
        ),
        ("cancel_url", format!("{domain}/checkout?canceled=true")),
        ("automatic_tax[enabled]", "false".to_string()),
        ("customer_update[address]", "auto".to_string()),
        ("customer", customer_id.to_string()),
    ]
}

/// Opens a checkout session for `user` and records the Stripe customer.
pub async fn start_checkout<S: UserStore + ?Sized>(
    store: &S,
    provider: &dyn CheckoutProvider,
    config: &Config,
    user: &User,
    product: Product,
) -> Result<CheckoutResponse, AppError> {
    let email = user
        .email
        .as_deref()
        .filter(|e| !e.trim().is_empty())
        .ok_or(AppError::Unauthorized)?;

    let customer_id = provider.find_or_create_customer(email).await?;
    let form = session_form(
        product,
        product.price_id(config),
        &customer_id,
        &config.web_client_url,
    );
    let session = provider.create_session(&form).await?;

    let session_id = product.is_subscription().then_some(session.id.as_str());
    store.record_checkout(user.id, &customer_id, session_id).await?;
    info!("Created {} checkout session for user {}", product.mode(), user.id);

    Ok(CheckoutResponse {
        session_url: session.url,
        session_id: session.id,
    })
}
