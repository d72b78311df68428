use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::lightning::settlement::PollPolicy;

/// Application configuration loaded from environment variables.
/// Startup fails if a required variable is missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub openai_api_key: String,
    /// LNURL-pay callback that mints invoices (LUD-06 with LUD-21 verify).
    pub ln_callback_url: String,
    pub ln_invoice_sats: u64,
    pub ln_poll_interval_ms: u64,
    pub ln_poll_max_attempts: u32,
    pub stripe_key: String,
    pub product_price_id: String,
    pub gpt4_price_id: String,
    pub credits_price_id: String,
    pub web_client_url: String,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            openai_api_key: require_env("OPENAI_API_KEY")?,
            ln_callback_url: require_env("LN_CALLBACK_URL")?,
            ln_invoice_sats: env_or("LN_INVOICE_SATS", 1000)?,
            ln_poll_interval_ms: env_or("LN_POLL_INTERVAL_MS", 1000)?,
            ln_poll_max_attempts: env_or("LN_POLL_MAX_ATTEMPTS", 600)?,
            stripe_key: require_env("STRIPE_KEY")?,
            product_price_id: require_env("PRODUCT_PRICE_ID")?,
            gpt4_price_id: require_env("GPT4_PRICE_ID")?,
            credits_price_id: require_env("PRODUCT_CREDITS_PRICE_ID")?,
            web_client_url: std::env::var("WEB_CLIENT_URL")
                .unwrap_or_else(|_| "http://localhost:3000".to_string()),
            port: env_or("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }

    pub fn poll_policy(&self) -> PollPolicy {
        PollPolicy {
            interval: Duration::from_millis(self.ln_poll_interval_ms),
            max_attempts: self.ln_poll_max_attempts.max(1),
        }
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn env_or<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has an invalid value")),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
impl Config {
    pub fn for_tests() -> Self {
        Config {
            database_url: "postgres://localhost/coverletter_test".to_string(),
            openai_api_key: "sk-test".to_string(),
            ln_callback_url: "https://ln.example.com/lnurlp/callback".to_string(),
            ln_invoice_sats: 1000,
            ln_poll_interval_ms: 1000,
            ln_poll_max_attempts: 10,
            stripe_key: "sk_test_123".to_string(),
            product_price_id: "price_sub".to_string(),
            gpt4_price_id: "price_gpt4".to_string(),
            credits_price_id: "price_credits".to_string(),
            web_client_url: "http://localhost:3000".to_string(),
            port: 8080,
            rust_log: "debug".to_string(),
        }
    }
}
