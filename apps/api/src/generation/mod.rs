// Cover letter, résumé and edit generation.
// Paid operations run inside entitlement::credits::charge; every LLM call
// goes through llm_client.

pub mod cover_letter;
pub mod edit;
pub mod handlers;
pub mod prompts;
pub mod resume;

use crate::errors::AppError;
use crate::models::user::{User, DEFAULT_GPT_MODEL};

/// Model for a request: the one asked for, else the account's, else
/// `DEFAULT_GPT_MODEL`.
pub fn resolve_model(requested: Option<&str>, user: &User) -> String {
    [requested, Some(user.gpt_model.as_str())]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|m| !m.is_empty())
        .unwrap_or(DEFAULT_GPT_MODEL)
        .to_string()
}

pub fn require_text(field: &str, value: &str) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}
