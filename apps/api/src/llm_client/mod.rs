/// LLM Client: the single point of entry for all completion API calls.
///
/// ARCHITECTURAL RULE: No other module may call the OpenAI API directly.
/// Generation code depends on `CompletionProvider`, never on `reqwest`.
///
/// A failed completion is never retried here: a paid call either produces
/// content once or fails and the caller refunds.
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

pub mod prompts;

const OPENAI_API_URL: &str = "https://api.openai.com/v1/chat/completions";
const REQUEST_TIMEOUT_SECS: u64 = 120;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("LLM returned empty content")]
    EmptyContent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// Body of a chat completion call.
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
}

#[derive(Debug, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    pub choices: Vec<Choice>,
    pub usage: Option<Usage>,
    pub error: Option<ApiErrorBody>,
}

#[derive(Debug, Deserialize)]
pub struct Choice {
    pub message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
pub struct ChoiceMessage {
    pub content: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Usage {
    #[serde(default)]
    pub completion_tokens: u32,
}

#[derive(Debug, Deserialize)]
pub struct ApiErrorBody {
    pub message: Option<String>,
}

/// The only parts of a completion the rest of the service consumes.
#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
    pub content: String,
    pub completion_tokens: u32,
}

impl ChatResponse {
    /// Extracts `choices[0].message.content` and `usage.completion_tokens`,
    /// surfacing `error.message` as an API failure.
    pub fn into_completion(self, status: u16) -> Result<Completion, LlmError> {
        if let Some(error) = self.error {
            return Err(LlmError::Api {
                status,
                message: error
                    .message
                    .unwrap_or_else(|| "Something went wrong".to_string()),
            });
        }

        let content = self
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|c| !c.trim().is_empty())
            .ok_or(LlmError::EmptyContent)?;

        Ok(Completion {
            content,
            completion_tokens: self.usage.unwrap_or_default().completion_tokens,
        })
    }
}

/// Pluggable completion backend. `AppState` carries it as `Arc<dyn CompletionProvider>`.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    async fn complete(&self, request: &ChatRequest) -> Result<Completion, LlmError>;
}

/// OpenAI chat completions client.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    api_key: String,
}

impl LlmClient {
    pub fn new(api_key: String) -> Result<Self, LlmError> {
        Ok(Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
                .build()?,
            api_key,
        })
    }
}

#[async_trait]
impl CompletionProvider for LlmClient {
    async fn complete(&self, request: &ChatRequest) -> Result<Completion, LlmError> {
        let response = self
            .client
            .post(OPENAI_API_URL)
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        let parsed = match serde_json::from_str::<ChatResponse>(&body) {
            Ok(parsed) => parsed,
            Err(_) if !status.is_success() => {
                return Err(LlmError::Api {
                    status: status.as_u16(),
                    message: body,
                })
            }
            Err(e) => return Err(LlmError::Parse(e)),
        };

        let completion = parsed.into_completion(status.as_u16())?;

        debug!(
            "LLM call succeeded: model={}, completion_tokens={}",
            request.model, completion.completion_tokens
        );

        Ok(completion)
    }
}

/// Strips ```json ... ``` or ``` ... ``` code fences from LLM output.
pub fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    let inner = text
        .strip_prefix("```json")
        .or_else(|| text.strip_prefix("```"));
    match inner {
        Some(stripped) => {
            let stripped = stripped.trim_start();
            stripped
                .strip_suffix("```")
                .map(str::trim)
                .unwrap_or(stripped)
        }
        None => text,
    }
}
