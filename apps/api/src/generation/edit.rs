use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entitlement::credits::{charge, Charged};
use crate::errors::AppError;
use crate::generation::prompts::{editor_user_prompt, EDITOR_SYSTEM};
use crate::generation::require_text;
use crate::llm_client::{ChatMessage, ChatRequest, CompletionProvider};
use crate::models::ln_payment::LnPaymentRef;
use crate::store::Store;

const EDIT_TEMPERATURE: f32 = 0.5;

#[derive(Debug, Clone, Deserialize)]
pub struct GenerateEditRequest {
    /// Passage selected from a cover letter.
    pub content: String,
    /// How it should change, e.g. "concise", "enthusiastic".
    pub improvement: String,
    pub ln_payment: Option<LnPaymentRef>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Revision {
    pub revision: String,
}

/// GPT-4 tier accounts get the larger model for edits, everyone else the mini one.
pub fn edit_model_for(account_model: &str) -> &'static str {
    match account_model {
        "gpt-4" | "gpt-4o" => "gpt-4o",
        _ => "gpt-4o-mini",
    }
}

pub async fn generate_edit<S: Store + ?Sized>(
    store: &S,
    llm: &dyn CompletionProvider,
    user_id: Uuid,
    request: GenerateEditRequest,
) -> Result<Charged<Revision>, AppError> {
    let GenerateEditRequest {
        content,
        improvement,
        ln_payment,
    } = request;
    require_text("content", &content)?;
    require_text("improvement", &improvement)?;

    charge(
        store,
        user_id,
        ln_payment.as_ref(),
        "generate_edit",
        |user| async move {
            let chat = ChatRequest {
                model: edit_model_for(&user.gpt_model).to_string(),
                messages: vec![
                    ChatMessage::system(EDITOR_SYSTEM),
                    ChatMessage::user(editor_user_prompt(&content, &improvement)),
                ],
                temperature: EDIT_TEMPERATURE,
            };
            let completion = llm.complete(&chat).await?;
            Ok(Revision {
                revision: completion.content,
            })
        },
    )
    .await
}
