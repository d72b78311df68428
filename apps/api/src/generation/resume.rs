//! Résumé optimization (paid) and re-parsing of hand-edited résumés (free).
//!
//! Both ask the model for the `ResumeDocument` JSON shape and store the
//! re-serialized document, never the raw reply.

use serde::Deserialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::entitlement::credits::{charge, Charged};
use crate::errors::AppError;
use crate::generation::prompts::{
    resume_optimizer_system, resume_optimizer_user_prompt, resume_parser_prompt,
};
use crate::generation::{require_text, resolve_model};
use crate::llm_client::{ChatMessage, ChatRequest, CompletionProvider};
use crate::models::document::{NewOptimizedResume, OptimizedResume};
use crate::models::ln_payment::LnPaymentRef;
use crate::models::resume::ResumeDocument;
use crate::store::Store;

const OPTIMIZE_TEMPERATURE: f32 = 0.5;
const PARSE_TEMPERATURE: f32 = 0.2;

#[derive(Debug, Clone, Deserialize)]
pub struct OptimizeResumeRequest {
    pub job_id: Uuid,
    pub resume: String,
    pub job_description: String,
    pub gpt_model: Option<String>,
    pub ln_payment: Option<LnPaymentRef>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EditResumeRequest {
    pub content: String,
    pub gpt_model: Option<String>,
}

pub async fn optimize_resume<S: Store + ?Sized>(
    store: &S,
    llm: &dyn CompletionProvider,
    user_id: Uuid,
    request: OptimizeResumeRequest,
) -> Result<Charged<OptimizedResume>, AppError> {
    let OptimizeResumeRequest {
        job_id,
        resume,
        job_description,
        gpt_model,
        ln_payment,
    } = request;
    require_text("resume", &resume)?;
    require_text("job_description", &job_description)?;
    store
        .find_job(user_id, job_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Job not found".to_string()))?;

    charge(
        store,
        user_id,
        ln_payment.as_ref(),
        "optimize_resume",
        |user| async move {
            let chat = ChatRequest {
                model: resolve_model(gpt_model.as_deref(), &user),
                messages: vec![
                    ChatMessage::system(resume_optimizer_system()),
                    ChatMessage::user(resume_optimizer_user_prompt(&resume, &job_description)),
                ],
                temperature: OPTIMIZE_TEMPERATURE,
            };
            let completion = llm.complete(&chat).await?;

            let document = ResumeDocument::parse(&completion.content).map_err(|e| {
                AppError::Upstream(format!("model did not return a valid résumé: {e}"))
            })?;
            let content = serde_json::to_string(&document)
                .map_err(|e| AppError::Internal(anyhow::Error::new(e)))?;
            info!("Optimized résumé for job {job_id}");

            store
                .create_optimized_resume(NewOptimizedResume {
                    user_id: user.id,
                    job_id,
                    content,
                    original_resume: resume,
                    job_description,
                })
                .await
        },
    )
    .await
}

/// Re-parses a hand-edited résumé into the structured form. Not charged.
pub async fn edit_resume<S: Store + ?Sized>(
    store: &S,
    llm: &dyn CompletionProvider,
    user_id: Uuid,
    resume_id: Uuid,
    request: EditResumeRequest,
) -> Result<OptimizedResume, AppError> {
    require_text("content", &request.content)?;
    let user = store
        .find_user(user_id)
        .await?
        .ok_or(AppError::Unauthorized)?;
    store
        .find_optimized_resume(user_id, resume_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Optimized resume not found".to_string()))?;

    let chat = ChatRequest {
        model: resolve_model(request.gpt_model.as_deref(), &user),
        messages: vec![ChatMessage::system(resume_parser_prompt(&request.content))],
        temperature: PARSE_TEMPERATURE,
    };
    let completion = llm.complete(&chat).await?;

    let document = ResumeDocument::parse(&completion.content).map_err(|e| {
        warn!("Résumé parse for {resume_id} returned invalid JSON: {e}");
        AppError::Validation("AI did not return valid JSON.".to_string())
    })?;
    let content =
        serde_json::to_string(&document).map_err(|e| AppError::Internal(anyhow::Error::new(e)))?;

    store
        .update_optimized_resume_content(user_id, resume_id, &content)
        .await
}
