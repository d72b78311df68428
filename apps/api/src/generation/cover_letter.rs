//! Cover letter generation.
//!
//! `generate_cover_letter` and `update_cover_letter` are paid: each runs one
//! completion inside a single `charge`. `edit_cover_letter` is a plain
//! content update.

use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::entitlement::credits::{charge, Charged};
use crate::errors::AppError;
use crate::generation::prompts::{cover_letter_user_prompt, CoverLetterStyle};
use crate::generation::{require_text, resolve_model};
use crate::llm_client::{ChatMessage, ChatRequest, CompletionProvider};
use crate::models::document::{CoverLetter, Job, NewCoverLetter};
use crate::models::ln_payment::LnPaymentRef;
use crate::models::user::User;
use crate::store::Store;

pub const DEFAULT_TEMPERATURE: f32 = 0.7;
const MAX_TEMPERATURE: f32 = 2.0;

fn default_true() -> bool {
    true
}

fn default_temperature() -> f32 {
    DEFAULT_TEMPERATURE
}

/// Knobs shared by generation and regeneration.
#[derive(Debug, Clone, Deserialize)]
pub struct CoverLetterOptions {
    #[serde(default = "default_true")]
    pub is_complete_cover_letter: bool,
    #[serde(default)]
    pub include_witty_remark: bool,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    pub gpt_model: Option<String>,
}

impl Default for CoverLetterOptions {
    fn default() -> Self {
        Self {
            is_complete_cover_letter: true,
            include_witty_remark: false,
            temperature: DEFAULT_TEMPERATURE,
            gpt_model: None,
        }
    }
}

impl CoverLetterOptions {
    fn validate(&self) -> Result<(), AppError> {
        if !(0.0..=MAX_TEMPERATURE).contains(&self.temperature) {
            return Err(AppError::Validation(format!(
                "temperature must be between 0 and {MAX_TEMPERATURE}"
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct GenerateCoverLetterRequest {
    pub job_id: Uuid,
    /// The applicant's résumé text.
    pub resume: String,
    #[serde(flatten)]
    pub options: CoverLetterOptions,
    pub ln_payment: Option<LnPaymentRef>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateCoverLetterRequest {
    /// Replaces the job's stored description.
    pub description: String,
    pub resume: String,
    #[serde(flatten)]
    pub options: CoverLetterOptions,
    pub ln_payment: Option<LnPaymentRef>,
}

pub async fn generate_cover_letter<S: Store + ?Sized>(
    store: &S,
    llm: &dyn CompletionProvider,
    user_id: Uuid,
    request: GenerateCoverLetterRequest,
) -> Result<Charged<CoverLetter>, AppError> {
    let GenerateCoverLetterRequest {
        job_id,
        resume,
        options,
        ln_payment,
    } = request;
    require_text("resume", &resume)?;
    options.validate()?;
    let job = find_job(store, user_id, job_id).await?;

    charge(
        store,
        user_id,
        ln_payment.as_ref(),
        "generate_cover_letter",
        |user| async move {
            write_cover_letter(store, llm, &user, &job, &job.description, &resume, &options).await
        },
    )
    .await
}

/// Writes a new letter for an existing job from a revised description and
/// links it to the job.
pub async fn update_cover_letter<S: Store + ?Sized>(
    store: &S,
    llm: &dyn CompletionProvider,
    user_id: Uuid,
    job_id: Uuid,
    request: UpdateCoverLetterRequest,
) -> Result<Charged<CoverLetter>, AppError> {
    let UpdateCoverLetterRequest {
        description,
        resume,
        options,
        ln_payment,
    } = request;
    require_text("description", &description)?;
    require_text("resume", &resume)?;
    options.validate()?;
    let job = find_job(store, user_id, job_id).await?;

    charge(
        store,
        user_id,
        ln_payment.as_ref(),
        "update_cover_letter",
        |user| async move {
            let letter =
                write_cover_letter(store, llm, &user, &job, &description, &resume, &options).await?;
            store
                .attach_cover_letter(job.id, letter.id, &description)
                .await?;
            Ok(letter)
        },
    )
    .await
}

pub async fn edit_cover_letter<S: Store + ?Sized>(
    store: &S,
    user_id: Uuid,
    cover_letter_id: Uuid,
    content: &str,
) -> Result<CoverLetter, AppError> {
    require_text("content", content)?;
    store
        .update_cover_letter_content(user_id, cover_letter_id, content)
        .await
}

async fn find_job<S: Store + ?Sized>(store: &S, user_id: Uuid, job_id: Uuid) -> Result<Job, AppError> {
    store
        .find_job(user_id, job_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Job not found".to_string()))
}

async fn write_cover_letter<S: Store + ?Sized>(
    store: &S,
    llm: &dyn CompletionProvider,
    user: &User,
    job: &Job,
    description: &str,
    resume: &str,
    options: &CoverLetterOptions,
) -> Result<CoverLetter, AppError> {
    let style = CoverLetterStyle::from_flags(
        options.is_complete_cover_letter,
        options.include_witty_remark,
    );
    let request = ChatRequest {
        model: resolve_model(options.gpt_model.as_deref(), user),
        messages: vec![
            ChatMessage::system(style.system_prompt()),
            ChatMessage::user(cover_letter_user_prompt(
                resume,
                &job.title,
                &job.company,
                &job.location,
                description,
            )),
        ],
        temperature: options.temperature,
    };

    let completion = llm.complete(&request).await?;
    info!(
        "Generated {style:?} cover letter for job {} ({} tokens)",
        job.id, completion.completion_tokens
    );

    store
        .create_cover_letter(NewCoverLetter {
            user_id: user.id,
            job_id: job.id,
            title: job.title.clone(),
            content: completion.content,
            token_usage: i32::try_from(completion.completion_tokens).unwrap_or(i32::MAX),
        })
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entitlement::checker::Grant;
    use crate::store::memory::MemoryStore;
    use crate::testing::ScriptedCompletion;

    fn credit_user(credits: i32) -> User {
        User {
            credits,
            ..User::test_user()
        }
    }

    fn request(job_id: Uuid) -> GenerateCoverLetterRequest {
        GenerateCoverLetterRequest {
            job_id,
            resume: "Ada Lovelace. Rust engineer, five years of payments.".to_string(),
            options: CoverLetterOptions::default(),
            ln_payment: None,
        }
    }

    #[tokio::test]
    async fn test_generate_stores_letter_and_spends_a_credit() {
        let user = credit_user(2);
        let store = MemoryStore::with_user(user.clone());
        let job = store.insert_job(user.id);
        let llm = ScriptedCompletion::replying("Dear Acme Payments team");

        let charged = generate_cover_letter(&store, &llm, user.id, request(job.id))
            .await
            .unwrap();

        assert_eq!(charged.result.content, "Dear Acme Payments team");
        assert_eq!(charged.result.token_usage, 120);
        assert_eq!(charged.grant, Grant::Credits);
        assert_eq!(store.credits(user.id), 1);
        assert_eq!(store.cover_letter_count(), 1);

        let sent = llm.last_request().unwrap();
        assert_eq!(sent.model, "gpt-4o-mini");
        assert!(sent.messages[1].content.contains("Company: Acme Payments"));
    }

    #[tokio::test]
    async fn test_generate_refunds_on_upstream_failure() {
        let user = credit_user(2);
        let store = MemoryStore::with_user(user.clone());
        let job = store.insert_job(user.id);
        let llm = ScriptedCompletion::failing("The server had an error");

        let err = generate_cover_letter(&store, &llm, user.id, request(job.id))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Upstream(_)));
        assert_eq!(store.credits(user.id), 2);
        assert_eq!(store.refunds(), 1);
        assert_eq!(store.cover_letter_count(), 0);
    }

    #[tokio::test]
    async fn test_unknown_job_is_rejected_before_charging() {
        let user = credit_user(2);
        let store = MemoryStore::with_user(user.clone());
        let llm = ScriptedCompletion::replying("unused");

        let err = generate_cover_letter(&store, &llm, user.id, request(Uuid::new_v4()))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::NotFound(_)));
        assert_eq!(store.decrements(), 0);
        assert_eq!(llm.calls(), 0);
    }

    #[tokio::test]
    async fn test_out_of_range_temperature_is_a_validation_error() {
        let user = credit_user(2);
        let store = MemoryStore::with_user(user.clone());
        let job = store.insert_job(user.id);
        let llm = ScriptedCompletion::replying("unused");
        let mut req = request(job.id);
        req.options.temperature = 3.5;

        let err = generate_cover_letter(&store, &llm, user.id, req).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert_eq!(store.credits(user.id), 2);
    }

    #[tokio::test]
    async fn test_update_links_letter_and_stores_new_description() {
        let user = credit_user(3);
        let store = MemoryStore::with_user(user.clone());
        let job = store.insert_job(user.id);
        let llm = ScriptedCompletion::replying("Revised letter");

        let charged = update_cover_letter(
            &store,
            &llm,
            user.id,
            job.id,
            UpdateCoverLetterRequest {
                description: "Now also on-call for the ledger.".to_string(),
                resume: "Ada Lovelace".to_string(),
                options: CoverLetterOptions::default(),
                ln_payment: None,
            },
        )
        .await
        .unwrap();

        let stored = store.job(job.id).unwrap();
        assert_eq!(stored.cover_letter_id, Some(charged.result.id));
        assert_eq!(stored.description, "Now also on-call for the ledger.");
        assert!(llm.last_request().unwrap().messages[1]
            .content
            .contains("Now also on-call for the ledger."));
        assert_eq!(store.credits(user.id), 2);
        assert_eq!(store.decrements(), 1);
    }

    #[tokio::test]
    async fn test_update_refunds_on_upstream_failure() {
        let user = credit_user(1);
        let store = MemoryStore::with_user(user.clone());
        let job = store.insert_job(user.id);
        let llm = ScriptedCompletion::failing("rate limited");

        let err = update_cover_letter(
            &store,
            &llm,
            user.id,
            job.id,
            UpdateCoverLetterRequest {
                description: "New description".to_string(),
                resume: "Ada Lovelace".to_string(),
                options: CoverLetterOptions::default(),
                ln_payment: None,
            },
        )
        .await
        .unwrap_err();

        assert!(matches!(err, AppError::Upstream(_)));
        assert_eq!(store.credits(user.id), 1);
        assert_eq!(store.job(job.id).unwrap().cover_letter_id, None);
    }

    #[tokio::test]
    async fn test_edit_is_free_and_scoped_to_owner() {
        let user = credit_user(1);
        let store = MemoryStore::with_user(user.clone());
        let job = store.insert_job(user.id);
        let llm = ScriptedCompletion::replying("Original");
        let letter = generate_cover_letter(&store, &llm, user.id, request(job.id))
            .await
            .unwrap()
            .result;
        assert_eq!(store.credits(user.id), 0);

        let edited = edit_cover_letter(&store, user.id, letter.id, "Hand-tuned letter")
            .await
            .unwrap();
        assert_eq!(edited.content, "Hand-tuned letter");
        assert_eq!(store.decrements(), 1);

        let err = edit_cover_letter(&store, Uuid::new_v4(), letter.id, "hijack")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[test]
    fn test_options_default_to_a_complete_letter() {
        let req: GenerateCoverLetterRequest = serde_json::from_value(serde_json::json!({
            "job_id": Uuid::new_v4(),
            "resume": "Ada"
        }))
        .unwrap();
        assert!(req.options.is_complete_cover_letter);
        assert!(!req.options.include_witty_remark);
        assert_eq!(req.options.temperature, DEFAULT_TEMPERATURE);
        assert!(req.ln_payment.is_none());
    }
}
