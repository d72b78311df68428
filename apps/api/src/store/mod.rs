//! Persistence seams for the payment gate and the generation endpoints.
//!
//! `PgStore` backs production; tests run against `MemoryStore`. Handlers only
//! see `Arc<dyn Store>` from `AppState`.

use async_trait::async_trait;
use uuid::Uuid;

use crate::errors::AppError;
use crate::lightning::client::Invoice;
use crate::models::document::{
    CoverLetter, Job, JobInput, JobUpdate, NewCoverLetter, NewOptimizedResume, OptimizedResume,
};
use crate::models::ln_payment::{LnPayment, LnPaymentStatus};
use crate::models::user::{User, UserPreferences};

#[cfg(test)]
pub mod memory;
pub mod postgres;

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_user(&self, id: Uuid) -> Result<Option<User>, AppError>;

    /// Takes one credit if any is left and returns the new balance.
    /// `None` means the balance was already zero.
    async fn decrement_credit(&self, id: Uuid) -> Result<Option<i32>, AppError>;

    /// Gives one credit back and returns the new balance.
    async fn refund_credit(&self, id: Uuid) -> Result<i32, AppError>;

    async fn update_preferences(
        &self,
        id: Uuid,
        prefs: &UserPreferences,
    ) -> Result<User, AppError>;

    /// Records the Stripe customer and, for subscriptions, the checkout session.
    async fn record_checkout(
        &self,
        id: Uuid,
        stripe_id: &str,
        checkout_session_id: Option<&str>,
    ) -> Result<(), AppError>;
}

#[async_trait]
pub trait LnPaymentStore: Send + Sync {
    /// Inserts the invoice as `pending`. An existing row keeps its status.
    async fn upsert_pending(&self, invoice: &Invoice, user_id: Uuid)
        -> Result<LnPayment, AppError>;

    async fn find_payment(&self, pr: &str) -> Result<Option<LnPayment>, AppError>;

    /// Moves a `pending` payment to `status`. Terminal rows are returned unchanged.
    async fn settle_payment(
        &self,
        pr: &str,
        status: LnPaymentStatus,
    ) -> Result<LnPayment, AppError>;

    /// Spends a settled invoice on one action. `None` when the invoice is not
    /// `user_id`'s, not settled, or already spent. `status` is never touched.
    async fn claim_payment(&self, pr: &str, user_id: Uuid)
        -> Result<Option<LnPayment>, AppError>;

    /// Makes a claimed invoice spendable again after its action failed.
    async fn release_payment(&self, pr: &str) -> Result<(), AppError>;
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn list_jobs(&self, user_id: Uuid) -> Result<Vec<Job>, AppError>;

    async fn find_job(&self, user_id: Uuid, job_id: Uuid) -> Result<Option<Job>, AppError>;

    async fn create_job(&self, user_id: Uuid, input: &JobInput) -> Result<Job, AppError>;

    async fn update_job(
        &self,
        user_id: Uuid,
        job_id: Uuid,
        update: &JobUpdate,
    ) -> Result<Job, AppError>;

    /// Returns the number of rows removed (0 when the job is not the user's).
    async fn delete_job(&self, user_id: Uuid, job_id: Uuid) -> Result<u64, AppError>;

    /// Links a cover letter to its job and stores the job's latest description.
    async fn attach_cover_letter(
        &self,
        job_id: Uuid,
        cover_letter_id: Uuid,
        description: &str,
    ) -> Result<(), AppError>;

    async fn create_cover_letter(&self, new: NewCoverLetter) -> Result<CoverLetter, AppError>;

    async fn update_cover_letter_content(
        &self,
        user_id: Uuid,
        cover_letter_id: Uuid,
        content: &str,
    ) -> Result<CoverLetter, AppError>;

    async fn create_optimized_resume(
        &self,
        new: NewOptimizedResume,
    ) -> Result<OptimizedResume, AppError>;

    async fn find_optimized_resume(
        &self,
        user_id: Uuid,
        resume_id: Uuid,
    ) -> Result<Option<OptimizedResume>, AppError>;

    async fn update_optimized_resume_content(
        &self,
        user_id: Uuid,
        resume_id: Uuid,
        content: &str,
    ) -> Result<OptimizedResume, AppError>;
}

/// Everything `AppState` needs from persistence.
pub trait Store: UserStore + LnPaymentStore + DocumentStore {}

impl<T: UserStore + LnPaymentStore + DocumentStore> Store for T {}
