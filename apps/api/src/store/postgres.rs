use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::errors::AppError;
use crate::lightning::client::Invoice;
use crate::models::document::{
    CoverLetter, Job, JobInput, JobUpdate, NewCoverLetter, NewOptimizedResume, OptimizedResume,
};
use crate::models::ln_payment::{LnPayment, LnPaymentStatus};
use crate::models::user::{User, UserPreferences};
use crate::store::{DocumentStore, LnPaymentStore, UserStore};

/// PostgreSQL-backed store. Queries are runtime-checked.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PgStore {
    async fn find_user(&self, id: Uuid) -> Result<Option<User>, AppError> {
        Ok(
            sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    async fn decrement_credit(&self, id: Uuid) -> Result<Option<i32>, AppError> {
        // Single guarded statement: never drives the balance below zero.
        // Nothing spans the external call that follows.
        Ok(sqlx::query_scalar(
            "UPDATE users SET credits = credits - 1 WHERE id = $1 AND credits > 0 RETURNING credits",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn refund_credit(&self, id: Uuid) -> Result<i32, AppError> {
        Ok(
            sqlx::query_scalar("UPDATE users SET credits = credits + 1 WHERE id = $1 RETURNING credits")
                .bind(id)
                .fetch_one(&self.pool)
                .await?,
        )
    }

    async fn update_preferences(
        &self,
        id: Uuid,
        prefs: &UserPreferences,
    ) -> Result<User, AppError> {
        sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET notify_payment_expires = COALESCE($2, notify_payment_expires),
                gpt_model = COALESCE($3, gpt_model)
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(prefs.notify_payment_expires)
        .bind(prefs.gpt_model.as_deref())
        .fetch_optional(&self.pool)
        .await?
        .ok_or(AppError::Unauthorized)
    }

    async fn record_checkout(
        &self,
        id: Uuid,
        stripe_id: &str,
        checkout_session_id: Option<&str>,
    ) -> Result<(), AppError> {
        sqlx::query(
            r#"
            UPDATE users
            SET stripe_id = $2,
                checkout_session_id = COALESCE($3, checkout_session_id)
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(stripe_id)
        .bind(checkout_session_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[async_trait]
impl LnPaymentStore for PgStore {
    async fn upsert_pending(
        &self,
        invoice: &Invoice,
        user_id: Uuid,
    ) -> Result<LnPayment, AppError> {
        Ok(sqlx::query_as::<_, LnPayment>(
            r#"
            INSERT INTO ln_payments (pr, user_id, status, verify_url)
            VALUES ($1, $2, 'pending', $3)
            ON CONFLICT (pr) DO UPDATE SET updated_at = now()
            RETURNING *
            "#,
        )
        .bind(&invoice.pr)
        .bind(user_id)
        .bind(invoice.verify.as_deref())
        .fetch_one(&self.pool)
        .await?)
    }

    async fn find_payment(&self, pr: &str) -> Result<Option<LnPayment>, AppError> {
        Ok(
            sqlx::query_as::<_, LnPayment>("SELECT * FROM ln_payments WHERE pr = $1")
                .bind(pr)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    async fn settle_payment(
        &self,
        pr: &str,
        status: LnPaymentStatus,
    ) -> Result<LnPayment, AppError> {
        let updated = sqlx::query_as::<_, LnPayment>(
            r#"
            UPDATE ln_payments
            SET status = $2, updated_at = now()
            WHERE pr = $1 AND status = 'pending'
            RETURNING *
            "#,
        )
        .bind(pr)
        .bind(status.as_str())
        .fetch_optional(&self.pool)
        .await?;

        match updated {
            Some(payment) => Ok(payment),
            None => self
                .find_payment(pr)
                .await?
                .ok_or_else(|| AppError::NotFound(format!("Invoice {pr} not found"))),
        }
    }

    async fn claim_payment(
        &self,
        pr: &str,
        user_id: Uuid,
    ) -> Result<Option<LnPayment>, AppError> {
        // Single guarded statement: two requests racing on one invoice cannot both win.
        Ok(sqlx::query_as::<_, LnPayment>(
            r#"
            UPDATE ln_payments
            SET consumed_at = now()
            WHERE pr = $1 AND user_id = $2 AND status = 'success' AND consumed_at IS NULL
            RETURNING *
            "#,
        )
        .bind(pr)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn release_payment(&self, pr: &str) -> Result<(), AppError> {
        sqlx::query("UPDATE ln_payments SET consumed_at = NULL WHERE pr = $1")
            .bind(pr)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for PgStore {
    async fn list_jobs(&self, user_id: Uuid) -> Result<Vec<Job>, AppError> {
        Ok(sqlx::query_as::<_, Job>(
            "SELECT * FROM jobs WHERE user_id = $1 ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn find_job(&self, user_id: Uuid, job_id: Uuid) -> Result<Option<Job>, AppError> {
        Ok(
            sqlx::query_as::<_, Job>("SELECT * FROM jobs WHERE id = $1 AND user_id = $2")
                .bind(job_id)
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    async fn create_job(&self, user_id: Uuid, input: &JobInput) -> Result<Job, AppError> {
        Ok(sqlx::query_as::<_, Job>(
            r#"
            INSERT INTO jobs (id, user_id, title, company, location, description)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(&input.title)
        .bind(&input.company)
        .bind(&input.location)
        .bind(&input.description)
        .fetch_one(&self.pool)
        .await?)
    }

    async fn update_job(
        &self,
        user_id: Uuid,
        job_id: Uuid,
        update: &JobUpdate,
    ) -> Result<Job, AppError> {
        sqlx::query_as::<_, Job>(
            r#"
            UPDATE jobs
            SET title = $3, company = $4, location = $5, description = $6, is_completed = $7
            WHERE id = $1 AND user_id = $2
            RETURNING *
            "#,
        )
        .bind(job_id)
        .bind(user_id)
        .bind(&update.title)
        .bind(&update.company)
        .bind(&update.location)
        .bind(&update.description)
        .bind(update.is_completed)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Job {job_id} not found")))
    }

    async fn delete_job(&self, user_id: Uuid, job_id: Uuid) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM jobs WHERE id = $1 AND user_id = $2")
            .bind(job_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn attach_cover_letter(
        &self,
        job_id: Uuid,
        cover_letter_id: Uuid,
        description: &str,
    ) -> Result<(), AppError> {
        sqlx::query("UPDATE jobs SET cover_letter_id = $2, description = $3 WHERE id = $1")
            .bind(job_id)
            .bind(cover_letter_id)
            .bind(description)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn create_cover_letter(&self, new: NewCoverLetter) -> Result<CoverLetter, AppError> {
        Ok(sqlx::query_as::<_, CoverLetter>(
            r#"
            INSERT INTO cover_letters (id, user_id, job_id, title, content, token_usage)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(new.user_id)
        .bind(new.job_id)
        .bind(&new.title)
        .bind(&new.content)
        .bind(new.token_usage)
        .fetch_one(&self.pool)
        .await?)
    }

    async fn update_cover_letter_content(
        &self,
        user_id: Uuid,
        cover_letter_id: Uuid,
        content: &str,
    ) -> Result<CoverLetter, AppError> {
        sqlx::query_as::<_, CoverLetter>(
            "UPDATE cover_letters SET content = $3 WHERE id = $1 AND user_id = $2 RETURNING *",
        )
        .bind(cover_letter_id)
        .bind(user_id)
        .bind(content)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Cover letter {cover_letter_id} not found")))
    }

    async fn create_optimized_resume(
        &self,
        new: NewOptimizedResume,
    ) -> Result<OptimizedResume, AppError> {
        Ok(sqlx::query_as::<_, OptimizedResume>(
            r#"
            INSERT INTO optimized_resumes
                (id, user_id, job_id, content, original_resume, job_description)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(new.user_id)
        .bind(new.job_id)
        .bind(&new.content)
        .bind(&new.original_resume)
        .bind(&new.job_description)
        .fetch_one(&self.pool)
        .await?)
    }

    async fn find_optimized_resume(
        &self,
        user_id: Uuid,
        resume_id: Uuid,
    ) -> Result<Option<OptimizedResume>, AppError> {
        Ok(sqlx::query_as::<_, OptimizedResume>(
            "SELECT * FROM optimized_resumes WHERE id = $1 AND user_id = $2",
        )
        .bind(resume_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn update_optimized_resume_content(
        &self,
        user_id: Uuid,
        resume_id: Uuid,
        content: &str,
    ) -> Result<OptimizedResume, AppError> {
        sqlx::query_as::<_, OptimizedResume>(
            "UPDATE optimized_resumes SET content = $3 WHERE id = $1 AND user_id = $2 RETURNING *",
        )
        .bind(resume_id)
        .bind(user_id)
        .bind(content)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Optimized resume {resume_id} not found")))
    }
}
