//! In-memory store used by unit tests. Mirrors the guarded SQL semantics of `PgStore`.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::errors::AppError;
use crate::lightning::client::Invoice;
use crate::models::document::{
    CoverLetter, Job, JobInput, JobUpdate, NewCoverLetter, NewOptimizedResume, OptimizedResume,
};
use crate::models::ln_payment::{LnPayment, LnPaymentStatus};
use crate::models::user::{User, UserPreferences};
use crate::store::{DocumentStore, LnPaymentStore, UserStore};

#[derive(Default)]
struct Tables {
    users: HashMap<Uuid, User>,
    payments: HashMap<String, LnPayment>,
    jobs: HashMap<Uuid, Job>,
    cover_letters: HashMap<Uuid, CoverLetter>,
    resumes: HashMap<Uuid, OptimizedResume>,
    decrements: u32,
    refunds: u32,
}

#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user(user: User) -> Self {
        let store = Self::new();
        store.insert_user(user);
        store
    }

    pub fn insert_user(&self, user: User) {
        self.tables.lock().unwrap().users.insert(user.id, user);
    }

    pub fn insert_payment(&self, payment: LnPayment) {
        self.tables
            .lock()
            .unwrap()
            .payments
            .insert(payment.pr.clone(), payment);
    }

    pub fn insert_job(&self, user_id: Uuid) -> Job {
        let job = Job {
            id: Uuid::new_v4(),
            user_id,
            title: "Backend Engineer".to_string(),
            company: "Acme Payments".to_string(),
            location: "Remote".to_string(),
            description: "Build and operate our billing platform in Rust.".to_string(),
            is_completed: false,
            cover_letter_id: None,
            created_at: Utc::now(),
        };
        self.tables.lock().unwrap().jobs.insert(job.id, job.clone());
        job
    }

    pub fn user(&self, user_id: Uuid) -> User {
        self.tables.lock().unwrap().users[&user_id].clone()
    }

    pub fn credits(&self, user_id: Uuid) -> i32 {
        self.tables.lock().unwrap().users[&user_id].credits
    }

    pub fn decrements(&self) -> u32 {
        self.tables.lock().unwrap().decrements
    }

    pub fn refunds(&self) -> u32 {
        self.tables.lock().unwrap().refunds
    }

    pub fn payment(&self, pr: &str) -> Option<LnPayment> {
        self.tables.lock().unwrap().payments.get(pr).cloned()
    }

    pub fn job(&self, job_id: Uuid) -> Option<Job> {
        self.tables.lock().unwrap().jobs.get(&job_id).cloned()
    }

    pub fn cover_letter_count(&self) -> usize {
        self.tables.lock().unwrap().cover_letters.len()
    }

    pub fn resume_count(&self) -> usize {
        self.tables.lock().unwrap().resumes.len()
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn find_user(&self, id: Uuid) -> Result<Option<User>, AppError> {
        Ok(self.tables.lock().unwrap().users.get(&id).cloned())
    }

    async fn decrement_credit(&self, id: Uuid) -> Result<Option<i32>, AppError> {
        let mut tables = self.tables.lock().unwrap();
        let Some(user) = tables.users.get_mut(&id) else {
            return Ok(None);
        };
        if user.credits <= 0 {
            return Ok(None);
        }
        user.credits -= 1;
        let left = user.credits;
        tables.decrements += 1;
        Ok(Some(left))
    }

    async fn refund_credit(&self, id: Uuid) -> Result<i32, AppError> {
        let mut tables = self.tables.lock().unwrap();
        let user = tables
            .users
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound(format!("User {id} not found")))?;
        user.credits += 1;
        let balance = user.credits;
        tables.refunds += 1;
        Ok(balance)
    }

    async fn update_preferences(
        &self,
        id: Uuid,
        prefs: &UserPreferences,
    ) -> Result<User, AppError> {
        let mut tables = self.tables.lock().unwrap();
        let user = tables.users.get_mut(&id).ok_or(AppError::Unauthorized)?;
        if let Some(notify) = prefs.notify_payment_expires {
            user.notify_payment_expires = notify;
        }
        if let Some(model) = &prefs.gpt_model {
            user.gpt_model = model.clone();
        }
        Ok(user.clone())
    }

    async fn record_checkout(
        &self,
        id: Uuid,
        stripe_id: &str,
        checkout_session_id: Option<&str>,
    ) -> Result<(), AppError> {
        let mut tables = self.tables.lock().unwrap();
        if let Some(user) = tables.users.get_mut(&id) {
            user.stripe_id = Some(stripe_id.to_string());
            if let Some(session) = checkout_session_id {
                user.checkout_session_id = Some(session.to_string());
            }
        }
        Ok(())
    }
}

#[async_trait]
impl LnPaymentStore for MemoryStore {
    async fn upsert_pending(
        &self,
        invoice: &Invoice,
        user_id: Uuid,
    ) -> Result<LnPayment, AppError> {
        let mut tables = self.tables.lock().unwrap();
        let now = Utc::now();
        let payment = tables
            .payments
            .entry(invoice.pr.clone())
            .and_modify(|p| p.updated_at = now)
            .or_insert_with(|| LnPayment {
                pr: invoice.pr.clone(),
                user_id,
                status: LnPaymentStatus::Pending,
                verify_url: invoice.verify.clone(),
                consumed_at: None,
                created_at: now,
                updated_at: now,
            });
        Ok(payment.clone())
    }

    async fn find_payment(&self, pr: &str) -> Result<Option<LnPayment>, AppError> {
        Ok(self.tables.lock().unwrap().payments.get(pr).cloned())
    }

    async fn settle_payment(
        &self,
        pr: &str,
        status: LnPaymentStatus,
    ) -> Result<LnPayment, AppError> {
        let mut tables = self.tables.lock().unwrap();
        let payment = tables
            .payments
            .get_mut(pr)
            .ok_or_else(|| AppError::NotFound(format!("Invoice {pr} not found")))?;
        if payment.status == LnPaymentStatus::Pending {
            payment.status = status;
            payment.updated_at = Utc::now();
        }
        Ok(payment.clone())
    }

    async fn claim_payment(
        &self,
        pr: &str,
        user_id: Uuid,
    ) -> Result<Option<LnPayment>, AppError> {
        let mut tables = self.tables.lock().unwrap();
        let Some(payment) = tables.payments.get_mut(pr) else {
            return Ok(None);
        };
        if payment.user_id != user_id
            || payment.status != LnPaymentStatus::Success
            || payment.consumed_at.is_some()
        {
            return Ok(None);
        }
        payment.consumed_at = Some(Utc::now());
        Ok(Some(payment.clone()))
    }

    async fn release_payment(&self, pr: &str) -> Result<(), AppError> {
        if let Some(payment) = self.tables.lock().unwrap().payments.get_mut(pr) {
            payment.consumed_at = None;
        }
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn list_jobs(&self, user_id: Uuid) -> Result<Vec<Job>, AppError> {
        let tables = self.tables.lock().unwrap();
        let mut jobs: Vec<Job> = tables
            .jobs
            .values()
            .filter(|j| j.user_id == user_id)
            .cloned()
            .collect();
        jobs.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(jobs)
    }

    async fn find_job(&self, user_id: Uuid, job_id: Uuid) -> Result<Option<Job>, AppError> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .jobs
            .get(&job_id)
            .filter(|j| j.user_id == user_id)
            .cloned())
    }

    async fn create_job(&self, user_id: Uuid, input: &JobInput) -> Result<Job, AppError> {
        let job = Job {
            id: Uuid::new_v4(),
            user_id,
            title: input.title.clone(),
            company: input.company.clone(),
            location: input.location.clone(),
            description: input.description.clone(),
            is_completed: false,
            cover_letter_id: None,
            created_at: Utc::now(),
        };
        self.tables.lock().unwrap().jobs.insert(job.id, job.clone());
        Ok(job)
    }

    async fn update_job(
        &self,
        user_id: Uuid,
        job_id: Uuid,
        update: &JobUpdate,
    ) -> Result<Job, AppError> {
        let mut tables = self.tables.lock().unwrap();
        let job = tables
            .jobs
            .get_mut(&job_id)
            .filter(|j| j.user_id == user_id)
            .ok_or_else(|| AppError::NotFound(format!("Job {job_id} not found")))?;
        job.title = update.title.clone();
        job.company = update.company.clone();
        job.location = update.location.clone();
        job.description = update.description.clone();
        job.is_completed = update.is_completed;
        Ok(job.clone())
    }

    async fn delete_job(&self, user_id: Uuid, job_id: Uuid) -> Result<u64, AppError> {
        let mut tables = self.tables.lock().unwrap();
        let owned = tables
            .jobs
            .get(&job_id)
            .is_some_and(|j| j.user_id == user_id);
        if owned {
            tables.jobs.remove(&job_id);
            Ok(1)
        } else {
            Ok(0)
        }
    }

    async fn attach_cover_letter(
        &self,
        job_id: Uuid,
        cover_letter_id: Uuid,
        description: &str,
    ) -> Result<(), AppError> {
        let mut tables = self.tables.lock().unwrap();
        if let Some(job) = tables.jobs.get_mut(&job_id) {
            job.cover_letter_id = Some(cover_letter_id);
            job.description = description.to_string();
        }
        Ok(())
    }

    async fn create_cover_letter(&self, new: NewCoverLetter) -> Result<CoverLetter, AppError> {
        let letter = CoverLetter {
            id: Uuid::new_v4(),
            user_id: new.user_id,
            job_id: new.job_id,
            title: new.title,
            content: new.content,
            token_usage: new.token_usage,
            created_at: Utc::now(),
        };
        self.tables
            .lock()
            .unwrap()
            .cover_letters
            .insert(letter.id, letter.clone());
        Ok(letter)
    }

    async fn update_cover_letter_content(
        &self,
        user_id: Uuid,
        cover_letter_id: Uuid,
        content: &str,
    ) -> Result<CoverLetter, AppError> {
        let mut tables = self.tables.lock().unwrap();
        let letter = tables
            .cover_letters
            .get_mut(&cover_letter_id)
            .filter(|c| c.user_id == user_id)
            .ok_or_else(|| AppError::NotFound(format!("Cover letter {cover_letter_id} not found")))?;
        letter.content = content.to_string();
        Ok(letter.clone())
    }

    async fn create_optimized_resume(
        &self,
        new: NewOptimizedResume,
    ) -> Result<OptimizedResume, AppError> {
        let resume = OptimizedResume {
            id: Uuid::new_v4(),
            user_id: new.user_id,
            job_id: new.job_id,
            content: new.content,
            original_resume: new.original_resume,
            job_description: new.job_description,
            created_at: Utc::now(),
        };
        self.tables
            .lock()
            .unwrap()
            .resumes
            .insert(resume.id, resume.clone());
        Ok(resume)
    }

    async fn find_optimized_resume(
        &self,
        user_id: Uuid,
        resume_id: Uuid,
    ) -> Result<Option<OptimizedResume>, AppError> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .resumes
            .get(&resume_id)
            .filter(|r| r.user_id == user_id)
            .cloned())
    }

    async fn update_optimized_resume_content(
        &self,
        user_id: Uuid,
        resume_id: Uuid,
        content: &str,
    ) -> Result<OptimizedResume, AppError> {
        let mut tables = self.tables.lock().unwrap();
        let resume = tables
            .resumes
            .get_mut(&resume_id)
            .filter(|r| r.user_id == user_id)
            .ok_or_else(|| AppError::NotFound(format!("Optimized resume {resume_id} not found")))?;
        resume.content = content.to_string();
        Ok(resume.clone())
    }
}
