//! Scripted fakes for the completion and Lightning seams.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::lightning::client::{Invoice, LightningError, LightningProvider};
use crate::llm_client::{ChatRequest, Completion, CompletionProvider, LlmError};
use crate::models::ln_payment::{LnPayment, LnPaymentStatus};

/// Replies with queued results in order; an empty queue is an API error.
#[derive(Default)]
pub struct ScriptedCompletion {
    replies: Mutex<VecDeque<Result<Completion, LlmError>>>,
    requests: Mutex<Vec<ChatRequest>>,
}

impl ScriptedCompletion {
    pub fn replying(content: &str) -> Self {
        let fake = Self::default();
        fake.push_reply(content, 120);
        fake
    }

    pub fn failing(message: &str) -> Self {
        let fake = Self::default();
        fake.push_error(message);
        fake
    }

    pub fn push_reply(&self, content: &str, completion_tokens: u32) {
        self.replies.lock().unwrap().push_back(Ok(Completion {
            content: content.to_string(),
            completion_tokens,
        }));
    }

    pub fn push_error(&self, message: &str) {
        self.replies.lock().unwrap().push_back(Err(LlmError::Api {
            status: 500,
            message: message.to_string(),
        }));
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn last_request(&self) -> Option<ChatRequest> {
        self.requests.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl CompletionProvider for ScriptedCompletion {
    async fn complete(&self, request: &ChatRequest) -> Result<Completion, LlmError> {
        self.requests.lock().unwrap().push(request.clone());
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| {
                Err(LlmError::Api {
                    status: 500,
                    message: "no scripted reply".to_string(),
                })
            })
    }
}

/// Mints one fixed invoice and reports queued statuses; once the queue is
/// drained it keeps reporting `Pending`.
pub struct ScriptedLightning {
    invoice: Option<Invoice>,
    statuses: Mutex<VecDeque<LnPaymentStatus>>,
    invoice_requests: AtomicU32,
    status_checks: AtomicU32,
}

impl ScriptedLightning {
    pub fn new(pr: &str, statuses: impl IntoIterator<Item = LnPaymentStatus>) -> Self {
        Self {
            invoice: Some(Invoice {
                pr: pr.to_string(),
                verify: Some(format!("https://ln.example.com/verify/{pr}")),
                status: LnPaymentStatus::Pending,
            }),
            statuses: Mutex::new(statuses.into_iter().collect()),
            invoice_requests: AtomicU32::new(0),
            status_checks: AtomicU32::new(0),
        }
    }

    /// Every invoice request fails.
    pub fn unavailable() -> Self {
        Self {
            invoice: None,
            statuses: Mutex::new(VecDeque::new()),
            invoice_requests: AtomicU32::new(0),
            status_checks: AtomicU32::new(0),
        }
    }

    pub fn invoice_requests(&self) -> u32 {
        self.invoice_requests.load(Ordering::SeqCst)
    }

    pub fn status_checks(&self) -> u32 {
        self.status_checks.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LightningProvider for ScriptedLightning {
    async fn request_invoice(&self, _amount_sats: u64) -> Result<Invoice, LightningError> {
        self.invoice_requests.fetch_add(1, Ordering::SeqCst);
        self.invoice
            .clone()
            .ok_or_else(|| LightningError::Service("wallet offline".to_string()))
    }

    async fn check_status(&self, _payment: &LnPayment) -> Result<LnPaymentStatus, LightningError> {
        self.status_checks.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .statuses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(LnPaymentStatus::Pending))
    }
}
