use std::sync::Arc;

use tracing::{debug, info};

use crate::errors::AppError;
use crate::lightning::client::{Invoice, LightningProvider};
use crate::models::ln_payment::LnPayment;
use crate::models::user::User;
use crate::store::Store;

/// Mints invoices and refreshes their persisted settlement status.
#[derive(Clone)]
pub struct LightningService {
    provider: Arc<dyn LightningProvider>,
    store: Arc<dyn Store>,
    amount_sats: u64,
}

impl LightningService {
    pub fn new(provider: Arc<dyn LightningProvider>, store: Arc<dyn Store>, amount_sats: u64) -> Self {
        Self {
            provider,
            store,
            amount_sats,
        }
    }

    /// Requests a fresh invoice and records it as `pending` for `user`.
    pub async fn request_invoice(&self, user: &User) -> Result<Invoice, AppError> {
        let invoice = self.provider.request_invoice(self.amount_sats).await?;
        let stored = self.store.upsert_pending(&invoice, user.id).await?;
        info!("Issued Lightning invoice for user {}", user.id);
        Ok(Invoice {
            pr: stored.pr,
            verify: stored.verify_url,
            status: stored.status,
        })
    }

    /// Re-checks a `pending` invoice with the Lightning service and persists
    /// the answer. Terminal invoices are returned as stored.
    pub async fn refresh_status(&self, pr: &str) -> Result<LnPayment, AppError> {
        let payment = self
            .store
            .find_payment(pr)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Invoice {pr} not found")))?;

        if payment.status.is_terminal() {
            return Ok(payment);
        }

        let status = self.provider.check_status(&payment).await?;
        if status.is_terminal() {
            info!("Invoice for user {} settled as {status}", payment.user_id);
            self.store.settle_payment(pr, status).await
        } else {
            debug!("Invoice for user {} still pending", payment.user_id);
            Ok(payment)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ln_payment::LnPaymentStatus;
    use crate::store::memory::MemoryStore;
    use crate::testing::ScriptedLightning;

    fn service(lightning: Arc<ScriptedLightning>, store: Arc<MemoryStore>) -> LightningService {
        LightningService::new(lightning, store, 1000)
    }

    #[tokio::test]
    async fn test_request_invoice_persists_pending() {
        let user = User {
            is_using_ln: true,
            ..User::test_user()
        };
        let store = Arc::new(MemoryStore::with_user(user.clone()));
        let lightning = Arc::new(ScriptedLightning::new("lnbc1req", []));

        let invoice = service(lightning, store.clone())
            .request_invoice(&user)
            .await
            .unwrap();

        assert_eq!(invoice.status, LnPaymentStatus::Pending);
        let stored = store.payment("lnbc1req").unwrap();
        assert_eq!(stored.user_id, user.id);
        assert_eq!(stored.status, LnPaymentStatus::Pending);
    }

    #[tokio::test]
    async fn test_refresh_moves_pending_to_success() {
        let user = User::test_user();
        let store = Arc::new(MemoryStore::with_user(user.clone()));
        store.insert_payment(LnPayment::test_payment("lnbc1pay", user.id, LnPaymentStatus::Pending));
        let lightning = Arc::new(ScriptedLightning::new(
            "lnbc1pay",
            [LnPaymentStatus::Pending, LnPaymentStatus::Success],
        ));
        let svc = service(lightning, store.clone());

        assert_eq!(svc.refresh_status("lnbc1pay").await.unwrap().status, LnPaymentStatus::Pending);
        assert_eq!(svc.refresh_status("lnbc1pay").await.unwrap().status, LnPaymentStatus::Success);
        assert_eq!(store.payment("lnbc1pay").unwrap().status, LnPaymentStatus::Success);
    }

    #[tokio::test]
    async fn test_terminal_status_is_never_rechecked() {
        let user = User::test_user();
        let store = Arc::new(MemoryStore::with_user(user.clone()));
        store.insert_payment(LnPayment::test_payment("lnbc1done", user.id, LnPaymentStatus::Failed));
        let lightning = Arc::new(ScriptedLightning::new("lnbc1done", [LnPaymentStatus::Success]));
        let svc = service(lightning.clone(), store.clone());

        for _ in 0..3 {
            let payment = svc.refresh_status("lnbc1done").await.unwrap();
            assert_eq!(payment.status, LnPaymentStatus::Failed);
        }
        assert_eq!(lightning.status_checks(), 0);
    }

    #[tokio::test]
    async fn test_unknown_invoice_is_not_found() {
        let store = Arc::new(MemoryStore::new());
        let lightning = Arc::new(ScriptedLightning::new("lnbc1x", []));
        let err = service(lightning, store).refresh_status("lnbc1missing").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
