use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Subscription status that blocks generation regardless of any other flag.
pub const PAST_DUE: &str = "past_due";

/// Model used when neither the request nor the account names one.
pub const DEFAULT_GPT_MODEL: &str = "gpt-4o-mini";

/// A user row as loaded by the payment gate.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: Option<String>,
    /// Pay-per-use generations remaining. Never negative.
    pub credits: i32,
    /// Active subscription.
    pub has_paid: bool,
    /// Opted into per-use Lightning payment.
    pub is_using_ln: bool,
    pub subscription_status: Option<String>,
    pub gpt_model: String,
    pub notify_payment_expires: bool,
    pub stripe_id: Option<String>,
    pub checkout_session_id: Option<String>,
    pub date_paid: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn is_past_due(&self) -> bool {
        self.subscription_status.as_deref() == Some(PAST_DUE)
    }
}

/// What the account endpoints return. Billing identifiers stay server-side.
#[derive(Debug, Clone, Serialize)]
pub struct UserProfile {
    pub id: Uuid,
    pub email: Option<String>,
    pub credits: i32,
    pub has_paid: bool,
    pub is_using_ln: bool,
    pub subscription_status: Option<String>,
    pub gpt_model: String,
    pub notify_payment_expires: bool,
    pub date_paid: Option<DateTime<Utc>>,
}

impl From<User> for UserProfile {
    fn from(user: User) -> Self {
        UserProfile {
            id: user.id,
            email: user.email,
            credits: user.credits,
            has_paid: user.has_paid,
            is_using_ln: user.is_using_ln,
            subscription_status: user.subscription_status,
            gpt_model: user.gpt_model,
            notify_payment_expires: user.notify_payment_expires,
            date_paid: user.date_paid,
        }
    }
}

/// Partial update of the user-editable account fields.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserPreferences {
    pub notify_payment_expires: Option<bool>,
    pub gpt_model: Option<String>,
}

#[cfg(test)]
impl User {
    /// A free-tier account with no credits, no subscription and no Lightning opt-in.
    pub fn test_user() -> Self {
        User {
            id: Uuid::new_v4(),
            email: Some("applicant@example.com".to_string()),
            credits: 0,
            has_paid: false,
            is_using_ln: false,
            subscription_status: None,
            gpt_model: DEFAULT_GPT_MODEL.to_string(),
            notify_payment_expires: false,
            stripe_id: None,
            checkout_session_id: None,
            date_paid: None,
            created_at: Utc::now(),
        }
    }
}
