//! Newsletter Model

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Newsletter subscriber
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Subscriber {
    pub id: i64,
    pub email: String,
    pub is_active: bool,
    pub subscribed_at: i64,
}

/// Public signup payload
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SubscribeRequest {
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_validation() {
        let ok = SubscribeRequest {
            email: "buyer@example.com".into(),
        };
        assert!(ok.validate().is_ok());

        let bad = SubscribeRequest {
            email: "not-an-email".into(),
        };
        assert!(bad.validate().is_err());
    }
}
