use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// How long a reset token stays valid after it is issued.
pub fn reset_token_lifetime() -> Duration {
    Duration::minutes(30)
}

/// A single-use password reset token.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct PasswordResetToken {
    pub token: String,
    pub user_id: i64,
    pub expiry_date: DateTime<Utc>,
}

impl PasswordResetToken {
    pub fn issue(token: String, user_id: i64, issued_at: DateTime<Utc>) -> Self {
        Self {
            token,
            user_id,
            expiry_date: issued_at + reset_token_lifetime(),
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expiry_date
    }
}

/// Body of `POST /auth/requestresetpassword`.
#[derive(Debug, Deserialize, Serialize, Validate)]
pub struct PasswordResetRequest {
    #[validate(email, length(max = 120))]
    pub email: String,
}

/// Body of `POST /auth/resetPassword`, as JSON or a form.
#[derive(Debug, Deserialize, Serialize, Validate)]
pub struct NewPasswordRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub token: String,
    #[validate(length(min = 1, max = 40))]
    pub password: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_expires_after_thirty_minutes() {
        let issued = Utc::now();
        let token = PasswordResetToken::issue("12345".into(), 1, issued);

        assert!(!token.is_expired(issued));
        assert!(!token.is_expired(issued + Duration::minutes(30)));
        assert!(token.is_expired(issued + Duration::minutes(30) + Duration::seconds(1)));
    }
}
