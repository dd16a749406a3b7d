//! Password reset by emailed code.
//!
//! A request issues a numeric token valid for 30 minutes and mails it to the
//! account's address. Presenting the token with the same email sets a new
//! password. Tokens are single-use: a consumed token is deleted, and so is an
//! expired token once somebody presents it.

use chrono::{DateTime, Utc};
use log::{info, warn};
use rand::Rng;

use crate::auth::PasswordHasher;
use crate::error::AppError;
use crate::mail::{Email, Mailer};
use crate::models::{NewPasswordRequest, PasswordResetToken, User};
use crate::store::Store;

pub const RESET_SUBJECT: &str = "password reset";

const RESET_TOKEN_ATTEMPTS: usize = 5;

const RESET_TEMPLATE: &str = include_str!("../../templates/password_reset.txt");

/// A non-negative random integer rendered in decimal.
pub fn generate_token() -> String {
    rand::thread_rng().gen_range(0..=i32::MAX).to_string()
}

pub fn reset_email(user: &User, token: &str) -> Email {
    Email {
        recipient: user.email.clone(),
        subject: RESET_SUBJECT.to_string(),
        body: RESET_TEMPLATE
            .replace("{username}", &user.username)
            .replace("{token}", token),
    }
}

async fn user_by_email(store: &dyn Store, email: &str) -> Result<User, AppError> {
    store
        .find_user_by_email(email)
        .await?
        .ok_or_else(|| AppError::UsernameNotFound(format!("No user with email {}", email)))
}

/// Issues and mails a reset token. Returns `false` when the mail could not
/// be dispatched; the token is stored either way.
pub async fn request_reset(
    store: &dyn Store,
    mailer: &dyn Mailer,
    email: &str,
    now: DateTime<Utc>,
) -> Result<bool, AppError> {
    request_reset_with(store, mailer, email, now, generate_token).await
}

/// Stores a token from `next_token`, drawing again while the value is
/// already held by an outstanding token.
async fn issue_token(
    store: &dyn Store,
    user: &User,
    now: DateTime<Utc>,
    next_token: &mut impl FnMut() -> String,
) -> Result<PasswordResetToken, AppError> {
    for _ in 0..RESET_TOKEN_ATTEMPTS {
        let token = PasswordResetToken::issue(next_token(), user.id, now);
        if store.insert_reset_token(&token).await? {
            return Ok(token);
        }
        warn!("Reset token collision for {}, drawing another", user.username);
    }
    Err(AppError::InternalServerError(
        "could not issue a unique reset token".to_string(),
    ))
}

pub(crate) async fn request_reset_with(
    store: &dyn Store,
    mailer: &dyn Mailer,
    email: &str,
    now: DateTime<Utc>,
    mut next_token: impl FnMut() -> String,
) -> Result<bool, AppError> {
    let user = user_by_email(store, email).await?;
    let token = issue_token(store, &user, now, &mut next_token).await?;

    match mailer.send(&reset_email(&user, &token.token)).await {
        Ok(()) => {
            info!("Issued password reset token for {}", user.username);
            Ok(true)
        }
        Err(e) => {
            warn!("Could not send password reset email to {}: {}", user.email, e);
            Ok(false)
        }
    }
}

pub async fn complete_reset(
    store: &dyn Store,
    hasher: &PasswordHasher,
    request: &NewPasswordRequest,
    now: DateTime<Utc>,
) -> Result<(), AppError> {
    let user = user_by_email(store, &request.email).await?;

    let token = store
        .find_reset_token(&request.token)
        .await?
        .ok_or_else(|| AppError::AccessDenied("Your password reset token is invalid".to_string()))?;

    if token.is_expired(now) {
        store.delete_reset_token(&token.token).await?;
        return Err(AppError::PasswordResetTokenExpired(
            "your password reset token has expired".to_string(),
        ));
    }
    if token.user_id != user.id {
        warn!("Reset token presented for the wrong account: {}", user.username);
        return Err(AppError::AccessDenied("token is invalid".to_string()));
    }

    let password_hash = hasher.hash(&request.password)?;
    store.update_user_password(user.id, &password_hash).await?;
    store.delete_reset_token(&token.token).await?;
    info!("Password reset for {}", user.username);
    Ok(())
}
