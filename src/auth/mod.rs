pub mod extractors;
pub mod password;
pub mod token;

use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use validator::Validate;

pub use extractors::Actor;
pub use password::PasswordHasher;
pub use token::{Claims, TokenService};

lazy_static! {
    // Regex for username validation: alphanumeric, underscores, hyphens
    static ref USERNAME_REGEX: regex::Regex = regex::Regex::new(r"^[a-zA-Z0-9_-]+$").unwrap();
}

/// Represents the payload for a sign-in request.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1))]
    pub username: String,
    #[validate(length(min = 1))]
    pub password: String,
}

/// Represents the payload for a new user registration request.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct SignupRequest {
    /// Desired username for the new account.
    /// Must be between 3 and 20 characters, alphanumeric, and can include underscores or hyphens.
    #[validate(
        length(min = 3, max = 20),
        regex(
            path = "USERNAME_REGEX",
            message = "Username must be alphanumeric, underscores, or hyphens"
        )
    )]
    pub username: String,
    /// Email address for the new account.
    #[validate(email, length(max = 50))]
    pub email: String,
    #[validate(length(min = 1, max = 40))]
    pub password: String,
    /// Requested roles. Accepted for compatibility; every new account gets `ROLE_USER`.
    #[serde(default)]
    pub role: Option<Vec<String>>,
}

/// Response to a successful sign-in.
#[derive(Debug, Serialize, Deserialize)]
pub struct JwtResponse {
    pub token: String,
    #[serde(rename = "type")]
    pub token_type: String,
    pub id: i64,
    pub username: String,
    pub email: String,
    pub roles: Vec<String>,
}

impl JwtResponse {
    pub fn bearer(token: String, user: &crate::models::User) -> Self {
        Self {
            token,
            token_type: "Bearer".to_string(),
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            roles: user.roles.clone(),
        }
    }
}

/// A plain `{"message": ...}` body.
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
