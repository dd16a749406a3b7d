use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;

pub const DEFAULT_PERSONALITY: &str = "a friendly coach";

/// Role reference data. Stored as its `ROLE_*` name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    #[serde(rename = "ROLE_USER")]
    User,
    #[serde(rename = "ROLE_MODERATOR")]
    Moderator,
    #[serde(rename = "ROLE_ADMIN")]
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "ROLE_USER",
            Role::Moderator => "ROLE_MODERATOR",
            Role::Admin => "ROLE_ADMIN",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An account. The password hash never leaves the server.
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub personality: String,
    /// Role names as stored, e.g. `ROLE_USER`.
    pub roles: Vec<String>,
}

/// Everything needed to insert a user row.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub roles: Vec<Role>,
}
