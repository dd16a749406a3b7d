use crate::error::AppError;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// Represents the claims encoded within a JWT (JSON Web Token).
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Claims {
    /// Subject of the token: the username.
    pub sub: String,
    /// Issued-at timestamp (seconds since epoch).
    pub iat: i64,
    /// Expiration timestamp (seconds since epoch).
    pub exp: i64,
}

/// Issues and verifies the bearer tokens.
///
/// The secret and lifetime are fixed when the service is built at startup; the
/// service is then shared read-only between workers.
#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    lifetime: Duration,
}

impl TokenService {
    pub fn new(secret: &str, lifetime: Duration) -> Self {
        let mut validation = Validation::new(Algorithm::HS512);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            lifetime,
        }
    }

    pub fn from_millis(secret: &str, lifetime_ms: i64) -> Self {
        Self::new(secret, Duration::milliseconds(lifetime_ms))
    }

    /// Generates a signed token for `username`, valid from now for the configured lifetime.
    pub fn issue(&self, username: &str) -> Result<String, AppError> {
        self.issue_at(username, Utc::now())
    }

    pub(crate) fn issue_at(&self, username: &str, issued_at: DateTime<Utc>) -> Result<String, AppError> {
        let claims = Claims {
            sub: username.to_string(),
            iat: issued_at.timestamp(),
            exp: (issued_at + self.lifetime).timestamp(),
        };
        encode(&Header::new(Algorithm::HS512), &claims, &self.encoding)
            .map_err(|e| AppError::InternalServerError(format!("Failed to generate token: {}", e)))
    }

    /// Decodes and verifies a token (signature and expiry).
    ///
    /// Returns `AppError::Authentication` if the token is malformed, its signature is
    /// invalid, or it has expired.
    pub fn verify(&self, token: &str) -> Result<Claims, AppError> {
        decode::<Claims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| AppError::Authentication(format!("Invalid token: {}", e)))
    }

    /// True when the token carries a valid signature and has not expired.
    pub fn validate(&self, token: &str) -> bool {
        self.verify(token).is_ok()
    }

    /// The username embedded in a token. The token is always verified first.
    pub fn subject(&self, token: &str) -> Result<String, AppError> {
        self.verify(token).map(|claims| claims.sub)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALPHABET: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789-_";

    fn service() -> TokenService {
        TokenService::new("test_secret_for_gen_verify", Duration::hours(1))
    }

    #[test]
    fn test_token_generation_and_verification() {
        let tokens = service();
        let token = tokens.issue("alice").unwrap();

        assert!(tokens.validate(&token));
        let claims = tokens.verify(&token).unwrap();
        assert_eq!(claims.sub, "alice");
        assert_eq!(claims.exp - claims.iat, 3600);
        assert_eq!(tokens.subject(&token).unwrap(), "alice");
    }

    #[test]
    fn test_token_expiration() {
        let tokens = service();
        let expired = tokens
            .issue_at("alice", Utc::now() - Duration::hours(2))
            .unwrap();

        assert!(!tokens.validate(&expired));
        match tokens.subject(&expired) {
            Err(AppError::Authentication(msg)) => assert!(msg.contains("ExpiredSignature")),
            other => panic!("expected an expired-token error, got {:?}", other),
        }
    }

    #[test]
    fn test_tampered_signature_is_rejected() {
        let tokens = service();
        let token = tokens.issue("alice").unwrap();
        let signature_start = token.rfind('.').unwrap() + 1;

        for position in signature_start..token.len() {
            let original = token.as_bytes()[position] as char;
            let replacement = ALPHABET.chars().find(|c| *c != original).unwrap();
            let mut tampered = token.clone();
            tampered.replace_range(position..position + 1, &replacement.to_string());

            assert!(
                !tokens.validate(&tampered),
                "tampering at byte {} was not detected",
                position
            );
        }
    }

    #[test]
    fn test_token_from_other_secret_is_rejected() {
        let other = TokenService::new("a_completely_different_secret", Duration::hours(1));
        let token = other.issue("alice").unwrap();
        assert!(!service().validate(&token));
    }

    #[test]
    fn test_garbage_is_rejected_without_panicking() {
        let tokens = service();
        for garbage in ["", "bearer:", "not.a.jwt", "eyJhbGciOiJub25lIn0.e30."] {
            assert!(!tokens.validate(garbage));
            assert!(matches!(tokens.subject(garbage), Err(AppError::Authentication(_))));
        }
    }
}
