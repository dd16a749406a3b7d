use std::env;
use std::fmt;

const DEFAULT_JWT_EXPIRATION_MS: i64 = 86_400_000;
const DEFAULT_OPENAI_URL: &str = "https://api.openai.com/v1/chat/completions";
const DEFAULT_OPENAI_MODEL: &str = "gpt-3.5-turbo";
const DEFAULT_MAIL_SENDER: &str = "no-reply@lazytodo.local";

/// A configuration value is missing or could not be parsed.
#[derive(Debug, PartialEq, Eq)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid(&'static str, String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "{} must be set", key),
            ConfigError::Invalid(key, value) => write!(f, "{} has an invalid value: {}", key, value),
        }
    }
}

impl std::error::Error for ConfigError {}

/// SMTP settings. Absent when `SMTP_HOST` is not set.
#[derive(Debug, Clone)]
pub struct MailConfig {
    pub host: String,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
}

/// Chat-completion endpoint used for motivational messages.
#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    pub api_url: String,
    pub model: String,
    pub api_key: Option<String>,
}

pub struct Config {
    /// Postgres connection string; the in-memory store is used when unset.
    pub database_url: Option<String>,
    pub server_port: u16,
    pub server_host: String,
    pub jwt_secret: String,
    pub jwt_expiration_ms: i64,
    pub bcrypt_cost: u32,
    pub mail_sender: String,
    pub mail: Option<MailConfig>,
    pub openai: OpenAiConfig,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let jwt_secret = lookup("JWT_SECRET").ok_or(ConfigError::Missing("JWT_SECRET"))?;

        let mail = match lookup("SMTP_HOST") {
            Some(host) => Some(MailConfig {
                host,
                port: parse_or(&lookup, "SMTP_PORT", 587)?,
                username: lookup("SMTP_USERNAME"),
                password: lookup("SMTP_PASSWORD"),
            }),
            None => None,
        };

        Ok(Self {
            database_url: lookup("DATABASE_URL"),
            server_port: parse_or(&lookup, "SERVER_PORT", 8080)?,
            server_host: lookup("SERVER_HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
            jwt_secret,
            jwt_expiration_ms: parse_or(&lookup, "JWT_EXPIRATION_MS", DEFAULT_JWT_EXPIRATION_MS)?,
            bcrypt_cost: parse_or(&lookup, "BCRYPT_COST", bcrypt::DEFAULT_COST)?,
            mail_sender: lookup("MAIL_SENDER").unwrap_or_else(|| DEFAULT_MAIL_SENDER.to_string()),
            mail,
            openai: OpenAiConfig {
                api_url: lookup("OPENAI_API_URL").unwrap_or_else(|| DEFAULT_OPENAI_URL.to_string()),
                model: lookup("OPENAI_MODEL").unwrap_or_else(|| DEFAULT_OPENAI_MODEL.to_string()),
                api_key: lookup("OPENAI_API_KEY"),
            },
        })
    }

    pub fn server_url(&self) -> String {
        format!("http://{}:{}", self.server_host, self.server_port)
    }
}

fn parse_or<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid(key, raw.clone())),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_config_defaults() {
        let config = Config::from_lookup(lookup_from(&[("JWT_SECRET", "s3cret")])).unwrap();

        assert!(config.database_url.is_none());
        assert_eq!(config.server_port, 8080);
        assert_eq!(config.server_host, "127.0.0.1");
        assert_eq!(config.jwt_expiration_ms, 86_400_000);
        assert_eq!(config.bcrypt_cost, bcrypt::DEFAULT_COST);
        assert!(config.mail.is_none());
        assert_eq!(config.openai.model, "gpt-3.5-turbo");
        assert_eq!(config.server_url(), "http://127.0.0.1:8080");
    }

    #[test]
    fn test_config_custom_values() {
        let config = Config::from_lookup(lookup_from(&[
            ("JWT_SECRET", "s3cret"),
            ("DATABASE_URL", "postgres://test"),
            ("SERVER_PORT", "3000"),
            ("SERVER_HOST", "0.0.0.0"),
            ("SMTP_HOST", "smtp.example.com"),
            ("SMTP_USERNAME", "mailer"),
        ]))
        .unwrap();

        assert_eq!(config.database_url.as_deref(), Some("postgres://test"));
        assert_eq!(config.server_port, 3000);
        assert_eq!(config.server_host, "0.0.0.0");
        let mail = config.mail.unwrap();
        assert_eq!(mail.host, "smtp.example.com");
        assert_eq!(mail.port, 587);
        assert_eq!(mail.username.as_deref(), Some("mailer"));
    }

    #[test]
    fn test_config_requires_jwt_secret() {
        let result = Config::from_lookup(lookup_from(&[]));
        assert_eq!(result.err(), Some(ConfigError::Missing("JWT_SECRET")));
    }

    #[test]
    fn test_config_rejects_bad_port() {
        let result = Config::from_lookup(lookup_from(&[
            ("JWT_SECRET", "s3cret"),
            ("SERVER_PORT", "eighty"),
        ]));
        assert!(matches!(result, Err(ConfigError::Invalid("SERVER_PORT", _))));
    }
}
