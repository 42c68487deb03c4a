//! Configuration management
//!
//! Secrets and settings come from the process environment, optionally
//! seeded from a `.env` file in the working directory.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::Error;
use crate::Result;

/// Required secrets, with the description used in error messages
const REQUIRED_SECRETS: &[(&str, &str)] = &[
    ("GOOGLE_CLIENT_ID", "Google OAuth Client ID"),
    ("GOOGLE_CLIENT_SECRET", "Google OAuth Client Secret"),
    ("GOOGLE_REDIRECT_URI", "Google OAuth Redirect URI"),
    ("GEMINI_API_KEY", "Gemini API Key"),
];

const GOOGLE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/auth";
const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const GMAIL_API_URL: &str = "https://gmail.googleapis.com/gmail/v1";
const GEMINI_API_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Read-only Gmail access is all the agent needs
pub const GMAIL_SCOPES: &[&str] = &["https://www.googleapis.com/auth/gmail.readonly"];

/// Deployment environment
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Production,
}

impl FromStr for Environment {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Environment::Development),
            "production" | "prod" => Ok(Environment::Production),
            other => Err(Error::Config(format!("Unknown environment: {other}"))),
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Environment::Development => f.write_str("development"),
            Environment::Production => f.write_str("production"),
        }
    }
}

/// Snapshot of named configuration values
#[derive(Debug, Clone, Default)]
pub struct Secrets {
    values: HashMap<String, String>,
}

impl Secrets {
    /// Load `.env` (if present) and capture the process environment
    pub fn from_env() -> Self {
        if let Err(e) = dotenv::dotenv() {
            tracing::debug!("No .env file loaded: {}", e);
        }
        Self::from_pairs(std::env::vars())
    }

    /// Build from explicit key/value pairs
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            values: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Get a value. Required keys that are missing or empty are an error;
    /// optional keys yield `None`.
    pub fn get(&self, key: &str) -> Result<Option<&str>> {
        match self.lookup(key) {
            Some(value) => Ok(Some(value)),
            None => match required_description(key) {
                Some(description) => Err(Error::Config(format!(
                    "Missing required secret: {}",
                    description
                ))),
                None => Ok(None),
            },
        }
    }

    /// Get a required value
    pub fn require(&self, key: &str) -> Result<&str> {
        self.get(key)?
            .ok_or_else(|| Error::Config(format!("Missing required secret: {}", key)))
    }

    /// Check that every required secret is present, reporting all missing ones
    pub fn validate(&self) -> Result<()> {
        let missing: Vec<&str> = REQUIRED_SECRETS
            .iter()
            .filter(|(key, _)| self.lookup(key).is_none())
            .map(|(_, description)| *description)
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(Error::Config(format!(
                "Missing required secrets: {}",
                missing.join(", ")
            )))
        }
    }

    /// Current environment, `development` unless `ENVIRONMENT` says otherwise
    pub fn environment(&self) -> Result<Environment> {
        match self.lookup("ENVIRONMENT") {
            Some(value) => value.parse(),
            None => Ok(Environment::default()),
        }
    }

    fn lookup(&self, key: &str) -> Option<&str> {
        self.values
            .get(key)
            .map(String::as_str)
            .filter(|v| !v.trim().is_empty())
    }

    fn parsed<T: FromStr>(&self, key: &str, default: T) -> Result<T> {
        match self.lookup(key) {
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|_| Error::Config(format!("Invalid value for {}: {}", key, raw))),
            None => Ok(default),
        }
    }

    fn or_default(&self, key: &str, default: &str) -> String {
        self.lookup(key).unwrap_or(default).to_string()
    }
}

fn required_description(key: &str) -> Option<&'static str> {
    REQUIRED_SECRETS
        .iter()
        .find(|(k, _)| *k == key)
        .map(|(_, description)| *description)
}

/// Google OAuth client settings
#[derive(Debug, Clone)]
pub struct GoogleConfig {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
    pub auth_url: String,
    pub token_url: String,
    pub scopes: Vec<String>,
}

/// Gemini API settings
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: String,
    pub model: String,
    pub api_url: String,
}

/// Listen address
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Main configuration structure
#[derive(Debug, Clone)]
pub struct Config {
    pub google: GoogleConfig,
    pub gemini: GeminiConfig,
    pub gmail_api_url: String,
    pub server: ServerConfig,

    /// How many past exchanges each session keeps for prompt continuity
    pub context_capacity: usize,

    /// Timeout applied to every outbound request
    pub http_timeout_secs: u64,

    pub environment: Environment,
}

fn default_model() -> &'static str {
    "gemini-2.0-flash"
}

fn default_host() -> &'static str {
    "0.0.0.0"
}

fn default_port() -> u16 {
    8000
}

fn default_context_capacity() -> usize {
    20
}

fn default_http_timeout_secs() -> u64 {
    30
}

impl Config {
    /// Build the configuration, failing if any required secret is missing
    pub fn from_secrets(secrets: &Secrets) -> Result<Self> {
        secrets.validate()?;

        let context_capacity = secrets.parsed("CONTEXT_CAPACITY", default_context_capacity())?;
        if context_capacity == 0 {
            return Err(Error::Config(
                "CONTEXT_CAPACITY must be at least 1".to_string(),
            ));
        }

        Ok(Self {
            google: GoogleConfig {
                client_id: secrets.require("GOOGLE_CLIENT_ID")?.to_string(),
                client_secret: secrets.require("GOOGLE_CLIENT_SECRET")?.to_string(),
                redirect_uri: secrets.require("GOOGLE_REDIRECT_URI")?.to_string(),
                auth_url: secrets.or_default("GOOGLE_AUTH_URL", GOOGLE_AUTH_URL),
                token_url: secrets.or_default("GOOGLE_TOKEN_URL", GOOGLE_TOKEN_URL),
                scopes: GMAIL_SCOPES.iter().map(|s| s.to_string()).collect(),
            },
            gemini: GeminiConfig {
                api_key: secrets.require("GEMINI_API_KEY")?.to_string(),
                model: secrets.or_default("GEMINI_MODEL", default_model()),
                api_url: secrets.or_default("GEMINI_API_URL", GEMINI_API_URL),
            },
            gmail_api_url: secrets.or_default("GMAIL_API_URL", GMAIL_API_URL),
            server: ServerConfig {
                host: secrets.or_default("HOST", default_host()),
                port: secrets.parsed("PORT", default_port())?,
            },
            context_capacity,
            http_timeout_secs: secrets.parsed("HTTP_TIMEOUT_SECS", default_http_timeout_secs())?,
            environment: secrets.environment()?,
        })
    }

    /// Load from `.env` and the process environment
    pub fn load() -> Result<Self> {
        Self::from_secrets(&Secrets::from_env())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_secrets() -> Secrets {
        Secrets::from_pairs([
            ("GOOGLE_CLIENT_ID", "client-123"),
            ("GOOGLE_CLIENT_SECRET", "shh"),
            ("GOOGLE_REDIRECT_URI", "http://localhost:8000/auth/callback"),
            ("GEMINI_API_KEY", "gem-key"),
        ])
    }

    #[test]
    fn test_validate_reports_every_missing_secret() {
        let secrets = Secrets::from_pairs([("GOOGLE_CLIENT_ID", "client-123")]);
        let err = secrets.validate().unwrap_err().to_string();

        assert!(err.contains("Google OAuth Client Secret"));
        assert!(err.contains("Google OAuth Redirect URI"));
        assert!(err.contains("Gemini API Key"));
        assert!(!err.contains("Client ID"));
    }

    #[test]
    fn test_empty_value_counts_as_missing() {
        let secrets = Secrets::from_pairs([("GEMINI_API_KEY", "  ")]);
        let err = secrets.get("GEMINI_API_KEY").unwrap_err().to_string();
        assert!(err.contains("Gemini API Key"));
    }

    #[test]
    fn test_optional_key_absent() {
        let secrets = Secrets::default();
        assert_eq!(secrets.get("GEMINI_MODEL").unwrap(), None);
    }

    #[test]
    fn test_environment_defaults_to_development() {
        assert_eq!(Secrets::default().environment().unwrap(), Environment::Development);

        let prod = Secrets::from_pairs([("ENVIRONMENT", "production")]);
        assert_eq!(prod.environment().unwrap(), Environment::Production);

        let bogus = Secrets::from_pairs([("ENVIRONMENT", "staging")]);
        assert!(bogus.environment().is_err());
    }

    #[test]
    fn test_default_config() {
        let config = Config::from_secrets(&full_secrets()).unwrap();
        assert_eq!(config.gemini.model, "gemini-2.0-flash");
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.context_capacity, 20);
        assert_eq!(config.google.token_url, GOOGLE_TOKEN_URL);
        assert_eq!(config.google.scopes, vec![GMAIL_SCOPES[0].to_string()]);
    }

    #[test]
    fn test_config_fails_without_secrets() {
        assert!(Config::from_secrets(&Secrets::default()).is_err());
    }

    #[test]
    fn test_invalid_port() {
        let mut pairs: Vec<(String, String)> = full_secrets().values.into_iter().collect();
        pairs.push(("PORT".to_string(), "eighty".to_string()));
        let err = Config::from_secrets(&Secrets::from_pairs(pairs)).unwrap_err();
        assert!(err.to_string().contains("PORT"));
    }

    #[test]
    fn test_zero_context_capacity_rejected() {
        let mut pairs: Vec<(String, String)> = full_secrets().values.into_iter().collect();
        pairs.push(("CONTEXT_CAPACITY".to_string(), "0".to_string()));
        assert!(Config::from_secrets(&Secrets::from_pairs(pairs)).is_err());
    }
}
