//! OAuth2 token bundle
//!
//! Held in memory by the owning session only; never written to disk.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// OAuth2 credentials returned by the token endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenBundle {
    /// The access token for API requests
    pub token: String,

    /// The refresh token for obtaining new access tokens
    pub refresh_token: Option<String>,

    pub token_uri: String,
    pub client_id: String,
    pub client_secret: String,

    /// Scopes granted
    pub scopes: Vec<String>,

    /// When the access token expires
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

impl TokenBundle {
    /// Compute `expires_at` from the token endpoint's `expires_in`
    pub fn expires_in(mut self, expires_in_secs: Option<i64>) -> Self {
        self.expires_at = expires_in_secs.map(|secs| Utc::now() + chrono::Duration::seconds(secs));
        self
    }

    /// Check if the access token is expired or about to expire
    ///
    /// Returns true if the token expires within the next 5 minutes
    pub fn is_expired(&self) -> bool {
        match self.expires_at {
            Some(expires) => {
                let buffer = chrono::Duration::minutes(5);
                Utc::now() + buffer >= expires
            }
            None => false,
        }
    }

    /// Check if we have a refresh token
    pub fn can_refresh(&self) -> bool {
        self.refresh_token.is_some()
    }
}

#[cfg(test)]
pub(crate) fn test_bundle(token: &str) -> TokenBundle {
    TokenBundle {
        token: token.to_string(),
        refresh_token: Some("refresh".to_string()),
        token_uri: "https://oauth2.googleapis.com/token".to_string(),
        client_id: "client-123".to_string(),
        client_secret: "shh".to_string(),
        scopes: vec!["https://www.googleapis.com/auth/gmail.readonly".to_string()],
        expires_at: None,
    }
}
