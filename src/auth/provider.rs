//! GoogleOAuth - web-server OAuth2 flow for Gmail access
//!
//! Builds the consent URL and exchanges/refreshes tokens against
//! Google's token endpoint.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use url::Url;

use super::credentials::TokenBundle;
use crate::config::GoogleConfig;
use crate::error::Error;
use crate::Result;

/// Google OAuth2 token response
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    expires_in: Option<i64>,
    #[serde(default)]
    scope: Option<String>,
}

/// Token exchange request
#[derive(Debug, Serialize)]
struct TokenExchangeRequest<'a> {
    client_id: &'a str,
    client_secret: &'a str,
    code: &'a str,
    redirect_uri: &'a str,
    grant_type: &'a str,
}

/// Token refresh request
#[derive(Debug, Serialize)]
struct RefreshRequest<'a> {
    client_id: &'a str,
    client_secret: &'a str,
    refresh_token: &'a str,
    grant_type: &'a str,
}

/// Google OAuth2 client for the authorization-code flow
#[derive(Clone)]
pub struct GoogleOAuth {
    config: GoogleConfig,
    http_client: Client,
}

impl GoogleOAuth {
    pub fn new(config: GoogleConfig, http_client: Client) -> Self {
        Self {
            config,
            http_client,
        }
    }

    /// Build the authorization URL
    ///
    /// Requests offline access so Google issues a refresh token, and keeps
    /// any scopes the user already granted. `state` round-trips through the
    /// callback untouched.
    pub fn build_authorization_url(&self, state: Option<&str>) -> Result<String> {
        let mut url = Url::parse(&self.config.auth_url)
            .map_err(|e| Error::Config(format!("Invalid auth URL: {}", e)))?;

        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("response_type", "code")
                .append_pair("client_id", &self.config.client_id)
                .append_pair("redirect_uri", &self.config.redirect_uri)
                .append_pair("scope", &self.config.scopes.join(" "))
                .append_pair("access_type", "offline")
                .append_pair("include_granted_scopes", "true")
                .append_pair("prompt", "consent");
            if let Some(state) = state {
                query.append_pair("state", state);
            }
        }

        Ok(url.to_string())
    }

    /// Exchange authorization code for tokens
    pub async fn exchange_code(&self, code: &str) -> Result<TokenBundle> {
        if code.trim().is_empty() {
            return Err(Error::Auth("Missing authorization code".to_string()));
        }

        let request = TokenExchangeRequest {
            client_id: &self.config.client_id,
            client_secret: &self.config.client_secret,
            code,
            redirect_uri: &self.config.redirect_uri,
            grant_type: "authorization_code",
        };

        tracing::debug!("Exchanging authorization code at {}", self.config.token_url);

        let response = self
            .http_client
            .post(&self.config.token_url)
            .form(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let error_text = response.text().await?;
            return Err(Error::Auth(format!("Token exchange failed: {}", error_text)));
        }

        let token_response: TokenResponse = response.json().await?;
        Ok(self.bundle_from(token_response, None))
    }

    /// Refresh an expired access token
    pub async fn refresh(&self, bundle: &TokenBundle) -> Result<TokenBundle> {
        let refresh_token = bundle
            .refresh_token
            .as_deref()
            .ok_or_else(|| Error::Auth("No refresh token available".to_string()))?;

        let request = RefreshRequest {
            client_id: &bundle.client_id,
            client_secret: &bundle.client_secret,
            refresh_token,
            grant_type: "refresh_token",
        };

        let response = self
            .http_client
            .post(&bundle.token_uri)
            .form(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let error_text = response.text().await?;
            return Err(Error::Auth(format!("Token refresh failed: {}", error_text)));
        }

        let token_response: TokenResponse = response.json().await?;

        // Preserve the refresh token if not returned in response
        Ok(self.bundle_from(token_response, Some(refresh_token)))
    }

    fn bundle_from(&self, response: TokenResponse, previous_refresh: Option<&str>) -> TokenBundle {
        let scopes = match response.scope {
            Some(scope) => scope.split_whitespace().map(str::to_string).collect(),
            None => self.config.scopes.clone(),
        };

        TokenBundle {
            token: response.access_token,
            refresh_token: response
                .refresh_token
                .or_else(|| previous_refresh.map(str::to_string)),
            token_uri: self.config.token_url.clone(),
            client_id: self.config.client_id.clone(),
            client_secret: self.config.client_secret.clone(),
            scopes,
            expires_at: None,
        }
        .expires_in(response.expires_in)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GMAIL_SCOPES;

    fn google_config(token_url: &str) -> GoogleConfig {
        GoogleConfig {
            client_id: "client-123".to_string(),
            client_secret: "shh".to_string(),
            redirect_uri: "http://localhost:8000/auth/callback".to_string(),
            auth_url: "https://accounts.google.com/o/oauth2/auth".to_string(),
            token_url: token_url.to_string(),
            scopes: GMAIL_SCOPES.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn test_authorization_url_contents() {
        let oauth = GoogleOAuth::new(google_config("http://unused"), Client::new());
        let url = oauth.build_authorization_url(Some("session-1")).unwrap();
        let parsed = Url::parse(&url).unwrap();
        let pairs: Vec<(String, String)> = parsed
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        let get = |key: &str| {
            pairs
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.as_str())
        };

        assert!(url.contains("client_id=client-123"));
        assert_eq!(get("redirect_uri"), Some("http://localhost:8000/auth/callback"));
        assert_eq!(get("access_type"), Some("offline"));
        assert_eq!(get("include_granted_scopes"), Some("true"));
        assert_eq!(get("scope"), Some(GMAIL_SCOPES[0]));
        assert_eq!(get("state"), Some("session-1"));
    }

    #[test]
    fn test_authorization_url_is_pure() {
        let oauth = GoogleOAuth::new(google_config("http://unused"), Client::new());
        assert_eq!(
            oauth.build_authorization_url(None).unwrap(),
            oauth.build_authorization_url(None).unwrap()
        );
    }

    #[tokio::test]
    async fn test_exchange_code_success() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/token")
            .match_body(mockito::Matcher::UrlEncoded("code".into(), "good-code".into()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"access_token":"ya29","refresh_token":"1//r","expires_in":3599,"token_type":"Bearer","scope":"https://www.googleapis.com/auth/gmail.readonly"}"#)
            .create_async()
            .await;

        let oauth = GoogleOAuth::new(google_config(&format!("{}/token", server.url())), Client::new());
        let bundle = oauth.exchange_code("good-code").await.unwrap();

        assert_eq!(bundle.token, "ya29");
        assert_eq!(bundle.refresh_token.as_deref(), Some("1//r"));
        assert_eq!(bundle.client_id, "client-123");
        assert_eq!(bundle.scopes, vec![GMAIL_SCOPES[0].to_string()]);
        assert!(!bundle.is_expired());
    }

    #[tokio::test]
    async fn test_exchange_code_rejected() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/token")
            .with_status(400)
            .with_body(r#"{"error":"invalid_grant","error_description":"Bad Request"}"#)
            .create_async()
            .await;

        let oauth = GoogleOAuth::new(google_config(&format!("{}/token", server.url())), Client::new());
        let err = oauth.exchange_code("BADCODE").await.unwrap_err();

        assert!(err.is_auth());
        assert!(err.to_string().contains("invalid_grant"));
    }

    #[tokio::test]
    async fn test_refresh_keeps_refresh_token() {
        let mut server = mockito::Server::new_async().await;
        let token_url = format!("{}/token", server.url());
        let _mock = server
            .mock("POST", "/token")
            .match_body(mockito::Matcher::UrlEncoded("grant_type".into(), "refresh_token".into()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"access_token":"fresh","expires_in":3599}"#)
            .create_async()
            .await;

        let oauth = GoogleOAuth::new(google_config(&token_url), Client::new());
        let mut old = crate::auth::credentials::test_bundle("stale");
        old.token_uri = token_url;

        let bundle = oauth.refresh(&old).await.unwrap();
        assert_eq!(bundle.token, "fresh");
        assert_eq!(bundle.refresh_token.as_deref(), Some("refresh"));
    }
}
