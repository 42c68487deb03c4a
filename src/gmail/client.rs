//! Gmail API HTTP client
//!
//! Thin async wrapper over `users.messages.list` and `users.messages.get`.
//! The caller supplies the access token on every call.

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use url::Url;

use super::summary::summarize_message;
use super::types::{ApiErrorResponse, GmailMessage, ListMessagesResponse, MessageSummary};
use super::MailProvider;
use crate::error::Error;
use crate::Result;

/// Gmail caps a single list page at 500 ids
pub const MAX_RESULTS_CAP: u32 = 500;

/// Gmail API client
#[derive(Clone)]
pub struct GmailClient {
    base_url: String,
    client: Client,
}

impl GmailClient {
    pub fn new(base_url: &str, client: Client) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        }
    }

    fn messages_url(&self, id: Option<&str>) -> Result<Url> {
        let mut url = Url::parse(&format!("{}/users/me/messages", self.base_url))
            .map_err(|e| Error::Config(format!("Invalid Gmail API URL: {}", e)))?;
        if let Some(id) = id {
            url.path_segments_mut()
                .map_err(|_| Error::Config("Gmail API URL cannot be a base".to_string()))?
                .push(id);
        }
        Ok(url)
    }

    /// Fetch the raw message resource, `None` if Gmail has no such id
    pub async fn fetch_message(&self, token: &str, id: &str) -> Result<Option<GmailMessage>> {
        let url = self.messages_url(Some(id))?;
        tracing::debug!("Fetching Gmail message {}", id);

        let response = self
            .client
            .get(url)
            .bearer_auth(token)
            .query(&[
                ("format", "metadata"),
                ("metadataHeaders", "Subject"),
                ("metadataHeaders", "From"),
            ])
            .send()
            .await?;

        match response.status() {
            status if status.is_success() => Ok(Some(response.json().await?)),
            StatusCode::NOT_FOUND => Ok(None),
            _ => match provider_error(response).await {
                // Gmail answers 400 for ids that are not even well-formed
                Error::Provider(msg) if msg.contains("Invalid id value") => Ok(None),
                err => Err(err),
            },
        }
    }
}

#[async_trait]
impl MailProvider for GmailClient {
    async fn list_message_ids(&self, token: &str, query: &str, limit: u32) -> Result<Vec<String>> {
        let url = self.messages_url(None)?;
        let limit = limit.clamp(1, MAX_RESULTS_CAP).to_string();
        tracing::debug!("Listing Gmail messages (limit {})", limit);

        let response = self
            .client
            .get(url)
            .bearer_auth(token)
            .query(&[("q", query), ("maxResults", limit.as_str())])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(provider_error(response).await);
        }

        let list: ListMessagesResponse = response.json().await?;
        Ok(list
            .messages
            .unwrap_or_default()
            .into_iter()
            .map(|m| m.id)
            .collect())
    }

    async fn get_message(&self, token: &str, id: &str) -> Result<Option<MessageSummary>> {
        Ok(self
            .fetch_message(token, id)
            .await?
            .as_ref()
            .map(summarize_message))
    }
}

/// Turn a non-success Gmail response into a provider error carrying its message
async fn provider_error(response: Response) -> Error {
    let status = response.status();
    let body = match response.text().await {
        Ok(body) => body,
        Err(e) => return Error::Http(e),
    };

    let message = serde_json::from_str::<ApiErrorResponse>(&body)
        .map(|e| e.error.message)
        .ok()
        .filter(|m| !m.is_empty())
        .unwrap_or(body);

    Error::Provider(format!("Gmail API error ({}): {}", status.as_u16(), message))
}
