//! Per-session mailbox agent
//!
//! Composes the mail provider and the LLM for one authenticated user.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, warn};

use super::context::ContextWindow;
use super::llm::LlmClient;
use super::prompt::{analysis_prompt, ANALYZE_HEADER};
use crate::auth::{GoogleOAuth, TokenBundle};
use crate::error::Error;
use crate::gmail::{MailProvider, MessageSummary};
use crate::Result;

/// Default number of messages returned by a search
pub const DEFAULT_MAX_RESULTS: u32 = 10;

/// Shared, stateless collaborators every agent uses
#[derive(Clone)]
pub struct AgentServices {
    pub mail: Arc<dyn MailProvider>,
    pub llm: Arc<dyn LlmClient>,
    pub oauth: GoogleOAuth,
}

/// Result of analyzing one message
#[derive(Debug, Clone, Serialize)]
pub struct EmailAnalysis {
    pub email_id: String,
    pub subject: String,
    pub sender: String,
    pub analysis: String,
}

/// Mailbox agent holding one user's credentials and context
pub struct GmailAgent {
    services: AgentServices,
    credentials: Option<TokenBundle>,
    context: ContextWindow,
}

impl GmailAgent {
    pub fn new(services: AgentServices, context_capacity: usize) -> Self {
        Self {
            services,
            credentials: None,
            context: ContextWindow::new(context_capacity),
        }
    }

    /// Install credentials from a successful OAuth callback
    pub fn set_credentials(&mut self, credentials: TokenBundle) {
        self.credentials = Some(credentials);
    }

    pub fn is_authenticated(&self) -> bool {
        self.credentials.is_some()
    }

    pub fn credentials(&self) -> Option<&TokenBundle> {
        self.credentials.as_ref()
    }

    pub fn context(&self) -> &ContextWindow {
        &self.context
    }

    pub fn clear_context(&mut self) {
        self.context.clear();
    }

    /// Current access token, refreshed first if it has expired
    async fn access_token(&mut self) -> Result<String> {
        let creds = self.credentials.as_ref().ok_or(Error::NotAuthenticated)?;

        if creds.is_expired() && creds.can_refresh() {
            info!("Access token expired, refreshing...");
            let fresh = self.services.oauth.refresh(creds).await?;
            let token = fresh.token.clone();
            self.credentials = Some(fresh);
            return Ok(token);
        }

        Ok(creds.token.clone())
    }

    /// Search the mailbox and summarize every match, in provider order
    pub async fn search_emails(&mut self, query: &str, max_results: u32) -> Result<Vec<MessageSummary>> {
        let token = self.access_token().await?;
        let ids = self
            .services
            .mail
            .list_message_ids(&token, query, max_results)
            .await?;
        debug!("Search '{}' matched {} messages", query, ids.len());

        let mut emails = Vec::with_capacity(ids.len());
        for id in ids {
            match self.services.mail.get_message(&token, &id).await? {
                Some(summary) => emails.push(summary),
                None => warn!("Message {} disappeared between list and get", id),
            }
        }

        Ok(emails)
    }

    /// Fetch one message summary
    pub async fn get_message(&mut self, id: &str) -> Result<MessageSummary> {
        let token = self.access_token().await?;
        self.services
            .mail
            .get_message(&token, id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Email {} not found", id)))
    }

    /// Ask the LLM about a message and remember the exchange
    pub async fn summarize(&mut self, message: &MessageSummary) -> Result<String> {
        let prompt = analysis_prompt(message, &self.context);
        let text = self.services.llm.generate(&prompt).await?;
        self.context.record(ANALYZE_HEADER, text.clone());
        Ok(text)
    }

    /// Fetch a message and analyze it
    pub async fn process_email(&mut self, id: &str) -> Result<EmailAnalysis> {
        let message = self.get_message(id).await?;
        let analysis = self.summarize(&message).await?;
        info!("Analyzed email {} with {}", id, self.services.llm.model());

        Ok(EmailAnalysis {
            email_id: message.id,
            subject: message.subject,
            sender: message.sender,
            analysis,
        })
    }
}


#[cfg(test)]
mod tests {
    use super::testing::*;
    use super::*;
    use crate::agent::llm::FakeLlmClient;
    use crate::auth::test_bundle;

    fn agent(mail: Arc<FakeMailProvider>, llm: Arc<FakeLlmClient>) -> GmailAgent {
        let services = AgentServices {
            mail,
            llm,
            oauth: oauth("http://127.0.0.1:1/token"),
        };
        GmailAgent::new(services, 5)
    }

    #[tokio::test]
    async fn test_search_requires_authentication() {
        let mail = Arc::new(FakeMailProvider::default());
        let mut agent = agent(mail.clone(), Arc::new(FakeLlmClient::new(vec![])));

        let err = agent.search_emails("test", 10).await.unwrap_err();
        assert!(matches!(err, Error::NotAuthenticated));
        assert_eq!(mail.calls(), 0);
    }

    #[tokio::test]
    async fn test_analyze_requires_authentication() {
        let mail = Arc::new(FakeMailProvider::default());
        let llm = Arc::new(FakeLlmClient::new(vec!["unused"]));
        let mut agent = agent(mail.clone(), llm.clone());

        assert!(agent.process_email("m1").await.unwrap_err().is_auth());
        assert_eq!(mail.calls(), 0);
        assert!(llm.prompts().is_empty());
    }

    #[tokio::test]
    async fn test_search_returns_provider_order() {
        let mail = Arc::new(FakeMailProvider::with_messages(vec![
            summary("b", "Report Q1", "x@example.com", ""),
            summary("a", "Report Q2", "y@example.com", ""),
            summary("c", "Lunch", "z@example.com", ""),
        ]));
        let mut agent = agent(mail.clone(), Arc::new(FakeLlmClient::new(vec![])));
        agent.set_credentials(test_bundle("tok"));

        let emails = agent.search_emails("Report", 10).await.unwrap();
        let ids: Vec<&str> = emails.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a"]);
        assert!(mail.tokens.lock().unwrap().iter().all(|t| t == "tok"));
    }

    #[tokio::test]
    async fn test_process_email_records_context() {
        let mail = Arc::new(FakeMailProvider::with_messages(vec![summary(
            "m1",
            "Invoice",
            "billing@example.com",
            "Your invoice is ready",
        )]));
        let llm = Arc::new(FakeLlmClient::new(vec!["Pay it.", "Still pay it."]));
        let mut agent = agent(mail, llm.clone());
        agent.set_credentials(test_bundle("tok"));

        let first = agent.process_email("m1").await.unwrap();
        assert_eq!(first.email_id, "m1");
        assert_eq!(first.analysis, "Pay it.");
        assert_eq!(agent.context().len(), 1);

        agent.process_email("m1").await.unwrap();
        let prompts = llm.prompts();
        assert!(!prompts[0].contains("Previous context"));
        assert!(prompts[1].contains("Output: Pay it."));
        let entries = agent.context().read_all();
        assert_eq!(entries[0].input, "Analyze this email:");
        assert_eq!(entries[1].output, "Still pay it.");
    }

    #[tokio::test]
    async fn test_unknown_message_is_not_found() {
        let mail = Arc::new(FakeMailProvider::default());
        let llm = Arc::new(FakeLlmClient::new(vec![]));
        let mut agent = agent(mail, llm.clone());
        agent.set_credentials(test_bundle("tok"));

        let err = agent.process_email("unknown-id").await.unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
        assert!(llm.prompts().is_empty());
    }

    #[tokio::test]
    async fn test_failed_generation_leaves_context_untouched() {
        let mail = Arc::new(FakeMailProvider::with_messages(vec![summary("m1", "s", "f", "")]));
        let mut agent = agent(mail, Arc::new(FakeLlmClient::new(vec![])));
        agent.set_credentials(test_bundle("tok"));

        assert!(agent.process_email("m1").await.is_err());
        assert!(agent.context().is_empty());
    }

    #[tokio::test]
    async fn test_expired_token_is_refreshed() {
        let mut server = mockito::Server::new_async().await;
        let token_url = format!("{}/token", server.url());
        let _mock = server
            .mock("POST", "/token")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"access_token":"fresh","expires_in":3599}"#)
            .create_async()
            .await;

        let mail = Arc::new(FakeMailProvider::with_messages(vec![summary("m1", "hello", "f", "")]));
        let services = AgentServices {
            mail: mail.clone(),
            llm: Arc::new(FakeLlmClient::new(vec![])),
            oauth: oauth(&token_url),
        };
        let mut agent = GmailAgent::new(services, 5);
        let mut stale = test_bundle("stale");
        stale.token_uri = token_url;
        agent.set_credentials(stale.expires_in(Some(0)));

        agent.search_emails("hello", 10).await.unwrap();
        assert_eq!(mail.tokens.lock().unwrap()[0], "fresh");
        assert_eq!(agent.credentials().unwrap().refresh_token.as_deref(), Some("refresh"));
    }
}
