//! Session store: isolated agent state per authenticated user.
//!
//! Each session id maps to its own [`GmailAgent`] behind a mutex, so
//! concurrent requests for the same session run one at a time while
//! different sessions never see each other's credentials or context.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};

use crate::agent::{AgentServices, GmailAgent};

/// Session used when a request does not name one
pub const DEFAULT_SESSION: &str = "default";

/// Handle to one session's agent
pub type SharedAgent = Arc<Mutex<GmailAgent>>;

/// Map of session id to agent, created on first use
pub struct SessionStore {
    sessions: RwLock<HashMap<String, SharedAgent>>,
    services: AgentServices,
    context_capacity: usize,
}

impl SessionStore {
    pub fn new(services: AgentServices, context_capacity: usize) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            services,
            context_capacity,
        }
    }

    /// Agent for `id`, creating an unauthenticated one if needed
    pub async fn get_or_create(&self, id: &str) -> SharedAgent {
        if let Some(agent) = self.sessions.read().await.get(id) {
            return agent.clone();
        }

        let mut sessions = self.sessions.write().await;
        sessions
            .entry(id.to_string())
            .or_insert_with(|| {
                tracing::debug!("Creating session {}", id);
                Arc::new(Mutex::new(GmailAgent::new(
                    self.services.clone(),
                    self.context_capacity,
                )))
            })
            .clone()
    }

    /// Agent for `id` if the session exists
    pub async fn get(&self, id: &str) -> Option<SharedAgent> {
        self.sessions.read().await.get(id).cloned()
    }

    /// Drop a session and everything it holds
    pub async fn remove(&self, id: &str) -> bool {
        self.sessions.write().await.remove(id).is_some()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}
