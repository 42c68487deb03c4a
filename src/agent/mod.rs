//! Agent module: mailbox agent logic.
//!
//! This module contains:
//! - The per-session [`GmailAgent`] composing mail and LLM calls
//! - LLM client trait and the Gemini implementation
//! - The bounded conversational context fed back into prompts

mod context;
mod mailbox;
mod prompt;

// LLM providers in submodule
pub mod llm;

// Re-exports for convenience
pub use context::{ContextEntry, ContextWindow};
pub use llm::{GeminiClient, LlmClient};
pub use mailbox::{AgentServices, EmailAnalysis, GmailAgent, DEFAULT_MAX_RESULTS};
pub use prompt::{analysis_prompt, ANALYZE_HEADER};

#[cfg(test)]
pub(crate) use mailbox::testing;
