//! Prompt templates.

use crate::gmail::MessageSummary;

use super::context::ContextWindow;

/// Leading line of every analysis prompt.
pub const ANALYZE_HEADER: &str = "Analyze this email:";

/// Build the analysis prompt, prefixed with any previous context.
pub fn analysis_prompt(message: &MessageSummary, context: &ContextWindow) -> String {
    let history = context.format_for_prompt();
    let mut prompt = String::with_capacity(history.len() + message.snippet.len() + 160);

    if !history.is_empty() {
        prompt.push_str(&history);
        prompt.push('\n');
    }

    prompt.push_str(&format!(
        "{}\nFrom: {}\nSubject: {}\nContent: {}\n\nProvide a summary and suggested actions.",
        ANALYZE_HEADER, message.sender, message.subject, message.snippet
    ));
    prompt
}
