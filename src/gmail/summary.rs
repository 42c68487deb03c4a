//! Header extraction for message summaries

use super::types::{GmailMessage, MessageHeader, MessageSummary};

pub const NO_SUBJECT: &str = "No Subject";
pub const UNKNOWN_SENDER: &str = "Unknown Sender";

/// First header value with the given name (case-insensitive)
pub fn header_value<'a>(headers: &'a [MessageHeader], name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|h| h.name.eq_ignore_ascii_case(name))
        .map(|h| h.value.as_str())
}

/// Project a Gmail message into a summary.
///
/// Missing headers degrade to placeholders instead of failing.
pub fn summarize_message(message: &GmailMessage) -> MessageSummary {
    let headers = message
        .payload
        .as_ref()
        .map(|p| p.headers.as_slice())
        .unwrap_or(&[]);

    MessageSummary {
        id: message.id.clone(),
        subject: header_value(headers, "Subject")
            .unwrap_or(NO_SUBJECT)
            .to_string(),
        sender: header_value(headers, "From")
            .unwrap_or(UNKNOWN_SENDER)
            .to_string(),
        snippet: message.snippet.clone().unwrap_or_default(),
    }
}
