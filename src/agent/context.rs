//! Conversational context for LLM prompts.
//!
//! A fixed-capacity ring of past (input, output) exchanges. Once full, each
//! new record evicts the oldest one.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::Serialize;

/// One recorded exchange.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContextEntry {
    pub input: String,
    pub output: String,
    pub recorded_at: DateTime<Utc>,
}

/// Bounded history of exchanges, oldest first.
#[derive(Debug, Clone)]
pub struct ContextWindow {
    entries: VecDeque<ContextEntry>,
    capacity: usize,
}

impl ContextWindow {
    /// Create an empty window. A capacity of zero is treated as one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append an exchange, evicting the oldest when full.
    pub fn record(&mut self, input: impl Into<String>, output: impl Into<String>) {
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(ContextEntry {
            input: input.into(),
            output: output.into(),
            recorded_at: Utc::now(),
        });
    }

    /// All retained entries in call order.
    pub fn read_all(&self) -> Vec<ContextEntry> {
        self.entries.iter().cloned().collect()
    }

    /// Render the window as a prompt prefix; empty when there is no history.
    pub fn format_for_prompt(&self) -> String {
        if self.entries.is_empty() {
            return String::new();
        }

        let mut out = String::from("Previous context:\n");
        for entry in &self.entries {
            out.push_str("Input: ");
            out.push_str(&entry.input);
            out.push_str("\nOutput: ");
            out.push_str(&entry.output);
            out.push('\n');
        }
        out
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
