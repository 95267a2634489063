//! Conversation history management
//!
//! Maintains chat history with a configurable limit. Trimming only ever cuts
//! at a plain user message, so a function call is never separated from its
//! response.

use std::collections::VecDeque;

use crate::core::Message;

/// Manages conversation history
#[derive(Debug, Clone)]
pub struct Conversation {
    /// Message history
    messages: VecDeque<Message>,
    /// Maximum history length
    max_length: usize,
}

impl Conversation {
    /// Create a new conversation
    pub fn new(max_length: usize) -> Self {
        Self {
            messages: VecDeque::new(),
            max_length: max_length.max(1),
        }
    }

    /// Add a message and maintain size limit
    pub fn push(&mut self, message: Message) {
        self.messages.push_back(message);
        self.trim();
    }

    /// Append a completed exchange
    pub fn extend(&mut self, messages: impl IntoIterator<Item = Message>) {
        self.messages.extend(messages);
        self.trim();
    }

    fn trim(&mut self) {
        while self.messages.len() > self.max_length {
            self.messages.pop_front();
        }
        // Never start in the middle of a tool exchange
        while self
            .messages
            .front()
            .is_some_and(|m| !m.is_user_text())
        {
            self.messages.pop_front();
        }
    }

    /// Get all messages in order
    pub fn messages(&self) -> Vec<Message> {
        self.messages.iter().cloned().collect()
    }

    /// Clear all history
    pub fn clear(&mut self) {
        self.messages.clear();
    }

    /// Get message count
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}
