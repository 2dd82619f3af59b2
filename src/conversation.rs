//! Conversation history helpers.
//!
//! Pure, append-only: callers keep their full history for display and
//! persistence; the window is applied only when building the generation
//! request.

use serde::{Deserialize, Serialize};

use crate::core::config::ConversationConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    System,
}

/// One turn of dialogue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub role: Role,
    pub content: String,
}

impl ConversationTurn {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

/// Return a new history with `content` appended. Never mutates the input.
pub fn append_turn(
    history: &[ConversationTurn],
    role: Role,
    content: impl Into<String>,
) -> Vec<ConversationTurn> {
    let mut next = history.to_vec();
    next.push(ConversationTurn::new(role, content));
    next
}

/// The most recent `max_turns` entries in original order (FIFO eviction).
pub fn windowed(history: &[ConversationTurn], max_turns: usize) -> Vec<ConversationTurn> {
    history[history.len().saturating_sub(max_turns)..].to_vec()
}

/// Bounds the dialogue slice sent to the generation service.
#[derive(Debug, Clone)]
pub struct ConversationManager {
    config: ConversationConfig,
}

impl ConversationManager {
    pub fn new(config: ConversationConfig) -> Self {
        Self { config }
    }

    pub fn max_turns(&self) -> usize {
        self.config.max_turns
    }

    pub fn window(&self, history: &[ConversationTurn]) -> Vec<ConversationTurn> {
        windowed(history, self.config.max_turns)
    }
}

impl Default for ConversationManager {
    fn default() -> Self {
        Self::new(ConversationConfig::default())
    }
}
