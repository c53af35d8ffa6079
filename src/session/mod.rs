use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

/// One message in the conversation, tagged with its speaker.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub content: String,
}

/// Ordered, append-only conversation history for one browser session.
/// Turns are stored in literal send order; nothing is ever reordered,
/// merged, or deleted.
#[derive(Debug)]
pub struct ChatSession {
    turns: Vec<Turn>,
}

impl ChatSession {
    /// Creates a session seeded with the assistant greeting.
    pub fn new(greeting: &str) -> Self {
        Self {
            turns: vec![Turn {
                role: Role::Assistant,
                content: greeting.to_string(),
            }],
        }
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Appends one completed user/assistant exchange. Callers invoke this
    /// only after the response stream has been fully drained, so a failed
    /// request never leaves a dangling user turn behind.
    pub fn commit_exchange(&mut self, user_text: &str, assistant_text: &str) {
        self.turns.push(Turn {
            role: Role::User,
            content: user_text.to_string(),
        });
        self.turns.push(Turn {
            role: Role::Assistant,
            content: assistant_text.to_string(),
        });
    }
}

pub type SharedSession = Arc<Mutex<ChatSession>>;

pub fn shared(greeting: &str) -> SharedSession {
    Arc::new(Mutex::new(ChatSession::new(greeting)))
}
