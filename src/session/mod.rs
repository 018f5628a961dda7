pub mod state;

pub use state::{Effect, SessionState};

pub const OPERATOR: &str = "You";

/// Fixed universe of reviewers that can be invited into the session.
pub const REVIEWERS: [&str; 2] = ["Colleague A", "Manager"];

pub const REVIEWER_GREETING: &str = "Hi, how can I help with this review?";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Message {
    pub role: Role,
    pub content: String,
    /// Display name of the participant who authored a user message. Dropped
    /// when the transcript is sent as conversation context.
    pub author: Option<String>,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
            author: None,
        }
    }

    pub fn user(content: impl Into<String>, author: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            author: Some(author.into()),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            author: None,
        }
    }
}
