use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::feed::FeedPayload;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
    FeedData,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Content {
    Text(String),
    /// A reply that could not be produced; holds the reason.
    Failed(String),
    Feed(FeedPayload),
}

/// One role-tagged transcript entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: Content,
    pub created_at: DateTime<Utc>,
}

impl Message {
    fn new(role: Role, content: Content) -> Self {
        Self {
            role,
            content,
            created_at: Utc::now(),
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Role::User, Content::Text(text.into()))
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self::new(Role::Assistant, Content::Text(text.into()))
    }

    pub fn assistant_failed(reason: impl Into<String>) -> Self {
        Self::new(Role::Assistant, Content::Failed(reason.into()))
    }

    pub fn feed_data(payload: FeedPayload) -> Self {
        Self::new(Role::FeedData, Content::Feed(payload))
    }

    /// Text body for user and assistant messages.
    pub fn text(&self) -> Option<&str> {
        match &self.content {
            Content::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn is_error(&self) -> bool {
        match &self.content {
            Content::Failed(_) => true,
            Content::Feed(payload) => payload.error_message().is_some(),
            Content::Text(_) => false,
        }
    }
}
