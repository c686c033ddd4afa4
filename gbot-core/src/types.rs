//! Core types: user, chat, message, handler response, and the Handler/Middleware traits.

use async_trait::async_trait;
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// User identity (id, username, names).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

impl User {
    /// Name used when addressing the user (first name, falling back to username or the id).
    pub fn display_name(&self) -> String {
        self.first_name
            .clone()
            .or_else(|| self.username.clone())
            .unwrap_or_else(|| self.id.to_string())
    }
}

/// Chat (group or private) identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chat {
    pub id: i64,
    pub chat_type: String,
}

/// A single incoming or outgoing message with user, chat, content, and optional reply context.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// Chat-surface message id; history records keep it for reply-threading lookups.
    pub id: i64,
    pub user: User,
    pub chat: Chat,
    /// Message text, or photo caption; empty string when absent.
    pub content: String,
    pub message_type: String,
    /// File id of the largest photo variant; only set when `message_type` is "photo".
    pub photo_file_id: Option<String>,
    pub direction: MessageDirection,
    /// Receipt instant, local clock. The pipeline treats this as "now" so quota
    /// and timestamps are deterministic under test.
    pub created_at: DateTime<Local>,
    pub reply_to_message_id: Option<i64>,
}

/// Direction of the message (from user or from bot).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum MessageDirection {
    Incoming,
    Outgoing,
}

/// Handler result for the chain. `Reply(text)` carries the response body so middleware can use it in `after()`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandlerResponse {
    /// Pass to next handler.
    Continue,
    /// Stop the chain; no response body.
    Stop,
    /// Not this handler's message type, try next.
    Ignore,
    /// Stop the chain and attach the reply text that was sent.
    Reply(String),
}

/// Converts a transport-specific user type to core [`User`].
pub trait ToCoreUser: Send + Sync {
    fn to_core(&self) -> User;
}

/// Converts a transport-specific message type to core [`Message`].
pub trait ToCoreMessage: Send + Sync {
    fn to_core(&self) -> Message;
}

/// Processes one message. The first handler returning Stop or Reply ends the handler phase.
#[async_trait]
pub trait Handler: Send + Sync {
    async fn handle(&self, message: &Message) -> crate::error::Result<HandlerResponse>;
}

/// Cross-cutting hooks around the handler phase: `before` in registration order
/// (return false to stop the chain), `after` in reverse order with the final response.
#[async_trait]
pub trait Middleware: Send + Sync {
    async fn before(&self, _message: &Message) -> crate::error::Result<bool> {
        Ok(true)
    }
    async fn after(
        &self,
        _message: &Message,
        _response: &HandlerResponse,
    ) -> crate::error::Result<()> {
        Ok(())
    }
}
