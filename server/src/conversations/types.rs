//! Conversation Types

use serde::{Deserialize, Serialize};

/// Shown as the last message when a message carries only attachments.
pub const ATTACHMENT_PLACEHOLDER: &str = "[Attachment]";

/// A message stored in a conversation, in either direction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredMessage {
    /// Platform message ID (`mid`)
    pub id: Option<String>,
    pub sender_id: String,
    pub recipient_id: String,
    /// Platform timestamp in milliseconds
    pub timestamp: i64,
    pub text: String,
    pub attachments: Vec<serde_json::Value>,
    /// `true` for messages from the customer, `false` for page echoes
    pub is_incoming: bool,
}

/// Conversation between one page and one customer.
#[derive(Debug, Clone, PartialEq)]
pub struct Conversation {
    pub page_id: String,
    pub sender_id: String,
    pub messages: Vec<StoredMessage>,
    pub last_activity: i64,
    pub unread_count: u32,
}

impl Conversation {
    pub(crate) const fn new(page_id: String, sender_id: String, last_activity: i64) -> Self {
        Self {
            page_id,
            sender_id,
            messages: Vec::new(),
            last_activity,
            unread_count: 0,
        }
    }
}

/// Conversation summary pushed alongside a `new_message` event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationSummary {
    pub sender_id: String,
    pub last_message: String,
    pub timestamp: i64,
    pub unread_count: u32,
}

/// Conversation as listed by `GET /api/conversations/{user_id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationView {
    /// The customer's ID (conversations are listed per page)
    pub id: String,
    pub sender_id: String,
    pub last_message: String,
    pub timestamp: i64,
    pub unread_count: u32,
    pub messages: Vec<StoredMessage>,
}

impl From<&Conversation> for ConversationView {
    fn from(conversation: &Conversation) -> Self {
        Self {
            id: conversation.sender_id.clone(),
            sender_id: conversation.sender_id.clone(),
            last_message: conversation
                .messages
                .last()
                .map(|m| m.text.clone())
                .unwrap_or_default(),
            timestamp: conversation.last_activity,
            unread_count: conversation.unread_count,
            messages: conversation.messages.clone(),
        }
    }
}

/// Response body for the conversation listing.
#[derive(Debug, Serialize, Deserialize)]
pub struct ConversationsResponse {
    pub conversations: Vec<ConversationView>,
}
