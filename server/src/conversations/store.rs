//! In-memory conversation store keyed by `(page, sender)`.

use std::fmt;

use dashmap::DashMap;

use super::types::{
    Conversation, ConversationSummary, ConversationView, StoredMessage, ATTACHMENT_PLACEHOLDER,
};

/// Identifies the conversation between a page and one customer.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConversationKey {
    pub page_id: String,
    pub sender_id: String,
}

impl ConversationKey {
    pub fn new(page_id: impl Into<String>, sender_id: impl Into<String>) -> Self {
        Self {
            page_id: page_id.into(),
            sender_id: sender_id.into(),
        }
    }
}

/// Wire form used by dashboard clients: `{pageId}_{senderId}`.
impl fmt::Display for ConversationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.page_id, self.sender_id)
    }
}

/// Thread-safe conversation histories.
#[derive(Debug, Default)]
pub struct ConversationStore {
    conversations: DashMap<ConversationKey, Conversation>,
}

impl ConversationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a customer message, creating the conversation if needed.
    ///
    /// Bumps `last_activity` and the unread counter.
    pub fn record_incoming(&self, key: &ConversationKey, message: StoredMessage) -> ConversationSummary {
        let mut conversation = self.conversations.entry(key.clone()).or_insert_with(|| {
            Conversation::new(key.page_id.clone(), key.sender_id.clone(), message.timestamp)
        });

        let last_message = if message.text.is_empty() {
            ATTACHMENT_PLACEHOLDER.to_string()
        } else {
            message.text.clone()
        };
        let timestamp = message.timestamp;

        conversation.messages.push(message);
        conversation.last_activity = timestamp;
        conversation.unread_count += 1;

        ConversationSummary {
            sender_id: key.sender_id.clone(),
            last_message,
            timestamp,
            unread_count: conversation.unread_count,
        }
    }

    /// Append a message the page itself sent.
    ///
    /// Echoes never open a conversation; returns `false` if none exists.
    pub fn record_echo(&self, key: &ConversationKey, message: StoredMessage) -> bool {
        match self.conversations.get_mut(key) {
            Some(mut conversation) => {
                conversation.messages.push(message);
                true
            }
            None => false,
        }
    }

    /// All conversations for a page, most recently active first.
    pub fn list_for_page(&self, page_id: &str) -> Vec<ConversationView> {
        let mut views: Vec<ConversationView> = self
            .conversations
            .iter()
            .filter(|entry| entry.key().page_id == page_id)
            .map(|entry| ConversationView::from(entry.value()))
            .collect();
        views.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        views
    }

    pub fn get(&self, key: &ConversationKey) -> Option<Conversation> {
        self.conversations.get(key).map(|entry| entry.value().clone())
    }

    pub fn len(&self) -> usize {
        self.conversations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.conversations.is_empty()
    }
}
