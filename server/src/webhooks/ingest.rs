//! Webhook event handling.
//!
//! Each messaging event updates the conversation store and, when the page
//! has an owner, is pushed to that user's dashboard connections.

use chrono::Utc;
use tracing::{debug, info, warn};

use super::events::{EventKind, InboundMessage, MessagingEvent, Postback, WebhookPayload};
use crate::api::AppState;
use crate::conversations::{ConversationKey, StoredMessage};
use crate::ws::{DispatchError, ServerEvent};

/// Counts of handled events, for logging.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct IngestSummary {
    pub messages: usize,
    pub postbacks: usize,
    pub echoes: usize,
    pub skipped: usize,
}

/// Handle every event in a verified `page` payload.
pub fn process_payload(
    state: &AppState,
    payload: &WebhookPayload,
) -> Result<IngestSummary, DispatchError> {
    let mut summary = IngestSummary::default();

    for entry in &payload.entry {
        let page_id = entry.id.as_str();

        for event in &entry.messaging {
            match event.kind() {
                EventKind::Message(message) => {
                    if handle_incoming_message(state, page_id, event, message)? {
                        summary.messages += 1;
                    } else {
                        summary.skipped += 1;
                    }
                }
                EventKind::Postback(postback) => {
                    if handle_postback(state, page_id, event, postback)? {
                        summary.postbacks += 1;
                    } else {
                        summary.skipped += 1;
                    }
                }
                EventKind::Echo(message) => {
                    if handle_echo(state, page_id, event, message) {
                        summary.echoes += 1;
                    } else {
                        summary.skipped += 1;
                    }
                }
                EventKind::Unknown => {
                    debug!(page_id, "Unknown messaging event type");
                    summary.skipped += 1;
                }
            }
        }

        if let Some(changes) = &entry.changes {
            info!(page_id, changes = %changes, "Page changes received");
        }
    }

    Ok(summary)
}

fn participants(event: &MessagingEvent) -> Option<(&str, &str)> {
    match (&event.sender, &event.recipient) {
        (Some(sender), Some(recipient)) => Some((sender.id.as_str(), recipient.id.as_str())),
        _ => None,
    }
}

fn event_timestamp(event: &MessagingEvent) -> i64 {
    event
        .timestamp
        .unwrap_or_else(|| Utc::now().timestamp_millis())
}

fn stored_message(
    event: &MessagingEvent,
    message: &InboundMessage,
    sender_id: &str,
    recipient_id: &str,
    is_incoming: bool,
) -> StoredMessage {
    StoredMessage {
        id: message.mid.clone(),
        sender_id: sender_id.to_string(),
        recipient_id: recipient_id.to_string(),
        timestamp: event_timestamp(event),
        text: message.text.clone().unwrap_or_default(),
        attachments: message.attachments.clone(),
        is_incoming,
    }
}

/// Customer message to a page. Returns `false` if the event was unusable.
fn handle_incoming_message(
    state: &AppState,
    page_id: &str,
    event: &MessagingEvent,
    message: &InboundMessage,
) -> Result<bool, DispatchError> {
    let Some((sender_id, recipient_id)) = participants(event) else {
        warn!(page_id, "Message event without sender or recipient");
        return Ok(false);
    };

    info!(page_id, sender_id, "Incoming message");

    let key = ConversationKey::new(page_id, sender_id);
    let stored = stored_message(event, message, sender_id, recipient_id, true);
    let conversation = state.conversations.record_incoming(&key, stored.clone());

    if let Some(owner) = state.pages.find_owner(page_id) {
        let notification = ServerEvent::NewMessage {
            conversation_key: key.to_string(),
            message: stored,
            conversation,
        };
        let delivered = state.dispatcher.send_to_user(&owner, &notification)?;
        info!(user_id = %owner, delivered, "New message notification");
    }

    Ok(true)
}

/// Button or menu press. Not stored, only forwarded.
fn handle_postback(
    state: &AppState,
    page_id: &str,
    event: &MessagingEvent,
    postback: &Postback,
) -> Result<bool, DispatchError> {
    let Some(sender) = &event.sender else {
        warn!(page_id, "Postback event without sender");
        return Ok(false);
    };

    info!(
        page_id,
        sender_id = %sender.id,
        payload = postback.payload.as_deref().unwrap_or("-"),
        "Postback"
    );

    if let Some(owner) = state.pages.find_owner(page_id) {
        let notification = ServerEvent::Postback {
            sender_id: sender.id.clone(),
            page_id: page_id.to_string(),
            payload: postback.payload.clone(),
            title: postback.title.clone(),
            timestamp: event_timestamp(event),
        };
        let delivered = state.dispatcher.send_to_user(&owner, &notification)?;
        debug!(user_id = %owner, delivered, "Postback notification");
    }

    Ok(true)
}

/// Message the page sent, echoed back. Only appended to an existing
/// conversation with the recipient.
fn handle_echo(
    state: &AppState,
    page_id: &str,
    event: &MessagingEvent,
    message: &InboundMessage,
) -> bool {
    let Some((sender_id, recipient_id)) = participants(event) else {
        warn!(page_id, "Echo event without sender or recipient");
        return false;
    };

    let key = ConversationKey::new(page_id, recipient_id);
    let stored = stored_message(event, message, sender_id, recipient_id, false);
    let recorded = state.conversations.record_echo(&key, stored);
    debug!(page_id, recipient_id, recorded, "Echo");
    recorded
}
