//! Inbound webhook payloads.
//!
//! Only the fields the relay reads are modelled; everything else in the
//! platform's payload is ignored.

use serde::Deserialize;

/// Top-level callback body.
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookPayload {
    /// Empty when the field is absent
    #[serde(default)]
    pub object: String,
    #[serde(default)]
    pub entry: Vec<Entry>,
}

/// One page's batch of events.
#[derive(Debug, Clone, Deserialize)]
pub struct Entry {
    /// Page ID
    pub id: String,
    #[serde(default)]
    pub time: Option<i64>,
    #[serde(default)]
    pub messaging: Vec<MessagingEvent>,
    /// Feed and other page field changes; logged only
    #[serde(default)]
    pub changes: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Participant {
    pub id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MessagingEvent {
    pub sender: Option<Participant>,
    pub recipient: Option<Participant>,
    /// Milliseconds since the epoch
    pub timestamp: Option<i64>,
    pub message: Option<InboundMessage>,
    pub postback: Option<Postback>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InboundMessage {
    pub mid: Option<String>,
    pub text: Option<String>,
    #[serde(default)]
    pub attachments: Vec<serde_json::Value>,
    #[serde(default)]
    pub is_echo: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Postback {
    pub title: Option<String>,
    pub payload: Option<String>,
}

/// What a messaging event is, in handling priority order.
#[derive(Debug, Clone, Copy)]
pub enum EventKind<'a> {
    Message(&'a InboundMessage),
    Postback(&'a Postback),
    Echo(&'a InboundMessage),
    Unknown,
}

impl MessagingEvent {
    pub fn kind(&self) -> EventKind<'_> {
        match (&self.message, &self.postback) {
            (Some(message), _) if !message.is_echo => EventKind::Message(message),
            (_, Some(postback)) => EventKind::Postback(postback),
            (Some(message), None) => EventKind::Echo(message),
            (None, None) => EventKind::Unknown,
        }
    }
}
