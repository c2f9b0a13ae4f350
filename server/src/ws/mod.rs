//! WebSocket Handler
//!
//! Real-time push to dashboard clients. A client connects unauthenticated,
//! identifies itself with an `auth` message, and from then on receives the
//! events for pages it owns.

pub mod connection;
pub mod dispatch;
pub mod registry;
pub mod sweeper;

use std::time::Duration;

use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::Response,
};
use futures::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::api::AppState;
use crate::conversations::{ConversationSummary, StoredMessage};

pub use connection::{ConnectionHandle, ConnectionId, SendFailure};
pub use dispatch::{DispatchError, Dispatcher};
pub use registry::{ConnectionMeta, ConnectionRegistry, RegistryEntry};
pub use sweeper::{spawn_sweeper, sweep};

/// How long the writer may take to flush a close frame once reading stops.
const CLOSE_GRACE: Duration = Duration::from_secs(1);

/// Client-to-server events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientEvent {
    /// Bind this connection to a dashboard user
    Auth {
        #[serde(rename = "userId")]
        user_id: String,
    },
    /// Any other `type`; ignored
    #[serde(other)]
    Unknown,
}

/// Server-to-client events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum ServerEvent {
    /// A customer wrote to one of the user's pages
    NewMessage {
        conversation_key: String,
        message: StoredMessage,
        conversation: ConversationSummary,
    },
    /// A customer pressed a button or menu item
    Postback {
        sender_id: String,
        page_id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        payload: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        title: Option<String>,
        timestamp: i64,
    },
}

/// WebSocket upgrade handler.
pub async fn handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Handle WebSocket connection.
async fn handle_socket(socket: WebSocket, state: AppState) {
    let (mut ws_sender, mut ws_receiver) = socket.split();

    let (handle, mut outbound) =
        ConnectionHandle::channel(state.config.ws_outbound_buffer, &state.shutdown);
    let conn_id = handle.id();
    let closed = handle.close_token();
    state.registry.register(handle);

    info!(conn_id = %conn_id, "WebSocket client connected");

    // Forward queued frames to the socket, in order
    let writer_closed = closed.clone();
    let mut sender_handle = tokio::spawn(async move {
        loop {
            tokio::select! {
                biased;
                frame = outbound.recv() => {
                    let Some(text) = frame else { break };
                    if ws_sender.send(Message::Text(text)).await.is_err() {
                        break;
                    }
                }
                () = writer_closed.cancelled() => {
                    let _ = ws_sender.send(Message::Close(None)).await;
                    break;
                }
            }
        }
        writer_closed.cancel();
    });

    // Handle incoming messages
    loop {
        let msg = tokio::select! {
            () = closed.cancelled() => break,
            msg = ws_receiver.next() => msg,
        };

        match msg {
            Some(Ok(Message::Text(text))) => {
                state.registry.touch(conn_id);
                handle_client_message(&state.registry, conn_id, text.as_str());
            }
            Some(Ok(Message::Binary(_) | Message::Ping(_) | Message::Pong(_))) => {
                state.registry.touch(conn_id);
            }
            Some(Ok(Message::Close(_))) | None => {
                info!(conn_id = %conn_id, "WebSocket client disconnected");
                break;
            }
            Some(Err(e)) => {
                warn!(conn_id = %conn_id, error = %e, "WebSocket error");
                break;
            }
        }
    }

    // Cleanup
    state.registry.remove(conn_id);
    closed.cancel();
    if tokio::time::timeout(CLOSE_GRACE, &mut sender_handle)
        .await
        .is_err()
    {
        sender_handle.abort();
    }

    debug!(conn_id = %conn_id, "WebSocket connection cleaned up");
}

/// Handle a client text frame.
///
/// Malformed frames are logged and dropped; they never close the connection.
fn handle_client_message(registry: &ConnectionRegistry, conn_id: ConnectionId, text: &str) {
    let event: ClientEvent = match serde_json::from_str(text) {
        Ok(event) => event,
        Err(e) => {
            warn!(conn_id = %conn_id, error = %e, "Discarding malformed client message");
            return;
        }
    };

    match event {
        ClientEvent::Auth { user_id } if user_id.is_empty() => {
            warn!(conn_id = %conn_id, "Ignoring auth message without a user ID");
        }
        ClientEvent::Auth { user_id } => {
            if registry.authenticate(conn_id, user_id.as_str()) {
                info!(conn_id = %conn_id, user_id = %user_id, "Client authenticated");
            } else {
                debug!(conn_id = %conn_id, "Auth for a connection that is already gone");
            }
        }
        ClientEvent::Unknown => {
            debug!(conn_id = %conn_id, "Ignoring unrecognized client message");
        }
    }
}
