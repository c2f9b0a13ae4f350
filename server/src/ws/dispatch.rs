//! Broadcast Dispatcher
//!
//! Serializes a payload once and fans it out to registered connections.

use std::sync::Arc;

use axum::extract::ws::Utf8Bytes;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

use super::registry::{ConnectionMeta, ConnectionRegistry};

/// Dispatch errors.
///
/// Per-connection write failures are handled inside the dispatcher and never
/// surface here.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("failed to serialize payload: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Delivers payloads to connections in the registry.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    registry: Arc<ConnectionRegistry>,
}

impl Dispatcher {
    pub const fn new(registry: Arc<ConnectionRegistry>) -> Self {
        Self { registry }
    }

    pub const fn registry(&self) -> &Arc<ConnectionRegistry> {
        &self.registry
    }

    /// Send a payload to every open connection authenticated as `user_id`.
    ///
    /// Returns `Ok(true)` if at least one connection accepted the frame.
    pub fn send_to_user<T>(&self, user_id: &str, payload: &T) -> Result<bool, DispatchError>
    where
        T: Serialize + ?Sized,
    {
        let frame = encode(payload)?;
        let delivered = self.deliver(
            |meta| meta.user_id.as_deref() == Some(user_id),
            &frame,
            user_id,
        );
        Ok(delivered > 0)
    }

    /// Send a payload to every open connection.
    pub fn send_to_all<T>(&self, payload: &T) -> Result<(), DispatchError>
    where
        T: Serialize + ?Sized,
    {
        let frame = encode(payload)?;
        self.deliver(|_| true, &frame, "all");
        Ok(())
    }

    /// Queue `frame` on matching connections, evicting any that fail.
    fn deliver(
        &self,
        filter: impl Fn(&ConnectionMeta) -> bool,
        frame: &Utf8Bytes,
        label: &str,
    ) -> usize {
        let mut recipients = 0usize;
        let mut delivered = 0usize;

        for entry in self.registry.snapshot() {
            if !filter(&entry.meta) {
                continue;
            }
            let conn_id = entry.handle.id();
            if !entry.handle.is_open() {
                // Closed but not yet cleaned up by its socket task
                self.registry.remove(conn_id);
                continue;
            }

            recipients += 1;
            match entry.handle.send(frame.clone()) {
                Ok(()) => delivered += 1,
                Err(failure) => {
                    warn!(conn_id = %conn_id, label, error = %failure, "Write failed, dropping connection");
                    self.registry.remove(conn_id);
                    entry.handle.close();
                }
            }
        }

        debug!(label, recipients, delivered, "Dispatched event");
        delivered
    }
}

fn encode<T>(payload: &T) -> Result<Utf8Bytes, DispatchError>
where
    T: Serialize + ?Sized,
{
    Ok(serde_json::to_string(payload)?.into())
}
