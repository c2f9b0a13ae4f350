//! Connection Registry
//!
//! Authoritative set of open connections and the dashboard user each one
//! belongs to. One user may hold several connections (tabs, devices).
//!
//! Every operation takes the same lock, so an entry is never observed with
//! half-updated metadata and a sweep eviction racing an `auth` resolves to
//! whichever operation reaches the lock first. The lock is never held
//! across an `.await`.

use std::collections::HashMap;

use parking_lot::Mutex;
use tokio::time::{Duration, Instant};

use super::connection::{ConnectionHandle, ConnectionId};

/// Metadata tracked per connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionMeta {
    /// Logical user, set by the client's `auth` message
    pub user_id: Option<String>,
    /// Last inbound activity
    pub last_seen: Instant,
}

impl ConnectionMeta {
    fn fresh() -> Self {
        Self {
            user_id: None,
            last_seen: Instant::now(),
        }
    }

    /// Whether more than `timeout` has passed since the last activity.
    pub fn is_stale(&self, timeout: Duration, now: Instant) -> bool {
        now.saturating_duration_since(self.last_seen) > timeout
    }
}

/// A `(connection, metadata)` pair copied out of the registry.
#[derive(Debug, Clone)]
pub struct RegistryEntry {
    pub handle: ConnectionHandle,
    pub meta: ConnectionMeta,
}

/// Thread-safe registry of open connections.
#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    entries: Mutex<HashMap<ConnectionId, RegistryEntry>>,
}

impl ConnectionRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an unauthenticated connection.
    ///
    /// Returns `false` (and leaves the existing entry untouched) if this
    /// connection is already registered.
    pub fn register(&self, handle: ConnectionHandle) -> bool {
        let mut entries = self.entries.lock();
        if entries.contains_key(&handle.id()) {
            return false;
        }
        entries.insert(
            handle.id(),
            RegistryEntry {
                handle,
                meta: ConnectionMeta::fresh(),
            },
        );
        true
    }

    /// Attach (or replace) the user for a connection and refresh its timestamp.
    ///
    /// Returns `false` if the connection is no longer registered.
    pub fn authenticate(&self, id: ConnectionId, user_id: impl Into<String>) -> bool {
        let mut entries = self.entries.lock();
        match entries.get_mut(&id) {
            Some(entry) => {
                entry.meta.user_id = Some(user_id.into());
                entry.meta.last_seen = Instant::now();
                true
            }
            None => false,
        }
    }

    /// Refresh the last-activity timestamp.
    pub fn touch(&self, id: ConnectionId) -> bool {
        let mut entries = self.entries.lock();
        match entries.get_mut(&id) {
            Some(entry) => {
                entry.meta.last_seen = Instant::now();
                true
            }
            None => false,
        }
    }

    /// Remove a connection. Safe to call any number of times.
    pub fn remove(&self, id: ConnectionId) -> Option<ConnectionHandle> {
        self.entries.lock().remove(&id).map(|entry| entry.handle)
    }

    /// Remove a connection only if it is still stale at `now`.
    ///
    /// Activity recorded after a snapshot was taken keeps the entry alive.
    pub fn remove_if_stale(
        &self,
        id: ConnectionId,
        timeout: Duration,
        now: Instant,
    ) -> Option<ConnectionHandle> {
        let mut entries = self.entries.lock();
        let stale = entries
            .get(&id)
            .is_some_and(|entry| entry.meta.is_stale(timeout, now));
        if stale {
            entries.remove(&id).map(|entry| entry.handle)
        } else {
            None
        }
    }

    /// Point-in-time copy of every entry.
    pub fn snapshot(&self) -> Vec<RegistryEntry> {
        self.entries.lock().values().cloned().collect()
    }

    /// Metadata for one connection.
    pub fn get(&self, id: ConnectionId) -> Option<ConnectionMeta> {
        self.entries.lock().get(&id).map(|entry| entry.meta.clone())
    }

    /// Remove every entry, returning the handles so callers can close them.
    pub fn drain(&self) -> Vec<ConnectionHandle> {
        self.entries
            .lock()
            .drain()
            .map(|(_, entry)| entry.handle)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}
