//! Page Directory
//!
//! One connected page per dashboard user. Reconnecting replaces the
//! previous page but keeps the user's place in connection order.

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;
use dashmap::DashMap;

use super::types::PageConnection;

#[derive(Debug)]
struct Slot {
    /// Position of the user's first connect
    order: u64,
    page: PageConnection,
}

#[derive(Debug, Default)]
pub struct PageDirectory {
    by_user: DashMap<String, Slot>,
    next_order: AtomicU64,
}

impl PageDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Connect (or replace) the page for `user_id`.
    pub fn connect(
        &self,
        user_id: impl Into<String>,
        page_id: impl Into<String>,
        page_name: Option<String>,
        page_access_token: impl Into<String>,
    ) -> PageConnection {
        let page = PageConnection {
            page_id: page_id.into(),
            page_name,
            page_access_token: page_access_token.into(),
            connected_at: Utc::now(),
        };
        self.by_user
            .entry(user_id.into())
            .and_modify(|slot| slot.page = page.clone())
            .or_insert_with(|| Slot {
                order: self.next_order.fetch_add(1, Ordering::Relaxed),
                page: page.clone(),
            });
        page
    }

    pub fn get(&self, user_id: &str) -> Option<PageConnection> {
        self.by_user.get(user_id).map(|entry| entry.page.clone())
    }

    /// The user who connected `page_id`.
    ///
    /// If several users connected the same page, the user who first
    /// connected any page owns it.
    pub fn find_owner(&self, page_id: &str) -> Option<String> {
        self.by_user
            .iter()
            .filter(|entry| entry.page.page_id == page_id)
            .min_by_key(|entry| entry.order)
            .map(|entry| entry.key().clone())
    }

    pub fn len(&self) -> usize {
        self.by_user.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_user.is_empty()
    }
}
