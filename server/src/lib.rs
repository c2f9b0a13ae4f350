//! Page Relay Server
//!
//! Receives Messenger page webhooks, keeps per-conversation history, and
//! pushes new activity to dashboard clients over WebSocket. Replies go back
//! out through the platform's Send API.

pub mod api;
pub mod auth;
pub mod config;
pub mod conversations;
pub mod messenger;
pub mod pages;
pub mod webhooks;
pub mod ws;
