//! Server Configuration
//!
//! Loads configuration from environment variables.

use anyhow::{Context, Result};
use std::env;
use std::time::Duration;

/// Server configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server bind address (e.g., "0.0.0.0:3001")
    pub bind_address: String,

    /// Token the platform echoes back during the webhook subscribe handshake
    pub verify_token: String,

    /// App secret used as the HMAC-SHA256 key for `X-Hub-Signature-256`
    pub app_secret: String,

    /// Platform application ID (informational)
    pub app_id: Option<String>,

    /// Graph API base URL (overridable for tests)
    pub graph_api_base_url: String,

    /// Graph API version segment (default: v18.0)
    pub graph_api_version: String,

    /// Allowed CORS origins (comma-separated)
    pub allowed_origins: Vec<String>,

    /// Directory holding the dashboard's static assets
    pub static_dir: String,

    /// Seconds between liveness sweeps (default: 60)
    pub sweep_interval_secs: u64,

    /// Seconds of inactivity before a connection is evicted (default: 300 = 5 min)
    pub connection_timeout_secs: u64,

    /// Outbound frames queued per connection before it counts as stalled
    pub ws_outbound_buffer: usize,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            bind_address: env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:3001".into()),
            verify_token: env::var("VERIFY_TOKEN").context("VERIFY_TOKEN must be set")?,
            app_secret: env::var("APP_SECRET").context("APP_SECRET must be set")?,
            app_id: env::var("APP_ID").ok(),
            graph_api_base_url: env::var("GRAPH_API_BASE_URL")
                .unwrap_or_else(|_| "https://graph.facebook.com".into()),
            graph_api_version: env::var("GRAPH_API_VERSION").unwrap_or_else(|_| "v18.0".into()),
            allowed_origins: parse_list(
                &env::var("ALLOWED_ORIGINS").unwrap_or_else(|_| "http://localhost:3001".into()),
            ),
            static_dir: env::var("STATIC_DIR").unwrap_or_else(|_| "public".into()),
            sweep_interval_secs: env::var("SWEEP_INTERVAL_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(60),
            connection_timeout_secs: env::var("CONNECTION_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(300),
            ws_outbound_buffer: env::var("WS_OUTBOUND_BUFFER")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|&n: &usize| n > 0)
                .unwrap_or(100),
        })
    }

    /// Interval between liveness sweeps.
    #[must_use]
    pub const fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }

    /// Inactivity window after which a connection is evicted.
    #[must_use]
    pub const fn connection_timeout(&self) -> Duration {
        Duration::from_secs(self.connection_timeout_secs)
    }

    /// Full URL of the Graph API send-message endpoint.
    #[must_use]
    pub fn send_message_url(&self) -> String {
        format!(
            "{}/{}/me/messages",
            self.graph_api_base_url.trim_end_matches('/'),
            self.graph_api_version
        )
    }

    /// Create a default configuration for testing.
    #[must_use]
    pub fn default_for_test() -> Self {
        Self {
            bind_address: "127.0.0.1:0".into(),
            verify_token: "test-verify-token".into(),
            app_secret: "test-app-secret".into(),
            app_id: None,
            graph_api_base_url: "http://127.0.0.1:9".into(),
            graph_api_version: "v18.0".into(),
            allowed_origins: vec!["http://localhost:3001".into()],
            static_dir: "public".into(),
            sweep_interval_secs: 60,
            connection_timeout_secs: 300,
            ws_outbound_buffer: 16,
        }
    }
}

fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect()
}
