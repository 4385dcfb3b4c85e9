//! Client configuration.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::transport::RequestKind;

/// Where the API lives and how long each kind of request may take.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL of the server, without a trailing slash.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default)]
    pub timeouts: Timeouts,
    /// Where [`FileCredentialStore`](crate::FileCredentialStore) keeps the token.
    #[serde(default = "default_credentials_path")]
    pub credentials_path: PathBuf,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeouts: Timeouts::default(),
            credentials_path: default_credentials_path(),
        }
    }
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            ..Self::default()
        }
    }
}

/// Per-kind request deadlines in milliseconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Timeouts {
    #[serde(default = "default_login")]
    pub login_ms: u64,
    #[serde(default = "default_refresh")]
    pub refresh_ms: u64,
    #[serde(default = "default_verify")]
    pub verify_ms: u64,
    #[serde(default = "default_logout")]
    pub logout_ms: u64,
    #[serde(default = "default_api")]
    pub api_ms: u64,
    #[serde(default = "default_upload")]
    pub upload_ms: u64,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            login_ms: default_login(),
            refresh_ms: default_refresh(),
            verify_ms: default_verify(),
            logout_ms: default_logout(),
            api_ms: default_api(),
            upload_ms: default_upload(),
        }
    }
}

impl Timeouts {
    pub fn for_kind(&self, kind: RequestKind) -> Duration {
        let ms = match kind {
            RequestKind::Login => self.login_ms,
            RequestKind::Refresh => self.refresh_ms,
            RequestKind::Verify => self.verify_ms,
            RequestKind::Logout => self.logout_ms,
            RequestKind::Api => self.api_ms,
            RequestKind::Upload => self.upload_ms,
        };
        Duration::from_millis(ms)
    }
}

fn default_base_url() -> String {
    "http://localhost:5000".to_string()
}

fn default_credentials_path() -> PathBuf {
    PathBuf::from(".folio/credentials.json")
}

fn default_login() -> u64 {
    15_000
}

fn default_refresh() -> u64 {
    10_000
}

fn default_verify() -> u64 {
    10_000
}

fn default_logout() -> u64 {
    5_000
}

fn default_api() -> u64 {
    30_000
}

fn default_upload() -> u64 {
    60_000
}
