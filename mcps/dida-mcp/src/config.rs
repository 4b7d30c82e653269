//! Configuration for dida-mcp
//!
//! Runtime settings come from command-line flags, each of which can also be
//! set through the environment:
//! 1. `--config` / `DIDA_CONFIG_PATH` (default `~/.dida-mcp-config.json`)
//! 2. `--api-base-url` / `DIDA_API_BASE_URL`
//! 3. `--api-v2-base-url` / `DIDA_API_V2_BASE_URL`
//! 4. `--time-zone` / `DIDA_TIME_ZONE`
//!
//! Credentials live in the JSON config file written by the token helper
//! scripts. The server only reads it at startup and writes back the
//! discovered inbox id.

use std::path::{Path, PathBuf};

use anyhow::Result;
use chrono::Utc;
use clap::Parser;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::session::Credentials;

pub const DEFAULT_API_BASE_URL: &str = "https://api.dida365.com/open/v1";
pub const DEFAULT_API_V2_BASE_URL: &str = "https://api.dida365.com/api/v2";
pub const DEFAULT_TIME_ZONE: &str = "Asia/Shanghai";
const CONFIG_FILE_NAME: &str = ".dida-mcp-config.json";

/// Command-line settings
#[derive(Debug, Clone, Parser)]
#[command(name = "dida-mcp", version, about = "MCP server for Dida365 / TickTick")]
pub struct Settings {
    /// Path of the JSON credentials file
    #[arg(long = "config", env = "DIDA_CONFIG_PATH")]
    pub config_path: Option<PathBuf>,

    /// Base URL of the open (v1) API
    #[arg(long, env = "DIDA_API_BASE_URL", default_value = DEFAULT_API_BASE_URL)]
    pub api_base_url: String,

    /// Base URL of the web (v2) API
    #[arg(long, env = "DIDA_API_V2_BASE_URL", default_value = DEFAULT_API_V2_BASE_URL)]
    pub api_v2_base_url: String,

    /// Time zone sent with created tasks
    #[arg(long, env = "DIDA_TIME_ZONE", default_value = DEFAULT_TIME_ZONE)]
    pub time_zone: String,

    /// Do not authenticate against upstream before serving
    #[arg(long)]
    pub skip_auth: bool,
}

impl Settings {
    /// Resolve the config file path, falling back to the home directory
    pub fn resolved_config_path(&self) -> PathBuf {
        self.config_path.clone().unwrap_or_else(default_config_path)
    }

    pub fn endpoints(&self) -> Endpoints {
        Endpoints::new(&self.api_base_url, &self.api_v2_base_url)
    }
}

fn default_config_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(CONFIG_FILE_NAME)
}

/// Base URLs of both upstream API generations
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub v1: String,
    pub v2: String,
}

impl Endpoints {
    pub fn new(v1: &str, v2: &str) -> Self {
        Self {
            v1: v1.trim_end_matches('/').to_string(),
            v2: v2.trim_end_matches('/').to_string(),
        }
    }

    pub fn v1_url(&self, path: &str) -> String {
        format!("{}{}", self.v1, path)
    }

    pub fn v2_url(&self, path: &str) -> String {
        format!("{}{}", self.v2, path)
    }
}

impl Default for Endpoints {
    fn default() -> Self {
        Self::new(DEFAULT_API_BASE_URL, DEFAULT_API_V2_BASE_URL)
    }
}

/// On-disk credentials snapshot
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    /// Expiry of `access_token` in epoch milliseconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub v2_access_token: Option<String>,
    #[serde(rename = "inboxId", default, skip_serializing_if = "Option::is_none")]
    pub inbox_id: Option<String>,
    /// Anything else the token helpers wrote; kept on write-back
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ConfigFile {
    /// Turn the snapshot into session credentials as of `now_ms`
    ///
    /// The v1 token is only used when `expires_at` lies in the future.
    pub fn credentials_at(&self, now_ms: i64) -> Credentials {
        let v1_token = match (&self.access_token, self.expires_at) {
            (Some(token), Some(expires_at)) if expires_at > now_ms => Some(token.clone()),
            (Some(_), _) => {
                tracing::warn!("v1 OAuth access token has expired; obtain a new token");
                None
            }
            _ => None,
        };

        Credentials {
            v1_is_oauth: v1_token.is_some(),
            v1_token,
            v2_token: self.v2_access_token.clone(),
            inbox_id: self.inbox_id.clone(),
        }
    }
}

/// Reads and writes the credentials file
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the config file; a missing file is an empty config
    pub fn read(&self) -> Result<ConfigFile> {
        if !self.path.exists() {
            return Ok(ConfigFile::default());
        }
        let content = std::fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Load credentials for startup; unreadable files yield empty credentials
    pub fn load_credentials(&self) -> Credentials {
        match self.read() {
            Ok(config) => {
                tracing::info!("Loading credentials from: {}", self.path.display());
                config.credentials_at(Utc::now().timestamp_millis())
            }
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "failed to read config file");
                Credentials::default()
            }
        }
    }

    /// Record the inbox id, preserving every other field
    pub fn save_inbox_id(&self, inbox_id: &str) -> Result<()> {
        let mut config = self.read()?;
        config.inbox_id = Some(inbox_id.to_string());
        let json = serde_json::to_string_pretty(&config)?;
        std::fs::write(&self.path, json)?;
        tracing::info!(inbox_id, "saved inbox id to config");
        Ok(())
    }
}
