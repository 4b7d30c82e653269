//! Error types for upstream Dida operations

use std::collections::BTreeMap;
use std::fmt;

use thiserror::Error;

/// Which generation of the upstream API an operation talks to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiVersion {
    /// Documented OAuth API under `/open/v1`
    V1,
    /// Undocumented web-session API under `/api/v2`
    V2,
}

impl fmt::Display for ApiVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiVersion::V1 => f.write_str("v1"),
            ApiVersion::V2 => f.write_str("v2"),
        }
    }
}

/// Errors that can occur while serving a tool call
#[derive(Error, Debug)]
pub enum DidaError {
    /// The credential an operation needs is not configured
    #[error("Not authenticated with {0} API. Run authenticate or add a {0} token to the config file.")]
    AuthAbsent(ApiVersion),

    /// No project was given and no inbox id is cached
    #[error("Inbox ID not found. Please run authenticate first or specify a project ID.")]
    MissingInbox,

    /// Tool arguments failed validation
    #[error("Invalid parameters: {0}")]
    InvalidParams(String),

    /// Upstream answered with a non-2xx status
    #[error("HTTP {status}: {status_text}")]
    Http { status: u16, status_text: String },

    /// Upstream answered 2xx but reported per-item failures
    #[error("{}", describe_id2error(.id2error))]
    Partial { id2error: BTreeMap<String, String> },

    /// Task lookup through batch-check found nothing
    #[error("Task with ID {0} not found in any project")]
    TaskNotFound(String),

    /// Neither credential is configured
    #[error("No access tokens available. Add access_token or v2_access_token to the config file.")]
    NoCredentials,

    /// Every configured credential was rejected
    #[error("Authentication failed with all available methods:\n{}", join_reasons(.v1, .v2))]
    AllAuthFailed {
        v1: Option<String>,
        v2: Option<String>,
    },

    /// Request could not be sent or the response could not be read
    #[error("request failed: {0}")]
    Transport(String),

    /// Response body was not the JSON we expected
    #[error("failed to parse upstream response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl DidaError {
    /// Whether this is an anticipated failure (reported as a message) rather
    /// than an unexpected exception (reported as an error)
    pub fn is_expected(&self) -> bool {
        !matches!(self, DidaError::Transport(_) | DidaError::Decode(_))
    }

    /// Whether the failure text should be prefixed with the operation context
    pub(crate) fn wants_context(&self) -> bool {
        matches!(
            self,
            DidaError::Http { .. }
                | DidaError::Partial { .. }
                | DidaError::Transport(_)
                | DidaError::Decode(_)
        )
    }
}

impl From<reqwest::Error> for DidaError {
    fn from(e: reqwest::Error) -> Self {
        DidaError::Transport(e.to_string())
    }
}

fn describe_id2error(id2error: &BTreeMap<String, String>) -> String {
    id2error
        .iter()
        .map(|(id, err)| format!("{}: {}", id, err))
        .collect::<Vec<_>>()
        .join(", ")
}

fn join_reasons(v1: &Option<String>, v2: &Option<String>) -> String {
    let mut lines = Vec::new();
    if let Some(reason) = v2 {
        lines.push(format!("V2 API authentication failed: {}", reason));
    }
    if let Some(reason) = v1 {
        lines.push(format!("V1 API authentication failed: {}", reason));
    }
    lines.join("\n")
}

/// Result type alias for Dida operations
pub type DidaResult<T> = Result<T, DidaError>;
