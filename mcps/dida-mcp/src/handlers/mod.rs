//! Handler implementations for Dida MCP tools
//!
//! Organized by domain: auth, project, task. Every handler returns an
//! envelope; failures never surface as protocol errors.

mod auth;
mod project;
mod task;

pub use auth::*;
pub use project::*;
pub use task::*;

use mcp_common::{envelope, error_envelope, CallToolResult, McpError};
use serde::Serialize;
use serde_json::Value;
use tracing::{error, warn};

use crate::error::{DidaError, DidaResult};

/// What every handler returns
pub type Reply = Result<CallToolResult, McpError>;

/// Envelope a handler outcome; `context` prefixes upstream failures
pub(crate) fn respond<T: Serialize>(outcome: DidaResult<T>, context: &str, message: &str) -> Reply {
    match outcome {
        Ok(data) => envelope(&data, true, Some(message)),
        Err(e) => failure(e, context),
    }
}

/// Convert a [`DidaError`] into a failure envelope
///
/// Anticipated failures carry a `message` (and the per-id error map for
/// partial failures); anything else is reported through `error`.
pub(crate) fn failure(e: DidaError, context: &str) -> Reply {
    if !e.is_expected() {
        error!(context, error = %e, "tool call failed unexpectedly");
        return error_envelope(format!("{}: {}", context, e), None);
    }

    warn!(context, error = %e, "tool call failed");
    let message = if e.wants_context() {
        format!("{}: {}", context, e)
    } else {
        e.to_string()
    };
    let data = match &e {
        DidaError::Partial { id2error } => serde_json::to_value(id2error).ok(),
        _ => None,
    };
    envelope(&data.unwrap_or(Value::Null), false, Some(&message))
}

/// Per-item outcome of a fanned-out batch
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct BatchItem {
    id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    project_id: Option<String>,
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    task: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl BatchItem {
    pub(crate) fn new(id: String, project_id: Option<String>, outcome: DidaResult<Option<Value>>) -> Self {
        match outcome {
            Ok(task) => Self {
                id,
                project_id,
                success: true,
                task,
                error: None,
            },
            Err(e) => Self {
                id,
                project_id,
                success: false,
                task: None,
                error: Some(e.to_string()),
            },
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct BatchSummary {
    total: usize,
    succeeded: usize,
    failed: usize,
    results: Vec<BatchItem>,
}

impl BatchSummary {
    pub(crate) fn new(results: Vec<BatchItem>) -> Self {
        let succeeded = results.iter().filter(|r| r.success).count();
        Self {
            total: results.len(),
            succeeded,
            failed: results.len() - succeeded,
            results,
        }
    }

    /// Envelope the summary; success only when every item succeeded
    pub(crate) fn reply(&self, verb: &str) -> Reply {
        let message = format!(
            "Batch {} completed: {} tasks {} successfully, {} failed.",
            verb,
            self.succeeded,
            past_tense(verb),
            self.failed
        );
        envelope(self, self.failed == 0, Some(&message))
    }
}

fn past_tense(verb: &str) -> String {
    match verb.strip_suffix('e') {
        Some(stem) => format!("{}ed", stem),
        None => format!("{}ed", verb),
    }
}
