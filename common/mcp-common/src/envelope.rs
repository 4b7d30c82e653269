//! Uniform JSON response envelope for tool results
//!
//! MCP text content is opaque, so tools that need machine-readable success or
//! failure encode it themselves. Every tool result produced through this module
//! is a single text block holding
//! `{"success": bool, "data": T | null, "message"?: string, "error"?: string}`.

use rmcp::{
    model::{CallToolResult, Content},
    ErrorData as McpError,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The envelope shape carried in every tool result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope<T = Value> {
    pub success: bool,
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T: Serialize> Envelope<T> {
    /// Serialize into the single text block the transport carries
    pub fn into_result(self) -> Result<CallToolResult, McpError> {
        let json = serde_json::to_string(&self)
            .map_err(|e| McpError::internal_error(e.to_string(), None))?;
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }
}

/// Wrap an outcome with an explicit success flag and optional message
///
/// ```rust,ignore
/// use mcp_common::envelope;
///
/// envelope(&task, true, Some("Task created successfully"))
/// ```
pub fn envelope<T: Serialize>(
    data: &T,
    success: bool,
    message: Option<&str>,
) -> Result<CallToolResult, McpError> {
    Envelope {
        success,
        data: Some(data),
        message: message.map(str::to_string),
        error: None,
    }
    .into_result()
}

/// Wrap an unexpected error, optionally keeping whatever data was collected
pub fn error_envelope(
    error: impl std::fmt::Display,
    data: Option<Value>,
) -> Result<CallToolResult, McpError> {
    Envelope {
        success: false,
        data,
        message: None,
        error: Some(error.to_string()),
    }
    .into_result()
}

/// Recover the envelope from a tool result produced by this module
///
/// Returns `None` when the first content block is not text or not an envelope.
pub fn parse_envelope(result: &CallToolResult) -> Option<Envelope> {
    let text = result.content.first()?.as_text()?;
    serde_json::from_str(&text.text).ok()
}
