//! MCP protocol error helpers
//!
//! Tool calls report failures through [`crate::envelope`]; these helpers are
//! for the remaining protocol surfaces (resources, prompts) where the client
//! expects a JSON-RPC error.

use rmcp::ErrorData as McpError;

/// Type alias for MCP handler results
pub type McpResult<T> = Result<T, McpError>;

/// Create an internal error with a message
pub fn internal_error(message: impl Into<String>) -> McpError {
    McpError::internal_error(message.into(), None)
}

/// Create an invalid params error with a message
pub fn invalid_params(message: impl Into<String>) -> McpError {
    McpError::invalid_params(message.into(), None)
}

/// Error for a resource URI the server does not publish
pub fn resource_not_found(uri: &str) -> McpError {
    McpError::resource_not_found(format!("Unknown resource: {}", uri), None)
}
