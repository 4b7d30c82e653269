//! MCP Common - Shared utilities for MCP servers
//!
//! - **Initialization**: [`init_tracing`] for stderr logging
//! - **Envelopes**: [`envelope`] / [`error_envelope`] wrap every tool outcome
//!   in one JSON shape
//! - **Errors**: helpers for the protocol errors resources and prompts return
//!
//! # Example
//!
//! ```rust,ignore
//! use mcp_common::envelope;
//!
//! async fn my_tool(&self) -> Result<CallToolResult, McpError> {
//!     let data = fetch().await;
//!     envelope(&data, true, Some("Fetched"))
//! }
//! ```

pub mod envelope;
pub mod error;
pub mod init;

// Re-export commonly used items at crate root
pub use envelope::{envelope, error_envelope, parse_envelope, Envelope};
pub use error::{internal_error, invalid_params, resource_not_found, McpResult};
pub use init::init_tracing;

// Re-export rmcp types that are commonly needed
pub use rmcp::{
    model::{CallToolResult, Content},
    ErrorData as McpError,
};
