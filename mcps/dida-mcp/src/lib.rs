//! Dida MCP Library
//!
//! Exposes the Dida365 / TickTick task service over MCP. Two upstream API
//! generations are bridged:
//!
//! - **v1** (`/open/v1`): documented OAuth bearer API for projects and tasks
//! - **v2** (`/api/v2`): web-session API, the only source of tags, the inbox
//!   id and cross-project moves
//!
//! # Usage as Library
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use dida_mcp::{DeviceFingerprint, DidaClient, DidaMcpServer, ReqwestTransport, Session};
//!
//! let client = DidaClient::new(
//!     Arc::new(ReqwestTransport::new()?),
//!     settings.endpoints(),
//!     Arc::new(Session::new(credentials)),
//!     DeviceFingerprint::process(),
//! );
//! let server = DidaMcpServer::new(client);
//! ```

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod handlers;
pub mod headers;
pub mod params;
pub mod prompts;
pub mod resources;
pub mod server;
pub mod session;
pub mod transport;
pub mod types;

#[cfg(test)]
mod testing;
#[cfg(test)]
mod tests;

pub use client::DidaClient;
pub use config::{ConfigStore, Settings};
pub use error::{DidaError, DidaResult};
pub use headers::DeviceFingerprint;
pub use server::DidaMcpServer;
pub use session::Session;
pub use transport::{HttpTransport, ReqwestTransport};

// Re-export parameter types for direct API usage
pub use params::*;
