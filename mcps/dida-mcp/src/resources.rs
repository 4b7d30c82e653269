//! MCP resources
//!
//! A single resource exposes the reference data cache so clients can map
//! project and tag names to ids without calling a tool.

use mcp_common::{resource_not_found, McpResult};
use rmcp::model::{
    AnnotateAble, ListResourcesResult, RawResource, ReadResourceResult, Resource,
    ResourceContents,
};

use crate::session::Session;

pub const CACHED_DATA_URI: &str = "dida://cached/projects-and-tags";
pub const CACHED_DATA_NAME: &str = "cached-projects-and-tags";

fn cached_data_resource() -> Resource {
    let mut raw = RawResource::new(CACHED_DATA_URI, CACHED_DATA_NAME);
    raw.description =
        Some("Cached projects (including the Inbox) and tags with their ids".to_string());
    raw.mime_type = Some("application/json".to_string());
    raw.no_annotation()
}

pub fn list_all_resources() -> ListResourcesResult {
    ListResourcesResult::with_all_items(vec![cached_data_resource()])
}

/// Read a resource by URI
pub fn read_resource(session: &Session, uri: &str) -> McpResult<ReadResourceResult> {
    if uri != CACHED_DATA_URI {
        return Err(resource_not_found(uri));
    }

    let json = serde_json::to_string_pretty(&session.snapshot())
        .map_err(|e| mcp_common::internal_error(e.to_string()))?;
    Ok(ReadResourceResult {
        contents: vec![ResourceContents::text(json, uri)],
    })
}
