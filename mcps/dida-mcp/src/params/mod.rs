//! Parameter types for Dida MCP tools
//!
//! Schemas are derived with `schemars`; the constraints the schema cannot
//! express are checked by [`Validate`] so that a bad argument becomes a
//! failure envelope rather than a protocol error.

mod project;
mod task;

pub use project::*;
pub use task::*;

use std::sync::LazyLock;

use chrono::DateTime;
use regex::Regex;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::{DidaError, DidaResult};

/// Empty parameters for tools that take no arguments
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct EmptyParams {}

/// Argument checks run before any upstream call
pub trait Validate {
    fn validate(&self) -> DidaResult<()>;
}

impl<T: Validate> Validate for Vec<T> {
    fn validate(&self) -> DidaResult<()> {
        self.iter().try_for_each(Validate::validate)
    }
}

static HEX_COLOR: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^#[0-9A-Fa-f]{6}$").unwrap());

fn invalid(msg: String) -> DidaError {
    DidaError::InvalidParams(msg)
}

/// Length in characters must lie in `min..=max`
pub(crate) fn check_length(field: &str, value: &str, min: usize, max: usize) -> DidaResult<()> {
    let len = value.chars().count();
    if len < min {
        return Err(invalid(format!("{} must be at least {} characters", field, min)));
    }
    if len > max {
        return Err(invalid(format!("{} must be at most {} characters", field, max)));
    }
    Ok(())
}

pub(crate) fn check_not_empty(field: &str, value: &str) -> DidaResult<()> {
    if value.trim().is_empty() {
        return Err(invalid(format!("{} must not be empty", field)));
    }
    Ok(())
}

/// `#RRGGBB`
pub(crate) fn check_color(field: &str, value: &str) -> DidaResult<()> {
    if !HEX_COLOR.is_match(value) {
        return Err(invalid(format!(
            "{} must be a hex color like #F18181, got {:?}",
            field, value
        )));
    }
    Ok(())
}

pub(crate) fn check_priority(priority: i64) -> DidaResult<()> {
    if !(0..=5).contains(&priority) {
        return Err(invalid(format!(
            "priority must be between 0 and 5, got {}",
            priority
        )));
    }
    Ok(())
}

/// ISO-8601 date-time, either RFC 3339 (`2024-01-31T09:00:00Z`) or the
/// upstream's own `2024-01-31T09:00:00.000+0000`
pub(crate) fn check_datetime(field: &str, value: &str) -> DidaResult<()> {
    let parsed = DateTime::parse_from_rfc3339(value)
        .or_else(|_| DateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f%z"));
    if parsed.is_err() {
        return Err(invalid(format!(
            "{} must be an ISO-8601 date-time, got {:?}",
            field, value
        )));
    }
    Ok(())
}

pub(crate) fn check_batch_size(field: &str, len: usize) -> DidaResult<()> {
    if len == 0 {
        return Err(invalid(format!("{} must contain at least one item", field)));
    }
    Ok(())
}
