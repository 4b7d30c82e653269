//! Project-related parameter types

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::{check_color, check_length, check_not_empty, Validate};
use crate::error::DidaResult;

/// Parameters for creating a project
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct CreateProjectParams {
    #[schemars(description = "Name of the new project (1-100 characters)")]
    pub name: String,

    #[schemars(description = "Project color as a hex code like '#F18181'. Defaults to '#F18181'")]
    pub color: Option<String>,
}

impl Validate for CreateProjectParams {
    fn validate(&self) -> DidaResult<()> {
        check_length("name", &self.name, 1, 100)?;
        if let Some(color) = &self.color {
            check_color("color", color)?;
        }
        Ok(())
    }
}

/// Parameters for updating a project
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct UpdateProjectParams {
    #[schemars(description = "ID of the project to update")]
    pub id: String,

    #[schemars(description = "New project name (1-100 characters). Omit to keep the current name")]
    pub name: Option<String>,

    #[schemars(description = "New project color as a hex code like '#4772FA'. Omit to keep the current color")]
    pub color: Option<String>,
}

impl Validate for UpdateProjectParams {
    fn validate(&self) -> DidaResult<()> {
        check_not_empty("id", &self.id)?;
        if let Some(name) = &self.name {
            check_length("name", name, 1, 100)?;
        }
        if let Some(color) = &self.color {
            check_color("color", color)?;
        }
        Ok(())
    }
}

/// Parameters for deleting a project
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct DeleteProjectParams {
    #[schemars(description = "ID of the project to delete. All of its tasks are deleted too")]
    pub id: String,
}

impl Validate for DeleteProjectParams {
    fn validate(&self) -> DidaResult<()> {
        check_not_empty("id", &self.id)
    }
}
