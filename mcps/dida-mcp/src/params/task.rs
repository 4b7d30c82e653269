//! Task-related parameter types

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::{
    check_batch_size, check_datetime, check_length, check_not_empty, check_priority, Validate,
};
use crate::error::DidaResult;
use crate::types::TaskMove;

/// Split a comma-separated tag string into upstream tag names
///
/// Each tag is trimmed and loses one leading `#`; empty pieces are dropped.
/// Case is preserved.
pub fn normalize_tags(tags: &str) -> Vec<String> {
    tags.split(',')
        .map(|tag| {
            let tag = tag.trim();
            tag.strip_prefix('#').unwrap_or(tag).to_string()
        })
        .filter(|tag| !tag.is_empty())
        .collect()
}

/// Parameters for listing tasks in a project
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ListTasksParams {
    #[schemars(description = "Project to list tasks from. Defaults to the Inbox")]
    pub project_id: Option<String>,
}

/// Parameters for fetching one task
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct GetTaskParams {
    #[schemars(description = "ID of the task")]
    pub id: String,

    #[schemars(description = "Project containing the task. Defaults to the Inbox")]
    pub project_id: Option<String>,
}

impl Validate for GetTaskParams {
    fn validate(&self) -> DidaResult<()> {
        check_not_empty("id", &self.id)
    }
}

/// Parameters for creating a task
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskParams {
    #[schemars(description = "Task title (1-200 characters)")]
    pub title: String,

    #[schemars(description = "Notes or description (up to 2000 characters)")]
    pub content: Option<String>,

    #[schemars(description = "Priority: 0 none, 1 low, 3 medium, 5 high. Defaults to 0")]
    pub priority: Option<i64>,

    #[schemars(description = "Due date in ISO-8601 format, e.g. '2024-01-31T09:00:00Z'")]
    pub due_date: Option<String>,

    #[schemars(description = "Project to create the task in. Defaults to the Inbox")]
    pub project_id: Option<String>,

    #[schemars(description = "Comma-separated tags, e.g. 'work,important'. A leading '#' is stripped")]
    pub tags: Option<String>,
}

impl Validate for CreateTaskParams {
    fn validate(&self) -> DidaResult<()> {
        check_length("title", &self.title, 1, 200)?;
        if let Some(content) = &self.content {
            check_length("content", content, 0, 2000)?;
        }
        if let Some(priority) = self.priority {
            check_priority(priority)?;
        }
        if let Some(due) = &self.due_date {
            check_datetime("dueDate", due)?;
        }
        Ok(())
    }
}

/// Parameters for updating a task
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTaskParams {
    #[schemars(description = "ID of the task to update")]
    pub id: String,

    #[schemars(description = "Project containing the task")]
    pub project_id: String,

    #[schemars(description = "New title (1-200 characters)")]
    pub title: Option<String>,

    #[schemars(description = "New notes or description (up to 2000 characters)")]
    pub content: Option<String>,

    #[schemars(description = "New priority: 0 none, 1 low, 3 medium, 5 high")]
    pub priority: Option<i64>,

    #[schemars(description = "New due date in ISO-8601 format. An empty string removes the due date")]
    pub due_date: Option<String>,

    #[schemars(description = "New start date in ISO-8601 format. An empty string removes the start date")]
    pub start_date: Option<String>,

    #[schemars(description = "Whether the task is an all-day task")]
    pub is_all_day: Option<bool>,

    #[schemars(description = "Comma-separated tags replacing the current ones. An empty string removes all tags")]
    pub tags: Option<String>,
}

impl Validate for UpdateTaskParams {
    fn validate(&self) -> DidaResult<()> {
        check_not_empty("id", &self.id)?;
        check_not_empty("projectId", &self.project_id)?;
        if let Some(title) = &self.title {
            check_length("title", title, 1, 200)?;
        }
        if let Some(content) = &self.content {
            check_length("content", content, 0, 2000)?;
        }
        if let Some(priority) = self.priority {
            check_priority(priority)?;
        }
        for (field, date) in [("dueDate", &self.due_date), ("startDate", &self.start_date)] {
            match date.as_deref() {
                None | Some("") => {}
                Some(date) => check_datetime(field, date)?,
            }
        }
        Ok(())
    }
}

/// Parameters for completing a task
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct CompleteTaskParams {
    #[schemars(description = "ID of the task to mark complete. Its project is looked up automatically")]
    pub id: String,
}

impl Validate for CompleteTaskParams {
    fn validate(&self) -> DidaResult<()> {
        check_not_empty("id", &self.id)
    }
}

/// Parameters for deleting a task
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeleteTaskParams {
    #[schemars(description = "ID of the task to delete")]
    pub id: String,

    #[schemars(description = "Project containing the task. Defaults to the Inbox")]
    pub project_id: Option<String>,
}

impl Validate for DeleteTaskParams {
    fn validate(&self) -> DidaResult<()> {
        check_not_empty("id", &self.id)
    }
}

impl Validate for TaskMove {
    fn validate(&self) -> DidaResult<()> {
        check_not_empty("taskId", &self.task_id)?;
        check_not_empty("fromProjectId", &self.from_project_id)?;
        check_not_empty("toProjectId", &self.to_project_id)
    }
}

/// Parameters for moving several tasks
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct BatchMoveTasksParams {
    #[schemars(description = "Moves to perform in one call (at least one)")]
    pub moves: Vec<TaskMove>,
}

impl Validate for BatchMoveTasksParams {
    fn validate(&self) -> DidaResult<()> {
        check_batch_size("moves", self.moves.len())?;
        self.moves.validate()
    }
}

/// Parameters for updating several tasks
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct BatchUpdateTasksParams {
    #[schemars(description = "Tasks to update; each needs its id and projectId (at least one)")]
    pub tasks: Vec<UpdateTaskParams>,
}

impl Validate for BatchUpdateTasksParams {
    fn validate(&self) -> DidaResult<()> {
        check_batch_size("tasks", self.tasks.len())
    }
}

/// One task to delete in a batch
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct TaskRef {
    #[schemars(description = "ID of the task")]
    pub id: String,

    #[schemars(description = "Project containing the task")]
    pub project_id: String,
}

impl Validate for TaskRef {
    fn validate(&self) -> DidaResult<()> {
        check_not_empty("id", &self.id)?;
        check_not_empty("projectId", &self.project_id)
    }
}

/// Parameters for deleting several tasks
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct BatchDeleteTasksParams {
    #[schemars(description = "Tasks to delete (at least one). This cannot be undone")]
    pub tasks: Vec<TaskRef>,
}

impl Validate for BatchDeleteTasksParams {
    fn validate(&self) -> DidaResult<()> {
        check_batch_size("tasks", self.tasks.len())?;
        self.tasks.validate()
    }
}
