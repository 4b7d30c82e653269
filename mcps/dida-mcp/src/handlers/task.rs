//! Task handler implementations
//!
//! Reads and single-task writes go through the v1 API. Moves only exist in
//! v2, and completion needs a v2 batch-check to find the owning project.

use futures_util::future::join_all;
use serde_json::{json, Map, Value};

use mcp_common::envelope;

use crate::client::DidaClient;
use crate::error::{DidaError, DidaResult};
use crate::params::{
    normalize_tags, BatchDeleteTasksParams, BatchMoveTasksParams, BatchUpdateTasksParams,
    CompleteTaskParams, CreateTaskParams, DeleteTaskParams, GetTaskParams, ListTasksParams,
    UpdateTaskParams, Validate,
};
use crate::types::{NewTask, TaskMove};

use super::{failure, respond, BatchItem, BatchSummary, Reply};

pub async fn list_tasks(client: &DidaClient, params: ListTasksParams) -> Reply {
    const CONTEXT: &str = "Failed to list tasks";
    let project_id = match client.resolve_project(params.project_id) {
        Ok(id) => id,
        Err(e) => return failure(e, CONTEXT),
    };

    match client.project_data(&project_id).await {
        Ok(mut data) => {
            let tasks = match data.get_mut("tasks").map(Value::take) {
                Some(Value::Array(tasks)) => tasks,
                _ => Vec::new(),
            };
            let message = format!("Found {} tasks", tasks.len());
            envelope(&tasks, true, Some(&message))
        }
        Err(e) => failure(e, CONTEXT),
    }
}

pub async fn get_task(client: &DidaClient, params: GetTaskParams) -> Reply {
    const CONTEXT: &str = "Failed to get task";
    let outcome = async move {
        params.validate()?;
        let project_id = client.resolve_project(params.project_id)?;
        client.get_task(&project_id, &params.id).await
    };
    respond(outcome.await, CONTEXT, "Task retrieved successfully")
}

pub async fn create_task(client: &DidaClient, params: CreateTaskParams) -> Reply {
    const CONTEXT: &str = "Failed to create task";
    let outcome = async move {
        params.validate()?;
        let project_id = client.resolve_project(params.project_id)?;
        let task = NewTask {
            title: params.title,
            content: params.content.unwrap_or_default(),
            priority: params.priority.unwrap_or(0) as u8,
            project_id,
            due_date: params.due_date,
            time_zone: client.time_zone().to_string(),
            is_all_day: false,
            tags: params.tags.as_deref().map(normalize_tags),
        };
        client.create_task(&task).await
    };
    respond(outcome.await, CONTEXT, "Task created successfully")
}

/// Overlay the supplied fields on the task as fetched from upstream
///
/// Empty `dueDate`/`startDate` clear the date; an empty `tags` clears the tags.
fn merge_update(existing: Value, params: &UpdateTaskParams, default_time_zone: &str) -> Value {
    let mut task = match existing {
        Value::Object(map) => map,
        _ => Map::new(),
    };

    task.insert("id".into(), json!(params.id));
    task.insert("projectId".into(), json!(params.project_id));
    if let Some(title) = &params.title {
        task.insert("title".into(), json!(title));
    }
    if let Some(content) = &params.content {
        task.insert("content".into(), json!(content));
    }
    if let Some(priority) = params.priority {
        task.insert("priority".into(), json!(priority));
    }
    for (key, date) in [("dueDate", &params.due_date), ("startDate", &params.start_date)] {
        match date.as_deref() {
            None => {}
            Some("") => {
                task.insert(key.into(), Value::Null);
            }
            Some(date) => {
                task.insert(key.into(), json!(date));
            }
        }
    }
    if let Some(all_day) = params.is_all_day {
        task.insert("isAllDay".into(), json!(all_day));
    }
    if let Some(tags) = &params.tags {
        task.insert("tags".into(), json!(normalize_tags(tags)));
    }

    let has_zone = task
        .get("timeZone")
        .and_then(Value::as_str)
        .is_some_and(|tz| !tz.is_empty());
    if !has_zone {
        task.insert("timeZone".into(), json!(default_time_zone));
    }

    Value::Object(task)
}

async fn update_one(client: &DidaClient, params: &UpdateTaskParams) -> DidaResult<Value> {
    params.validate()?;
    let existing = client.get_task(&params.project_id, &params.id).await?;
    let task = merge_update(existing, params, client.time_zone());
    client.update_task(&params.id, &task).await
}

pub async fn update_task(client: &DidaClient, params: UpdateTaskParams) -> Reply {
    respond(
        update_one(client, &params).await,
        "Failed to update task",
        "Task updated successfully",
    )
}

pub async fn complete_task(client: &DidaClient, params: CompleteTaskParams) -> Reply {
    const CONTEXT: &str = "Failed to complete task";
    let outcome = async move {
        params.validate()?;
        client.require_v1()?;

        let check = client.batch_check_for_lookup().await?;
        let project_id = check
            .project_of(&params.id)
            .map(str::to_string)
            .ok_or_else(|| DidaError::TaskNotFound(params.id.clone()))?;

        client.complete_task(&project_id, &params.id).await?;
        Ok::<_, DidaError>(json!({ "id": params.id, "projectId": project_id }))
    };
    respond(outcome.await, CONTEXT, "Task completed successfully")
}

pub async fn delete_task(client: &DidaClient, params: DeleteTaskParams) -> Reply {
    const CONTEXT: &str = "Failed to delete task";
    let outcome = async move {
        params.validate()?;
        let project_id = client.resolve_project(params.project_id)?;
        client.delete_task(&project_id, &params.id).await?;
        Ok::<_, DidaError>(json!({ "id": params.id, "projectId": project_id }))
    };
    respond(outcome.await, CONTEXT, "Task deleted successfully")
}

pub async fn move_task(client: &DidaClient, params: TaskMove) -> Reply {
    let outcome = async move {
        params.validate()?;
        client.move_tasks(std::slice::from_ref(&params)).await
    };
    respond(outcome.await, "Failed to move task", "Task moved successfully")
}

pub async fn batch_move_tasks(client: &DidaClient, params: BatchMoveTasksParams) -> Reply {
    let count = params.moves.len();
    let outcome = async move {
        params.validate()?;
        client.move_tasks(&params.moves).await
    };
    respond(
        outcome.await,
        "Failed to move tasks",
        &format!("Successfully moved {} tasks", count),
    )
}

pub async fn batch_update_tasks(client: &DidaClient, params: BatchUpdateTasksParams) -> Reply {
    const CONTEXT: &str = "Failed to update tasks";
    if let Err(e) = params.validate().and_then(|()| client.require_v1()) {
        return failure(e, CONTEXT);
    }

    let results = join_all(params.tasks.iter().map(|task| async move {
        let outcome = update_one(client, task).await.map(Some);
        BatchItem::new(task.id.clone(), Some(task.project_id.clone()), outcome)
    }))
    .await;

    BatchSummary::new(results).reply("update")
}

pub async fn batch_delete_tasks(client: &DidaClient, params: BatchDeleteTasksParams) -> Reply {
    const CONTEXT: &str = "Failed to delete tasks";
    if let Err(e) = params.validate().and_then(|()| client.require_v1()) {
        return failure(e, CONTEXT);
    }

    let results = join_all(params.tasks.iter().map(|task| async move {
        let outcome = client
            .delete_task(&task.project_id, &task.id)
            .await
            .map(|()| None);
        BatchItem::new(task.id.clone(), Some(task.project_id.clone()), outcome)
    }))
    .await;

    BatchSummary::new(results).reply("delete")
}
