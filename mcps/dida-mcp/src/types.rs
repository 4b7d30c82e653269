//! Upstream wire types
//!
//! Only the fields the server reads are modelled; tasks and projects are
//! otherwise passed through as raw JSON.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::session::{ProjectSummary, TagSummary};

/// Treat an explicit `null` like a missing key
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Project as returned by v1 `GET /project` and v2 `projectProfiles`
#[derive(Debug, Clone, Deserialize)]
pub struct ProjectProfile {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
}

impl From<ProjectProfile> for ProjectSummary {
    fn from(p: ProjectProfile) -> Self {
        ProjectSummary {
            id: p.id,
            name: p.name.unwrap_or_default(),
            color: p.color,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TagProfile {
    pub name: String,
    #[serde(default)]
    pub raw_name: Option<String>,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
}

impl From<TagProfile> for TagSummary {
    fn from(t: TagProfile) -> Self {
        TagSummary {
            raw_name: t.raw_name.unwrap_or_else(|| t.name.clone()),
            label: t.label.unwrap_or_else(|| t.name.clone()),
            name: t.name,
            color: t.color,
        }
    }
}

/// Task as it appears inside a batch-check sync bean
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncTask {
    pub id: String,
    #[serde(default)]
    pub project_id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SyncTaskBean {
    #[serde(default, deserialize_with = "null_as_default")]
    pub update: Vec<SyncTask>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub add: Vec<SyncTask>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub delete: Vec<Value>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub empty: bool,
}

impl SyncTaskBean {
    /// Project owning `task_id`, searching `update` before `add`
    pub fn project_of(&self, task_id: &str) -> Option<&str> {
        if self.empty {
            return None;
        }
        self.update
            .iter()
            .chain(self.add.iter())
            .find(|t| t.id == task_id)
            .and_then(|t| t.project_id.as_deref())
    }
}

/// Reference data from v2 `GET /batch/check/0`
///
/// The task sync bean is left undecoded; see [`TaskLookup`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchCheck {
    #[serde(default, deserialize_with = "null_as_default")]
    pub project_profiles: Vec<ProjectProfile>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tags: Vec<TagProfile>,
    #[serde(default)]
    pub inbox_id: Option<String>,
}

/// Recent tasks from v2 `GET /batch/check/0`, used to find a task's project
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskLookup {
    #[serde(default)]
    pub sync_task_bean: Option<SyncTaskBean>,
}

impl TaskLookup {
    pub fn project_of(&self, task_id: &str) -> Option<&str> {
        self.sync_task_bean.as_ref()?.project_of(task_id)
    }
}

/// One task relocation for v2 `POST /batch/taskProject`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct TaskMove {
    #[schemars(description = "ID of the task to move")]
    pub task_id: String,
    #[schemars(description = "Project currently containing the task")]
    pub from_project_id: String,
    #[schemars(description = "Project the task should move to")]
    pub to_project_id: String,
}

/// Result of v2 batch endpoints
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchResult {
    #[serde(default)]
    pub id2etag: BTreeMap<String, String>,
    #[serde(default)]
    pub id2error: BTreeMap<String, String>,
}

/// Body of v1 `POST /project`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProject {
    pub name: String,
    pub color: String,
    pub view_mode: String,
    pub kind: String,
}

/// Body of v1 `POST /task`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTask {
    pub title: String,
    pub content: String,
    pub priority: u8,
    pub project_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    pub time_zone: String,
    pub is_all_day: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}
