//! Credential store and reference data cache
//!
//! One [`Session`] is owned by the server and shared with every handler. The
//! locks only make individual reads and writes memory-safe; a handler that
//! reads, awaits upstream, then writes can interleave with another handler.
//! Locks are never held across an `.await`.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

/// Display name of the synthetic project standing for the inbox
pub const INBOX_PROJECT_NAME: &str = "Inbox";

/// Both upstream credentials plus the cached inbox id
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub v1_token: Option<String>,
    /// Only meaningful while `v1_token` is set
    pub v1_is_oauth: bool,
    pub v2_token: Option<String>,
    pub inbox_id: Option<String>,
}

impl Credentials {
    pub fn has_any_token(&self) -> bool {
        self.v1_token.is_some() || self.v2_token.is_some()
    }
}

/// How `set_credentials` treats the inbox id
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboxUpdate {
    Keep,
    Set(String),
    Clear,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectSummary {
    pub id: String,
    pub name: String,
    pub color: Option<String>,
}

impl ProjectSummary {
    pub fn inbox(inbox_id: &str) -> Self {
        Self {
            id: inbox_id.to_string(),
            name: INBOX_PROJECT_NAME.to_string(),
            color: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TagSummary {
    pub name: String,
    pub raw_name: String,
    pub label: String,
    pub color: Option<String>,
}

pub type ProjectMap = HashMap<String, ProjectSummary>;
pub type TagMap = HashMap<String, TagSummary>;

/// Put the inbox entry into a project mapping
pub fn inject_inbox(projects: &mut ProjectMap, inbox_id: Option<&str>) {
    if let Some(id) = inbox_id {
        projects.insert(id.to_string(), ProjectSummary::inbox(id));
    }
}

#[derive(Debug, Default)]
struct ReferenceData {
    projects: ProjectMap,
    tags: TagMap,
}

/// Point-in-time copy of the reference data cache
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheSnapshot {
    pub projects: Vec<ProjectSummary>,
    pub inbox_id: Option<String>,
    pub tags: Vec<TagSummary>,
}

/// Process-wide credential store and reference data cache
#[derive(Debug, Default)]
pub struct Session {
    credentials: RwLock<Credentials>,
    reference: RwLock<ReferenceData>,
    revision: AtomicU64,
}

impl Session {
    pub fn new(credentials: Credentials) -> Self {
        Self {
            credentials: RwLock::new(credentials),
            ..Default::default()
        }
    }

    pub fn credentials(&self) -> Credentials {
        self.credentials.read().clone()
    }

    pub fn v1_token(&self) -> Option<String> {
        self.credentials.read().v1_token.clone()
    }

    pub fn v1_is_oauth(&self) -> bool {
        let creds = self.credentials.read();
        creds.v1_token.is_some() && creds.v1_is_oauth
    }

    pub fn v2_token(&self) -> Option<String> {
        self.credentials.read().v2_token.clone()
    }

    pub fn inbox_id(&self) -> Option<String> {
        self.credentials.read().inbox_id.clone()
    }

    /// Replace both tokens; the inbox id follows `inbox`
    pub fn set_credentials(
        &self,
        v1_token: Option<String>,
        v1_is_oauth: bool,
        v2_token: Option<String>,
        inbox: InboxUpdate,
    ) {
        let mut creds = self.credentials.write();
        creds.v1_token = v1_token;
        creds.v1_is_oauth = v1_is_oauth;
        creds.v2_token = v2_token;
        match inbox {
            InboxUpdate::Keep => {}
            InboxUpdate::Set(id) => creds.inbox_id = Some(id),
            InboxUpdate::Clear => creds.inbox_id = None,
        }
    }

    /// Empty both mappings and forget the inbox id; tokens are untouched
    pub fn clear_reference_data(&self) {
        {
            let mut reference = self.reference.write();
            reference.projects.clear();
            reference.tags.clear();
        }
        self.credentials.write().inbox_id = None;
        self.bump();
    }

    /// Install freshly fetched project and tag mappings
    pub fn replace_reference_data(&self, projects: ProjectMap, tags: TagMap) {
        {
            let mut reference = self.reference.write();
            reference.projects = projects;
            reference.tags = tags;
        }
        self.bump();
    }

    /// Install a fresh project mapping, keeping the tags
    pub fn replace_projects(&self, projects: ProjectMap) {
        self.reference.write().projects = projects;
        self.bump();
    }

    pub fn project(&self, id: &str) -> Option<ProjectSummary> {
        self.reference.read().projects.get(id).cloned()
    }

    pub fn project_count(&self) -> usize {
        self.reference.read().projects.len()
    }

    pub fn tag_count(&self) -> usize {
        self.reference.read().tags.len()
    }

    pub fn snapshot(&self) -> CacheSnapshot {
        let (mut projects, mut tags) = {
            let reference = self.reference.read();
            (
                reference.projects.values().cloned().collect::<Vec<_>>(),
                reference.tags.values().cloned().collect::<Vec<_>>(),
            )
        };
        projects.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
        tags.sort_by(|a, b| a.name.cmp(&b.name));

        CacheSnapshot {
            projects,
            inbox_id: self.inbox_id(),
            tags,
        }
    }

    /// Counter bumped on every cache mutation
    pub fn revision(&self) -> u64 {
        self.revision.load(Ordering::SeqCst)
    }

    fn bump(&self) {
        self.revision.fetch_add(1, Ordering::SeqCst);
    }
}
