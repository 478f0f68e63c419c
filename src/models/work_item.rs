//! # Work Items
//!
//! The unit of follow-up work produced by the decision engines and the
//! workflow engine. Work items are created once and never mutated except
//! for the pending → completed status transition performed by the
//! persistence collaborator.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{CoreError, Result};

/// Work item priority buckets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Low => write!(f, "low"),
            Self::Medium => write!(f, "medium"),
            Self::High => write!(f, "high"),
        }
    }
}

impl std::str::FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            _ => Err(format!("Invalid priority: {s}")),
        }
    }
}

/// Work item lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkItemStatus {
    Pending,
    Completed,
}

impl WorkItemStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed)
    }
}

/// A tracked unit of human or automated follow-up work
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkItem {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub item_type: String,
    pub priority: Priority,
    pub assignee: String,
    pub due_at: DateTime<Utc>,
    pub status: WorkItemStatus,
    pub created_at: DateTime<Utc>,
    pub metadata: Map<String, Value>,
}

/// Engine-produced description of a work item before it is materialized.
///
/// Decision engines are pure, so they emit descriptors; the caller turns a
/// descriptor into a `WorkItem` with an id and concrete due date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkItemDescriptor {
    pub title: String,
    pub description: String,
    pub item_type: String,
    pub priority: Priority,
    pub assignee: String,
    pub due_offset_minutes: i64,
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

impl WorkItemDescriptor {
    /// Materialize the descriptor at the given creation time. Guarantees
    /// `due_at >= created_at + due_offset_minutes`.
    pub fn into_work_item(self, created_at: DateTime<Utc>) -> WorkItem {
        WorkItem {
            id: Uuid::new_v4(),
            title: self.title,
            description: self.description,
            item_type: self.item_type,
            priority: self.priority,
            assignee: self.assignee,
            due_at: created_at + Duration::minutes(self.due_offset_minutes),
            status: WorkItemStatus::Pending,
            created_at,
            metadata: self.metadata,
        }
    }
}

/// CRUD seam to the persistence collaborator. Creation is append-only from
/// the caller's perspective; the only permitted update is completion.
#[async_trait]
pub trait TaskStore: Send + Sync {
    async fn create(&self, item: WorkItem) -> Result<()>;

    async fn complete(&self, id: Uuid) -> Result<()>;

    async fn get(&self, id: Uuid) -> Result<Option<WorkItem>>;

    async fn list_pending(&self) -> Result<Vec<WorkItem>>;
}

/// In-memory store used in tests and single-process wiring
#[derive(Debug, Clone, Default)]
pub struct InMemoryTaskStore {
    items: Arc<RwLock<HashMap<Uuid, WorkItem>>>,
}

impl InMemoryTaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.items.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.items.read().await.is_empty()
    }
}

#[async_trait]
impl TaskStore for InMemoryTaskStore {
    async fn create(&self, item: WorkItem) -> Result<()> {
        self.items.write().await.insert(item.id, item);
        Ok(())
    }

    async fn complete(&self, id: Uuid) -> Result<()> {
        let mut items = self.items.write().await;
        match items.get_mut(&id) {
            Some(item) => {
                item.status = WorkItemStatus::Completed;
                Ok(())
            }
            None => Err(CoreError::validation(format!("Unknown work item: {id}"))),
        }
    }

    async fn get(&self, id: Uuid) -> Result<Option<WorkItem>> {
        Ok(self.items.read().await.get(&id).cloned())
    }

    async fn list_pending(&self) -> Result<Vec<WorkItem>> {
        Ok(self
            .items
            .read()
            .await
            .values()
            .filter(|item| item.status == WorkItemStatus::Pending)
            .cloned()
            .collect())
    }
}
