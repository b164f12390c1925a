//! Task-lock records and the read-only lookup seam.
//!
//! Locks are owned and maintained by the embedding application; the mirror
//! only ever reads them to decide which task a step belongs to.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};

/// Record tracking the currently active task for a project.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskLock {
    pub project_id: String,
    /// Task currently holding the lock, when one is running.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_task_id: Option<String>,
    pub locked_at: DateTime<Utc>,
}

impl TaskLock {
    pub fn new(project_id: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            current_task_id: None,
            locked_at: Utc::now(),
        }
    }

    pub fn with_current_task(mut self, task_id: impl Into<String>) -> Self {
        self.current_task_id = Some(task_id.into());
        self
    }

    /// Task id holding the lock, treating an empty id as unset.
    pub fn active_task_id(&self) -> Option<&str> {
        self.current_task_id.as_deref().filter(|id| !id.is_empty())
    }
}

/// Read-only view of task locks.
#[async_trait]
pub trait TaskLockLookup: Send + Sync {
    async fn lookup(&self, project_id: &str) -> Option<TaskLock>;
}

/// In-process lock table, keyed by project.
#[derive(Default)]
pub struct TaskLockRegistry {
    locks: DashMap<String, TaskLock>,
}

impl TaskLockRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register or replace the lock for its project.
    pub fn register(&self, lock: TaskLock) {
        self.locks.insert(lock.project_id.clone(), lock);
    }

    /// Drop the lock for a project, returning it if one was held.
    pub fn release(&self, project_id: &str) -> Option<TaskLock> {
        self.locks.remove(project_id).map(|(_, lock)| lock)
    }
}

#[async_trait]
impl TaskLockLookup for TaskLockRegistry {
    async fn lookup(&self, project_id: &str) -> Option<TaskLock> {
        self.locks.get(project_id).map(|entry| entry.value().clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn registry_round_trips_locks() {
        let registry = TaskLockRegistry::new();
        registry.register(TaskLock::new("P1").with_current_task("T2"));

        let lock = registry.lookup("P1").await.unwrap();
        assert_eq!(lock.active_task_id(), Some("T2"));
        assert!(registry.lookup("P2").await.is_none());

        let released = registry.release("P1").unwrap();
        assert_eq!(released.project_id, "P1");
        assert!(registry.lookup("P1").await.is_none());
    }

    #[test]
    fn empty_current_task_counts_as_unset() {
        let lock = TaskLock::new("P1").with_current_task("");
        assert_eq!(lock.active_task_id(), None);

        let idle = TaskLock::new("P1");
        assert_eq!(idle.active_task_id(), None);
    }
}
