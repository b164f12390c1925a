//! Correlation scope for mirrored steps.

use serde::{Deserialize, Serialize};

/// Capability exposed by a chat invocation that can be correlated with a
/// running task. Implementors supply the identities; whether a lock record
/// overrides the task id is decided at resolution time.
pub trait StepScope: Send + Sync {
    fn task_id(&self) -> &str;
    fn project_id(&self) -> &str;
}

/// Scope carried by a chat request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatScope {
    pub task_id: String,
    pub project_id: String,
}

impl ChatScope {
    pub fn new(task_id: impl Into<String>, project_id: impl Into<String>) -> Self {
        Self {
            task_id: task_id.into(),
            project_id: project_id.into(),
        }
    }
}

impl StepScope for ChatScope {
    fn task_id(&self) -> &str {
        &self.task_id
    }

    fn project_id(&self) -> &str {
        &self.project_id
    }
}
