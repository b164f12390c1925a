//! Step mirroring for chat response streams.
//!
//! Wraps an event stream so every step frame is also delivered, best-effort,
//! to the configured collector. The wrapped stream is the primary data path:
//! mirroring never drops, reorders, or delays its items, and no failure in
//! the mirror path ever reaches the consumer.

use std::pin::Pin;
use std::sync::Arc;

use futures::{Stream, StreamExt};
use tracing::{error, warn};

use crate::config::RelayConfig;
use crate::error::RelayError;
use crate::event::{ChatEvent, StepPayload};
use crate::scope::StepScope;
use crate::sink::StepSink;
use crate::task_lock::TaskLockLookup;

/// Wraps chat streams with best-effort step mirroring.
pub struct StepMirror {
    sink: Option<StepSink>,
    locks: Option<Arc<dyn TaskLockLookup>>,
}

impl StepMirror {
    /// The sink is resolved from configuration once, here; wrapped streams
    /// never re-read it.
    pub fn new(config: &RelayConfig) -> Self {
        Self {
            sink: config.sink_base().map(StepSink::new),
            locks: None,
        }
    }

    /// Inject the task-lock collaborator used for correlation.
    pub fn with_lock_lookup(mut self, locks: Arc<dyn TaskLockLookup>) -> Self {
        self.locks = Some(locks);
        self
    }

    /// Whether a sink is configured at all.
    pub fn is_active(&self) -> bool {
        self.sink.is_some()
    }

    /// Wrap a chat stream.
    ///
    /// Every item of `stream` is yielded unchanged, in order. Step frames
    /// that parse and correlate are additionally dispatched to the sink
    /// without awaiting delivery. `scope` carries the invocation's task and
    /// project identity, when it has one.
    pub fn wrap<S>(
        &self,
        stream: S,
        scope: Option<Arc<dyn StepScope>>,
    ) -> Pin<Box<dyn Stream<Item = ChatEvent> + Send>>
    where
        S: Stream<Item = ChatEvent> + Send + 'static,
    {
        let sink = self.sink.clone();
        let locks = self.locks.clone();

        Box::pin(async_stream::stream! {
            tokio::pin!(stream);
            while let Some(event) = stream.next().await {
                if let Some(sink) = &sink {
                    mirror_event(&event, sink, scope.as_deref(), locks.as_deref()).await;
                }
                yield event;
            }
        })
    }
}

/// Run the mirror pipeline for one event: parse, correlate, dispatch.
///
/// Always returns; every failure is logged and swallowed here.
async fn mirror_event(
    event: &ChatEvent,
    sink: &StepSink,
    scope: Option<&dyn StepScope>,
    locks: Option<&dyn TaskLockLookup>,
) {
    let record = match event.step_record() {
        Ok(record) => record,
        Err(RelayError::MissingField(field)) => {
            error!(field, "step frame missing required key");
            return;
        }
        Err(err) => {
            error!(
                error = %err,
                text = event.candidate_text().unwrap_or_default(),
                "failed to parse step frame"
            );
            return;
        }
    };

    let Some(task_id) = resolve_task_id(scope, locks).await else {
        return;
    };

    sink.dispatch(StepPayload::new(task_id, record));
}

/// Resolve the task id a mirrored step belongs to.
///
/// Prefers the task currently holding the project lock; falls back to the
/// scope's own task id when the lock is idle or missing. A missing lock is
/// degraded mode, not an error.
async fn resolve_task_id(
    scope: Option<&dyn StepScope>,
    locks: Option<&dyn TaskLockLookup>,
) -> Option<String> {
    let scope = scope?;

    let lock = match locks {
        Some(locks) => locks.lookup(scope.project_id()).await,
        None => None,
    };

    let task_id = match lock {
        Some(lock) => lock.active_task_id().unwrap_or(scope.task_id()).to_string(),
        None => {
            warn!(
                project_id = scope.project_id(),
                "task lock not found, using scope task id"
            );
            scope.task_id().to_string()
        }
    };

    (!task_id.is_empty()).then_some(task_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scope::ChatScope;
    use crate::task_lock::{TaskLock, TaskLockRegistry};

    fn scope(task_id: &str) -> ChatScope {
        ChatScope::new(task_id, "P1")
    }

    #[tokio::test]
    async fn lock_task_id_wins_over_scope() {
        let registry = TaskLockRegistry::new();
        registry.register(TaskLock::new("P1").with_current_task("T2"));

        let resolved = resolve_task_id(Some(&scope("T1")), Some(&registry)).await;
        assert_eq!(resolved.as_deref(), Some("T2"));
    }

    #[tokio::test]
    async fn idle_lock_falls_back_to_scope_task_id() {
        let registry = TaskLockRegistry::new();
        registry.register(TaskLock::new("P1"));

        let resolved = resolve_task_id(Some(&scope("T1")), Some(&registry)).await;
        assert_eq!(resolved.as_deref(), Some("T1"));
    }

    #[tokio::test]
    async fn empty_lock_task_id_falls_back_to_scope_task_id() {
        let registry = TaskLockRegistry::new();
        registry.register(TaskLock::new("P1").with_current_task(""));

        let resolved = resolve_task_id(Some(&scope("T1")), Some(&registry)).await;
        assert_eq!(resolved.as_deref(), Some("T1"));
    }

    #[tokio::test]
    async fn missing_lock_falls_back_to_scope_task_id() {
        let registry = TaskLockRegistry::new();

        let resolved = resolve_task_id(Some(&scope("T1")), Some(&registry)).await;
        assert_eq!(resolved.as_deref(), Some("T1"));
    }

    #[tokio::test]
    async fn no_scope_resolves_nothing() {
        let registry = TaskLockRegistry::new();
        registry.register(TaskLock::new("P1").with_current_task("T2"));

        assert_eq!(resolve_task_id(None, Some(&registry)).await, None);
    }

    #[tokio::test]
    async fn empty_scope_task_id_resolves_nothing() {
        let resolved = resolve_task_id(Some(&scope("")), None).await;
        assert_eq!(resolved, None);
    }
}
