//! Steprelay - best-effort step mirroring for chat response streams.
//!
//! This crate provides:
//! - A stream wrapper that mirrors step frames to a central collector
//! - SSE-framed event parsing (`data: ` frames and structured payloads)
//! - Task-lock correlation between a stream and its running task
//! - Fire-and-forget HTTP delivery that never touches the primary stream

pub mod config;
pub mod error;
pub mod event;
pub mod mirror;
pub mod scope;
pub mod sink;
pub mod task_lock;

// Re-export commonly used types
pub use config::RelayConfig;
pub use error::{RelayError, Result};
pub use event::{ChatEvent, StepPayload, StepRecord};
pub use mirror::StepMirror;
pub use scope::{ChatScope, StepScope};
pub use sink::StepSink;
pub use task_lock::{TaskLock, TaskLockLookup, TaskLockRegistry};
