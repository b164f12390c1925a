//! Chat stream events and step extraction.

use chrono::Utc;
use serde::Serialize;
use serde_json::Value;

use crate::error::{RelayError, Result};

/// SSE framing marker carried by text frames.
pub const SSE_DATA_PREFIX: &str = "data: ";

/// One item produced by a wrapped chat stream.
#[derive(Debug, Clone, PartialEq)]
pub enum ChatEvent {
    /// Raw text frame, possibly prefixed with the SSE `data: ` marker.
    Frame(String),
    /// Already-structured payload.
    Json(Value),
}

impl ChatEvent {
    /// Candidate JSON text for step extraction.
    ///
    /// Frames with the SSE marker are stripped and trimmed; frames without
    /// it are used as-is. Structured payloads have no text form.
    pub fn candidate_text(&self) -> Option<&str> {
        match self {
            ChatEvent::Frame(text) => Some(
                text.strip_prefix(SSE_DATA_PREFIX)
                    .map(str::trim)
                    .unwrap_or(text),
            ),
            ChatEvent::Json(_) => None,
        }
    }

    /// Extract the step record carried by this event, if any.
    ///
    /// Read-only: the event itself is never consumed or altered, whatever
    /// the outcome.
    pub fn step_record(&self) -> Result<StepRecord> {
        let json = match self {
            ChatEvent::Frame(_) => {
                let text = self.candidate_text().unwrap_or_default();
                serde_json::from_str::<Value>(text)?
            }
            ChatEvent::Json(value) => value.clone(),
        };

        let step = json
            .get("step")
            .cloned()
            .ok_or(RelayError::MissingField("step"))?;
        let data = json
            .get("data")
            .cloned()
            .ok_or(RelayError::MissingField("data"))?;

        Ok(StepRecord { step, data })
    }
}

/// Step identifier and payload extracted from an event.
#[derive(Debug, Clone, PartialEq)]
pub struct StepRecord {
    pub step: Value,
    pub data: Value,
}

/// Wire body delivered to the collector.
#[derive(Debug, Clone, Serialize)]
pub struct StepPayload {
    pub task_id: String,
    pub step: Value,
    pub data: Value,
    /// Seconds since the Unix epoch, fractional.
    pub timestamp: f64,
}

impl StepPayload {
    /// Stamp a record with its task id and the current time.
    pub fn new(task_id: impl Into<String>, record: StepRecord) -> Self {
        Self {
            task_id: task_id.into(),
            step: record.step,
            data: record.data,
            timestamp: unix_timestamp(),
        }
    }
}

fn unix_timestamp() -> f64 {
    let now = Utc::now();
    now.timestamp() as f64 + f64::from(now.timestamp_subsec_nanos()) / 1e9
}
