//! Wire messages exchanged with the operator.
//!
//! All frames are UTF-8 JSON text tagged by `type`.
//!
//! # Format
//!
//! Agent → operator:
//! ```json
//! {"type": "hello", "url": "https://shop.example.com/cart"}
//! {"type": "result", "taskId": "t1", "result": {"clicked": "#buy"}}
//! {"type": "result", "taskId": "t2", "error": "Element not found: #buy"}
//! ```
//!
//! Operator → agent:
//! ```json
//! {"type": "welcome", "clientId": "c-17"}
//! {"type": "task", "taskId": "t1", "action": {"type": "click", "selector": "#buy"}}
//! {"type": "task", "taskId": "t3", "code": "document.title"}
//! ```

// ============================================================================
// Imports
// ============================================================================

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};
use crate::identifiers::{ClientId, TaskId};

// ============================================================================
// ClientMessage
// ============================================================================

/// Frames the agent sends.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ClientMessage {
    /// Handshake opener, sent once per connection.
    Hello {
        /// Current page URL.
        url: String,
    },
    /// Outcome of one task.
    Result(TaskResult),
}

impl ClientMessage {
    /// Serializes to a JSON text frame.
    ///
    /// # Errors
    ///
    /// [`Error::Json`] if serialization fails.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

// ============================================================================
// TaskResult
// ============================================================================

/// Correlated outcome of a task.
///
/// At most one of `result` / `error` is set; neither set means the task
/// completed without an explicit value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskResult {
    /// Task this result answers.
    #[serde(rename = "taskId")]
    pub task_id: TaskId,

    /// Normalized success value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,

    /// Failure message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TaskResult {
    /// Creates a success result.
    #[inline]
    #[must_use]
    pub fn success(task_id: TaskId, result: Option<Value>) -> Self {
        Self {
            task_id,
            result,
            error: None,
        }
    }

    /// Creates a failure result.
    #[inline]
    #[must_use]
    pub fn failure(task_id: TaskId, error: impl Into<String>) -> Self {
        Self {
            task_id,
            result: None,
            error: Some(error.into()),
        }
    }

    /// Returns `true` if the task failed.
    #[inline]
    #[must_use]
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

// ============================================================================
// ServerMessage
// ============================================================================

/// Frames the operator sends.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ServerMessage {
    /// Handshake reply carrying the client identity.
    Welcome {
        /// Identity for this connection.
        #[serde(rename = "clientId")]
        client_id: ClientId,
    },
    /// Unit of remote work.
    Task(TaskFrame),
}

impl ServerMessage {
    /// Parses a text frame.
    ///
    /// # Errors
    ///
    /// [`Error::Protocol`] for invalid JSON, an unknown `type`, or missing
    /// fields.
    pub fn parse(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| Error::protocol(e.to_string()))
    }

    /// Serializes to a JSON text frame.
    ///
    /// # Errors
    ///
    /// [`Error::Json`] if serialization fails.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

// ============================================================================
// TaskFrame
// ============================================================================

/// Body of a `task` frame as it appears on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskFrame {
    /// Correlation id.
    #[serde(rename = "taskId")]
    pub task_id: TaskId,

    /// Structured action object, decoded lazily by the dispatcher.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<Value>,

    /// Raw expression.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl TaskFrame {
    /// Builds an action task.
    #[must_use]
    pub fn action(task_id: impl Into<TaskId>, action: Value) -> Self {
        Self {
            task_id: task_id.into(),
            action: Some(action),
            code: None,
        }
    }

    /// Builds a raw expression task.
    #[must_use]
    pub fn code(task_id: impl Into<TaskId>, code: impl Into<String>) -> Self {
        Self {
            task_id: task_id.into(),
            action: None,
            code: Some(code.into()),
        }
    }
}

// ============================================================================
// Task
// ============================================================================

/// A task ready for dispatch.
#[derive(Debug, Clone, PartialEq)]
pub struct Task {
    /// Correlation id.
    pub id: TaskId,
    /// What to run.
    pub body: TaskBody,
}

/// What a task asks for.
#[derive(Debug, Clone, PartialEq)]
pub enum TaskBody {
    /// Structured action (still raw JSON, so unknown tags can be reported).
    Action(Value),
    /// Raw expression.
    Expression(String),
    /// Neither; completes with no value.
    Empty,
}

impl From<TaskFrame> for Task {
    fn from(frame: TaskFrame) -> Self {
        let body = match (frame.action, frame.code) {
            (Some(action), _) => TaskBody::Action(action),
            (None, Some(code)) if !code.is_empty() => TaskBody::Expression(code),
            _ => TaskBody::Empty,
        };
        Self {
            id: frame.task_id,
            body,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
