//! WebSocket protocol message types.
//!
//! This module defines the frames exchanged between the bridge (agent) and
//! the operator endpoint.
//!
//! # Protocol Overview
//!
//! | Message | Direction | Purpose |
//! |---------|-----------|---------|
//! | `hello` | Agent → Operator | Announce the page on connect |
//! | `welcome` | Operator → Agent | Assign the client identity |
//! | `task` | Operator → Agent | Action or raw expression to run |
//! | `result` | Agent → Operator | Correlated outcome, by `taskId` |
//!
//! Results are best-effort and at-most-once, and may arrive in any order.
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `action` | Structured action vocabulary |
//! | `message` | Frame types and task model |

// ============================================================================
// Submodules
// ============================================================================

/// Structured action vocabulary.
pub mod action;

/// Wire frames and the task model.
pub mod message;

// ============================================================================
// Re-exports
// ============================================================================

pub use action::{Action, ActionKind};
pub use message::{ClientMessage, ServerMessage, Task, TaskBody, TaskFrame, TaskResult};
