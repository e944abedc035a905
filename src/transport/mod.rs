//! WebSocket transport to the operator.
//!
//! The page is always the client: it dials out to the operator endpoint
//! and keeps dialing after every drop.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐                              ┌─────────────────┐
//! │  Page (Rust)    │         WebSocket            │  Operator       │
//! │                 │                              │                 │
//! │  Manager        │─────────────────────────────►│  wss://admin.   │
//! │  → Session      │  hello / welcome / task /    │  {host}/bridge  │
//! │  → Dispatcher   │  result                      │                 │
//! └─────────────────┘                              └─────────────────┘
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `connection` | One session: handshake, task fan-out, result write-back |
//! | `endpoint` | Operator URL derivation |
//! | `manager` | Connect / reconnect loop and state |

// ============================================================================
// Submodules
// ============================================================================

/// One operator channel session.
pub(crate) mod connection;

/// Operator endpoint derivation.
pub mod endpoint;

/// Connection lifecycle and reconnection.
pub mod manager;

// ============================================================================
// Re-exports
// ============================================================================

pub use endpoint::operator_url;
pub use manager::ConnectionState;

pub(crate) use manager::{ConnectionManager, LinkStatus};
