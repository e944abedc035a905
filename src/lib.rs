//! Page Bridge - Remote-controlled page agent.
//!
//! This library lets a remote operator drive a page's DOM over a persistent
//! WebSocket channel: navigate, fill forms, click, type, wait, read values
//! and evaluate expressions, with every task answered by a correlated
//! result.
//!
//! # Architecture
//!
//! The bridge follows a client model:
//!
//! - **Page (Rust)**: dials the operator, executes tasks, sends results
//! - **Operator (remote)**: assigns a client id, pushes tasks, collects results
//!
//! Key design principles:
//!
//! - The page always dials out; it never accepts connections
//! - One sequential manager loop reconnects after a fixed delay
//! - Tasks run concurrently; results may arrive in any order
//! - Handlers are looked up by action kind in a replaceable table
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use page_bridge::{Bridge, ElementSpec, MemoryPage, Result};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let page = Arc::new(MemoryPage::new("https://shop.example.com/search"));
//!     page.insert(ElementSpec::new("input").id("q"))?;
//!
//!     // Reports to wss://admin.shop.example.com/bridge
//!     let bridge = Bridge::builder().page(page).build()?;
//!     bridge.connect();
//!
//!     tokio::signal::ctrl_c().await.ok();
//!     bridge.shutdown().await;
//!     Ok(())
//! }
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`actions`] | Action handlers and their registry |
//! | [`bridge`] | [`Bridge`] coordinator, builder and options |
//! | [`dispatch`] | Task → result routing |
//! | [`error`] | Error types and [`Result`] alias |
//! | [`identifiers`] | Type-safe ID wrappers |
//! | [`page`] | [`Page`] driver trait, HTML and DevTools backends, script access |
//! | [`protocol`] | Wire message types |
//! | [`transport`] | WebSocket connection management |

// ============================================================================
// Modules
// ============================================================================

/// Action handlers and their registry.
pub mod actions;

/// Bridge coordinator and configuration.
///
/// Use [`Bridge::builder()`] to create a configured bridge.
pub mod bridge;

/// Task dispatch.
pub mod dispatch;

/// Error types and result aliases.
///
/// All fallible operations return [`Result<T>`] which uses [`Error`].
pub mod error;

/// Type-safe identifiers.
pub mod identifiers;

/// Page driver façade.
pub mod page;

/// Wire protocol message types.
pub mod protocol;

/// WebSocket transport layer.
pub mod transport;

// ============================================================================
// Re-exports
// ============================================================================

// Actions
pub use actions::{ActionHandler, HandlerRegistry, TaskContext};

// Bridge types
pub use bridge::{Bridge, BridgeBuilder, BridgeOptions};

// Dispatch
pub use dispatch::Dispatcher;

// Error types
pub use error::{Error, Result};

// Identifier types
pub use identifiers::{ClientId, ElementRef, TaskId};

// Page types
pub use page::{
    ElementSpec, EventKind, MemoryPage, MemoryScript, Outcome, Page, ScriptAccess, ScriptEngine,
};
#[cfg(feature = "cdp")]
pub use page::{CdpPage, CdpScript};

// Protocol types
pub use protocol::{Action, ActionKind, ClientMessage, ServerMessage, Task, TaskBody, TaskResult};

// Transport types
pub use transport::{ConnectionState, operator_url};
