//! Action handlers and their registry.
//!
//! Each [`ActionKind`](crate::ActionKind) maps to one [`ActionHandler`] in a
//! [`HandlerRegistry`]. The dispatcher only ever looks handlers up by kind,
//! so replacing or adding a handler never touches dispatch.
//!
//! # Handlers
//!
//! | Kind | Handler | Success value |
//! |------|---------|---------------|
//! | `navigate` | [`NavigateHandler`] | `{navigating: url}` |
//! | `fill` | [`FillHandler`] | `{filled: selector, value}` |
//! | `click` | [`ClickHandler`] | `{clicked: selector}` |
//! | `type` | [`TypeHandler`] | `{typed: "N chars"}` |
//! | `wait` | [`WaitHandler`] | `{found: selector}` / `{waited: ms}` / none |
//! | `eval` | [`EvalHandler`] | expression value |
//! | `get` | [`GetHandler`] | `{text, value?, html?}` |

// ============================================================================
// Submodules
// ============================================================================

/// Fill, click and type.
pub mod input;

/// Deferred navigation.
pub mod navigation;

/// Element reads.
pub mod query;

/// Kind → handler table.
pub mod registry;

/// Expression evaluation.
pub mod script;

/// Polling and sleeping waits.
pub mod wait;

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

use crate::bridge::BridgeOptions;
use crate::error::{Error, Result};
use crate::page::{Outcome, Page};
use crate::protocol::{Action, ActionKind};

// ============================================================================
// Re-exports
// ============================================================================

pub use input::{ClickHandler, FillHandler, TypeHandler};
pub use navigation::NavigateHandler;
pub use query::GetHandler;
pub use registry::HandlerRegistry;
pub use script::EvalHandler;
pub use wait::{WaitHandler, wait_for_selector};

// ============================================================================
// ActionHandler
// ============================================================================

/// Implements one action kind.
#[async_trait]
pub trait ActionHandler: Send + Sync {
    /// Runs `action` against the page in `cx`.
    ///
    /// # Errors
    ///
    /// Any error; its display text becomes the task result's `error`.
    async fn handle(&self, action: Action, cx: &TaskContext) -> Result<Outcome>;
}

/// Error for a handler invoked with another kind's action.
pub(crate) fn mismatch(expected: ActionKind, action: &Action) -> Error {
    Error::invalid_argument(format!(
        "{expected} handler received a {} action",
        action.kind()
    ))
}

// ============================================================================
// TaskContext
// ============================================================================

/// What a handler may touch while running.
#[derive(Clone)]
pub struct TaskContext {
    page: Arc<dyn Page>,
    options: BridgeOptions,
}

impl fmt::Debug for TaskContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskContext")
            .field("location", &self.page.location())
            .field("options", &self.options)
            .finish()
    }
}

impl TaskContext {
    /// Creates a context over `page`.
    #[inline]
    #[must_use]
    pub fn new(page: Arc<dyn Page>, options: BridgeOptions) -> Self {
        Self { page, options }
    }

    /// The page driver.
    #[inline]
    #[must_use]
    pub fn page(&self) -> &dyn Page {
        self.page.as_ref()
    }

    /// A shared handle to the page driver, for work that outlives the task.
    #[inline]
    #[must_use]
    pub fn page_handle(&self) -> Arc<dyn Page> {
        Arc::clone(&self.page)
    }

    /// Timing options.
    #[inline]
    #[must_use]
    pub fn options(&self) -> &BridgeOptions {
        &self.options
    }
}

// ============================================================================
// Test Support
// ============================================================================

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::Arc;
    use std::time::Duration;

    use crate::bridge::BridgeOptions;
    use crate::page::MemoryPage;

    use super::TaskContext;

    /// Options with every delay shrunk for tests.
    pub(crate) fn fast_options() -> BridgeOptions {
        BridgeOptions::new()
            .with_navigate_delay(Duration::from_millis(5))
            .with_poll_interval(Duration::from_millis(10))
            .with_type_delay(Duration::ZERO)
    }

    pub(crate) fn context(page: &Arc<MemoryPage>) -> TaskContext {
        TaskContext::new(page.clone(), fast_options())
    }
}
