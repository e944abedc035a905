//! Polling and sleeping waits.

// ============================================================================
// Imports
// ============================================================================

use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;
use tokio::time::{Instant, sleep};
use tracing::debug;

use crate::error::{Error, Result};
use crate::page::{Outcome, Page};
use crate::protocol::{Action, ActionKind};

use super::{ActionHandler, TaskContext, mismatch};

// ============================================================================
// WaitHandler
// ============================================================================

/// Waits for an element or for a fixed time.
///
/// | Fields | Behavior | Success value |
/// |--------|----------|---------------|
/// | `selector` (+ `timeout`) | poll until present | `{found: selector}` |
/// | `ms` | sleep | `{waited: ms}` |
/// | neither | nothing | none |
///
/// A non-empty `selector` wins over `ms`. A `timeout` of 0 falls back to the
/// configured default and an `ms` of 0 is treated as absent.
#[derive(Debug, Clone, Copy, Default)]
pub struct WaitHandler;

#[async_trait]
impl ActionHandler for WaitHandler {
    async fn handle(&self, action: Action, cx: &TaskContext) -> Result<Outcome> {
        let Action::Wait {
            selector,
            timeout,
            ms,
        } = action
        else {
            return Err(mismatch(ActionKind::Wait, &action));
        };

        match (selector.filter(|s| !s.is_empty()), ms.filter(|&ms| ms > 0)) {
            (Some(selector), _) => {
                let timeout = timeout
                    .filter(|&t| t > 0)
                    .map_or(cx.options().wait_timeout, Duration::from_millis);
                wait_for_selector(cx.page(), &selector, timeout, cx.options().poll_interval)
                    .await?;
                Ok(json!({ "found": selector }).into())
            }
            (None, Some(ms)) => {
                sleep(Duration::from_millis(ms)).await;
                Ok(json!({ "waited": ms }).into())
            }
            (None, None) => Ok(Outcome::Undefined),
        }
    }
}

// ============================================================================
// Functions
// ============================================================================

/// Polls `page` every `poll` until `selector` matches or `timeout` passes.
///
/// The element is always checked at least once, even with a zero timeout.
/// Dropping the future stops polling.
///
/// # Errors
///
/// - [`Error::WaitTimeout`] if the deadline passes first
/// - [`Error::InvalidSelector`] if the selector cannot be parsed
pub async fn wait_for_selector(
    page: &dyn Page,
    selector: &str,
    timeout: Duration,
    poll: Duration,
) -> Result<()> {
    let deadline = Instant::now() + timeout;

    loop {
        if page.query_selector(selector).await?.is_some() {
            return Ok(());
        }
        if Instant::now() >= deadline {
            break;
        }
        sleep(poll).await;
    }

    debug!(selector, timeout_ms = timeout.as_millis() as u64, "Wait timed out");
    Err(Error::wait_timeout(selector, timeout.as_millis() as u64))
}

// ============================================================================
// Tests
// ============================================================================
