//! Deferred navigation.

use async_trait::async_trait;
use serde_json::json;
use tokio::time::sleep;
use tracing::{debug, warn};

use crate::error::Result;
use crate::page::Outcome;
use crate::protocol::{Action, ActionKind};

use super::{ActionHandler, TaskContext, mismatch};

// ============================================================================
// NavigateHandler
// ============================================================================

/// Schedules a navigation and reports immediately.
///
/// Navigating tears the page context down, so the change is deferred by
/// [`navigate_delay`](crate::BridgeOptions::navigate_delay) to let the
/// result frame leave first. The scheduled navigation is not tied to the
/// task and still happens if the connection drops in between.
#[derive(Debug, Clone, Copy, Default)]
pub struct NavigateHandler;

#[async_trait]
impl ActionHandler for NavigateHandler {
    async fn handle(&self, action: Action, cx: &TaskContext) -> Result<Outcome> {
        let Action::Navigate { url } = action else {
            return Err(mismatch(ActionKind::Navigate, &action));
        };

        let page = cx.page_handle();
        let delay = cx.options().navigate_delay;
        let target = url.clone();

        tokio::spawn(async move {
            sleep(delay).await;
            match page.navigate(&target).await {
                Ok(()) => debug!(url = %target, "Navigated"),
                Err(e) => warn!(url = %target, error = %e, "Scheduled navigation failed"),
            }
        });

        Ok(json!({ "navigating": url }).into())
    }
}

// ============================================================================
// Tests
// ============================================================================
