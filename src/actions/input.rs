//! Fill, click and type.

// ============================================================================
// Imports
// ============================================================================

use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Value, json};
use tokio::time::sleep;
use tracing::trace;

use crate::error::Result;
use crate::page::{EventKind, Outcome};
use crate::protocol::{Action, ActionKind};

use super::{ActionHandler, TaskContext, mismatch};

// ============================================================================
// FillHandler
// ============================================================================

/// Sets an element's value, then fires `input` and `change`.
#[derive(Debug, Clone, Copy, Default)]
pub struct FillHandler;

#[async_trait]
impl ActionHandler for FillHandler {
    async fn handle(&self, action: Action, cx: &TaskContext) -> Result<Outcome> {
        let Action::Fill { selector, value } = action else {
            return Err(mismatch(ActionKind::Fill, &action));
        };

        let page = cx.page();
        let element = page.require(&selector).await?;

        page.set_value(element, &value_text(&value)).await?;
        page.dispatch_event(element, EventKind::Input).await?;
        page.dispatch_event(element, EventKind::Change).await?;

        Ok(json!({ "filled": selector, "value": value }).into())
    }
}

/// Text assigned to a `value` property for an arbitrary JSON value.
fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

// ============================================================================
// ClickHandler
// ============================================================================

/// Activates an element.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClickHandler;

#[async_trait]
impl ActionHandler for ClickHandler {
    async fn handle(&self, action: Action, cx: &TaskContext) -> Result<Outcome> {
        let Action::Click { selector } = action else {
            return Err(mismatch(ActionKind::Click, &action));
        };

        let page = cx.page();
        let element = page.require(&selector).await?;
        page.click(element).await?;

        Ok(json!({ "clicked": selector }).into())
    }
}

// ============================================================================
// TypeHandler
// ============================================================================

/// Types text with keystroke cadence.
///
/// Focuses the element, then for every character appends it to the value,
/// fires `input` and pauses for the action's `delay` (or
/// [`type_delay`](crate::BridgeOptions::type_delay)). An explicit delay of
/// zero is honored.
#[derive(Debug, Clone, Copy, Default)]
pub struct TypeHandler;

#[async_trait]
impl ActionHandler for TypeHandler {
    async fn handle(&self, action: Action, cx: &TaskContext) -> Result<Outcome> {
        let Action::Type {
            selector,
            text,
            delay,
        } = action
        else {
            return Err(mismatch(ActionKind::Type, &action));
        };

        let page = cx.page();
        let element = page.require(&selector).await?;
        let delay = delay.map_or(cx.options().type_delay, Duration::from_millis);

        page.focus(element).await?;

        let mut typed = 0usize;
        for c in text.chars() {
            let mut current = page.value(element).await?.unwrap_or_default();
            current.push(c);
            page.set_value(element, &current).await?;
            page.dispatch_event(element, EventKind::Input).await?;
            typed += 1;

            trace!(%selector, typed, "Keystroke");
            sleep(delay).await;
        }

        Ok(json!({ "typed": format!("{typed} chars") }).into())
    }
}

// ============================================================================
// Tests
// ============================================================================
