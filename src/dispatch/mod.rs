//! Task dispatch.
//!
//! Turns one [`Task`] into one [`TaskResult`]: decode the action, look the
//! handler up by kind, run it, normalize the outcome for the wire. Errors
//! never escape; they become the result's `error` text.
//!
//! | Task body | Route |
//! |-----------|-------|
//! | `action` | [`HandlerRegistry`] by [`ActionKind`](crate::ActionKind) |
//! | `code` | granted [`ScriptAccess`] |
//! | neither | nothing; empty success |

// ============================================================================
// Imports
// ============================================================================

use tracing::{debug, info, trace, warn};

use crate::actions::{HandlerRegistry, TaskContext};
use crate::error::{Error, Result};
use crate::page::{Outcome, ScriptAccess};
use crate::protocol::{Action, Task, TaskBody, TaskResult};

// ============================================================================
// Dispatcher
// ============================================================================

/// Routes tasks to handlers.
///
/// Cheap to clone; the connection clones one into every spawned task so
/// tasks never wait on each other.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    registry: HandlerRegistry,
    script: Option<ScriptAccess>,
    cx: TaskContext,
}

impl Dispatcher {
    /// Creates a dispatcher.
    ///
    /// `script` governs raw `code` tasks only; whether the `eval` action is
    /// available is up to `registry`.
    #[must_use]
    pub fn new(registry: HandlerRegistry, script: Option<ScriptAccess>, cx: TaskContext) -> Self {
        Self {
            registry,
            script,
            cx,
        }
    }

    /// Handler table in use.
    #[inline]
    #[must_use]
    pub fn registry(&self) -> &HandlerRegistry {
        &self.registry
    }

    /// Context handed to every handler.
    #[inline]
    #[must_use]
    pub fn context(&self) -> &TaskContext {
        &self.cx
    }

    /// Runs a task to completion and builds its result frame.
    pub async fn dispatch(&self, task: Task) -> TaskResult {
        let Task { id, body } = task;
        trace!(task_id = %id, "Dispatching task");

        match self.run(body).await {
            Ok(result) => {
                debug!(task_id = %id, "Task succeeded");
                TaskResult::success(id, result)
            }
            Err(e) => {
                if e.is_connection_error() {
                    warn!(task_id = %id, error = %e, "Task lost its page connection");
                } else if e.is_element_error() || e.is_timeout() {
                    debug!(task_id = %id, error = %e, "Task failed");
                } else {
                    info!(task_id = %id, error = %e, "Task failed");
                }
                TaskResult::failure(id, e.to_string())
            }
        }
    }

    async fn run(&self, body: TaskBody) -> Result<Option<serde_json::Value>> {
        let outcome = match body {
            TaskBody::Action(raw) => self.run_action(raw).await?,
            TaskBody::Expression(code) => {
                let script = self.script.as_ref().ok_or(Error::ScriptDisabled)?;
                script.evaluate(&code).await?
            }
            TaskBody::Empty => Outcome::Undefined,
        };

        outcome.normalize(self.cx.page()).await
    }

    async fn run_action(&self, raw: serde_json::Value) -> Result<Outcome> {
        let action = Action::from_value(raw)?;
        let kind = action.kind();
        let handler = self
            .registry
            .get(kind)
            .ok_or_else(|| Error::action_unavailable(kind.as_str()))?;

        trace!(%kind, "Running handler");
        handler.handle(action, &self.cx).await
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Arc;

    use serde_json::json;

    use crate::actions::testing::context;
    use crate::identifiers::TaskId;
    use crate::page::{ElementSpec, MemoryPage, MemoryScript, Page};
    use crate::protocol::TaskFrame;

    fn shop_page() -> Arc<MemoryPage> {
        let page = Arc::new(MemoryPage::new("https://shop.example.com/search"));
        page.set_title("Search");
        page.insert(ElementSpec::new("input").id("box"))
            .expect("insert");
        page.insert(ElementSpec::new("li").class("hit").text("socks"))
            .expect("insert");
        page
    }

    fn without_script(page: &Arc<MemoryPage>) -> Dispatcher {
        Dispatcher::new(HandlerRegistry::standard(), None, context(page))
    }

    fn with_script(page: &Arc<MemoryPage>) -> Dispatcher {
        let access = ScriptAccess::trusted(MemoryScript::new(Arc::clone(page)));
        Dispatcher::new(
            HandlerRegistry::standard().with_script(access.clone()),
            Some(access),
            context(page),
        )
    }

    #[tokio::test]
    async fn test_unknown_action_is_reported() {
        let page = shop_page();
        let result = without_script(&page)
            .dispatch(TaskFrame::action("t1", json!({"type": "hover", "selector": "a"})).into())
            .await;

        assert_eq!(result.task_id, TaskId::new("t1"));
        assert_eq!(result.error.as_deref(), Some("Unknown action: hover"));
        assert_eq!(result.result, None);
    }

    #[tokio::test]
    async fn test_missing_type_tag() {
        let page = shop_page();
        let result = without_script(&page)
            .dispatch(TaskFrame::action("t1", json!({"selector": "a"})).into())
            .await;
        assert!(result.is_error());
    }

    #[tokio::test]
    async fn test_bad_parameters_name_the_action() {
        let page = shop_page();
        let result = without_script(&page)
            .dispatch(TaskFrame::action("t1", json!({"type": "click"})).into())
            .await;
        let error = result.error.expect("error");
        assert!(error.starts_with("Invalid argument: click:"), "{error}");
    }

    #[tokio::test]
    async fn test_eval_action_needs_script_access() {
        let page = shop_page();
        let result = without_script(&page)
            .dispatch(TaskFrame::action("t1", json!({"type": "eval", "code": "1"})).into())
            .await;
        assert_eq!(result.error.as_deref(), Some("Action not available: eval"));
    }

    #[tokio::test]
    async fn test_raw_expression_needs_script_access() {
        let page = shop_page();
        let result = without_script(&page)
            .dispatch(TaskFrame::code("t1", "document.title").into())
            .await;
        assert_eq!(
            result.error.as_deref(),
            Some("Script evaluation is not enabled")
        );
    }

    #[tokio::test]
    async fn test_raw_expression_with_script_access() {
        let page = shop_page();
        let result = with_script(&page)
            .dispatch(TaskFrame::code("t2", "document.title").into())
            .await;
        assert_eq!(result, TaskResult::success("t2".into(), Some(json!("Search"))));
    }

    #[tokio::test]
    async fn test_eval_action_normalizes_elements() {
        let page = shop_page();
        let result = with_script(&page)
            .dispatch(
                TaskFrame::action(
                    "t3",
                    json!({"type": "eval", "code": "document.querySelectorAll('.hit')"}),
                )
                .into(),
            )
            .await;
        assert_eq!(result.result, Some(json!(["<li class=\"hit\">socks</li>"])));
        assert_eq!(result.error, None);
    }

    #[tokio::test]
    async fn test_script_error_message_is_the_error() {
        let page = shop_page();
        let result = with_script(&page)
            .dispatch(TaskFrame::code("t4", "throw new Error('boom')").into())
            .await;
        assert_eq!(result.error.as_deref(), Some("boom"));
    }

    #[tokio::test]
    async fn test_undefined_expression_has_no_result() {
        let page = shop_page();
        let result = with_script(&page)
            .dispatch(TaskFrame::code("t5", "undefined").into())
            .await;
        assert_eq!(result, TaskResult::success("t5".into(), None));
    }

    #[tokio::test]
    async fn test_empty_task_succeeds_without_value() {
        let page = shop_page();
        let frame = TaskFrame {
            task_id: "t6".into(),
            action: None,
            code: Some(String::new()),
        };
        let result = without_script(&page).dispatch(frame.into()).await;
        assert_eq!(result, TaskResult::success("t6".into(), None));
    }

    #[tokio::test]
    async fn test_action_wins_over_code() {
        let page = shop_page();
        let frame = TaskFrame {
            task_id: "t7".into(),
            action: Some(json!({"type": "click", "selector": ".hit"})),
            code: Some("document.title".into()),
        };
        let result = with_script(&page).dispatch(frame.into()).await;
        assert_eq!(result.result, Some(json!({"clicked": ".hit"})));
    }

    #[tokio::test]
    async fn test_type_then_get_reads_back_value() {
        let page = shop_page();
        let dispatcher = without_script(&page);

        let typed = dispatcher
            .dispatch(
                TaskFrame::action(
                    "t8",
                    json!({"type": "type", "selector": "#box", "text": "hi", "delay": 0}),
                )
                .into(),
            )
            .await;
        assert_eq!(typed.result, Some(json!({"typed": "2 chars"})));

        let read = dispatcher
            .dispatch(TaskFrame::action("t9", json!({"type": "get", "selector": "#box"})).into())
            .await;
        assert_eq!(read.result, Some(json!({"text": "", "value": "hi"})));
    }

    #[tokio::test]
    async fn test_handler_error_becomes_error_text() {
        let page = shop_page();
        let result = without_script(&page)
            .dispatch(
                TaskFrame::action(
                    "t10",
                    json!({"type": "fill", "selector": "#missing", "value": "x"}),
                )
                .into(),
            )
            .await;
        assert_eq!(result.error.as_deref(), Some("Element not found: #missing"));
        assert_eq!(page.location(), "https://shop.example.com/search");
    }

    #[tokio::test]
    async fn test_zero_wait_timeout_finds_present_element() {
        let page = shop_page();
        let result = without_script(&page)
            .dispatch(
                TaskFrame::action(
                    "t11",
                    json!({"type": "wait", "selector": "#box", "timeout": 0}),
                )
                .into(),
            )
            .await;
        assert_eq!(
            result,
            TaskResult::success("t11".into(), Some(json!({"found": "#box"})))
        );
    }
}
