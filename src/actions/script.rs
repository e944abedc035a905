//! Expression evaluation action.

use async_trait::async_trait;

use crate::error::Result;
use crate::page::{Outcome, ScriptAccess};
use crate::protocol::{Action, ActionKind};

use super::{ActionHandler, TaskContext, mismatch};

// ============================================================================
// EvalHandler
// ============================================================================

/// Evaluates the action's `code` through a granted [`ScriptAccess`].
///
/// Only registered when the bridge is built with script access.
#[derive(Debug, Clone)]
pub struct EvalHandler {
    access: ScriptAccess,
}

impl EvalHandler {
    /// Creates the handler from a script grant.
    #[inline]
    #[must_use]
    pub fn new(access: ScriptAccess) -> Self {
        Self { access }
    }
}

#[async_trait]
impl ActionHandler for EvalHandler {
    async fn handle(&self, action: Action, _cx: &TaskContext) -> Result<Outcome> {
        let Action::Eval { code } = action else {
            return Err(mismatch(ActionKind::Eval, &action));
        };

        self.access.evaluate(&code).await
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
    use crate::page::{MemoryPage, MemoryScript};

    fn handler(page: &Arc<MemoryPage>) -> EvalHandler {
        EvalHandler::new(ScriptAccess::trusted(MemoryScript::new(Arc::clone(page))))
    }

    #[tokio::test]
    async fn test_eval_returns_value() {
        let page = Arc::new(MemoryPage::default());
        page.set_title("Checkout");

        let outcome = handler(&page)
            .handle(
                Action::Eval {
                    code: "document.title".into(),
                },
                &context(&page),
            )
            .await
            .expect("eval");
        assert_eq!(outcome, Outcome::Value(json!("Checkout")));
    }

    #[tokio::test]
    async fn test_eval_propagates_message() {
        let page = Arc::new(MemoryPage::default());
        let err = handler(&page)
            .handle(
                Action::Eval {
                    code: "throw new Error(\"cart is empty\")".into(),
                },
                &context(&page),
            )
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "cart is empty");
    }
}
