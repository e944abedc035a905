//! Element reads.

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::error::Result;
use crate::page::Outcome;
use crate::protocol::{Action, ActionKind};

use super::{ActionHandler, TaskContext, mismatch};

// ============================================================================
// GetHandler
// ============================================================================

/// Reads `{text, value, html}` from an element.
///
/// `value` is omitted when the element has no value property; `html`
/// (inner markup) only appears when the action asks for it.
#[derive(Debug, Clone, Copy, Default)]
pub struct GetHandler;

#[async_trait]
impl ActionHandler for GetHandler {
    async fn handle(&self, action: Action, cx: &TaskContext) -> Result<Outcome> {
        let Action::Get { selector, html } = action else {
            return Err(mismatch(ActionKind::Get, &action));
        };

        let page = cx.page();
        let element = page.require(&selector).await?;

        let mut fields = Map::new();
        fields.insert("text".into(), Value::String(page.inner_text(element).await?));
        if let Some(value) = page.value(element).await? {
            fields.insert("value".into(), Value::String(value));
        }
        if html {
            fields.insert("html".into(), Value::String(page.inner_html(element).await?));
        }

        Ok(Value::Object(fields).into())
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
    use crate::page::{ElementSpec, MemoryPage};

    fn product_page() -> Arc<MemoryPage> {
        let page = Arc::new(MemoryPage::new("https://shop.example.com/p/1"));
        let card = page
            .insert(ElementSpec::new("div").id("card").text("Wool socks "))
            .expect("insert");
        page.insert(ElementSpec::new("b").text("$9").child_of(card))
            .expect("insert");
        page.insert(ElementSpec::new("input").id("qty").value("2"))
            .expect("insert");
        page
    }

    fn get(selector: &str, html: bool) -> Action {
        Action::Get {
            selector: selector.into(),
            html,
        }
    }

    #[tokio::test]
    async fn test_get_text_without_value() {
        let page = product_page();
        let outcome = GetHandler
            .handle(get("#card", false), &context(&page))
            .await
            .expect("get");
        assert_eq!(outcome, Outcome::Value(json!({"text": "Wool socks $9"})));
    }

    #[tokio::test]
    async fn test_get_with_html() {
        let page = product_page();
        let outcome = GetHandler
            .handle(get("#card", true), &context(&page))
            .await
            .expect("get");
        assert_eq!(
            outcome,
            Outcome::Value(json!({"text": "Wool socks $9", "html": "Wool socks <b>$9</b>"}))
        );
    }

    #[tokio::test]
    async fn test_get_form_value() {
        let page = product_page();
        let outcome = GetHandler
            .handle(get("#qty", false), &context(&page))
            .await
            .expect("get");
        assert_eq!(outcome, Outcome::Value(json!({"text": "", "value": "2"})));
    }

    #[tokio::test]
    async fn test_get_missing_element() {
        let page = product_page();
        let err = GetHandler
            .handle(get("#gone", false), &context(&page))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Element not found: #gone");
    }
}
