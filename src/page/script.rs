//! Expression evaluation capability.
//!
//! Raw `code` tasks and the `eval` action run operator-supplied code with
//! full page privileges. That power sits behind [`ScriptAccess`]: a bridge
//! built without one refuses every evaluation request, so the rest of the
//! action vocabulary can be reasoned about on its own.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::{Arc, LazyLock};

use async_trait::async_trait;
use regex::Regex;
use serde_json::Value;
use tracing::debug;

use crate::error::{Error, Result};

use super::memory::MemoryPage;
use super::{Outcome, Page};

// ============================================================================
// ScriptEngine
// ============================================================================

/// Evaluates expressions in the page's global scope.
#[async_trait]
pub trait ScriptEngine: Send + Sync {
    /// Evaluates `code` and returns its value.
    ///
    /// # Errors
    ///
    /// [`Error::Script`] carrying the evaluation failure message.
    async fn evaluate(&self, code: &str) -> Result<Outcome>;
}

// ============================================================================
// ScriptAccess
// ============================================================================

/// Grant to evaluate arbitrary operator code.
///
/// The operator channel is trusted completely once this is granted.
#[derive(Clone)]
pub struct ScriptAccess {
    engine: Arc<dyn ScriptEngine>,
}

impl fmt::Debug for ScriptAccess {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScriptAccess").finish_non_exhaustive()
    }
}

impl ScriptAccess {
    /// Grants full-privilege evaluation through `engine`.
    #[must_use]
    pub fn trusted(engine: impl ScriptEngine + 'static) -> Self {
        Self {
            engine: Arc::new(engine),
        }
    }

    /// Evaluates `code` with the granted engine.
    pub async fn evaluate(&self, code: &str) -> Result<Outcome> {
        debug!(code_len = code.len(), "Evaluating expression");
        self.engine.evaluate(code).await
    }
}

// ============================================================================
// MemoryScript
// ============================================================================

static QUERY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^document\.querySelector(All)?\(\s*(?:'([^']*)'|"([^"]*)")\s*\)$"#)
        .expect("query pattern is valid")
});

static THROW: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^throw\s+new\s+Error\(\s*(?:'([^']*)'|"([^"]*)")\s*\)$"#)
        .expect("throw pattern is valid")
});

/// Expression evaluator for a [`MemoryPage`].
///
/// Understands the handful of forms operators use to inspect a page:
///
/// | Expression | Value |
/// |------------|-------|
/// | `document.querySelector('sel')` | element or `null` |
/// | `document.querySelectorAll('sel')` | list of elements |
/// | `document.title` | title string |
/// | `location.href`, `window.location.href` | page URL |
/// | `undefined` | no value |
/// | JSON literal | the literal |
/// | `throw new Error('msg')` | fails with `msg` |
///
/// A trailing `;` is ignored. Anything else fails with
/// `Unsupported expression: …`.
#[derive(Debug, Clone)]
pub struct MemoryScript {
    page: Arc<MemoryPage>,
}

impl MemoryScript {
    /// Creates an evaluator over `page`.
    #[inline]
    #[must_use]
    pub fn new(page: Arc<MemoryPage>) -> Self {
        Self { page }
    }
}

#[async_trait]
impl ScriptEngine for MemoryScript {
    async fn evaluate(&self, code: &str) -> Result<Outcome> {
        let expr = code.trim().trim_end_matches(';').trim_end();

        if let Some(caps) = QUERY.captures(expr) {
            let selector = caps
                .get(2)
                .or_else(|| caps.get(3))
                .map_or("", |m| m.as_str());

            return if caps.get(1).is_some() {
                let elements = self.page.query_selector_all(selector).await?;
                Ok(Outcome::List(
                    elements.into_iter().map(Outcome::Element).collect(),
                ))
            } else {
                Ok(self
                    .page
                    .query_selector(selector)
                    .await?
                    .map_or(Outcome::Value(Value::Null), Outcome::Element))
            };
        }

        if let Some(caps) = THROW.captures(expr) {
            let message = caps
                .get(1)
                .or_else(|| caps.get(2))
                .map_or("", |m| m.as_str());
            return Err(Error::script(message));
        }

        match expr {
            "document.title" => Ok(Value::String(self.page.title()).into()),
            "location.href" | "window.location.href" => {
                Ok(Value::String(self.page.location()).into())
            }
            "undefined" | "" => Ok(Outcome::Undefined),
            _ => serde_json::from_str::<Value>(expr)
                .map(Outcome::Value)
                .map_err(|_| Error::script(format!("Unsupported expression: {expr}"))),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use serde_json::json;

    use crate::page::ElementSpec;

    fn fixture() -> (Arc<MemoryPage>, ScriptAccess) {
        let page = Arc::new(MemoryPage::new("https://shop.example.com/cart"));
        page.set_title("Cart");
        page.insert(ElementSpec::new("li").class("item").text("socks"))
            .expect("insert");
        page.insert(ElementSpec::new("li").class("item").text("hat"))
            .expect("insert");
        let access = ScriptAccess::trusted(MemoryScript::new(Arc::clone(&page)));
        (page, access)
    }

    #[tokio::test]
    async fn test_query_selector_returns_element() {
        let (page, access) = fixture();
        let outcome = access
            .evaluate("document.querySelector('.item')")
            .await
            .expect("evaluate");
        let first = page.query_selector(".item").await.expect("query").expect("present");
        assert_eq!(outcome, Outcome::Element(first));
    }

    #[tokio::test]
    async fn test_query_selector_all_returns_list() {
        let (page, access) = fixture();
        let outcome = access
            .evaluate("document.querySelectorAll(\"li\");")
            .await
            .expect("evaluate");
        let normalized = outcome.normalize(page.as_ref()).await.expect("normalize");
        assert_eq!(
            normalized,
            Some(json!([
                "<li class=\"item\">socks</li>",
                "<li class=\"item\">hat</li>"
            ]))
        );
    }

    #[tokio::test]
    async fn test_missing_element_is_null() {
        let (_, access) = fixture();
        let outcome = access
            .evaluate("document.querySelector('#nope')")
            .await
            .expect("evaluate");
        assert_eq!(outcome, Outcome::Value(Value::Null));
    }

    #[tokio::test]
    async fn test_globals_and_literals() {
        let (_, access) = fixture();
        assert_eq!(
            access.evaluate("document.title").await.expect("title"),
            Outcome::Value(json!("Cart"))
        );
        assert_eq!(
            access.evaluate("window.location.href").await.expect("href"),
            Outcome::Value(json!("https://shop.example.com/cart"))
        );
        assert_eq!(
            access.evaluate("[1, 2, 3]").await.expect("literal"),
            Outcome::Value(json!([1, 2, 3]))
        );
        assert_eq!(
            access.evaluate("undefined").await.expect("undefined"),
            Outcome::Undefined
        );
    }

    #[tokio::test]
    async fn test_throw_forwards_message() {
        let (_, access) = fixture();
        let err = access
            .evaluate("throw new Error('checkout closed')")
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "checkout closed");
    }

    #[tokio::test]
    async fn test_unsupported_expression() {
        let (_, access) = fixture();
        let err = access.evaluate("fetch('/api')").await.unwrap_err();
        assert_eq!(err.to_string(), "Unsupported expression: fetch('/api')");
    }
}
