//! Page driver façade.
//!
//! Every action handler talks to the page exclusively through the [`Page`]
//! trait: a thin set of DOM query, mutate and event-dispatch primitives.
//! Hosting the bridge over a different DOM means implementing this one
//! trait.
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `memory` | In-memory DOM on a `scraper` document ([`MemoryPage`]) |
//! | `cdp` | Live browser tab over the DevTools protocol (`cdp` feature) |
//! | `script` | Expression evaluation capability ([`ScriptAccess`]) |

// ============================================================================
// Submodules
// ============================================================================

/// In-memory DOM implementation.
pub mod memory;

/// Chrome DevTools Protocol backend.
#[cfg(feature = "cdp")]
pub mod cdp;

/// Expression evaluation capability.
pub mod script;

// ============================================================================
// Imports
// ============================================================================

use async_trait::async_trait;
use futures_util::future::BoxFuture;
use serde_json::Value;

use crate::error::{Error, Result};
use crate::identifiers::ElementRef;

// ============================================================================
// Re-exports
// ============================================================================

#[cfg(feature = "cdp")]
pub use cdp::{CdpPage, CdpScript};
pub use memory::{ElementSpec, MemoryPage};
pub use script::{MemoryScript, ScriptAccess, ScriptEngine};

// ============================================================================
// EventKind
// ============================================================================

/// DOM notification events the bridge dispatches or records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// `input` event (bubbling).
    Input,
    /// `change` event (bubbling).
    Change,
    /// `click` activation.
    Click,
    /// `focus` event.
    Focus,
}

impl EventKind {
    /// Returns the DOM event type name.
    #[inline]
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Input => "input",
            Self::Change => "change",
            Self::Click => "click",
            Self::Focus => "focus",
        }
    }
}

// ============================================================================
// Page
// ============================================================================

/// DOM primitives the action handlers are written against.
///
/// Implementations must be shareable across tasks; concurrent handlers
/// call into the same page.
#[async_trait]
pub trait Page: Send + Sync {
    /// Current page URL.
    fn location(&self) -> String;

    /// First element in document order matching `selector`.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidSelector`] if the selector cannot be parsed.
    async fn query_selector(&self, selector: &str) -> Result<Option<ElementRef>>;

    /// All elements matching `selector`, in document order.
    async fn query_selector_all(&self, selector: &str) -> Result<Vec<ElementRef>>;

    /// Current `value` property, `None` when the element has none.
    async fn value(&self, element: ElementRef) -> Result<Option<String>>;

    /// Assigns the `value` property.
    async fn set_value(&self, element: ElementRef, value: &str) -> Result<()>;

    /// Dispatches a notification event on the element.
    async fn dispatch_event(&self, element: ElementRef, event: EventKind) -> Result<()>;

    /// Runs the element's default activation.
    async fn click(&self, element: ElementRef) -> Result<()>;

    /// Moves focus to the element.
    async fn focus(&self, element: ElementRef) -> Result<()>;

    /// Rendered text of the element and its descendants.
    async fn inner_text(&self, element: ElementRef) -> Result<String>;

    /// Markup of the element's children.
    async fn inner_html(&self, element: ElementRef) -> Result<String>;

    /// Markup of the element itself.
    async fn outer_html(&self, element: ElementRef) -> Result<String>;

    /// Navigates the page to `url`.
    async fn navigate(&self, url: &str) -> Result<()>;

    /// Like [`query_selector`](Self::query_selector), but absence is an error.
    ///
    /// # Errors
    ///
    /// [`Error::ElementNotFound`] naming the selector.
    async fn require(&self, selector: &str) -> Result<ElementRef> {
        self.query_selector(selector)
            .await?
            .ok_or_else(|| Error::element_not_found(selector))
    }
}

// ============================================================================
// Outcome
// ============================================================================

/// Success value of a handler or evaluation, before wire normalization.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// No value; the result frame omits `result`.
    Undefined,
    /// Plain JSON value.
    Value(Value),
    /// A single element handle.
    Element(ElementRef),
    /// A list-like collection (node list or array).
    List(Vec<Outcome>),
}

impl Outcome {
    /// Normalizes for the wire: elements become their outer markup.
    ///
    /// Returns `None` for [`Outcome::Undefined`]. Inside lists an undefined
    /// entry becomes `null`.
    ///
    /// # Errors
    ///
    /// Propagates page errors (e.g. a stale element handle).
    pub async fn normalize(self, page: &dyn Page) -> Result<Option<Value>> {
        match self {
            Self::Undefined => Ok(None),
            other => other.into_value(page).await.map(Some),
        }
    }

    // Boxed for the recursion through nested lists.
    fn into_value(self, page: &dyn Page) -> BoxFuture<'_, Result<Value>> {
        Box::pin(async move {
            match self {
                Self::Undefined => Ok(Value::Null),
                Self::Value(value) => Ok(value),
                Self::Element(element) => page.outer_html(element).await.map(Value::String),
                Self::List(items) => {
                    let mut values = Vec::with_capacity(items.len());
                    for item in items {
                        values.push(item.into_value(page).await?);
                    }
                    Ok(Value::Array(values))
                }
            }
        })
    }
}

impl From<Value> for Outcome {
    fn from(value: Value) -> Self {
        Self::Value(value)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use serde_json::json;

    #[test]
    fn test_event_kind_names() {
        assert_eq!(EventKind::Input.as_str(), "input");
        assert_eq!(EventKind::Change.as_str(), "change");
    }

    #[tokio::test]
    async fn test_normalize_element_and_list() {
        let page = MemoryPage::new("https://shop.example.com/");
        let item = page
            .insert(ElementSpec::new("li").class("item").text("one"))
            .expect("insert");

        let single = Outcome::Element(item)
            .normalize(&page)
            .await
            .expect("normalize");
        assert_eq!(single, Some(json!("<li class=\"item\">one</li>")));

        let list = Outcome::List(vec![
            Outcome::Element(item),
            Outcome::Value(json!(3)),
            Outcome::Undefined,
        ]);
        assert_eq!(
            list.normalize(&page).await.expect("normalize"),
            Some(json!(["<li class=\"item\">one</li>", 3, null]))
        );
    }

    #[tokio::test]
    async fn test_normalize_nested_lists() {
        let page = MemoryPage::default();
        let nested = Outcome::List(vec![Outcome::List(vec![Outcome::Undefined]), json!("x").into()]);
        assert_eq!(
            nested.normalize(&page).await.expect("normalize"),
            Some(json!([[null], "x"]))
        );
    }

    #[tokio::test]
    async fn test_normalize_undefined_is_absent() {
        let page = MemoryPage::default();
        assert_eq!(
            Outcome::Undefined.normalize(&page).await.expect("normalize"),
            None
        );
    }

    #[tokio::test]
    async fn test_require_reports_selector() {
        let page = MemoryPage::default();
        let err = page.require("#missing").await.unwrap_err();
        assert_eq!(err.to_string(), "Element not found: #missing");
    }
}
