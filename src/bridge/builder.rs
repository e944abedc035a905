//! Builder for [`Bridge`] configuration.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use page_bridge::{Bridge, MemoryPage};
//!
//! # fn example() -> page_bridge::Result<()> {
//! let page = Arc::new(MemoryPage::new("https://shop.example.com/"));
//! let bridge = Bridge::builder().page(page).build()?;
//!
//! assert_eq!(bridge.endpoint().as_str(), "wss://admin.shop.example.com/bridge");
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;

use url::Url;

use crate::actions::{HandlerRegistry, TaskContext};
use crate::dispatch::Dispatcher;
use crate::error::{Error, Result};
use crate::page::{Page, ScriptAccess};
use crate::protocol::ActionKind;
use crate::transport::operator_url;

use super::core::Bridge;
use super::options::BridgeOptions;

// ============================================================================
// BridgeBuilder
// ============================================================================

/// Builder for a [`Bridge`].
///
/// Use [`Bridge::builder()`] to create one.
#[derive(Clone, Default)]
pub struct BridgeBuilder {
    /// Page the bridge drives.
    page: Option<Arc<dyn Page>>,
    /// Explicit operator endpoint.
    endpoint: Option<String>,
    /// Timing options.
    options: BridgeOptions,
    /// Script evaluation grant.
    script: Option<ScriptAccess>,
    /// Custom handler table.
    registry: Option<HandlerRegistry>,
}

impl fmt::Debug for BridgeBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BridgeBuilder")
            .field("page", &self.page.as_ref().map(|page| page.location()))
            .field("endpoint", &self.endpoint)
            .field("options", &self.options)
            .field("script", &self.script.is_some())
            .field("registry", &self.registry)
            .finish()
    }
}

// ============================================================================
// BridgeBuilder Implementation
// ============================================================================

impl BridgeBuilder {
    /// Creates an empty builder.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the page to drive.
    #[inline]
    #[must_use]
    pub fn page(mut self, page: Arc<dyn Page>) -> Self {
        self.page = Some(page);
        self
    }

    /// Overrides the operator endpoint instead of deriving it from the page.
    ///
    /// Accepts `ws://` and `wss://` URLs.
    #[inline]
    #[must_use]
    pub fn endpoint(mut self, url: impl Into<String>) -> Self {
        self.endpoint = Some(url.into());
        self
    }

    /// Sets timing options.
    #[inline]
    #[must_use]
    pub fn options(mut self, options: BridgeOptions) -> Self {
        self.options = options;
        self
    }

    /// Grants script evaluation.
    ///
    /// Enables raw `code` tasks and, unless a custom registry is supplied
    /// that already covers it, the `eval` action.
    #[inline]
    #[must_use]
    pub fn script_access(mut self, access: ScriptAccess) -> Self {
        self.script = Some(access);
        self
    }

    /// Replaces the standard handler table.
    #[inline]
    #[must_use]
    pub fn registry(mut self, registry: HandlerRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Builds the bridge with validation. Does not connect.
    ///
    /// # Errors
    ///
    /// - [`Error::Config`] if no page is set, the endpoint is not a
    ///   WebSocket URL, or the poll interval is zero
    /// - [`Error::Config`] if no endpoint is set and the page URL has no
    ///   host to derive one from
    /// - [`Error::Url`] if a URL does not parse
    pub fn build(self) -> Result<Bridge> {
        let page = self.validate_page()?;
        let endpoint = self.validate_endpoint(page.as_ref())?;
        self.validate_options()?;

        let mut registry = self.registry.unwrap_or_else(HandlerRegistry::standard);
        if let Some(access) = &self.script
            && !registry.contains(ActionKind::Eval)
        {
            registry = registry.with_script(access.clone());
        }

        let cx = TaskContext::new(page, self.options);
        let dispatcher = Dispatcher::new(registry, self.script, cx);

        Ok(Bridge::new(endpoint, dispatcher, self.options))
    }
}

// ============================================================================
// Validation
// ============================================================================

impl BridgeBuilder {
    fn validate_page(&self) -> Result<Arc<dyn Page>> {
        self.page.clone().ok_or_else(|| {
            Error::config(
                "A page is required. Use .page() to set it.\n\
                 Example: Bridge::builder().page(Arc::new(MemoryPage::default()))",
            )
        })
    }

    fn validate_endpoint(&self, page: &dyn Page) -> Result<Url> {
        let Some(endpoint) = &self.endpoint else {
            return operator_url(&page.location());
        };

        let url = Url::parse(endpoint)?;
        match url.scheme() {
            "ws" | "wss" => Ok(url),
            other => Err(Error::config(format!(
                "Operator endpoint must use ws:// or wss://, got {other}://"
            ))),
        }
    }

    fn validate_options(&self) -> Result<()> {
        if self.options.poll_interval.is_zero() {
            return Err(Error::config("Poll interval must be greater than zero"));
        }
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use std::time::Duration;

    use crate::page::{MemoryPage, MemoryScript};

    fn shop() -> Arc<MemoryPage> {
        Arc::new(MemoryPage::new("https://shop.example.com/cart"))
    }

    #[test]
    fn test_new_creates_empty_builder() {
        let builder = BridgeBuilder::new();
        assert!(builder.page.is_none());
        assert!(builder.endpoint.is_none());
        assert_eq!(builder.options, BridgeOptions::default());
    }

    #[test]
    fn test_build_fails_without_page() {
        let err = BridgeBuilder::new().build().unwrap_err();
        assert!(err.to_string().contains("page is required"));
    }

    #[test]
    fn test_build_derives_endpoint_from_page() {
        let bridge = BridgeBuilder::new().page(shop()).build().expect("build");
        assert_eq!(
            bridge.endpoint().as_str(),
            "wss://admin.shop.example.com/bridge"
        );
    }

    #[test]
    fn test_build_fails_for_hostless_page() {
        let err = BridgeBuilder::new()
            .page(Arc::new(MemoryPage::default()))
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
    }

    #[test]
    fn test_explicit_endpoint_wins() {
        let bridge = BridgeBuilder::new()
            .page(Arc::new(MemoryPage::default()))
            .endpoint("ws://127.0.0.1:9000/bridge")
            .build()
            .expect("build");
        assert_eq!(bridge.endpoint().as_str(), "ws://127.0.0.1:9000/bridge");
    }

    #[test]
    fn test_rejects_non_websocket_endpoint() {
        let err = BridgeBuilder::new()
            .page(shop())
            .endpoint("https://admin.shop.example.com/bridge")
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("ws:// or wss://"));
    }

    #[test]
    fn test_rejects_zero_poll_interval() {
        let err = BridgeBuilder::new()
            .page(shop())
            .options(BridgeOptions::new().with_poll_interval(Duration::ZERO))
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("Poll interval"));
    }

    #[test]
    fn test_eval_registered_only_with_script_access() {
        let page = shop();
        let plain = BridgeBuilder::new()
            .page(page.clone())
            .build()
            .expect("build");
        assert!(!plain.dispatcher().registry().contains(ActionKind::Eval));

        let scripted = BridgeBuilder::new()
            .page(page.clone())
            .script_access(ScriptAccess::trusted(MemoryScript::new(page)))
            .build()
            .expect("build");
        assert!(scripted.dispatcher().registry().contains(ActionKind::Eval));
    }

    #[test]
    fn test_builder_is_clone() {
        let builder = BridgeBuilder::new().endpoint("ws://127.0.0.1:1/");
        let cloned = builder.clone();
        assert_eq!(builder.endpoint, cloned.endpoint);
    }
}
