//! Error types for the page bridge.
//!
//! This module defines all error types used throughout the crate.
//!
//! # Usage
//!
//! All fallible operations return [`Result<T>`] which uses [`Error`]:
//!
//! ```ignore
//! use page_bridge::{Page, Result};
//!
//! async fn read_box(page: &dyn Page) -> Result<Option<String>> {
//!     let element = page.require("#box").await?;
//!     page.value(element).await
//! }
//! ```
//!
//! # Error Categories
//!
//! | Category | Variants |
//! |----------|----------|
//! | Configuration | [`Error::Config`] |
//! | Connection | [`Error::Connection`], [`Error::ConnectionTimeout`], [`Error::ConnectionClosed`] |
//! | Protocol | [`Error::Protocol`], [`Error::UnknownAction`], [`Error::ActionUnavailable`], [`Error::InvalidArgument`] |
//! | Page | [`Error::ElementNotFound`], [`Error::StaleElement`], [`Error::InvalidSelector`], [`Error::Navigation`] |
//! | Execution | [`Error::WaitTimeout`], [`Error::Script`], [`Error::ScriptDisabled`] |
//! | External | [`Error::Json`], [`Error::Url`], [`Error::WebSocket`] |
//!
//! The `Display` text of page and execution errors is what the operator
//! receives in a result's `error` field, so those strings are part of the
//! wire contract.

// ============================================================================
// Imports
// ============================================================================

use std::result::Result as StdResult;

use thiserror::Error;
use tokio_tungstenite::tungstenite::Error as WsError;

use crate::identifiers::ElementRef;

// ============================================================================
// Result Alias
// ============================================================================

/// Result type alias using crate [`enum@Error`].
///
/// All fallible operations in this crate return this type.
pub type Result<T> = StdResult<T, Error>;

// ============================================================================
// Error Enum
// ============================================================================

/// Main error type for the crate.
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// Configuration error.
    ///
    /// Returned when bridge configuration is invalid.
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the configuration error.
        message: String,
    },

    // ========================================================================
    // Connection Errors
    // ========================================================================
    /// WebSocket connection failed.
    #[error("Connection failed: {message}")]
    Connection {
        /// Description of the connection error.
        message: String,
    },

    /// Connection attempt did not complete in time.
    #[error("Connection timeout after {timeout_ms}ms")]
    ConnectionTimeout {
        /// Milliseconds waited before timeout.
        timeout_ms: u64,
    },

    /// WebSocket connection closed while a reply was outstanding.
    #[error("Connection closed")]
    ConnectionClosed,

    // ========================================================================
    // Protocol Errors
    // ========================================================================
    /// Malformed or unexpected frame.
    #[error("Protocol error: {message}")]
    Protocol {
        /// Description of the protocol violation.
        message: String,
    },

    /// Action tag outside the known action vocabulary.
    #[error("Unknown action: {tag}")]
    UnknownAction {
        /// The unrecognized tag.
        tag: String,
    },

    /// Known action with no handler registered for it.
    #[error("Action not available: {tag}")]
    ActionUnavailable {
        /// The action tag.
        tag: String,
    },

    /// Invalid action parameters.
    #[error("Invalid argument: {message}")]
    InvalidArgument {
        /// Description of the invalid argument.
        message: String,
    },

    // ========================================================================
    // Page Errors
    // ========================================================================
    /// No element matches the selector.
    #[error("Element not found: {selector}")]
    ElementNotFound {
        /// CSS selector used.
        selector: String,
    },

    /// Element handle no longer refers to a live element.
    #[error("Stale element: {element}")]
    StaleElement {
        /// The stale handle.
        element: ElementRef,
    },

    /// Selector could not be parsed.
    #[error("Invalid selector: {selector}")]
    InvalidSelector {
        /// The rejected selector.
        selector: String,
    },

    /// The page refused or failed a navigation.
    #[error("Navigation to {url} failed: {message}")]
    Navigation {
        /// Target URL.
        url: String,
        /// Failure reported by the page.
        message: String,
    },

    // ========================================================================
    // Execution Errors
    // ========================================================================
    /// Poll-mode wait deadline passed before the element appeared.
    #[error("Timeout waiting for: {selector}")]
    WaitTimeout {
        /// Selector that was polled for.
        selector: String,
        /// Milliseconds waited before timeout.
        timeout_ms: u64,
    },

    /// Expression evaluation failed.
    ///
    /// Displays the evaluation failure message verbatim.
    #[error("{message}")]
    Script {
        /// Error message from the evaluation.
        message: String,
    },

    /// Expression evaluation was requested but no script access was granted.
    #[error("Script evaluation is not enabled")]
    ScriptDisabled,

    // ========================================================================
    // External Errors
    // ========================================================================
    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// URL parse error.
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),

    /// WebSocket error.
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] WsError),
}

// ============================================================================
// Error Constructors
// ============================================================================

impl Error {
    /// Creates a configuration error.
    #[inline]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Creates a connection error.
    #[inline]
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Creates a connection timeout error.
    #[inline]
    pub fn connection_timeout(timeout_ms: u64) -> Self {
        Self::ConnectionTimeout { timeout_ms }
    }

    /// Creates a protocol error.
    #[inline]
    pub fn protocol(message: impl Into<String>) -> Self {
        Self::Protocol {
            message: message.into(),
        }
    }

    /// Creates an unknown action error.
    #[inline]
    pub fn unknown_action(tag: impl Into<String>) -> Self {
        Self::UnknownAction { tag: tag.into() }
    }

    /// Creates an action unavailable error.
    #[inline]
    pub fn action_unavailable(tag: impl Into<String>) -> Self {
        Self::ActionUnavailable { tag: tag.into() }
    }

    /// Creates an invalid argument error.
    #[inline]
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Creates an element not found error.
    #[inline]
    pub fn element_not_found(selector: impl Into<String>) -> Self {
        Self::ElementNotFound {
            selector: selector.into(),
        }
    }

    /// Creates a stale element error.
    #[inline]
    pub fn stale_element(element: ElementRef) -> Self {
        Self::StaleElement { element }
    }

    /// Creates an invalid selector error.
    #[inline]
    pub fn invalid_selector(selector: impl Into<String>) -> Self {
        Self::InvalidSelector {
            selector: selector.into(),
        }
    }

    /// Creates a navigation error.
    #[inline]
    pub fn navigation(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Navigation {
            url: url.into(),
            message: message.into(),
        }
    }

    /// Creates a wait timeout error.
    #[inline]
    pub fn wait_timeout(selector: impl Into<String>, timeout_ms: u64) -> Self {
        Self::WaitTimeout {
            selector: selector.into(),
            timeout_ms,
        }
    }

    /// Creates a script error.
    #[inline]
    pub fn script(message: impl Into<String>) -> Self {
        Self::Script {
            message: message.into(),
        }
    }
}

// ============================================================================
// Error Predicates
// ============================================================================

impl Error {
    /// Returns `true` if this is a timeout error.
    #[inline]
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            Self::ConnectionTimeout { .. } | Self::WaitTimeout { .. }
        )
    }

    /// Returns `true` if this is an element error.
    ///
    /// Element errors are routine task outcomes (the operator asked for
    /// something the page does not have).
    #[inline]
    #[must_use]
    pub fn is_element_error(&self) -> bool {
        matches!(
            self,
            Self::ElementNotFound { .. } | Self::StaleElement { .. } | Self::InvalidSelector { .. }
        )
    }

    /// Returns `true` if this is a connection error.
    ///
    /// Covers both the operator channel and a page backend's own channel.
    #[inline]
    #[must_use]
    pub fn is_connection_error(&self) -> bool {
        matches!(
            self,
            Self::Connection { .. }
                | Self::ConnectionTimeout { .. }
                | Self::ConnectionClosed
                | Self::WebSocket(_)
        )
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_element_not_found_display() {
        let err = Error::element_not_found("#missing");
        assert_eq!(err.to_string(), "Element not found: #missing");
    }

    #[test]
    fn test_wait_timeout_display() {
        let err = Error::wait_timeout("#late", 500);
        assert_eq!(err.to_string(), "Timeout waiting for: #late");
    }

    #[test]
    fn test_script_error_is_verbatim() {
        let err = Error::script("boom is not defined");
        assert_eq!(err.to_string(), "boom is not defined");
    }

    #[test]
    fn test_unknown_action_display() {
        let err = Error::unknown_action("hover");
        assert_eq!(err.to_string(), "Unknown action: hover");
    }

    #[test]
    fn test_is_timeout() {
        assert!(Error::wait_timeout("#x", 10).is_timeout());
        assert!(Error::connection_timeout(1000).is_timeout());
        assert!(!Error::element_not_found("#x").is_timeout());
    }

    #[test]
    fn test_is_connection_error() {
        assert!(Error::connection("refused").is_connection_error());
        assert!(Error::ConnectionClosed.is_connection_error());
        assert!(!Error::script("x").is_connection_error());
    }

    #[test]
    fn test_is_element_error() {
        assert!(Error::element_not_found("#a").is_element_error());
        assert!(Error::invalid_selector("##").is_element_error());
        assert!(!Error::ScriptDisabled.is_element_error());
    }

    #[test]
    fn test_navigation_display() {
        let err = Error::navigation("https://x.example/", "net::ERR_ABORTED");
        assert_eq!(
            err.to_string(),
            "Navigation to https://x.example/ failed: net::ERR_ABORTED"
        );
        assert!(!err.is_element_error());
    }

    #[test]
    fn test_from_json_error() {
        let json_err = serde_json::from_str::<String>("invalid").unwrap_err();
        let err: Error = json_err.into();
        assert!(matches!(err, Error::Json(_)));
    }

    #[test]
    fn test_from_url_error() {
        let url_err = url::Url::parse("not a url").unwrap_err();
        let err: Error = url_err.into();
        assert!(matches!(err, Error::Url(_)));
    }
}
