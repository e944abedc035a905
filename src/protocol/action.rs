//! Structured action vocabulary.
//!
//! Actions arrive as JSON objects tagged by `type`:
//!
//! | Tag | Fields |
//! |-----|--------|
//! | `navigate` | `url` |
//! | `fill` | `selector`, `value` |
//! | `click` | `selector` |
//! | `type` | `selector`, `text`, `delay?` |
//! | `wait` | `selector?`, `timeout?`, `ms?` |
//! | `eval` | `code` |
//! | `get` | `selector`, `html?` |
//!
//! The tag set is closed ([`ActionKind`]); anything else is rejected as an
//! unknown action rather than ignored.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};

// ============================================================================
// ActionKind
// ============================================================================

/// The closed set of action tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ActionKind {
    /// `navigate`
    Navigate,
    /// `fill`
    Fill,
    /// `click`
    Click,
    /// `type`
    Type,
    /// `wait`
    Wait,
    /// `eval`
    Eval,
    /// `get`
    Get,
}

impl ActionKind {
    /// Every kind, in declaration order.
    pub const ALL: [Self; 7] = [
        Self::Navigate,
        Self::Fill,
        Self::Click,
        Self::Type,
        Self::Wait,
        Self::Eval,
        Self::Get,
    ];

    /// Returns the wire tag.
    #[inline]
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Navigate => "navigate",
            Self::Fill => "fill",
            Self::Click => "click",
            Self::Type => "type",
            Self::Wait => "wait",
            Self::Eval => "eval",
            Self::Get => "get",
        }
    }

    /// Looks up a kind by wire tag.
    #[must_use]
    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == tag)
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Action
// ============================================================================

/// A structured command the bridge knows how to execute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Action {
    /// Navigate the page to `url`.
    Navigate {
        /// Target URL.
        url: String,
    },

    /// Set an element's value and fire `input` + `change`.
    Fill {
        /// CSS selector.
        selector: String,
        /// Value to assign; non-strings are written as their JSON text.
        #[serde(default)]
        value: Value,
    },

    /// Activate an element.
    Click {
        /// CSS selector.
        selector: String,
    },

    /// Type text one character at a time.
    Type {
        /// CSS selector.
        selector: String,
        /// Text to append.
        text: String,
        /// Pause after each character, in milliseconds.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        delay: Option<u64>,
    },

    /// Poll for an element, or sleep.
    Wait {
        /// Poll for this selector. Takes priority over `ms`.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        selector: Option<String>,
        /// Poll deadline in milliseconds.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        timeout: Option<u64>,
        /// Sleep duration in milliseconds.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        ms: Option<u64>,
    },

    /// Evaluate an expression in the page.
    Eval {
        /// Expression source.
        code: String,
    },

    /// Read text, value and optionally markup from an element.
    Get {
        /// CSS selector.
        selector: String,
        /// Include inner markup.
        #[serde(default, skip_serializing_if = "std::ops::Not::not")]
        html: bool,
    },
}

impl Action {
    /// Returns this action's kind.
    #[must_use]
    pub const fn kind(&self) -> ActionKind {
        match self {
            Self::Navigate { .. } => ActionKind::Navigate,
            Self::Fill { .. } => ActionKind::Fill,
            Self::Click { .. } => ActionKind::Click,
            Self::Type { .. } => ActionKind::Type,
            Self::Wait { .. } => ActionKind::Wait,
            Self::Eval { .. } => ActionKind::Eval,
            Self::Get { .. } => ActionKind::Get,
        }
    }

    /// Decodes a raw action object.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidArgument`] if the `type` tag is missing or the
    ///   parameters do not fit the action
    /// - [`Error::UnknownAction`] if the tag is not in the vocabulary
    pub fn from_value(raw: Value) -> Result<Self> {
        let kind = {
            let tag = raw
                .get("type")
                .and_then(Value::as_str)
                .ok_or_else(|| Error::invalid_argument("action is missing its `type` tag"))?;
            ActionKind::from_tag(tag).ok_or_else(|| Error::unknown_action(tag))?
        };

        serde_json::from_value(raw)
            .map_err(|e| Error::invalid_argument(format!("{kind}: {e}")))
    }
}

// ============================================================================
// Tests
// ============================================================================
