//! Type-safe identifiers.
//!
//! Newtype wrappers keep task ids, client ids and element handles from
//! being mixed up at compile time.
//!
//! | Type | Issued by | Lifetime |
//! |------|-----------|----------|
//! | [`TaskId`] | Operator | One task |
//! | [`ClientId`] | Operator (`welcome`) | One open connection |
//! | [`ElementRef`] | [`Page`](crate::Page) implementation | Until the element is removed |

// ============================================================================
// Imports
// ============================================================================

use std::fmt;

use serde::{Deserialize, Serialize};

// ============================================================================
// TaskId
// ============================================================================

/// Opaque task identifier used to correlate a result with its task.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(String);

impl TaskId {
    /// Creates a task id from any string.
    #[inline]
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the id as a string slice.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TaskId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

// ============================================================================
// ClientId
// ============================================================================

/// Opaque client identity assigned by the operator on handshake.
///
/// Meaningless across reconnects: every `hello` gets a fresh one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClientId(String);

impl ClientId {
    /// Creates a client id from any string.
    #[inline]
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the id as a string slice.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ============================================================================
// ElementRef
// ============================================================================

/// Handle to an element owned by a [`Page`](crate::Page).
///
/// Cheap to copy. A handle outlives its element; using it after removal
/// yields [`Error::StaleElement`](crate::Error::StaleElement).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementRef(u64);

impl ElementRef {
    /// Wraps a raw page-specific index.
    #[inline]
    #[must_use]
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns the raw page-specific index.
    #[inline]
    #[must_use]
    pub const fn as_raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ElementRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "element#{}", self.0)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_id_is_transparent() {
        let id: TaskId = serde_json::from_str("\"t-42\"").expect("parse");
        assert_eq!(id.as_str(), "t-42");
        assert_eq!(serde_json::to_string(&id).expect("serialize"), "\"t-42\"");
    }

    #[test]
    fn test_client_id_display() {
        let id = ClientId::new("c1");
        assert_eq!(id.to_string(), "c1");
    }

    #[test]
    fn test_element_ref_round_trip_raw() {
        let el = ElementRef::from_raw(7);
        assert_eq!(el.as_raw(), 7);
        assert_eq!(el.to_string(), "element#7");
    }
}
