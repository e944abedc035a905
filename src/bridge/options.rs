//! Bridge timing options.
//!
//! Every delay and deadline the bridge uses lives here, so tests and demos
//! can shrink them without touching behavior.
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use page_bridge::BridgeOptions;
//!
//! let options = BridgeOptions::new()
//!     .with_reconnect_delay(Duration::from_millis(500))
//!     .with_wait_timeout(Duration::from_secs(5));
//!
//! assert_eq!(options.poll_interval, Duration::from_millis(100));
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::time::Duration;

// ============================================================================
// Constants
// ============================================================================

/// Delay between a channel closing and the next connection attempt.
pub const DEFAULT_RECONNECT_DELAY: Duration = Duration::from_millis(3000);

/// Upper bound on one connection attempt (TCP + WebSocket upgrade).
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Delay before a scheduled navigation, letting the result frame flush.
pub const DEFAULT_NAVIGATE_DELAY: Duration = Duration::from_millis(50);

/// Interval between element checks in a poll-mode wait.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Poll-mode wait deadline when the action names none.
pub const DEFAULT_WAIT_TIMEOUT: Duration = Duration::from_millis(10_000);

/// Per-character pause when a type action names none.
pub const DEFAULT_TYPE_DELAY: Duration = Duration::from_millis(20);

// ============================================================================
// BridgeOptions
// ============================================================================

/// Timing configuration for a bridge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BridgeOptions {
    /// Fixed delay before reconnecting. No backoff, no jitter, no cap.
    pub reconnect_delay: Duration,

    /// Connection attempt timeout.
    pub connect_timeout: Duration,

    /// Delay before a navigate action takes effect.
    pub navigate_delay: Duration,

    /// Poll interval for selector waits.
    pub poll_interval: Duration,

    /// Default selector wait deadline.
    pub wait_timeout: Duration,

    /// Default per-character typing delay.
    pub type_delay: Duration,
}

impl Default for BridgeOptions {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Constructors
// ============================================================================

impl BridgeOptions {
    /// Creates options with the standard timings.
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self {
            reconnect_delay: DEFAULT_RECONNECT_DELAY,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            navigate_delay: DEFAULT_NAVIGATE_DELAY,
            poll_interval: DEFAULT_POLL_INTERVAL,
            wait_timeout: DEFAULT_WAIT_TIMEOUT,
            type_delay: DEFAULT_TYPE_DELAY,
        }
    }
}

// ============================================================================
// Builder Methods
// ============================================================================

impl BridgeOptions {
    /// Sets the reconnect delay.
    #[inline]
    #[must_use]
    pub const fn with_reconnect_delay(mut self, delay: Duration) -> Self {
        self.reconnect_delay = delay;
        self
    }

    /// Sets the connection attempt timeout.
    #[inline]
    #[must_use]
    pub const fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Sets the navigation delay.
    #[inline]
    #[must_use]
    pub const fn with_navigate_delay(mut self, delay: Duration) -> Self {
        self.navigate_delay = delay;
        self
    }

    /// Sets the wait poll interval.
    #[inline]
    #[must_use]
    pub const fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Sets the default wait deadline.
    #[inline]
    #[must_use]
    pub const fn with_wait_timeout(mut self, timeout: Duration) -> Self {
        self.wait_timeout = timeout;
        self
    }

    /// Sets the default typing delay.
    #[inline]
    #[must_use]
    pub const fn with_type_delay(mut self, delay: Duration) -> Self {
        self.type_delay = delay;
        self
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_timings() {
        let options = BridgeOptions::new();
        assert_eq!(options.reconnect_delay.as_millis(), 3000);
        assert_eq!(options.navigate_delay.as_millis(), 50);
        assert_eq!(options.poll_interval.as_millis(), 100);
        assert_eq!(options.wait_timeout.as_millis(), 10_000);
        assert_eq!(options.type_delay.as_millis(), 20);
    }

    #[test]
    fn test_default_matches_new() {
        assert_eq!(BridgeOptions::default(), BridgeOptions::new());
    }

    #[test]
    fn test_builder_methods_chain() {
        let options = BridgeOptions::new()
            .with_reconnect_delay(Duration::from_millis(200))
            .with_connect_timeout(Duration::from_secs(1))
            .with_type_delay(Duration::ZERO);

        assert_eq!(options.reconnect_delay, Duration::from_millis(200));
        assert_eq!(options.connect_timeout, Duration::from_secs(1));
        assert_eq!(options.type_delay, Duration::ZERO);
        assert_eq!(options.wait_timeout, DEFAULT_WAIT_TIMEOUT);
    }
}
