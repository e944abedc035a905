//! Bridge entry point.
//!
//! # Components
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Bridge`] | Owns the operator connection lifecycle |
//! | [`BridgeBuilder`] | Fluent configuration builder |
//! | [`BridgeOptions`] | Delays and deadlines |

// ============================================================================
// Submodules
// ============================================================================

/// Fluent builder for bridge configuration.
pub mod builder;

/// Core bridge implementation.
pub mod core;

/// Timing options.
pub mod options;

// ============================================================================
// Re-exports
// ============================================================================

pub use builder::BridgeBuilder;
pub use core::Bridge;
pub use options::BridgeOptions;
