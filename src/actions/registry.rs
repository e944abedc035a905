//! Kind → handler table.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::page::ScriptAccess;
use crate::protocol::ActionKind;

use super::{
    ActionHandler, ClickHandler, EvalHandler, FillHandler, GetHandler, NavigateHandler,
    TypeHandler, WaitHandler,
};

// ============================================================================
// HandlerRegistry
// ============================================================================

/// Maps each [`ActionKind`] to the handler that implements it.
///
/// # Example
///
/// ```
/// use page_bridge::{ActionKind, HandlerRegistry};
///
/// let registry = HandlerRegistry::standard();
/// assert!(registry.contains(ActionKind::Fill));
/// // `eval` needs an explicit script grant
/// assert!(!registry.contains(ActionKind::Eval));
/// ```
#[derive(Clone, Default)]
pub struct HandlerRegistry {
    handlers: FxHashMap<ActionKind, Arc<dyn ActionHandler>>,
}

impl fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerRegistry")
            .field("kinds", &self.kinds())
            .finish()
    }
}

impl HandlerRegistry {
    /// Creates an empty registry.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every DOM action: navigate, fill, click, type, wait, get.
    #[must_use]
    pub fn standard() -> Self {
        let mut registry = Self::new();
        registry.register(ActionKind::Navigate, NavigateHandler);
        registry.register(ActionKind::Fill, FillHandler);
        registry.register(ActionKind::Click, ClickHandler);
        registry.register(ActionKind::Type, TypeHandler);
        registry.register(ActionKind::Wait, WaitHandler);
        registry.register(ActionKind::Get, GetHandler);
        registry
    }

    /// Adds the `eval` action backed by `access`.
    #[must_use]
    pub fn with_script(mut self, access: ScriptAccess) -> Self {
        self.register(ActionKind::Eval, EvalHandler::new(access));
        self
    }

    /// Registers `handler` for `kind`, returning the handler it replaced.
    pub fn register(
        &mut self,
        kind: ActionKind,
        handler: impl ActionHandler + 'static,
    ) -> Option<Arc<dyn ActionHandler>> {
        self.handlers.insert(kind, Arc::new(handler))
    }

    /// Removes the handler for `kind`.
    pub fn unregister(&mut self, kind: ActionKind) -> Option<Arc<dyn ActionHandler>> {
        self.handlers.remove(&kind)
    }

    /// Handler for `kind`, if registered.
    #[inline]
    #[must_use]
    pub fn get(&self, kind: ActionKind) -> Option<Arc<dyn ActionHandler>> {
        self.handlers.get(&kind).cloned()
    }

    /// Returns `true` if `kind` has a handler.
    #[inline]
    #[must_use]
    pub fn contains(&self, kind: ActionKind) -> bool {
        self.handlers.contains_key(&kind)
    }

    /// Registered kinds, sorted.
    #[must_use]
    pub fn kinds(&self) -> Vec<ActionKind> {
        let mut kinds: Vec<_> = self.handlers.keys().copied().collect();
        kinds.sort_unstable();
        kinds
    }
}

// ============================================================================
// Tests
// ============================================================================
