//! Bridge coordinator.
//!
//! The [`Bridge`] owns the connection manager's lifecycle: it starts the
//! connect / reconnect loop, exposes the connection state and client
//! identity, and stops the loop on shutdown.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use page_bridge::{Bridge, MemoryPage};
//!
//! # async fn example() -> page_bridge::Result<()> {
//! let page = Arc::new(MemoryPage::new("https://shop.example.com/"));
//! let bridge = Bridge::builder().page(page).build()?;
//!
//! bridge.connect();
//! // ... the operator drives the page ...
//! bridge.shutdown().await;
//! # Ok(())
//! # }
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info};
use url::Url;

use crate::dispatch::Dispatcher;
use crate::identifiers::ClientId;
use crate::transport::{ConnectionManager, ConnectionState, LinkStatus};

use super::builder::BridgeBuilder;
use super::options::BridgeOptions;

// ============================================================================
// Types
// ============================================================================

/// Internal shared state for the bridge.
pub(crate) struct BridgeInner {
    /// Operator endpoint.
    endpoint: Url,

    /// Task router shared with every session.
    dispatcher: Dispatcher,

    /// Timing options.
    options: BridgeOptions,

    /// State and identity published by the manager.
    status: Arc<LinkStatus>,

    /// Stop signal for the manager loop.
    shutdown: watch::Sender<bool>,

    /// Running manager loop, if any.
    manager: Mutex<Option<JoinHandle<()>>>,
}

// ============================================================================
// Bridge
// ============================================================================

/// Page agent connected to a remote operator.
///
/// Cloning is cheap and every clone controls the same connection. Dropping
/// the last clone stops the manager loop.
#[derive(Clone)]
pub struct Bridge {
    /// Shared inner state.
    pub(crate) inner: Arc<BridgeInner>,
}

// ============================================================================
// Bridge - Display
// ============================================================================

impl fmt::Debug for Bridge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Bridge")
            .field("endpoint", &self.inner.endpoint.as_str())
            .field("state", &self.state())
            .field("client_id", &self.client_id())
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Bridge - Public API
// ============================================================================

impl Bridge {
    /// Creates a configuration builder.
    #[inline]
    #[must_use]
    pub fn builder() -> BridgeBuilder {
        BridgeBuilder::new()
    }

    /// Starts the connection manager.
    ///
    /// Idempotent: returns `false` without side effects when the manager is
    /// already running (connecting, open, or waiting to reconnect).
    ///
    /// # Panics
    ///
    /// Must be called from within a tokio runtime.
    pub fn connect(&self) -> bool {
        let mut manager = self.inner.manager.lock();
        if manager.as_ref().is_some_and(|handle| !handle.is_finished()) {
            debug!("Connection manager already running");
            return false;
        }

        self.inner.shutdown.send_replace(false);
        let run = ConnectionManager::new(
            self.inner.endpoint.clone(),
            self.inner.dispatcher.clone(),
            self.inner.options,
            Arc::clone(&self.inner.status),
            self.inner.shutdown.subscribe(),
        );

        info!(endpoint = %self.inner.endpoint, "Starting connection manager");
        *manager = Some(tokio::spawn(run.run()));
        true
    }

    /// Stops the manager, closing the channel and aborting in-flight tasks.
    ///
    /// Returns once the loop has exited; the state is then
    /// [`ConnectionState::Closed`]. A later [`connect`](Self::connect)
    /// starts over.
    pub async fn shutdown(&self) {
        self.inner.shutdown.send_replace(true);

        let handle = self.inner.manager.lock().take();
        if let Some(handle) = handle {
            let _ = handle.await;
        }

        debug!("Bridge shut down");
    }

    /// Returns `true` while the manager loop runs.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.inner
            .manager
            .lock()
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Current connection state.
    #[inline]
    #[must_use]
    pub fn state(&self) -> ConnectionState {
        self.inner.status.state()
    }

    /// Watches connection state changes.
    #[inline]
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<ConnectionState> {
        self.inner.status.subscribe()
    }

    /// Identity assigned by the operator on the current connection.
    ///
    /// `None` until the `welcome` arrives and again after every drop.
    #[inline]
    #[must_use]
    pub fn client_id(&self) -> Option<ClientId> {
        self.inner.status.client_id()
    }

    /// Operator endpoint.
    #[inline]
    #[must_use]
    pub fn endpoint(&self) -> &Url {
        &self.inner.endpoint
    }

    /// Timing options.
    #[inline]
    #[must_use]
    pub fn options(&self) -> &BridgeOptions {
        &self.inner.options
    }

    /// Task router, for running tasks without a channel.
    #[inline]
    #[must_use]
    pub fn dispatcher(&self) -> &Dispatcher {
        &self.inner.dispatcher
    }
}

// ============================================================================
// Bridge - Internal
// ============================================================================

impl Bridge {
    pub(crate) fn new(endpoint: Url, dispatcher: Dispatcher, options: BridgeOptions) -> Self {
        let (shutdown, _) = watch::channel(false);

        Self {
            inner: Arc::new(BridgeInner {
                endpoint,
                dispatcher,
                options,
                status: Arc::new(LinkStatus::default()),
                shutdown,
                manager: Mutex::new(None),
            }),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
