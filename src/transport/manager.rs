//! Connection lifecycle and reconnection.
//!
//! ```text
//!   ┌────────────┐  open   ┌──────┐  close/error  ┌────────┐
//!   │ Connecting │────────►│ Open │──────────────►│ Closed │
//!   └────────────┘         └──────┘               └────────┘
//!         ▲   │ failed                                 │
//!         │   └───────────────────────────────────────►│
//!         └──────────── reconnect delay ───────────────┘
//! ```
//!
//! The manager is one sequential loop: an attempt only starts after the
//! previous session ended and the fixed reconnect delay elapsed, so two
//! attempts can never overlap.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::net::TcpStream;
use tokio::sync::watch;
use tokio::time::{sleep, timeout};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tracing::{debug, info, warn};
use url::Url;

use crate::bridge::BridgeOptions;
use crate::dispatch::Dispatcher;
use crate::error::{Error, Result};
use crate::identifiers::ClientId;

use super::connection::{SessionEnd, run_session};

// ============================================================================
// Types
// ============================================================================

/// Client socket to the operator.
type OperatorStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

// ============================================================================
// ConnectionState
// ============================================================================

/// Lifecycle state of the operator channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ConnectionState {
    /// An attempt is in progress.
    Connecting,
    /// The channel is open.
    Open,
    /// No channel; a reconnect may be pending.
    #[default]
    Closed,
}

impl ConnectionState {
    /// Returns `true` when the channel is open.
    #[inline]
    #[must_use]
    pub const fn is_open(self) -> bool {
        matches!(self, Self::Open)
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Connecting => "connecting",
            Self::Open => "open",
            Self::Closed => "closed",
        })
    }
}

// ============================================================================
// LinkStatus
// ============================================================================

/// State and identity shared between the manager and its owner.
#[derive(Debug)]
pub(crate) struct LinkStatus {
    state: watch::Sender<ConnectionState>,
    client_id: Mutex<Option<ClientId>>,
}

impl Default for LinkStatus {
    fn default() -> Self {
        Self {
            state: watch::Sender::new(ConnectionState::Closed),
            client_id: Mutex::new(None),
        }
    }
}

impl LinkStatus {
    pub(crate) fn state(&self) -> ConnectionState {
        *self.state.borrow()
    }

    pub(crate) fn subscribe(&self) -> watch::Receiver<ConnectionState> {
        self.state.subscribe()
    }

    pub(crate) fn set_state(&self, state: ConnectionState) {
        let previous = self.state.send_replace(state);
        if previous != state {
            debug!(from = %previous, to = %state, "Connection state changed");
        }
    }

    pub(crate) fn client_id(&self) -> Option<ClientId> {
        self.client_id.lock().clone()
    }

    pub(crate) fn set_client_id(&self, client_id: Option<ClientId>) {
        *self.client_id.lock() = client_id;
    }
}

// ============================================================================
// ConnectionManager
// ============================================================================

/// Owns the connect / session / reconnect loop.
pub(crate) struct ConnectionManager {
    endpoint: Url,
    dispatcher: Dispatcher,
    options: BridgeOptions,
    status: Arc<LinkStatus>,
    shutdown: watch::Receiver<bool>,
}

impl ConnectionManager {
    pub(crate) fn new(
        endpoint: Url,
        dispatcher: Dispatcher,
        options: BridgeOptions,
        status: Arc<LinkStatus>,
        shutdown: watch::Receiver<bool>,
    ) -> Self {
        Self {
            endpoint,
            dispatcher,
            options,
            status,
            shutdown,
        }
    }

    /// Runs until shutdown.
    pub(crate) async fn run(mut self) {
        let mut attempt: u64 = 0;

        while !*self.shutdown.borrow() {
            attempt += 1;
            self.status.set_state(ConnectionState::Connecting);
            debug!(endpoint = %self.endpoint, attempt, "Connecting to operator");

            let connected = tokio::select! {
                connected = connect(&self.endpoint, self.options.connect_timeout) => Some(connected),
                _ = self.shutdown.changed() => None,
            };

            let end = match connected {
                Some(Ok(ws_stream)) => {
                    info!(endpoint = %self.endpoint, "Operator channel open");
                    self.status.set_state(ConnectionState::Open);
                    run_session(ws_stream, &self.dispatcher, &self.status, &mut self.shutdown).await
                }
                Some(Err(e)) => {
                    warn!(endpoint = %self.endpoint, error = %e, "Connection attempt failed");
                    SessionEnd::Closed
                }
                None => SessionEnd::Shutdown,
            };

            self.status.set_client_id(None);
            self.status.set_state(ConnectionState::Closed);

            if end == SessionEnd::Shutdown {
                break;
            }

            debug!(
                delay_ms = self.options.reconnect_delay.as_millis() as u64,
                "Reconnect scheduled"
            );
            tokio::select! {
                () = sleep(self.options.reconnect_delay) => {}
                _ = self.shutdown.changed() => break,
            }
        }

        self.status.set_state(ConnectionState::Closed);
        info!("Connection manager stopped");
    }
}

/// Opens the WebSocket within `connect_timeout`.
async fn connect(endpoint: &Url, connect_timeout: Duration) -> Result<OperatorStream> {
    let (ws_stream, _response) = timeout(connect_timeout, connect_async(endpoint.as_str()))
        .await
        .map_err(|_| Error::connection_timeout(connect_timeout.as_millis() as u64))?
        .map_err(|e| Error::connection(e.to_string()))?;
    Ok(ws_stream)
}
