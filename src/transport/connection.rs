//! One operator channel session.
//!
//! A session owns an open WebSocket from the `hello` it sends until the
//! channel ends. It never blocks on a task: every `task` frame is spawned
//! into an in-flight set and reading continues, so a slow wait does not
//! hold up a quick click behind it.
//!
//! # Event Loop
//!
//! - Incoming `welcome` frames record the assigned client id
//! - Incoming `task` frames spawn a dispatch
//! - Finished dispatches are written back as `result` frames
//! - Shutdown closes the channel politely
//!
//! When the session ends every task still in flight is aborted; their
//! results belong to a channel that no longer exists.

// ============================================================================
// Imports
// ============================================================================

use std::panic::AssertUnwindSafe;

use futures_util::stream::SplitSink;
use futures_util::{FutureExt, SinkExt, StreamExt};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::watch;
use tokio::task::JoinSet;
use tokio_tungstenite::WebSocketStream;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, info, trace, warn};

use crate::dispatch::Dispatcher;
use crate::error::Result;
use crate::protocol::{ClientMessage, ServerMessage, Task, TaskFrame, TaskResult};

use super::manager::LinkStatus;

// ============================================================================
// Types
// ============================================================================

/// Write half of a session's socket.
type FrameSink<S> = SplitSink<WebSocketStream<S>, Message>;

/// Why a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SessionEnd {
    /// Remote close, stream error or end of stream.
    Closed,
    /// Local shutdown request.
    Shutdown,
}

// ============================================================================
// Session
// ============================================================================

/// Runs one session over an established WebSocket.
pub(crate) async fn run_session<S>(
    ws_stream: WebSocketStream<S>,
    dispatcher: &Dispatcher,
    status: &LinkStatus,
    shutdown: &mut watch::Receiver<bool>,
) -> SessionEnd
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let (mut ws_write, mut ws_read) = ws_stream.split();

    let hello = ClientMessage::Hello {
        url: dispatcher.context().page().location(),
    };
    if let Err(e) = send_frame(&mut ws_write, &hello).await {
        warn!(error = %e, "Failed to send hello");
        return SessionEnd::Closed;
    }

    let mut in_flight: JoinSet<TaskResult> = JoinSet::new();

    let end = loop {
        tokio::select! {
            // Frames from the operator
            message = ws_read.next() => {
                match message {
                    Some(Ok(Message::Text(text))) => {
                        handle_text(text.as_str(), dispatcher, status, &mut in_flight);
                    }

                    Some(Ok(Message::Close(_))) => {
                        debug!("Channel closed by operator");
                        break SessionEnd::Closed;
                    }

                    Some(Err(e)) => {
                        warn!(error = %e, "Channel error");
                        break SessionEnd::Closed;
                    }

                    None => {
                        debug!("Channel stream ended");
                        break SessionEnd::Closed;
                    }

                    // Binary, Ping, Pong, Frame
                    _ => {}
                }
            }

            // Finished tasks
            Some(joined) = in_flight.join_next(), if !in_flight.is_empty() => {
                let Ok(result) = joined else {
                    continue;
                };

                trace!(task_id = %result.task_id, "Sending result");
                if let Err(e) = send_frame(&mut ws_write, &ClientMessage::Result(result)).await {
                    warn!(error = %e, "Failed to send result");
                    break SessionEnd::Closed;
                }
            }

            // Local shutdown
            _ = shutdown.changed() => {
                debug!("Shutdown requested");
                let _ = ws_write.close().await;
                break SessionEnd::Shutdown;
            }
        }
    };

    let abandoned = in_flight.len();
    in_flight.abort_all();
    if abandoned > 0 {
        debug!(abandoned, "Aborted in-flight tasks");
    }

    end
}

/// Handles one text frame from the operator.
fn handle_text(
    text: &str,
    dispatcher: &Dispatcher,
    status: &LinkStatus,
    in_flight: &mut JoinSet<TaskResult>,
) {
    match ServerMessage::parse(text) {
        Ok(ServerMessage::Welcome { client_id }) => {
            info!(%client_id, "Registered with operator");
            status.set_client_id(Some(client_id));
        }

        Ok(ServerMessage::Task(frame)) => spawn_task(frame, dispatcher, in_flight),

        Err(e) => warn!(error = %e, text = %text, "Ignoring malformed frame"),
    }
}

/// Spawns a task's dispatch into the in-flight set.
fn spawn_task(frame: TaskFrame, dispatcher: &Dispatcher, in_flight: &mut JoinSet<TaskResult>) {
    let task = Task::from(frame);
    let dispatcher = dispatcher.clone();
    debug!(task_id = %task.id, in_flight = in_flight.len() + 1, "Task received");

    in_flight.spawn(async move {
        let id = task.id.clone();
        AssertUnwindSafe(dispatcher.dispatch(task))
            .catch_unwind()
            .await
            .unwrap_or_else(|_| TaskResult::failure(id, "Task handler panicked"))
    });
}

/// Serializes and sends one frame.
async fn send_frame<S>(ws_write: &mut FrameSink<S>, message: &ClientMessage) -> Result<()>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let json = message.to_json()?;
    ws_write.send(Message::Text(json.into())).await?;
    Ok(())
}
