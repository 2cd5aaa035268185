//! WebSocket connection and event loop.
//!
//! This module handles the WebSocket connection to the browser's DevTools
//! endpoint, including command/response correlation and per-session event
//! routing.
//!
//! # Event Loop
//!
//! The connection spawns a tokio task that handles:
//!
//! - Incoming messages from the browser (responses, events)
//! - Outgoing commands from the Rust API
//! - Request/response correlation by numeric id
//! - Routing events into the channel subscribed for their `sessionId`

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;
use std::time::Duration;

use futures_util::stream::SplitSink;
use futures_util::{SinkExt, StreamExt};
use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use serde_json::{Value, from_str, to_string};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::{mpsc, oneshot};
use tokio::time::timeout;
use tokio_tungstenite::WebSocketStream;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, error, trace, warn};

use crate::error::{Error, Result};
use crate::identifiers::{CommandId, SessionId};
use crate::protocol::{Command, Event, Request, Response};

// ============================================================================
// Constants
// ============================================================================

/// Default timeout for command execution.
const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_secs(30);

/// Maximum pending commands before rejecting new ones.
const MAX_PENDING_REQUESTS: usize = 100;

// ============================================================================
// Types
// ============================================================================

/// Map of command ids to response channels.
type CorrelationMap = FxHashMap<CommandId, oneshot::Sender<Result<Response>>>;

/// Map of session ids to event channels. `None` is the browser itself.
type SubscriptionMap = FxHashMap<Option<SessionId>, mpsc::UnboundedSender<Event>>;

// ============================================================================
// ConnectionCommand
// ============================================================================

/// Internal commands for the event loop.
enum ConnectionCommand {
    /// Send a request and wait for response.
    Send {
        request: Request,
        response_tx: oneshot::Sender<Result<Response>>,
    },
    /// Remove a timed-out correlation entry.
    RemoveCorrelation(CommandId),
    /// Shutdown the connection.
    Shutdown,
}

// ============================================================================
// Connection
// ============================================================================

/// WebSocket connection to a browser's DevTools endpoint.
///
/// Handles request/response correlation and event routing.
/// The connection spawns an internal event loop task.
///
/// # Thread Safety
///
/// `Connection` is `Send + Sync` and can be shared across tasks.
/// All operations are non-blocking.
pub struct Connection {
    /// Channel for sending commands to the event loop.
    command_tx: mpsc::UnboundedSender<ConnectionCommand>,
    /// Correlation map (shared with event loop).
    correlation: Arc<Mutex<CorrelationMap>>,
    /// Event subscriptions (shared with event loop).
    subscriptions: Arc<Mutex<SubscriptionMap>>,
}

impl Clone for Connection {
    fn clone(&self) -> Self {
        Self {
            command_tx: self.command_tx.clone(),
            correlation: Arc::clone(&self.correlation),
            subscriptions: Arc::clone(&self.subscriptions),
        }
    }
}

impl Connection {
    /// Connects to a DevTools WebSocket URL.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Connection`] if the handshake fails.
    pub async fn connect(ws_url: &str) -> Result<Self> {
        let (ws_stream, _) = tokio_tungstenite::connect_async(ws_url)
            .await
            .map_err(|e| Error::connection(format!("WebSocket connect to {ws_url} failed: {e}")))?;

        debug!(url = %ws_url, "DevTools WebSocket connected");

        Ok(Self::new(ws_stream))
    }

    /// Creates a new connection from a WebSocket stream.
    ///
    /// Spawns the event loop task internally.
    pub(crate) fn new<S>(ws_stream: WebSocketStream<S>) -> Self
    where
        S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
    {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let correlation = Arc::new(Mutex::new(CorrelationMap::default()));
        let subscriptions = Arc::new(Mutex::new(SubscriptionMap::default()));

        tokio::spawn(Self::run_event_loop(
            ws_stream,
            command_rx,
            Arc::clone(&correlation),
            Arc::clone(&subscriptions),
        ));

        Self {
            command_tx,
            correlation,
            subscriptions,
        }
    }

    /// Subscribes to the events of one session.
    ///
    /// Pass `None` for browser-level events. A later subscription for the
    /// same session replaces the earlier one. The receiver yields `None` once
    /// the connection is gone.
    pub fn subscribe(&self, session_id: Option<SessionId>) -> mpsc::UnboundedReceiver<Event> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.subscriptions.lock().insert(session_id, tx);
        rx
    }

    /// Removes the subscription of a session.
    pub fn unsubscribe(&self, session_id: &Option<SessionId>) {
        self.subscriptions.lock().remove(session_id);
    }

    /// Executes a command and returns its `result` object.
    ///
    /// # Errors
    ///
    /// - [`Error::Protocol`] if the browser answered with an error
    /// - any error of [`Connection::send`]
    pub async fn execute(&self, session_id: Option<&SessionId>, command: Command) -> Result<Value> {
        let method = command.method();
        let request = Request::new(session_id.cloned(), command);

        trace!(id = %request.id, method, "Executing command");

        self.send(request).await?.into_result()
    }

    /// Sends a request and waits for response with default timeout (30s).
    ///
    /// # Errors
    ///
    /// - [`Error::ConnectionClosed`] if connection is closed
    /// - [`Error::RequestTimeout`] if response not received within timeout
    /// - [`Error::Protocol`] if too many pending requests
    pub async fn send(&self, request: Request) -> Result<Response> {
        self.send_with_timeout(request, DEFAULT_COMMAND_TIMEOUT)
            .await
    }

    /// Sends a request and waits for response with custom timeout.
    ///
    /// # Errors
    ///
    /// - [`Error::ConnectionClosed`] if connection is closed
    /// - [`Error::RequestTimeout`] if response not received within timeout
    /// - [`Error::Protocol`] if too many pending requests
    pub async fn send_with_timeout(
        &self,
        request: Request,
        request_timeout: Duration,
    ) -> Result<Response> {
        let command_id = request.id;

        {
            let correlation = self.correlation.lock();
            if correlation.len() >= MAX_PENDING_REQUESTS {
                warn!(
                    pending = correlation.len(),
                    max = MAX_PENDING_REQUESTS,
                    "Too many pending requests"
                );
                return Err(Error::protocol(format!(
                    "Too many pending requests: {}/{}",
                    correlation.len(),
                    MAX_PENDING_REQUESTS
                )));
            }
        }

        let (response_tx, response_rx) = oneshot::channel();

        self.command_tx
            .send(ConnectionCommand::Send {
                request,
                response_tx,
            })
            .map_err(|_| Error::ConnectionClosed)?;

        match timeout(request_timeout, response_rx).await {
            Ok(Ok(result)) => result,
            Ok(Err(_)) => Err(Error::ConnectionClosed),
            Err(_) => {
                let _ = self
                    .command_tx
                    .send(ConnectionCommand::RemoveCorrelation(command_id));

                Err(Error::request_timeout(
                    command_id,
                    request_timeout.as_millis() as u64,
                ))
            }
        }
    }

    /// Returns the number of pending requests.
    #[inline]
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.correlation.lock().len()
    }

    /// Returns `true` while the event loop is running.
    #[inline]
    #[must_use]
    pub fn is_open(&self) -> bool {
        !self.command_tx.is_closed()
    }

    /// Shuts down the connection.
    ///
    /// Pending commands fail with [`Error::ConnectionClosed`] and every
    /// event channel is closed.
    pub fn shutdown(&self) {
        let _ = self.command_tx.send(ConnectionCommand::Shutdown);
    }

    /// Event loop that handles WebSocket I/O.
    async fn run_event_loop<S>(
        ws_stream: WebSocketStream<S>,
        mut command_rx: mpsc::UnboundedReceiver<ConnectionCommand>,
        correlation: Arc<Mutex<CorrelationMap>>,
        subscriptions: Arc<Mutex<SubscriptionMap>>,
    ) where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        let (mut ws_write, mut ws_read) = ws_stream.split();

        loop {
            tokio::select! {
                message = ws_read.next() => {
                    match message {
                        Some(Ok(Message::Text(text))) => {
                            Self::handle_incoming_message(&text, &correlation, &subscriptions);
                        }

                        Some(Ok(Message::Close(_))) => {
                            debug!("WebSocket closed by remote");
                            break;
                        }

                        Some(Err(e)) => {
                            error!(error = %e, "WebSocket error");
                            break;
                        }

                        None => {
                            debug!("WebSocket stream ended");
                            break;
                        }

                        // Binary, Ping, Pong
                        _ => {}
                    }
                }

                command = command_rx.recv() => {
                    match command {
                        Some(ConnectionCommand::Send { request, response_tx }) => {
                            Self::handle_send_command(
                                request,
                                response_tx,
                                &mut ws_write,
                                &correlation,
                            ).await;
                        }

                        Some(ConnectionCommand::RemoveCorrelation(command_id)) => {
                            correlation.lock().remove(&command_id);
                            debug!(%command_id, "Removed timed-out correlation");
                        }

                        Some(ConnectionCommand::Shutdown) => {
                            debug!("Shutdown command received");
                            let _ = ws_write.close().await;
                            break;
                        }

                        None => {
                            debug!("Command channel closed");
                            break;
                        }
                    }
                }
            }
        }

        command_rx.close();
        Self::fail_pending_requests(&correlation);
        subscriptions.lock().clear();

        debug!("Event loop terminated");
    }

    /// Handles an incoming text message from the browser.
    fn handle_incoming_message(
        text: &str,
        correlation: &Arc<Mutex<CorrelationMap>>,
        subscriptions: &Arc<Mutex<SubscriptionMap>>,
    ) {
        if let Ok(response) = from_str::<Response>(text) {
            let tx = correlation.lock().remove(&response.id);

            match tx {
                Some(tx) => {
                    let _ = tx.send(Ok(response));
                }
                None => warn!(id = %response.id, "Response for unknown request"),
            }
            return;
        }

        if let Ok(event) = from_str::<Event>(text) {
            let mut subscriptions = subscriptions.lock();

            // Detach notices arrive on the parent session; the detached one
            // is the subscriber that has to hear about it.
            let key = match event.detached_session() {
                Some(detached) if subscriptions.contains_key(&Some(detached.clone())) => {
                    Some(detached)
                }
                _ => event.session_id.clone(),
            };

            match subscriptions.get(&key) {
                Some(tx) => {
                    if tx.send(event).is_err() {
                        subscriptions.remove(&key);
                        trace!(session = ?key, "Subscriber gone, dropped subscription");
                    }
                }
                None => trace!(method = %event.method, session = ?key, "Event without subscriber"),
            }
            return;
        }

        warn!(text = %text, "Failed to parse incoming message");
    }

    /// Handles a send command from the Rust API.
    async fn handle_send_command<S>(
        request: Request,
        response_tx: oneshot::Sender<Result<Response>>,
        ws_write: &mut SplitSink<WebSocketStream<S>, Message>,
        correlation: &Arc<Mutex<CorrelationMap>>,
    ) where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        let command_id = request.id;

        let json = match to_string(&request) {
            Ok(j) => j,
            Err(e) => {
                let _ = response_tx.send(Err(Error::Json(e)));
                return;
            }
        };

        // Registered before sending so a fast response cannot be missed.
        correlation.lock().insert(command_id, response_tx);

        if let Err(e) = ws_write.send(Message::Text(json.into())).await
            && let Some(tx) = correlation.lock().remove(&command_id)
        {
            let _ = tx.send(Err(Error::connection(e.to_string())));
        }

        trace!(%command_id, "Request sent");
    }

    /// Fails all pending requests with ConnectionClosed error.
    fn fail_pending_requests(correlation: &Arc<Mutex<CorrelationMap>>) {
        let pending: Vec<_> = correlation.lock().drain().collect();
        let count = pending.len();

        for (_, tx) in pending {
            let _ = tx.send(Err(Error::ConnectionClosed));
        }

        if count > 0 {
            debug!(count, "Failed pending requests on shutdown");
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
