use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use serde_json::Value;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use partyhub_common::protocol::ClientMessage;

use crate::codec;
use crate::dispatcher::{Disconnection, Event, EventDispatcher, EventKey, HandlerId};
use crate::scheduler::{Scheduler, TimerGuard, TokioScheduler};
use crate::transport::{Connection, Connector, Frame, WsConnector};

/// Tuning knobs for a [`SocketManager`].
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Delay between automatic reconnection attempts.
    pub reconnect_interval: Duration,
    /// Automatic reconnection attempts before giving up.
    pub max_reconnect_attempts: u32,
    /// How long a correlated request stays in the pending set.
    pub request_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            reconnect_interval: Duration::from_millis(5000),
            max_reconnect_attempts: 5,
            request_timeout: Duration::from_millis(5000),
        }
    }
}

impl ClientConfig {
    #[must_use]
    pub fn with_reconnect_interval(mut self, interval: Duration) -> Self {
        self.reconnect_interval = interval;
        self
    }

    #[must_use]
    pub fn with_max_reconnect_attempts(mut self, attempts: u32) -> Self {
        self.max_reconnect_attempts = attempts;
        self
    }

    #[must_use]
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}

/// WebSocket-style readiness as reported by [`SocketManager::ready_state`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadyState {
    Connecting,
    Open,
    Closing,
    Closed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    Connecting,
    Open,
}

/// Reconnecting duplex message channel to the game-coordination server.
///
/// One manager owns at most one live connection at a time. `connect`,
/// `disconnect`, `send` and `send_request` all return immediately; outcomes
/// are observed through events registered with [`on`](Self::on):
///
/// - `connect` / `disconnect` / `error` / `reconnect_failed` for the
///   connection lifecycle,
/// - one event per inbound message `type`, followed by the generic
///   `message` event,
/// - `raw_message` for frames that could not be decoded.
///
/// The handle is cheap to clone; clones share the same connection, handler
/// registry and pending-request set. Managers must be used from within a
/// Tokio runtime.
#[derive(Clone)]
pub struct SocketManager {
    inner: Arc<Inner>,
}

/// Non-owning reference to a [`SocketManager`], for handlers that must not
/// keep the manager (and themselves) alive.
#[derive(Clone)]
pub struct WeakSocketManager {
    inner: Weak<Inner>,
}

impl WeakSocketManager {
    pub fn upgrade(&self) -> Option<SocketManager> {
        self.inner.upgrade().map(|inner| SocketManager { inner })
    }
}

struct Inner {
    config: ClientConfig,
    connector: Arc<dyn Connector>,
    scheduler: Arc<dyn Scheduler>,
    dispatcher: EventDispatcher,
    state: Mutex<ConnState>,
}

struct ConnState {
    url: Option<String>,
    phase: Phase,
    /// Bumped on every connect/disconnect so stale driver tasks and timers
    /// cannot touch a newer connection's state.
    epoch: u64,
    outbound: Option<mpsc::UnboundedSender<String>>,
    reconnect_attempts: u32,
    reconnect_timer: Option<TimerGuard>,
    pending_requests: HashMap<String, TimerGuard>,
}

impl Default for SocketManager {
    fn default() -> Self {
        Self::new()
    }
}

impl SocketManager {
    /// Manager with the default config over a real WebSocket transport.
    pub fn new() -> Self {
        Self::with_config(ClientConfig::default())
    }

    pub fn with_config(config: ClientConfig) -> Self {
        Self::with_parts(config, Arc::new(WsConnector), Arc::new(TokioScheduler))
    }

    /// Fully injected constructor; tests pass a scripted connector and a
    /// manually fired scheduler here.
    pub fn with_parts(
        config: ClientConfig,
        connector: Arc<dyn Connector>,
        scheduler: Arc<dyn Scheduler>,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                config,
                connector,
                scheduler,
                dispatcher: EventDispatcher::new(),
                state: Mutex::new(ConnState {
                    url: None,
                    phase: Phase::Idle,
                    epoch: 0,
                    outbound: None,
                    reconnect_attempts: 0,
                    reconnect_timer: None,
                    pending_requests: HashMap::new(),
                }),
            }),
        }
    }

    pub fn downgrade(&self) -> WeakSocketManager {
        WeakSocketManager {
            inner: Arc::downgrade(&self.inner),
        }
    }

    /// Record the endpoint to connect to. Ignored (with a warning) while a
    /// connection is open or being opened.
    pub fn set_server_url(&self, url: impl Into<String>) {
        let mut state = lock(&self.inner.state);
        if !matches!(state.phase, Phase::Idle) {
            warn!("cannot change server URL while connected or connecting; disconnect first");
            return;
        }
        state.url = Some(url.into());
    }

    /// Open the connection. No-op when no URL is set, or when a connection
    /// is already open or in progress.
    pub fn connect(&self) {
        connect_inner(&self.inner);
    }

    /// Close the connection and suppress automatic reconnection. Pending
    /// correlated requests are cancelled without individual events.
    pub fn disconnect(&self) {
        let inner = &self.inner;
        let had_connection = {
            let mut state = lock(&inner.state);
            if let Some(timer) = state.reconnect_timer.take() {
                timer.cancel();
            }
            state.reconnect_attempts = inner.config.max_reconnect_attempts;
            clear_pending(&mut state);
            let had_connection = !matches!(state.phase, Phase::Idle);
            state.epoch += 1;
            state.phase = Phase::Idle;
            // Dropping the sender tells the driver task to close its transport.
            state.outbound = None;
            had_connection
        };
        if had_connection {
            info!("disconnected");
            inner.dispatcher.emit(
                &EventKey::Disconnect,
                &Event::Disconnect(Disconnection::manual()),
            );
        } else {
            debug!("already disconnected");
        }
    }

    pub fn is_connected(&self) -> bool {
        matches!(lock(&self.inner.state).phase, Phase::Open)
    }

    pub fn ready_state(&self) -> ReadyState {
        match lock(&self.inner.state).phase {
            Phase::Idle => ReadyState::Closed,
            Phase::Connecting => ReadyState::Connecting,
            Phase::Open => ReadyState::Open,
        }
    }

    /// Fire-and-forget send. Returns `false` without transmitting when the
    /// connection is not open or the message cannot be serialized.
    pub fn send(&self, message: &ClientMessage) -> bool {
        let state = lock(&self.inner.state);
        let Some(tx) = open_sender(&state) else {
            warn!("cannot send message, connection is not open");
            return false;
        };
        let text = match serde_json::to_string(message) {
            Ok(text) => text,
            Err(e) => {
                error!(error = %e, "failed to serialize message");
                return false;
            }
        };
        tx.send(text).is_ok()
    }

    /// Correlated send: merges a fresh time-ordered `requestId` into the
    /// message and tracks it until the request timeout elapses.
    ///
    /// Tracking is timeout-only — inbound messages are never matched back
    /// against the pending set; collaborators observing responses do so via
    /// the `type`-keyed events.
    pub fn send_request(&self, message: &ClientMessage) -> bool {
        let inner = &self.inner;
        let mut state = lock(&inner.state);
        let Some(tx) = open_sender(&state) else {
            warn!("cannot send request, connection is not open");
            return false;
        };

        let mut object = match serde_json::to_value(message) {
            Ok(Value::Object(object)) => object,
            Ok(_) => {
                error!("request message did not serialize to a JSON object");
                return false;
            }
            Err(e) => {
                error!(error = %e, "failed to serialize request");
                return false;
            }
        };

        let request_id = Uuid::now_v7().to_string();
        object.insert("requestId".into(), Value::String(request_id.clone()));

        if tx.send(Value::Object(object).to_string()).is_err() {
            return false;
        }

        let weak = Arc::downgrade(inner);
        let timed_out = request_id.clone();
        let timer = inner.scheduler.schedule(
            inner.config.request_timeout,
            Box::new(move || {
                if let Some(inner) = weak.upgrade()
                    && lock(&inner.state).pending_requests.remove(&timed_out).is_some()
                {
                    warn!(request_id = %timed_out, "request timed out without a response");
                }
            }),
        );
        state.pending_requests.insert(request_id, timer);
        true
    }

    /// Number of correlated requests still awaiting their timeout.
    pub fn pending_request_count(&self) -> usize {
        lock(&self.inner.state).pending_requests.len()
    }

    /// Register a handler for a lifecycle event or message `type`.
    pub fn on(
        &self,
        key: EventKey,
        handler: impl Fn(&Event) + Send + Sync + 'static,
    ) -> HandlerId {
        self.inner.dispatcher.on(key, handler)
    }

    /// Remove one handler, or all handlers for the key when `id` is `None`.
    pub fn off(&self, key: &EventKey, id: Option<HandlerId>) {
        self.inner.dispatcher.off(key, id);
    }

    /// Disconnect after `delay`, unless the manager is dropped first.
    pub(crate) fn disconnect_later(&self, delay: Duration) {
        let weak = self.downgrade();
        self.inner
            .scheduler
            .schedule(
                delay,
                Box::new(move || {
                    if let Some(manager) = weak.upgrade() {
                        manager.disconnect();
                    }
                }),
            )
            .detach();
    }
}

fn lock(state: &Mutex<ConnState>) -> MutexGuard<'_, ConnState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

fn open_sender(state: &ConnState) -> Option<mpsc::UnboundedSender<String>> {
    if matches!(state.phase, Phase::Open) {
        state.outbound.clone()
    } else {
        None
    }
}

fn clear_pending(state: &mut ConnState) {
    for (_, timer) in state.pending_requests.drain() {
        timer.cancel();
    }
}

fn connect_inner(inner: &Arc<Inner>) {
    let (url, epoch) = {
        let mut state = lock(&inner.state);
        let Some(url) = state.url.clone() else {
            error!("server URL is not set; call set_server_url first");
            return;
        };
        match state.phase {
            Phase::Open => {
                debug!("already connected");
                return;
            }
            Phase::Connecting => {
                debug!("connection attempt already in progress");
                return;
            }
            Phase::Idle => {}
        }
        if let Some(timer) = state.reconnect_timer.take() {
            timer.cancel();
        }
        state.phase = Phase::Connecting;
        state.epoch += 1;
        (url, state.epoch)
    };

    info!(%url, "connecting");
    let inner = Arc::clone(inner);
    tokio::spawn(async move {
        run_connection(inner, url, epoch).await;
    });
}

/// Drives one connection from dial to close, then hands the close off to
/// the reconnect logic. A stale epoch means `disconnect` or a newer
/// `connect` superseded this task; it then backs out silently.
async fn run_connection(inner: Arc<Inner>, url: String, epoch: u64) {
    let mut conn: Box<dyn Connection> = match inner.connector.connect(&url).await {
        Ok(conn) => conn,
        Err(e) => {
            if lock(&inner.state).epoch != epoch {
                return;
            }
            error!(error = %e, "failed to open connection");
            inner
                .dispatcher
                .emit(&EventKey::Error, &Event::Error(e.to_string()));
            handle_closed(
                &inner,
                epoch,
                Disconnection::abnormal(format!("connect failed: {e}")),
            );
            return;
        }
    };

    let (tx, mut rx) = mpsc::unbounded_channel::<String>();
    let stale = {
        let mut state = lock(&inner.state);
        if state.epoch != epoch {
            true
        } else {
            state.phase = Phase::Open;
            state.reconnect_attempts = 0;
            if let Some(timer) = state.reconnect_timer.take() {
                timer.cancel();
            }
            state.outbound = Some(tx);
            false
        }
    };
    if stale {
        conn.close().await;
        return;
    }
    info!("connected");
    inner.dispatcher.emit(&EventKey::Connect, &Event::Connect);

    let close = loop {
        tokio::select! {
            outgoing = rx.recv() => match outgoing {
                Some(text) => {
                    if let Err(e) = conn.send(text).await {
                        warn!(error = %e, "failed to send frame");
                        inner
                            .dispatcher
                            .emit(&EventKey::Error, &Event::Error(e.to_string()));
                        break Disconnection::abnormal(format!("send failed: {e}"));
                    }
                }
                // Sender dropped: manual disconnect already tore the state down.
                None => {
                    conn.close().await;
                    return;
                }
            },
            incoming = conn.recv() => match incoming {
                Some(Ok(Frame::Text(text))) => dispatch_frame(&inner, &text),
                Some(Ok(Frame::Close(frame))) => {
                    break match frame {
                        Some(f) => Disconnection {
                            clean: f.code == 1000,
                            code: f.code,
                            reason: f.reason,
                        },
                        None => Disconnection::abnormal("connection closed"),
                    };
                }
                Some(Err(e)) => {
                    warn!(error = %e, "transport error");
                    inner
                        .dispatcher
                        .emit(&EventKey::Error, &Event::Error(e.to_string()));
                    break Disconnection::abnormal(format!("receive failed: {e}"));
                }
                None => break Disconnection::abnormal("connection closed"),
            },
        }
    };

    conn.close().await;
    handle_closed(&inner, epoch, close);
}

fn dispatch_frame(inner: &Inner, text: &str) {
    match codec::decode_frame(text) {
        Ok(message) => {
            debug!(message_type = message.message_type(), "message received");
            let key = EventKey::Type(message.message_type().to_owned());
            let event = Event::Message(message);
            inner.dispatcher.emit_or_buffer(&key, &event);
            inner.dispatcher.emit(&EventKey::Message, &event);
        }
        Err(e) => {
            warn!(error = %e, "failed to decode frame");
            inner
                .dispatcher
                .emit(&EventKey::RawMessage, &Event::RawMessage(text.to_owned()));
        }
    }
}

/// Unexpected-close path: clears pending requests, emits `disconnect`, then
/// either schedules a bounded retry or emits `reconnect_failed` once.
fn handle_closed(inner: &Arc<Inner>, epoch: u64, close: Disconnection) {
    {
        let mut state = lock(&inner.state);
        if state.epoch != epoch {
            return;
        }
        state.phase = Phase::Idle;
        state.outbound = None;
        clear_pending(&mut state);
    }
    info!(code = close.code, reason = %close.reason, "connection closed");
    inner
        .dispatcher
        .emit(&EventKey::Disconnect, &Event::Disconnect(close));

    let mut state = lock(&inner.state);
    // A disconnect handler may have called connect()/disconnect() already.
    if state.epoch != epoch {
        return;
    }
    if state.reconnect_attempts < inner.config.max_reconnect_attempts {
        state.reconnect_attempts += 1;
        info!(
            attempt = state.reconnect_attempts,
            max = inner.config.max_reconnect_attempts,
            "scheduling reconnect"
        );
        let weak = Arc::downgrade(inner);
        if let Some(timer) = state.reconnect_timer.take() {
            timer.cancel();
        }
        state.reconnect_timer = Some(inner.scheduler.schedule(
            inner.config.reconnect_interval,
            Box::new(move || {
                if let Some(inner) = weak.upgrade() {
                    lock(&inner.state).reconnect_timer = None;
                    connect_inner(&inner);
                }
            }),
        ));
    } else {
        drop(state);
        warn!("max reconnect attempts reached, giving up");
        inner
            .dispatcher
            .emit(&EventKey::ReconnectFailed, &Event::ReconnectFailed);
    }
}
