use std::collections::HashMap;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::warn;

use crate::codec::InboundMessage;

/// Close descriptor delivered with `disconnect` events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Disconnection {
    pub code: u16,
    pub reason: String,
    pub clean: bool,
}

impl Disconnection {
    /// The synthetic descriptor emitted for a manual disconnect.
    pub(crate) fn manual() -> Self {
        Self {
            code: 1000,
            reason: "manual disconnect".into(),
            clean: true,
        }
    }

    pub(crate) fn abnormal(reason: impl Into<String>) -> Self {
        Self {
            code: 1006,
            reason: reason.into(),
            clean: false,
        }
    }
}

/// Payload handed to registered handlers.
#[derive(Debug, Clone)]
pub enum Event {
    Connect,
    Disconnect(Disconnection),
    Error(String),
    Message(InboundMessage),
    RawMessage(String),
    ReconnectFailed,
}

/// Key a handler registers under: a lifecycle event or a message `type`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EventKey {
    Connect,
    Disconnect,
    Error,
    Message,
    RawMessage,
    ReconnectFailed,
    Type(String),
}

impl EventKey {
    /// Key for messages with the given `type` discriminator.
    pub fn message_type(name: impl Into<String>) -> Self {
        EventKey::Type(name.into())
    }
}

/// Identifies one registered handler so it can be removed individually.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HandlerId(u64);

type Handler = Arc<dyn Fn(&Event) + Send + Sync + 'static>;

/// Name-keyed publish/subscribe registry.
///
/// Handlers run synchronously in registration order. A panicking handler is
/// isolated: the panic is caught and logged, and the remaining handlers for
/// that emission still run.
///
/// Typed message events emitted through [`emit_or_buffer`] while no handler
/// is registered for their key are buffered and replayed, in arrival order,
/// to the first handler registered for that key afterwards.
///
/// [`emit_or_buffer`]: EventDispatcher::emit_or_buffer
#[derive(Default)]
pub struct EventDispatcher {
    inner: Mutex<DispatcherInner>,
    next_id: AtomicU64,
}

#[derive(Default)]
struct DispatcherInner {
    handlers: HashMap<EventKey, Vec<(HandlerId, Handler)>>,
    buffered: HashMap<EventKey, Vec<Event>>,
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, DispatcherInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register a handler; returns an id usable with [`off`](Self::off).
    pub fn on(&self, key: EventKey, handler: impl Fn(&Event) + Send + Sync + 'static) -> HandlerId {
        let id = HandlerId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let handler: Handler = Arc::new(handler);

        let replay = {
            let mut inner = self.lock();
            inner
                .handlers
                .entry(key.clone())
                .or_default()
                .push((id, Arc::clone(&handler)));
            inner.buffered.remove(&key)
        };

        if let Some(events) = replay {
            for event in &events {
                invoke(&key, &handler, event);
            }
        }

        id
    }

    /// Remove one handler, or every handler for `key` when `id` is `None`.
    pub fn off(&self, key: &EventKey, id: Option<HandlerId>) {
        let mut inner = self.lock();
        match id {
            Some(id) => {
                let now_empty = match inner.handlers.get_mut(key) {
                    Some(handlers) => {
                        handlers.retain(|(handler_id, _)| *handler_id != id);
                        handlers.is_empty()
                    }
                    None => false,
                };
                if now_empty {
                    inner.handlers.remove(key);
                }
            }
            None => {
                inner.handlers.remove(key);
            }
        }
    }

    /// Number of handlers currently registered for `key`.
    pub fn listener_count(&self, key: &EventKey) -> usize {
        self.lock().handlers.get(key).map_or(0, Vec::len)
    }

    /// Invoke every handler registered for `key`, in registration order.
    pub fn emit(&self, key: &EventKey, event: &Event) {
        let handlers: Vec<Handler> = {
            let inner = self.lock();
            match inner.handlers.get(key) {
                Some(handlers) => handlers
                    .iter()
                    .map(|(_, handler)| Arc::clone(handler))
                    .collect(),
                None => return,
            }
        };
        for handler in &handlers {
            invoke(key, handler, event);
        }
    }

    /// Like [`emit`](Self::emit), but events with no registered handler are
    /// buffered for replay instead of being dropped.
    pub fn emit_or_buffer(&self, key: &EventKey, event: &Event) {
        let handlers: Vec<Handler> = {
            let mut inner = self.lock();
            match inner.handlers.get(key) {
                Some(handlers) if !handlers.is_empty() => handlers
                    .iter()
                    .map(|(_, handler)| Arc::clone(handler))
                    .collect(),
                _ => {
                    inner
                        .buffered
                        .entry(key.clone())
                        .or_default()
                        .push(event.clone());
                    return;
                }
            }
        };
        for handler in &handlers {
            invoke(key, handler, event);
        }
    }
}

fn invoke(key: &EventKey, handler: &Handler, event: &Event) {
    if catch_unwind(AssertUnwindSafe(|| handler(event))).is_err() {
        warn!(key = ?key, "event handler panicked");
    }
}
