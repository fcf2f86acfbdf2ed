//! Shared test doubles: a scripted connector and event recording helpers.
#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{Notify, mpsc};

use partyhub_client::{
    ClientConfig, ClientError, CloseFrame, Connection, Connector, Event, EventKey, Frame,
    ManualScheduler, SocketManager,
};

/// Outcome for one `Connector::connect` call. Calls beyond the scripted
/// queue succeed immediately.
pub enum ConnectScript {
    Ok,
    Fail(String),
    /// Park the dial until the notify is signalled, then succeed.
    Hold(Arc<Notify>),
}

#[derive(Clone, Default)]
pub struct MockConnector {
    inner: Arc<Mutex<MockInner>>,
}

#[derive(Default)]
struct MockInner {
    script: VecDeque<ConnectScript>,
    calls: usize,
    last_url: Option<String>,
    sessions: Vec<MockSession>,
}

/// Test-side handle to one accepted connection.
#[derive(Clone)]
pub struct MockSession {
    sent: Arc<Mutex<Vec<String>>>,
    closed: Arc<Mutex<bool>>,
    frames: mpsc::UnboundedSender<Result<Frame, ClientError>>,
}

impl MockSession {
    pub fn push_text(&self, text: &str) {
        let _ = self.frames.send(Ok(Frame::Text(text.to_owned())));
    }

    pub fn push_error(&self, message: &str) {
        let _ = self
            .frames
            .send(Err(ClientError::TransportReceive(message.to_owned())));
    }

    pub fn push_close(&self, code: u16, reason: &str) {
        let _ = self.frames.send(Ok(Frame::Close(Some(CloseFrame {
            code,
            reason: reason.to_owned(),
        }))));
    }

    pub fn sent(&self) -> Vec<String> {
        self.sent.lock().unwrap().clone()
    }

    pub fn sent_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }

    pub fn was_closed(&self) -> bool {
        *self.closed.lock().unwrap()
    }
}

impl MockConnector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn script(&self, outcome: ConnectScript) {
        self.inner.lock().unwrap().script.push_back(outcome);
    }

    pub fn connect_calls(&self) -> usize {
        self.inner.lock().unwrap().calls
    }

    pub fn last_url(&self) -> Option<String> {
        self.inner.lock().unwrap().last_url.clone()
    }

    pub fn session(&self, index: usize) -> MockSession {
        self.inner.lock().unwrap().sessions[index].clone()
    }

    pub fn session_count(&self) -> usize {
        self.inner.lock().unwrap().sessions.len()
    }

    fn open_session(&self) -> Result<Box<dyn Connection>, ClientError> {
        let (tx, rx) = mpsc::unbounded_channel();
        let sent = Arc::new(Mutex::new(Vec::new()));
        let closed = Arc::new(Mutex::new(false));
        let session = MockSession {
            sent: Arc::clone(&sent),
            closed: Arc::clone(&closed),
            frames: tx,
        };
        self.inner.lock().unwrap().sessions.push(session);
        Ok(Box::new(MockConnection { sent, closed, frames: rx }))
    }
}

struct MockConnection {
    sent: Arc<Mutex<Vec<String>>>,
    closed: Arc<Mutex<bool>>,
    frames: mpsc::UnboundedReceiver<Result<Frame, ClientError>>,
}

#[async_trait]
impl Connection for MockConnection {
    async fn send(&mut self, text: String) -> Result<(), ClientError> {
        self.sent.lock().unwrap().push(text);
        Ok(())
    }

    async fn recv(&mut self) -> Option<Result<Frame, ClientError>> {
        self.frames.recv().await
    }

    async fn close(&mut self) {
        *self.closed.lock().unwrap() = true;
    }
}

#[async_trait]
impl Connector for MockConnector {
    async fn connect(&self, url: &str) -> Result<Box<dyn Connection>, ClientError> {
        let outcome = {
            let mut inner = self.inner.lock().unwrap();
            inner.calls += 1;
            inner.last_url = Some(url.to_owned());
            inner.script.pop_front()
        };
        match outcome {
            Some(ConnectScript::Fail(message)) => Err(ClientError::Connect(message)),
            Some(ConnectScript::Hold(notify)) => {
                notify.notified().await;
                self.open_session()
            }
            Some(ConnectScript::Ok) | None => self.open_session(),
        }
    }
}

/// Manager wired to a scripted connector and a manually fired scheduler.
pub fn test_manager(config: ClientConfig) -> (SocketManager, MockConnector, ManualScheduler) {
    let connector = MockConnector::new();
    let scheduler = ManualScheduler::new();
    let manager = SocketManager::with_parts(
        config,
        Arc::new(connector.clone()),
        Arc::new(scheduler.clone()),
    );
    (manager, connector, scheduler)
}

/// Subscribe to `keys` and collect everything they emit on one channel.
pub fn record_events(
    manager: &SocketManager,
    keys: &[EventKey],
) -> mpsc::UnboundedReceiver<(EventKey, Event)> {
    let (tx, rx) = mpsc::unbounded_channel();
    for key in keys {
        let tx = tx.clone();
        let recorded = key.clone();
        manager.on(key.clone(), move |event| {
            let _ = tx.send((recorded.clone(), event.clone()));
        });
    }
    rx
}

pub async fn next_event(
    rx: &mut mpsc::UnboundedReceiver<(EventKey, Event)>,
) -> (EventKey, Event) {
    tokio::time::timeout(Duration::from_secs(2), rx.recv())
        .await
        .expect("timed out waiting for an event")
        .expect("event channel closed")
}

/// Let spawned tasks drain, then assert nothing further was emitted.
pub async fn assert_no_event(rx: &mut mpsc::UnboundedReceiver<(EventKey, Event)>) {
    for _ in 0..50 {
        tokio::task::yield_now().await;
    }
    if let Ok(event) = rx.try_recv() {
        panic!("unexpected event: {event:?}");
    }
}

/// Busy-wait (cooperatively) until `condition` holds.
pub async fn wait_until(condition: impl Fn() -> bool) {
    tokio::time::timeout(Duration::from_secs(5), async {
        while !condition() {
            tokio::task::yield_now().await;
        }
    })
    .await
    .expect("condition not reached in time");
}
