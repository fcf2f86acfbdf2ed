mod common;

use std::sync::Arc;

use common::{next_event, record_events, test_manager, wait_until};
use partyhub_client::{
    AdminClient, AdminStore, ClientConfig, EventKey, SurvivorClient, UserClient, UserStore,
};

const ADMIN_URL: &str = "ws://localhost:8080/ws/game/admin";
const USER_URL: &str = "ws://localhost:8080/ws/game/user/ROOM42";
const SURVIVOR_URL: &str = "ws://localhost:8080/ws/game/survivor";

async fn open(manager: &partyhub_client::SocketManager, url: &str) {
    let mut events = record_events(manager, &[EventKey::Connect]);
    manager.set_server_url(url);
    manager.connect();
    let _ = next_event(&mut events).await;
}

#[tokio::test]
async fn admin_builders_require_an_identity() {
    let (manager, connector, _scheduler) = test_manager(ClientConfig::default());
    open(&manager, ADMIN_URL).await;

    let admin = AdminClient::with_manager(manager, Arc::new(AdminStore::new()));

    assert!(!admin.join());
    assert!(!admin.init_session(Some(3)));
    assert!(!admin.start_game());
    assert!(!admin.reconnect());

    for _ in 0..50 {
        tokio::task::yield_now().await;
    }
    assert_eq!(connector.session(0).sent_count(), 0);
    assert_eq!(admin.manager().pending_request_count(), 0);
}

#[tokio::test]
async fn admin_join_sends_a_correlated_request() {
    let (manager, connector, _scheduler) = test_manager(ClientConfig::default());
    open(&manager, ADMIN_URL).await;

    let store = Arc::new(AdminStore::new());
    store.set_administrator_id("admin-7");
    let admin = AdminClient::with_manager(manager, store);

    assert!(admin.join());
    assert_eq!(admin.manager().pending_request_count(), 1);

    let session = connector.session(0);
    wait_until(|| session.sent_count() == 1).await;

    let sent: serde_json::Value = serde_json::from_str(&session.sent()[0]).unwrap();
    assert_eq!(sent["type"], "ADMIN_JOIN");
    assert_eq!(sent["administratorId"], "admin-7");
    assert!(sent["requestId"].is_string());
}

#[tokio::test]
async fn admin_builders_assemble_the_session_control_messages() {
    let (manager, connector, _scheduler) = test_manager(ClientConfig::default());
    open(&manager, ADMIN_URL).await;

    let store = Arc::new(AdminStore::new());
    store.set_administrator_id("admin-7");
    let admin = AdminClient::with_manager(manager, store);

    assert!(admin.init_session(Some(5)));
    assert!(admin.start_game());
    assert!(admin.reconnect());

    let session = connector.session(0);
    wait_until(|| session.sent_count() == 3).await;

    let sent: Vec<serde_json::Value> = session
        .sent()
        .iter()
        .map(|text| serde_json::from_str(text).unwrap())
        .collect();
    assert_eq!(sent[0]["type"], "INIT");
    assert_eq!(sent[0]["totalRound"], 5);
    assert_eq!(sent[1]["type"], "START_GAME");
    assert_eq!(sent[2]["type"], "ADMIN_RECONNECT");
    for message in &sent {
        assert_eq!(message["administratorId"], "admin-7");
        assert!(message["requestId"].is_string());
    }
}

#[tokio::test]
async fn user_join_reads_the_stored_nickname() {
    let (manager, connector, _scheduler) = test_manager(ClientConfig::default());
    open(&manager, USER_URL).await;

    let store = Arc::new(UserStore::new());
    store.set_nickname("Ada");
    let user = UserClient::with_manager(manager, store);

    assert!(user.join());

    let session = connector.session(0);
    wait_until(|| session.sent_count() == 1).await;

    let sent: serde_json::Value = serde_json::from_str(&session.sent()[0]).unwrap();
    assert_eq!(sent["type"], "USER_JOIN");
    assert_eq!(sent["nickname"], "Ada");
    assert!(sent["requestId"].is_string());
}

#[tokio::test]
async fn user_builders_require_their_identity_values() {
    let (manager, connector, _scheduler) = test_manager(ClientConfig::default());
    open(&manager, USER_URL).await;

    let user = UserClient::with_manager(manager, Arc::new(UserStore::new()));

    assert!(!user.join());
    assert!(!user.submit(42, "survivor"));
    assert!(!user.reconnect());
    assert!(!user.broadcast("hello"));

    for _ in 0..50 {
        tokio::task::yield_now().await;
    }
    assert_eq!(connector.session(0).sent_count(), 0);
}

#[tokio::test]
async fn user_builders_assemble_the_participant_messages() {
    let (manager, connector, _scheduler) = test_manager(ClientConfig::default());
    open(&manager, USER_URL).await;

    let store = Arc::new(UserStore::new());
    store.set_user_id("u-9");
    store.set_nickname("Ada");
    let user = UserClient::with_manager(manager, store);

    assert!(user.submit(1300, "survivor"));
    assert!(user.reconnect());
    assert!(user.broadcast("gg"));

    let session = connector.session(0);
    wait_until(|| session.sent_count() == 3).await;

    let sent: Vec<serde_json::Value> = session
        .sent()
        .iter()
        .map(|text| serde_json::from_str(text).unwrap())
        .collect();
    assert_eq!(sent[0]["type"], "SUBMIT");
    assert_eq!(sent[0]["score"], 1300);
    assert_eq!(sent[0]["gameType"], "survivor");
    assert_eq!(sent[1]["type"], "USER_RECONNECT");
    assert_eq!(sent[2]["type"], "BROADCAST_REQUEST");
    assert_eq!(sent[2]["payload"], "gg");
    for message in &sent {
        assert_eq!(message["userId"], "u-9");
    }
}

#[tokio::test]
async fn survivor_sends_are_fire_and_forget() {
    let (manager, connector, _scheduler) = test_manager(ClientConfig::default());
    let survivor = SurvivorClient::with_manager(manager, SURVIVOR_URL);

    let mut events = record_events(survivor.manager(), &[EventKey::Connect]);
    survivor.connect();
    let _ = next_event(&mut events).await;

    assert!(survivor.join("u-9", "ROOM42", "Ada"));
    assert!(survivor.start("u-9", "ROOM42"));
    assert!(survivor.select("u-9", "ROOM42", 13));

    let session = connector.session(0);
    wait_until(|| session.sent_count() == 3).await;

    let sent: Vec<serde_json::Value> = session
        .sent()
        .iter()
        .map(|text| serde_json::from_str(text).unwrap())
        .collect();
    assert_eq!(sent[0]["type"], "SURVIVOR_JOIN");
    assert_eq!(sent[0]["nickname"], "Ada");
    assert_eq!(sent[1]["type"], "SURVIVOR_START");
    assert_eq!(sent[2]["type"], "SURVIVOR_SELECT");
    assert_eq!(sent[2]["selectedNumber"], 13);
    for message in &sent {
        assert_eq!(message["roomCode"], "ROOM42");
        assert!(message.get("requestId").is_none());
    }
    assert_eq!(survivor.manager().pending_request_count(), 0);
}

#[tokio::test]
async fn survivor_honors_the_close_connection_flag() {
    let (manager, connector, scheduler) = test_manager(ClientConfig::default());
    let survivor = SurvivorClient::with_manager(manager, SURVIVOR_URL);

    let mut events = record_events(
        survivor.manager(),
        &[EventKey::Connect, EventKey::Disconnect],
    );
    survivor.connect();
    let _ = next_event(&mut events).await;

    connector
        .session(0)
        .push_text(r#"{"type":"GAME_OVER","winners":[],"closeConnection":true}"#);

    // The teardown is deferred, not immediate.
    wait_until(|| scheduler.pending() == 1).await;
    assert!(survivor.is_connected());

    scheduler.fire_all();
    let (key, _) = next_event(&mut events).await;
    assert_eq!(key, EventKey::Disconnect);
    assert!(!survivor.is_connected());
}

#[tokio::test]
async fn survivor_game_over_without_flag_keeps_the_connection() {
    let (manager, connector, scheduler) = test_manager(ClientConfig::default());
    let survivor = SurvivorClient::with_manager(manager, SURVIVOR_URL);

    let mut events = record_events(survivor.manager(), &[EventKey::Connect]);
    survivor.connect();
    let _ = next_event(&mut events).await;

    connector
        .session(0)
        .push_text(r#"{"type":"GAME_OVER","winners":[]}"#);

    for _ in 0..50 {
        tokio::task::yield_now().await;
    }
    assert_eq!(scheduler.pending(), 0);
    assert!(survivor.is_connected());
}
