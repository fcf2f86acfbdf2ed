use std::sync::Arc;

use partyhub_client::{
    Event, EventKey, InboundMessage, PlatformClient, ServerMessage, UserClient, UserStore,
};
use tokio::time::{Duration, sleep};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    let room_code = std::env::args()
        .nth(1)
        .expect("usage: user_session <room-code>");

    // Identity lives in the application-owned store; the connection layer
    // only reads it.
    let store = Arc::new(UserStore::new());
    store.set_nickname("Ada");
    store.set_room_code(room_code.as_str());

    let user = UserClient::new(Arc::clone(&store));

    user.on(EventKey::message_type("USER_JOINED"), {
        let store = Arc::clone(&store);
        move |event| {
            if let Event::Message(InboundMessage::Known(ServerMessage::UserJoined {
                user_id,
                nickname,
                ..
            })) = event
            {
                println!("✅ Joined as {nickname} ({user_id})");
                store.set_user_id(user_id.clone());
            }
        }
    });
    user.on(EventKey::message_type("WAIT"), |event| {
        if let Event::Message(InboundMessage::Known(ServerMessage::Wait {
            game_type,
            duration,
            ..
        })) = event
        {
            println!("⏳ {game_type} starts in {duration}ms");
        }
    });
    user.on(EventKey::message_type("ENTER_GAME"), |_event| {
        println!("🎮 Entering the game!");
    });
    user.on(EventKey::message_type("AGGREGATED_USER"), |event| {
        if let Event::Message(InboundMessage::Known(ServerMessage::AggregatedUser(summary))) =
            event
        {
            println!(
                "📊 Round {}: scored {}, rank {}/{} (overall #{})",
                summary.current_round,
                summary.current_score,
                summary.round_rank,
                summary.round_player_count,
                summary.overall_rank,
            );
        }
    });
    user.on(EventKey::Disconnect, |_event| {
        println!("🔌 Connection lost");
    });

    let platform = PlatformClient::new("http://localhost:8080")?;
    user.set_server_url(platform.user_socket_url(&room_code)?);
    user.connect();

    sleep(Duration::from_millis(500)).await;
    user.join();

    // Pretend we played a round
    sleep(Duration::from_secs(10)).await;
    user.submit(1300, "survivor");

    sleep(Duration::from_secs(60)).await;
    user.disconnect();

    Ok(())
}
