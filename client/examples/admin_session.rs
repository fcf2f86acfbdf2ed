use std::sync::Arc;

use partyhub_client::{
    AdminClient, AdminStore, Event, EventKey, InboundMessage, PlatformClient, ServerMessage,
};
use tokio::time::{Duration, sleep};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    // Create the room over HTTP before opening the socket
    let platform = PlatformClient::new("http://localhost:8080")?;
    let room_code = platform.create_room().await?;
    println!("🎉 Room created, code: {room_code}");

    // The hosting application owns the identity store
    let store = Arc::new(AdminStore::new());
    store.set_administrator_id("admin-1");

    let admin = AdminClient::new(store);

    admin.on(EventKey::Connect, |_event| {
        println!("🔌 Connected to the coordination server");
    });
    admin.on(EventKey::message_type("USER_JOINED_ADMIN"), |event| {
        if let Event::Message(InboundMessage::Known(ServerMessage::UserJoinedAdmin {
            nickname,
            user_count,
            ..
        })) = event
        {
            println!("👋 {nickname} joined ({user_count} players)");
        }
    });
    admin.on(EventKey::message_type("AGGREGATED_ADMIN"), |event| {
        if let Event::Message(InboundMessage::Known(ServerMessage::AggregatedAdmin(summary))) =
            event
        {
            println!(
                "📊 Round {}/{} done, {} players submitted",
                summary.current_round, summary.total_round, summary.round_player_count
            );
            for entry in &summary.round_ranking {
                println!("  #{} {} ({})", entry.rank, entry.nickname, entry.score);
            }
        }
    });
    admin.on(EventKey::message_type("END"), |event| {
        if let Event::Message(InboundMessage::Known(ServerMessage::End { overall_ranking })) =
            event
        {
            println!("🏁 Session over, {} ranked players", overall_ranking.len());
        }
    });
    admin.on(EventKey::ReconnectFailed, |_event| {
        println!("💀 Gave up reconnecting");
    });

    admin.set_server_url(platform.admin_socket_url()?);
    admin.connect();

    // Give the connection a moment, then drive the session
    sleep(Duration::from_millis(500)).await;
    admin.join();
    admin.init_session(Some(3));

    sleep(Duration::from_secs(5)).await;
    admin.start_game();

    // Let the session run for a while
    sleep(Duration::from_secs(60)).await;
    admin.disconnect();
    println!("Connection closed");

    Ok(())
}
