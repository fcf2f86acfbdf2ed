use reqwest::Client;
use serde::Deserialize;
use url::Url;

use crate::Result;
use crate::error::ClientError;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RoomResponse {
    room_code: String,
}

/// HTTP bootstrap client for the platform's REST surface.
///
/// Holds the platform base URL, performs the room-creation call made before
/// any socket opens, and derives the WebSocket endpoints the role clients
/// connect to.
pub struct PlatformClient {
    client: Client,
    base_url: Url,
}

impl PlatformClient {
    /// Create a new client for the given platform base URL.
    pub fn new(base_url: &str) -> Result<Self> {
        let base_url = Url::parse(base_url)?;
        let client = Client::new();

        Ok(Self { client, base_url })
    }

    /// Create a new room; returns the room code participants join with.
    pub async fn create_room(&self) -> Result<String> {
        let create_url = self.base_url.join("/rooms")?;

        let response = self.client.post(create_url).send().await?;

        if !response.status().is_success() {
            return Err(ClientError::UnexpectedStatus(response.status()));
        }

        let room: RoomResponse = response.json().await?;
        Ok(room.room_code)
    }

    /// WebSocket endpoint for the administrator connection.
    pub fn admin_socket_url(&self) -> Result<String> {
        self.socket_url("/ws/game/admin")
    }

    /// WebSocket endpoint for a participant connection in the given room.
    pub fn user_socket_url(&self, room_code: &str) -> Result<String> {
        self.socket_url(&format!("/ws/game/user/{room_code}"))
    }

    /// WebSocket endpoint for a minigame's own connection, e.g.
    /// `/ws/game/survivor`.
    pub fn minigame_socket_url(&self, path: &str) -> Result<String> {
        self.socket_url(path)
    }

    fn socket_url(&self, path: &str) -> Result<String> {
        let mut ws_url = self.base_url.clone();
        let scheme = match self.base_url.scheme() {
            "https" | "wss" => "wss",
            "http" | "ws" => "ws",
            other => return Err(ClientError::UnsupportedScheme(other.to_owned())),
        };
        ws_url
            .set_scheme(scheme)
            .map_err(|_| ClientError::UnsupportedScheme(scheme.to_owned()))?;
        ws_url.set_path(path);
        ws_url.set_query(None);

        Ok(ws_url.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn socket_urls_swap_scheme_and_path() {
        let client = PlatformClient::new("http://localhost:8080").unwrap();
        assert_eq!(
            client.admin_socket_url().unwrap(),
            "ws://localhost:8080/ws/game/admin"
        );
        assert_eq!(
            client.user_socket_url("ROOM42").unwrap(),
            "ws://localhost:8080/ws/game/user/ROOM42"
        );
    }

    #[test]
    fn https_base_maps_to_wss() {
        let client = PlatformClient::new("https://play.example.com").unwrap();
        assert_eq!(
            client.minigame_socket_url("/ws/game/survivor").unwrap(),
            "wss://play.example.com/ws/game/survivor"
        );
    }

    #[test]
    fn non_http_scheme_is_rejected() {
        let client = PlatformClient::new("ftp://example.com").unwrap();
        assert!(matches!(
            client.admin_socket_url(),
            Err(ClientError::UnsupportedScheme(_))
        ));
    }
}
