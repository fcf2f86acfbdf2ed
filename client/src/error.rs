use thiserror::Error;

/// Errors produced by the transport and bootstrap layers.
///
/// The connection manager itself never returns these across its public
/// surface; failures there are reported through boolean returns and emitted
/// events. `ClientError` shows up in `error` event payloads and in the
/// results of the HTTP bootstrap calls.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("failed to open connection: {0}")]
    Connect(String),

    #[error("failed to send frame: {0}")]
    TransportSend(String),

    #[error("failed to receive frame: {0}")]
    TransportReceive(String),

    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("unsupported URL scheme: {0}")]
    UnsupportedScheme(String),

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("server answered with status {0}")]
    UnexpectedStatus(reqwest::StatusCode),
}

/// Why an inbound frame could not be turned into a dispatchable message.
///
/// Frames that fail to decode are surfaced to subscribers as `raw_message`
/// events only; they never reach the typed dispatch path.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("frame is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("message has no string `type` field")]
    MissingType,
}
