use partyhub_common::protocol::ServerMessage;
use serde_json::Value;

use crate::error::DecodeError;

/// A decoded inbound frame.
///
/// Messages whose `type` the protocol does not know (or whose body does not
/// match the known shape for that `type`) are preserved as [`Unknown`]
/// rather than dropped, so collaborators can still subscribe to them by
/// type name.
///
/// [`Unknown`]: InboundMessage::Unknown
#[derive(Debug, Clone)]
pub enum InboundMessage {
    Known(ServerMessage),
    Unknown { message_type: String, payload: Value },
}

impl InboundMessage {
    /// The `type` discriminator this message dispatches under.
    pub fn message_type(&self) -> &str {
        match self {
            InboundMessage::Known(msg) => msg.message_type(),
            InboundMessage::Unknown { message_type, .. } => message_type,
        }
    }
}

/// Decode one text frame into a dispatchable message.
///
/// A frame must be a JSON object carrying a string `type` field to enter
/// the typed dispatch path; anything else is a decode error and only ever
/// reaches subscribers through the `raw_message` event.
pub fn decode_frame(text: &str) -> Result<InboundMessage, DecodeError> {
    let value: Value = serde_json::from_str(text)?;

    let Some(message_type) = value.get("type").and_then(Value::as_str) else {
        return Err(DecodeError::MissingType);
    };
    let message_type = message_type.to_owned();

    match serde_json::from_value::<ServerMessage>(value.clone()) {
        Ok(message) => Ok(InboundMessage::Known(message)),
        Err(_) => Ok(InboundMessage::Unknown {
            message_type,
            payload: value,
        }),
    }
}
