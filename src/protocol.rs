//! Wire format between the browser client and a session.
//!
//! Inbound messages are JSON text frames shaped `{"kind": .., "payload": ..}`.
//! Outbound frames are either binary (`image`) or the same JSON envelope
//! (`timestampResponse`).
//!
//! `image` payloads are encoded bottom row first. Clients drawing top-to-bottom
//! must flip vertically, and must ignore an empty payload.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Number, Value};

use crate::camera::MoveAxis;
use crate::error::ProtocolError;

/// Client-supplied epoch milliseconds, echoed back bit-for-bit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(Number);

impl Timestamp {
    /// Accepts integral JSON numbers only
    pub fn from_number(number: Number) -> Option<Self> {
        (number.is_i64() || number.is_u64()).then_some(Self(number))
    }

    pub fn as_i64(&self) -> Option<i64> {
        self.0.as_i64()
    }

    pub fn as_number(&self) -> &Number {
        &self.0
    }
}

impl From<i64> for Timestamp {
    fn from(ms: i64) -> Self {
        Self(Number::from(ms))
    }
}

impl From<u64> for Timestamp {
    fn from(ms: u64) -> Self {
        Self(Number::from(ms))
    }
}

/// Inbound message after decoding
#[derive(Debug, Clone, PartialEq)]
pub enum ClientMessage {
    LoadScene(String),
    Lock,
    Unlock,
    LockError,
    MouseMove { movement_x: f32, movement_y: f32 },
    Move { axis: MoveAxis, distance: f32 },
    ClientTimestamp(Timestamp),
}

/// Outbound message queued for the transport
#[derive(Debug, Clone, PartialEq)]
pub enum ServerMessage {
    Image(Vec<u8>),
    TimestampResponse(Timestamp),
}

impl ServerMessage {
    pub fn kind(&self) -> &'static str {
        match self {
            ServerMessage::Image(_) => "image",
            ServerMessage::TimestampResponse(_) => "timestampResponse",
        }
    }

    /// JSON envelope for text-framed kinds; `None` for binary ones
    pub fn to_json(&self) -> Option<String> {
        match self {
            ServerMessage::Image(_) => None,
            ServerMessage::TimestampResponse(ts) => {
                Some(json!({ "kind": self.kind(), "payload": ts }).to_string())
            }
        }
    }
}

#[derive(Deserialize)]
struct Envelope {
    kind: String,
    #[serde(default)]
    payload: Value,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct MouseMovePayload {
    #[serde(default)]
    movement_x: f32,
    #[serde(default)]
    movement_y: f32,
}

#[derive(Deserialize)]
struct MovePayload {
    distance: f32,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SceneReference {
    Path(String),
    Url { url: String },
}

fn move_axis(kind: &str) -> Option<MoveAxis> {
    Some(match kind {
        "moveForward" => MoveAxis::Forward,
        "moveBackward" => MoveAxis::Backward,
        "moveLeft" => MoveAxis::Left,
        "moveRight" => MoveAxis::Right,
        "moveUp" => MoveAxis::Up,
        "moveDown" => MoveAxis::Down,
        _ => return None,
    })
}

fn payload<T: DeserializeOwned>(kind: &str, value: Value) -> Result<T, ProtocolError> {
    serde_json::from_value(value).map_err(|source| ProtocolError::Payload {
        kind: kind.to_string(),
        source,
    })
}

fn finite(kind: &str, values: &[f32]) -> Result<(), ProtocolError> {
    if values.iter().all(|v| v.is_finite()) {
        Ok(())
    } else {
        Err(ProtocolError::NonFinite { kind: kind.to_string() })
    }
}

/// Decode one text frame. `Ok(None)` means a well-formed but unknown kind.
pub fn decode(text: &str) -> Result<Option<ClientMessage>, ProtocolError> {
    let Envelope { kind, payload: body } = serde_json::from_str(text)?;

    let message = match kind.as_str() {
        "loadScene" => match payload::<SceneReference>(&kind, body)? {
            SceneReference::Path(path) | SceneReference::Url { url: path } => {
                ClientMessage::LoadScene(path)
            }
        },
        "lock" => ClientMessage::Lock,
        "unlock" => ClientMessage::Unlock,
        "lockError" => ClientMessage::LockError,
        "mousemove" => {
            let MouseMovePayload { movement_x, movement_y } = payload(&kind, body)?;
            finite(&kind, &[movement_x, movement_y])?;
            ClientMessage::MouseMove { movement_x, movement_y }
        }
        "clientTimestamp" => {
            let number: Number = payload(&kind, body)?;
            let ts = Timestamp::from_number(number).ok_or(ProtocolError::NonIntegerTimestamp)?;
            ClientMessage::ClientTimestamp(ts)
        }
        other => match move_axis(other) {
            Some(axis) => {
                let MovePayload { distance } = payload(&kind, body)?;
                finite(&kind, &[distance])?;
                ClientMessage::Move { axis, distance }
            }
            None => return Ok(None),
        },
    };

    Ok(Some(message))
}
