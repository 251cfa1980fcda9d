//! Round-trip probe: the client sends its clock, the server echoes it.

use chrono::Utc;
use log::debug;

use crate::protocol::{ServerMessage, Timestamp};

/// Reply to a `clientTimestamp` with the unmodified value
pub fn echo(timestamp: Timestamp) -> ServerMessage {
    if let Some(offset) = clock_offset_ms(&timestamp) {
        debug!("clientTimestamp {} (server ahead by {offset} ms)", timestamp.as_number());
    }
    ServerMessage::TimestampResponse(timestamp)
}

/// Server clock minus client clock, when the timestamp fits in an i64
pub fn clock_offset_ms(timestamp: &Timestamp) -> Option<i64> {
    timestamp
        .as_i64()
        .map(|client_ms| Utc::now().timestamp_millis().saturating_sub(client_ms))
}
