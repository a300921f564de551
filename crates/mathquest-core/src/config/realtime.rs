//! Real-time WebSocket gateway configuration.

use serde::{Deserialize, Serialize};

/// Real-time (WebSocket) gateway configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RealtimeConfig {
    /// Upper bound on token verification during the upgrade handshake.
    #[serde(default = "default_handshake_timeout")]
    pub handshake_timeout_seconds: u64,
    /// Per-connection outbound queue size.
    #[serde(default = "default_channel_buffer")]
    pub channel_buffer_size: usize,
    /// Largest inbound text frame accepted, in bytes.
    #[serde(default = "default_max_frame_bytes")]
    pub max_frame_bytes: usize,
    /// Longest chat message accepted, in characters.
    #[serde(default = "default_max_message_length")]
    pub max_message_length: u64,
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self {
            handshake_timeout_seconds: default_handshake_timeout(),
            channel_buffer_size: default_channel_buffer(),
            max_frame_bytes: default_max_frame_bytes(),
            max_message_length: default_max_message_length(),
        }
    }
}

fn default_handshake_timeout() -> u64 {
    5
}

fn default_channel_buffer() -> usize {
    256
}

fn default_max_frame_bytes() -> usize {
    65_536
}

fn default_max_message_length() -> u64 {
    4000
}
