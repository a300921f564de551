//! Wire messages: inbound requests, outbound events, and their JSON framing.

pub mod codec;
pub mod request;
pub mod types;
pub mod validator;

pub use codec::FrameCodec;
pub use types::{ErrorCode, InboundMessage, OutboundMessage};
