//! Streaming channel seam between the live session and the remote inference source.

mod channel;
mod sse_channel;

pub use channel::{ChannelCommand, ChannelError, ChannelEvent, CredentialAck, EventSink, StreamChannel};
pub use sse_channel::SseChannel;

#[cfg(test)]
mod tests;
