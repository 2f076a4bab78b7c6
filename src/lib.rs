//! Core of a reliable byte-stream transport: a finite-capacity byte buffer,
//! an out-of-order segment reassembler, a wrapping sequence-number type, and
//! the two TCP-style endpoints (sender and receiver) built on top of them.
//!
//! The lower-layer datagram carrier, IP framing, and address resolution are
//! not part of this crate; callers supply a transmit sink and a tick clock
//! and ferry [`tcp::message::TCPSenderMessage`] / [`tcp::message::TCPReceiverMessage`]
//! values between the two ends.

pub mod tcp;

pub use tcp::byte_stream::ByteStream;
pub use tcp::config::{ConfigError, SenderConfig, MAX_PAYLOAD_SIZE};
pub use tcp::message::{TCPReceiverMessage, TCPSenderMessage};
pub use tcp::reassembler::Reassembler;
pub use tcp::receiver::TCPReceiver;
pub use tcp::sender::TCPSender;
pub use tcp::wrap32::Wrap32;
