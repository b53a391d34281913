//! # Core Protocol Components
//!
//! Packet types, opcodes and the datagram codec.
//!
//! This module is the whole wire contract of the crate: it turns in-memory
//! packets into their canonical byte encoding and rejects anything a peer
//! sends that does not match it.
//!
//! ## Components
//! - **Opcode**: packet kinds and error codes
//! - **Packet**: RRQ, DATA, ACK and ERROR layouts with dispatch decoding
//! - **Codec**: tokio-util codec for plugging into `UdpFramed`
//!
//! ## Wire Format
//! ```text
//! [Opcode(2)] [kind specific body]   total 4..=516 bytes
//! ```
//!
//! ## Security
//! - Maximum datagram size: 516 bytes, checked before parsing
//! - Data payloads above 512 bytes are rejected, never truncated
//! - Strings must be NUL terminated inside the datagram

pub mod codec;
pub mod opcode;
pub mod packet;
