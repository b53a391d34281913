//! # tftp-wire
//!
//! Wire codec for a minimal, read-only TFTP dialect: read requests, data
//! blocks, acknowledgments and errors.
//!
//! The crate turns packets into their canonical bytes and back, and refuses
//! anything that does not follow the framing rules. Sockets, timers and
//! retransmission belong to the caller; [`DatagramCodec`] plugs into
//! `tokio_util::udp::UdpFramed` when the caller is async.
//!
//! ## Example
//! ```rust
//! use tftp_wire::{Acknowledgment, Packet, ReadRequest};
//!
//! let rrq = Packet::from(ReadRequest::new("pxelinux.0")).to_bytes();
//! match Packet::decode(&rrq)? {
//!     Packet::ReadRequest(req) => assert_eq!(req.filename(), "pxelinux.0"),
//!     other => panic!("unexpected {other}"),
//! }
//!
//! let ack = Packet::from(Acknowledgment::new(42)).to_bytes();
//! assert_eq!(&ack[..], &[0, 4, 0, 42]);
//! # Ok::<(), tftp_wire::TftpError>(())
//! ```

#![deny(clippy::unwrap_used, clippy::expect_used)]
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]

pub mod config;
pub mod core;
pub mod error;
pub mod session;
pub mod utils;

pub use crate::config::{TftpConfig, BLOCK_SIZE, DATAGRAM_SIZE};
pub use crate::core::codec::DatagramCodec;
pub use crate::core::opcode::{ErrorCode, Opcode};
pub use crate::core::packet::{Acknowledgment, DataPacket, ErrorPacket, Packet, ReadRequest};
pub use crate::error::{Result, TftpError};
pub use crate::session::{DataReceiver, DataSender};
