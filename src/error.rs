//! # Error Types
//!
//! Error handling for the TFTP wire codec.
//!
//! Every decode failure is reported synchronously as a typed [`TftpError`];
//! nothing is retried inside the codec and no partially populated packet is
//! ever returned. Encode failures are limited to the payload ceiling and to
//! I/O faults propagated unchanged from the caller's sink.
//!
//! ## Error Categories
//! - **Framing**: undersized/oversized datagrams, missing terminators
//! - **Semantic**: wrong opcode, empty filename, unsupported mode
//! - **Session**: block counter exhaustion, out-of-sequence data
//! - **I/O**: faults from caller supplied sources and sinks
//!
//! ## Example Usage
//! ```rust
//! use tftp_wire::error::TftpError;
//! use tftp_wire::Packet;
//! use tracing::warn;
//!
//! match Packet::decode(&[0, 4, 0]) {
//!     Err(TftpError::UndersizedDatagram(len)) => warn!(len, "dropping runt datagram"),
//!     other => panic!("unexpected: {other:?}"),
//! }
//! ```

use std::io;
use thiserror::Error;

/// Error message constants to reduce allocations in error paths.
pub mod constants {
    /// Framing errors
    pub const ERR_MISSING_FILENAME_TERMINATOR: &str = "filename is not NUL terminated";
    pub const ERR_MISSING_MODE_TERMINATOR: &str = "mode is not NUL terminated";
    pub const ERR_MISSING_MESSAGE_TERMINATOR: &str = "error message is not NUL terminated";
    pub const ERR_FILENAME_NOT_UTF8: &str = "filename is not valid UTF-8";
    pub const ERR_MODE_NOT_UTF8: &str = "mode is not valid UTF-8";
    pub const ERR_MESSAGE_NOT_UTF8: &str = "error message is not valid UTF-8";
    pub const ERR_ACK_LENGTH: &str = "acknowledgment must be exactly 4 bytes";
    pub const ERR_TRAILING_REQUEST_BYTES: &str = "unexpected bytes after request mode";

    /// Session errors
    pub const ERR_TRANSFER_FINISHED: &str = "transfer already finished";
    pub const ERR_SINK_FAILED: &str = "sink failed earlier in this transfer";
}

/// Primary error type for every codec and session operation.
#[derive(Error, Debug)]
pub enum TftpError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Invalid opcode {0} for this packet kind")]
    InvalidOpcode(u16),

    #[error("Malformed framing: {0}")]
    MalformedFraming(&'static str),

    #[error("Unsupported transfer mode: {0:?} (only \"octet\" is accepted)")]
    UnsupportedMode(String),

    #[error("Read request carries an empty filename")]
    EmptyFilename,

    #[error("Datagram too large: {0} bytes")]
    OversizedDatagram(usize),

    #[error("Datagram too small: {0} bytes")]
    UndersizedDatagram(usize),

    #[error("Unknown packet type: opcode {0}")]
    UnknownType(u16),

    #[error("Data payload too large: {0} bytes")]
    OversizedPayload(usize),

    #[error("Block counter exhausted and rollover is disabled")]
    BlockExhausted,

    #[error("Unexpected data block: expected {expected}, got {actual}")]
    UnexpectedBlock { expected: u16, actual: u16 },

    #[error("Session error: {0}")]
    SessionError(&'static str),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl TftpError {
    /// True for failures caused by the bytes of a received datagram, as
    /// opposed to local I/O, configuration or sequencing problems.
    pub fn is_decode_error(&self) -> bool {
        matches!(
            self,
            TftpError::InvalidOpcode(_)
                | TftpError::MalformedFraming(_)
                | TftpError::UnsupportedMode(_)
                | TftpError::EmptyFilename
                | TftpError::OversizedDatagram(_)
                | TftpError::UndersizedDatagram(_)
                | TftpError::UnknownType(_)
        )
    }
}

/// Type alias for Results using TftpError
pub type Result<T> = std::result::Result<T, TftpError>;
