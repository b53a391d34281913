//! Opcode and error-code enumerations carried on the wire.

use crate::error::TftpError;
use std::fmt;

/// The 16-bit opcodes of the packet kinds this codec understands.
///
/// Value 2 (write request) is reserved by the protocol but deliberately
/// absent: it never converts into an `Opcode`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum Opcode {
    /// Read request (RRQ), starts a download
    ReadRequest = 1,
    /// A block of file content
    Data = 3,
    /// Acknowledges one data block
    Acknowledgment = 4,
    /// Aborts the transfer
    Error = 5,
}

/// Reserved write-request opcode; always rejected
pub const RESERVED_WRITE_REQUEST: u16 = 2;

impl Opcode {
    /// Wire value of the opcode
    pub fn as_u16(self) -> u16 {
        self as u16
    }

    /// Big-endian wire bytes of the opcode
    pub fn to_be_bytes(self) -> [u8; 2] {
        self.as_u16().to_be_bytes()
    }

    /// Short protocol mnemonic
    pub fn name(self) -> &'static str {
        match self {
            Opcode::ReadRequest => "RRQ",
            Opcode::Data => "DATA",
            Opcode::Acknowledgment => "ACK",
            Opcode::Error => "ERROR",
        }
    }
}

impl TryFrom<u16> for Opcode {
    type Error = TftpError;

    fn try_from(value: u16) -> Result<Self, TftpError> {
        match value {
            1 => Ok(Opcode::ReadRequest),
            3 => Ok(Opcode::Data),
            4 => Ok(Opcode::Acknowledgment),
            5 => Ok(Opcode::Error),
            other => Err(TftpError::UnknownType(other)),
        }
    }
}

impl From<Opcode> for u16 {
    fn from(op: Opcode) -> u16 {
        op.as_u16()
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error codes carried inside Error packets (RFC 1350 appendix).
///
/// Values outside the named set are preserved in `Unassigned` so that a
/// decoded packet re-encodes to the same bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// Not defined, see error message
    Unknown,
    /// File not found
    NotFound,
    /// Access violation
    AccessViolation,
    /// Disk full or allocation exceeded
    DiskFull,
    /// Illegal TFTP operation
    IllegalOp,
    /// Unknown transfer ID
    UnknownId,
    /// File already exists
    FileExists,
    /// No such user
    NoSuchUser,
    /// Any other value received from a peer
    Unassigned(u16),
}

impl ErrorCode {
    /// Wire value of the code
    pub fn as_u16(self) -> u16 {
        match self {
            ErrorCode::Unknown => 0,
            ErrorCode::NotFound => 1,
            ErrorCode::AccessViolation => 2,
            ErrorCode::DiskFull => 3,
            ErrorCode::IllegalOp => 4,
            ErrorCode::UnknownId => 5,
            ErrorCode::FileExists => 6,
            ErrorCode::NoSuchUser => 7,
            ErrorCode::Unassigned(code) => code,
        }
    }

    /// Default human readable description
    pub fn description(self) -> &'static str {
        match self {
            ErrorCode::Unknown => "Not defined, see error message (if any)",
            ErrorCode::NotFound => "File not found",
            ErrorCode::AccessViolation => "Access violation",
            ErrorCode::DiskFull => "Disk full or allocation exceeded",
            ErrorCode::IllegalOp => "Illegal TFTP operation",
            ErrorCode::UnknownId => "Unknown transfer ID",
            ErrorCode::FileExists => "File already exists",
            ErrorCode::NoSuchUser => "No such user",
            ErrorCode::Unassigned(_) => "Unassigned error code",
        }
    }
}

impl From<u16> for ErrorCode {
    fn from(value: u16) -> Self {
        match value {
            0 => ErrorCode::Unknown,
            1 => ErrorCode::NotFound,
            2 => ErrorCode::AccessViolation,
            3 => ErrorCode::DiskFull,
            4 => ErrorCode::IllegalOp,
            5 => ErrorCode::UnknownId,
            6 => ErrorCode::FileExists,
            7 => ErrorCode::NoSuchUser,
            other => ErrorCode::Unassigned(other),
        }
    }
}

impl From<ErrorCode> for u16 {
    fn from(code: ErrorCode) -> u16 {
        code.as_u16()
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorCode::Unassigned(code) => write!(f, "Unassigned error code ({code})"),
            named => f.write_str(named.description()),
        }
    }
}
