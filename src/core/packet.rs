//! # Packet Types
//!
//! The four packet kinds of the protocol and their canonical encodings.
//!
//! ## Wire Format
//! ```text
//! RRQ   [opcode=1 (2)] [filename] [0x00] [mode] [0x00]
//! DATA  [opcode=3 (2)] [block (2)] [payload (0..=512)]
//! ACK   [opcode=4 (2)] [block (2)]
//! ERROR [opcode=5 (2)] [code (2)] [message] [0x00]
//! ```
//!
//! All integers are big-endian. Every datagram is between 4 and 516 bytes
//! long; decoders check that bound before looking at anything else.
//!
//! Encoding never validates: a caller building packets through the public
//! constructors cannot produce an unencodable value. Decoding is where
//! peers are judged, and it is all-or-nothing.

use crate::config::{CodecConfig, BLOCK_SIZE, DATAGRAM_SIZE, HEADER_SIZE, OCTET_MODE};
use crate::core::opcode::{ErrorCode, Opcode};
use crate::error::{constants, Result, TftpError};
use bytes::{BufMut, Bytes, BytesMut};
use std::borrow::Cow;
use std::fmt;
use std::io::{self, Write};

/// Reject datagrams no packet kind could fit in.
fn check_datagram_len(buf: &[u8]) -> Result<()> {
    if buf.len() < HEADER_SIZE {
        return Err(TftpError::UndersizedDatagram(buf.len()));
    }
    if buf.len() > DATAGRAM_SIZE {
        return Err(TftpError::OversizedDatagram(buf.len()));
    }
    Ok(())
}

/// Caller must have checked the length first.
#[inline]
fn read_u16(buf: &[u8], offset: usize) -> u16 {
    u16::from_be_bytes([buf[offset], buf[offset + 1]])
}

fn expect_opcode(buf: &[u8], expected: Opcode) -> Result<()> {
    let actual = read_u16(buf, 0);
    if actual != expected.as_u16() {
        return Err(TftpError::InvalidOpcode(actual));
    }
    Ok(())
}

/// Split at the first NUL, dropping the terminator.
fn split_nul<'a>(buf: &'a [u8], missing: &'static str) -> Result<(&'a [u8], &'a [u8])> {
    let end = buf
        .iter()
        .position(|&b| b == 0)
        .ok_or(TftpError::MalformedFraming(missing))?;
    Ok((&buf[..end], &buf[end + 1..]))
}

fn utf8(bytes: &[u8], invalid: &'static str) -> Result<String> {
    std::str::from_utf8(bytes)
        .map(str::to_owned)
        .map_err(|_| TftpError::MalformedFraming(invalid))
}

/// A read request (RRQ).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadRequest {
    filename: String,
    mode: String,
}

impl ReadRequest {
    /// Request `filename` in octet mode.
    pub fn new(filename: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            mode: OCTET_MODE.to_string(),
        }
    }

    /// Request `filename` with an explicit mode string. An empty mode is
    /// encoded as `"octet"`.
    pub fn with_mode(filename: impl Into<String>, mode: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            mode: mode.into(),
        }
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn mode(&self) -> &str {
        &self.mode
    }

    fn wire_mode(&self) -> &str {
        if self.mode.is_empty() {
            OCTET_MODE
        } else {
            &self.mode
        }
    }

    /// Number of bytes `encode` appends.
    pub fn encoded_len(&self) -> usize {
        2 + self.filename.len() + 1 + self.wire_mode().len() + 1
    }

    /// Append the wire form to `dst`.
    pub fn encode(&self, dst: &mut BytesMut) {
        dst.reserve(self.encoded_len());
        dst.put_slice(&Opcode::ReadRequest.to_be_bytes());
        dst.put_slice(self.filename.as_bytes());
        dst.put_u8(0);
        dst.put_slice(self.wire_mode().as_bytes());
        dst.put_u8(0);
    }

    /// Decode with the default codec settings.
    pub fn decode(buf: &[u8]) -> Result<Self> {
        Self::decode_with(buf, &CodecConfig::default())
    }

    /// Decode a complete RRQ datagram. The returned mode is always the
    /// normalized `"octet"`.
    pub fn decode_with(buf: &[u8], config: &CodecConfig) -> Result<Self> {
        check_datagram_len(buf)?;
        expect_opcode(buf, Opcode::ReadRequest)?;

        let (filename, rest) = split_nul(&buf[2..], constants::ERR_MISSING_FILENAME_TERMINATOR)?;
        if filename.is_empty() {
            return Err(TftpError::EmptyFilename);
        }
        let filename = utf8(filename, constants::ERR_FILENAME_NOT_UTF8)?;

        let (mode, rest) = split_nul(rest, constants::ERR_MISSING_MODE_TERMINATOR)?;
        let mode = utf8(mode, constants::ERR_MODE_NOT_UTF8)?;
        if !mode.eq_ignore_ascii_case(OCTET_MODE) {
            return Err(TftpError::UnsupportedMode(mode));
        }

        if config.reject_request_options && !rest.is_empty() {
            return Err(TftpError::MalformedFraming(
                constants::ERR_TRAILING_REQUEST_BYTES,
            ));
        }

        Ok(Self {
            filename,
            mode: OCTET_MODE.to_string(),
        })
    }
}

/// One block of file content.
///
/// The payload never exceeds [`BLOCK_SIZE`]; a shorter payload marks the
/// last block of a transfer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataPacket {
    block: u16,
    payload: Bytes,
}

impl DataPacket {
    /// Build a data packet, rejecting payloads larger than one block.
    pub fn new(block: u16, payload: impl Into<Bytes>) -> Result<Self> {
        let payload = payload.into();
        if payload.len() > BLOCK_SIZE {
            return Err(TftpError::OversizedPayload(payload.len()));
        }
        Ok(Self { block, payload })
    }

    pub fn block(&self) -> u16 {
        self.block
    }

    pub fn payload(&self) -> &Bytes {
        &self.payload
    }

    pub fn into_payload(self) -> Bytes {
        self.payload
    }

    /// True when this block ends the transfer.
    pub fn is_final(&self) -> bool {
        self.payload.len() < BLOCK_SIZE
    }

    pub fn encoded_len(&self) -> usize {
        HEADER_SIZE + self.payload.len()
    }

    /// Append the wire form to `dst`, using the stored block number.
    pub fn encode(&self, dst: &mut BytesMut) {
        dst.reserve(self.encoded_len());
        dst.put_slice(&Opcode::Data.to_be_bytes());
        dst.put_u16(self.block);
        dst.put_slice(&self.payload);
    }

    /// Encode the block following `current_block`.
    ///
    /// Returns the datagram and the block number it carries, which the
    /// caller stores as its new current block. The counter wraps after
    /// 65535; whether that is acceptable is the session's decision.
    pub fn encode_next(current_block: u16, chunk: &[u8]) -> Result<(Bytes, u16)> {
        if chunk.len() > BLOCK_SIZE {
            return Err(TftpError::OversizedPayload(chunk.len()));
        }
        let block = current_block.wrapping_add(1);
        let mut dst = BytesMut::with_capacity(HEADER_SIZE + chunk.len());
        dst.put_slice(&Opcode::Data.to_be_bytes());
        dst.put_u16(block);
        dst.put_slice(chunk);
        Ok((dst.freeze(), block))
    }

    fn decode_header(buf: &[u8]) -> Result<u16> {
        check_datagram_len(buf)?;
        expect_opcode(buf, Opcode::Data)?;
        Ok(read_u16(buf, 2))
    }

    /// Decode from a borrowed buffer. The payload is copied, so the result
    /// does not borrow `buf`.
    pub fn decode(buf: &[u8]) -> Result<Self> {
        let block = Self::decode_header(buf)?;
        Ok(Self {
            block,
            payload: Bytes::copy_from_slice(&buf[HEADER_SIZE..]),
        })
    }

    /// Decode from an owned buffer. The payload is a reference-counted view
    /// into `buf`; no bytes are copied.
    pub fn decode_bytes(buf: Bytes) -> Result<Self> {
        let block = Self::decode_header(&buf)?;
        Ok(Self {
            block,
            payload: buf.slice(HEADER_SIZE..),
        })
    }
}

/// Acknowledges the data block with the same number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Acknowledgment {
    pub block: u16,
}

impl Acknowledgment {
    pub fn new(block: u16) -> Self {
        Self { block }
    }

    pub fn encoded_len(&self) -> usize {
        HEADER_SIZE
    }

    pub fn encode(&self, dst: &mut BytesMut) {
        dst.reserve(HEADER_SIZE);
        dst.put_slice(&Opcode::Acknowledgment.to_be_bytes());
        dst.put_u16(self.block);
    }

    /// Wire form as a fixed array.
    pub fn to_array(&self) -> [u8; HEADER_SIZE] {
        let [op_hi, op_lo] = Opcode::Acknowledgment.to_be_bytes();
        let [blk_hi, blk_lo] = self.block.to_be_bytes();
        [op_hi, op_lo, blk_hi, blk_lo]
    }

    pub fn decode(buf: &[u8]) -> Result<Self> {
        check_datagram_len(buf)?;
        if buf.len() != HEADER_SIZE {
            return Err(TftpError::MalformedFraming(constants::ERR_ACK_LENGTH));
        }
        expect_opcode(buf, Opcode::Acknowledgment)?;
        Ok(Self {
            block: read_u16(buf, 2),
        })
    }
}

/// Terminates a transfer with a code and a human readable message.
///
/// The message is kept as the bytes found on the wire, so a decoded packet
/// re-encodes to exactly the datagram it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorPacket {
    pub code: ErrorCode,
    message: Bytes,
}

impl ErrorPacket {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: Bytes::from(message.into()),
        }
    }

    /// Error packet carrying the code's default description.
    pub fn from_code(code: ErrorCode) -> Self {
        Self::new(code, code.description())
    }

    /// Map a file-serving failure to the error packet a peer should see.
    pub fn from_io_error(err: &io::Error) -> Self {
        let code = match err.kind() {
            io::ErrorKind::NotFound => ErrorCode::NotFound,
            io::ErrorKind::PermissionDenied => ErrorCode::AccessViolation,
            io::ErrorKind::AlreadyExists => ErrorCode::FileExists,
            io::ErrorKind::WriteZero => ErrorCode::DiskFull,
            _ => return Self::new(ErrorCode::Unknown, err.to_string()),
        };
        Self::from_code(code)
    }

    /// Message text; invalid UTF-8 sequences show as U+FFFD.
    pub fn message(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.message)
    }

    /// Message exactly as carried on the wire, without the terminator.
    pub fn message_bytes(&self) -> &Bytes {
        &self.message
    }

    pub fn encoded_len(&self) -> usize {
        HEADER_SIZE + self.message.len() + 1
    }

    pub fn encode(&self, dst: &mut BytesMut) {
        dst.reserve(self.encoded_len());
        dst.put_slice(&Opcode::Error.to_be_bytes());
        dst.put_u16(self.code.as_u16());
        dst.put_slice(&self.message);
        dst.put_u8(0);
    }

    pub fn decode(buf: &[u8]) -> Result<Self> {
        Self::decode_with(buf, &CodecConfig::default())
    }

    /// Decode an ERROR datagram. Unassigned codes pass through. Non UTF-8
    /// messages are accepted as-is unless `config.strict_text` is set.
    pub fn decode_with(buf: &[u8], config: &CodecConfig) -> Result<Self> {
        check_datagram_len(buf)?;
        expect_opcode(buf, Opcode::Error)?;

        let code = ErrorCode::from(read_u16(buf, 2));
        let (message, _) = split_nul(
            &buf[HEADER_SIZE..],
            constants::ERR_MISSING_MESSAGE_TERMINATOR,
        )?;
        if config.strict_text && std::str::from_utf8(message).is_err() {
            return Err(TftpError::MalformedFraming(
                constants::ERR_MESSAGE_NOT_UTF8,
            ));
        }

        Ok(Self {
            code,
            message: Bytes::copy_from_slice(message),
        })
    }
}

/// Any packet of the protocol, selected by its opcode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Packet {
    ReadRequest(ReadRequest),
    Data(DataPacket),
    Acknowledgment(Acknowledgment),
    Error(ErrorPacket),
}

impl Packet {
    /// Decode any datagram with the default codec settings.
    pub fn decode(buf: &[u8]) -> Result<Self> {
        Self::decode_with(buf, &CodecConfig::default())
    }

    /// Read the opcode and hand the whole datagram, opcode included, to the
    /// decoder of that kind.
    pub fn decode_with(buf: &[u8], config: &CodecConfig) -> Result<Self> {
        match Self::peek_opcode(buf)? {
            Opcode::ReadRequest => ReadRequest::decode_with(buf, config).map(Packet::ReadRequest),
            Opcode::Data => DataPacket::decode(buf).map(Packet::Data),
            Opcode::Acknowledgment => Acknowledgment::decode(buf).map(Packet::Acknowledgment),
            Opcode::Error => ErrorPacket::decode_with(buf, config).map(Packet::Error),
        }
    }

    /// Like `decode_with`, but a Data payload shares `buf` instead of
    /// copying it.
    pub fn decode_bytes(buf: Bytes, config: &CodecConfig) -> Result<Self> {
        match Self::peek_opcode(&buf)? {
            Opcode::Data => DataPacket::decode_bytes(buf).map(Packet::Data),
            _ => Self::decode_with(&buf, config),
        }
    }

    fn peek_opcode(buf: &[u8]) -> Result<Opcode> {
        check_datagram_len(buf)?;
        Opcode::try_from(read_u16(buf, 0))
    }

    pub fn opcode(&self) -> Opcode {
        match self {
            Packet::ReadRequest(_) => Opcode::ReadRequest,
            Packet::Data(_) => Opcode::Data,
            Packet::Acknowledgment(_) => Opcode::Acknowledgment,
            Packet::Error(_) => Opcode::Error,
        }
    }

    pub fn encoded_len(&self) -> usize {
        match self {
            Packet::ReadRequest(p) => p.encoded_len(),
            Packet::Data(p) => p.encoded_len(),
            Packet::Acknowledgment(p) => p.encoded_len(),
            Packet::Error(p) => p.encoded_len(),
        }
    }

    /// Append the wire form to `dst`.
    pub fn encode(&self, dst: &mut BytesMut) {
        match self {
            Packet::ReadRequest(p) => p.encode(dst),
            Packet::Data(p) => p.encode(dst),
            Packet::Acknowledgment(p) => p.encode(dst),
            Packet::Error(p) => p.encode(dst),
        }
    }

    /// Wire form as an owned buffer.
    pub fn to_bytes(&self) -> Bytes {
        let mut dst = BytesMut::with_capacity(self.encoded_len());
        self.encode(&mut dst);
        dst.freeze()
    }

    /// Write the wire form to `sink`, returning the number of bytes written.
    /// Sink failures come back as `TftpError::Io` untouched.
    pub fn write_to<W: Write>(&self, sink: &mut W) -> Result<usize> {
        let bytes = self.to_bytes();
        sink.write_all(&bytes)?;
        Ok(bytes.len())
    }
}

impl From<ReadRequest> for Packet {
    fn from(p: ReadRequest) -> Self {
        Packet::ReadRequest(p)
    }
}

impl From<DataPacket> for Packet {
    fn from(p: DataPacket) -> Self {
        Packet::Data(p)
    }
}

impl From<Acknowledgment> for Packet {
    fn from(p: Acknowledgment) -> Self {
        Packet::Acknowledgment(p)
    }
}

impl From<ErrorPacket> for Packet {
    fn from(p: ErrorPacket) -> Self {
        Packet::Error(p)
    }
}

impl fmt::Display for Packet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Packet::ReadRequest(p) => write!(f, "RRQ [{}] [{}]", p.filename(), p.wire_mode()),
            Packet::Data(p) => write!(f, "DATA [{}] ({} bytes)", p.block(), p.payload().len()),
            Packet::Acknowledgment(p) => write!(f, "ACK [{}]", p.block),
            Packet::Error(p) => write!(f, "ERR [{}]: {}", p.code.as_u16(), p.message()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rrq_bytes(filename: &[u8], mode: &[u8]) -> Vec<u8> {
        let mut buf = vec![0, 1];
        buf.extend_from_slice(filename);
        buf.push(0);
        buf.extend_from_slice(mode);
        buf.push(0);
        buf
    }

    #[test]
    fn test_rrq_encode_layout() {
        let bytes = Packet::from(ReadRequest::new("a.txt")).to_bytes();
        assert_eq!(
            &bytes[..],
            &[0x0, 0x1, 0x61, 0x2E, 0x74, 0x78, 0x74, 0x0, 0x6F, 0x63, 0x74, 0x65, 0x74, 0x0]
        );
    }

    #[test]
    fn test_rrq_empty_mode_defaults_to_octet() {
        let bytes = Packet::from(ReadRequest::with_mode("boot.img", "")).to_bytes();
        assert_eq!(&bytes[..], &rrq_bytes(b"boot.img", b"octet")[..]);
    }

    #[test]
    fn test_rrq_encode_does_not_validate() {
        let bytes = Packet::from(ReadRequest::with_mode("", "netascii")).to_bytes();
        assert_eq!(&bytes[..], &rrq_bytes(b"", b"netascii")[..]);
    }

    #[test]
    fn test_rrq_mode_normalized() {
        for mode in ["octet", "OCTET", "Octet"] {
            let req = ReadRequest::decode(&rrq_bytes(b"pxelinux.0", mode.as_bytes()))
                .expect("valid request");
            assert_eq!(req.filename(), "pxelinux.0");
            assert_eq!(req.mode(), "octet");
        }
    }

    #[test]
    fn test_rrq_rejects_netascii() {
        let err = ReadRequest::decode(&rrq_bytes(b"file", b"netascii")).unwrap_err();
        assert!(matches!(err, TftpError::UnsupportedMode(m) if m == "netascii"));
    }

    #[test]
    fn test_rrq_missing_mode_terminator() {
        let mut buf = rrq_bytes(b"file", b"octet");
        buf.pop();
        assert!(matches!(
            ReadRequest::decode(&buf),
            Err(TftpError::MalformedFraming(constants::ERR_MISSING_MODE_TERMINATOR))
        ));
    }

    #[test]
    fn test_rrq_missing_filename_terminator() {
        let buf = [0, 1, b'f', b'i', b'l', b'e'];
        assert!(matches!(
            ReadRequest::decode(&buf),
            Err(TftpError::MalformedFraming(constants::ERR_MISSING_FILENAME_TERMINATOR))
        ));
    }

    #[test]
    fn test_rrq_empty_filename() {
        assert!(matches!(
            ReadRequest::decode(&rrq_bytes(b"", b"octet")),
            Err(TftpError::EmptyFilename)
        ));
    }

    #[test]
    fn test_rrq_wrong_opcode() {
        let mut buf = rrq_bytes(b"file", b"octet");
        buf[1] = 2;
        assert!(matches!(
            ReadRequest::decode(&buf),
            Err(TftpError::InvalidOpcode(2))
        ));
    }

    #[test]
    fn test_rrq_invalid_utf8_filename() {
        assert!(matches!(
            ReadRequest::decode(&rrq_bytes(&[0xFF, 0xFE], b"octet")),
            Err(TftpError::MalformedFraming(constants::ERR_FILENAME_NOT_UTF8))
        ));
    }

    #[test]
    fn test_rrq_trailing_options() {
        let mut buf = rrq_bytes(b"file", b"octet");
        buf.extend_from_slice(b"blksize\x001428\x00");

        let req = ReadRequest::decode(&buf).expect("options ignored by default");
        assert_eq!(req.filename(), "file");

        let strict = CodecConfig {
            reject_request_options: true,
            ..CodecConfig::default()
        };
        assert!(matches!(
            ReadRequest::decode_with(&buf, &strict),
            Err(TftpError::MalformedFraming(constants::ERR_TRAILING_REQUEST_BYTES))
        ));
    }

    #[test]
    fn test_data_encode_next_increments_block() {
        let (bytes, block) = DataPacket::encode_next(5, &[0xAB; BLOCK_SIZE]).expect("encode");
        assert_eq!(block, 6);
        assert_eq!(bytes.len(), DATAGRAM_SIZE);
        assert_eq!(&bytes[..4], &[0, 3, 0, 6]);

        let decoded = DataPacket::decode(&bytes).expect("decode");
        assert_eq!(decoded.block(), 6);
        assert_eq!(decoded.payload().len(), BLOCK_SIZE);
        assert!(!decoded.is_final());
    }

    #[test]
    fn test_data_encode_next_wraps() {
        let (bytes, block) = DataPacket::encode_next(u16::MAX, b"x").expect("encode");
        assert_eq!(block, 0);
        assert_eq!(&bytes[..], &[0, 3, 0, 0, b'x']);
    }

    #[test]
    fn test_data_short_payload_not_padded() {
        let (bytes, _) = DataPacket::encode_next(0, &[7u8; 100]).expect("encode");
        assert_eq!(bytes.len(), 104);
    }

    #[test]
    fn test_data_oversized_payload_rejected() {
        assert!(matches!(
            DataPacket::encode_next(0, &[0u8; BLOCK_SIZE + 1]),
            Err(TftpError::OversizedPayload(513))
        ));
        assert!(matches!(
            DataPacket::new(1, vec![0u8; 600]),
            Err(TftpError::OversizedPayload(600))
        ));
    }

    #[test]
    fn test_data_decode_bounds() {
        assert!(matches!(
            DataPacket::decode(&[0, 3, 0]),
            Err(TftpError::UndersizedDatagram(3))
        ));
        assert!(matches!(
            DataPacket::decode(&[0u8; DATAGRAM_SIZE + 1]),
            Err(TftpError::OversizedDatagram(517))
        ));
        assert!(matches!(
            DataPacket::decode(&[0, 4, 0, 1]),
            Err(TftpError::InvalidOpcode(4))
        ));
    }

    #[test]
    fn test_data_header_only_is_final() {
        let packet = DataPacket::decode(&[0, 3, 0, 9]).expect("decode");
        assert_eq!(packet.block(), 9);
        assert!(packet.payload().is_empty());
        assert!(packet.is_final());
    }

    #[test]
    fn test_data_decode_bytes_shares_buffer() {
        let (bytes, _) = DataPacket::encode_next(0, b"hello").expect("encode");
        let payload_ptr = bytes[HEADER_SIZE..].as_ptr();
        let packet = DataPacket::decode_bytes(bytes).expect("decode");
        assert_eq!(packet.payload().as_ptr(), payload_ptr);
        assert_eq!(&packet.payload()[..], b"hello");
    }

    #[test]
    fn test_ack_layout() {
        let ack = Acknowledgment::new(42);
        assert_eq!(&Packet::from(ack).to_bytes()[..], &[0, 4, 0, 42]);
        assert_eq!(ack.to_array(), [0, 4, 0, 42]);
        assert_eq!(Acknowledgment::decode(&[0, 4, 0, 42]).expect("decode").block, 42);
    }

    #[test]
    fn test_ack_exact_length() {
        assert!(matches!(
            Acknowledgment::decode(&[0, 4, 0, 1, 0]),
            Err(TftpError::MalformedFraming(constants::ERR_ACK_LENGTH))
        ));
        assert!(matches!(
            Acknowledgment::decode(&[0, 3, 0, 1]),
            Err(TftpError::InvalidOpcode(3))
        ));
    }

    #[test]
    fn test_error_packet_roundtrip() {
        let packet = ErrorPacket::new(ErrorCode::NotFound, "no such file");
        let bytes = Packet::from(packet.clone()).to_bytes();
        assert_eq!(&bytes[..4], &[0, 5, 0, 1]);
        assert_eq!(bytes[bytes.len() - 1], 0);
        assert_eq!(ErrorPacket::decode(&bytes).expect("decode"), packet);
    }

    #[test]
    fn test_error_packet_unassigned_code_passes_through() {
        let buf = [0, 5, 0x01, 0x00, b'x', 0];
        let packet = ErrorPacket::decode(&buf).expect("decode");
        assert_eq!(packet.code, ErrorCode::Unassigned(256));
        assert_eq!(&Packet::from(packet).to_bytes()[..], &buf);
    }

    #[test]
    fn test_error_packet_missing_terminator() {
        assert!(matches!(
            ErrorPacket::decode(&[0, 5, 0, 1, b'n', b'o']),
            Err(TftpError::MalformedFraming(constants::ERR_MISSING_MESSAGE_TERMINATOR))
        ));
    }

    #[test]
    fn test_error_packet_text_strictness() {
        let buf = [0, 5, 0, 0, 0xC3, 0x28, 0];
        let lossy = ErrorPacket::decode(&buf).expect("lossy decode");
        assert_eq!(lossy.message(), "\u{FFFD}(");
        assert_eq!(&lossy.message_bytes()[..], &[0xC3, 0x28]);

        let strict = CodecConfig {
            strict_text: true,
            ..CodecConfig::default()
        };
        assert!(matches!(
            ErrorPacket::decode_with(&buf, &strict),
            Err(TftpError::MalformedFraming(constants::ERR_MESSAGE_NOT_UTF8))
        ));
    }

    #[test]
    fn test_error_packet_invalid_text_reencodes_unchanged() {
        let mut buf = vec![0, 5, 0, 0];
        buf.extend_from_slice(&[0xFF; BLOCK_SIZE - 1]);
        buf.push(0);
        assert_eq!(buf.len(), DATAGRAM_SIZE);

        let packet = Packet::decode(&buf).expect("lossy decode");
        let reencoded = packet.to_bytes();
        assert!(reencoded.len() <= DATAGRAM_SIZE);
        assert_eq!(&reencoded[..], &buf[..]);
    }

    #[test]
    fn test_error_packet_from_io_error() {
        let not_found = io::Error::new(io::ErrorKind::NotFound, "gone");
        assert_eq!(ErrorPacket::from_io_error(&not_found).code, ErrorCode::NotFound);

        let denied = io::Error::new(io::ErrorKind::PermissionDenied, "nope");
        let packet = ErrorPacket::from_io_error(&denied);
        assert_eq!(packet.code, ErrorCode::AccessViolation);
        assert_eq!(packet.message(), "Access violation");

        let other = io::Error::other("disk on fire");
        let packet = ErrorPacket::from_io_error(&other);
        assert_eq!(packet.code, ErrorCode::Unknown);
        assert_eq!(packet.message(), "disk on fire");
    }

    #[test]
    fn test_dispatch_selects_kind() {
        assert_eq!(
            Packet::decode(&rrq_bytes(b"f", b"octet")).expect("rrq").opcode(),
            Opcode::ReadRequest
        );
        assert_eq!(Packet::decode(&[0, 3, 0, 1]).expect("data").opcode(), Opcode::Data);
        assert_eq!(
            Packet::decode(&[0, 4, 0, 1]).expect("ack").opcode(),
            Opcode::Acknowledgment
        );
        assert_eq!(
            Packet::decode(&[0, 5, 0, 1, 0]).expect("error").opcode(),
            Opcode::Error
        );
    }

    #[test]
    fn test_dispatch_rejects_reserved_and_unknown() {
        let mut wrq = rrq_bytes(b"file", b"octet");
        wrq[1] = 2;
        assert!(matches!(Packet::decode(&wrq), Err(TftpError::UnknownType(2))));
        assert!(matches!(
            Packet::decode(&[0, 9, 0, 0]),
            Err(TftpError::UnknownType(9))
        ));
    }

    #[test]
    fn test_write_to_propagates_sink_fault() {
        struct FullSink;
        impl Write for FullSink {
            fn write(&mut self, _: &[u8]) -> io::Result<usize> {
                Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
            }
            fn flush(&mut self) -> io::Result<()> {
                Ok(())
            }
        }

        let packet = Packet::from(Acknowledgment::new(1));
        match packet.write_to(&mut FullSink) {
            Err(TftpError::Io(e)) => assert_eq!(e.kind(), io::ErrorKind::BrokenPipe),
            other => panic!("unexpected: {other:?}"),
        }

        let mut sink = Vec::new();
        assert_eq!(packet.write_to(&mut sink).expect("vec sink"), 4);
        assert_eq!(sink, vec![0, 4, 0, 1]);
    }

    #[test]
    fn test_display() {
        assert_eq!(
            Packet::from(ReadRequest::new("a.txt")).to_string(),
            "RRQ [a.txt] [octet]"
        );
        assert_eq!(Packet::from(Acknowledgment::new(7)).to_string(), "ACK [7]");
        assert_eq!(
            Packet::from(ErrorPacket::new(ErrorCode::NotFound, "gone")).to_string(),
            "ERR [1]: gone"
        );
    }
}
