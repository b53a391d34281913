//! # Transfer Sessions
//!
//! Per-transfer state on either side of a download.
//!
//! The codec itself is stateless. Block numbering and the read position in
//! the payload source live here, in one object per transfer:
//!
//! - [`DataSender`] reads a source in 512-byte chunks and produces the DATA
//!   datagrams of a transfer, numbering them from 1.
//! - [`DataReceiver`] writes the payloads of in-order DATA packets to a sink
//!   and tells the caller which ACK to send back.
//!
//! Neither type does network I/O, keeps timers or retransmits; that is the
//! transport's job. Sessions take `&mut self` and must not be shared across
//! transfers.

use std::io::{self, Read, Write};

use bytes::Bytes;
use tracing::{debug, info, instrument};

use crate::config::{TransferConfig, BLOCK_SIZE};
use crate::core::packet::{Acknowledgment, DataPacket};
use crate::error::{constants, Result, TftpError};
use crate::utils::metrics::global_metrics;

/// Sending half of a transfer.
pub struct DataSender<R> {
    source: R,
    block: u16,
    blocks_sent: u64,
    finished: bool,
    final_acked: bool,
    last_datagram: Option<Bytes>,
    chunk: Box<[u8; BLOCK_SIZE]>,
    // Bytes of `chunk` already read from the source but not yet emitted.
    pending: usize,
    config: TransferConfig,
}

impl<R: Read> DataSender<R> {
    /// Start a transfer; the first datagram carries block 1.
    pub fn new(source: R) -> Self {
        Self::resume(source, 0)
    }

    /// Continue a transfer whose last emitted block was `block`.
    pub fn resume(source: R, block: u16) -> Self {
        Self {
            source,
            block,
            blocks_sent: 0,
            finished: false,
            final_acked: false,
            last_datagram: None,
            chunk: Box::new([0u8; BLOCK_SIZE]),
            pending: 0,
            config: TransferConfig::default(),
        }
    }

    pub fn with_config(mut self, config: TransferConfig) -> Self {
        self.config = config;
        self
    }

    /// Block number of the most recently emitted datagram.
    pub fn current_block(&self) -> u16 {
        self.block
    }

    pub fn blocks_sent(&self) -> u64 {
        self.blocks_sent
    }

    /// True once the short final block has been produced.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// True once the final block has also been acknowledged.
    pub fn is_complete(&self) -> bool {
        self.final_acked
    }

    /// The last datagram produced, for retransmission.
    pub fn last_datagram(&self) -> Option<&Bytes> {
        self.last_datagram.as_ref()
    }

    /// Produce the next DATA datagram, or `None` after the final block.
    ///
    /// Reads up to 512 bytes from the source; end of source is not an error
    /// and yields a short (possibly empty) final block. The block counter
    /// only advances when a datagram is returned. If the source fails, bytes
    /// read before the failure are kept and lead the next datagram, so the
    /// call can be retried after a transient error.
    #[instrument(level = "trace", skip(self), fields(block = self.block))]
    pub fn next_datagram(&mut self) -> Result<Option<Bytes>> {
        if self.finished {
            return Ok(None);
        }
        if self.block == u16::MAX && !self.config.allow_block_rollover {
            return Err(TftpError::BlockExhausted);
        }
        if self.config.max_blocks > 0 && self.blocks_sent >= u64::from(self.config.max_blocks) {
            return Err(TftpError::BlockExhausted);
        }

        let filled = self.fill_chunk()?;
        let (datagram, block) = DataPacket::encode_next(self.block, &self.chunk[..filled])?;
        self.block = block;
        self.blocks_sent = self.blocks_sent.saturating_add(1);
        self.pending = 0;

        let metrics = global_metrics();
        metrics.block_sent();
        metrics.datagram_encoded(datagram.len() as u64);
        debug!(block, len = filled, "Produced data block");

        if filled < BLOCK_SIZE {
            self.finished = true;
            info!(
                final_block = block,
                blocks = self.blocks_sent,
                "Final data block produced"
            );
        }

        self.last_datagram = Some(datagram.clone());
        Ok(Some(datagram))
    }

    /// Record an acknowledgment from the peer. Returns true when it matches
    /// the last block sent; stale or foreign block numbers return false.
    pub fn acknowledge(&mut self, ack: &Acknowledgment) -> bool {
        if self.blocks_sent == 0 || ack.block != self.block {
            debug!(acked = ack.block, current = self.block, "Ignoring stale acknowledgment");
            return false;
        }
        if self.finished && !self.final_acked {
            self.final_acked = true;
            global_metrics().transfer_completed();
            info!(blocks = self.blocks_sent, "Transfer acknowledged");
        }
        true
    }

    pub fn into_inner(self) -> R {
        self.source
    }

    fn fill_chunk(&mut self) -> Result<usize> {
        while self.pending < BLOCK_SIZE {
            match self.source.read(&mut self.chunk[self.pending..]) {
                Ok(0) => break,
                Ok(n) => self.pending += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
        Ok(self.pending)
    }
}

/// Receiving half of a transfer.
pub struct DataReceiver<W> {
    sink: W,
    expected: u16,
    last_accepted: Option<u16>,
    bytes_written: u64,
    finished: bool,
    exhausted: bool,
    sink_failed: bool,
    config: TransferConfig,
}

impl<W: Write> DataReceiver<W> {
    /// Expect block 1 first.
    pub fn new(sink: W) -> Self {
        Self {
            sink,
            expected: 1,
            last_accepted: None,
            bytes_written: 0,
            finished: false,
            exhausted: false,
            sink_failed: false,
            config: TransferConfig::default(),
        }
    }

    pub fn with_config(mut self, config: TransferConfig) -> Self {
        self.config = config;
        self
    }

    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }

    /// True once a short block has been written.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Block number the next new DATA packet must carry.
    pub fn expected_block(&self) -> u16 {
        self.expected
    }

    /// Accept a DATA packet and return the ACK to send.
    ///
    /// The expected block is written to the sink. A repeat of the block
    /// accepted last is acknowledged again without being written, so the
    /// peer can recover from a lost ACK. Anything else is out of sequence.
    ///
    /// A sink failure is returned once and ends the session: the sink may
    /// hold part of the block, so every later call fails instead of writing
    /// a retransmission on top of it.
    pub fn receive(&mut self, packet: &DataPacket) -> Result<Acknowledgment> {
        let block = packet.block();

        if self.sink_failed {
            return Err(TftpError::SessionError(constants::ERR_SINK_FAILED));
        }

        if self.last_accepted == Some(block) {
            debug!(block, "Duplicate data block, re-acknowledging");
            return Ok(Acknowledgment::new(block));
        }
        if self.finished {
            return Err(TftpError::SessionError(constants::ERR_TRANSFER_FINISHED));
        }
        if block != self.expected {
            return Err(TftpError::UnexpectedBlock {
                expected: self.expected,
                actual: block,
            });
        }
        if self.exhausted {
            return Err(TftpError::BlockExhausted);
        }

        if let Err(e) = self.sink.write_all(packet.payload()) {
            self.sink_failed = true;
            return Err(e.into());
        }
        self.bytes_written += packet.payload().len() as u64;
        self.last_accepted = Some(block);
        global_metrics().block_received();

        if packet.is_final() {
            if let Err(e) = self.sink.flush() {
                self.sink_failed = true;
                return Err(e.into());
            }
            self.finished = true;
            global_metrics().transfer_completed();
            info!(
                final_block = block,
                bytes = self.bytes_written,
                "Transfer received"
            );
        } else {
            if block == u16::MAX && !self.config.allow_block_rollover {
                self.exhausted = true;
            }
            self.expected = block.wrapping_add(1);
        }

        Ok(Acknowledgment::new(block))
    }

    pub fn into_inner(self) -> W {
        self.sink
    }
}
