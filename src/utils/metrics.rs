//! Observability and Metrics
//!
//! Counters for datagrams moving through the codec and the transfer
//! sessions built on it.
//!
//! Uses atomic counters for thread-safe metrics collection.

use crate::error::TftpError;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;
use tracing::info;

/// Global metrics collector for codec operations
#[derive(Debug)]
pub struct Metrics {
    /// Datagrams produced by the encoder
    pub datagrams_encoded: AtomicU64,
    /// Datagrams accepted by the decoder
    pub datagrams_decoded: AtomicU64,
    /// Total bytes encoded
    pub bytes_encoded: AtomicU64,
    /// Total bytes decoded
    pub bytes_decoded: AtomicU64,
    /// Datagrams rejected for any reason
    pub decode_failures: AtomicU64,
    /// Datagrams rejected for being shorter than a header
    pub undersized_rejected: AtomicU64,
    /// Datagrams rejected for exceeding the maximum datagram size
    pub oversized_rejected: AtomicU64,
    /// Datagrams whose opcode selected no packet kind
    pub unknown_type_rejected: AtomicU64,
    /// Data blocks emitted by senders
    pub blocks_sent: AtomicU64,
    /// Data blocks accepted by receivers
    pub blocks_received: AtomicU64,
    /// Transfers that reached their final block
    pub transfers_completed: AtomicU64,
    /// Start time for uptime calculation
    start_time: Instant,
}

impl Metrics {
    /// Create a new metrics collector
    pub fn new() -> Self {
        Self {
            datagrams_encoded: AtomicU64::new(0),
            datagrams_decoded: AtomicU64::new(0),
            bytes_encoded: AtomicU64::new(0),
            bytes_decoded: AtomicU64::new(0),
            decode_failures: AtomicU64::new(0),
            undersized_rejected: AtomicU64::new(0),
            oversized_rejected: AtomicU64::new(0),
            unknown_type_rejected: AtomicU64::new(0),
            blocks_sent: AtomicU64::new(0),
            blocks_received: AtomicU64::new(0),
            transfers_completed: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }

    /// Record an encoded datagram
    pub fn datagram_encoded(&self, byte_count: u64) {
        self.datagrams_encoded.fetch_add(1, Ordering::Relaxed);
        self.bytes_encoded.fetch_add(byte_count, Ordering::Relaxed);
    }

    /// Record a decoded datagram
    pub fn datagram_decoded(&self, byte_count: u64) {
        self.datagrams_decoded.fetch_add(1, Ordering::Relaxed);
        self.bytes_decoded.fetch_add(byte_count, Ordering::Relaxed);
    }

    /// Record a rejected datagram
    pub fn decode_failed(&self, error: &TftpError) {
        self.decode_failures.fetch_add(1, Ordering::Relaxed);
        match error {
            TftpError::UndersizedDatagram(_) => {
                self.undersized_rejected.fetch_add(1, Ordering::Relaxed);
            }
            TftpError::OversizedDatagram(_) => {
                self.oversized_rejected.fetch_add(1, Ordering::Relaxed);
            }
            TftpError::UnknownType(_) => {
                self.unknown_type_rejected.fetch_add(1, Ordering::Relaxed);
            }
            _ => {}
        }
    }

    /// Record a data block handed out by a sender
    pub fn block_sent(&self) {
        self.blocks_sent.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a data block accepted by a receiver
    pub fn block_received(&self) {
        self.blocks_received.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a finished transfer
    pub fn transfer_completed(&self) {
        self.transfers_completed.fetch_add(1, Ordering::Relaxed);
    }

    /// Get current metrics snapshot
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            datagrams_encoded: self.datagrams_encoded.load(Ordering::Relaxed),
            datagrams_decoded: self.datagrams_decoded.load(Ordering::Relaxed),
            bytes_encoded: self.bytes_encoded.load(Ordering::Relaxed),
            bytes_decoded: self.bytes_decoded.load(Ordering::Relaxed),
            decode_failures: self.decode_failures.load(Ordering::Relaxed),
            undersized_rejected: self.undersized_rejected.load(Ordering::Relaxed),
            oversized_rejected: self.oversized_rejected.load(Ordering::Relaxed),
            unknown_type_rejected: self.unknown_type_rejected.load(Ordering::Relaxed),
            blocks_sent: self.blocks_sent.load(Ordering::Relaxed),
            blocks_received: self.blocks_received.load(Ordering::Relaxed),
            transfers_completed: self.transfers_completed.load(Ordering::Relaxed),
            uptime_seconds: self.start_time.elapsed().as_secs(),
        }
    }

    /// Log current metrics
    pub fn log_metrics(&self) {
        let snapshot = self.snapshot();
        info!(
            datagrams_encoded = snapshot.datagrams_encoded,
            datagrams_decoded = snapshot.datagrams_decoded,
            bytes_encoded = snapshot.bytes_encoded,
            bytes_decoded = snapshot.bytes_decoded,
            decode_failures = snapshot.decode_failures,
            undersized_rejected = snapshot.undersized_rejected,
            oversized_rejected = snapshot.oversized_rejected,
            unknown_type_rejected = snapshot.unknown_type_rejected,
            blocks_sent = snapshot.blocks_sent,
            blocks_received = snapshot.blocks_received,
            transfers_completed = snapshot.transfers_completed,
            uptime_seconds = snapshot.uptime_seconds,
            "Codec metrics snapshot"
        );
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Snapshot of metrics at a point in time
#[derive(Debug, Clone)]
pub struct MetricsSnapshot {
    pub datagrams_encoded: u64,
    pub datagrams_decoded: u64,
    pub bytes_encoded: u64,
    pub bytes_decoded: u64,
    pub decode_failures: u64,
    pub undersized_rejected: u64,
    pub oversized_rejected: u64,
    pub unknown_type_rejected: u64,
    pub blocks_sent: u64,
    pub blocks_received: u64,
    pub transfers_completed: u64,
    pub uptime_seconds: u64,
}

static METRICS: once_cell::sync::Lazy<Metrics> = once_cell::sync::Lazy::new(Metrics::new);

/// Get the global metrics instance
pub fn global_metrics() -> &'static Metrics {
    &METRICS
}
