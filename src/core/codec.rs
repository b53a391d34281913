use bytes::BytesMut;
use tokio_util::codec::{Decoder, Encoder};
use tracing::{debug, warn};

use crate::config::CodecConfig;
use crate::core::packet::Packet;
use crate::error::{Result, TftpError};
use crate::utils::metrics::global_metrics;

/// Datagram codec for TFTP packets.
///
/// Every `decode` call consumes the whole buffer as exactly one datagram,
/// which is the contract `tokio_util::udp::UdpFramed` provides. The buffer is
/// frozen in place, so Data payloads share the received allocation.
#[derive(Debug, Clone, Default)]
pub struct DatagramCodec {
    config: CodecConfig,
}

impl DatagramCodec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: CodecConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CodecConfig {
        &self.config
    }
}

impl Decoder for DatagramCodec {
    type Item = Packet;
    type Error = TftpError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>> {
        if src.is_empty() {
            return Ok(None);
        }

        let datagram = src.split().freeze();
        let len = datagram.len();

        match Packet::decode_bytes(datagram, &self.config) {
            Ok(packet) => {
                global_metrics().datagram_decoded(len as u64);
                debug!(%packet, len, "Decoded datagram");
                Ok(Some(packet))
            }
            Err(e) => {
                global_metrics().decode_failed(&e);
                warn!(error = %e, len, "Rejected datagram");
                Err(e)
            }
        }
    }
}

impl Encoder<Packet> for DatagramCodec {
    type Error = TftpError;

    fn encode(&mut self, item: Packet, dst: &mut BytesMut) -> Result<()> {
        let len = item.encoded_len();
        item.encode(dst);
        global_metrics().datagram_encoded(len as u64);
        debug!(packet = %item, len, "Encoded datagram");
        Ok(())
    }
}
