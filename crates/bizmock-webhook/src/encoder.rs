//! Delivery unit serialization and compression.
//!
//! Units serialize to the canonical JSON wire form (field names preserved,
//! empty fields omitted). Payloads above the configured threshold are
//! gzipped, and the result records whether the outbound request must carry
//! `Content-Encoding: gzip`. Serialization goes through a pooled buffer; the
//! final payload is copied into [`Bytes`] so the buffer returns to its pool
//! immediately.

use std::io::Write;

use bizmock_core::{DeliveryUnit, Pool};
use bytes::Bytes;
use flate2::{write::GzEncoder, Compression};
use tracing::warn;

use crate::error::{Result, WebhookError};

/// An encoded delivery payload ready for transmission.
#[derive(Debug, Clone)]
pub struct EncodedPayload {
    /// Serialized (and possibly compressed) body.
    pub body: Bytes,
    /// Whether `body` is gzip-compressed.
    pub gzipped: bool,
}

/// Serializes delivery units into transport payloads.
#[derive(Debug, Clone)]
pub struct Encoder {
    compress: bool,
    compress_min_size: usize,
}

impl Encoder {
    /// Creates an encoder with the given compression policy.
    pub fn new(compress: bool, compress_min_size: usize) -> Self {
        Self { compress, compress_min_size }
    }

    /// Encodes a unit, compressing when policy and size call for it.
    ///
    /// # Errors
    ///
    /// Returns [`WebhookError::Serialize`] when JSON serialization fails.
    /// A compression failure falls back to the uncompressed payload rather
    /// than failing the delivery.
    pub fn encode(&self, unit: &DeliveryUnit, buffers: &Pool<Vec<u8>>) -> Result<EncodedPayload> {
        let mut buf = buffers.acquire();
        if let Err(err) = serde_json::to_writer(&mut buf, unit) {
            buffers.release(buf);
            return Err(WebhookError::serialize(&err));
        }

        if self.compress && buf.len() > self.compress_min_size {
            match gzip(&buf, buffers) {
                Ok(body) => {
                    buffers.release(buf);
                    return Ok(EncodedPayload { body, gzipped: true });
                }
                Err(err) => {
                    warn!(error = %err, "payload compression failed, sending uncompressed");
                }
            }
        }

        let body = Bytes::copy_from_slice(&buf);
        buffers.release(buf);
        Ok(EncodedPayload { body, gzipped: false })
    }
}

fn gzip(input: &[u8], buffers: &Pool<Vec<u8>>) -> std::io::Result<Bytes> {
    let mut out = buffers.acquire();
    let mut encoder = GzEncoder::new(&mut out, Compression::default());
    encoder.write_all(input)?;
    encoder.finish()?;
    let body = Bytes::copy_from_slice(&out);
    buffers.release(out);
    Ok(body)
}

#[cfg(test)]
mod tests {
    use std::io::Read;

    use bizmock_core::{Contact, Message, MessageType, StatusEvent, TextContent};
    use flate2::read::GzDecoder;

    use super::*;

    fn sample_unit(messages: usize) -> DeliveryUnit {
        DeliveryUnit {
            contacts: vec![Contact::new("491710000001", "TestUser")],
            messages: (0..messages)
                .map(|n| Message {
                    from: "491710000001".into(),
                    id: format!("id-{n}"),
                    timestamp: 1_700_000_000,
                    kind: MessageType::Text,
                    text: Some(TextContent { body: "Textbody".into() }),
                    ..Default::default()
                })
                .collect(),
            statuses: vec![StatusEvent {
                id: "wamid.1".into(),
                recipient_id: "491710000002".into(),
                timestamp: 1_700_000_000,
                ..Default::default()
            }],
            errors: Vec::new(),
        }
    }

    #[test]
    fn small_payload_stays_uncompressed() {
        let encoder = Encoder::new(true, 4096);
        let buffers = Pool::new(4);

        let payload = encoder.encode(&sample_unit(1), &buffers).unwrap();
        assert!(!payload.gzipped);

        let decoded: DeliveryUnit = serde_json::from_slice(&payload.body).unwrap();
        assert_eq!(decoded.messages.len(), 1);
        assert_eq!(decoded.statuses.len(), 1);
    }

    #[test]
    fn large_payload_compressed_above_threshold() {
        let encoder = Encoder::new(true, 256);
        let buffers = Pool::new(4);

        let payload = encoder.encode(&sample_unit(20), &buffers).unwrap();
        assert!(payload.gzipped);

        let mut decoder = GzDecoder::new(&payload.body[..]);
        let mut json = Vec::new();
        decoder.read_to_end(&mut json).unwrap();
        let decoded: DeliveryUnit = serde_json::from_slice(&json).unwrap();
        assert_eq!(decoded.messages.len(), 20);
        assert_eq!(decoded.contacts.len(), 1);
    }

    #[test]
    fn compression_disabled_never_gzips() {
        let encoder = Encoder::new(false, 0);
        let buffers = Pool::new(4);

        let payload = encoder.encode(&sample_unit(50), &buffers).unwrap();
        assert!(!payload.gzipped);
    }

    #[test]
    fn buffers_return_to_pool() {
        let encoder = Encoder::new(false, 0);
        let buffers = Pool::new(4);

        encoder.encode(&sample_unit(1), &buffers).unwrap();
        assert_eq!(buffers.idle(), 1);
        encoder.encode(&sample_unit(1), &buffers).unwrap();
        assert_eq!(buffers.idle(), 1);
    }
}
