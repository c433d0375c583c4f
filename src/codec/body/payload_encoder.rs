//! Unified encoder for message payloads.
//!
//! Body bytes already carry their framing in the message headers, so the
//! encoder either re-frames decoded chunks as chunked transfer encoding or
//! passes them through verbatim (fixed-length and close-delimited bodies).

use crate::codec::body::chunked_encoder::ChunkedEncoder;
use crate::protocol::{PayloadItem, SendError};
use bytes::BytesMut;

use tokio_util::codec::Encoder;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PayloadEncoder {
    kind: Kind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Kind {
    /// Chunked transfer encoding framing.
    Chunked(ChunkedEncoder),
    /// Verbatim body bytes; the headers declare the framing.
    Raw,
}

impl PayloadEncoder {
    pub fn chunked() -> Self {
        Self { kind: Kind::Chunked(ChunkedEncoder::new()) }
    }

    pub fn raw() -> Self {
        Self { kind: Kind::Raw }
    }
}

impl Encoder<PayloadItem> for PayloadEncoder {
    type Error = SendError;

    fn encode(&mut self, item: PayloadItem, dst: &mut BytesMut) -> Result<(), Self::Error> {
        match &mut self.kind {
            Kind::Chunked(encoder) => encoder.encode(item, dst),
            Kind::Raw => {
                if let PayloadItem::Chunk(bytes) = item {
                    dst.extend_from_slice(&bytes);
                }
                Ok(())
            }
        }
    }
}
