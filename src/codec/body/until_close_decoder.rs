//! Decoder for close-delimited response bodies.
//!
//! When a response declares neither Content-Length nor chunked
//! Transfer-Encoding, the body extends until the peer closes the stream.

use crate::protocol::{ParseError, PayloadItem};
use bytes::BytesMut;
use tokio_util::codec::Decoder;

/// Passes every available byte through as body data; end of stream is the
/// body terminator, never an error.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UntilCloseDecoder;

impl UntilCloseDecoder {
    pub fn new() -> Self {
        Self
    }
}

impl Decoder for UntilCloseDecoder {
    type Item = PayloadItem;
    type Error = ParseError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if src.is_empty() {
            return Ok(None);
        }
        Ok(Some(PayloadItem::Chunk(src.split().freeze())))
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        match self.decode(src)? {
            Some(item) => Ok(Some(item)),
            None => Ok(Some(PayloadItem::Eof)),
        }
    }
}
