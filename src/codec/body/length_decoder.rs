//! Decoder for bodies framed by a Content-Length header.

use std::cmp;

use crate::protocol::{ParseError, PayloadItem};
use bytes::BytesMut;
use tokio_util::codec::Decoder;

/// Decodes exactly `length` body bytes, then reports EOF.
///
/// Bytes left on the stream beyond the declared length are not consumed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LengthDecoder {
    /// The number of bytes remaining to be read from the payload.
    length: u64,
}

impl LengthDecoder {
    pub fn new(length: u64) -> Self {
        Self { length }
    }
}

impl Decoder for LengthDecoder {
    type Item = PayloadItem;
    type Error = ParseError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if self.length == 0 {
            return Ok(Some(PayloadItem::Eof));
        }

        if src.is_empty() {
            return Ok(None);
        }

        let len = cmp::min(self.length, src.len() as u64);
        let bytes = src.split_to(len as usize).freeze();

        self.length -= bytes.len() as u64;
        Ok(Some(PayloadItem::Chunk(bytes)))
    }

    /// The stream ended: anything short of the declared length is a
    /// truncated body.
    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if let Some(item) = self.decode(src)? {
            return Ok(Some(item));
        }
        if self.length > 0 {
            return Err(ParseError::TruncatedBody { remaining: self.length });
        }
        Ok(Some(PayloadItem::Eof))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_exactly_the_declared_length() {
        let mut buffer = BytesMut::from(&b"101234567890abcdef\r\n\r\n"[..]);

        let mut decoder = LengthDecoder::new(10);
        let item = decoder.decode(&mut buffer).unwrap().unwrap();

        assert!(item.is_chunk());
        assert_eq!(&item.as_bytes().unwrap()[..], b"1012345678");

        // excess bytes are left on the stream
        assert_eq!(&buffer[..], b"90abcdef\r\n\r\n");

        let item = decoder.decode(&mut buffer).unwrap().unwrap();
        assert!(item.is_eof());
    }

    #[test]
    fn zero_length_yields_immediate_eof() {
        let mut buffer = BytesMut::from(&b"leftover"[..]);
        let mut decoder = LengthDecoder::new(0);

        let item = decoder.decode(&mut buffer).unwrap().unwrap();
        assert!(item.is_eof());
        assert_eq!(&buffer[..], b"leftover");
    }

    #[test]
    fn early_eof_is_a_truncated_body() {
        let mut buffer = BytesMut::from(&b"abc"[..]);
        let mut decoder = LengthDecoder::new(10);

        let item = decoder.decode_eof(&mut buffer).unwrap().unwrap();
        assert_eq!(&item.into_bytes().unwrap()[..], b"abc");

        let err = decoder.decode_eof(&mut buffer).unwrap_err();
        assert!(matches!(err, ParseError::TruncatedBody { remaining: 7 }));
    }
}
