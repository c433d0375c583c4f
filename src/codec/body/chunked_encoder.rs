//! Encoder for chunked transfer encoding.

use crate::protocol::{PayloadItem, SendError};
use bytes::{BufMut, BytesMut};
use std::io::Write;

use tokio_util::codec::Encoder;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkedEncoder {
    eof: bool,
}

impl ChunkedEncoder {
    pub fn new() -> Self {
        Self { eof: false }
    }

    pub fn is_finished(&self) -> bool {
        self.eof
    }
}

impl Default for ChunkedEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl Encoder<PayloadItem> for ChunkedEncoder {
    type Error = SendError;

    fn encode(&mut self, item: PayloadItem, dst: &mut BytesMut) -> Result<(), Self::Error> {
        if self.eof {
            return Ok(());
        }

        match item {
            PayloadItem::Chunk(bytes) => {
                if bytes.is_empty() {
                    // a zero-sized chunk would terminate the body early
                    return Ok(());
                }
                write!(Writer(dst), "{:X}\r\n", bytes.len())?;
                dst.reserve(bytes.len() + 2);
                dst.extend_from_slice(&bytes);
                dst.extend_from_slice(b"\r\n");
                Ok(())
            }
            PayloadItem::Eof => {
                self.eof = true;
                dst.extend_from_slice(b"0\r\n\r\n");
                Ok(())
            }
        }
    }
}

struct Writer<'a>(&'a mut BytesMut);

impl std::io::Write for Writer<'_> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.put_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    #[test]
    fn encodes_sizes_data_and_terminator() {
        let mut encoder = ChunkedEncoder::new();
        let mut dst = BytesMut::new();

        encoder.encode(PayloadItem::Chunk(Bytes::from_static(b"hello")), &mut dst).unwrap();
        encoder.encode(PayloadItem::Chunk(Bytes::from_static(b", world")), &mut dst).unwrap();
        encoder.encode(PayloadItem::Eof, &mut dst).unwrap();

        assert_eq!(&dst[..], b"5\r\nhello\r\n7\r\n, world\r\n0\r\n\r\n");
        assert!(encoder.is_finished());
    }

    #[test]
    fn empty_chunks_are_skipped() {
        let mut encoder = ChunkedEncoder::new();
        let mut dst = BytesMut::new();

        encoder.encode(PayloadItem::Chunk(Bytes::new()), &mut dst).unwrap();
        assert!(dst.is_empty());
    }
}
