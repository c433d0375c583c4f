use bytes::{Bytes, BytesMut};
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio_util::codec::Decoder;

use crate::codec::body::PayloadDecoder;
use crate::protocol::{ParseError, PayloadItem};

/// Drives a [`PayloadDecoder`] over the stream a message head was parsed
/// from, starting with whatever the head parser over-read.
pub struct BodyReader {
    io: Box<dyn AsyncRead + Send + Unpin>,
    buffer: BytesMut,
    decoder: PayloadDecoder,
    finished: bool,
}

impl std::fmt::Debug for BodyReader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BodyReader").field("buffered", &self.buffer.len()).field("finished", &self.finished).finish()
    }
}

impl BodyReader {
    pub(crate) fn new(io: Box<dyn AsyncRead + Send + Unpin>, buffer: BytesMut, decoder: PayloadDecoder) -> Self {
        Self { io, buffer, decoder, finished: false }
    }

    /// The next decoded chunk, or `None` once the framing terminated.
    pub(crate) async fn read_chunk(&mut self) -> Result<Option<Bytes>, ParseError> {
        if self.finished {
            return Ok(None);
        }
        loop {
            if let Some(item) = self.decoder.decode(&mut self.buffer)? {
                match item {
                    PayloadItem::Chunk(chunk) => return Ok(Some(chunk)),
                    PayloadItem::Eof => {
                        self.finished = true;
                        return Ok(None);
                    }
                }
            }

            self.buffer.reserve(8 * 1024);
            let n = self.io.read_buf(&mut self.buffer).await?;
            if n == 0 {
                return match self.decoder.decode_eof(&mut self.buffer)? {
                    Some(PayloadItem::Chunk(chunk)) => Ok(Some(chunk)),
                    Some(PayloadItem::Eof) => {
                        self.finished = true;
                        Ok(None)
                    }
                    None => Err(ParseError::UnexpectedEndOfStream),
                };
            }
        }
    }
}
