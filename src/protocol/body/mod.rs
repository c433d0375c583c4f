//! Lazy and eager message bodies.
//!
//! A body parsed off a connection starts out *lazy*: it holds the
//! remaining stream (plus whatever the head parser over-read) and defers
//! all reads until consumed. A lazy body can be consumed at most once;
//! materializing it with [`Body::eagerly`] turns it into an *eager* body
//! whose bytes live in memory and can be read any number of times.
//!
//! A lazy body that is never consumed before its backing connection goes
//! away is simply lost; that is the caller's responsibility, not a defect.

mod reader;
mod resolver;

pub use reader::BodyReader;
pub use resolver::BodyKind;
pub(crate) use resolver::{headers_declare_chunked, request_body_kind, response_body_kind};

use std::fmt;
use std::str::Utf8Error;

use bytes::{Bytes, BytesMut};
use tokio_util::codec::Decoder;

use crate::codec::body::PayloadDecoder;
use crate::protocol::{BodyError, FieldName, FieldValue, Headers, ParseError, PayloadItem};

/// A message body: either still bound to the stream it was parsed from,
/// or an owned in-memory buffer.
pub enum Body {
    Lazy(LazyBody),
    Eager(EagerBody),
}

/// A stream-bound body, consumable at most once.
///
/// The unconsumed/consumed lifecycle is modelled by the inner `Option`:
/// consuming the body takes the reader out, and a second consumption
/// attempt fails with [`BodyError::AlreadyConsumed`].
pub struct LazyBody {
    reader: Option<BodyReader>,
    kind: BodyKind,
}

impl fmt::Debug for LazyBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LazyBody").field("kind", &self.kind).field("consumed", &self.reader.is_none()).finish()
    }
}

/// An in-memory body; reading it is cheap and repeatable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EagerBody {
    bytes: Bytes,
}

impl Body {
    /// An eager body over UTF-8 text.
    pub fn from_text(text: &str) -> Self {
        Self::Eager(EagerBody { bytes: Bytes::copy_from_slice(text.as_bytes()) })
    }

    /// An eager body over raw bytes.
    pub fn from_bytes(bytes: impl Into<Bytes>) -> Self {
        Self::Eager(EagerBody { bytes: bytes.into() })
    }

    pub(crate) fn lazy(reader: BodyReader, kind: BodyKind) -> Self {
        Self::Lazy(LazyBody { reader: Some(reader), kind })
    }

    /// The framing mode this body was resolved with; eager bodies are
    /// always fixed-length.
    pub fn kind(&self) -> BodyKind {
        match self {
            Self::Lazy(lazy) => lazy.kind,
            Self::Eager(eager) => BodyKind::Length(eager.bytes.len() as u64),
        }
    }

    pub fn is_eager(&self) -> bool {
        matches!(self, Self::Eager(_))
    }

    pub fn as_eager(&self) -> Option<&EagerBody> {
        match self {
            Self::Eager(eager) => Some(eager),
            Self::Lazy(_) => None,
        }
    }

    /// Materializes the body into memory.
    ///
    /// Blocks until the framing terminates (all declared bytes, the last
    /// chunk, or end of stream for close-delimited bodies). Idempotent on
    /// already-eager bodies.
    pub async fn eagerly(self) -> Result<Body, BodyError> {
        match self {
            Self::Eager(eager) => Ok(Self::Eager(eager)),
            Self::Lazy(mut lazy) => {
                let bytes = lazy.collect().await?;
                Ok(Self::Eager(EagerBody { bytes }))
            }
        }
    }

    /// Reads the full body bytes.
    ///
    /// On a lazy body this consumes the underlying stream exactly once; a
    /// second call fails with [`BodyError::AlreadyConsumed`]. On an eager
    /// body it is a cheap clone, callable any number of times.
    pub async fn bytes(&mut self) -> Result<Bytes, BodyError> {
        match self {
            Self::Eager(eager) => Ok(eager.bytes.clone()),
            Self::Lazy(lazy) => lazy.collect().await,
        }
    }

}

impl fmt::Debug for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Lazy(lazy) => f
                .debug_struct("LazyBody")
                .field("kind", &lazy.kind)
                .field("consumed", &lazy.reader.is_none())
                .finish(),
            Self::Eager(eager) => f.debug_struct("EagerBody").field("len", &eager.bytes.len()).finish(),
        }
    }
}

impl LazyBody {
    /// The next decoded chunk off the stream, or `None` once the body is
    /// fully read (which marks it consumed).
    pub async fn next_chunk(&mut self) -> Result<Option<Bytes>, BodyError> {
        let reader = self.reader.as_mut().ok_or(BodyError::AlreadyConsumed)?;
        match reader.read_chunk().await? {
            Some(chunk) => Ok(Some(chunk)),
            None => {
                self.reader = None;
                Ok(None)
            }
        }
    }

    async fn collect(&mut self) -> Result<Bytes, BodyError> {
        let mut reader = self.reader.take().ok_or(BodyError::AlreadyConsumed)?;
        let mut collected = BytesMut::new();
        while let Some(chunk) = reader.read_chunk().await? {
            collected.extend_from_slice(&chunk);
        }
        Ok(collected.freeze())
    }
}

impl EagerBody {
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// The body as UTF-8 text.
    pub fn as_str(&self) -> Result<&str, Utf8Error> {
        std::str::from_utf8(&self.bytes)
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// A cheap shared handle to the body bytes.
    pub(crate) fn shared(&self) -> Bytes {
        self.bytes.clone()
    }
}

/// Lines up a message's framing headers with the body being attached.
///
/// An already-declared chunked Transfer-Encoding wins: the body will be
/// re-framed as chunks on write and no Content-Length is set. Otherwise a
/// fixed-length body upserts `Content-Length` in place, and a
/// close-delimited body removes any stale one.
pub(crate) fn reconcile_framing_headers(headers: &mut Headers, body: &Body) {
    const CONTENT_LENGTH: &str = "Content-Length";

    if headers_declare_chunked(headers) {
        headers.remove(CONTENT_LENGTH);
        return;
    }

    match body.kind() {
        BodyKind::Length(length) => {
            headers.upsert(FieldName::from_static(CONTENT_LENGTH), FieldValue::from(length));
        }
        BodyKind::Chunked => {
            headers.upsert(FieldName::from_static("Transfer-Encoding"), FieldValue::from_static("chunked"));
            headers.remove(CONTENT_LENGTH);
        }
        BodyKind::UntilClose | BodyKind::Empty => {
            headers.remove(CONTENT_LENGTH);
        }
    }
}

/// Builds the body of a message parsed from text, where the remainder of
/// the input after the head plays the stream.
pub(crate) fn eager_body_from_text(kind: BodyKind, rest: &[u8]) -> Result<Option<Body>, ParseError> {
    match kind {
        BodyKind::Empty => Ok(None),
        BodyKind::Length(length) => {
            let length = usize::try_from(length)
                .map_err(|_| ParseError::malformed_header("content-length exceeds addressable memory"))?;
            if rest.len() < length {
                return Err(ParseError::TruncatedBody { remaining: (length - rest.len()) as u64 });
            }
            // anything beyond the declared length is discarded
            Ok(Some(Body::from_bytes(Bytes::copy_from_slice(&rest[..length]))))
        }
        BodyKind::Chunked => {
            let mut decoder = PayloadDecoder::chunked();
            let mut buffer = BytesMut::from(rest);
            let mut collected = BytesMut::new();
            loop {
                match decoder.decode_eof(&mut buffer)? {
                    Some(PayloadItem::Chunk(chunk)) => collected.extend_from_slice(&chunk),
                    Some(PayloadItem::Eof) => return Ok(Some(Body::from_bytes(collected.freeze()))),
                    None => return Err(ParseError::UnexpectedEndOfStream),
                }
            }
        }
        BodyKind::UntilClose => {
            if rest.is_empty() {
                Ok(None)
            } else {
                Ok(Some(Body::from_bytes(Bytes::copy_from_slice(rest))))
            }
        }
    }
}
