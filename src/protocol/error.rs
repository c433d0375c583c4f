use std::io;
use thiserror::Error;

/// Top level error for a single connection's message exchange.
#[derive(Debug, Error)]
pub enum HttpError {
    #[error("parse error: {source}")]
    Parse {
        #[from]
        source: ParseError,
    },

    #[error("send error: {source}")]
    Send {
        #[from]
        source: SendError,
    },
}

/// Errors raised while reading a message off the wire.
///
/// Syntax errors (`MalformedStartLine`, `MalformedHeader`,
/// `UnsupportedVersion`) and framing errors (`ConflictingLengthHeaders`,
/// `TruncatedBody`) abort parsing immediately: no partial message is ever
/// returned, and the caller must treat the connection as unusable.
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("malformed start line: {reason}")]
    MalformedStartLine { reason: String },

    #[error("unsupported http version: {found:?}")]
    UnsupportedVersion { found: String },

    #[error("malformed header: {reason}")]
    MalformedHeader { reason: String },

    #[error("unexpected end of stream")]
    UnexpectedEndOfStream,

    #[error("conflicting content-length headers: {values}")]
    ConflictingLengthHeaders { values: String },

    #[error("truncated body: {remaining} more bytes expected")]
    TruncatedBody { remaining: u64 },

    #[error("header section too large, current: {current_size} exceed the limit {max_size}")]
    TooLargeHeader { current_size: usize, max_size: usize },

    #[error("header number exceed the limit {max_num}")]
    TooManyHeaders { max_num: usize },

    #[error("invalid chunked encoding: {reason}")]
    InvalidChunk { reason: String },

    #[error("io error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },
}

impl ParseError {
    pub fn malformed_start_line<S: ToString>(reason: S) -> Self {
        Self::MalformedStartLine { reason: reason.to_string() }
    }

    pub fn malformed_header<S: ToString>(reason: S) -> Self {
        Self::MalformedHeader { reason: reason.to_string() }
    }

    pub fn unsupported_version<S: ToString>(found: S) -> Self {
        Self::UnsupportedVersion { found: found.to_string() }
    }

    pub fn conflicting_length_headers<S: ToString>(values: S) -> Self {
        Self::ConflictingLengthHeaders { values: values.to_string() }
    }

    pub fn too_large_header(current_size: usize, max_size: usize) -> Self {
        Self::TooLargeHeader { current_size, max_size }
    }

    pub fn too_many_headers(max_num: usize) -> Self {
        Self::TooManyHeaders { max_num }
    }

    pub fn invalid_chunk<S: ToString>(reason: S) -> Self {
        Self::InvalidChunk { reason: reason.to_string() }
    }

    pub fn io<E: Into<io::Error>>(e: E) -> Self {
        Self::Io { source: e.into() }
    }
}

/// Errors raised while consuming a [`Body`](crate::protocol::Body).
///
/// `AlreadyConsumed` is a programming-contract error, not a wire-level
/// problem: it is kept distinct so callers don't conflate caller misuse
/// with a malformed peer.
#[derive(Error, Debug)]
pub enum BodyError {
    #[error("body already consumed")]
    AlreadyConsumed,

    #[error("body read error: {source}")]
    Read {
        #[from]
        source: ParseError,
    },
}

/// Errors raised while serializing a message to a byte sink.
#[derive(Error, Debug)]
pub enum SendError {
    #[error("body error: {source}")]
    Body {
        #[from]
        source: BodyError,
    },

    #[error("invalid request: {reason}")]
    InvalidRequest { reason: String },

    #[error("io error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },
}

impl SendError {
    pub fn invalid_request<S: ToString>(reason: S) -> Self {
        Self::InvalidRequest { reason: reason.to_string() }
    }

    pub fn io<E: Into<io::Error>>(e: E) -> Self {
        Self::Io { source: e.into() }
    }
}
