//! Streaming codecs bridging raw bytes and the message model.
//!
//! Everything here implements [`tokio_util::codec`]'s [`Decoder`] and
//! [`Encoder`] traits: heads in [`header`], body framing in [`body`]. The
//! connection layer composes them; they carry no transport knowledge of
//! their own.
//!
//! [`Decoder`]: tokio_util::codec::Decoder
//! [`Encoder`]: tokio_util::codec::Encoder

pub mod body;
pub mod header;
