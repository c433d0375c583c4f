//! Encoding and decoding of message bodies.
//!
//! Decoders cover the three framing modes the body resolver can select
//! (fixed length, chunked, read-until-close); encoders re-frame outgoing
//! body chunks as chunked transfer encoding or pass them through verbatim.

mod chunked_decoder;
mod chunked_encoder;
mod length_decoder;
mod payload_decoder;
mod payload_encoder;
mod until_close_decoder;

pub use payload_decoder::PayloadDecoder;
pub use payload_encoder::PayloadEncoder;
