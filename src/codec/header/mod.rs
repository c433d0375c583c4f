//! Head parsing and serialization.
//!
//! [`RequestHeadDecoder`] and [`ResponseHeadDecoder`] parse heads off a
//! byte stream; [`RequestHeadEncoder`] and [`ResponseHeadEncoder`] write
//! them back out in strict CRLF form. The line-level parsing functions are
//! shared with the text parsing entry points.

mod head_decoder;
mod head_encoder;

pub use head_decoder::{RequestHeadDecoder, ResponseHeadDecoder};
pub use head_encoder::{RequestHeadEncoder, ResponseHeadEncoder};

pub(crate) use head_decoder::{find_head_end, parse_request_head, parse_response_head};
