//! Reading and writing whole messages over a byte stream.
//!
//! [`parse_request`] and [`parse_response`] decode a head off the stream
//! and hand the remainder to a lazy body; [`write_request`] and
//! [`write_response`] serialize a message, draining its body into the
//! sink with the framing its headers declare.

mod reader;
mod writer;

pub use reader::{parse_request, parse_response, parse_response_to};
pub use writer::{write_request, write_response};
