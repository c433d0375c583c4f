//! Request and response head encoders.
//!
//! Output is strict CRLF regardless of how leniently the input was
//! parsed, and header fields are written in stored order with their
//! stored casing. Framing headers are the head's business: the encoder
//! writes exactly what the head carries.

use std::io::{self, Write};

use bytes::{BufMut, BytesMut};
use http::Version;
use tokio_util::codec::Encoder;

use crate::protocol::{Headers, RequestHead, ResponseHead, SendError};

/// Initial buffer size reserved for head serialization
const INIT_HEAD_SIZE: usize = 4 * 1024;

/// Encoder serializing a [`RequestHead`] into raw bytes.
#[derive(Debug)]
pub struct RequestHeadEncoder;

/// Encoder serializing a [`ResponseHead`] into raw bytes.
#[derive(Debug)]
pub struct ResponseHeadEncoder;

impl Encoder<&RequestHead> for RequestHeadEncoder {
    type Error = SendError;

    fn encode(&mut self, head: &RequestHead, dst: &mut BytesMut) -> Result<(), Self::Error> {
        dst.reserve(INIT_HEAD_SIZE);
        write!(FastWrite(dst), "{} {} {}\r\n", head.method(), head.target(), version_str(head.version())?)?;
        encode_fields(head.headers(), dst);
        Ok(())
    }
}

impl Encoder<&ResponseHead> for ResponseHeadEncoder {
    type Error = SendError;

    /// The status line always carries the separating space, so an empty
    /// reason phrase yields `HTTP/1.1 200 ` exactly as the grammar reads
    /// it back.
    fn encode(&mut self, head: &ResponseHead, dst: &mut BytesMut) -> Result<(), Self::Error> {
        dst.reserve(INIT_HEAD_SIZE);
        write!(FastWrite(dst), "{} {} {}\r\n", version_str(head.version())?, head.status().as_str(), head.reason())?;
        encode_fields(head.headers(), dst);
        Ok(())
    }
}

fn encode_fields(headers: &Headers, dst: &mut BytesMut) {
    for (name, value) in headers.iter() {
        dst.put_slice(name.as_str().as_bytes());
        dst.put_slice(b": ");
        dst.put_slice(value.as_bytes());
        dst.put_slice(b"\r\n");
    }
    dst.put_slice(b"\r\n");
}

fn version_str(version: Version) -> Result<&'static str, SendError> {
    match version {
        Version::HTTP_11 => Ok("HTTP/1.1"),
        Version::HTTP_10 => Ok("HTTP/1.0"),
        Version::HTTP_09 => Ok("HTTP/0.9"),
        _ => Err(SendError::io(io::Error::from(io::ErrorKind::Unsupported))),
    }
}

/// Writer over BytesMut skipping io::Write's error paths; space has
/// already been reserved.
struct FastWrite<'a>(&'a mut BytesMut);

impl Write for FastWrite<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.put_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::{Method, StatusCode, Uri};

    #[test]
    fn request_head_is_crlf_exact() {
        let head = RequestHead::new(Method::GET, Uri::from_static("/hello"))
            .with_header("Host", "example.com")
            .unwrap()
            .with_header("Accept", "*/*")
            .unwrap();

        let mut dst = BytesMut::new();
        RequestHeadEncoder.encode(&head, &mut dst).unwrap();

        assert_eq!(&dst[..], b"GET /hello HTTP/1.1\r\nHost: example.com\r\nAccept: */*\r\n\r\n" as &[u8]);
    }

    #[test]
    fn response_head_keeps_reason_and_field_casing() {
        let head = ResponseHead::new(StatusCode::OK)
            .with_header("Content-Type", "text/plain")
            .unwrap()
            .with_header("x-lower", "1")
            .unwrap();

        let mut dst = BytesMut::new();
        ResponseHeadEncoder.encode(&head, &mut dst).unwrap();

        assert_eq!(&dst[..], b"HTTP/1.1 200 OK\r\nContent-Type: text/plain\r\nx-lower: 1\r\n\r\n" as &[u8]);
    }

    #[test]
    fn empty_reason_still_gets_its_space() {
        let head = ResponseHead::new(StatusCode::OK).with_reason("");

        let mut dst = BytesMut::new();
        ResponseHeadEncoder.encode(&head, &mut dst).unwrap();

        assert!(dst.starts_with(b"HTTP/1.1 200 \r\n"));
    }

    #[test]
    fn lenient_parse_writes_back_strict_crlf() {
        let head = crate::codec::header::parse_request_head(b"GET /hello HTTP/1.1\nHost: example.com\n").unwrap();

        let mut dst = BytesMut::new();
        RequestHeadEncoder.encode(&head, &mut dst).unwrap();

        assert_eq!(&dst[..], b"GET /hello HTTP/1.1\r\nHost: example.com\r\n\r\n" as &[u8]);
    }
}
