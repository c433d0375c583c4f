//! Request and response head decoders.
//!
//! The grammar is hand-written rather than delegated to a parser crate so
//! that the header section survives parsing exactly as sent: field order,
//! name casing and duplicate fields are all kept. Input line endings are
//! lenient (a bare LF terminates a line just like CRLF), version strings
//! outside HTTP/0.9, 1.0 and 1.1 are rejected, and obsolete line folding
//! is refused outright.
//!
//! # Limits
//!
//! - Maximum header section size: 8KB
//! - Maximum number of header fields: 64

use std::str;

use bytes::{Buf, BytesMut};
use http::{Method, StatusCode, Uri, Version};
use tokio_util::codec::Decoder;
use tracing::trace;

use crate::ensure;
use crate::protocol::{FieldName, FieldValue, Headers, ParseError, RequestHead, ResponseHead};

/// Maximum number of header fields in a head
pub(crate) const MAX_HEADER_NUM: usize = 64;

/// Maximum size in bytes of the entire head
pub(crate) const MAX_HEAD_BYTES: usize = 8 * 1024;

/// Streaming decoder for request heads.
///
/// Bytes past the blank line are left in the buffer for the body decoder.
#[derive(Debug)]
pub struct RequestHeadDecoder;

/// Streaming decoder for response heads.
#[derive(Debug)]
pub struct ResponseHeadDecoder;

impl Decoder for RequestHeadDecoder {
    type Item = RequestHead;
    type Error = ParseError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        let Some(end) = find_head_end(src) else {
            ensure!(src.len() <= MAX_HEAD_BYTES, ParseError::too_large_header(src.len(), MAX_HEAD_BYTES));
            return Ok(None);
        };
        ensure!(end <= MAX_HEAD_BYTES, ParseError::too_large_header(end, MAX_HEAD_BYTES));

        trace!(head_size = end, "parsed request head");
        let head = parse_request_head(&src[..end])?;
        src.advance(end);
        Ok(Some(head))
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        match self.decode(src)? {
            Some(head) => Ok(Some(head)),
            None if src.is_empty() => Ok(None),
            None => Err(ParseError::UnexpectedEndOfStream),
        }
    }
}

impl Decoder for ResponseHeadDecoder {
    type Item = ResponseHead;
    type Error = ParseError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        let Some(end) = find_head_end(src) else {
            ensure!(src.len() <= MAX_HEAD_BYTES, ParseError::too_large_header(src.len(), MAX_HEAD_BYTES));
            return Ok(None);
        };
        ensure!(end <= MAX_HEAD_BYTES, ParseError::too_large_header(end, MAX_HEAD_BYTES));

        trace!(head_size = end, "parsed response head");
        let head = parse_response_head(&src[..end])?;
        src.advance(end);
        Ok(Some(head))
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        match self.decode(src)? {
            Some(head) => Ok(Some(head)),
            None if src.is_empty() => Ok(None),
            None => Err(ParseError::UnexpectedEndOfStream),
        }
    }
}

/// Finds the end of the head: the offset just past the blank line.
///
/// A line break is either CRLF or a bare LF, and the two may be mixed
/// within one head.
pub(crate) fn find_head_end(buf: &[u8]) -> Option<usize> {
    let mut line_start = 0;
    for (i, b) in buf.iter().enumerate() {
        if *b != b'\n' {
            continue;
        }
        let line = &buf[line_start..i];
        if line.is_empty() || line == b"\r" {
            return Some(i + 1);
        }
        line_start = i + 1;
    }
    None
}

/// Splits a head into its lines, each stripped of its line break.
fn head_lines(head: &[u8]) -> impl Iterator<Item = &[u8]> {
    head.split(|b| *b == b'\n').map(|line| line.strip_suffix(b"\r").unwrap_or(line)).take_while(|line| !line.is_empty())
}

/// Parses a request head (start line plus header section).
pub(crate) fn parse_request_head(head: &[u8]) -> Result<RequestHead, ParseError> {
    let mut lines = head_lines(head);
    let start_line = lines.next().ok_or_else(|| ParseError::malformed_start_line("empty start line"))?;

    let mut fields = split_fields(start_line);
    let method = fields.next().ok_or_else(|| ParseError::malformed_start_line("missing method"))?;
    let target = fields.next().ok_or_else(|| ParseError::malformed_start_line("missing request target"))?;
    let version = fields.next().ok_or_else(|| ParseError::malformed_start_line("missing http version"))?;
    ensure!(fields.next().is_none(), ParseError::malformed_start_line("request line has more than three fields"));

    let method = Method::from_bytes(method).map_err(|_| ParseError::malformed_start_line("invalid method"))?;
    let target = str::from_utf8(target)
        .ok()
        .and_then(|t| t.parse::<Uri>().ok())
        .ok_or_else(|| ParseError::malformed_start_line("invalid request target"))?;
    let version = parse_version(version)?;

    let headers = parse_header_fields(lines)?;
    Ok(RequestHead::from_parts(method, target, version, headers))
}

/// Parses a response head (status line plus header section).
///
/// The reason phrase is everything after the status code, kept verbatim;
/// it may legitimately be empty.
pub(crate) fn parse_response_head(head: &[u8]) -> Result<ResponseHead, ParseError> {
    let mut lines = head_lines(head);
    let start_line = lines.next().ok_or_else(|| ParseError::malformed_start_line("empty status line"))?;

    let (version, after_version) = match start_line.iter().position(|b| *b == b' ') {
        Some(at) => (&start_line[..at], &start_line[at + 1..]),
        None => return Err(ParseError::malformed_start_line("missing status code")),
    };
    let version = parse_version(version)?;

    let after_version = trim_spaces(after_version);
    let (status, reason) = match after_version.iter().position(|b| *b == b' ') {
        Some(at) => (&after_version[..at], &after_version[at + 1..]),
        None => (after_version, &after_version[after_version.len()..]),
    };
    let status = parse_status(status)?;
    let reason = str::from_utf8(reason)
        .map_err(|_| ParseError::malformed_start_line("reason phrase is not utf-8"))?
        .to_owned();

    let headers = parse_header_fields(lines)?;
    Ok(ResponseHead::from_parts(version, status, reason, headers))
}

fn parse_version(bytes: &[u8]) -> Result<Version, ParseError> {
    match bytes {
        b"HTTP/1.1" => Ok(Version::HTTP_11),
        b"HTTP/1.0" => Ok(Version::HTTP_10),
        b"HTTP/0.9" => Ok(Version::HTTP_09),
        other => Err(ParseError::unsupported_version(String::from_utf8_lossy(other))),
    }
}

fn parse_status(bytes: &[u8]) -> Result<StatusCode, ParseError> {
    let code = str::from_utf8(bytes)
        .ok()
        .and_then(|s| s.parse::<u16>().ok())
        .ok_or_else(|| ParseError::malformed_start_line(format!("invalid status code {:?}", String::from_utf8_lossy(bytes))))?;
    ensure!((100..=599).contains(&code), ParseError::malformed_start_line(format!("status code {code} out of range")));
    StatusCode::from_u16(code).map_err(|_| ParseError::malformed_start_line(format!("status code {code} out of range")))
}

fn parse_header_fields<'a>(lines: impl Iterator<Item = &'a [u8]>) -> Result<Headers, ParseError> {
    let mut headers = Headers::new();
    for line in lines {
        ensure!(headers.len() < MAX_HEADER_NUM, ParseError::too_many_headers(MAX_HEADER_NUM));
        ensure!(
            !line.starts_with(b" ") && !line.starts_with(b"\t"),
            ParseError::malformed_header("obsolete line folding is not supported")
        );

        let colon = line
            .iter()
            .position(|b| *b == b':')
            .ok_or_else(|| ParseError::malformed_header(format!("no colon in header line {:?}", String::from_utf8_lossy(line))))?;

        // whitespace between the field name and the colon is rejected by
        // token validation in FieldName
        let name = FieldName::from_wire(&line[..colon])?;
        let value = FieldValue::from_wire(trim_spaces(&line[colon + 1..]))?;
        headers.append(name, value);
    }
    Ok(headers)
}

/// Splits a start line into fields on runs of spaces.
fn split_fields(line: &[u8]) -> impl Iterator<Item = &[u8]> {
    line.split(|b| *b == b' ').filter(|f| !f.is_empty())
}

fn trim_spaces(bytes: &[u8]) -> &[u8] {
    let start = bytes.iter().position(|b| *b != b' ' && *b != b'\t').unwrap_or(bytes.len());
    let end = bytes.iter().rposition(|b| *b != b' ' && *b != b'\t').map_or(start, |p| p + 1);
    &bytes[start..end]
}
