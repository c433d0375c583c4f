//! Body framing resolution.
//!
//! Given a parsed header collection plus message context (request method,
//! response status), selects exactly one framing mode for the body. The
//! policy is fail-closed: conflicting Content-Length values abort parsing
//! instead of silently picking one, to avoid request-smuggling-class
//! ambiguity.

use http::{Method, StatusCode};

use crate::protocol::{Headers, ParseError};

const CONTENT_LENGTH: &str = "Content-Length";
const TRANSFER_ENCODING: &str = "Transfer-Encoding";

/// The framing mode of a message body: how many bytes of the stream
/// belong to it.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum BodyKind {
    /// No body at all; a genuine absence, not an empty body.
    Empty,
    /// Exactly this many bytes follow the header section.
    Length(u64),
    /// Chunked transfer encoding frames the body.
    Chunked,
    /// The body extends until the peer closes the stream; responses only.
    UntilClose,
}

impl BodyKind {
    #[inline]
    pub fn is_empty(&self) -> bool {
        matches!(self, BodyKind::Empty)
    }

    #[inline]
    pub fn is_chunked(&self) -> bool {
        matches!(self, BodyKind::Chunked)
    }
}

/// Selects the framing mode for a request body.
///
/// A chunked Transfer-Encoding takes precedence over Content-Length; a
/// request with neither header carries no body, whatever its method.
pub fn request_body_kind(headers: &Headers) -> Result<BodyKind, ParseError> {
    if headers_declare_chunked(headers) {
        return Ok(BodyKind::Chunked);
    }
    match content_length(headers)? {
        Some(length) => Ok(BodyKind::Length(length)),
        None => Ok(BodyKind::Empty),
    }
}

/// Selects the framing mode for a response body.
///
/// 1xx, 204 and 304 responses, and any response to a HEAD request, never
/// carry a body, even when a Content-Length header is present. A response
/// with neither Content-Length nor chunked Transfer-Encoding is framed by
/// connection close.
pub fn response_body_kind(
    headers: &Headers,
    status: StatusCode,
    request_method: Option<&Method>,
) -> Result<BodyKind, ParseError> {
    if status.is_informational() || status == StatusCode::NO_CONTENT || status == StatusCode::NOT_MODIFIED {
        return Ok(BodyKind::Empty);
    }
    if request_method == Some(&Method::HEAD) {
        return Ok(BodyKind::Empty);
    }
    if headers_declare_chunked(headers) {
        return Ok(BodyKind::Chunked);
    }
    match content_length(headers)? {
        Some(length) => Ok(BodyKind::Length(length)),
        None => Ok(BodyKind::UntilClose),
    }
}

/// True when the final encoding listed in Transfer-Encoding is `chunked`.
///
/// Chunked must be the last applied encoding to frame the message; a
/// Transfer-Encoding that does not end in chunked leaves the length
/// undetermined and is treated as no declared framing here.
pub(crate) fn headers_declare_chunked(headers: &Headers) -> bool {
    let mut last = None;
    for value in headers.get_all(TRANSFER_ENCODING) {
        for encoding in value.as_bytes().split(|b| *b == b',') {
            last = Some(encoding.trim_ascii());
        }
    }
    matches!(last, Some(encoding) if encoding.eq_ignore_ascii_case(b"chunked"))
}

/// Resolves Content-Length across duplicate entries and list values.
///
/// Identical duplicates collapse to the shared value; disagreeing values
/// fail with [`ParseError::ConflictingLengthHeaders`]; unparseable values
/// fail with [`ParseError::MalformedHeader`].
pub(crate) fn content_length(headers: &Headers) -> Result<Option<u64>, ParseError> {
    let mut resolved: Option<u64> = None;
    let mut seen = Vec::new();

    for value in headers.get_all(CONTENT_LENGTH) {
        for candidate in value.as_bytes().split(|b| *b == b',') {
            let candidate = candidate.trim_ascii();
            let text = std::str::from_utf8(candidate)
                .map_err(|_| ParseError::malformed_header("content-length is not ascii"))?;
            let length = text
                .parse::<u64>()
                .map_err(|_| ParseError::malformed_header(format!("content-length value {text:?} is not a non-negative integer")))?;
            seen.push(text.to_owned());
            match resolved {
                None => resolved = Some(length),
                Some(previous) if previous == length => {}
                Some(_) => return Err(ParseError::conflicting_length_headers(seen.join(", "))),
            }
        }
    }

    Ok(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{FieldName, FieldValue};

    fn headers(fields: &[(&str, &str)]) -> Headers {
        let mut headers = Headers::new();
        for (name, value) in fields {
            headers.append(name.parse::<FieldName>().unwrap(), value.parse::<FieldValue>().unwrap());
        }
        headers
    }

    #[test]
    fn request_without_length_indicator_has_no_body() {
        // POST without Content-Length or Transfer-Encoding: absent body
        assert_eq!(request_body_kind(&headers(&[("Host", "x")])).unwrap(), BodyKind::Empty);
    }

    #[test]
    fn request_with_content_length() {
        let kind = request_body_kind(&headers(&[("Content-Length", "14")])).unwrap();
        assert_eq!(kind, BodyKind::Length(14));

        let kind = request_body_kind(&headers(&[("content-length", "0")])).unwrap();
        assert_eq!(kind, BodyKind::Length(0));
    }

    #[test]
    fn chunked_takes_precedence_over_content_length() {
        let kind = request_body_kind(&headers(&[
            ("Content-Length", "14"),
            ("Transfer-Encoding", "chunked"),
        ]))
        .unwrap();
        assert_eq!(kind, BodyKind::Chunked);
    }

    #[test]
    fn chunked_must_be_the_final_encoding() {
        let kind = request_body_kind(&headers(&[("Transfer-Encoding", "gzip, chunked")])).unwrap();
        assert_eq!(kind, BodyKind::Chunked);

        let kind = request_body_kind(&headers(&[("Transfer-Encoding", "chunked, gzip")])).unwrap();
        assert_eq!(kind, BodyKind::Empty);
    }

    #[test]
    fn identical_duplicate_content_lengths_resolve() {
        let kind = request_body_kind(&headers(&[
            ("Content-Length", "5"),
            ("Content-Length", "5"),
        ]))
        .unwrap();
        assert_eq!(kind, BodyKind::Length(5));
    }

    #[test]
    fn conflicting_content_lengths_fail_closed() {
        let err = request_body_kind(&headers(&[
            ("Content-Length", "5"),
            ("Content-Length", "6"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ParseError::ConflictingLengthHeaders { .. }));

        let err = request_body_kind(&headers(&[("Content-Length", "5, 6")])).unwrap_err();
        assert!(matches!(err, ParseError::ConflictingLengthHeaders { .. }));
    }

    #[test]
    fn unparseable_content_length_is_malformed() {
        let err = request_body_kind(&headers(&[("Content-Length", "five")])).unwrap_err();
        assert!(matches!(err, ParseError::MalformedHeader { .. }));

        let err = request_body_kind(&headers(&[("Content-Length", "-1")])).unwrap_err();
        assert!(matches!(err, ParseError::MalformedHeader { .. }));
    }

    #[test]
    fn bodyless_statuses_override_content_length() {
        for status in [StatusCode::NO_CONTENT, StatusCode::NOT_MODIFIED, StatusCode::CONTINUE] {
            let kind = response_body_kind(&headers(&[("Content-Length", "10")]), status, None).unwrap();
            assert_eq!(kind, BodyKind::Empty, "status {status}");
        }
    }

    #[test]
    fn head_responses_have_no_body() {
        let kind =
            response_body_kind(&headers(&[("Content-Length", "10")]), StatusCode::OK, Some(&Method::HEAD)).unwrap();
        assert_eq!(kind, BodyKind::Empty);
    }

    #[test]
    fn response_without_length_reads_until_close() {
        let kind = response_body_kind(&headers(&[("Content-Type", "text/plain")]), StatusCode::OK, None).unwrap();
        assert_eq!(kind, BodyKind::UntilClose);
    }
}
