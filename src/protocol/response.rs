use std::fmt;
use std::str::FromStr;

use http::{StatusCode, Version};
use tokio::io::AsyncWrite;

use crate::codec::header::parse_response_head;
use crate::protocol::body::{eager_body_from_text, reconcile_framing_headers, response_body_kind};
use crate::protocol::{Body, BodyError, Headers, ParseError, SendError};

/// The status line and header section of a response.
///
/// The reason phrase is carried verbatim: whatever the peer sent is kept
/// through a parse/write round trip, including a non-standard or empty
/// phrase.
#[derive(Debug, Clone)]
pub struct ResponseHead {
    version: Version,
    status: StatusCode,
    reason: String,
    headers: Headers,
}

/// A response head paired with an optional body.
#[derive(Debug)]
pub struct Response {
    head: ResponseHead,
    body: Option<Body>,
}

impl ResponseHead {
    /// A head with the standard reason phrase for the status, where one
    /// exists.
    pub fn new(status: StatusCode) -> Self {
        Self {
            version: Version::HTTP_11,
            status,
            reason: status.canonical_reason().unwrap_or_default().to_owned(),
            headers: Headers::new(),
        }
    }

    pub(crate) fn from_parts(version: Version, status: StatusCode, reason: String, headers: Headers) -> Self {
        Self { version, status, reason, headers }
    }

    pub fn version(&self) -> Version {
        self.version
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    pub fn headers_mut(&mut self) -> &mut Headers {
        &mut self.headers
    }

    pub fn with_version(mut self, version: Version) -> Self {
        self.version = version;
        self
    }

    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.reason = status.canonical_reason().unwrap_or_default().to_owned();
        self.status = status;
        self
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = reason.into();
        self
    }

    /// Appends a header field, keeping any existing fields of the same
    /// name and their order.
    pub fn with_header(mut self, name: &str, value: &str) -> Result<Self, ParseError> {
        self.headers.append(name.try_into()?, value.try_into()?);
        Ok(self)
    }

    /// Attaches a body, lining the framing headers up with it.
    pub fn with_body(mut self, body: Body) -> Response {
        reconcile_framing_headers(&mut self.headers, &body);
        Response { head: self, body: Some(body) }
    }

    /// Finishes the head into a bodyless response.
    pub fn without_body(mut self) -> Response {
        self.headers.remove("Content-Length");
        Response { head: self, body: None }
    }
}

impl Response {
    pub fn head(&self) -> &ResponseHead {
        &self.head
    }

    pub fn status(&self) -> StatusCode {
        self.head.status
    }

    pub fn version(&self) -> Version {
        self.head.version
    }

    pub fn headers(&self) -> &Headers {
        &self.head.headers
    }

    pub fn body(&self) -> Option<&Body> {
        self.body.as_ref()
    }

    pub fn body_mut(&mut self) -> Option<&mut Body> {
        self.body.as_mut()
    }

    pub(crate) fn from_parts(head: ResponseHead, body: Option<Body>) -> Self {
        Self { head, body }
    }

    pub fn into_parts(self) -> (ResponseHead, Option<Body>) {
        (self.head, self.body)
    }

    /// Replaces the body, reconciling the framing headers with the new one.
    pub fn with_body(self, body: Body) -> Self {
        self.head.with_body(body)
    }

    /// Materializes the body into memory, returning an otherwise identical
    /// response that can be read repeatedly.
    pub async fn eagerly(self) -> Result<Self, BodyError> {
        let body = match self.body {
            Some(body) => Some(body.eagerly().await?),
            None => None,
        };
        Ok(Self { head: self.head, body })
    }

    /// Serializes the response into the sink, draining its body.
    pub async fn write_to<IO>(&mut self, io: &mut IO) -> Result<(), SendError>
    where
        IO: AsyncWrite + Unpin,
    {
        crate::connection::write_response(self, io).await
    }
}

/// Parses a response from text, the body taken eagerly from whatever
/// follows the head.
///
/// With neither Content-Length nor chunked framing the rest of the input
/// plays the close-delimited body, so an empty remainder means no body at
/// all.
impl FromStr for Response {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let input = s.as_bytes();
        let (head_bytes, rest) = match crate::codec::header::find_head_end(input) {
            Some(end) => (&input[..end], &input[end..]),
            None => (input, &input[input.len()..]),
        };
        let head = parse_response_head(head_bytes)?;
        let kind = response_body_kind(&head.headers, head.status, None)?;
        let body = eager_body_from_text(kind, rest)?;
        Ok(Self { head, body })
    }
}

impl fmt::Display for ResponseHead {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} {} {}", self.version, self.status.as_u16(), self.reason)
    }
}
