use std::fmt;
use std::str::FromStr;

use http::{Method, Uri, Version};
use tokio::io::AsyncWrite;

use crate::codec::header::parse_request_head;
use crate::protocol::body::{eager_body_from_text, reconcile_framing_headers, request_body_kind};
use crate::protocol::{Body, BodyError, FieldName, FieldValue, Headers, ParseError, SendError};

/// The start line and header section of a request.
///
/// Heads are value types: the `with_*` builders consume the head and
/// return an updated copy, leaving any message the original was cloned
/// from untouched.
#[derive(Debug, Clone)]
pub struct RequestHead {
    method: Method,
    target: Uri,
    version: Version,
    headers: Headers,
}

/// A request head paired with an optional body.
#[derive(Debug)]
pub struct Request {
    head: RequestHead,
    body: Option<Body>,
}

impl RequestHead {
    pub fn new(method: Method, target: Uri) -> Self {
        Self { method, target, version: Version::HTTP_11, headers: Headers::new() }
    }

    pub(crate) fn from_parts(method: Method, target: Uri, version: Version, headers: Headers) -> Self {
        let mut head = Self { method, target, version, headers };
        head.insert_host_from_target();
        head
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn target(&self) -> &Uri {
        &self.target
    }

    pub fn version(&self) -> Version {
        self.version
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    pub fn headers_mut(&mut self) -> &mut Headers {
        &mut self.headers
    }

    pub fn with_method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    pub fn with_target(mut self, target: Uri) -> Self {
        self.target = target;
        self
    }

    pub fn with_version(mut self, version: Version) -> Self {
        self.version = version;
        self
    }

    /// Appends a header field, keeping any existing fields of the same
    /// name and their order.
    pub fn with_header(mut self, name: &str, value: &str) -> Result<Self, ParseError> {
        self.headers.append(name.try_into()?, value.try_into()?);
        Ok(self)
    }

    /// When the target carries an authority and no Host header is present,
    /// derives one, keeping it first as clients conventionally send it.
    fn insert_host_from_target(&mut self) {
        if self.headers.contains("Host") {
            return;
        }
        if let Some(authority) = self.target.authority()
            && let Ok(host) = FieldValue::from_wire(authority.as_str().as_bytes())
        {
            self.headers.prepend(FieldName::from_static("Host"), host);
        }
    }

    /// Attaches a body, lining the framing headers up with it.
    pub fn with_body(mut self, body: Body) -> Request {
        reconcile_framing_headers(&mut self.headers, &body);
        Request { head: self, body: Some(body) }
    }

    /// Finishes the head into a bodyless request.
    pub fn without_body(mut self) -> Request {
        self.headers.remove("Content-Length");
        Request { head: self, body: None }
    }
}

impl Request {
    pub fn head(&self) -> &RequestHead {
        &self.head
    }

    pub fn method(&self) -> &Method {
        &self.head.method
    }

    pub fn target(&self) -> &Uri {
        &self.head.target
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

    pub(crate) fn from_parts(head: RequestHead, body: Option<Body>) -> Self {
        Self { head, body }
    }

    pub fn into_parts(self) -> (RequestHead, Option<Body>) {
        (self.head, self.body)
    }

    /// Replaces the body, reconciling the framing headers with the new one.
    pub fn with_body(self, body: Body) -> Self {
        self.head.with_body(body)
    }

    /// Materializes the body into memory, returning an otherwise identical
    /// request that can be read repeatedly.
    pub async fn eagerly(self) -> Result<Self, BodyError> {
        let body = match self.body {
            Some(body) => Some(body.eagerly().await?),
            None => None,
        };
        Ok(Self { head: self.head, body })
    }

    /// Serializes the request into the sink, draining its body.
    pub async fn write_to<IO>(&mut self, io: &mut IO) -> Result<(), SendError>
    where
        IO: AsyncWrite + Unpin,
    {
        crate::connection::write_request(self, io).await
    }
}

/// Parses a request from text, the body taken eagerly from whatever
/// follows the head.
///
/// End of input terminates the head even without a blank line, so header
/// probes like `"GET / HTTP/1.1\r\nHost: example.com"` parse. The body is
/// framed exactly as it would be off a stream; a Content-Length larger
/// than the remaining input fails with [`ParseError::TruncatedBody`].
impl FromStr for Request {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let input = s.as_bytes();
        let (head_bytes, rest) = match crate::codec::header::find_head_end(input) {
            Some(end) => (&input[..end], &input[end..]),
            None => (input, &input[input.len()..]),
        };
        let head = parse_request_head(head_bytes)?;
        let kind = request_body_kind(&head.headers)?;
        let body = eager_body_from_text(kind, rest)?;
        Ok(Self { head, body })
    }
}

impl fmt::Display for RequestHead {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {:?}", self.method, self.target, self.version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builders_keep_the_original_head() {
        let head = RequestHead::new(Method::GET, Uri::from_static("/hello"));
        let with_accept = head.clone().with_header("Accept", "text/plain").unwrap();

        assert!(head.headers().is_empty());
        assert_eq!(with_accept.headers().get("accept").unwrap().to_str().unwrap(), "text/plain");
    }

    #[test]
    fn with_body_sets_content_length() {
        let request = RequestHead::new(Method::POST, Uri::from_static("/submit"))
            .with_body(Body::from_text("Hello RawHTTP!"));
        assert_eq!(request.headers().get("Content-Length").unwrap().to_str().unwrap(), "14");
    }

    #[test]
    fn with_body_replaces_a_stale_content_length() {
        let request = RequestHead::new(Method::POST, Uri::from_static("/submit"))
            .with_header("Content-Length", "3")
            .unwrap()
            .with_body(Body::from_text("Hello RawHTTP!"));
        assert_eq!(request.headers().get_all("Content-Length").count(), 1);
        assert_eq!(request.headers().get("Content-Length").unwrap().to_str().unwrap(), "14");
    }

    #[test]
    fn with_body_keeps_declared_chunked_framing() {
        let request = RequestHead::new(Method::POST, Uri::from_static("/submit"))
            .with_header("Transfer-Encoding", "chunked")
            .unwrap()
            .with_body(Body::from_text("Hello RawHTTP!"));
        assert!(!request.headers().contains("Content-Length"));
    }

    #[tokio::test]
    async fn parses_from_text_with_body() {
        let request: Request = "POST /submit HTTP/1.1\r\nHost: example.com\r\nContent-Length: 5\r\n\r\nhello, trailing"
            .parse()
            .unwrap();
        assert_eq!(request.method(), &Method::POST);

        let mut request = request;
        let body = request.body_mut().unwrap();
        assert_eq!(&body.bytes().await.unwrap()[..], b"hello");
    }

    #[test]
    fn parses_from_text_without_blank_line() {
        let request: Request = "GET /hello HTTP/1.1\r\nHost: example.com".parse().unwrap();
        assert_eq!(request.target().path(), "/hello");
        assert_eq!(request.headers().get("Host").unwrap().to_str().unwrap(), "example.com");
        assert!(request.body().is_none());
    }

    #[test]
    fn absolute_target_fills_in_the_host_header() {
        let request: Request = "GET http://example.com/hello HTTP/1.1\r\n\r\n".parse().unwrap();
        assert_eq!(request.headers().get("Host").unwrap().to_str().unwrap(), "example.com");
    }

    #[test]
    fn explicit_host_header_is_kept() {
        let request: Request = "GET http://example.com/hello HTTP/1.1\r\nHost: other.example\r\n\r\n".parse().unwrap();
        assert_eq!(request.headers().get_all("Host").count(), 1);
        assert_eq!(request.headers().get("Host").unwrap().to_str().unwrap(), "other.example");
    }
}
