use futures::StreamExt;
use http::Method;
use tokio::io::AsyncRead;
use tokio_util::codec::FramedRead;

use crate::codec::body::PayloadDecoder;
use crate::codec::header::{RequestHeadDecoder, ResponseHeadDecoder};
use crate::protocol::body::{request_body_kind, response_body_kind, BodyReader};
use crate::protocol::{Body, BodyKind, ParseError, Request, Response};

/// Parses a request off a byte stream.
///
/// Only the head is read eagerly; the body stays lazy, bound to the
/// stream, until the caller consumes it. A stream that ends before a
/// complete head fails with [`ParseError::UnexpectedEndOfStream`], an
/// entirely empty stream included.
pub async fn parse_request<IO>(io: IO) -> Result<Request, ParseError>
where
    IO: AsyncRead + Send + Unpin + 'static,
{
    let mut framed = FramedRead::new(io, RequestHeadDecoder);
    let head = match framed.next().await {
        Some(head) => head?,
        None => return Err(ParseError::UnexpectedEndOfStream),
    };

    let kind = request_body_kind(head.headers())?;
    let body = take_body(framed, kind);
    Ok(Request::from_parts(head, body))
}

/// Parses a response off a byte stream, without request context.
///
/// Equivalent to [`parse_response_to`] with no request method: use that
/// variant when the response answers a known request, so HEAD responses
/// are framed correctly.
pub async fn parse_response<IO>(io: IO) -> Result<Response, ParseError>
where
    IO: AsyncRead + Send + Unpin + 'static,
{
    parse_response_to(io, None).await
}

/// Parses a response to a request with the given method.
pub async fn parse_response_to<IO>(io: IO, request_method: Option<&Method>) -> Result<Response, ParseError>
where
    IO: AsyncRead + Send + Unpin + 'static,
{
    let mut framed = FramedRead::new(io, ResponseHeadDecoder);
    let head = match framed.next().await {
        Some(head) => head?,
        None => return Err(ParseError::UnexpectedEndOfStream),
    };

    let kind = response_body_kind(head.headers(), head.status(), request_method)?;
    let body = take_body(framed, kind);
    Ok(Response::from_parts(head, body))
}

/// Rebinds whatever the head decoder over-read, plus the stream itself,
/// into a lazy body of the resolved kind.
fn take_body<IO, D>(mut framed: FramedRead<IO, D>, kind: BodyKind) -> Option<Body>
where
    IO: AsyncRead + Send + Unpin + 'static,
    D: tokio_util::codec::Decoder,
{
    if kind.is_empty() {
        return None;
    }
    let leftover = framed.read_buffer_mut().split();
    let io = framed.into_inner();
    let reader = BodyReader::new(Box::new(io), leftover, PayloadDecoder::from(kind));
    Some(Body::lazy(reader, kind))
}
