use bytes::BytesMut;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio_util::codec::Encoder;

use crate::codec::body::PayloadEncoder;
use crate::codec::header::{RequestHeadEncoder, ResponseHeadEncoder};
use crate::protocol::body::headers_declare_chunked;
use crate::protocol::{Body, Headers, PayloadItem, Request, Response, SendError};

/// Serializes a request into the sink, draining its body.
///
/// A lazy body is consumed in the process; attempting to write a message
/// whose body was already consumed fails with
/// [`BodyError::AlreadyConsumed`](crate::protocol::BodyError::AlreadyConsumed)
/// before any head bytes reach the sink.
pub async fn write_request<IO>(request: &mut Request, io: &mut IO) -> Result<(), SendError>
where
    IO: AsyncWrite + Unpin,
{
    let mut dst = BytesMut::new();
    RequestHeadEncoder.encode(request.head(), &mut dst)?;

    let encoder = body_encoder(request.headers());
    write_body(request.body_mut(), encoder, io, dst).await
}

/// Serializes a response into the sink, draining its body.
pub async fn write_response<IO>(response: &mut Response, io: &mut IO) -> Result<(), SendError>
where
    IO: AsyncWrite + Unpin,
{
    let mut dst = BytesMut::new();
    ResponseHeadEncoder.encode(response.head(), &mut dst)?;

    let encoder = body_encoder(response.headers());
    let body = response.body_mut();
    write_body(body, encoder, io, dst).await
}

/// The head's declared framing picks the body encoder: a chunked
/// Transfer-Encoding re-frames the decoded chunks, anything else writes
/// the bytes verbatim.
fn body_encoder(headers: &Headers) -> PayloadEncoder {
    if headers_declare_chunked(headers) {
        PayloadEncoder::chunked()
    } else {
        PayloadEncoder::raw()
    }
}

async fn write_body<IO>(
    body: Option<&mut Body>,
    mut encoder: PayloadEncoder,
    io: &mut IO,
    mut dst: BytesMut,
) -> Result<(), SendError>
where
    IO: AsyncWrite + Unpin,
{
    match body {
        None => {
            io.write_all(&dst).await?;
        }
        // eager bodies stay intact: a shared handle is written, so the
        // same message value can be serialized again
        Some(Body::Eager(eager)) => {
            if !eager.is_empty() {
                encoder.encode(PayloadItem::Chunk(eager.shared()), &mut dst)?;
            }
            encoder.encode(PayloadItem::Eof, &mut dst)?;
            io.write_all(&dst).await?;
        }
        Some(Body::Lazy(lazy)) => {
            while let Some(chunk) = lazy.next_chunk().await? {
                encoder.encode(PayloadItem::Chunk(chunk), &mut dst)?;
                io.write_all(&dst).await?;
                dst.clear();
            }
            encoder.encode(PayloadItem::Eof, &mut dst)?;
            io.write_all(&dst).await?;
        }
    }
    io.flush().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{RequestHead, ResponseHead};
    use http::{Method, StatusCode, Uri};

    #[tokio::test]
    async fn response_bytes_are_crlf_exact() {
        let mut response = ResponseHead::new(StatusCode::OK)
            .with_header("Content-Type", "text/plain")
            .unwrap()
            .with_body(Body::from_text("Hello RawHTTP!"));

        let mut sink = Vec::new();
        write_response(&mut response, &mut sink).await.unwrap();

        assert_eq!(
            sink,
            b"HTTP/1.1 200 OK\r\nContent-Type: text/plain\r\nContent-Length: 14\r\n\r\nHello RawHTTP!"
        );
    }

    #[tokio::test]
    async fn bodyless_request_ends_after_the_blank_line() {
        let mut request = RequestHead::new(Method::GET, Uri::from_static("/hello"))
            .with_header("Host", "example.com")
            .unwrap()
            .without_body();

        let mut sink = Vec::new();
        write_request(&mut request, &mut sink).await.unwrap();

        assert_eq!(sink, b"GET /hello HTTP/1.1\r\nHost: example.com\r\n\r\n");
    }

    #[tokio::test]
    async fn declared_chunked_body_is_reframed() {
        let mut request = RequestHead::new(Method::POST, Uri::from_static("/submit"))
            .with_header("Transfer-Encoding", "chunked")
            .unwrap()
            .with_body(Body::from_text("Hello RawHTTP!"));

        let mut sink = Vec::new();
        write_request(&mut request, &mut sink).await.unwrap();

        let text = String::from_utf8(sink).unwrap();
        assert!(text.ends_with("\r\n\r\nE\r\nHello RawHTTP!\r\n0\r\n\r\n"), "{text}");
    }

    #[tokio::test]
    async fn consumed_body_fails_before_any_bytes_are_written() {
        let raw = b"HTTP/1.1 200 OK\r\nContent-Length: 5\r\n\r\nhello";
        let mut response =
            crate::connection::parse_response(std::io::Cursor::new(raw.to_vec())).await.unwrap();
        response.body_mut().unwrap().bytes().await.unwrap();

        let mut sink = Vec::new();
        let err = write_response(&mut response, &mut sink).await.unwrap_err();
        assert!(matches!(err, SendError::Body { .. }));
    }

    #[tokio::test]
    async fn eager_bodies_serialize_repeatedly() {
        let mut response = ResponseHead::new(StatusCode::OK).with_body(Body::from_text("Hello RawHTTP!"));

        let mut first = Vec::new();
        write_response(&mut response, &mut first).await.unwrap();
        let mut second = Vec::new();
        write_response(&mut response, &mut second).await.unwrap();

        assert_eq!(first, second);
        assert!(first.ends_with(b"Hello RawHTTP!"));
    }

    #[tokio::test]
    async fn round_trip_preserves_header_order_and_casing() {
        let raw = b"GET /x HTTP/1.1\r\nHoSt: a\r\nX-One: 1\r\nHoSt: b\r\n\r\n";
        let mut request = crate::connection::parse_request(std::io::Cursor::new(raw.to_vec())).await.unwrap();

        let mut sink = Vec::new();
        write_request(&mut request, &mut sink).await.unwrap();
        assert_eq!(sink, raw);
    }
}
