//! End-to-end exchanges over real TCP sockets.

use std::sync::Arc;

use http::{Method, StatusCode};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

use raw_http::client::TcpClient;
use raw_http::protocol::{Body, Request, Response, ResponseHead};
use raw_http::server::{router_fn, Router, TcpServer};

async fn spawn_server<R: Router + 'static>(router: R) -> std::net::SocketAddr {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();

    let server = TcpServer::bind("127.0.0.1:0").await.unwrap();
    let addr = server.local_addr().unwrap();
    tokio::spawn(server.serve(Arc::new(router)));
    addr
}

fn hello_router() -> impl Router + 'static {
    router_fn(|request: Request| async move {
        if request.method() != Method::GET {
            return Ok(ResponseHead::new(StatusCode::METHOD_NOT_ALLOWED).with_body(Body::from_bytes(Vec::new())));
        }
        let response = ResponseHead::new(StatusCode::OK).with_header("Content-Type", "text/plain")?;
        Ok(response.with_body(Body::from_text("Hello RawHTTP!")))
    })
}

#[tokio::test]
async fn hello_exchange_is_byte_exact_on_the_wire() {
    let addr = spawn_server(hello_router()).await;

    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream.write_all(b"GET /hello HTTP/1.1\r\nHost: localhost\r\n\r\n").await.unwrap();

    let mut raw = Vec::new();
    stream.read_to_end(&mut raw).await.unwrap();

    assert_eq!(
        raw,
        b"HTTP/1.1 200 OK\r\nContent-Type: text/plain\r\nContent-Length: 14\r\n\r\nHello RawHTTP!"
    );
}

#[tokio::test]
async fn client_reads_the_hello_body_eagerly() {
    let addr = spawn_server(hello_router()).await;

    let request: Request = format!("GET http://{addr}/hello HTTP/1.1\r\n\r\n").parse().unwrap();
    let response = TcpClient::new().send(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers().get("Content-Type").unwrap().to_str().unwrap(), "text/plain");

    let response = response.eagerly().await.unwrap();
    let body = response.body().unwrap().as_eager().unwrap();
    assert_eq!(body.as_str().unwrap(), "Hello RawHTTP!");

    // eager bodies re-read without complaint
    assert_eq!(body.as_bytes(), b"Hello RawHTTP!");
}

#[tokio::test]
async fn non_get_requests_are_rejected_by_the_router() {
    let addr = spawn_server(hello_router()).await;

    let request: Request =
        format!("DELETE http://{addr}/hello HTTP/1.1\r\n\r\n").parse().unwrap();
    let response = TcpClient::new().send(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn post_without_length_indicator_parses_bodyless_and_does_not_hang() {
    let addr = spawn_server(router_fn(|request: Request| async move {
        // no Content-Length and no Transfer-Encoding: the body is absent
        assert!(request.body().is_none());
        Ok(ResponseHead::new(StatusCode::OK).with_body(Body::from_text("ok")))
    }))
    .await;

    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream.write_all(b"POST /submit HTTP/1.1\r\nHost: localhost\r\n\r\nignored tail").await.unwrap();

    let mut raw = Vec::new();
    stream.read_to_end(&mut raw).await.unwrap();
    let text = String::from_utf8(raw).unwrap();
    assert!(text.starts_with("HTTP/1.1 200 OK\r\n"), "{text}");
}

#[tokio::test]
async fn request_body_round_trips_through_the_router() {
    let addr = spawn_server(router_fn(|mut request: Request| async move {
        let bytes = request.body_mut().unwrap().bytes().await?;
        Ok(ResponseHead::new(StatusCode::OK).with_body(Body::from_bytes(bytes)))
    }))
    .await;

    let request: Request = format!("POST http://{addr}/echo HTTP/1.1\r\nContent-Length: 14\r\n\r\nHello RawHTTP!")
        .parse()
        .unwrap();
    let response = TcpClient::new().send(request).await.unwrap().eagerly().await.unwrap();
    assert_eq!(response.body().unwrap().as_eager().unwrap().as_str().unwrap(), "Hello RawHTTP!");
}

#[tokio::test]
async fn malformed_request_gets_a_best_effort_400() {
    let addr = spawn_server(hello_router()).await;

    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream.write_all(b"GET /\r\n\r\n").await.unwrap();

    let mut raw = Vec::new();
    stream.read_to_end(&mut raw).await.unwrap();
    let text = String::from_utf8(raw).unwrap();
    assert!(text.starts_with("HTTP/1.1 400 Bad Request\r\n"), "{text}");
}

#[tokio::test]
async fn router_failure_gets_a_best_effort_500() {
    let addr = spawn_server(router_fn(|_request: Request| async move {
        Err::<Response, _>("boom".into())
    }))
    .await;

    let request: Request = format!("GET http://{addr}/ HTTP/1.1\r\n\r\n").parse().unwrap();
    let response = TcpClient::new().send(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn lazy_response_body_is_consumed_at_most_once() {
    let addr = spawn_server(hello_router()).await;

    let request: Request = format!("GET http://{addr}/hello HTTP/1.1\r\n\r\n").parse().unwrap();
    let mut response = TcpClient::new().send(request).await.unwrap();

    let body = response.body_mut().unwrap();
    assert_eq!(&body.bytes().await.unwrap()[..], b"Hello RawHTTP!");
    assert!(body.bytes().await.is_err());
}

#[tokio::test]
async fn chunked_response_is_reframed_for_the_client() {
    let addr = spawn_server(router_fn(|_request: Request| async move {
        let response = ResponseHead::new(StatusCode::OK).with_header("Transfer-Encoding", "chunked")?;
        Ok(response.with_body(Body::from_text("Hello RawHTTP!")))
    }))
    .await;

    let request: Request = format!("GET http://{addr}/ HTTP/1.1\r\n\r\n").parse().unwrap();
    let response = TcpClient::new().send(request).await.unwrap().eagerly().await.unwrap();
    assert_eq!(response.body().unwrap().as_eager().unwrap().as_str().unwrap(), "Hello RawHTTP!");
}
