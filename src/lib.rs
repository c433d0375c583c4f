//! A raw HTTP/1.1 message engine.
//!
//! This crate parses HTTP requests and responses directly off byte streams,
//! without requiring a full message to be buffered first, and writes them
//! back out with bit-exact CRLF framing. On top of the parser it ships a
//! deliberately thin TCP client and server.
//!
//! # Features
//!
//! - Streaming request/response parsing over any [`tokio::io::AsyncRead`]
//! - Header fidelity: insertion order, original casing and duplicate
//!   entries are preserved end to end
//! - Body framing resolution (Content-Length, chunked, read-until-close,
//!   or no body at all) with a fail-closed policy for conflicting length
//!   headers
//! - Lazy bodies bound to the live connection, consumable at most once,
//!   with eager materialization on demand
//! - Messages parseable from plain text (`"GET / HTTP/1.1".parse()`)
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use raw_http::client::TcpClient;
//! use raw_http::protocol::{Body, Request, Response};
//! use raw_http::server::{TcpServer, router_fn};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let server = TcpServer::bind("127.0.0.1:8092").await?;
//!     tokio::spawn(server.serve(Arc::new(router_fn(|request: Request| async move {
//!         let response: Response = "HTTP/1.1 200 OK\r\nContent-Type: text/plain".parse()?;
//!         Ok(response.with_body(Body::from_text("Hello RawHTTP!")))
//!     }))));
//!
//!     let request: Request = "GET http://127.0.0.1:8092/ HTTP/1.1".parse()?;
//!     let response = TcpClient::new().send(request).await?.eagerly().await?;
//!     assert_eq!(response.body().unwrap().as_eager().unwrap().as_str()?, "Hello RawHTTP!");
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! - [`protocol`]: the message model (start lines, [`protocol::Headers`],
//!   [`protocol::Body`]) and the error taxonomy
//! - [`codec`]: `tokio_util::codec` based decoders/encoders for heads and
//!   body payloads
//! - [`connection`]: [`connection::parse_request`] /
//!   [`connection::parse_response`] and message serialization over a
//!   byte sink
//! - [`server`], [`client`]: thin transport glue, one task per connection
//!
//! # Limitations
//!
//! - HTTP/1.x only, no TLS, no keep-alive reuse: one message exchange per
//!   connection
//! - Maximum header section size: 8KB; maximum number of headers: 64
//! - Bare LF line endings are tolerated on input; output is always CRLF

pub mod codec;
pub mod connection;
pub mod protocol;

pub mod client;
pub mod server;

mod utils;
pub(crate) use utils::ensure;
