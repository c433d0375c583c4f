//! A thin TCP server: accept, parse, route, write, close.
//!
//! Each accepted connection runs on its own task and carries exactly one
//! request/response exchange. The server owns no routing logic beyond
//! dispatching to the supplied [`Router`]; what little policy it has is
//! error translation: a request that fails to parse gets a best-effort
//! `400 Bad Request`, a router failure a best-effort `500 Internal Server
//! Error`, and in both cases the connection is closed.

use std::error::Error;
use std::future::Future;
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use async_trait::async_trait;
use http::StatusCode;
use tokio::io::AsyncWriteExt;
use tokio::net::{TcpListener, TcpStream, ToSocketAddrs};
use tracing::{error, info, warn};

use crate::connection::{parse_request, write_response};
use crate::protocol::{Body, Request, Response, ResponseHead};

/// Routes a request to a response.
///
/// Errors are boxed: whatever the router fails with is logged and turned
/// into a `500` by the connection task.
#[async_trait]
pub trait Router: Send + Sync {
    async fn route(&self, request: Request) -> Result<Response, Box<dyn Error + Send + Sync>>;
}

/// A [`Router`] built from a plain async function, see [`router_fn`].
#[derive(Debug)]
pub struct RouterFn<F> {
    f: F,
}

#[async_trait]
impl<F, Fut> Router for RouterFn<F>
where
    F: Fn(Request) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Response, Box<dyn Error + Send + Sync>>> + Send,
{
    async fn route(&self, request: Request) -> Result<Response, Box<dyn Error + Send + Sync>> {
        (self.f)(request).await
    }
}

/// Wraps an async function as a [`Router`].
pub fn router_fn<F, Fut>(f: F) -> RouterFn<F>
where
    F: Fn(Request) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Response, Box<dyn Error + Send + Sync>>> + Send,
{
    RouterFn { f }
}

/// A TCP acceptor driving one connection task per accepted stream.
#[derive(Debug)]
pub struct TcpServer {
    listener: TcpListener,
}

impl TcpServer {
    pub async fn bind(addr: impl ToSocketAddrs) -> io::Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        Ok(Self { listener })
    }

    /// The bound address; useful when binding to port 0.
    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Runs the accept loop until the listener fails.
    pub async fn serve<R>(self, router: Arc<R>) -> io::Result<()>
    where
        R: Router + 'static,
    {
        info!(addr = %self.listener.local_addr()?, "start listening");
        loop {
            let (stream, remote_addr) = match self.listener.accept().await {
                Ok(accepted) => accepted,
                Err(e) => {
                    warn!(cause = %e, "failed to accept");
                    continue;
                }
            };

            let router = router.clone();
            tokio::spawn(async move {
                info!(%remote_addr, "accepted connection");
                handle_connection(stream, router).await;
            });
        }
    }
}

async fn handle_connection<R: Router>(stream: TcpStream, router: Arc<R>) {
    let (reader, mut writer) = stream.into_split();

    let mut response = match parse_request(reader).await {
        Ok(request) => match router.route(request).await {
            Ok(response) => response,
            Err(e) => {
                error!(cause = %e, "router failed");
                error_response(StatusCode::INTERNAL_SERVER_ERROR)
            }
        },
        Err(e) => {
            warn!(cause = %e, "failed to parse request");
            error_response(StatusCode::BAD_REQUEST)
        }
    };

    if let Err(e) = write_response(&mut response, &mut writer).await {
        warn!(cause = %e, "failed to write response");
    }
    if let Err(e) = writer.shutdown().await {
        warn!(cause = %e, "failed to shutdown connection");
    }
}

/// Best-effort error response; the peer may already be gone.
fn error_response(status: StatusCode) -> Response {
    ResponseHead::new(status).with_body(Body::from_bytes(Vec::new()))
}
