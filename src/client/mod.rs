//! A thin TCP client: connect, write, parse, hand the stream to the body.
//!
//! [`TcpClient::send`] opens a fresh connection per request. The returned
//! response owns the stream through its lazy body, so the connection
//! stays alive exactly as long as there is body left to read.

use tokio::net::TcpStream;
use tracing::debug;

use crate::connection::{parse_response_to, write_request};
use crate::protocol::{HttpError, Request, Response, SendError};

/// One-connection-per-request HTTP client.
#[derive(Debug, Default)]
pub struct TcpClient;

impl TcpClient {
    pub fn new() -> Self {
        Self
    }

    /// Sends a request and parses the response off the same connection.
    ///
    /// The target host comes from the request target's authority when the
    /// target is absolute, from the Host header otherwise; a request with
    /// neither fails with [`SendError::InvalidRequest`]. The response is
    /// framed with the request method in mind, so HEAD responses come
    /// back bodyless whatever their Content-Length says.
    pub async fn send(&self, mut request: Request) -> Result<Response, HttpError> {
        let authority = connect_authority(&request)?;
        debug!(%authority, "connecting");

        let mut stream = TcpStream::connect(&authority).await.map_err(SendError::io)?;
        write_request(&mut request, &mut stream).await.map_err(HttpError::from)?;

        let response = parse_response_to(stream, Some(request.method())).await?;
        Ok(response)
    }
}

/// The `host:port` to connect to.
fn connect_authority(request: &Request) -> Result<String, SendError> {
    if let Some(authority) = request.target().authority() {
        let port = request.target().port_u16().unwrap_or(80);
        return Ok(format!("{}:{port}", authority.host()));
    }

    let Some(host) = request.headers().get("Host") else {
        return Err(SendError::invalid_request("target has no authority and no Host header is present"));
    };
    let host = host.to_str().map_err(|_| SendError::invalid_request("Host header is not utf-8"))?;

    // a bracketed IPv6 literal carries colons without carrying a port
    let has_port = match host.rfind(':') {
        Some(at) => !host[at..].contains(']'),
        None => false,
    };
    if has_port {
        Ok(host.to_owned())
    } else {
        Ok(format!("{host}:80"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::RequestHead;
    use http::{Method, Uri};

    fn get(target: &'static str) -> RequestHead {
        RequestHead::new(Method::GET, Uri::from_static(target))
    }

    #[test]
    fn authority_from_absolute_target() {
        let request = get("http://example.com/hello").without_body();
        assert_eq!(connect_authority(&request).unwrap(), "example.com:80");

        let request = get("http://example.com:8092/hello").without_body();
        assert_eq!(connect_authority(&request).unwrap(), "example.com:8092");
    }

    #[test]
    fn authority_from_host_header() {
        let request = get("/hello").with_header("Host", "example.com:8092").unwrap().without_body();
        assert_eq!(connect_authority(&request).unwrap(), "example.com:8092");

        let request = get("/hello").with_header("Host", "example.com").unwrap().without_body();
        assert_eq!(connect_authority(&request).unwrap(), "example.com:80");

        let request = get("/hello").with_header("Host", "[::1]").unwrap().without_body();
        assert_eq!(connect_authority(&request).unwrap(), "[::1]:80");

        let request = get("/hello").with_header("Host", "[::1]:8092").unwrap().without_body();
        assert_eq!(connect_authority(&request).unwrap(), "[::1]:8092");
    }

    #[test]
    fn no_host_at_all_is_invalid() {
        let request = get("/hello").without_body();
        let err = connect_authority(&request).unwrap_err();
        assert!(matches!(err, SendError::InvalidRequest { .. }));
    }
}
