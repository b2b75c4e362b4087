//! Bundled HTTP/1.1 transport.
//!
//! One connection per request over a tokio `TcpStream`, driven by hyper's
//! low-level client. Plain `http://` only.

use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::client::conn::http1;
use hyper::header::HOST;
use hyper::{Request, Uri};
use hyper_util::rt::TokioIo;
use indexmap::IndexMap;
use tokio::net::TcpStream;
use tracing::debug;

use crate::error::{ErrorCode, ResultExt, SdkError, SdkResult};
use crate::transport::{Credentials, RequestInit, Transport, TransportFuture, TransportResponse};

/// Headers that carry credentials and are dropped under
/// [`Credentials::Omit`].
const CREDENTIAL_HEADERS: [&str; 2] = ["authorization", "cookie"];

/// HTTP/1.1 transport backed by hyper.
///
/// Enforces [`RequestInit::timeout`] over connect, send and body read.
#[derive(Debug, Clone, Copy, Default)]
pub struct HttpTransport;

impl HttpTransport {
    pub fn new() -> Self {
        Self
    }
}

impl Transport for HttpTransport {
    fn send(&self, url: &str, init: RequestInit) -> TransportFuture {
        let url = url.to_string();
        Box::pin(async move {
            let target = parse_url(&url)?;
            match init.timeout {
                Some(limit) => tokio::time::timeout(limit, exchange(target, init))
                    .await
                    .map_err(|_| SdkError::timeout())?,
                None => exchange(target, init).await,
            }
        })
    }
}

/// Where a request goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Target {
    /// Host to connect to, without IPv6 brackets.
    pub host: String,
    pub port: u16,
    /// Path and query sent as the request target.
    pub path: String,
    /// Value of the `Host` header.
    pub authority: String,
}

async fn exchange(target: Target, init: RequestInit) -> SdkResult<TransportResponse> {
    let RequestInit {
        method,
        headers,
        body,
        credentials,
        ..
    } = init;

    let stream = TcpStream::connect((target.host.as_str(), target.port))
        .await
        .map_sdk_err_with(
            ErrorCode::ConnectionRefused,
            format!("Connection to {} failed", target.authority),
        )?;

    let (mut sender, connection) = http1::handshake(TokioIo::new(stream))
        .await
        .map_sdk_err_with(ErrorCode::NetworkError, "Handshake failed")?;
    tokio::spawn(async move {
        if let Err(err) = connection.await {
            debug!("Connection closed: {:?}", err);
        }
    });

    let mut builder = Request::builder()
        .method(method)
        .uri(target.path.as_str())
        .header(HOST, target.authority.as_str());
    for (name, value) in &headers {
        if credentials == Credentials::Omit && CREDENTIAL_HEADERS.contains(&name.as_str()) {
            continue;
        }
        builder = builder.header(name.as_str(), value.as_str());
    }
    let request = builder
        .body(Full::new(Bytes::from(body)))
        .map_sdk_err(ErrorCode::InvalidRequest)?;

    debug!(host = %target.host, port = target.port, path = %target.path, "POST");
    let response = sender
        .send_request(request)
        .await
        .map_sdk_err_with(ErrorCode::NetworkError, "Request failed")?;

    let status = response.status().as_u16();
    let headers: IndexMap<String, String> = response
        .headers()
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|value| (name.as_str().to_string(), value.to_string()))
        })
        .collect();
    let body = response
        .into_body()
        .collect()
        .await
        .map_sdk_err_with(ErrorCode::NetworkError, "Read failed")?
        .to_bytes();

    Ok(TransportResponse {
        status,
        headers,
        body,
    })
}

/// Resolves an endpoint URL into a connect target. A URL without a scheme
/// is taken as `http`; a missing port is 80.
pub(crate) fn parse_url(url: &str) -> SdkResult<Target> {
    let url = url.trim();
    let uri: Uri = url
        .parse()
        .map_sdk_err_with(ErrorCode::InvalidUrl, format!("Invalid URL: {}", url))?;

    match uri.scheme_str() {
        None | Some("http") => {}
        Some("https") => {
            return Err(SdkError::new(
                ErrorCode::HttpsNotSupported,
                "HTTPS is not supported by the bundled transport. Supply a TLS-capable transport instead.",
            ))
        }
        Some(other) => {
            return Err(SdkError::new(
                ErrorCode::InvalidUrl,
                format!("Unsupported scheme: {}", other),
            ))
        }
    }

    let host = match uri.host() {
        Some(host) if !host.is_empty() => host,
        _ => {
            return Err(SdkError::new(
                ErrorCode::InvalidUrl,
                format!("Missing host in URL: {}", url),
            ))
        }
    };
    let authority = match uri.port_u16() {
        Some(port) => format!("{}:{}", host, port),
        None => host.to_string(),
    };
    let path = match uri.path_and_query().map(|p| p.as_str()) {
        Some(path) if path.starts_with('/') => path.to_string(),
        Some(query) => format!("/{}", query),
        None => "/".to_string(),
    };

    Ok(Target {
        host: host.trim_start_matches('[').trim_end_matches(']').to_string(),
        port: uri.port_u16().unwrap_or(80),
        path,
        authority,
    })
}
