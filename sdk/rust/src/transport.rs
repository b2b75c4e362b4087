//! Transport abstraction.
//!
//! The client never performs I/O itself. It hands a fully built
//! [`RequestInit`] to a [`Transport`] and reads the JSON body of whatever
//! comes back. Any `Fn(String, RequestInit) -> impl Future` closure is a
//! transport, which keeps test stubs and host-provided fetchers cheap to
//! write; [`crate::HttpTransport`] is the bundled HTTP/1.1 implementation.

use crate::error::{SdkError, SdkResult};
use bytes::Bytes;
use hyper::Method;
use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::str::FromStr;
use std::time::Duration;

/// Future returned by [`Transport::send`].
pub type TransportFuture =
    Pin<Box<dyn Future<Output = SdkResult<TransportResponse>> + Send + 'static>>;

/// Issues one HTTP request.
///
/// Dropping the returned future cancels the request; that is the only
/// cancellation mechanism the client relies on.
pub trait Transport: Send + Sync {
    fn send(&self, url: &str, init: RequestInit) -> TransportFuture;
}

impl<F, Fut> Transport for F
where
    F: Fn(String, RequestInit) -> Fut + Send + Sync,
    Fut: Future<Output = SdkResult<TransportResponse>> + Send + 'static,
{
    fn send(&self, url: &str, init: RequestInit) -> TransportFuture {
        Box::pin(self(url.to_string(), init))
    }
}

/// Credentials policy, mirroring the fetch API.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Credentials {
    #[default]
    Include,
    Omit,
    SameOrigin,
}

impl Credentials {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Include => "include",
            Self::Omit => "omit",
            Self::SameOrigin => "same-origin",
        }
    }
}

impl fmt::Display for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Credentials {
    type Err = SdkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "include" => Ok(Self::Include),
            "omit" => Ok(Self::Omit),
            "same-origin" => Ok(Self::SameOrigin),
            other => Err(SdkError::config(format!(
                "Unknown credentials policy: {other} (expected include, omit or same-origin)"
            ))),
        }
    }
}

/// Transport options that can be set per client and per call.
///
/// Unset fields fall through to the layer below when merged. Header names
/// are stored lowercased so `Content-Type` and `content-type` are the same
/// entry.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FetchOptions {
    pub credentials: Option<Credentials>,
    pub headers: IndexMap<String, String>,
    pub timeout: Option<Duration>,
}

impl FetchOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// The options every request starts from: JSON content type and
    /// `credentials: include`.
    pub fn builtin() -> Self {
        Self::new()
            .credentials(Credentials::Include)
            .header("Content-Type", "application/json")
    }

    /// Sets the credentials policy.
    pub fn credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    /// Adds a header, replacing any previous value for the same name.
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers
            .insert(key.into().to_ascii_lowercase(), value.into());
        self
    }

    /// Sets a timeout for the transport to enforce.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Layers `overrides` on top of `self`. Set fields in `overrides` win;
    /// headers are merged by name.
    pub fn merge(mut self, overrides: &FetchOptions) -> Self {
        if overrides.credentials.is_some() {
            self.credentials = overrides.credentials;
        }
        if overrides.timeout.is_some() {
            self.timeout = overrides.timeout;
        }
        for (key, value) in &overrides.headers {
            self.headers
                .insert(key.to_ascii_lowercase(), value.clone());
        }
        self
    }
}

/// A fully resolved request, as handed to a transport.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestInit {
    pub method: Method,
    pub headers: IndexMap<String, String>,
    pub body: String,
    pub credentials: Credentials,
    /// Upper bound the transport should enforce; the client never does.
    pub timeout: Option<Duration>,
}

impl RequestInit {
    /// Builds a `POST` from merged options.
    pub fn post(body: String, options: FetchOptions) -> Self {
        Self {
            method: Method::POST,
            headers: options.headers,
            body,
            credentials: options.credentials.unwrap_or_default(),
            timeout: options.timeout,
        }
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }
}

/// What a transport hands back.
#[derive(Debug, Clone, PartialEq)]
pub struct TransportResponse {
    /// HTTP status. Informational only: the client decides success by
    /// whether the body parses.
    pub status: u16,
    pub headers: IndexMap<String, String>,
    pub body: Bytes,
}

impl TransportResponse {
    pub fn new(status: u16, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            headers: IndexMap::new(),
            body: body.into(),
        }
    }

    /// Shorthand for a `200` response carrying `value` as JSON.
    pub fn json_body(value: &serde_json::Value) -> Self {
        Self::new(200, value.to_string())
            .with_header("content-type", "application/json")
    }

    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers
            .insert(key.into().to_ascii_lowercase(), value.into());
        self
    }

    /// Parses the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> SdkResult<T> {
        serde_json::from_slice(&self.body).map_err(|e| {
            SdkError::parse(format!(
                "Failed to parse response: {}. Body: {}",
                e,
                self.text().chars().take(200).collect::<String>()
            ))
        })
    }

    /// The body as text, with invalid UTF-8 replaced.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    #[test]
    fn test_builtin_options() {
        let options = FetchOptions::builtin();
        assert_eq!(options.credentials, Some(Credentials::Include));
        assert_eq!(
            options.headers.get("content-type").map(String::as_str),
            Some("application/json")
        );
        assert_eq!(options.timeout, None);
    }

    #[test]
    fn test_merge_precedence() {
        let instance = FetchOptions::new()
            .credentials(Credentials::SameOrigin)
            .header("X-Client", "instance");
        let call = FetchOptions::new()
            .credentials(Credentials::Omit)
            .header("x-client", "call")
            .timeout(Duration::from_secs(2));

        let merged = FetchOptions::builtin().merge(&instance);
        assert_eq!(merged.credentials, Some(Credentials::SameOrigin));
        assert_eq!(merged.headers["x-client"], "instance");

        let merged = merged.merge(&call);
        assert_eq!(merged.credentials, Some(Credentials::Omit));
        assert_eq!(merged.headers["x-client"], "call");
        assert_eq!(merged.headers["content-type"], "application/json");
        assert_eq!(merged.timeout, Some(Duration::from_secs(2)));
    }

    #[test]
    fn test_merge_keeps_lower_layer_when_unset() {
        let merged = FetchOptions::builtin().merge(&FetchOptions::new());
        assert_eq!(merged, FetchOptions::builtin());
    }

    #[test]
    fn test_override_content_type() {
        let merged =
            FetchOptions::builtin().merge(&FetchOptions::new().header("Content-Type", "application/graphql+json"));
        let init = RequestInit::post("{}".to_string(), merged);
        assert_eq!(init.header("Content-Type"), Some("application/graphql+json"));
        assert_eq!(init.headers.len(), 1);
    }

    #[test]
    fn test_credentials_from_str() {
        assert_eq!("omit".parse::<Credentials>().unwrap(), Credentials::Omit);
        assert_eq!(
            "same-origin".parse::<Credentials>().unwrap(),
            Credentials::SameOrigin
        );
        let err = "always".parse::<Credentials>().unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidConfig);
    }

    #[test]
    fn test_credentials_serde() {
        assert_eq!(
            serde_json::to_string(&Credentials::SameOrigin).unwrap(),
            "\"same-origin\""
        );
    }

    #[test]
    fn test_response_json() {
        let response = TransportResponse::new(200, r#"{"data":{"a":1}}"#);
        let value: serde_json::Value = response.json().unwrap();
        assert_eq!(value["data"]["a"], 1);

        let err = TransportResponse::new(502, "<html>Bad Gateway</html>")
            .json::<serde_json::Value>()
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ParseError);
        assert!(err.message.contains("Bad Gateway"));
    }
}
