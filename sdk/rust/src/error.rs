//! Typed errors for the gquery SDK.
//!
//! Every failure the client can observe carries an [`ErrorCode`], so callers
//! can branch on the kind of failure without matching on message text.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

/// Typed error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[non_exhaustive]
pub enum ErrorCode {
    // Network errors
    NetworkError,
    Timeout,
    ConnectionRefused,

    // Protocol errors
    HttpsNotSupported,
    InvalidUrl,
    InvalidRequest,
    InvalidResponse,

    // GraphQL errors
    ParseError,
    InvalidDocument,
    ExecutionError,
    NoOperation,

    // Serialization errors
    SerializeError,
    DeserializeError,

    // Setup errors
    InvalidConfig,

    // Custom error (escape hatch for transports)
    Custom,
}

impl ErrorCode {
    /// Returns the string representation of the error code.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::NetworkError => "NETWORK_ERROR",
            Self::Timeout => "TIMEOUT",
            Self::ConnectionRefused => "CONNECTION_REFUSED",
            Self::HttpsNotSupported => "HTTPS_NOT_SUPPORTED",
            Self::InvalidUrl => "INVALID_URL",
            Self::InvalidRequest => "INVALID_REQUEST",
            Self::InvalidResponse => "INVALID_RESPONSE",
            Self::ParseError => "PARSE_ERROR",
            Self::InvalidDocument => "INVALID_DOCUMENT",
            Self::ExecutionError => "EXECUTION_ERROR",
            Self::NoOperation => "NO_OPERATION",
            Self::SerializeError => "SERIALIZE_ERROR",
            Self::DeserializeError => "DESERIALIZE_ERROR",
            Self::InvalidConfig => "INVALID_CONFIG",
            Self::Custom => "CUSTOM",
        }
    }

    /// Returns true if retrying the same request could succeed.
    ///
    /// The client never retries on its own; this is for callers that do.
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::NetworkError | Self::Timeout | Self::ConnectionRefused
        )
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Strongly typed SDK error.
#[derive(Error, Debug, Clone)]
#[error("[{code}] {message}")]
pub struct SdkError {
    /// Typed error code.
    pub code: ErrorCode,
    /// Human-readable error message.
    pub message: String,
    /// Extension data for debugging.
    pub extensions: Option<HashMap<String, serde_json::Value>>,
}

impl SdkError {
    /// Creates a new error with the given code and message.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            extensions: None,
        }
    }

    /// Adds extension data.
    pub fn with_extension(mut self, key: impl Into<String>, value: impl Serialize) -> Self {
        let extensions = self.extensions.get_or_insert_with(HashMap::new);
        if let Ok(v) = serde_json::to_value(value) {
            extensions.insert(key.into(), v);
        }
        self
    }

    // Convenience constructors

    /// Creates a network error.
    pub fn network(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::NetworkError, message)
    }

    /// Creates a timeout error.
    pub fn timeout() -> Self {
        Self::new(ErrorCode::Timeout, "Request timed out")
    }

    /// Creates a response parse error.
    pub fn parse(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ParseError, message)
    }

    /// Creates a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidConfig, message)
    }

    /// Creates a serialization error.
    pub fn serialize(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::SerializeError, message)
    }

    /// Creates a deserialization error.
    pub fn deserialize(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::DeserializeError, message)
    }

    /// Returns true if this error is retryable.
    pub fn is_retryable(&self) -> bool {
        self.code.is_retryable()
    }
}

impl From<gquery_core::DocumentError> for SdkError {
    fn from(err: gquery_core::DocumentError) -> Self {
        Self::new(ErrorCode::InvalidDocument, err.to_string())
    }
}

impl Serialize for SdkError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeStruct;

        let mut state = serializer.serialize_struct("SdkError", 3)?;
        state.serialize_field("code", &self.code)?;
        state.serialize_field("message", &self.message)?;
        if let Some(ref ext) = self.extensions {
            state.serialize_field("extensions", ext)?;
        }
        state.end()
    }
}

/// Type alias for SDK results.
pub type SdkResult<T> = std::result::Result<T, SdkError>;

/// Result extension for mapping foreign errors with context.
pub trait ResultExt<T> {
    /// Maps the error to an SdkError with the given code.
    fn map_sdk_err(self, code: ErrorCode) -> SdkResult<T>;

    /// Maps the error to an SdkError with the given code and message, keeping
    /// the original text as the `original_error` extension.
    fn map_sdk_err_with(self, code: ErrorCode, message: impl Into<String>) -> SdkResult<T>;
}

impl<T, E: std::error::Error> ResultExt<T> for std::result::Result<T, E> {
    fn map_sdk_err(self, code: ErrorCode) -> SdkResult<T> {
        self.map_err(|e| SdkError::new(code, e.to_string()))
    }

    fn map_sdk_err_with(self, code: ErrorCode, message: impl Into<String>) -> SdkResult<T> {
        self.map_err(|e| {
            SdkError::new(code, message).with_extension("original_error", e.to_string())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_properties() {
        assert!(ErrorCode::Timeout.is_retryable());
        assert!(ErrorCode::ConnectionRefused.is_retryable());
        assert!(!ErrorCode::ParseError.is_retryable());
        assert!(!ErrorCode::InvalidConfig.is_retryable());
    }

    #[test]
    fn test_error_construction() {
        let err = SdkError::network("network down").with_extension("attempt", 1);

        assert_eq!(err.code, ErrorCode::NetworkError);
        assert_eq!(err.message, "network down");
        assert_eq!(err.to_string(), "[NETWORK_ERROR] network down");
        assert!(err.extensions.is_some());
    }

    #[test]
    fn test_error_serialization() {
        let err = SdkError::network("Connection failed");
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["code"], "NETWORK_ERROR");
        assert_eq!(json["message"], "Connection failed");
        assert!(json.get("extensions").is_none());
    }

    #[test]
    fn test_document_error_conversion() {
        let err: SdkError = gquery_core::parse_document("{").unwrap_err().into();
        assert_eq!(err.code, ErrorCode::InvalidDocument);
    }

    #[test]
    fn test_result_ext() {
        let result: Result<(), std::io::Error> = Err(std::io::Error::new(
            std::io::ErrorKind::ConnectionRefused,
            "refused",
        ));

        let err = result.map_sdk_err(ErrorCode::ConnectionRefused).unwrap_err();
        assert_eq!(err.code, ErrorCode::ConnectionRefused);
        assert_eq!(err.message, "refused");
    }

    #[test]
    fn test_result_ext_keeps_original_error() {
        let result: Result<(), std::io::Error> = Err(std::io::Error::new(
            std::io::ErrorKind::ConnectionRefused,
            "refused",
        ));

        let err = result
            .map_sdk_err_with(ErrorCode::ConnectionRefused, "Connection to h:1 failed")
            .unwrap_err();
        assert_eq!(err.message, "Connection to h:1 failed");
        assert_eq!(err.extensions.unwrap()["original_error"], "refused");
    }
}
