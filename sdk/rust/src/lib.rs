//! gquery SDK
//!
//! A small GraphQL fetch client. Operations are canonicalized before they go
//! on the wire, can be rewritten to select `__typename` everywhere, and every
//! fetch resolves to a [`FetchOutcome`] instead of a bare `Result`.
//!
//! # Client
//!
//! ```ignore
//! use gquery_sdk::{FetchOutcome, GqueryClient, HttpTransport, Operation};
//!
//! let client = GqueryClient::new("http://localhost:4000/graphql")?;
//! let feed = Operation::new("query Feed { feed { id title } }").with_typename()?;
//!
//! match client.fetch::<gquery_sdk::JsonMap, _>(&[feed], &HttpTransport::new()).await {
//!     FetchOutcome::Success { data, errors } => { /* ... */ }
//!     FetchOutcome::Failure { errors, .. } => { /* ... */ }
//! }
//! ```
//!
//! # Transports
//!
//! Anything implementing [`Transport`] can carry requests, including plain
//! async closures:
//!
//! ```ignore
//! let transport = |url: String, init: RequestInit| async move {
//!     Ok::<_, SdkError>(TransportResponse::json_body(&serde_json::json!({ "data": {} })))
//! };
//! ```

pub mod client;
pub mod error;
pub mod http;
pub mod outcome;
pub mod transport;
pub mod typed;

// Document tooling
pub use gquery_core::{
    add_typename, collect_types_from_response, normalize, parse_document, stringify, Document,
    DocumentError, DocumentSource, OperationDocument, TYPENAME,
};

// Re-exports for convenience
pub use client::{ClientConfig, GqueryClient, Operation, OperationRequest};
pub use error::{ErrorCode, ResultExt, SdkError, SdkResult};
pub use http::HttpTransport;
pub use outcome::{FetchOutcome, GraphQLError, JsonMap, Location, QueryStatus};
pub use transport::{Credentials, FetchOptions, RequestInit, Transport, TransportResponse};
pub use typed::{NoVariables, RawResponse, TypedOperation};
