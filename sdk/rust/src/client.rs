//! gquery fetch client.
//!
//! Sends one GraphQL operation through a caller-supplied [`Transport`] and
//! folds whatever happens into a [`FetchOutcome`]:
//! - documents are canonicalized before they go on the wire
//! - no retries and no timeouts of its own (both belong to the transport)
//! - no caching; results are handed to the caller and forgotten
//!
//! # Example
//!
//! ```ignore
//! use gquery_sdk::{GqueryClient, HttpTransport, Operation};
//!
//! let client = GqueryClient::new("http://localhost:4000/graphql")?;
//! let outcome: FetchOutcome = client
//!     .fetch(&[Operation::new("query { viewer { id } }")], &HttpTransport::new())
//!     .await;
//! ```

use crate::error::{ErrorCode, SdkError, SdkResult};
use crate::outcome::{FetchOutcome, GraphQLError};
use crate::transport::{Credentials, FetchOptions, RequestInit, Transport};
use gquery_core::{add_typename, parse_document, stringify, OperationDocument};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::time::Duration;
use tracing::{debug, error, trace};

/// Client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Request target of the GraphQL endpoint.
    pub path: String,
    /// Transport defaults for every request from this client.
    pub fetch_options: FetchOptions,
}

impl ClientConfig {
    /// Creates a new config with a request target.
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            fetch_options: FetchOptions::default(),
        }
    }

    /// Replaces the transport defaults.
    pub fn fetch_options(mut self, fetch_options: FetchOptions) -> Self {
        self.fetch_options = fetch_options;
        self
    }

    /// Sets the default credentials policy.
    pub fn credentials(mut self, credentials: Credentials) -> Self {
        self.fetch_options = self.fetch_options.credentials(credentials);
        self
    }

    /// Adds a default header.
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.fetch_options = self.fetch_options.header(key, value);
        self
    }

    /// Sets the default timeout handed to the transport.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.fetch_options = self.fetch_options.timeout(timeout);
        self
    }

    fn validate(&self) -> SdkResult<()> {
        if self.path.trim().is_empty() {
            return Err(SdkError::config(
                "No path provided. The path is the GraphQL endpoint requests are sent to.",
            ));
        }
        Ok(())
    }
}

/// One operation as handed over by a call site.
#[derive(Debug, Clone, PartialEq)]
pub struct Operation {
    pub document: OperationDocument,
    pub variables: Option<Value>,
    pub operation_name: Option<String>,
}

impl Operation {
    pub fn new(document: impl Into<OperationDocument>) -> Self {
        Self {
            document: document.into(),
            variables: None,
            operation_name: None,
        }
    }

    /// Sets the variables.
    pub fn with_variables(mut self, variables: Value) -> Self {
        self.variables = Some(variables);
        self
    }

    /// Sets the operation name (for multi-operation documents).
    pub fn with_operation_name(mut self, name: impl Into<String>) -> Self {
        self.operation_name = Some(name.into());
        self
    }

    /// Makes sure every selection set with sub-selections asks for
    /// `__typename`. Text documents are parsed first.
    pub fn with_typename(self) -> SdkResult<Self> {
        let document = match &self.document {
            OperationDocument::Ast(document) => add_typename(document),
            OperationDocument::Text(text) => add_typename(&parse_document(text)?),
        };
        Ok(Self {
            document: OperationDocument::Ast(document),
            ..self
        })
    }
}

/// The request body sent on the wire.
///
/// The document always goes under `query`, mutations included.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationRequest {
    pub query: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variables: Option<Value>,
    #[serde(
        rename = "operationName",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub operation_name: Option<String>,
}

impl From<&Operation> for OperationRequest {
    fn from(operation: &Operation) -> Self {
        Self {
            query: stringify(&operation.document),
            variables: operation.variables.clone(),
            operation_name: operation.operation_name.clone(),
        }
    }
}

/// The gquery client.
///
/// Holds nothing but its configuration, so clones are cheap and concurrent
/// fetches never observe each other.
#[derive(Debug, Clone)]
pub struct GqueryClient {
    config: ClientConfig,
}

impl GqueryClient {
    /// Creates a new client for the given request target.
    pub fn new(path: impl Into<String>) -> SdkResult<Self> {
        Self::with_config(ClientConfig::new(path))
    }

    /// Creates a new client with configuration.
    pub fn with_config(config: ClientConfig) -> SdkResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Sends the first of `queries` and returns its outcome.
    ///
    /// Only `queries[0]` is ever sent: the envelope carries a single
    /// operation, and any further entries are ignored.
    pub async fn fetch<T, Tr>(&self, queries: &[Operation], transport: &Tr) -> FetchOutcome<T>
    where
        T: DeserializeOwned,
        Tr: Transport + ?Sized,
    {
        self.fetch_with(queries, transport, &FetchOptions::default())
            .await
    }

    /// Like [`fetch`](Self::fetch), with per-call options layered over the
    /// client's defaults.
    pub async fn fetch_with<T, Tr>(
        &self,
        queries: &[Operation],
        transport: &Tr,
        overrides: &FetchOptions,
    ) -> FetchOutcome<T>
    where
        T: DeserializeOwned,
        Tr: Transport + ?Sized,
    {
        let Some(operation) = queries.first() else {
            return FetchOutcome::failure(
                None,
                SdkError::new(ErrorCode::NoOperation, "No operation to send"),
            );
        };
        if queries.len() > 1 {
            debug!(
                ignored = queries.len() - 1,
                "Only the first operation of a batch is sent"
            );
        }

        let request = OperationRequest::from(operation);
        trace!(query = %request.query, "Canonical document");

        let mut body = None;
        match self.send(&request, transport, overrides, &mut body).await {
            Ok((data, errors)) => FetchOutcome::Success { data, errors },
            Err(err) => {
                error!(path = %self.config.path, error = %err, "Fetch failed");
                FetchOutcome::failure(body, err)
            }
        }
    }

    /// Performs the exchange. `body` is filled in as soon as the response
    /// parses so a later decoding failure can still report it.
    async fn send<T, Tr>(
        &self,
        request: &OperationRequest,
        transport: &Tr,
        overrides: &FetchOptions,
        body: &mut Option<Value>,
    ) -> SdkResult<(T, Option<Vec<GraphQLError>>)>
    where
        T: DeserializeOwned,
        Tr: Transport + ?Sized,
    {
        let payload =
            serde_json::to_string(request).map_err(|e| SdkError::serialize(e.to_string()))?;
        let options = FetchOptions::builtin()
            .merge(&self.config.fetch_options)
            .merge(overrides);
        let init = RequestInit::post(payload, options);

        debug!(path = %self.config.path, credentials = %init.credentials, "Sending operation");
        let response = transport.send(&self.config.path, init).await?;
        let parsed = body.insert(response.json::<Value>()?);
        split_response(parsed)
    }
}

/// Splits a response body into decoded data and server errors. A missing or
/// `null` `data` decodes as an empty object. Server errors are passed on
/// whatever their shape; only `data` can fail to decode.
fn split_response<T: DeserializeOwned>(
    body: &Value,
) -> SdkResult<(T, Option<Vec<GraphQLError>>)> {
    let Value::Object(envelope) = body else {
        return Err(SdkError::new(
            ErrorCode::InvalidResponse,
            "Response body is not a JSON object",
        ));
    };

    let empty = Value::Object(Map::new());
    let fields = match envelope.get("data") {
        None | Some(Value::Null) => &empty,
        Some(data) => data,
    };
    let data = T::deserialize(fields)
        .map_err(|e| SdkError::deserialize(format!("Failed to decode data: {}", e)))?;

    let errors = match envelope.get("errors") {
        None | Some(Value::Null) => None,
        Some(errors) => Some(GraphQLError::list_from_value(errors)),
    };

    Ok((data, errors))
}
