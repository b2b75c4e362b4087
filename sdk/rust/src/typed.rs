//! Strongly typed operations.
//!
//! Generated call sites describe each operation once, as a type, and get
//! typed variables and typed data back from the client.

use crate::client::{GqueryClient, Operation};
use crate::error::{SdkError, SdkResult};
use crate::outcome::FetchOutcome;
use crate::transport::{FetchOptions, Transport};
use serde::{de::DeserializeOwned, Deserialize, Serialize};

/// A strongly typed GraphQL operation.
///
/// # Example
///
/// ```ignore
/// use gquery_sdk::typed::TypedOperation;
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Serialize)]
/// struct GetUserVariables {
///     id: String,
/// }
///
/// #[derive(Deserialize)]
/// struct GetUserData {
///     user: Option<User>,
/// }
///
/// struct GetUser;
///
/// impl TypedOperation for GetUser {
///     type Variables = GetUserVariables;
///     type Response = GetUserData;
///
///     const DOCUMENT: &'static str =
///         "query GetUser($id: ID!) { user(id: $id) { id name __typename } }";
/// }
/// ```
pub trait TypedOperation {
    /// The input variables type.
    type Variables: Serialize;

    /// The response data type.
    type Response: DeserializeOwned;

    /// The operation document text.
    const DOCUMENT: &'static str;

    /// The operation name, for documents holding more than one operation.
    const OPERATION_NAME: Option<&'static str> = None;
}

/// Marker type for operations without variables. Serializes to nothing, so
/// no `variables` key is sent.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct NoVariables;

/// Marker type for operations without a typed response (keeps raw JSON).
#[derive(Debug, Clone, Deserialize)]
pub struct RawResponse(pub serde_json::Value);

impl std::ops::Deref for RawResponse {
    type Target = serde_json::Value;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Builds the untyped [`Operation`] for `Op`.
pub fn operation<Op: TypedOperation>(variables: &Op::Variables) -> SdkResult<Operation> {
    let variables =
        serde_json::to_value(variables).map_err(|e| SdkError::serialize(e.to_string()))?;
    let mut operation = Operation::new(Op::DOCUMENT);
    if !variables.is_null() {
        operation = operation.with_variables(variables);
    }
    if let Some(name) = Op::OPERATION_NAME {
        operation = operation.with_operation_name(name);
    }
    Ok(operation)
}

impl GqueryClient {
    /// Executes a strongly typed operation.
    pub async fn execute<Op, Tr>(
        &self,
        variables: Op::Variables,
        transport: &Tr,
    ) -> FetchOutcome<Op::Response>
    where
        Op: TypedOperation,
        Tr: Transport + ?Sized,
    {
        self.execute_with::<Op, Tr>(variables, transport, &FetchOptions::default())
            .await
    }

    /// Executes a strongly typed operation with per-call options.
    pub async fn execute_with<Op, Tr>(
        &self,
        variables: Op::Variables,
        transport: &Tr,
        overrides: &FetchOptions,
    ) -> FetchOutcome<Op::Response>
    where
        Op: TypedOperation,
        Tr: Transport + ?Sized,
    {
        match operation::<Op>(&variables) {
            Ok(operation) => {
                self.fetch_with(std::slice::from_ref(&operation), transport, overrides)
                    .await
            }
            Err(err) => FetchOutcome::failure(None, err),
        }
    }

    /// Executes a strongly typed operation and extracts the data directly.
    ///
    /// Returns an error if the fetch failed or the server reported GraphQL
    /// errors.
    pub async fn execute_ok<Op, Tr>(
        &self,
        variables: Op::Variables,
        transport: &Tr,
    ) -> SdkResult<Op::Response>
    where
        Op: TypedOperation,
        Tr: Transport + ?Sized,
    {
        self.execute::<Op, Tr>(variables, transport)
            .await
            .into_result()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::transport::{RequestInit, TransportResponse};
    use serde_json::json;
    use std::sync::{Arc, Mutex};

    #[derive(Serialize)]
    struct UserVariables {
        id: String,
    }

    #[derive(Debug, Deserialize, PartialEq)]
    struct User {
        id: String,
        name: String,
    }

    #[derive(Debug, Deserialize, PartialEq)]
    struct UserData {
        user: Option<User>,
    }

    struct GetUser;

    impl TypedOperation for GetUser {
        type Variables = UserVariables;
        type Response = UserData;

        const DOCUMENT: &'static str = "query GetUser($id: ID!) {\n  user(id: $id) { id name }\n}";
        const OPERATION_NAME: Option<&'static str> = Some("GetUser");
    }

    struct Version;

    impl TypedOperation for Version {
        type Variables = NoVariables;
        type Response = RawResponse;

        const DOCUMENT: &'static str = "{ version }";
    }

    #[test]
    fn test_operation_building() {
        let op = operation::<GetUser>(&UserVariables { id: "1".into() }).unwrap();
        assert_eq!(op.variables, Some(json!({ "id": "1" })));
        assert_eq!(op.operation_name.as_deref(), Some("GetUser"));

        let op = operation::<Version>(&NoVariables).unwrap();
        assert!(op.variables.is_none());
        assert!(op.operation_name.is_none());
    }

    #[tokio::test]
    async fn test_execute_typed() {
        let sent = Arc::new(Mutex::new(None));
        let recorder = sent.clone();
        let transport = move |_url: String, init: RequestInit| {
            *recorder.lock().unwrap() = Some(init.body);
            std::future::ready(Ok::<_, SdkError>(TransportResponse::json_body(
                &json!({ "data": { "user": { "id": "1", "name": "Alice" } } }),
            )))
        };
        let client = GqueryClient::new("/graphql").unwrap();

        let data = client
            .execute_ok::<GetUser, _>(UserVariables { id: "1".into() }, &transport)
            .await
            .unwrap();

        assert_eq!(
            data.user,
            Some(User {
                id: "1".into(),
                name: "Alice".into()
            })
        );
        let body: serde_json::Value =
            serde_json::from_str(sent.lock().unwrap().as_deref().unwrap()).unwrap();
        assert_eq!(
            body,
            json!({
                "query": "query GetUser($id: ID!) { user(id: $id) { id name } }",
                "variables": { "id": "1" },
                "operationName": "GetUser"
            })
        );
    }

    #[tokio::test]
    async fn test_execute_ok_surfaces_graphql_errors() {
        let transport = |_url: String, _init: RequestInit| {
            std::future::ready(Ok::<_, SdkError>(TransportResponse::json_body(&json!({
                "data": { "version": null },
                "errors": [{ "message": "not allowed" }]
            }))))
        };
        let client = GqueryClient::new("/graphql").unwrap();

        let outcome = client.execute::<Version, _>(NoVariables, &transport).await;
        assert!(outcome.is_success());
        assert_eq!(outcome.graphql_errors()[0].message, "not allowed");

        let err = client
            .execute_ok::<Version, _>(NoVariables, &transport)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ExecutionError);
    }
}
