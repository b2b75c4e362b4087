//! The unified result of a fetch.

use crate::error::{ErrorCode, SdkError, SdkResult};
use serde::ser::Error as _;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};

/// JSON object, the default shape of response data.
pub type JsonMap = Map<String, Value>;

/// Lifecycle marker for an operation's data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QueryStatus {
    Loaded,
    Loading,
    Error,
}

/// A GraphQL error reported by the server inside a well-formed response.
///
/// Entries are kept as the server sent them: keys outside the usual
/// `message`/`locations`/`path`/`extensions` land in `extra` and are written
/// back out unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphQLError {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locations: Option<Vec<Location>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<Vec<Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extensions: Option<JsonMap>,
    #[serde(flatten)]
    pub extra: JsonMap,
}

impl GraphQLError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..Self::default()
        }
    }

    /// Reads one entry of a response's `errors`. Never fails: an entry whose
    /// known keys have unexpected types is kept whole in `extra`, with a
    /// string `message` still lifted out.
    pub fn from_value(entry: Value) -> Self {
        if let Ok(error) = Self::deserialize(&entry) {
            return error;
        }
        match entry {
            Value::Object(fields) => {
                let message = match fields.get("message") {
                    Some(Value::String(message)) => Some(message.clone()),
                    _ => None,
                };
                let extra = match message {
                    Some(_) => fields.into_iter().filter(|(key, _)| key != "message").collect(),
                    None => fields,
                };
                Self {
                    message: message.unwrap_or_default(),
                    extra,
                    ..Self::default()
                }
            }
            Value::String(message) => Self::new(message),
            other => Self::new(other.to_string()),
        }
    }

    /// Reads a response's `errors` value. A single entry that is not wrapped
    /// in an array counts as a one-element list.
    pub fn list_from_value(errors: &Value) -> Vec<Self> {
        match errors {
            Value::Array(entries) => entries.iter().cloned().map(Self::from_value).collect(),
            entry => vec![Self::from_value(entry.clone())],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub line: u32,
    pub column: u32,
}

/// Outcome of one fetch.
///
/// `Success` means the exchange completed and the body parsed: server
/// reported GraphQL errors are passed through next to the data and are not a
/// failure. `Failure` holds the one error that stopped the exchange and the
/// response body if it had already been parsed.
#[derive(Debug)]
pub enum FetchOutcome<T = JsonMap> {
    Success {
        data: T,
        errors: Option<Vec<GraphQLError>>,
    },
    Failure {
        data: Option<Value>,
        status: QueryStatus,
        errors: Vec<SdkError>,
    },
}

impl<T> FetchOutcome<T> {
    /// A failure carrying exactly `error`.
    pub fn failure(data: Option<Value>, error: SdkError) -> Self {
        Self::Failure {
            data,
            status: QueryStatus::Error,
            errors: vec![error],
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failure { .. })
    }

    pub fn status(&self) -> QueryStatus {
        match self {
            Self::Success { .. } => QueryStatus::Loaded,
            Self::Failure { status, .. } => *status,
        }
    }

    /// The decoded data of a success.
    pub fn data(&self) -> Option<&T> {
        match self {
            Self::Success { data, .. } => Some(data),
            Self::Failure { .. } => None,
        }
    }

    /// Server reported errors of a success; empty otherwise.
    pub fn graphql_errors(&self) -> &[GraphQLError] {
        match self {
            Self::Success {
                errors: Some(errors),
                ..
            } => errors,
            _ => &[],
        }
    }

    /// Transport or decoding errors of a failure; empty otherwise.
    pub fn failures(&self) -> &[SdkError] {
        match self {
            Self::Failure { errors, .. } => errors,
            Self::Success { .. } => &[],
        }
    }

    /// Collapses the outcome into a `Result`, treating server reported
    /// GraphQL errors as an error too.
    pub fn into_result(self) -> SdkResult<T> {
        match self {
            Self::Success { data, errors } => match errors {
                Some(errors) if !errors.is_empty() => {
                    Err(SdkError::new(ErrorCode::ExecutionError, errors[0].message.clone())
                        .with_extension("errors", &errors))
                }
                _ => Ok(data),
            },
            Self::Failure { mut errors, .. } => Err(errors
                .pop()
                .unwrap_or_else(|| SdkError::network("Fetch failed"))),
        }
    }

    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> FetchOutcome<U> {
        match self {
            Self::Success { data, errors } => FetchOutcome::Success {
                data: f(data),
                errors,
            },
            Self::Failure {
                data,
                status,
                errors,
            } => FetchOutcome::Failure {
                data,
                status,
                errors,
            },
        }
    }
}

/// Serializes to the flat shape clients persist and exchange:
/// `{ ...data, errors }` for a success and
/// `{ ...partialBody, gQueryStatus: "ERROR", errors: [...] }` for a failure.
impl<T: Serialize> Serialize for FetchOutcome<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut fields = JsonMap::new();
        match self {
            Self::Success { data, errors } => {
                spread(&mut fields, serde_json::to_value(data).map_err(S::Error::custom)?);
                if let Some(errors) = errors {
                    fields.insert(
                        "errors".to_string(),
                        serde_json::to_value(errors).map_err(S::Error::custom)?,
                    );
                }
            }
            Self::Failure {
                data,
                status,
                errors,
            } => {
                if let Some(data) = data {
                    spread(&mut fields, data.clone());
                }
                fields.insert(
                    "gQueryStatus".to_string(),
                    serde_json::to_value(status).map_err(S::Error::custom)?,
                );
                fields.insert(
                    "errors".to_string(),
                    serde_json::to_value(errors).map_err(S::Error::custom)?,
                );
            }
        }
        fields.serialize(serializer)
    }
}

// Non-object values have no fields to contribute.
fn spread(fields: &mut JsonMap, value: Value) {
    if let Value::Object(entries) = value {
        fields.extend(entries);
    }
}
