use crate::utils::error::Result;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;

/// Field name → opaque schema descriptor, e.g. `"required|integer"`.
pub type FieldSchema = BTreeMap<String, String>;

/// Key a scalar body and its descriptor are wrapped under before validation.
pub const WRAPPED_FIELD: &str = "value";

/// Body schema: either a single descriptor for the whole body or a field map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BodySpec {
    Scalar(String),
    Fields(FieldSchema),
}

impl BodySpec {
    pub fn is_scalar(&self) -> bool {
        matches!(self, BodySpec::Scalar(_))
    }

    pub fn is_empty(&self) -> bool {
        match self {
            BodySpec::Scalar(descriptor) => descriptor.trim().is_empty(),
            BodySpec::Fields(fields) => fields.is_empty(),
        }
    }
}

impl From<&str> for BodySpec {
    fn from(descriptor: &str) -> Self {
        BodySpec::Scalar(descriptor.to_string())
    }
}

impl From<FieldSchema> for BodySpec {
    fn from(fields: FieldSchema) -> Self {
        BodySpec::Fields(fields)
    }
}

/// What a rule checks on a matching response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headers: Option<FieldSchema>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<BodySpec>,
}

impl OutputSpec {
    pub fn headers(headers: FieldSchema) -> Self {
        Self::default().with_headers(headers)
    }

    pub fn body(body: impl Into<BodySpec>) -> Self {
        Self::default().with_body(body)
    }

    pub fn with_headers(mut self, headers: FieldSchema) -> Self {
        self.headers = Some(headers);
        self
    }

    pub fn with_body(mut self, body: impl Into<BodySpec>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Header schema, if one is declared and non-empty.
    pub fn declared_headers(&self) -> Option<&FieldSchema> {
        self.headers.as_ref().filter(|h| !h.is_empty())
    }

    /// Body schema, if one is declared and non-empty.
    pub fn declared_body(&self) -> Option<&BodySpec> {
        self.body.as_ref().filter(|b| !b.is_empty())
    }

    pub fn is_empty(&self) -> bool {
        self.declared_headers().is_none() && self.declared_body().is_none()
    }
}

/// A single field failure reported by a schema validator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub validation: String,
    pub message: String,
}

/// Failure shapes a schema validator may produce.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    Fields(Vec<FieldError>),
    Message(String),
}

/// Normalized validation failure surfaced to callers.
///
/// Messages keep the order the validator reported them in and are only
/// joined when displayed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationFailure {
    pub messages: Vec<String>,
}

impl ValidationFailure {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            messages: vec![message.into()],
        }
    }

    pub fn message(&self) -> String {
        self.messages.join("\n")
    }
}

impl fmt::Display for ValidationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message())
    }
}

impl From<SchemaError> for ValidationFailure {
    fn from(err: SchemaError) -> Self {
        match err {
            SchemaError::Fields(errors) => Self {
                messages: errors.into_iter().map(|e| e.message).collect(),
            },
            SchemaError::Message(message) => Self::new(message),
        }
    }
}

/// Owned response snapshot, used by the CLI and in tests.
///
/// Header names are lower-cased on the way in.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HttpResponse {
    pub status: i64,
    #[serde(default, deserialize_with = "lowercase_headers")]
    pub headers: Map<String, Value>,
    #[serde(default)]
    pub body: Value,
}

impl HttpResponse {
    pub fn new(status: i64) -> Self {
        Self {
            status,
            ..Default::default()
        }
    }

    pub fn with_header(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.headers.insert(name.to_ascii_lowercase(), value.into());
        self
    }

    pub fn with_body(mut self, body: impl Into<Value>) -> Self {
        self.body = body.into();
        self
    }

    pub fn from_json_str(raw: &str) -> Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }
}

fn lowercase_headers<'de, D>(deserializer: D) -> std::result::Result<Map<String, Value>, D::Error>
where
    D: Deserializer<'de>,
{
    let headers = Map::<String, Value>::deserialize(deserializer)?;
    Ok(headers
        .into_iter()
        .map(|(name, value)| (name.to_ascii_lowercase(), value))
        .collect())
}
