use crate::core::range::{parse_status_expression, StatusRange};
use crate::domain::model::{BodySpec, FieldSchema, OutputSpec, ValidationFailure, WRAPPED_FIELD};
use crate::domain::ports::{ResponseContext, SchemaValidator};
use crate::utils::error::{ContractError, Result};
use serde_json::{Map, Value};
use std::fmt;

/// A status range set paired with the schema its responses must satisfy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationRule {
    status: String,
    ranges: Vec<StatusRange>,
    spec: OutputSpec,
}

impl ValidationRule {
    /// Builds a rule from a status expression (`"200-299,404"`, `"*"`) and its spec.
    ///
    /// Fails on a malformed expression or when the spec declares neither
    /// headers nor body.
    pub fn new(status: impl Into<String>, spec: OutputSpec) -> Result<Self> {
        let status = status.into();
        let ranges = parse_status_expression(&status)?;

        if spec.is_empty() {
            return Err(ContractError::MissingSpec { status });
        }

        Ok(Self {
            status,
            ranges,
            spec,
        })
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn ranges(&self) -> &[StatusRange] {
        &self.ranges
    }

    pub fn spec(&self) -> &OutputSpec {
        &self.spec
    }

    /// Whether this rule applies to the response's status.
    pub fn matches<C: ResponseContext + ?Sized>(&self, ctx: &C) -> bool {
        self.matches_status(ctx.status())
    }

    pub fn matches_status(&self, status: i64) -> bool {
        self.ranges.iter().any(|range| range.contains(status))
    }

    pub fn overlaps(&self, other: &ValidationRule) -> bool {
        overlaps(self, other)
    }

    /// Validates and casts the response's headers, then its body.
    ///
    /// `Ok(None)` means the response satisfied the rule and now carries the
    /// casted values. A header failure short-circuits: the body is left
    /// unvalidated and untouched.
    pub async fn validate_output<C: ResponseContext + ?Sized>(
        &self,
        ctx: &mut C,
        validator: &dyn SchemaValidator,
    ) -> Result<Option<ValidationFailure>> {
        if let Some(schema) = self.spec.declared_headers() {
            let headers = Value::Object(ctx.headers());
            match validator.validate(headers, schema).await {
                Ok(Value::Object(casted)) => ctx.set_headers(casted),
                Ok(other) => {
                    return Err(ContractError::MalformedResult {
                        message: format!("expected header object, got {}", other),
                    })
                }
                Err(e) => {
                    tracing::debug!("Header validation failed for rule {}", self.status);
                    return Ok(Some(e.into()));
                }
            }
        }

        if let Some(body_spec) = self.spec.declared_body() {
            let body = ctx.body().clone();
            let outcome = match body_spec {
                BodySpec::Scalar(descriptor) => {
                    let schema: FieldSchema = [(WRAPPED_FIELD.to_string(), descriptor.clone())]
                        .into_iter()
                        .collect();
                    let mut wrapped = Map::new();
                    wrapped.insert(WRAPPED_FIELD.to_string(), body);

                    validator
                        .validate(Value::Object(wrapped), &schema)
                        .await
                        .map(unwrap_scalar)
                }
                BodySpec::Fields(schema) => validator.validate(body, schema).await,
            };

            match outcome {
                Ok(casted) => ctx.set_body(casted),
                Err(e) => {
                    tracing::debug!("Body validation failed for rule {}", self.status);
                    return Ok(Some(e.into()));
                }
            }
        }

        Ok(None)
    }
}

fn unwrap_scalar(casted: Value) -> Value {
    match casted {
        Value::Object(mut fields) => fields.remove(WRAPPED_FIELD).unwrap_or(Value::Null),
        _ => Value::Null,
    }
}

/// True when some status matched by `a` is also matched by `b`. Symmetric.
pub fn overlaps(a: &ValidationRule, b: &ValidationRule) -> bool {
    a.ranges
        .iter()
        .any(|range_a| b.ranges.iter().any(|range_b| range_a.intersects(range_b)))
}

impl fmt::Display for ValidationRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.status)
    }
}
