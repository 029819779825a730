use anyhow::Result;
use async_trait::async_trait;
use output_validation::domain::model::{FieldError, SchemaError};
use output_validation::{
    ContractError, FieldSchema, HttpResponse, OutputSpec, OutputValidator, RuleStringValidator,
    SchemaValidator, ValidationRule,
};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};

fn schema(pairs: &[(&str, &str)]) -> FieldSchema {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

/// Records every schema it is asked to check, then delegates.
struct SpyValidator {
    inner: RuleStringValidator,
    calls: Mutex<Vec<FieldSchema>>,
}

impl SpyValidator {
    fn new() -> Self {
        Self {
            inner: RuleStringValidator::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    fn calls(&self) -> Vec<FieldSchema> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl SchemaValidator for SpyValidator {
    async fn validate(&self, data: Value, schema: &FieldSchema) -> Result<Value, SchemaError> {
        self.calls.lock().unwrap().push(schema.clone());
        self.inner.validate(data, schema).await
    }
}

/// Always fails with a single scalar error.
struct ScalarErrorValidator;

#[async_trait]
impl SchemaValidator for ScalarErrorValidator {
    async fn validate(&self, _data: Value, _schema: &FieldSchema) -> Result<Value, SchemaError> {
        Err(SchemaError::Message("validator unavailable".to_string()))
    }
}

/// Breaks the contract by returning a non-object result.
struct BrokenValidator;

#[async_trait]
impl SchemaValidator for BrokenValidator {
    async fn validate(&self, _data: Value, _schema: &FieldSchema) -> Result<Value, SchemaError> {
        Ok(json!("not an object"))
    }
}

/// Accepts anything and returns an empty object.
struct EmptyObjectValidator;

#[async_trait]
impl SchemaValidator for EmptyObjectValidator {
    async fn validate(&self, _data: Value, _schema: &FieldSchema) -> Result<Value, SchemaError> {
        Ok(json!({}))
    }
}

#[tokio::test]
async fn test_header_only_spec_casts_headers_and_keeps_body() -> Result<()> {
    let rule = ValidationRule::new(
        "200",
        OutputSpec::headers(schema(&[("x-total-count", "required|integer")])),
    )?;
    let mut response = HttpResponse::new(200)
        .with_header("X-Total-Count", "12")
        .with_header("content-type", "application/json")
        .with_body(json!({"anything": ["goes"]}));

    let outcome = rule
        .validate_output(&mut response, &RuleStringValidator::new())
        .await?;

    assert!(outcome.is_none());
    assert_eq!(response.headers.get("x-total-count"), Some(&json!(12)));
    assert_eq!(
        response.headers.get("content-type"),
        Some(&json!("application/json"))
    );
    assert_eq!(response.body, json!({"anything": ["goes"]}));
    Ok(())
}

#[tokio::test]
async fn test_scalar_body_is_wrapped_and_unwrapped() -> Result<()> {
    let spy = SpyValidator::new();
    let rule = ValidationRule::new("200-299", OutputSpec::body("required|string"))?;
    let mut response = HttpResponse::new(200).with_body("hello");

    let outcome = rule.validate_output(&mut response, &spy).await?;

    assert!(outcome.is_none());
    assert_eq!(response.body, json!("hello"));
    assert_eq!(spy.calls(), vec![schema(&[("value", "required|string")])]);
    Ok(())
}

#[tokio::test]
async fn test_scalar_body_cast_replaces_body() -> Result<()> {
    let rule = ValidationRule::new("200", OutputSpec::body("required|integer"))?;
    let mut response = HttpResponse::new(200).with_body("42");

    assert!(rule
        .validate_output(&mut response, &RuleStringValidator::new())
        .await?
        .is_none());
    assert_eq!(response.body, json!(42));
    Ok(())
}

#[tokio::test]
async fn test_empty_scalar_body_fails_with_validator_message() -> Result<()> {
    let rule = ValidationRule::new("200", OutputSpec::body("required|string"))?;
    let mut response = HttpResponse::new(200).with_body("");

    let failure = rule
        .validate_output(&mut response, &RuleStringValidator::new())
        .await?
        .expect("empty body must fail");

    assert_eq!(failure.message(), "required validation failed on value");
    assert_eq!(response.body, json!(""));
    Ok(())
}

#[tokio::test]
async fn test_field_body_is_replaced_by_casted_object() -> Result<()> {
    let rule = ValidationRule::new(
        "201",
        OutputSpec::body(schema(&[("id", "required|integer"), ("name", "required|string")])),
    )?;
    let mut response = HttpResponse::new(201).with_body(json!({"id": "7", "name": "ada"}));

    assert!(rule
        .validate_output(&mut response, &RuleStringValidator::new())
        .await?
        .is_none());
    assert_eq!(response.body, json!({"id": 7, "name": "ada"}));
    Ok(())
}

#[tokio::test]
async fn test_non_object_body_with_optional_fields_is_kept() -> Result<()> {
    let rule = ValidationRule::new("200", OutputSpec::body(schema(&[("nickname", "string")])))?;
    let mut response = HttpResponse::new(200).with_body(json!([1, 2, 3]));

    let outcome = rule
        .validate_output(&mut response, &RuleStringValidator::new())
        .await?;

    assert!(outcome.is_none());
    assert_eq!(response.body, json!([1, 2, 3]));
    Ok(())
}

#[tokio::test]
async fn test_non_object_body_with_required_field_fails_untouched() -> Result<()> {
    let rule = ValidationRule::new("200", OutputSpec::body(schema(&[("id", "required")])))?;
    let mut response = HttpResponse::new(200).with_body("plain text");

    let failure = rule
        .validate_output(&mut response, &RuleStringValidator::new())
        .await?
        .expect("missing id must fail");

    assert_eq!(failure.message(), "required validation failed on id");
    assert_eq!(response.body, json!("plain text"));
    Ok(())
}

#[tokio::test]
async fn test_scalar_result_without_value_clears_body() -> Result<()> {
    let rule = ValidationRule::new("200", OutputSpec::body("string"))?;
    let mut response = HttpResponse::new(200).with_body("hello");

    let outcome = rule
        .validate_output(&mut response, &EmptyObjectValidator)
        .await?;

    assert!(outcome.is_none());
    assert_eq!(response.body, Value::Null);
    Ok(())
}

#[tokio::test]
async fn test_mixed_case_header_is_cast_in_place() -> Result<()> {
    let rule = ValidationRule::new("200", OutputSpec::headers(schema(&[("x-count", "required|integer")])))?;
    let mut response: HttpResponse =
        serde_json::from_value(json!({"status": 200, "headers": {"X-Count": "3"}}))?;

    let outcome = rule
        .validate_output(&mut response, &RuleStringValidator::new())
        .await?;

    assert!(outcome.is_none());
    assert_eq!(response.headers.len(), 1);
    assert_eq!(response.headers.get("x-count"), Some(&json!(3)));
    Ok(())
}

#[tokio::test]
async fn test_header_failure_skips_body() -> Result<()> {
    let spy = SpyValidator::new();
    let header_schema = schema(&[("x-request-id", "required")]);
    let rule = ValidationRule::new(
        "200",
        OutputSpec::headers(header_schema.clone()).with_body("required|integer"),
    )?;
    let mut response = HttpResponse::new(200).with_body("not a number");

    let failure = rule
        .validate_output(&mut response, &spy)
        .await?
        .expect("missing header must fail");

    assert_eq!(failure.message(), "required validation failed on x-request-id");
    assert_eq!(spy.calls(), vec![header_schema]);
    assert_eq!(response.body, json!("not a number"));
    Ok(())
}

#[tokio::test]
async fn test_multiple_field_errors_are_joined_in_order() -> Result<()> {
    let rule = ValidationRule::new(
        "200",
        OutputSpec::body(schema(&[("email", "required"), ("username", "required")])),
    )?;
    let mut response = HttpResponse::new(200).with_body(json!({}));

    let failure = rule
        .validate_output(&mut response, &RuleStringValidator::new())
        .await?
        .expect("missing fields must fail");

    assert_eq!(
        failure.messages,
        vec![
            "required validation failed on email".to_string(),
            "required validation failed on username".to_string(),
        ]
    );
    assert_eq!(
        failure.message(),
        "required validation failed on email\nrequired validation failed on username"
    );
    Ok(())
}

#[tokio::test]
async fn test_scalar_validator_error_is_normalized() -> Result<()> {
    let rule = ValidationRule::new("*", OutputSpec::body("required"))?;
    let mut response = HttpResponse::new(500).with_body("boom");

    let failure = rule
        .validate_output(&mut response, &ScalarErrorValidator)
        .await?
        .expect("validator error must surface");

    assert_eq!(failure.to_string(), "validator unavailable");
    Ok(())
}

#[tokio::test]
async fn test_non_object_header_result_is_a_programming_error() -> Result<()> {
    let rule = ValidationRule::new("200", OutputSpec::headers(schema(&[("etag", "string")])))?;
    let mut response = HttpResponse::new(200);

    let err = rule
        .validate_output(&mut response, &BrokenValidator)
        .await
        .unwrap_err();

    assert!(matches!(err, ContractError::MalformedResult { .. }));
    assert!(!err.is_configuration_error());
    Ok(())
}

#[tokio::test]
async fn test_output_validator_applies_matching_rule_only() -> Result<()> {
    let set = OutputValidator::new(
        vec![
            ValidationRule::new("200-299", OutputSpec::body(schema(&[("id", "required|integer")])))?,
            ValidationRule::new("400-499", OutputSpec::body(schema(&[("error", "required|string")])))?,
        ],
        Arc::new(RuleStringValidator::new()),
    )?;

    let mut ok = HttpResponse::new(200).with_body(json!({"id": "1"}));
    assert!(set.validate(&mut ok).await?.is_none());
    assert_eq!(ok.body, json!({"id": 1}));

    let mut not_found = HttpResponse::new(404).with_body(json!({"id": 1}));
    let failure = set.validate(&mut not_found).await?.expect("404 needs an error field");
    assert_eq!(failure.message(), "required validation failed on error");

    let mut unmatched = HttpResponse::new(500).with_body(json!("whatever"));
    assert!(set.validate(&mut unmatched).await?.is_none());
    assert_eq!(unmatched.body, json!("whatever"));
    Ok(())
}

#[tokio::test]
async fn test_concurrent_validations_do_not_interfere() -> Result<()> {
    let set = Arc::new(OutputValidator::new(
        vec![ValidationRule::new(
            "200",
            OutputSpec::headers(schema(&[("x-page", "required|integer")])),
        )?],
        Arc::new(RuleStringValidator::new()),
    )?);

    let mut handles = Vec::new();
    for page in 0..16 {
        let set = Arc::clone(&set);
        handles.push(tokio::spawn(async move {
            let mut response = HttpResponse::new(200).with_header("x-page", page.to_string());
            let outcome = set.validate(&mut response).await?;
            Ok::<_, ContractError>((page, outcome, response))
        }));
    }

    for handle in handles {
        let (page, outcome, response) = handle.await??;
        assert!(outcome.is_none());
        assert_eq!(response.headers.get("x-page"), Some(&json!(page)));
    }
    Ok(())
}

#[test]
fn test_field_error_shape() {
    let err = SchemaError::Fields(vec![FieldError {
        field: "id".to_string(),
        validation: "integer".to_string(),
        message: "integer validation failed on id".to_string(),
    }]);
    let failure: output_validation::ValidationFailure = err.into();
    assert_eq!(failure.message(), "integer validation failed on id");
}
