use crate::domain::model::{FieldError, FieldSchema, SchemaError};
use crate::domain::ports::SchemaValidator;
use async_trait::async_trait;
use serde_json::{Map, Number, Value};

/// `SchemaValidator` for pipe separated descriptors such as `"required|integer|min:1"`.
///
/// Supported rules: `required`, `string`, `number`, `integer`, `boolean`,
/// `object`, `array`, `min:N`, `max:N` and `in:a,b,c`. Rules run left to
/// right, and a cast performed by one rule is visible to the next.
#[derive(Debug, Clone, Default)]
pub struct RuleStringValidator {
    bail: bool,
}

#[derive(Debug, Clone, PartialEq)]
enum Rule<'a> {
    Required,
    String,
    Number,
    Integer,
    Boolean,
    Object,
    Array,
    Min(f64),
    Max(f64),
    In(Vec<&'a str>),
}

impl Rule<'_> {
    fn name(&self) -> &'static str {
        match self {
            Rule::Required => "required",
            Rule::String => "string",
            Rule::Number => "number",
            Rule::Integer => "integer",
            Rule::Boolean => "boolean",
            Rule::Object => "object",
            Rule::Array => "array",
            Rule::Min(_) => "min",
            Rule::Max(_) => "max",
            Rule::In(_) => "in",
        }
    }
}

impl RuleStringValidator {
    /// Reports every failing field.
    pub fn new() -> Self {
        Self { bail: false }
    }

    /// Stops at the first failing field.
    pub fn bail() -> Self {
        Self { bail: true }
    }

    /// Non-object data is checked as an empty object and handed back unchanged.
    fn check(&self, data: Value, schema: &FieldSchema) -> Result<Value, SchemaError> {
        let (mut output, original) = match data {
            Value::Object(fields) => (fields, None),
            other => (Map::new(), Some(other)),
        };

        let mut errors = Vec::new();
        for (field, descriptor) in schema {
            let rules = parse_descriptor(descriptor).map_err(SchemaError::Message)?;
            let current = output.get(field).cloned().unwrap_or(Value::Null);

            match apply_rules(field, current, &rules) {
                Ok(Some(casted)) => {
                    output.insert(field.clone(), casted);
                }
                Ok(None) => {}
                Err(error) => {
                    errors.push(error);
                    if self.bail {
                        break;
                    }
                }
            }
        }

        if !errors.is_empty() {
            return Err(SchemaError::Fields(errors));
        }

        match original {
            Some(original) if output.is_empty() => Ok(original),
            _ => Ok(Value::Object(output)),
        }
    }
}

#[async_trait]
impl SchemaValidator for RuleStringValidator {
    async fn validate(&self, data: Value, schema: &FieldSchema) -> Result<Value, SchemaError> {
        self.check(data, schema)
    }
}

fn parse_descriptor(descriptor: &str) -> Result<Vec<Rule<'_>>, String> {
    descriptor
        .split('|')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            let (name, arg) = match part.split_once(':') {
                Some((name, arg)) => (name.trim(), Some(arg.trim())),
                None => (part, None),
            };
            match (name, arg) {
                ("required", None) => Ok(Rule::Required),
                ("string", None) => Ok(Rule::String),
                ("number", None) => Ok(Rule::Number),
                ("integer", None) => Ok(Rule::Integer),
                ("boolean", None) => Ok(Rule::Boolean),
                ("object", None) => Ok(Rule::Object),
                ("array", None) => Ok(Rule::Array),
                ("min", Some(arg)) => parse_bound(name, arg).map(Rule::Min),
                ("max", Some(arg)) => parse_bound(name, arg).map(Rule::Max),
                ("in", Some(arg)) => Ok(Rule::In(arg.split(',').map(str::trim).collect())),
                _ => Err(format!("unknown validation rule: {}", part)),
            }
        })
        .collect()
}

fn parse_bound(name: &str, arg: &str) -> Result<f64, String> {
    arg.parse()
        .map_err(|_| format!("invalid argument for {} rule: {}", name, arg))
}

/// Returns the casted value, `None` when an optional field is absent.
fn apply_rules(field: &str, value: Value, rules: &[Rule<'_>]) -> Result<Option<Value>, FieldError> {
    let absent = value.is_null();
    if absent && !rules.contains(&Rule::Required) {
        return Ok(None);
    }

    let mut value = value;
    for rule in rules {
        value = apply_rule(rule, &value).ok_or_else(|| FieldError {
            field: field.to_string(),
            validation: rule.name().to_string(),
            message: format!("{} validation failed on {}", rule.name(), field),
        })?;
    }

    Ok(Some(value))
}

fn apply_rule(rule: &Rule<'_>, value: &Value) -> Option<Value> {
    match rule {
        Rule::Required => match value {
            Value::Null => None,
            Value::String(s) if s.is_empty() => None,
            _ => Some(value.clone()),
        },
        Rule::String => value.is_string().then(|| value.clone()),
        Rule::Number => match value {
            Value::Number(_) => Some(value.clone()),
            Value::String(s) => cast_number(s),
            _ => None,
        },
        Rule::Integer => match value {
            Value::Number(n) if n.is_i64() || n.is_u64() => Some(value.clone()),
            Value::String(s) => s.trim().parse::<i64>().ok().map(Value::from),
            _ => None,
        },
        Rule::Boolean => match value {
            Value::Bool(_) => Some(value.clone()),
            Value::String(s) => match s.as_str() {
                "true" | "1" => Some(Value::Bool(true)),
                "false" | "0" => Some(Value::Bool(false)),
                _ => None,
            },
            Value::Number(n) => match n.as_i64() {
                Some(1) => Some(Value::Bool(true)),
                Some(0) => Some(Value::Bool(false)),
                _ => None,
            },
            _ => None,
        },
        Rule::Object => value.is_object().then(|| value.clone()),
        Rule::Array => value.is_array().then(|| value.clone()),
        Rule::Min(bound) => measure(value).filter(|m| m >= bound).map(|_| value.clone()),
        Rule::Max(bound) => measure(value).filter(|m| m <= bound).map(|_| value.clone()),
        Rule::In(allowed) => {
            let text = match value {
                Value::String(s) => s.clone(),
                Value::Number(n) => n.to_string(),
                Value::Bool(b) => b.to_string(),
                _ => return None,
            };
            allowed.contains(&text.as_str()).then(|| value.clone())
        }
    }
}

fn cast_number(raw: &str) -> Option<Value> {
    let raw = raw.trim();
    if let Ok(i) = raw.parse::<i64>() {
        return Some(Value::from(i));
    }
    raw.parse::<f64>()
        .ok()
        .and_then(Number::from_f64)
        .map(Value::Number)
}

/// Length for strings and arrays, value for numbers.
fn measure(value: &Value) -> Option<f64> {
    match value {
        Value::String(s) => Some(s.chars().count() as f64),
        Value::Array(items) => Some(items.len() as f64),
        Value::Number(n) => n.as_f64(),
        _ => None,
    }
}
