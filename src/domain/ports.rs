use crate::domain::model::{FieldSchema, HttpResponse, SchemaError};
use async_trait::async_trait;
use serde_json::{Map, Value};

/// Schema validation engine. Returns the casted data on success.
#[async_trait]
pub trait SchemaValidator: Send + Sync {
    async fn validate(&self, data: Value, schema: &FieldSchema) -> Result<Value, SchemaError>;
}

/// The slice of an HTTP exchange output validation reads and writes.
pub trait ResponseContext: Send {
    fn status(&self) -> i64;
    fn headers(&self) -> Map<String, Value>;
    /// Merges `headers` into the current header set.
    fn set_headers(&mut self, headers: Map<String, Value>);
    fn body(&self) -> &Value;
    fn set_body(&mut self, body: Value);
}

impl ResponseContext for HttpResponse {
    fn status(&self) -> i64 {
        self.status
    }

    fn headers(&self) -> Map<String, Value> {
        self.headers.clone()
    }

    fn set_headers(&mut self, headers: Map<String, Value>) {
        for (name, value) in headers {
            self.headers.retain(|existing, _| !existing.eq_ignore_ascii_case(&name));
            self.headers.insert(name.to_ascii_lowercase(), value);
        }
    }

    fn body(&self) -> &Value {
        &self.body
    }

    fn set_body(&mut self, body: Value) {
        self.body = body;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_set_headers_replaces_case_insensitively() {
        let mut response = HttpResponse::new(200);
        response.headers.insert("X-Count".to_string(), json!("3"));

        let mut casted = Map::new();
        casted.insert("X-Count".to_string(), json!(3));
        response.set_headers(casted);

        assert_eq!(response.headers.len(), 1);
        assert_eq!(response.headers.get("x-count"), Some(&json!(3)));
    }
}
