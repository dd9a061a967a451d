use crate::services::transport::ResolvedRequest;
use crate::utils::query::{encode_query, QueryMap};
use serde_json::Value;
use std::collections::BTreeMap;

pub const JSON_CONTENT_TYPE: &str = "application/json";

/// Inputs that stay fixed for every request of one call.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RequestTemplate {
    pub endpoint: String,
    pub http_method: String,
    pub body: Option<Value>,
    pub token: Option<String>,
}

impl RequestTemplate {
    /// Concrete request for `query`. Deterministic; performs no I/O.
    ///
    /// A body is attached only when it is a JSON object. The bearer header is
    /// set only when a token was resolved.
    pub fn build(&self, query: &QueryMap) -> ResolvedRequest {
        let mut request = ResolvedRequest {
            url: encode_query(&self.endpoint, query),
            http_method: self.http_method.to_uppercase(),
            ..Default::default()
        };
        if let Some(body @ Value::Object(_)) = &self.body {
            request.payload = Some(body.to_string());
            request.content_type = Some(JSON_CONTENT_TYPE.to_string());
        }
        if let Some(token) = self.token.as_deref().filter(|t| !t.is_empty()) {
            let mut headers = BTreeMap::new();
            headers.insert("authorization".to_string(), format!("Bearer {}", token));
            request.headers = headers;
        }
        request
    }
}
