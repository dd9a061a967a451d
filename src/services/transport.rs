use crate::constants::network;
use crate::errors::ToolError;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Method};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// A fully concrete HTTP request.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct ResolvedRequest {
    pub url: String,
    pub http_method: String,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    /// When set, the transport reports every status code instead of failing
    /// on non-success ones.
    pub mute_http_exceptions: bool,
}

impl ResolvedRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            http_method: "GET".to_string(),
            ..Default::default()
        }
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: BTreeMap<String, String>,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            headers: BTreeMap::new(),
            body: body.into(),
        }
    }

    pub fn json(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::from_str(&self.body)
    }
}

/// Performs one HTTP exchange.
#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    async fn fetch(&self, request: &ResolvedRequest) -> Result<HttpResponse, ToolError>;
}

#[derive(Clone)]
pub struct ReqwestTransport {
    timeout_ms: u64,
    client: Arc<Mutex<Option<Client>>>,
}

impl ReqwestTransport {
    pub fn new(timeout_ms: u64) -> Self {
        Self {
            timeout_ms,
            client: Arc::new(Mutex::new(None)),
        }
    }

    fn get_client(&self) -> Result<Client, ToolError> {
        let mut guard = self
            .client
            .lock()
            .map_err(|_| ToolError::internal("Failed to access HTTP client cache"))?;
        if let Some(existing) = guard.as_ref() {
            return Ok(existing.clone());
        }
        let client = Client::builder()
            .user_agent(network::USER_AGENT)
            .timeout(Duration::from_millis(self.timeout_ms))
            .connect_timeout(Duration::from_millis(network::TIMEOUT_CONNECTION_MS))
            .build()
            .map_err(|err| ToolError::internal(format!("Failed to build HTTP client: {}", err)))?;
        *guard = Some(client.clone());
        Ok(client)
    }
}

impl Default for ReqwestTransport {
    fn default() -> Self {
        Self::new(network::TIMEOUT_API_REQUEST_MS)
    }
}

#[async_trait::async_trait]
impl Transport for ReqwestTransport {
    async fn fetch(&self, request: &ResolvedRequest) -> Result<HttpResponse, ToolError> {
        let client = self.get_client()?;
        let method = Method::from_bytes(request.http_method.to_uppercase().as_bytes())
            .map_err(|_| ToolError::invalid_configuration("Invalid HTTP method"))?;

        let mut headers = headers_to_headermap(&request.headers)?;
        if let Some(content_type) = request.content_type.as_deref() {
            headers.insert(
                reqwest::header::CONTENT_TYPE,
                HeaderValue::from_str(content_type)
                    .map_err(|_| ToolError::invalid_configuration("Invalid content type"))?,
            );
        }
        let mut req = client.request(method, &request.url).headers(headers);
        if let Some(payload) = request.payload.clone() {
            req = req.body(payload);
        }

        let response = req.send().await.map_err(map_reqwest_error)?;
        let status = response.status();
        let response_headers = headers_to_map(response.headers());
        let body = response.text().await.map_err(map_reqwest_error)?;

        if !request.mute_http_exceptions && !status.is_success() {
            return Err(ToolError::api_request_failed(status.as_u16(), body));
        }
        Ok(HttpResponse {
            status: status.as_u16(),
            headers: response_headers,
            body,
        })
    }
}

pub(crate) fn map_reqwest_error(err: reqwest::Error) -> ToolError {
    if err.is_timeout() {
        return ToolError::timeout("HTTP request timed out");
    }
    ToolError::transport(err.to_string())
}

fn headers_to_headermap(headers: &BTreeMap<String, String>) -> Result<HeaderMap, ToolError> {
    let mut map = HeaderMap::new();
    for (key, value) in headers {
        let name = HeaderName::from_bytes(key.as_bytes())
            .map_err(|_| ToolError::invalid_configuration("Invalid header name"))?;
        let val = HeaderValue::from_str(value)
            .map_err(|_| ToolError::invalid_configuration("Invalid header value"))?;
        map.insert(name, val);
    }
    Ok(map)
}

fn headers_to_map(headers: &HeaderMap) -> BTreeMap<String, String> {
    headers
        .iter()
        .filter_map(|(key, value)| {
            value
                .to_str()
                .ok()
                .map(|text| (key.as_str().to_string(), text.to_string()))
        })
        .collect()
}
