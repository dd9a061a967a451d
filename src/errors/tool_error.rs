use serde::Serialize;
use serde_json::Value;
use std::error::Error;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolErrorKind {
    InvalidConfiguration,
    InvalidDiscoveryResponse,
    ApiNotFound,
    MethodNotFound,
    ApiRequestFailed,
    InvalidResponse,
    Timeout,
    Transport,
    Internal,
}

#[derive(Debug, Clone, Serialize)]
pub struct ToolError {
    pub kind: ToolErrorKind,
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
    pub retryable: bool,
}

impl ToolError {
    pub fn new(kind: ToolErrorKind, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind,
            code: code.into(),
            message: message.into(),
            hint: None,
            details: None,
            retryable: matches!(kind, ToolErrorKind::Timeout | ToolErrorKind::Transport),
        }
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }

    pub fn invalid_configuration(message: impl Into<String>) -> Self {
        Self::new(
            ToolErrorKind::InvalidConfiguration,
            "INVALID_CONFIGURATION",
            message,
        )
    }

    pub fn invalid_discovery_response(message: impl Into<String>) -> Self {
        Self::new(
            ToolErrorKind::InvalidDiscoveryResponse,
            "INVALID_DISCOVERY_RESPONSE",
            message,
        )
    }

    pub fn api_not_found(message: impl Into<String>) -> Self {
        Self::new(ToolErrorKind::ApiNotFound, "API_NOT_FOUND", message)
    }

    pub fn method_not_found(message: impl Into<String>) -> Self {
        Self::new(ToolErrorKind::MethodNotFound, "METHOD_NOT_FOUND", message)
    }

    /// The message is the upstream response body, unmodified.
    pub fn api_request_failed(status: u16, body: impl Into<String>) -> Self {
        Self::new(ToolErrorKind::ApiRequestFailed, "API_REQUEST_FAILED", body)
            .with_details(serde_json::json!({ "status": status }))
    }

    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::new(ToolErrorKind::InvalidResponse, "INVALID_API_RESPONSE", message)
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(ToolErrorKind::Timeout, "TIMEOUT", message)
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(ToolErrorKind::Transport, "TRANSPORT", message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ToolErrorKind::Internal, "INTERNAL", message)
    }

    pub fn status(&self) -> Option<u16> {
        self.details
            .as_ref()
            .and_then(|v| v.get("status"))
            .and_then(|v| v.as_u64())
            .map(|v| v as u16)
    }
}

impl fmt::Display for ToolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl Error for ToolError {}

impl From<std::io::Error> for ToolError {
    fn from(err: std::io::Error) -> Self {
        ToolError::internal(err.to_string())
    }
}

impl From<serde_json::Error> for ToolError {
    fn from(err: serde_json::Error) -> Self {
        ToolError::internal(err.to_string())
    }
}
