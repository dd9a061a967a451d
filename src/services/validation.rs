use crate::errors::ToolError;

#[derive(Clone)]
pub struct Validation;

impl Validation {
    pub fn new() -> Self {
        Self
    }

    /// Trimmed, non-empty string or `INVALID_CONFIGURATION`.
    pub fn ensure_string(&self, value: &str, label: &str) -> Result<String, ToolError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ToolError::invalid_configuration(format!(
                "{} must be a non-empty string",
                label
            ))
            .with_hint("Invalid object. Please confirm it again."));
        }
        if trimmed.contains('\0') {
            return Err(ToolError::invalid_configuration(format!(
                "{} must not contain null bytes",
                label
            )));
        }
        Ok(trimmed.to_string())
    }

    pub fn ensure_http_url(&self, value: &str, label: &str) -> Result<url::Url, ToolError> {
        let parsed = url::Url::parse(value.trim()).map_err(|_| {
            ToolError::invalid_discovery_response(format!("{} is not a valid URL: {}", label, value))
        })?;
        let scheme = format!("{}:", parsed.scheme());
        if !crate::constants::protocols::ALLOWED_HTTP.contains(&scheme.as_str()) {
            return Err(ToolError::invalid_discovery_response(format!(
                "{} must use http or https: {}",
                label, value
            )));
        }
        Ok(parsed)
    }
}

impl Default for Validation {
    fn default() -> Self {
        Self::new()
    }
}
