use crate::errors::ToolError;
use regex::{NoExpand, Regex};
use serde_json::Value;

/// Replaces the first `{...}` token that mentions `name` with `value`.
///
/// Tokens may carry decorations such as `{+name}` or `{name=**}`; the whole
/// token is replaced. Returns the input unchanged when no token matches.
pub fn substitute_param(url: &str, name: &str, value: &str) -> Result<String, ToolError> {
    let pattern = format!(r"\{{[^{{}}]*{}[^{{}}]*\}}", regex::escape(name));
    let re = Regex::new(&pattern)
        .map_err(|err| ToolError::internal(format!("Invalid path parameter name: {}", err)))?;
    Ok(re.replacen(url, 1, NoExpand(value)).to_string())
}

/// Applies every path parameter in insertion order.
pub fn substitute_params(
    url: &str,
    params: &serde_json::Map<String, Value>,
) -> Result<String, ToolError> {
    let mut out = url.to_string();
    for (name, value) in params {
        let rendered = match value {
            Value::String(text) => text.clone(),
            Value::Null => continue,
            other => other.to_string(),
        };
        out = substitute_param(&out, name, &rendered)?;
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn substitute_param_replaces_plain_token() {
        let url = "https://www.googleapis.com/drive/v3/files/{fileId}";
        assert_eq!(
            substitute_param(url, "fileId", "abc").unwrap(),
            "https://www.googleapis.com/drive/v3/files/abc"
        );
    }

    #[test]
    fn substitute_param_replaces_decorated_token() {
        let url = "https://sheets.googleapis.com/v4/{+name}:get";
        assert_eq!(
            substitute_param(url, "name", "spreadsheets/1").unwrap(),
            "https://sheets.googleapis.com/v4/spreadsheets/1:get"
        );
    }

    #[test]
    fn substitute_param_only_touches_first_match() {
        let url = "https://h/{userId}/x/{userId}";
        assert_eq!(
            substitute_param(url, "userId", "me").unwrap(),
            "https://h/me/x/{userId}"
        );
    }

    #[test]
    fn substitute_param_does_not_span_tokens() {
        let url = "https://h/{userId}/messages/{id}";
        assert_eq!(
            substitute_param(url, "id", "42").unwrap(),
            "https://h/{userId}/messages/42"
        );
    }

    #[test]
    fn substitute_param_keeps_dollar_signs_literal() {
        let url = "https://h/{name}";
        assert_eq!(substitute_param(url, "name", "$1").unwrap(), "https://h/$1");
    }

    #[test]
    fn substitute_params_applies_all() {
        let params = serde_json::json!({"userId": "me", "id": 7})
            .as_object()
            .cloned()
            .unwrap();
        let url = "https://gmail.googleapis.com/gmail/v1/users/{userId}/messages/{id}";
        assert_eq!(
            substitute_params(url, &params).unwrap(),
            "https://gmail.googleapis.com/gmail/v1/users/me/messages/7"
        );
    }
}
