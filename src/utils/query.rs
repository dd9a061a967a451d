use serde_json::Value;

/// Ordered query mapping. Values are scalars or arrays of scalars.
pub type QueryMap = serde_json::Map<String, Value>;

/// Appends `query` to `url`.
///
/// Array values expand to one `key=value` pair per element. Every value is
/// percent-encoded; keys are written as given. Pair order follows the map's
/// insertion order. `null` entries are skipped, and a map that yields no pairs
/// leaves `url` untouched.
pub fn encode_query(url: &str, query: &QueryMap) -> String {
    let pairs = query
        .iter()
        .flat_map(|(key, value)| match value {
            Value::Array(items) => items
                .iter()
                .filter_map(|item| encode_pair(key, item))
                .collect::<Vec<_>>(),
            other => encode_pair(key, other).into_iter().collect(),
        })
        .collect::<Vec<_>>();
    if pairs.is_empty() {
        return url.to_string();
    }
    format!("{}?{}", url, pairs.join("&"))
}

/// Renders a query value the way it should appear before encoding.
pub fn render_query_value(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(text) => Some(text.clone()),
        Value::Bool(_) | Value::Number(_) => Some(value.to_string()),
        Value::Array(_) | Value::Object(_) => Some(value.to_string()),
    }
}

fn encode_pair(key: &str, value: &Value) -> Option<String> {
    let rendered = render_query_value(value)?;
    Some(format!("{}={}", key, urlencoding::encode(&rendered)))
}
