use crate::constants::{discovery::METHOD_EXAMPLES, limits::SUGGESTION_LIMIT};
use crate::errors::ToolError;
use crate::utils::suggest::suggest;
use serde_json::Value;

fn did_you_mean(input: &str, known: &[String]) -> (Vec<String>, String) {
    let suggestions = if input.is_empty() {
        Vec::new()
    } else {
        suggest(input, known, SUGGESTION_LIMIT)
    };
    let text = if suggestions.is_empty() {
        String::new()
    } else {
        format!("Did you mean: {}?", suggestions.join(", "))
    };
    (suggestions, text)
}

/// Error for a dotted method name that does not resolve to a method.
///
/// `known_methods` are the method names the discovery document exposes.
pub fn method_not_found_error(method_name: &str, known_methods: &[String]) -> ToolError {
    let (suggestions, hint) = did_you_mean(method_name, known_methods);
    let mut err = ToolError::method_not_found(format!(
        "Please set valid methodName. Ex. {} and so on.",
        METHOD_EXAMPLES.join(", ")
    ));
    if !hint.is_empty() {
        err = err.with_hint(hint);
    }
    err.with_details(serde_json::json!({
        "method_name": method_name,
        "examples": METHOD_EXAMPLES,
        "did_you_mean": suggestions,
    }))
}

pub fn unknown_action_error(action: Option<&Value>, known_actions: &[&str]) -> ToolError {
    let action_value = action.and_then(|v| v.as_str()).unwrap_or("").to_string();
    let known: Vec<String> = known_actions.iter().map(|s| s.to_string()).collect();
    let (suggestions, did_you_mean) = did_you_mean(&action_value, &known);
    let hint = [did_you_mean, format!("Use one of: {}.", known.join(", "))]
        .into_iter()
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    ToolError::invalid_configuration(format!("Unknown action: {}", action_value))
        .with_hint(hint)
        .with_details(serde_json::json!({
            "known_actions": known,
            "did_you_mean": suggestions,
        }))
}
