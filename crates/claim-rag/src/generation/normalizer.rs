//! Converts raw model output into a decision object or a parse diagnostic

use serde_json::Value;

use crate::types::{NormalizedResponse, ParseDiagnostic};

pub const OPENING_FENCE: &str = "```json";
pub const CLOSING_FENCE: &str = "```";

/// Remove a surrounding markdown code fence, trimming at each step
pub fn strip_fences(raw: &str) -> &str {
    let mut text = raw.trim();
    if let Some(rest) = text.strip_prefix(OPENING_FENCE) {
        text = rest.trim();
    }
    if let Some(rest) = text.strip_suffix(CLOSING_FENCE) {
        text = rest.trim();
    }
    text
}

/// Parse model output; anything but a JSON object becomes a diagnostic
pub fn normalize(raw: &str) -> NormalizedResponse {
    let attempted = strip_fences(raw);

    match serde_json::from_str::<Value>(attempted) {
        Ok(Value::Object(payload)) => NormalizedResponse::Decision(payload),
        Ok(other) => {
            tracing::warn!("Model output parsed as JSON {} rather than an object", kind(&other));
            NormalizedResponse::Diagnostic(ParseDiagnostic::new(raw, attempted))
        }
        Err(e) => {
            tracing::warn!("Model output is not valid JSON: {}", e);
            NormalizedResponse::Diagnostic(ParseDiagnostic::new(raw, attempted))
        }
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const DECISION: &str =
        r#"{"decision":"Approved","amount":5000,"justification":"Waiting period of 2 months is satisfied."}"#;

    #[test]
    fn test_clean_json_is_unchanged() {
        assert_eq!(strip_fences(DECISION), DECISION);
        assert_eq!(strip_fences(strip_fences(DECISION)), DECISION);
    }

    #[test]
    fn test_fenced_json_yields_inner_object() {
        let fenced = format!("```json\n{}\n```", DECISION);
        assert_eq!(strip_fences(&fenced), DECISION);

        match normalize(&fenced) {
            NormalizedResponse::Decision(payload) => {
                assert_eq!(payload["decision"], "Approved");
                assert_eq!(payload["amount"], 5000);
            }
            other => panic!("expected decision, got {:?}", other),
        }
    }

    #[test]
    fn test_surrounding_whitespace_and_partial_fences() {
        let leading_only = format!("  ```json\n{}  ", DECISION);
        let trailing_only = format!("\n{}\n```\n", DECISION);
        assert_eq!(strip_fences(&leading_only), DECISION);
        assert_eq!(strip_fences(&trailing_only), DECISION);
    }

    #[test]
    fn test_plain_fence_without_language_is_not_a_decision() {
        let fenced = format!("```\n{}\n```", DECISION);
        assert!(normalize(&fenced).is_diagnostic());
    }

    #[test]
    fn test_prose_becomes_diagnostic() {
        let raw = "I cannot determine this claim from the context.";
        match normalize(raw) {
            NormalizedResponse::Diagnostic(d) => {
                assert_eq!(d.error, "Failed to parse LLM response as JSON");
                assert_eq!(
                    d.message,
                    "The LLM's output could not be converted into a valid JSON object."
                );
                assert_eq!(d.raw_llm_response, raw);
                assert_eq!(d.attempted_parse_string, raw);
            }
            other => panic!("expected diagnostic, got {:?}", other),
        }
    }

    #[test]
    fn test_diagnostic_keeps_raw_and_attempted_text() {
        let raw = "```json\n{\"decision\": \"Approved\",}\n```";
        match normalize(raw) {
            NormalizedResponse::Diagnostic(d) => {
                assert_eq!(d.raw_llm_response, raw);
                assert_eq!(d.attempted_parse_string, "{\"decision\": \"Approved\",}");
            }
            other => panic!("expected diagnostic, got {:?}", other),
        }
    }

    #[test]
    fn test_non_object_json_is_diagnostic() {
        for raw in ["[1, 2, 3]", "\"Approved\"", "42", "null"] {
            assert!(normalize(raw).is_diagnostic(), "{}", raw);
        }
    }

    #[test]
    fn test_extra_keys_pass_through() {
        let response = normalize(r#"{"decision":"Rejected","amount":0,"justification":"x","confidence":0.9}"#);
        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            json!({"decision": "Rejected", "amount": 0, "justification": "x", "confidence": 0.9})
        );
    }
}
