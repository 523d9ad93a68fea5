//! HTTP client for the claim API

use serde_json::{Map, Value};
use std::time::Duration;

use crate::error::{Error, Result};
use crate::types::{ClaimRequest, ParseDiagnostic};

/// Outcome of submitting a claim
#[derive(Debug, Clone, PartialEq)]
pub enum ClaimReply {
    /// Parsed decision object
    Decision(Map<String, Value>),
    /// The server could not parse the model output (still HTTP 200)
    Diagnostic(ParseDiagnostic),
    /// Non-2xx response
    Rejected { status: u16, body: String },
}

impl ClaimReply {
    /// Classify a 200 response body
    pub fn from_body(body: Value) -> Result<Self> {
        let map = match body {
            Value::Object(map) => map,
            other => {
                return Err(Error::remote(format!(
                    "expected a JSON object from the claim API, got {}",
                    other
                )))
            }
        };

        let is_diagnostic = map.get("error").and_then(Value::as_str) == Some(ParseDiagnostic::ERROR)
            && map.contains_key("raw_llm_response");
        if is_diagnostic {
            let diagnostic = serde_json::from_value(Value::Object(map))?;
            return Ok(Self::Diagnostic(diagnostic));
        }

        Ok(Self::Decision(map))
    }

    /// `error.message` of a structured error body, or the raw body
    pub fn error_message(&self) -> Option<String> {
        match self {
            Self::Rejected { body, .. } => Some(
                serde_json::from_str::<Value>(body)
                    .ok()
                    .and_then(|v| v["error"]["message"].as_str().map(str::to_string))
                    .unwrap_or_else(|| body.clone()),
            ),
            _ => None,
        }
    }
}

/// Client for `POST /process_claim`
pub struct ClaimClient {
    http: reqwest::Client,
    endpoint: String,
}

impl ClaimClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http,
            endpoint: format!("{}/process_claim", base_url.trim_end_matches('/')),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Submit a claim query
    pub async fn submit(&self, query: &str) -> Result<ClaimReply> {
        let response = self
            .http
            .post(&self.endpoint)
            .json(&ClaimRequest::new(query))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Ok(ClaimReply::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        ClaimReply::from_body(response.json().await?)
    }
}

/// Render an amount in dollars with thousands separators
pub fn format_amount(amount: u64) -> String {
    let digits = amount.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    out.push('$');
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use axum::{routing::post, Json, Router};
    use serde_json::json;

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(0), "$0");
        assert_eq!(format_amount(999), "$999");
        assert_eq!(format_amount(5000), "$5,000");
        assert_eq!(format_amount(1_234_567), "$1,234,567");
    }

    #[test]
    fn test_diagnostic_body_is_not_a_decision() {
        let body = serde_json::to_value(ParseDiagnostic::new("prose", "prose")).unwrap();
        assert!(matches!(
            ClaimReply::from_body(body).unwrap(),
            ClaimReply::Diagnostic(d) if d.raw_llm_response == "prose"
        ));
    }

    #[test]
    fn test_decision_body() {
        let reply = ClaimReply::from_body(json!({
            "decision": "Approved",
            "amount": 5000,
            "justification": "Covered"
        }))
        .unwrap();
        match reply {
            ClaimReply::Decision(map) => assert_eq!(map["decision"], "Approved"),
            other => panic!("expected decision, got {:?}", other),
        }
    }

    #[test]
    fn test_non_object_body_is_error() {
        assert!(ClaimReply::from_body(json!(["Approved"])).is_err());
    }

    #[tokio::test]
    async fn test_non_success_status_is_rejected() {
        let app = Router::new().route(
            "/process_claim",
            post(|| async {
                (
                    StatusCode::BAD_GATEWAY,
                    Json(json!({"error": {"type": "remote_service_error", "message": "HTTP 401"}})),
                )
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let client = ClaimClient::new(&format!("http://{}/", addr), Duration::from_secs(5)).unwrap();
        let reply = client.submit("knee surgery").await.unwrap();

        assert!(matches!(reply, ClaimReply::Rejected { status: 502, .. }));
        assert_eq!(reply.error_message().as_deref(), Some("HTTP 401"));
    }
}
