//! Decision and diagnostic response types

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Claim outcome the model is asked to choose
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Decision {
    Approved,
    Rejected,
}

/// Typed view of a decision payload
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DecisionRecord {
    pub decision: Decision,
    /// Approved amount, zero when rejected
    pub amount: u64,
    /// Explanation referencing the policy clauses
    pub justification: String,
}

/// Ways a well-formed decision can still break the instructions
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecisionViolation {
    /// A rejected claim carried a non-zero amount
    RejectedWithAmount(u64),
}

impl std::fmt::Display for DecisionViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RejectedWithAmount(amount) => {
                write!(f, "decision is Rejected but amount is {}", amount)
            }
        }
    }
}

impl DecisionRecord {
    /// Interpret a parsed payload; `None` when it lacks the expected shape
    pub fn from_payload(payload: &Map<String, Value>) -> Option<Self> {
        serde_json::from_value(Value::Object(payload.clone())).ok()
    }

    /// Instruction violations present in this record
    pub fn violations(&self) -> Vec<DecisionViolation> {
        let mut violations = Vec::new();
        if self.decision == Decision::Rejected && self.amount != 0 {
            violations.push(DecisionViolation::RejectedWithAmount(self.amount));
        }
        violations
    }
}

/// Returned in place of a decision when the model output is not a JSON object
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ParseDiagnostic {
    pub error: String,
    pub message: String,
    /// Model output exactly as received
    pub raw_llm_response: String,
    /// Text handed to the JSON parser after fence stripping
    pub attempted_parse_string: String,
}

impl ParseDiagnostic {
    pub const ERROR: &'static str = "Failed to parse LLM response as JSON";
    pub const MESSAGE: &'static str =
        "The LLM's output could not be converted into a valid JSON object.";

    pub fn new(raw_llm_response: impl Into<String>, attempted: impl Into<String>) -> Self {
        Self {
            error: Self::ERROR.to_string(),
            message: Self::MESSAGE.to_string(),
            raw_llm_response: raw_llm_response.into(),
            attempted_parse_string: attempted.into(),
        }
    }
}

/// Body returned by `POST /process_claim`
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(untagged)]
pub enum NormalizedResponse {
    /// The parsed object, whatever keys the model produced
    Decision(Map<String, Value>),
    Diagnostic(ParseDiagnostic),
}

impl NormalizedResponse {
    pub fn is_diagnostic(&self) -> bool {
        matches!(self, Self::Diagnostic(_))
    }

    /// Typed decision, if the payload has the expected shape
    pub fn decision_record(&self) -> Option<DecisionRecord> {
        match self {
            Self::Decision(payload) => DecisionRecord::from_payload(payload),
            Self::Diagnostic(_) => None,
        }
    }
}
