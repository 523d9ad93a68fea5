//! Claim request types

use serde::{Deserialize, Serialize};

/// Body of `POST /process_claim`
///
/// The query is passed to the engine as sent, including blank text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClaimRequest {
    /// Free-text claim description
    pub query: String,
}

impl ClaimRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
        }
    }
}
