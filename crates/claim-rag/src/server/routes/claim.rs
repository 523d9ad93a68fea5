//! Claim adjudication endpoints

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde_json::{json, Value};
use std::time::Instant;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::server::state::AppState;
use crate::types::{ClaimRequest, NormalizedResponse};

pub const WELCOME_MESSAGE: &str =
    "Welcome to the Claim Adjudicator API. Use the /process_claim endpoint to make a query.";

/// GET / - Welcome message
pub async fn welcome() -> Json<Value> {
    Json(json!({ "message": WELCOME_MESSAGE }))
}

/// POST /process_claim - Adjudicate a natural-language claim
///
/// Parse failures of the model output still return 200 with a diagnostic body.
pub async fn process_claim(
    State(state): State<AppState>,
    request: std::result::Result<Json<ClaimRequest>, JsonRejection>,
) -> Result<Json<NormalizedResponse>> {
    let Json(request) = request.map_err(|e| Error::InvalidRequest(e.body_text()))?;
    let query = request.query.as_str();

    let request_id = Uuid::new_v4();
    let start = Instant::now();
    tracing::info!(%request_id, "Claim query: \"{}\"", query);

    let response = state.engine().adjudicate(query).await?;

    tracing::info!(
        %request_id,
        diagnostic = response.is_diagnostic(),
        "Claim processed in {}ms",
        start.elapsed().as_millis()
    );

    Ok(Json(response))
}
