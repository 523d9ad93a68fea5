//! API route definitions

pub mod claim;

use axum::{
    routing::{get, post},
    Router,
};

use super::state::AppState;

/// Claim routes, mounted at the root
pub fn claim_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(claim::welcome))
        .route("/process_claim", post(claim::process_claim))
}
