//! Claim adjudication server binary
//!
//! Run with: cargo run -p claim-rag --bin claim-rag-server

use claim_rag::{
    config::{RagConfig, CONFIG_PATH_ENV},
    server::ClaimServer,
};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "claim_rag=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    println!(
        r#"
╔═══════════════════════════════════════════════════════════╗
║                  Claim Adjudicator API                    ║
║        Policy-grounded insurance claim decisions          ║
╚═══════════════════════════════════════════════════════════╝
"#
    );

    let config_path = std::env::var(CONFIG_PATH_ENV).ok().map(PathBuf::from);
    let config = RagConfig::load(config_path.as_deref())?;

    tracing::info!("Configuration loaded");
    tracing::info!("  - Embedding model: {}", config.embeddings.model);
    tracing::info!("  - Embedding dimensions: {}", config.embeddings.dimensions);
    tracing::info!("  - Index: {}", config.vector_db.storage_path.display());
    tracing::info!("  - LLM: {} via {:?}", config.llm.model, config.llm.backend);
    tracing::info!("  - Top-k: {}", config.retrieval.top_k);

    let server = ClaimServer::new(config).await?;

    println!("\nServer starting...");
    println!("  API: http://{}", server.address());
    println!("  Health: http://{}/health", server.address());
    println!("\nEndpoints:");
    println!("  GET  /               - Welcome message");
    println!("  POST /process_claim  - Adjudicate a claim");
    println!("\nPress Ctrl+C to stop\n");

    server.start().await?;

    Ok(())
}
