//! claim-rag CLI
//!
//! Ingest policy documents, serve the claim API and submit claims from the terminal.

use anyhow::Context;
use clap::{Parser, Subcommand};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use claim_rag::{
    client::format_amount,
    config::CONFIG_PATH_ENV,
    embeddings::create_embedder,
    ingestion::IngestPipeline,
    server::ClaimServer,
    ClaimClient, ClaimReply, RagConfig,
};

#[derive(Parser)]
#[command(name = "claim-rag")]
#[command(about = "Insurance claim adjudication over policy documents", long_about = None)]
#[command(version)]
struct Cli {
    /// TOML configuration file
    #[arg(long, global = true, env = CONFIG_PATH_ENV)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the vector index from a documents directory
    Ingest {
        /// Directory of PDF and DOCX policy documents
        #[arg(long)]
        docs: Option<PathBuf>,
        /// Snapshot output directory
        #[arg(long)]
        index: Option<PathBuf>,
    },
    /// Run the HTTP API
    Serve,
    /// Submit a claim to a running server
    Ask {
        /// Natural-language claim description
        query: String,
        /// Server base URL
        #[arg(long, default_value = "http://127.0.0.1:8000")]
        url: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "claim_rag=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = RagConfig::load(cli.config.as_deref())
        .with_context(|| "failed to load configuration")?;

    match cli.command {
        Commands::Ingest { docs, index } => ingest(config, docs, index).await,
        Commands::Serve => {
            ClaimServer::new(config).await?.start().await?;
            Ok(())
        }
        Commands::Ask { query, url } => ask(&config, &query, &url).await,
    }
}

async fn ingest(
    config: RagConfig,
    docs: Option<PathBuf>,
    index: Option<PathBuf>,
) -> anyhow::Result<()> {
    let docs_dir = docs.unwrap_or_else(|| config.documents.dir.clone());
    let index_dir = index.unwrap_or_else(|| config.vector_db.storage_path.clone());

    println!(
        "{} {} -> {}",
        style("Ingesting").cyan().bold(),
        docs_dir.display(),
        index_dir.display()
    );

    let embedder = create_embedder(&config.embeddings).await?;
    let pipeline = IngestPipeline::from_config(&config, embedder)?;

    let pb = ProgressBar::new(0);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} chunks ({percent}%)")
            .context("invalid progress template")?
            .progress_chars("#>-"),
    );

    let report = pipeline
        .run_with_progress(&docs_dir, &index_dir, &|done, total| {
            pb.set_length(total as u64);
            pb.set_position(done as u64);
        })
        .await?;
    pb.finish_and_clear();

    for name in &report.skipped {
        println!("  {} {} (unsupported type)", style("skipped").yellow(), name);
    }
    for (name, reason) in &report.failed {
        println!("  {} {}: {}", style("failed").red(), name, reason);
    }

    match &report.snapshot {
        Some(path) => println!(
            "{} {} documents, {} chunks -> {}",
            style("Done").green().bold(),
            report.documents,
            report.chunks,
            path.display()
        ),
        None => println!(
            "{} no documents with text in {}; nothing to ingest",
            style("Nothing to do:").yellow().bold(),
            docs_dir.display()
        ),
    }

    Ok(())
}

async fn ask(config: &RagConfig, query: &str, url: &str) -> anyhow::Result<()> {
    let timeout = Duration::from_secs(config.llm.timeout_secs * (config.llm.max_retries as u64 + 1) + 30);
    let client = ClaimClient::new(url, timeout)?;

    let reply = client
        .submit(query)
        .await
        .with_context(|| format!("could not reach {}", client.endpoint()))?;

    match &reply {
        ClaimReply::Decision(payload) => {
            let decision = payload.get("decision").and_then(|v| v.as_str()).unwrap_or("Unknown");
            let styled = match decision {
                "Approved" => style(decision).green().bold(),
                "Rejected" => style(decision).red().bold(),
                _ => style(decision).yellow().bold(),
            };
            println!("{} {}", style("Decision:").bold(), styled);

            if let Some(amount) = payload.get("amount").and_then(|v| v.as_u64()) {
                println!("{} {}", style("Amount:").bold(), format_amount(amount));
            }
            if let Some(justification) = payload.get("justification").and_then(|v| v.as_str()) {
                println!("{}\n{}", style("Justification:").bold(), justification);
            }
        }
        ClaimReply::Diagnostic(diagnostic) => {
            println!("{} {}", style("Error:").red().bold(), diagnostic.error);
            println!("{}", diagnostic.message);
            println!("{}\n{}", style("Raw model output:").dim(), diagnostic.raw_llm_response);
        }
        ClaimReply::Rejected { status, .. } => {
            println!(
                "{} server returned {}: {}",
                style("Error:").red().bold(),
                status,
                reply.error_message().unwrap_or_default()
            );
            std::process::exit(1);
        }
    }

    Ok(())
}
