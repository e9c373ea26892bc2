//! news-rag CLI
//!
//! Run with: cargo run -p news-rag -- --config news-rag.toml <command>

use anyhow::Context;
use clap::{Parser, Subcommand};
use news_rag::{AppState, QueryRequest, RagConfig};
use serde::Serialize;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Question answering over crawled news articles
#[derive(Parser)]
#[command(name = "news-rag", version, about)]
struct Cli {
    /// Path to configuration file (TOML); defaults plus environment when omitted
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Ingest every article in the crawled directory
    Ingest {
        /// Drop and recreate the collection first
        #[arg(long)]
        force_refresh: bool,
    },
    /// Drop the collection and rebuild it from the crawled directory
    Reset,
    /// Answer a question from the knowledge base
    Query {
        question: String,
        /// Number of chunks to retrieve (1-20)
        #[arg(long, default_value_t = 5)]
        max_results: usize,
    },
    /// Vector search without generation
    Search {
        query: String,
        #[arg(long, default_value_t = 5)]
        limit: usize,
    },
    /// Crawled file and collection statistics
    Stats,
    /// Service health
    Health,
    /// Ingest if empty, then watch the crawled directory until Ctrl+C
    Watch {
        /// Poll interval in seconds (overrides config)
        #[arg(long)]
        interval: Option<u64>,
    },
}

#[derive(Serialize)]
struct SearchOutput {
    query: String,
    results_count: usize,
    results: Vec<news_rag::SearchHit>,
}

impl Command {
    /// Fail fast when the credentials this command needs are missing
    fn check_credentials(&self, config: &RagConfig) -> news_rag::Result<()> {
        match self {
            Command::Ingest { .. } | Command::Reset | Command::Search { .. } => {
                config.require_embedding_key()?;
            }
            Command::Query { .. } | Command::Watch { .. } => {
                config.require_embedding_key()?;
                config.require_generation_key()?;
            }
            Command::Stats | Command::Health => {}
        }
        Ok(())
    }
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "news_rag=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let mut config = RagConfig::load_or_default(cli.config.as_deref())
        .context("Failed to load configuration")?;
    if let Command::Watch { interval } = &cli.command {
        config.watcher.enabled = true;
        if let Some(secs) = interval {
            config.watcher.interval_secs = (*secs).max(1);
        }
    }

    tracing::info!("Configuration loaded");
    tracing::info!("  - Crawled dir: {}", config.paths.crawled_dir.display());
    tracing::info!("  - Embedding model: {}", config.embeddings.model);
    tracing::info!("  - Generation model: {}", config.generation.model);
    tracing::info!("  - Collection: {}", config.vector_db.collection_name);

    cli.command.check_credentials(&config)?;
    let state = AppState::new(config)?;

    match cli.command {
        Command::Ingest { force_refresh } => {
            let report = state.ingestor().ingest_all(force_refresh).await;
            print_json(&report)?;
            if !report.success {
                std::process::exit(1);
            }
        }
        Command::Reset => {
            let report = state.ingestor().ingest_all(true).await;
            print_json(&report)?;
            if !report.success {
                std::process::exit(1);
            }
        }
        Command::Query {
            question,
            max_results,
        } => {
            let request = QueryRequest::new(question).with_max_results(max_results);
            request.validate()?;
            let result = state
                .engine()
                .answer_question(&request.question, Some(request.max_results))
                .await;
            print_json(&result)?;
        }
        Command::Search { query, limit } => {
            let results = state.engine().search_similar(&query, Some(limit)).await;
            print_json(&SearchOutput {
                query,
                results_count: results.len(),
                results,
            })?;
        }
        Command::Stats => print_json(&state.stats().await)?,
        Command::Health => print_json(&state.health().await)?,
        Command::Watch { .. } => {
            if let Some(report) = state.start_background().await {
                print_json(&report)?;
            }
            tracing::info!("Watching for new articles, press Ctrl+C to stop");
            tokio::signal::ctrl_c()
                .await
                .context("Failed to listen for Ctrl+C")?;
            tracing::info!("Shutting down...");
            state.shutdown().await;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(embedding: bool, generation: bool) -> RagConfig {
        let mut config = RagConfig::default();
        config.embeddings.api_key = embedding.then(|| "sk-test".to_string());
        config.generation.api_key = generation.then(|| "key".to_string());
        config
    }

    #[test]
    fn test_credentials_per_command() {
        let ingest = Command::Ingest { force_refresh: false };
        let query = Command::Query {
            question: "What moved bitcoin?".to_string(),
            max_results: 5,
        };

        assert!(ingest.check_credentials(&config(true, false)).is_ok());
        assert!(Command::Reset.check_credentials(&config(true, false)).is_ok());
        assert!(ingest.check_credentials(&config(false, true)).unwrap_err().is_config());

        assert!(query.check_credentials(&config(true, false)).unwrap_err().is_config());
        assert!(query.check_credentials(&config(true, true)).is_ok());

        assert!(Command::Health.check_credentials(&config(false, false)).is_ok());
        assert!(Command::Stats.check_credentials(&config(false, false)).is_ok());
    }
}
