mod config;
mod errors;
mod jobs;
mod llm_client;
mod models;
mod pipeline;
mod rerank;
mod retrieval;
mod scoring;
mod state;
mod text;

#[cfg(test)]
mod testing;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::jobs::loader::load_profile;
use crate::retrieval::Corpus;
use crate::state::AppState;

#[derive(Parser)]
#[command(
    name = "shortlist",
    about = "Rank candidate profiles against job configs",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Rank the corpus for every job config and write one submission per config
    Submit {
        /// Directory of *.yml job configs (overrides CONFIGS_DIR)
        #[arg(long)]
        configs: Option<PathBuf>,

        /// Local candidate corpus, a JSON array (overrides CORPUS_PATH)
        #[arg(long)]
        corpus: Option<PathBuf>,

        /// Submission output directory (overrides OUTPUT_DIR)
        #[arg(long)]
        out: Option<PathBuf>,

        /// Shortlist size per job (overrides TOP_N)
        #[arg(long)]
        top_n: Option<usize>,
    },

    /// Score single profiles against every job config and print the results
    Query {
        /// Candidate profile JSON file; repeat for several profiles
        #[arg(long = "profile", required = true)]
        profiles: Vec<PathBuf>,

        /// Directory of *.yml job configs (overrides CONFIGS_DIR)
        #[arg(long)]
        configs: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // .env may carry RUST_LOG, so load it before the subscriber reads the filter
    dotenvy::dotenv().ok();
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}=info", env!("CARGO_PKG_NAME")))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut config = Config::from_env()?;
    info!("Starting shortlist v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Commands::Submit {
            configs,
            corpus,
            out,
            top_n,
        } => {
            if let Some(dir) = configs {
                config.configs_dir = dir;
            }
            if let Some(path) = corpus {
                config.corpus_path = path;
            }
            if let Some(dir) = out {
                config.output_dir = dir;
            }
            if let Some(n) = top_n.filter(|n| *n > 0) {
                config.top_n = n;
            }

            let corpus = Corpus::load(&config.corpus_path).with_context(|| {
                format!("Failed to load candidate corpus {}", config.corpus_path.display())
            })?;
            if corpus.is_empty() {
                warn!("Candidate corpus is empty; local retrieval will return nothing");
            }

            let state = AppState::build(config, Arc::new(corpus))?;
            let report = state
                .pipeline
                .submit_all(&state.config, state.submitter.as_ref())
                .await
                .context("Batch submission run failed")?;

            for (name, reason) in &report.skipped {
                info!("Skipped {name}: {reason}");
            }
        }

        Commands::Query { profiles, configs } => {
            if let Some(dir) = configs {
                config.configs_dir = dir;
            }

            let profiles = profiles
                .iter()
                .map(|path| {
                    load_profile(path)
                        .with_context(|| format!("Failed to read profile {}", path.display()))
                })
                .collect::<Result<Vec<_>>>()?;

            // query runs score the given profiles only; no corpus is consulted
            let state = AppState::build(config, Arc::new(Corpus::default()))?;
            let outcomes = state
                .pipeline
                .query_all(&state.config.configs_dir, &profiles)
                .await
                .context("Query run failed")?;

            println!("{}", serde_json::to_string_pretty(&outcomes)?);
        }
    }

    Ok(())
}
