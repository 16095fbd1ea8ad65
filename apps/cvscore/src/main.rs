use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use cvscore::config::Config;
use cvscore::db::create_pool;
use cvscore::errors::AppError;
use cvscore::history::{HistoryStore, MemoryStore, PgStore};
use cvscore::scoring::{Industry, ScoringEngine};
use cvscore::service::AnalysisService;

#[derive(Parser)]
#[command(name = "cvscore", version, about = "Score résumé text and track score history")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Score a plain-text CV and record it in the user's history
    Analyze {
        #[arg(long)]
        user: String,
        /// Industry to use when the text alone is not conclusive
        #[arg(long)]
        industry: Option<String>,
        /// Text file to score, or `-` for stdin
        file: PathBuf,
    },
    /// Show a user's score history report
    History {
        #[arg(long)]
        user: String,
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Show the benchmark for one industry
    Benchmark { industry: Industry },
}

impl Command {
    fn user(&self) -> Option<&str> {
        match self {
            Command::Analyze { user, .. } | Command::History { user, .. } => Some(user.as_str()),
            Command::Benchmark { .. } => None,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let tables = config.load_tables()?;
    let engine = Arc::new(ScoringEngine::new(tables).context("Scoring tables rejected")?);
    info!(
        "Scoring engine ready (tables v{})",
        engine.tables().version
    );

    let result = match &config.database_url {
        Some(url) => {
            let store = PgStore::new(create_pool(url).await?);
            info!("Using PostgreSQL history store");
            if let Some(user) = cli.command.user() {
                store.register_user(user).await?;
            }
            run(cli.command, AnalysisService::new(engine, store, config.history_limit)).await
        }
        None => {
            let store = MemoryStore::new();
            info!("DATABASE_URL not set; using in-memory history store");
            if let Some(user) = cli.command.user() {
                store.register_user(user).await;
            }
            run(cli.command, AnalysisService::new(engine, store, config.history_limit)).await
        }
    };

    if let Err(err) = &result {
        match err.downcast_ref::<AppError>() {
            Some(app) => error!("{} [{}]", app, app.code()),
            None => error!("{err:#}"),
        }
    }
    result
}

async fn run<S: HistoryStore>(command: Command, service: AnalysisService<S>) -> Result<()> {
    match command {
        Command::Analyze {
            user,
            industry,
            file,
        } => {
            let text = read_input(&file)?;
            let record = service.analyze(&text, &user, industry.as_deref()).await?;
            print_json(&record)
        }
        Command::History { user, limit } => {
            let report = service.get_history(&user, limit).await?;
            print_json(&report)
        }
        Command::Benchmark { industry } => {
            let benchmark = service.get_industry_benchmark(industry).await?;
            print_json(&benchmark)
        }
    }
}

fn read_input(path: &Path) -> Result<String> {
    if path.as_os_str() == "-" {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("Failed to read CV text from stdin")?;
        return Ok(text);
    }
    std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
