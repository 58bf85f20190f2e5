//! fastrag CLI
//!
//! Main entry point for the fastrag command-line tool: index a document
//! corpus once, then answer questions grounded in it.

mod commands;
mod context;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use commands::{AskCommand, IndexCommand, StatsCommand};
use context::AppContext;
use fastrag_core::{config::AppConfig, logging, AppError, ErrorKind, ErrorResponse};
use std::path::PathBuf;
use std::process::ExitCode;

/// fastrag - retrieval-augmented answers from a single document corpus
#[derive(Parser, Debug)]
#[command(name = "fastrag")]
#[command(about = "Retrieval-augmented answers from a single document corpus", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to workspace directory (default: current directory)
    #[arg(short, long, global = true, env = "FASTRAG_WORKSPACE")]
    workspace: Option<PathBuf>,

    /// Path to config file
    #[arg(short, long, global = true, env = "FASTRAG_CONFIG")]
    config: Option<PathBuf>,

    /// Corpus path: a directory of .txt pages or a form-feed separated file
    #[arg(long, global = true, env = "FASTRAG_CORPUS")]
    corpus: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, env = "RUST_LOG")]
    log_level: Option<String>,

    /// Enable verbose output (sets log level to debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(
        long,
        global = true,
        env = "NO_COLOR",
        value_parser = clap::builder::FalseyValueParser::new()
    )]
    no_color: bool,

    /// Generation model identifier
    #[arg(short, long, global = true, env = "FASTRAG_MODEL")]
    model: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Index the corpus if the store is empty
    Index(IndexCommand),

    /// Ask a question about the corpus
    Ask(AskCommand),

    /// Show vector store statistics
    Stats(StatsCommand),
}

impl Commands {
    fn name(&self) -> &'static str {
        match self {
            Commands::Index(_) => "index",
            Commands::Ask(_) => "ask",
            Commands::Stats(_) => "stats",
        }
    }

    fn json(&self) -> bool {
        match self {
            Commands::Index(cmd) => cmd.json,
            Commands::Ask(cmd) => cmd.json,
            Commands::Stats(cmd) => cmd.json,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    // Parse command-line arguments first (needed for logging config)
    let cli = Cli::parse();
    let json = cli.command.json();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => ExitCode::from(report(&err, json)),
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    // Load base configuration from environment and config file
    let config = AppConfig::load_with(cli.workspace.clone(), cli.config.clone())?;

    // Apply CLI overrides
    let config = config.with_overrides(
        cli.workspace,
        cli.config,
        cli.corpus,
        cli.model,
        cli.log_level,
        cli.verbose,
        cli.no_color,
    );

    // Initialize logging with final configuration
    logging::init_logging(config.log_level.as_deref(), config.no_color)?;

    tracing::info!("fastrag starting");
    tracing::debug!("Workspace: {:?}", config.workspace);
    tracing::debug!("Generation model: {}", config.generation.model);
    tracing::debug!("Embedding provider: {}", config.embedding.provider);

    let ctx = AppContext::open(config).context("Failed to initialize fastrag")?;

    let _span = tracing::info_span!("command", name = cli.command.name()).entered();

    // Route to command handlers
    let result = match &cli.command {
        Commands::Index(cmd) => cmd.execute(&ctx).await,
        Commands::Ask(cmd) => cmd.execute(&ctx).await,
        Commands::Stats(cmd) => cmd.execute(&ctx).await,
    };

    match &result {
        Ok(_) => tracing::info!("Command completed successfully"),
        Err(e) => tracing::error!("Command failed: {}", e),
    }

    result.map_err(anyhow::Error::from)
}

/// Print a failure and map its kind to the process exit code.
fn report(err: &anyhow::Error, json: bool) -> u8 {
    let response = match err.downcast_ref::<AppError>() {
        Some(app_err) => ErrorResponse::from(app_err),
        None => ErrorResponse {
            status: 500,
            kind: ErrorKind::Internal,
            detail: format!("{:#}", err),
        },
    };

    if json {
        println!(
            "{}",
            serde_json::json!({ "status": response.status, "detail": response.detail })
        );
    } else {
        eprintln!("error ({}): {}", response.status, response.detail);
        if err.chain().count() > 1 {
            eprintln!("  caused by: {:#}", err);
        }
    }

    exit_code(response.kind)
}

fn exit_code(kind: ErrorKind) -> u8 {
    match kind {
        ErrorKind::Internal => 1,
        ErrorKind::Validation => 2,
        ErrorKind::NotFound => 3,
        ErrorKind::ExternalService => 4,
        ErrorKind::Parse => 5,
        ErrorKind::IncompleteStream => 6,
    }
}
