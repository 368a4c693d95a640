//! # Context Relay CLI (`relay`)
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `relay init` | Create the SQLite database and interaction table |
//! | `relay serve` | Start the HTTP relay |
//! | `relay ask --file <path> "<question>"` | Ask a question about a file through the relay |
//! | `relay context --file <path>` | Print the prompt that `ask` would send |
//! | `relay history` | Print recent interactions |
//!
//! ## Examples
//!
//! ```bash
//! export GEMINI_API_KEY=...
//! relay --config ./config/relay.toml serve
//!
//! relay ask --file ./report.pdf "What are the key findings?"
//! relay history --limit 5
//! ```

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use context_relay::client::{validate_input, RelayClient};
use context_relay::config::{self, Config};
use context_relay::logging::{self, LogFormat, LogPreset};
use context_relay::reader::read_file;
use context_relay::{history, migrate, server};
use context_relay_core::context::{build_context, build_prompt};
use context_relay_core::models::UploadedFile;

/// Context Relay: ask a hosted language model questions about local files.
#[derive(Parser)]
#[command(name = "relay", version)]
struct Cli {
    /// Path to configuration file (TOML). Defaults apply when it does not exist.
    #[arg(long, global = true, default_value = "./config/relay.toml")]
    config: PathBuf,

    /// More operational detail, including per-request HTTP traces.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Debug logging.
    #[arg(short, long, global = true)]
    debug: bool,

    /// Warnings and errors only.
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Log output format: `text` or `json`.
    #[arg(long = "log-format", global = true, default_value = "text")]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the database and interaction table. Safe to run repeatedly.
    Init,

    /// Start the HTTP relay.
    ///
    /// Binds to `[server].bind` and requires the API key variable named by
    /// `[model].api_key_env`.
    Serve,

    /// Ask a question about one or more files.
    Ask {
        /// File to include as context. Repeat for several files.
        #[arg(long = "file")]
        files: Vec<PathBuf>,

        /// The question.
        question: String,

        /// Override `[client].relay_url`.
        #[arg(long)]
        relay_url: Option<String>,
    },

    /// Print the context block (or full prompt) built from files.
    Context {
        /// File to include. Repeat for several files.
        #[arg(long = "file", required = true)]
        files: Vec<PathBuf>,

        /// Wrap the context into the full prompt with this question.
        #[arg(long)]
        question: Option<String>,
    },

    /// Print recent interactions from the log.
    History {
        /// Maximum number of interactions to show.
        #[arg(long, default_value_t = 10)]
        limit: usize,

        /// Print as JSON.
        #[arg(long)]
        json: bool,
    },
}

async fn read_all(paths: &[PathBuf]) -> Result<Vec<UploadedFile>> {
    let mut files = Vec::with_capacity(paths.len());
    for path in paths {
        let file = read_file(path).await?;
        tracing::debug!(
            target: "relay::client",
            name = %file.name,
            category = %file.category,
            size = file.size,
            "file processed"
        );
        files.push(file);
    }
    Ok(files)
}

async fn run_ask(cfg: &Config, paths: &[PathBuf], question: &str, url: Option<String>) -> Result<()> {
    validate_input(question, paths.len())?;
    let files = read_all(paths).await?;

    let client = RelayClient::new(url.unwrap_or_else(|| cfg.client.relay_url.clone()));
    let answer = client.ask(&files, question).await?;
    println!("{}", answer);
    Ok(())
}

async fn run_context(paths: &[PathBuf], question: Option<&str>) -> Result<()> {
    let files = read_all(paths).await?;
    let context = build_context(&files);
    match question {
        Some(q) => println!("{}", build_prompt(&context, q)),
        None => println!("{}", context),
    }
    Ok(())
}

fn load(path: &Path) -> Result<Config> {
    let cfg = config::load_config(path)?;
    tracing::debug!(target: "relay::startup", config = %path.display(), db = %cfg.db.url, "configuration loaded");
    Ok(cfg)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(
        LogPreset::from_flags(cli.verbose, cli.debug, cli.quiet),
        cli.log_format,
    );

    let cfg = load(&cli.config)?;

    match cli.command {
        Commands::Init => {
            migrate::run_migrations(&cfg).await?;
            println!("Database initialized successfully.");
        }
        Commands::Serve => {
            server::run_server(&cfg).await?;
        }
        Commands::Ask {
            files,
            question,
            relay_url,
        } => {
            run_ask(&cfg, &files, &question, relay_url).await?;
        }
        Commands::Context { files, question } => {
            run_context(&files, question.as_deref()).await?;
        }
        Commands::History { limit, json } => {
            history::run_history(&cfg, limit, json).await?;
        }
    }

    Ok(())
}
