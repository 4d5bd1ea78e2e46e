//! `deceptiscan`: command-line client for the DeceptiScan services.
//!
//! # Usage
//!
//! ```text
//! deceptiscan --url http://localhost:8004 --token $ID_TOKEN history list linkAnalyser
//! deceptiscan history save linkAnalyser '{"url": "http://x", "safe": true}'
//! deceptiscan --config ~/.config/deceptiscan/config.toml articles list --page 2
//! ```

mod client;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use client::{ApiClient, ApiConfig};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "deceptiscan", about = "Client for the DeceptiScan history and articles APIs")]
struct Args {
  /// Path to a TOML config file (url, token).
  #[arg(short, long, value_name = "FILE")]
  config: Option<PathBuf>,

  /// Base URL of the server (default: http://localhost:8004).
  #[arg(long, env = "DECEPTISCAN_URL")]
  url: Option<String>,

  /// ID token sent as a bearer credential.
  #[arg(long, env = "DECEPTISCAN_TOKEN", hide_env_values = true)]
  token: Option<String>,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Per-user analysis history.
  #[command(subcommand)]
  History(HistoryCommand),
  /// Awareness articles.
  #[command(subcommand)]
  Articles(ArticlesCommand),
}

#[derive(Subcommand, Debug)]
enum HistoryCommand {
  /// Record an analysis result; prints the new id.
  Save { service: String, data: String },
  /// List entries, newest first.
  List { service: String },
  Get { service: String, id: String },
  /// Merge fields into an entry.
  Update { service: String, id: String, data: String },
  Delete { service: String, id: String },
}

#[derive(Subcommand, Debug)]
enum ArticlesCommand {
  List {
    #[arg(long)]
    page:  Option<usize>,
    #[arg(long)]
    limit: Option<usize>,
  },
  Get { id: String },
  /// Publish an article; prints the new id.
  Create { fields: String },
  Update { id: String, fields: String },
  Delete { id: String },
}

// ─── Config file ──────────────────────────────────────────────────────────────

/// Shape of the optional TOML config file.
#[derive(Deserialize, Default)]
struct ConfigFile {
  #[serde(default)]
  url:   String,
  #[serde(default)]
  token: String,
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_writer(std::io::stderr)
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .from_env_lossy(),
    )
    .init();

  let args = Args::parse();

  // Load config file if provided.
  let file_cfg: ConfigFile = if let Some(path) = &args.config {
    let raw = std::fs::read_to_string(path)
      .with_context(|| format!("reading config file {}", path.display()))?;
    toml::from_str(&raw).context("parsing config file")?
  } else {
    ConfigFile::default()
  };

  // CLI flags and env override config file, which overrides defaults.
  let api_config = ApiConfig {
    base_url: args
      .url
      .or_else(|| (!file_cfg.url.is_empty()).then(|| file_cfg.url.clone()))
      .unwrap_or_else(|| "http://localhost:8004".to_string()),
    token:    args
      .token
      .or_else(|| (!file_cfg.token.is_empty()).then(|| file_cfg.token.clone())),
  };
  if api_config.token.is_none() {
    tracing::warn!("no token configured; requests will be rejected with 401");
  }

  let client = ApiClient::new(api_config)?;
  match args.command {
    Command::History(cmd) => run_history(&client, cmd).await,
    Command::Articles(cmd) => run_articles(&client, cmd).await,
  }
}

// ─── Commands ─────────────────────────────────────────────────────────────────

async fn run_history(client: &ApiClient, cmd: HistoryCommand) -> Result<()> {
  match cmd {
    HistoryCommand::Save { service, data } => {
      let id = client.save_history(&service, &parse_json(&data)?).await?;
      println!("{id}");
    }
    HistoryCommand::List { service } => {
      print_json(&client.list_history(&service).await?)?;
    }
    HistoryCommand::Get { service, id } => {
      print_json(&client.get_history(&service, &id).await?)?;
    }
    HistoryCommand::Update { service, id, data } => {
      client.update_history(&service, &id, &parse_json(&data)?).await?;
    }
    HistoryCommand::Delete { service, id } => {
      client.delete_history(&service, &id).await?;
    }
  }
  Ok(())
}

async fn run_articles(client: &ApiClient, cmd: ArticlesCommand) -> Result<()> {
  match cmd {
    ArticlesCommand::List { page, limit } => {
      print_json(&client.list_articles(page, limit).await?)?;
    }
    ArticlesCommand::Get { id } => {
      print_json(&client.get_article(&id).await?)?;
    }
    ArticlesCommand::Create { fields } => {
      let id = client.create_article(&parse_json(&fields)?).await?;
      println!("{id}");
    }
    ArticlesCommand::Update { id, fields } => {
      client.update_article(&id, &parse_json(&fields)?).await?;
    }
    ArticlesCommand::Delete { id } => {
      client.delete_article(&id).await?;
    }
  }
  Ok(())
}

fn parse_json(raw: &str) -> Result<Value> {
  serde_json::from_str(raw).context("argument is not valid JSON")
}

fn print_json(value: &impl Serialize) -> Result<()> {
  println!("{}", serde_json::to_string_pretty(value)?);
  Ok(())
}
