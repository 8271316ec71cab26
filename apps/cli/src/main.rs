//! quarry - inspect and evaluate REST query strings
//!
//! `quarry parse` shows how a query string compiles into filters and an
//! include tree. `quarry eval` applies the filters to a JSON record set.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use quarry_query::Schema;
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;

mod commands;
mod config;
mod logging;

use config::Config;

#[derive(Debug, Parser)]
#[command(name = "quarry", version, about = "Query-string filter and include tooling")]
struct Cli {
    /// Configuration file (defaults to an optional ./quarry.toml)
    #[arg(long, global = true, env = "QUARRY_CONFIG")]
    config: Option<PathBuf>,

    /// Log level for quarry crates, overriding the configuration
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Compile a query string and print its filters and include tree
    Parse {
        /// Query string, with or without the leading '?'
        query: String,
    },
    /// Print the records that satisfy a query's filters
    Eval {
        /// JSON object mapping field names to types
        #[arg(long)]
        schema: PathBuf,
        /// JSON array of records
        #[arg(long)]
        records: PathBuf,
        query: String,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load(cli.config.as_deref()).context("Failed to load configuration")?;
    if let Some(level) = cli.log_level {
        config.logging.level = level;
    }
    if cli.json_logs {
        config.logging.json = true;
    }

    config
        .validate()
        .map_err(|e| anyhow::anyhow!("Invalid configuration: {e}"))?;

    logging::init_logging(&config.logging).context("Failed to initialize logging")?;

    let output = match cli.command {
        Command::Parse { query } => commands::parse(&query, &config.query)?,
        Command::Eval {
            schema,
            records,
            query,
        } => {
            let schema: Schema = read_json(&schema)?;
            let records: Vec<JsonValue> = read_json(&records)?;
            JsonValue::Array(commands::eval(&query, &schema, records, &config.query)?)
        }
    };

    println!(
        "{}",
        serde_json::to_string_pretty(&output).context("Failed to serialize output")?
    );
    Ok(())
}

fn read_json<T: DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("Failed to parse {}", path.display()))
}
