//! Frecency Cache - command-line driver
//!
//! Opens a named cache and runs one operation against it.
//!
//! # Startup Sequence
//! 1. Initialize tracing subscriber for logging
//! 2. Load configuration from environment variables, then apply CLI flags
//! 3. Open the cache (loading its snapshot)
//! 4. Run the requested command and print the result

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde_json::Value;
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use frecency_cache::{CacheConfig, DiskBackedFrecencyCache};

/// Inspect and edit a disk-backed frecency cache.
#[derive(Debug, Parser)]
#[command(name = "frecency_cache", version, about)]
struct Cli {
    /// Maximum number of entries (env: FRECENCY_CACHE_CAPACITY)
    #[arg(long, global = true)]
    capacity: Option<usize>,

    /// Cache name, used as the snapshot file stem (env: FRECENCY_CACHE_NAME)
    #[arg(long, global = true)]
    name: Option<String>,

    /// Directory holding the snapshot (env: FRECENCY_CACHE_DIR)
    #[arg(long, global = true)]
    dir: Option<PathBuf>,

    /// Size budget in megabytes (env: FRECENCY_CACHE_MAX_SIZE_MB)
    #[arg(long, global = true)]
    max_size_mb: Option<f64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the value stored under a key
    Get { key: String },
    /// Store a value; parsed as JSON, or kept as a plain string
    Set { key: String, value: String },
    /// Remove one key
    Remove { key: String },
    /// Remove every key and delete the snapshot
    Clear,
    /// Rewrite the snapshot from the loaded state
    Sync,
    /// Print cache statistics as JSON
    Stats,
}

impl Cli {
    /// Layers command-line flags over the environment configuration.
    fn config(&self) -> CacheConfig {
        let mut config = CacheConfig::from_env();
        if let Some(capacity) = self.capacity {
            config.capacity = capacity;
        }
        if let Some(name) = &self.name {
            config.cache_name = name.clone();
        }
        if let Some(dir) = &self.dir {
            config.cache_dir = dir.clone();
        }
        if self.max_size_mb.is_some() {
            config.max_size_mb = self.max_size_mb;
        }
        config
    }
}

/// Parses a CLI value as JSON, falling back to a plain string.
fn parse_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "frecency_cache=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = cli.config();
    debug!("Configuration: {:?}", config);

    let cache = DiskBackedFrecencyCache::new(config).context("Failed to open cache")?;

    match cli.command {
        Command::Get { key } => match cache.get(&key) {
            Some(value) => println!("{}", serde_json::to_string_pretty(&value)?),
            None => {
                eprintln!("Key not found: {}", key);
                std::process::exit(1);
            }
        },
        Command::Set { key, value } => {
            cache.set(&key, parse_value(&value));
        }
        Command::Remove { key } => {
            if cache.remove(&key).is_none() {
                eprintln!("Key not found: {}", key);
            }
        }
        Command::Clear => cache.clear(),
        Command::Sync => cache.try_sync().context("Failed to write snapshot")?,
        Command::Stats => println!("{}", serde_json::to_string_pretty(&cache.stats())?),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_value() {
        assert_eq!(parse_value("42"), json!(42));
        assert_eq!(parse_value(r#"{"a":[1,2]}"#), json!({"a": [1, 2]}));
        assert_eq!(parse_value("plain text"), json!("plain text"));
    }

    #[test]
    fn test_cli_flags_override_config() {
        let cli = Cli::try_parse_from([
            "frecency_cache",
            "--capacity",
            "7",
            "--name",
            "cli",
            "--dir",
            "/tmp/frecency-cli",
            "--max-size-mb",
            "0.5",
            "get",
            "k",
        ])
        .unwrap();

        let config = cli.config();
        assert_eq!(config.capacity, 7);
        assert_eq!(config.cache_name, "cli");
        assert_eq!(config.cache_dir, PathBuf::from("/tmp/frecency-cli"));
        assert_eq!(config.max_size_mb, Some(0.5));
        assert!(matches!(cli.command, Command::Get { ref key } if key == "k"));
    }
}
