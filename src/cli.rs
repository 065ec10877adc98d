//! Command-line interface definitions using clap
//!
//! This module defines the CLI structure for tinylink using clap's derive macros.

use clap::{Parser, Subcommand};

use crate::config::ConfigOverrides;

/// tinylink - deterministic URL shortener
#[derive(Parser, Debug)]
#[command(name = "tinylink")]
#[command(version)]
#[command(about = "Shorten, resolve and manage URLs per owner", long_about = None)]
pub struct Cli {
    /// Configuration file (default: config.toml when present)
    #[arg(long, short = 'c', env = "CONFIG", global = true)]
    pub config: Option<String>,

    /// Journal file for the memory backend; empty disables persistence
    #[arg(long, short = 'f', env = "FILE_STORAGE_PATH", global = true)]
    pub file_storage_path: Option<String>,

    /// Database URL (sqlite://, mysql://, postgres://)
    #[arg(long = "database-dsn", short = 'd', env = "DATABASE_DSN", global = true)]
    pub database_dsn: Option<String>,

    /// Log filter, e.g. "info" or "tinylink=debug"
    #[arg(long, short = 'l', env = "LOG_LEVEL", global = true)]
    pub log_level: Option<String>,

    /// Owner identity the command acts as
    #[arg(
        long,
        short = 'u',
        env = "TINYLINK_OWNER",
        default_value = "cli",
        global = true
    )]
    pub owner: String,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            file_storage_path: self.file_storage_path.clone(),
            database_url: self.database_dsn.clone(),
            log_level: self.log_level.clone(),
        }
    }
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Shorten a URL
    Add {
        /// URL to shorten
        url: String,
    },

    /// Shorten every URL in a JSON file
    ///
    /// The file holds an array of {"correlation_id": ..., "original_url": ...}
    Batch {
        /// Input file path
        file_path: String,
    },

    /// Resolve a short code
    Get {
        /// Short code to resolve
        code: String,
    },

    /// List the owner's URLs, deleted ones included
    List,

    /// Delete short codes (Ctrl-C stops the remaining ones)
    Delete {
        /// Short codes to delete
        #[arg(required = true)]
        codes: Vec<String>,
    },

    /// Show record and owner counts
    Stats,

    /// Check that the storage backend is reachable
    Ping,

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },
}

/// Configuration management commands
#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Generate example configuration file
    Generate {
        /// Output path (default: config.example.toml)
        output_path: Option<String>,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}
