//! CLI interface module
//!
//! This module provides command-line interface functionality for tinylink.

pub mod commands;

use std::fmt;

use crate::cli::{Commands, ConfigCommands};
use crate::config::StaticConfig;
use crate::errors::TinylinkError;
use crate::runtime::lifetime::{self, StartupContext};
use commands::{
    add_link, add_batch, delete_links, generate_config, get_link, list_links, ping_storage,
    show_stats,
};

#[derive(Debug)]
pub enum CliError {
    /// Error reported by the core, shown with its code
    Service(TinylinkError),
    ParseError(String),
    CommandError(String),
}

impl CliError {
    /// Format as simple output
    pub fn format_simple(&self) -> String {
        match self {
            CliError::Service(e) => e.format_simple(),
            CliError::ParseError(msg) => format!("Parse error: {}", msg),
            CliError::CommandError(msg) => format!("Command error: {}", msg),
        }
    }

    /// Format as colored output
    pub fn format_colored(&self) -> String {
        use colored::Colorize;
        match self {
            CliError::Service(e) => e.format_colored(),
            CliError::ParseError(msg) => {
                format!("{} {}", "Parse error:".yellow().bold(), msg.white())
            }
            CliError::CommandError(msg) => {
                format!("{} {}", "Command error:".red().bold(), msg.white())
            }
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for CliError {}

impl From<TinylinkError> for CliError {
    fn from(err: TinylinkError) -> Self {
        CliError::Service(err)
    }
}

/// Run a parsed command end to end: startup, command, backup.
pub async fn run_cli(
    command: Commands,
    owner: &str,
    config: &StaticConfig,
) -> Result<(), CliError> {
    // Generate doesn't need storage
    if let Commands::Config { action } = command {
        return match action {
            ConfigCommands::Generate { output_path, force } => {
                generate_config(output_path, force).await
            }
        };
    }

    let ctx = lifetime::prepare_startup(config)
        .await
        .map_err(|e| CliError::CommandError(format!("{:#}", e)))?;

    let result = run_cli_command(command, owner, &ctx).await;

    // 命令失败也要落盘
    let backup = lifetime::shutdown(ctx.storage.as_ref()).await;
    result?;
    backup?;
    Ok(())
}

/// Dispatch one command against an already started context.
pub async fn run_cli_command(
    command: Commands,
    owner: &str,
    ctx: &StartupContext,
) -> Result<(), CliError> {
    match command {
        Commands::Add { url } => add_link(&ctx.service, &url, owner).await,
        Commands::Batch { file_path } => add_batch(&ctx.service, &file_path, owner).await,
        Commands::Get { code } => get_link(&ctx.service, &code).await,
        Commands::List => list_links(&ctx.service, owner).await,
        Commands::Delete { codes } => delete_links(&ctx.pipeline, codes, owner).await,
        Commands::Stats => show_stats(&ctx.service).await,
        Commands::Ping => ping_storage(&ctx.service).await,
        Commands::Config { .. } => Err(CliError::CommandError(
            "config commands do not use storage".to_string(),
        )),
    }
}
