mod check;
mod digest;

use anyhow::Result;
use async_trait::async_trait;
use clap::{Parser, Subcommand};

#[async_trait]
pub trait RunCommand {
    async fn run(&self) -> Result<()>;
}

/// Operator tooling for warden auth configs.
#[derive(Parser)]
#[command(author, version, about)]
pub struct App {
    /// Log level: off, error, warn, info, debug or trace.
    #[arg(long, global = true, default_value = "warn")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    Check(check::CheckArgs),
    Digest(digest::DigestArgs),
}

#[async_trait]
impl RunCommand for App {
    async fn run(&self) -> Result<()> {
        match &self.command {
            Commands::Check(args) => args.run().await,
            Commands::Digest(args) => args.run().await,
        }
    }
}
