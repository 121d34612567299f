//! CLI interface for lobcast
//!
//! Provides subcommands for:
//! - `serve`: Run the poller and broadcaster
//! - `subscribe`: Follow a broadcaster's live prediction stream
//! - `config`: Show the effective configuration

mod serve;
mod subscribe;

pub use serve::ServeArgs;
pub use subscribe::SubscribeArgs;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "lobcast")]
#[command(about = "Real-time distribution pipeline for order book prediction results")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    pub config: String,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the snapshot poller and result broadcaster
    Serve(ServeArgs),
    /// Follow a broadcaster's live prediction stream
    Subscribe(SubscribeArgs),
    /// Show the effective configuration
    Config,
}
