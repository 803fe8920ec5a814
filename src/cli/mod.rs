//! CLI module for Movie Agent
//!
//! - `serve`: REST API server
//! - `chat`: interactive question loop in the terminal
//! - `cache`: inspect or clear the result cache

pub mod cache;
pub mod chat;
pub mod serve;

use clap::{Parser, Subcommand};

/// Movie Agent - ask questions about movies in plain language
#[derive(Parser)]
#[command(name = "movie-agent")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the REST API server
    Serve,

    /// Ask questions interactively
    Chat {
        /// Keep info-level logs on stderr
        #[arg(short, long)]
        verbose: bool,
    },

    /// Result cache administration
    #[command(subcommand)]
    Cache(CacheCommand),
}

#[derive(Subcommand)]
pub enum CacheCommand {
    /// Print cache statistics as JSON
    Stats,

    /// Delete cached entries
    Clear {
        /// Glob pattern; defaults to every key in the cache namespace
        #[arg(short, long)]
        pattern: Option<String>,
    },
}
