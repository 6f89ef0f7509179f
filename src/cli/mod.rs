//! Command-line interface for Zyxnime.

mod commands;

use clap::{Parser, Subcommand};

/// Zyxnime - anime streaming backend
#[derive(Parser)]
#[command(name = "zyxnime")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP API (default)
    #[command(alias = "web")]
    Serve,

    /// Create default config file
    #[command(alias = "--init")]
    Init,

    /// List anime in the catalogue
    #[command(alias = "ls", alias = "l")]
    List,

    /// Reset a user's password
    Password {
        /// Account to update
        username: String,
        /// New password (at least 8 characters)
        new_password: String,
    },
}

pub use commands::*;
