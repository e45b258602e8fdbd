//! Command-line interface for strictly_ox.

use clap::{Parser, Subcommand};
use strictly_ox::LoginProvider;

/// Strictly OX - play OX against the server's bot from your terminal
#[derive(Parser, Debug)]
#[command(name = "strictly_ox")]
#[command(about = "Terminal client for a server-authoritative OX game", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Path to the client config file (defaults are used if it is missing)
    #[arg(short, long, default_value = "strictly_ox.toml", global = true)]
    pub config: std::path::PathBuf,

    /// Authority base URL, overriding config and environment
    #[arg(long, global = true)]
    pub server_url: Option<String>,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the terminal UI (default)
    Play {
        /// Address the login redirect landed on; its token is adopted
        #[arg(long)]
        landing_url: Option<String>,

        /// Credential to adopt directly
        #[arg(long)]
        token: Option<String>,
    },

    /// Print the login URL for an identity provider
    Login {
        /// Identity provider
        #[arg(value_enum)]
        provider: LoginProvider,
    },

    /// Forget the stored credential
    Logout,

    /// Fetch and print the leaderboard once
    Leaderboard,
}
