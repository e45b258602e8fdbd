//! Strictly OX - terminal client
//!
//! Plays OX against a remote authority and shows its leaderboard.

#![warn(missing_docs)]

mod cli;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Command};
use strictly_ox::{
    ApiClient, ClientConfig, CredentialStore, FileCredentialStore, LoginProvider, RankingEntry,
    login_url,
};
use tracing::{info, instrument};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = ClientConfig::load_or_default(&cli.config)?
        .apply_env(|key| std::env::var(key).ok())
        .with_api_base_url(cli.server_url);

    match cli.command.unwrap_or(Command::Play {
        landing_url: None,
        token: None,
    }) {
        Command::Play { landing_url, token } => {
            strictly_ox::run_tui(&config, landing_url, token).await
        }
        Command::Login { provider } => {
            initialize_cli_tracing();
            print_login_url(&config, provider);
            Ok(())
        }
        Command::Logout => {
            initialize_cli_tracing();
            logout(&config)
        }
        Command::Leaderboard => {
            initialize_cli_tracing();
            print_leaderboard(&config).await
        }
    }
}

#[instrument(skip(config))]
fn print_login_url(config: &ClientConfig, provider: LoginProvider) {
    let url = login_url(config.api_base_url(), provider);
    println!("{}:", provider.label());
    println!("  {}", url);
    println!();
    println!("After signing in, start the client with:");
    println!("  strictly_ox play --landing-url '<address you were redirected to>'");
}

#[instrument(skip(config))]
fn logout(config: &ClientConfig) -> Result<()> {
    let store = FileCredentialStore::new(config.resolved_credential_path());
    store.clear()?;
    info!(path = %store.path().display(), "Stored credential removed");
    println!("Logged out.");
    Ok(())
}

#[instrument(skip(config))]
async fn print_leaderboard(config: &ClientConfig) -> Result<()> {
    let client = ApiClient::new(config.api_base_url())?;
    let entries = client.leaderboard(None).await?;

    if entries.is_empty() {
        println!("No players yet");
        return Ok(());
    }

    for (i, entry) in entries.iter().enumerate() {
        let rank = RankingEntry::medal(i + 1);
        if *entry.streak() > 0 {
            println!(
                "{:>4} {:<24} {:>6} pts  🔥 {}",
                rank,
                entry.display_name(),
                entry.total_score(),
                entry.streak()
            );
        } else {
            println!(
                "{:>4} {:<24} {:>6} pts",
                rank,
                entry.display_name(),
                entry.total_score()
            );
        }
    }
    Ok(())
}

#[instrument]
fn initialize_cli_tracing() {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn,strictly_ox=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
