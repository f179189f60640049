//! Pinmark CLI - database migrations and account management.
//!
//! # Usage
//!
//! ```bash
//! # Apply embedded migrations
//! pinmark-cli migrate
//!
//! # Create an account without a registration code
//! pinmark-cli account create -u alice -p 'correct horse battery staple'
//! ```
//!
//! Both commands read `PINMARK_DATABASE_URL` (or `DATABASE_URL`), loading
//! `.env` if present.

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "pinmark-cli")]
#[command(author, version, about = "Pinmark CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Manage accounts
    Account {
        #[command(subcommand)]
        action: AccountAction,
    },
}

#[derive(Subcommand)]
enum AccountAction {
    /// Create a new account
    Create {
        /// Login name
        #[arg(short, long)]
        username: String,

        /// Password
        #[arg(short, long)]
        password: String,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Account { action } => match action {
            AccountAction::Create { username, password } => {
                commands::account::create(&username, &password).await?;
            }
        },
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_account_create() {
        let cli = Cli::try_parse_from(["pinmark-cli", "account", "create", "-u", "alice", "-p", "pw"]);
        assert!(matches!(
            cli.map(|c| c.command),
            Ok(Commands::Account {
                action: AccountAction::Create { ref username, ref password }
            }) if username == "alice" && password == "pw"
        ));
    }
}
