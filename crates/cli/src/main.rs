//! Luxora CLI - Database migrations and account bootstrap.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! luxora-cli migrate
//!
//! # Create the first admin account
//! luxora-cli admin create -e admin@example.com -n "Admin Name" -p 'long-password'
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run database migrations
//! - `admin create` - Create an admin account

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "luxora-cli")]
#[command(author, version, about = "Luxora CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Manage admin accounts
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
}

#[derive(Subcommand)]
enum AdminAction {
    /// Create a new admin account, or promote an existing one
    Create {
        /// Admin email address
        #[arg(short, long)]
        email: String,

        /// Admin display name
        #[arg(short, long)]
        name: String,

        /// Admin password (8-128 characters)
        #[arg(short, long, env = "LUXORA_ADMIN_PASSWORD", hide_env_values = true)]
        password: String,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Admin { action } => match action {
            AdminAction::Create {
                email,
                name,
                password,
            } => {
                commands::admin::create_user(&email, &name, &password).await?;
            }
        },
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_admin_create_flags() {
        let cli = Cli::try_parse_from([
            "luxora-cli",
            "admin",
            "create",
            "-e",
            "admin@luxora.test",
            "-n",
            "Ada Admin",
            "-p",
            "correct horse battery",
        ])
        .unwrap();
        let Commands::Admin {
            action: AdminAction::Create { email, name, .. },
        } = cli.command
        else {
            panic!("expected admin create");
        };
        assert_eq!(email, "admin@luxora.test");
        assert_eq!(name, "Ada Admin");
    }
}
