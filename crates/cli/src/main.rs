//! LIFE X CLI - Database migrations and password management.
//!
//! # Usage
//!
//! ```bash
//! # Run admin database migrations
//! lifex-cli migrate
//!
//! # Set the admin password
//! lifex-cli password set 'n3w-passw0rd'
//!
//! # Go back to the default password
//! lifex-cli password reset
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run database migrations
//! - `password set` / `password reset` - Manage the admin password

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "lifex-cli")]
#[command(author, version, about = "LIFE X admin CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Manage the admin password
    Password {
        #[command(subcommand)]
        action: PasswordAction,
    },
}

#[derive(Subcommand)]
enum PasswordAction {
    /// Store a new admin password (at least 6 characters)
    Set {
        /// The new password
        password: String,
    },
    /// Remove the stored password so the default applies again
    Reset,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), commands::CommandError> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Password { action } => match action {
            PasswordAction::Set { password } => commands::password::set(&password).await?,
            PasswordAction::Reset => commands::password::reset().await?,
        },
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_password_set() {
        let cli = Cli::try_parse_from(["lifex-cli", "password", "set", "abcdef"]);
        assert!(matches!(
            cli.map(|c| c.command),
            Ok(Commands::Password {
                action: PasswordAction::Set { password }
            }) if password == "abcdef"
        ));
    }

    #[test]
    fn test_password_set_requires_value() {
        assert!(Cli::try_parse_from(["lifex-cli", "password", "set"]).is_err());
    }
}
