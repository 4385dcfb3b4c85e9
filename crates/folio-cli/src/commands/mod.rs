//! CLI command definitions and dispatch.

pub mod auth;
pub mod session;

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tokio::sync::broadcast::error::TryRecvError;

use folio_client::{AdminSession, AuthEvent, ClientConfig, FileCredentialStore};

use crate::output::{self, OutputFormat};

/// Folio admin CLI
#[derive(Debug, Parser)]
#[command(name = "folio-cli", version, about, long_about = None)]
pub struct Cli {
    /// Base URL of the Folio server
    #[arg(short, long, default_value = "http://localhost:5000")]
    pub server: String,

    /// Credential file
    #[arg(long, default_value = ".folio/credentials.json")]
    pub credentials: PathBuf,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Log in and store the token
    Login(auth::LoginArgs),
    /// Check the stored token against the server
    Verify,
    /// End the current session
    Logout,
    /// Manage the admin's sessions
    Sessions(session::SessionArgs),
}

impl Cli {
    pub async fn execute(&self) -> anyhow::Result<()> {
        let config = ClientConfig {
            credentials_path: self.credentials.clone(),
            ..ClientConfig::new(&self.server)
        };
        let store = Arc::new(FileCredentialStore::new(config.credentials_path.clone()));
        let admin = AdminSession::connect(&config, store)?;
        let mut events = admin.subscribe();

        let result = match &self.command {
            Commands::Login(args) => auth::login(&admin, args, self.format).await,
            Commands::Verify => auth::verify(&admin, self.format).await,
            Commands::Logout => auth::logout(&admin).await,
            Commands::Sessions(args) => session::execute(&admin, args, self.format).await,
        };

        loop {
            match events.try_recv() {
                Ok(AuthEvent::ReauthenticationRequired) => {
                    output::print_warning("Session is no longer valid; run `folio-cli login`.");
                }
                Ok(AuthEvent::TokenRefreshed) => tracing::debug!("Token refreshed"),
                Err(TryRecvError::Lagged(_)) => continue,
                Err(_) => break,
            }
        }

        result
    }
}
