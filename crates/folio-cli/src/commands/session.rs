//! Session management CLI commands.

use anyhow::Context;
use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use folio_client::AdminSession;
use folio_client::models::SessionEntry;

use crate::output::{self, OutputFormat};

/// Arguments for session commands
#[derive(Debug, Args)]
pub struct SessionArgs {
    #[command(subcommand)]
    pub command: SessionCommand,
}

#[derive(Debug, Subcommand)]
pub enum SessionCommand {
    /// List active sessions
    List,
    /// Revoke another session
    Revoke {
        /// Session ID
        id: String,
    },
    /// Revoke every session, including this one
    RevokeAll {
        /// Skip confirmation
        #[arg(long)]
        force: bool,
    },
}

/// Session display row
#[derive(Debug, Serialize, Tabled)]
struct SessionRow {
    #[tabled(rename = "Session")]
    id: String,
    #[tabled(rename = "IP")]
    ip: String,
    #[tabled(rename = "User Agent")]
    user_agent: String,
    #[tabled(rename = "Created")]
    created: String,
    #[tabled(rename = "Last Active")]
    last_active: String,
    #[tabled(rename = "Current")]
    current: String,
}

impl From<&SessionEntry> for SessionRow {
    fn from(s: &SessionEntry) -> Self {
        Self {
            id: s.session_id.chars().take(12).collect(),
            ip: s.ip.clone(),
            user_agent: s.user_agent.clone().unwrap_or_else(|| "-".to_string()),
            created: s.created_at.format("%Y-%m-%d %H:%M").to_string(),
            last_active: s.last_active.format("%Y-%m-%d %H:%M").to_string(),
            current: if s.current { "✓" } else { "" }.to_string(),
        }
    }
}

pub async fn execute(
    admin: &AdminSession,
    args: &SessionArgs,
    format: OutputFormat,
) -> anyhow::Result<()> {
    match &args.command {
        SessionCommand::List => {
            let sessions = admin.sessions().await.context("Failed to list sessions")?;
            match format {
                OutputFormat::Json => output::print_json(&sessions),
                OutputFormat::Table => {
                    let rows: Vec<SessionRow> = sessions.iter().map(SessionRow::from).collect();
                    output::print_list(&rows, format);
                }
            }
        }
        SessionCommand::Revoke { id } => {
            admin
                .revoke_session(id)
                .await
                .with_context(|| format!("Failed to revoke session {id}"))?;
            output::print_success(&format!("Session {id} revoked"));
        }
        SessionCommand::RevokeAll { force } => {
            if !force {
                let confirm = dialoguer::Confirm::new()
                    .with_prompt("Revoke ALL sessions? You will be logged out.")
                    .default(false)
                    .interact()
                    .context("Input error")?;
                if !confirm {
                    println!("Cancelled.");
                    return Ok(());
                }
            }
            let revoked = admin.revoke_all().await.context("Failed to revoke sessions")?;
            output::print_success(&format!("Revoked {revoked} sessions"));
        }
    }
    Ok(())
}
