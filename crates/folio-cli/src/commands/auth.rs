//! Login, verify, and logout.

use anyhow::Context;
use clap::Args;

use folio_client::AdminSession;

use crate::output::{self, OutputFormat};

#[derive(Debug, Args)]
pub struct LoginArgs {
    /// Admin email; prompted when omitted
    #[arg(short, long)]
    pub email: Option<String>,
}

pub async fn login(admin: &AdminSession, args: &LoginArgs, format: OutputFormat) -> anyhow::Result<()> {
    let email = match &args.email {
        Some(email) => email.clone(),
        None => dialoguer::Input::new()
            .with_prompt("Admin email")
            .interact_text()
            .context("Input error")?,
    };
    let password = dialoguer::Password::new()
        .with_prompt("Password")
        .interact()
        .context("Input error")?;

    let response = admin.login(&email, &password).await?;

    match format {
        OutputFormat::Json => output::print_json(&response.admin),
        OutputFormat::Table => {
            output::print_success(&format!("Logged in as {}", response.admin.email));
            output::print_kv("Session", &response.admin.session_id);
            output::print_kv("Expires in", &response.expires_in);
        }
    }
    Ok(())
}

pub async fn verify(admin: &AdminSession, format: OutputFormat) -> anyhow::Result<()> {
    let Some(verified) = admin.restore().await? else {
        output::print_warning("Not logged in.");
        return Ok(());
    };

    match format {
        OutputFormat::Json => output::print_json(&verified),
        OutputFormat::Table => {
            output::print_success("Token is valid");
            output::print_kv("Admin", &verified.admin.email);
            output::print_kv("Role", &verified.admin.role);
            output::print_kv("Session", &verified.admin.session_id);
            output::print_kv("Permissions", &verified.permissions.join(", "));
            output::print_kv("Environment", &verified.environment);
            output::print_kv("Server time", &verified.server_time.to_rfc3339());
        }
    }
    Ok(())
}

pub async fn logout(admin: &AdminSession) -> anyhow::Result<()> {
    admin.logout().await?;
    output::print_success("Logged out");
    Ok(())
}
