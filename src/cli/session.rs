use std::sync::Arc;

use anyhow::{bail, Context};
use clap::Args;
use owo_colors::OwoColorize;

use crate::client::{
    ApiClient, ClientConfig, FileStorage, LoginRedirect, SessionManager, SessionState,
    SessionStorage, BASE_URL_KEY,
};

#[derive(Args, Debug)]
pub struct LoginArgs {
    #[arg(long)]
    pub email: String,

    #[arg(long)]
    pub password: String,
}

/// Tells the terminal user how to recover from a rejected token.
struct TerminalRedirect;

impl LoginRedirect for TerminalRedirect {
    fn login_required(&self) {
        eprintln!("{}", "Session expired or revoked. Run `classgate login` again.".yellow());
    }
}

fn session_manager(base_url: Option<String>) -> anyhow::Result<SessionManager> {
    let storage: Arc<dyn SessionStorage> =
        Arc::new(FileStorage::default_location().context("Failed to locate session file")?);
    let base_url = ClientConfig::resolve_base_url(base_url, storage.as_ref());

    let client = ApiClient::new(ClientConfig::with_base_url(base_url), storage)?
        .with_login_redirect(Arc::new(TerminalRedirect));
    Ok(SessionManager::new(Arc::new(client)))
}

pub async fn handle_login(args: LoginArgs, base_url: Option<String>) -> anyhow::Result<()> {
    let manager = session_manager(base_url)?;
    let session = manager.login_with_credentials(&args.email, &args.password).await?;

    let Some(profile) = session.profile() else {
        bail!(session.error.clone().unwrap_or_else(|| "Login failed".to_string()));
    };

    let client = manager.client();
    client.storage().set(BASE_URL_KEY, client.base_url())?;

    println!("{} {} ({})", "Logged in as".green().bold(), profile.email, profile.role.cyan());
    Ok(())
}

pub async fn handle_whoami(base_url: Option<String>) -> anyhow::Result<()> {
    let manager = session_manager(base_url)?;

    match manager.start().await.state {
        SessionState::Authenticated(profile) => {
            println!("{}", profile.name.bold());
            println!("  id:    {}", profile.id);
            println!("  email: {}", profile.email);
            println!("  role:  {}", profile.role.cyan());
        }
        _ => println!("{}", "Not logged in".yellow()),
    }
    Ok(())
}

pub async fn handle_logout(base_url: Option<String>) -> anyhow::Result<()> {
    let manager = session_manager(base_url)?;
    manager.logout().await;
    println!("{}", "Logged out".green());
    Ok(())
}
