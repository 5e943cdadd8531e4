use anyhow::Result;
use clap::{Args, Subcommand};

use super::{AppContext, print_json};

#[derive(Debug, Subcommand)]
pub enum AccountCommands {
    /// Create an account and start a session
    Register(RegisterCommand),
    /// Sign in with email and password
    Login(LoginCommand),
    /// Show the active session's identity
    Whoami,
}

pub async fn run(ctx: &AppContext, command: AccountCommands) -> Result<()> {
    match command {
        AccountCommands::Register(c) => register(ctx, c).await,
        AccountCommands::Login(c) => login(ctx, c).await,
        AccountCommands::Whoami => whoami(ctx),
    }
}

#[derive(Debug, Args)]
pub struct RegisterCommand {
    #[arg(long)]
    pub username: String,
    #[arg(long)]
    pub email: String,
    #[arg(long)]
    pub password: String,
}

pub async fn register(ctx: &AppContext, command: RegisterCommand) -> Result<()> {
    let identity = ctx
        .auth
        .register(&command.username, &command.email, &command.password)
        .await?;
    print_json(&identity)?;
    eprintln!(
        "Set SHELFMARK_UID={} to keep this session active.",
        identity.uid
    );
    Ok(())
}

#[derive(Debug, Args)]
pub struct LoginCommand {
    #[arg(long)]
    pub email: String,
    #[arg(long)]
    pub password: String,
}

pub async fn login(ctx: &AppContext, command: LoginCommand) -> Result<()> {
    let identity = ctx.auth.sign_in(&command.email, &command.password).await?;
    print_json(&identity)?;
    eprintln!(
        "Set SHELFMARK_UID={} to keep this session active.",
        identity.uid
    );
    Ok(())
}

pub fn whoami(ctx: &AppContext) -> Result<()> {
    match &ctx.identity {
        Some(identity) => print_json(identity),
        None => anyhow::bail!("no active session; set SHELFMARK_UID or run `account login`"),
    }
}
