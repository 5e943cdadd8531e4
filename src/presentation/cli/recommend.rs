use anyhow::{Context, Result};
use clap::Args;

use crate::domain::catalog::VolumeDisplay;
use crate::domain::ids::VolumeId;
use crate::domain::recommend::Recommendation;
use crate::infrastructure::recommend::open_in_mail_app;

use super::{AppContext, print_json};

#[derive(Debug, Args)]
pub struct RecommendCommand {
    /// Volume id
    pub id: String,

    /// Print the composed email instead of opening the mail app
    #[arg(long)]
    pub print_only: bool,
}

pub async fn run(ctx: &AppContext, command: RecommendCommand) -> Result<()> {
    let volume = ctx.catalog.fetch(&VolumeId::new(command.id)).await?;
    let recommendation = Recommendation::for_volume(&VolumeDisplay::from_volume(&volume));

    if command.print_only {
        return print_json(&recommendation);
    }

    open_in_mail_app(&recommendation).context("failed to open the mail app")?;
    eprintln!("Opened the default mail app.");
    Ok(())
}
