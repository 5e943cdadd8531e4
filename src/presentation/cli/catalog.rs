use anyhow::Result;
use clap::Args;
use tracing::warn;

use crate::application::RecentSearchService;
use crate::domain::catalog::VolumeDisplay;
use crate::domain::ids::VolumeId;

use super::{AppContext, print_json};

#[derive(Debug, Args)]
pub struct SearchCommand {
    /// Search keywords
    pub query: String,
}

pub async fn search(ctx: &AppContext, command: SearchCommand) -> Result<()> {
    // History is best-effort; a failed save must not block the results.
    let searches = RecentSearchService::new(ctx.store.clone());
    if let Err(err) = searches.record(ctx.identity.as_ref(), &command.query).await {
        warn!(error = %err, "failed to record recent search");
    }

    let volumes = ctx.catalog.search(&command.query).await?;
    let listings: Vec<VolumeDisplay> = volumes.iter().map(VolumeDisplay::from_volume).collect();
    print_json(&listings)
}

#[derive(Debug, Args)]
pub struct ShowCommand {
    /// Volume id
    pub id: String,
}

pub async fn show(ctx: &AppContext, command: ShowCommand) -> Result<()> {
    let volume = ctx.catalog.fetch(&VolumeId::new(command.id)).await?;
    print_json(&VolumeDisplay::from_volume(&volume))
}
