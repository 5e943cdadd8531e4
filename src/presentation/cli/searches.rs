use anyhow::Result;
use clap::Args;

use crate::application::RecentSearchService;

use super::{AppContext, print_json};

#[derive(Debug, Args)]
pub struct RecentCommand {}

pub async fn run(ctx: &AppContext, _command: RecentCommand) -> Result<()> {
    let Some(identity) = &ctx.identity else {
        anyhow::bail!("no active session; set SHELFMARK_UID or run `account login`");
    };

    let service = RecentSearchService::new(ctx.store.clone());
    let searches = service.load(&identity.uid).await?;
    print_json(&searches)
}
