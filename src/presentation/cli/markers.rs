use anyhow::Result;
use clap::{Args, Subcommand};

use crate::application::{MarkerMirror, MarkerService, ToggleOutcome};
use crate::domain::catalog::VolumeDisplay;
use crate::domain::ids::VolumeId;
use crate::domain::markers::MarkerKind;

use super::{AppContext, print_json};

#[derive(Debug, Subcommand)]
pub enum MarkerCommands {
    /// Flip the marker for a volume
    Toggle(ToggleCommand),
    /// List marked volumes
    List(ListCommand),
}

pub async fn run(ctx: &AppContext, kind: MarkerKind, command: MarkerCommands) -> Result<()> {
    match command {
        MarkerCommands::Toggle(c) => toggle(ctx, kind, c).await,
        MarkerCommands::List(c) => list(ctx, kind, c).await,
    }
}

#[derive(Debug, Args)]
pub struct ToggleCommand {
    /// Volume id
    pub id: String,

    /// Title to cache on the marker; fetched from the catalog when omitted
    #[arg(long)]
    pub title: Option<String>,
}

pub async fn toggle(ctx: &AppContext, kind: MarkerKind, command: ToggleCommand) -> Result<()> {
    let book_id = VolumeId::new(command.id);
    let title = match command.title {
        Some(title) => title,
        None => VolumeDisplay::from_volume(&ctx.catalog.fetch(&book_id).await?).title,
    };

    let service = MarkerService::new(ctx.store.clone());
    match service
        .toggle(kind, ctx.identity.as_ref(), &book_id, &title)
        .await?
    {
        ToggleOutcome::Added => println!("Added to {}", kind.display_label()),
        ToggleOutcome::Removed => println!("Removed from {}", kind.display_label()),
        ToggleOutcome::Skipped => println!("Not signed in; nothing was changed."),
    }
    Ok(())
}

#[derive(Debug, Args)]
pub struct ListCommand {}

pub async fn list(ctx: &AppContext, kind: MarkerKind, _command: ListCommand) -> Result<()> {
    let Some(identity) = &ctx.identity else {
        anyhow::bail!("no active session; set SHELFMARK_UID or run `account login`");
    };

    let service = MarkerService::new(ctx.store.clone());
    let entries = service.list(kind, &identity.uid).await?;
    print_json(&entries)
}

#[derive(Debug, Args)]
pub struct WatchCommand {
    /// Marker kind: favourite or read
    #[arg(long, default_value = "favourite")]
    pub kind: String,
}

/// Print every snapshot replacement for the session's markers until
/// interrupted with Ctrl-C.
pub async fn watch(ctx: &AppContext, command: WatchCommand) -> Result<()> {
    let kind: MarkerKind = command
        .kind
        .parse()
        .map_err(|()| anyhow::anyhow!("invalid marker kind: {}", command.kind))?;

    let mirror = MarkerMirror::open(ctx.store.clone(), kind, ctx.auth.watch());
    let mut snapshots = mirror.snapshots();

    print_json(&mirror.current())?;
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            changed = snapshots.changed() => {
                if changed.is_err() {
                    break;
                }
                let entries = snapshots.borrow().clone();
                print_json(&entries)?;
            }
        }
    }
    Ok(())
}
