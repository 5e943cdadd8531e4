pub mod account;
pub mod catalog;
pub mod markers;
pub mod recommend;
pub mod searches;

use std::sync::Arc;

use clap::{Parser, Subcommand};

use crate::application::AuthManager;
use crate::domain::session::Identity;
use crate::domain::store::DocumentStore;
use crate::infrastructure::catalog::{CatalogClient, GOOGLE_BOOKS_URL};

/// Everything a command needs, resolved once at startup: the store, the
/// account layer, the catalog client, and the session's identity (when a
/// uid was supplied and resolved).
pub struct AppContext {
    pub store: Arc<dyn DocumentStore>,
    pub auth: AuthManager,
    pub catalog: CatalogClient,
    pub identity: Option<Identity>,
}

#[derive(Debug, Parser)]
#[command(author, version, about = "Search books, keep favourites and finished reads", long_about = None)]
pub struct Cli {
    #[arg(
        long,
        global = true,
        env = "SHELFMARK_CATALOG_URL",
        default_value = GOOGLE_BOOKS_URL
    )]
    pub catalog_url: String,

    /// Catalog API key; may be empty for unauthenticated requests.
    #[arg(
        long,
        global = true,
        env = "SHELFMARK_API_KEY",
        default_value = "",
        hide_default_value = true
    )]
    pub api_key: String,

    #[arg(
        long,
        global = true,
        env = "SHELFMARK_DATABASE_URL",
        default_value = "sqlite://shelfmark.db"
    )]
    pub database_url: String,

    /// Active session uid, as printed by `account login`.
    #[arg(long, global = true, env = "SHELFMARK_UID")]
    pub uid: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Search the catalog
    Search(catalog::SearchCommand),

    /// Show full details for one volume
    Show(catalog::ShowCommand),

    /// Manage favourite markers
    Favourite {
        #[command(subcommand)]
        command: markers::MarkerCommands,
    },

    /// Manage finished-book markers
    Read {
        #[command(subcommand)]
        command: markers::MarkerCommands,
    },

    /// Follow live marker snapshots until interrupted
    Watch(markers::WatchCommand),

    /// Show recent searches, trimming history past the retention limit
    Recent(searches::RecentCommand),

    /// Manage accounts and the active session
    Account {
        #[command(subcommand)]
        command: account::AccountCommands,
    },

    /// Compose a recommendation email for a volume
    Recommend(recommend::RecommendCommand),
}

pub(crate) fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
