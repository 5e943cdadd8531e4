use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use shelfmark::application::AuthManager;
use shelfmark::domain::ids::UserId;
use shelfmark::domain::markers::MarkerKind;
use shelfmark::domain::store::DocumentStore;
use shelfmark::infrastructure::catalog::CatalogClient;
use shelfmark::infrastructure::store::SqliteDocumentStore;
use shelfmark::presentation::cli::{
    AppContext, Cli, Commands, account, catalog, markers, recommend, searches,
};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (before clap parses env vars)
    let _ = dotenvy::dotenv();

    init_tracing();

    let cli = Cli::parse();

    let store: Arc<dyn DocumentStore> =
        Arc::new(SqliteDocumentStore::connect(&cli.database_url).await?);
    let auth = AuthManager::new(store.clone());

    let identity = match &cli.uid {
        Some(uid) => match auth.resume(&UserId::new(uid.clone())).await {
            Ok(identity) => Some(identity),
            Err(err) => {
                tracing::warn!(error = %err, "could not resume session; continuing signed out");
                None
            }
        },
        None => None,
    };

    let ctx = AppContext {
        store,
        auth,
        catalog: CatalogClient::from_base_url(&cli.catalog_url, cli.api_key.clone())?,
        identity,
    };

    match cli.command {
        Commands::Search(c) => catalog::search(&ctx, c).await,
        Commands::Show(c) => catalog::show(&ctx, c).await,
        Commands::Favourite { command } => markers::run(&ctx, MarkerKind::Favourite, command).await,
        Commands::Read { command } => markers::run(&ctx, MarkerKind::Read, command).await,
        Commands::Watch(c) => markers::watch(&ctx, c).await,
        Commands::Recent(c) => searches::run(&ctx, c).await,
        Commands::Account { command } => account::run(&ctx, command).await,
        Commands::Recommend(c) => recommend::run(&ctx, c).await,
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let use_json = std::env::var("RUST_LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));

    let registry = tracing_subscriber::registry().with(env_filter);

    if use_json {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().compact())
            .init();
    }
}
