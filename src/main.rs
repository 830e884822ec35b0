use std::io;

use anyhow::{Context, Result};
use gifts_for_good::{
    Config, EtsyClient, PovertyClassifier, Prompter, ProximityResolver, QueryOrchestrator, TreeStore,
    ZipIndex, session,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // stdout is reserved for the prompts
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gifts_for_good=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let config = Config::from_env();

    let etsy = config
        .etsy()
        .context("ETSY_API_KEY must be set to search listings")?;
    let client = EtsyClient::with_config(etsy).context("Failed to initialize Etsy client")?;

    let zips = ZipIndex::load(&config.zip_data)
        .with_context(|| format!("Failed to load zip data from {}", config.zip_data.display()))?;
    let poverty = PovertyClassifier::load(&config.county_data).with_context(|| {
        format!("Failed to load county data from {}", config.county_data.display())
    })?;
    tracing::info!(zips = zips.len(), max_radius = config.max_radius, "Reference data loaded");

    let store = TreeStore::new(&config.location_data).with_format(config.tree_format);
    let mut tree = store.load();

    let resolver = ProximityResolver::new(&zips, &poverty).with_max_radius(config.max_radius);
    let orchestrator = QueryOrchestrator::new(&zips, resolver, &store);

    let stdin = io::stdin();
    let mut prompter = Prompter::new(stdin.lock(), io::stdout());
    let summary = session::run(
        &mut prompter,
        &orchestrator,
        &mut tree,
        &zips,
        &client,
        config.page_size,
    )
    .await?;

    tracing::info!(
        found = summary.listings_found,
        shown = summary.listings_shown,
        tree_updated = summary.tree_updated,
        "Session finished"
    );
    Ok(())
}
