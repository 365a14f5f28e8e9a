use std::{sync::Arc, time::Duration};

use aurum_app::{
    database::{self, Db},
    domain::rates::{
        CachedRatesService, HttpSpotFeed, PgRatesRepository, RateCache, RateCacheConfig,
        RatesRepository, RatesService, feed::DEFAULT_FEED_URL,
    },
};
use clap::Args;

#[derive(Debug, Args)]
pub(crate) struct ShowRatesArgs {
    /// PostgreSQL connection string
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    database_url: String,

    /// Print only the operator-maintained rows
    #[arg(long)]
    stored: bool,

    /// Spot feed endpoint
    #[arg(long, env = "AURUM_FEED_URL", default_value = DEFAULT_FEED_URL)]
    feed_url: String,

    /// Spot feed timeout in seconds
    #[arg(long, default_value_t = 5)]
    feed_timeout_secs: u64,
}

pub(crate) async fn run(args: ShowRatesArgs) -> Result<(), String> {
    let pool = database::connect(&args.database_url)
        .await
        .map_err(|error| format!("failed to connect to database: {error}"))?;

    let repository = Arc::new(PgRatesRepository::new(Db::new(pool)));

    if args.stored {
        let stored = repository
            .list_stored_rates()
            .await
            .map_err(|error| format!("failed to list stored rates: {error}"))?;

        if stored.is_empty() {
            println!("no stored rates");
            return Ok(());
        }

        for rate in stored {
            println!(
                "{}: {} per gram (updated {}{})",
                rate.metal,
                rate.price_per_gram,
                rate.updated_at,
                rate.updated_by
                    .map_or_else(String::new, |user| format!(" by {user}"))
            );
        }

        return Ok(());
    }

    let feed = Arc::new(HttpSpotFeed::new(
        args.feed_url,
        Duration::from_secs(args.feed_timeout_secs),
    ));
    let cache = Arc::new(RateCache::new(feed, RateCacheConfig::default()));
    let table = CachedRatesService::new(cache, repository).current_rates().await;

    if table.is_empty() {
        return Err("no rates available: spot feed failed and nothing is stored".to_string());
    }

    for entry in table.iter() {
        println!(
            "{}: {} per gram ({}, {})",
            entry.metal,
            entry.price_per_gram,
            entry.origin.as_str(),
            entry.fetched_at
        );
    }

    Ok(())
}
