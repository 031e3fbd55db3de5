use chrono::Utc;
use kennel_pricing::cache::{start_reference_refresher, ReferenceCache};
use kennel_pricing::config::Config;
use kennel_pricing::pricing::routes::{router, AppState};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("kennel_pricing=info,tower_http=info")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    let cache = ReferenceCache::new(config.reference.clone(), Utc::now().date_naive()).await;
    let stats = cache.stats().await;
    tracing::info!(
        "Reference data v{} loaded: {} peak periods, {} services",
        stats.reference_version,
        stats.peak_periods,
        stats.services
    );

    tokio::spawn(start_reference_refresher(cache.clone(), config.refresh_every));

    let app = router(AppState {
        cache,
        deposit: config.deposit,
    });

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!("Listening on {}", config.bind_addr);
    axum::serve(listener, app).await?;

    Ok(())
}
