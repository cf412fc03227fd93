//! tradepost server entry point.
//!
//! Starts the Axum HTTP server over the PostgreSQL store and spawns the
//! timer-driven listing expiry sweeper.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use tradepost::api;
use tradepost::app_state::AppState;
use tradepost::config::MarketConfig;
use tradepost::identity::{StaticProfiles, StoreSessions};
use tradepost::moderation::{ModerationFilter, ModerationGate};
use tradepost::persistence::{PgStore, Store};
use tradepost::service::{CatalogService, InteractionService, ListingService, MessagingService};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load configuration
    let config = MarketConfig::from_env().map_err(|e| anyhow::anyhow!(e.to_string()))?;
    tracing::info!(addr = %config.listen_addr, "starting tradepost");

    // Connect to the store and run migrations
    let store = Arc::new(
        PgStore::connect(&config)
            .await
            .context("connecting to postgres")?,
    );

    // Build the moderation gate
    let mut moderation = ModerationGate::new(ModerationFilter::new());
    if let Some(url) = config.moderation_escalation_url.clone() {
        moderation = moderation
            .with_escalation(url, Duration::from_millis(config.moderation_timeout_ms))
            .context("building moderation escalation client")?;
    }
    let moderation = Arc::new(moderation);

    // Build the service layer
    let listings = Arc::new(ListingService::new(
        Arc::clone(&store) as Arc<dyn Store>,
        Arc::clone(&moderation),
        config.listing_quota,
        config.listing_retention_days,
    ));
    let interactions = Arc::new(InteractionService::new(
        Arc::clone(&store) as Arc<dyn Store>,
        moderation,
    ));
    let messaging = Arc::new(MessagingService::new(
        Arc::clone(&store) as Arc<dyn Store>,
        config.message_page_limit,
    ));
    let catalog = Arc::new(CatalogService::new(Arc::clone(&store) as Arc<dyn Store>));

    // Build application state
    let app_state = AppState {
        listings: Arc::clone(&listings),
        interactions,
        messaging,
        catalog,
        sessions: Arc::new(StoreSessions::new(Arc::clone(&store) as Arc<dyn Store>)),
        profiles: Arc::new(StaticProfiles::new()),
        admin_token: config.admin_token.clone(),
    };

    // Timer-driven expiry sweep, alongside the sweep-on-read path
    let sweep_interval = Duration::from_secs(config.sweep_interval_secs.max(1));
    let sweeper = Arc::clone(&listings);
    let session_store = Arc::clone(&store);
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(sweep_interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        loop {
            ticker.tick().await;
            if let Err(err) = sweeper.sweep().await {
                tracing::warn!(error = %err, "scheduled listing sweep failed");
            }
            match session_store
                .delete_expired_sessions(chrono::Utc::now())
                .await
            {
                Ok(dropped) if dropped > 0 => {
                    tracing::info!(dropped, "expired sessions removed");
                }
                Ok(_) => {}
                Err(err) => tracing::warn!(error = %err, "session cleanup failed"),
            }
        }
    });

    // Build router
    let app = api::build_router()
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.request_timeout_secs,
        )))
        .layer(CorsLayer::permissive())
        .with_state(app_state);

    // Start server
    let listener = tokio::net::TcpListener::bind(config.listen_addr)
        .await
        .context("binding listen address")?;
    tracing::info!(addr = %config.listen_addr, "server listening");

    axum::serve(listener, app).await.context("serving")?;

    Ok(())
}
