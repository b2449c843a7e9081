mod config;
mod error;
mod handlers;
mod models;
mod services;
mod state;
mod validation;

use config::AppConfig;
use ntex::web;
use ntex_cors::Cors;
use services::sheet_fetcher::SheetFetcher;
use state::LeaderboardStore;
use std::sync::Arc;
use std::time::Duration;

#[ntex::main]
async fn main() -> std::io::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = AppConfig::from_env().map_err(std::io::Error::other)?;
    let fetcher = SheetFetcher::new(config.http_timeout).map_err(std::io::Error::other)?;
    tracing::info!(source = %config.source.describe(), "Leaderboard source configured");

    let store = Arc::new(LeaderboardStore::new(
        fetcher,
        config.source.clone(),
        config.settings.clone(),
    ));

    // Start serving even if the first fetch fails; reads answer 503 until one succeeds.
    if let Err(e) = store.refresh().await {
        tracing::error!(error = %e, "Initial leaderboard fetch failed");
    }
    if let Some(interval) = config.refresh_interval {
        ntex::rt::spawn(refresh_periodically(store.clone(), interval));
    }

    tracing::info!(
        "Leaderboard server v{} starting on {}:{}",
        env!("CARGO_PKG_VERSION"),
        config.host,
        config.port
    );

    web::HttpServer::new(move || {
        web::App::new()
            .state(store.clone())
            .wrap(
                Cors::new()
                    .allowed_origin("*")
                    .allowed_methods(vec!["GET", "POST", "OPTIONS"])
                    .allowed_headers(vec!["Content-Type"])
                    .max_age(3600)
                    .finish(),
            )
            .route("/api/health", web::get().to(health))
            .route(
                "/api/leaderboard/{competition_id}",
                web::get().to(handlers::leaderboard::get_leaderboard),
            )
            .route("/api/competitions", web::get().to(handlers::leaderboard::get_competitions))
            .route(
                "/api/leaderboards",
                web::get().to(handlers::leaderboard::get_grouped_leaderboards),
            )
            .route("/api/refresh", web::post().to(handlers::leaderboard::refresh))
    })
    .bind(format!("{}:{}", config.host, config.port))?
    .run()
    .await
}

async fn refresh_periodically(store: Arc<LeaderboardStore>, interval: Duration) {
    let mut ticker = tokio::time::interval(interval);
    // The first tick fires immediately; startup already fetched.
    ticker.tick().await;
    loop {
        ticker.tick().await;
        // Failures are logged and stored in the snapshot; the next tick tries again.
        let _ = store.refresh().await;
    }
}

async fn health(store: web::types::State<Arc<LeaderboardStore>>) -> web::HttpResponse {
    let snapshot = store.snapshot();
    web::HttpResponse::Ok().json(&serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "fetched_at": snapshot.fetched_at,
        "entries": snapshot.entries.len(),
        "last_error": snapshot.last_error,
    }))
}
