use anyhow::Context;
use reelpack_server::config::ServerConfig;
use reelpack_server::routes::build_router;
use reelpack_server::state::AppState;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = ServerConfig::from_env().context("invalid configuration")?;
    info!(
        imdb = %config.providers.imdb_base_url,
        tmdb = %config.providers.tmdb_base_url,
        domains = ?config.network_domains,
        "upstreams configured"
    );

    let bind_addr = config.bind_addr.clone();
    let app = build_router(AppState::new(config));

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .context("failed to bind")?;
    info!(addr = %bind_addr, "server listening");

    axum::serve(listener, app).await?;
    Ok(())
}
