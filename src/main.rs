use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use watchd_api::{
    db::{create_pool, run_migrations, MemoryUserStore, PgUserStore, UserStore},
    services::{providers::CatalogProvider, RankConfig, TmdbProvider},
    create_router, AppState, Config, SiteCopy,
};

/// Resolves on Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("watchd_api=info,tower_http=info")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    let users: Arc<dyn UserStore> = match config.database_url.as_deref() {
        Some(database_url) => {
            let pool = create_pool(database_url).await?;
            run_migrations(&pool).await?;
            tracing::info!("Connected to PostgreSQL, migrations applied");
            Arc::new(PgUserStore::new(pool))
        }
        None => {
            tracing::warn!("DATABASE_URL not set, user data will not survive a restart");
            Arc::new(MemoryUserStore::new())
        }
    };

    let catalog: Arc<dyn CatalogProvider> = Arc::new(TmdbProvider::new(
        config.tmdb_api_url.clone(),
        config.tmdb_api_read_access_token.clone(),
        config.tmdb_language.clone(),
    )?);

    tracing::info!(
        catalog = catalog.name(),
        users = users.name(),
        "Providers ready"
    );

    let state = Arc::new(AppState {
        catalog,
        users,
        ranking: RankConfig::default(),
        site: SiteCopy::from(&config),
        bcrypt_cost: config.bcrypt_cost,
    });

    let app = create_router(state);

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server running on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}
