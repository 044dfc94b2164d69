use std::net::SocketAddr;
use std::sync::Arc;

use souk_api::{app, AppState, AuthConfig};
use souk_catalog::CatalogStore;
use souk_order::OrderStore;
use souk_store::{DbClient, PgCatalogStore, PgOrderStore};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "souk_api=debug,tower_http=debug,axum::rejection=trace".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = souk_store::Config::load()?;
    tracing::info!("Starting Souk API on port {}", config.server.port);

    let db = DbClient::new(&config.database.url, config.database.max_connections).await?;
    db.migrate().await?;

    let catalog_store: Arc<dyn CatalogStore> = Arc::new(PgCatalogStore::new(db.pool.clone()));
    let order_store: Arc<dyn OrderStore> = Arc::new(PgOrderStore::new(db.pool.clone()));

    let state = AppState::new(
        catalog_store,
        order_store,
        AuthConfig {
            secret: config.auth.jwt_secret.clone(),
            expiration: config.auth.jwt_expiration_seconds,
        },
    );

    let app = app(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
