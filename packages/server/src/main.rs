use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use common::storage::filesystem::FilesystemObjectStore;
use listing::InFlightSubmissions;
use tracing::info;
use tracing_subscriber::EnvFilter;

use server::config::AppConfig;
use server::state::AppState;
use server::store::SeaOrmProductStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load().context("Failed to load config")?;

    let filter = EnvFilter::try_new(&config.log.level).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let db = server::database::init_db(&config.database)
        .await
        .context("Failed to connect to database")?;

    let objects = FilesystemObjectStore::new(
        config.storage.root.clone(),
        &config.storage.public_base_url,
        config.storage.max_object_size,
    )
    .await
    .context("Failed to initialize object storage")?;

    info!(
        root = %config.storage.root.display(),
        bucket = %config.storage.bucket,
        "Object storage ready"
    );

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("Invalid server address")?;

    let state = AppState {
        config: Arc::new(config),
        products: Arc::new(SeaOrmProductStore::new(db)),
        objects: Arc::new(objects),
        submissions: Arc::new(InFlightSubmissions::new()),
    };

    let app = server::build_router(state);

    info!("Server running at http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
