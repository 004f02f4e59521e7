use anyhow::Result;
use salon_api::{bind_address_from_env, build_app, ApiConfig};
use salon_observability::init_tracing;

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing("salon_api");

    let config = ApiConfig::from_env();
    let bind = bind_address_from_env();
    let catalog_path = config.catalog_path.display().to_string();

    let app = build_app(config).await?;

    let listener = tokio::net::TcpListener::bind(&bind).await?;
    tracing::info!(bind = %bind, catalog = %catalog_path, "salon bot api started");

    axum::serve(listener, app).await?;
    Ok(())
}
