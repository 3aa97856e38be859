use axum::extract::DefaultBodyLimit;
use salsabil_backend::{config::Config, database::pool::create_pool, AppState};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let config = Config::from_env();

    let pool = create_pool(&config.database_url).await?;
    salsabil_backend::database::MIGRATOR.run(&pool).await?;

    let storage_root = config.storage_root.clone();
    let app_state = AppState::new(pool, &config);

    info!("Serving generated documents and uploads from: {}", storage_root);

    let app = salsabil_backend::api_router(app_state)
        .nest_service("/files", ServeDir::new(storage_root))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .layer(DefaultBodyLimit::max(50 * 1024 * 1024));

    let addr: SocketAddr = config.server_address.parse()?;
    info!("Server listening on {}", addr);
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
