use std::net::SocketAddr;

use anyhow::Context;
use sea_orm::DatabaseConnection;

use crate::app::state::AppState;
use crate::config::AppConfig;

pub async fn init_server(db: DatabaseConnection) -> anyhow::Result<()> {
    let config = AppConfig::get().await?;

    let state = AppState::new(db, config.upload_dir.clone());

    // Build the router; every API route lives under /api.
    let app = crate::routes::routes(state);

    if std::env::var("EXPORT_OPENAPI").is_ok() {
        crate::docs::generate_docs().await?;
    }

    // Start the server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("cannot bind `{addr}`"))?;

    axum::serve(listener, app).await.context("server error")?;

    Ok(())
}
