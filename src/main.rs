use lizsys::bootstrap;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    bootstrap::init_base().await;

    // Fail fast: the server never binds if database init fails.
    let db = bootstrap::init_db().await?;

    bootstrap::init_server(db).await
}
