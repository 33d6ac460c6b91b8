use std::path::PathBuf;

use lizsys_core::config::ConfigBuilder;
use tokio::sync::OnceCell;

static APP: OnceCell<AppConfig> = OnceCell::const_new();

#[derive(Clone)]
pub struct AppConfig {
    pub port: u16,
    pub database_url: String,
    pub upload_dir: PathBuf,
}

impl ConfigBuilder for AppConfig {
    fn build() -> anyhow::Result<Self> {
        let port = std::env::var("SERVER_PORT")
            .unwrap_or_else(|_| {
                tracing::warn!("cannot read `SERVER_PORT` defaulting to `3000`");

                "3000".into()
            })
            .parse()
            .unwrap_or_else(|err| {
                tracing::error!("cannot parse `SERVER_PORT`. defaulting to 3000 {:?}", err);
                3000
            });

        let database_url = std::env::var("DATABASE_URL")
            .map_err(|err| anyhow::anyhow!("cannot read `DATABASE_URL`: {:?}", err))?;

        let upload_dir = std::env::var("UPLOAD_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("uploads"));

        Ok(AppConfig { port, database_url, upload_dir })
    }
}

impl AppConfig {
    pub async fn get() -> anyhow::Result<AppConfig> {
        APP.get_or_try_init(async || AppConfig::build())
            .await
            .cloned()
    }

    pub async fn database_url() -> anyhow::Result<String> {
        Ok(Self::get().await?.database_url)
    }
}
