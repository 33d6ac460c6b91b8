use std::path::PathBuf;
use std::sync::Arc;

use sea_orm::DatabaseConnection;

/// Shared serving state, constructed once in the entry path and handed to the
/// router. Handlers receive it through axum `State` rather than reaching for
/// globals.
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub upload_dir: Arc<PathBuf>,
}

impl AppState {
    pub fn new(db: DatabaseConnection, upload_dir: PathBuf) -> Self {
        AppState {
            db,
            upload_dir: Arc::new(upload_dir),
        }
    }
}
