use axum::Json;
use tokio::io::AsyncWriteExt;
use utoipa::OpenApi;

use crate::app::controller::{
    AssetsApi, ClientsApi, ContractsApi, DashboardApi, PaymentsApi, ReportsApi,
};
use crate::app::response::{DeleteResponse, SimpleResponse};
use lizsys_core::response::ErrorMessage;

#[derive(OpenApi)]
#[openapi(
    nest(
        (path = "/api/clients", api = ClientsApi),
        (path = "/api/contracts", api = ContractsApi),
        (path = "/api/payments", api = PaymentsApi),
        (path = "/api/assets", api = AssetsApi),
        (path = "/api/reports", api = ReportsApi),
        (path = "/api", api = DashboardApi)
    ),
    components(schemas(SimpleResponse, DeleteResponse, ErrorMessage)),
    info(title = "LIZSYS Backend", description = "LIZSYS asset-leasing CRM API")
)]
pub struct MainApiDoc;

/// Serves the API document; the app title lives in its `info` block.
pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(MainApiDoc::openapi())
}

pub async fn generate_docs() -> anyhow::Result<()> {
    let mut file = tokio::fs::OpenOptions::new()
        .write(true)
        .create(true)     // create if not exists
        .truncate(true)   // truncates existing file → overwrites
        .open("api.json")
        .await?;

    let docs = MainApiDoc::openapi().to_pretty_json()?;

    file.write_all(docs.as_bytes()).await?;

    Ok(())
}
