use axum::extract::State;
use axum::routing::get;
use axum::Router;
use lizsys_core::controller::Controller;
use lizsys_core::response::{ApiResult, CoreResponse};
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QuerySelect};
use utoipa::OpenApi;

use crate::app::entity::{assets, clients, contracts, payments};
use crate::app::state::AppState;

pub struct DashboardController;

#[derive(OpenApi)]
#[openapi(paths(stats), components(schemas(DashboardStats)))]
pub struct DashboardApi;

impl Controller for DashboardController {
    type State = AppState;

    fn router() -> Router<AppState> {
        Router::new().route("/dashboard-stats", get(stats))
    }
}

#[derive(serde::Serialize, utoipa::ToSchema)]
pub struct DashboardStats {
    pub clients: u64,
    pub contracts: u64,
    /// Sum of all payment amounts, 0 when there are none.
    pub payments: f64,
    pub assets: u64,
}

#[utoipa::path(
    get,
    path = "/dashboard-stats",
    responses((status = 200, body = DashboardStats))
)]
async fn stats(State(state): State<AppState>) -> ApiResult<DashboardStats> {
    let clients = clients::Entity::find().count(&state.db).await?;
    let contracts = contracts::Entity::find().count(&state.db).await?;
    let assets = assets::Entity::find().count(&state.db).await?;

    let payments = payments::Entity::find()
        .select_only()
        .column_as(payments::Column::Amount.sum(), "total")
        .into_tuple::<Option<f64>>()
        .one(&state.db)
        .await?
        .flatten()
        .unwrap_or(0.0);

    Ok(CoreResponse::Ok(DashboardStats {
        clients,
        contracts,
        payments,
        assets,
    }))
}
