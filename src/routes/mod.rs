use axum::routing::get;
use axum::Router;
use lizsys_core::controller::Controller;

use crate::app::controller::{
    AssetsController, ClientsController, ContractsController, DashboardController,
    PaymentsController, ReportsController,
};
use crate::app::state::AppState;

/// Builds the full application router. Called exactly once per process; every
/// route lives under the `/api` prefix and nowhere else.
pub fn routes(state: AppState) -> Router {
    let api = Router::new()
        .nest("/clients", ClientsController::router())
        .nest("/contracts", ContractsController::router())
        .nest("/payments", PaymentsController::router())
        .nest("/assets", AssetsController::router())
        .nest("/reports", ReportsController::router())
        .merge(DashboardController::router())
        .route("/openapi.json", get(crate::docs::openapi_json));

    Router::new().nest("/api", api).with_state(state)
}
