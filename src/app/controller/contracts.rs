use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use chrono::NaiveDate;
use lizsys_core::controller::Controller;
use lizsys_core::response::{ApiResult, CoreResponse};
use sea_orm::{ActiveModelTrait, EntityTrait, QueryOrder, Set};
use utoipa::OpenApi;

use crate::app::entity::contracts;
use crate::app::state::AppState;

pub struct ContractsController;

#[derive(OpenApi)]
#[openapi(
    paths(list, create),
    components(schemas(contracts::Model, ContractPayload))
)]
pub struct ContractsApi;

impl Controller for ContractsController {
    type State = AppState;

    fn router() -> Router<AppState> {
        Router::new().route("/", get(list).post(create))
    }
}

#[derive(serde::Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ContractPayload {
    pub title: Option<String>,
    pub number: Option<String>,
    pub amount: Option<f64>,
    // Dates arrive as strings so a malformed date is a 400, not a decode error.
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub due_date: Option<String>,
    pub client_id: Option<i32>,
    pub status: Option<String>,
    pub asset_type: Option<String>,
    pub client_type: Option<String>,
}

struct ValidContract {
    title: String,
    number: String,
    amount: f64,
    start_date: NaiveDate,
    end_date: NaiveDate,
    due_date: Option<NaiveDate>,
}

impl ContractPayload {
    fn validated(&self) -> Option<ValidContract> {
        let title = self.title.as_deref()?.trim();
        let number = self.number.as_deref()?.trim();
        let amount = self.amount?;

        if title.is_empty() || number.is_empty() || !amount.is_finite() || amount <= 0.0 {
            return None;
        }

        let start_date = self.start_date.as_deref()?.parse().ok()?;
        let end_date = self.end_date.as_deref()?.parse().ok()?;
        let due_date = match self.due_date.as_deref() {
            Some(raw) => Some(raw.parse().ok()?),
            None => None,
        };

        Some(ValidContract {
            title: title.to_string(),
            number: number.to_string(),
            amount,
            start_date,
            end_date,
            due_date,
        })
    }
}

#[utoipa::path(
    get,
    path = "/",
    responses((status = 200, description = "All contracts, newest first", body = Vec<contracts::Model>))
)]
async fn list(State(state): State<AppState>) -> ApiResult<Vec<contracts::Model>> {
    let rows = contracts::Entity::find()
        .order_by_desc(contracts::Column::Id)
        .all(&state.db)
        .await?;

    Ok(CoreResponse::Ok(rows))
}

#[utoipa::path(
    post,
    path = "/",
    request_body = ContractPayload,
    responses((status = 201, body = contracts::Model))
)]
async fn create(
    State(state): State<AppState>,
    Json(payload): Json<ContractPayload>,
) -> ApiResult<contracts::Model> {
    let Some(valid) = payload.validated() else {
        return Ok(CoreResponse::bad_request("Invalid contract payload"));
    };

    let row = contracts::ActiveModel {
        client_id: Set(payload.client_id),
        title: Set(valid.title),
        number: Set(valid.number),
        amount: Set(valid.amount),
        // New contracts start fully unpaid.
        remaining_balance: Set(Some(valid.amount)),
        status: Set(payload.status),
        asset_type: Set(payload.asset_type),
        client_type: Set(payload.client_type),
        start_date: Set(valid.start_date),
        end_date: Set(valid.end_date),
        due_date: Set(valid.due_date),
        ..Default::default()
    }
    .insert(&state.db)
    .await?;

    Ok(CoreResponse::Created(row))
}
