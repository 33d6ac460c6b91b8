use axum::extract::{Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use chrono::{Duration, NaiveDate, NaiveTime};
use lizsys_core::controller::Controller;
use lizsys_core::response::{ApiError, ApiResult, CoreResponse};
use sea_orm::{
    ColumnTrait, Condition, EntityTrait, JoinType, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, RelationTrait,
};
use utoipa::OpenApi;

use crate::app::entity::{contracts, payments};
use crate::app::state::AppState;

pub struct ReportsController;

#[derive(OpenApi)]
#[openapi(
    paths(income, debts, overdue, contracts_count, export_csv, export_excel),
    components(schemas(IncomeReport, DebtReport, OverdueReport, CountReport))
)]
pub struct ReportsApi;

impl Controller for ReportsController {
    type State = AppState;

    fn router() -> Router<AppState> {
        Router::new()
            .route("/income", get(income))
            .route("/debts", get(debts))
            .route("/overdue", get(overdue))
            .route("/contracts-count", get(contracts_count))
            .route("/export/csv", get(export_csv))
            .route("/export/excel", get(export_excel))
    }
}

#[derive(Debug, serde::Deserialize, utoipa::IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct ReportFilter {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub asset_type: Option<String>,
    pub contract_status: Option<String>,
    pub client_type: Option<String>,
}

/// Shared WHERE clause over contracts; date bounds apply to the creation
/// timestamp, end bound inclusive of the whole day.
fn contract_conditions(filter: &ReportFilter) -> Condition {
    Condition::all()
        .add_option(
            filter
                .start_date
                .map(|d| contracts::Column::CreatedAt.gte(d.and_time(NaiveTime::MIN))),
        )
        .add_option(
            filter
                .end_date
                .map(|d| contracts::Column::CreatedAt.lt((d + Duration::days(1)).and_time(NaiveTime::MIN))),
        )
        .add_option(
            filter
                .asset_type
                .clone()
                .map(|v| contracts::Column::AssetType.eq(v)),
        )
        .add_option(
            filter
                .contract_status
                .clone()
                .map(|v| contracts::Column::Status.eq(v)),
        )
        .add_option(
            filter
                .client_type
                .clone()
                .map(|v| contracts::Column::ClientType.eq(v)),
        )
}

#[derive(serde::Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct IncomeReport {
    pub total_income: f64,
}

#[utoipa::path(get, path = "/income", params(ReportFilter), responses((status = 200, body = IncomeReport)))]
async fn income(
    State(state): State<AppState>,
    Query(filter): Query<ReportFilter>,
) -> ApiResult<IncomeReport> {
    let total_income = payments::Entity::find()
        .join(JoinType::InnerJoin, payments::Relation::Contracts.def())
        .filter(contract_conditions(&filter))
        .select_only()
        .column_as(payments::Column::Amount.sum(), "total")
        .into_tuple::<Option<f64>>()
        .one(&state.db)
        .await?
        .flatten()
        .unwrap_or(0.0);

    Ok(CoreResponse::Ok(IncomeReport { total_income }))
}

#[derive(serde::Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DebtReport {
    pub total_debt: f64,
}

#[utoipa::path(get, path = "/debts", params(ReportFilter), responses((status = 200, body = DebtReport)))]
async fn debts(
    State(state): State<AppState>,
    Query(filter): Query<ReportFilter>,
) -> ApiResult<DebtReport> {
    let rows = contracts::Entity::find()
        .filter(contract_conditions(&filter))
        .all(&state.db)
        .await?;

    let total_debt = rows.iter().map(contracts::Model::outstanding).sum();

    Ok(CoreResponse::Ok(DebtReport { total_debt }))
}

#[derive(serde::Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OverdueReport {
    pub total_overdue: f64,
}

#[utoipa::path(get, path = "/overdue", params(ReportFilter), responses((status = 200, body = OverdueReport)))]
async fn overdue(
    State(state): State<AppState>,
    Query(filter): Query<ReportFilter>,
) -> ApiResult<OverdueReport> {
    let cutoff = filter
        .end_date
        .unwrap_or_else(|| chrono::Utc::now().date_naive());

    let rows = contracts::Entity::find().all(&state.db).await?;

    let total_overdue = rows
        .iter()
        .filter(|c| c.effective_due_date() < cutoff && c.outstanding() > 0.0)
        .map(contracts::Model::outstanding)
        .sum();

    Ok(CoreResponse::Ok(OverdueReport { total_overdue }))
}

#[derive(serde::Serialize, utoipa::ToSchema)]
pub struct CountReport {
    pub count: u64,
}

#[utoipa::path(get, path = "/contracts-count", params(ReportFilter), responses((status = 200, body = CountReport)))]
async fn contracts_count(
    State(state): State<AppState>,
    Query(filter): Query<ReportFilter>,
) -> ApiResult<CountReport> {
    let count = contracts::Entity::find()
        .filter(contract_conditions(&filter))
        .count(&state.db)
        .await?;

    Ok(CoreResponse::Ok(CountReport { count }))
}

async fn export_rows(
    state: &AppState,
    filter: &ReportFilter,
) -> Result<Vec<contracts::Model>, sea_orm::DbErr> {
    contracts::Entity::find()
        .filter(contract_conditions(filter))
        .order_by_desc(contracts::Column::Id)
        .all(&state.db)
        .await
}

const EXPORT_HEADERS: [&str; 5] = ["id", "clientId", "assetType", "status", "createdAt"];

/// Quotes a CSV field when it needs it.
fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

#[utoipa::path(
    get,
    path = "/export/csv",
    params(ReportFilter),
    responses((status = 200, description = "Contracts report as a CSV attachment"))
)]
async fn export_csv(
    State(state): State<AppState>,
    Query(filter): Query<ReportFilter>,
) -> Result<Response, ApiError> {
    let rows = export_rows(&state, &filter).await?;

    let mut body = String::new();
    body.push_str(&EXPORT_HEADERS.join(","));
    body.push('\n');

    for contract in rows {
        let client_id = contract
            .client_id
            .map(|id| id.to_string())
            .unwrap_or_default();

        body.push_str(&format!(
            "{},{},{},{},{}\n",
            contract.id,
            client_id,
            csv_field(contract.asset_type.as_deref().unwrap_or_default()),
            csv_field(contract.status.as_deref().unwrap_or_default()),
            contract.created_at.date(),
        ));
    }

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/csv"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=contracts_report.csv",
            ),
        ],
        body,
    )
        .into_response())
}

#[utoipa::path(
    get,
    path = "/export/excel",
    params(ReportFilter),
    responses((status = 200, description = "Contracts report as an xlsx attachment"))
)]
async fn export_excel(
    State(state): State<AppState>,
    Query(filter): Query<ReportFilter>,
) -> Result<Response, ApiError> {
    let rows = export_rows(&state, &filter).await?;

    let mut workbook = rust_xlsxwriter::Workbook::new();
    let sheet = workbook.add_worksheet();

    for (col, title) in EXPORT_HEADERS.iter().enumerate() {
        sheet.write_string(0, col as u16, *title)?;
    }

    for (i, contract) in rows.iter().enumerate() {
        let row = (i + 1) as u32;

        sheet.write_number(row, 0, contract.id as f64)?;
        if let Some(client_id) = contract.client_id {
            sheet.write_number(row, 1, client_id as f64)?;
        }
        sheet.write_string(row, 2, contract.asset_type.as_deref().unwrap_or_default())?;
        sheet.write_string(row, 3, contract.status.as_deref().unwrap_or_default())?;
        sheet.write_string(row, 4, contract.created_at.date().to_string())?;
    }

    let bytes = workbook.save_to_buffer()?;

    Ok((
        StatusCode::OK,
        [
            (
                header::CONTENT_TYPE,
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
            ),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=contracts_report.xlsx",
            ),
        ],
        bytes,
    )
        .into_response())
}
