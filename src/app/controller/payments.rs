use std::path::PathBuf;

use axum::extract::{Multipart, Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::body::Bytes;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use chrono::NaiveDate;
use lizsys_core::controller::Controller;
use lizsys_core::response::{ApiError, ApiResult, CoreResponse, ErrorMessage};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, FromQueryResult, JoinType, QueryFilter,
    QueryOrder, QuerySelect, RelationTrait, Set, TransactionTrait,
};
use utoipa::OpenApi;

use crate::app::entity::{clients, contracts, payments};
use crate::app::response::SimpleResponse;
use crate::app::state::AppState;
use crate::app::uploads;

pub const LATE_FEE_PER_DAY: f64 = 5.0;

pub struct PaymentsController;

#[derive(OpenApi)]
#[openapi(
    paths(list, search, create, update, remove, pre_check, notify, receipt),
    components(schemas(payments::Model, PaymentRow, PreCheckPayload, PreCheckResponse))
)]
pub struct PaymentsApi;

impl Controller for PaymentsController {
    type State = AppState;

    fn router() -> Router<AppState> {
        Router::new()
            .route("/", get(list).post(create))
            .route("/search", get(search))
            .route("/{id}", put(update).delete(remove))
            .route("/{id}/pre-check", post(pre_check))
            .route("/{id}/notify", post(notify))
            .route("/{id}/receipt/{filename}", get(receipt))
    }
}

/// Fee charged per day a payment lands after the contract due date.
fn late_fee(due: NaiveDate, paid: NaiveDate) -> f64 {
    let late_days = (paid - due).num_days();

    if late_days > 0 {
        late_days as f64 * LATE_FEE_PER_DAY
    } else {
        0.0
    }
}

struct ReceiptUpload {
    filename: String,
    receipt_type: &'static str,
    bytes: Bytes,
}

struct PaymentForm {
    client_id: i32,
    contract_id: i32,
    amount: f64,
    date: NaiveDate,
    receipt: Option<ReceiptUpload>,
}

impl PaymentForm {
    /// Pulls the payment fields out of a multipart body. Any missing or
    /// unparseable required field is a client error, never a 500.
    async fn from_multipart(mut parts: Multipart) -> Result<Self, String> {
        let mut client_id = None;
        let mut contract_id = None;
        let mut amount = None;
        let mut date = None;
        let mut receipt = None;

        while let Some(field) = parts
            .next_field()
            .await
            .map_err(|_| "Malformed multipart body".to_string())?
        {
            let name = field.name().unwrap_or_default().to_string();

            match name.as_str() {
                "clientId" => client_id = field.text().await.ok().and_then(|v| v.parse().ok()),
                "contractId" => contract_id = field.text().await.ok().and_then(|v| v.parse().ok()),
                "amount" => amount = field.text().await.ok().and_then(|v| v.parse().ok()),
                "date" => date = field.text().await.ok().and_then(|v| v.parse().ok()),
                "receipt" => {
                    let content_type = field.content_type().unwrap_or_default().to_string();

                    let Some(receipt_type) = uploads::receipt_type_for(&content_type) else {
                        return Err("Only PDF, JPEG, and PNG files are allowed".to_string());
                    };

                    let filename = field
                        .file_name()
                        .and_then(uploads::sanitize_filename)
                        .map(str::to_string)
                        .ok_or_else(|| "Invalid receipt filename".to_string())?;

                    let bytes = field
                        .bytes()
                        .await
                        .map_err(|_| "Malformed multipart body".to_string())?;

                    receipt = Some(ReceiptUpload { filename, receipt_type, bytes });
                }
                _ => {}
            }
        }

        match (client_id, contract_id, amount, date) {
            (Some(client_id), Some(contract_id), Some(amount), Some(date)) => Ok(PaymentForm {
                client_id,
                contract_id,
                amount,
                date,
                receipt,
            }),
            _ => Err("Missing required fields".to_string()),
        }
    }
}

/// Payment row joined with the client and contract it belongs to.
#[derive(Debug, FromQueryResult, serde::Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRow {
    pub id: i32,
    pub client_id: i32,
    pub contract_id: i32,
    pub amount: f64,
    pub date: NaiveDate,
    pub late_fee: f64,
    pub receipt_path: Option<String>,
    pub receipt_type: Option<String>,
    pub client_name: String,
    pub contract_number: String,
}

fn joined() -> sea_orm::Select<payments::Entity> {
    payments::Entity::find()
        .column_as(clients::Column::Name, "client_name")
        .column_as(contracts::Column::Number, "contract_number")
        .join(JoinType::InnerJoin, payments::Relation::Clients.def())
        .join(JoinType::InnerJoin, payments::Relation::Contracts.def())
}

#[utoipa::path(
    get,
    path = "/",
    responses((status = 200, description = "All payments with client and contract refs", body = Vec<PaymentRow>))
)]
async fn list(State(state): State<AppState>) -> ApiResult<Vec<PaymentRow>> {
    let rows = joined().into_model::<PaymentRow>().all(&state.db).await?;

    Ok(CoreResponse::Ok(rows))
}

#[derive(serde::Deserialize, utoipa::IntoParams)]
#[serde(rename_all = "camelCase")]
struct SearchParams {
    client_id: Option<i32>,
    contract_id: Option<i32>,
}

#[utoipa::path(
    get,
    path = "/search",
    params(SearchParams),
    responses((status = 200, body = Vec<PaymentRow>))
)]
async fn search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> ApiResult<Vec<PaymentRow>> {
    let condition = Condition::all()
        .add_option(params.client_id.map(|v| payments::Column::ClientId.eq(v)))
        .add_option(params.contract_id.map(|v| payments::Column::ContractId.eq(v)));

    let rows = joined()
        .filter(condition)
        .into_model::<PaymentRow>()
        .all(&state.db)
        .await?;

    Ok(CoreResponse::Ok(rows))
}

#[utoipa::path(
    post,
    path = "/",
    responses(
        (status = 201, body = payments::Model),
        (status = 400, body = ErrorMessage),
        (status = 404, body = ErrorMessage)
    )
)]
async fn create(State(state): State<AppState>, parts: Multipart) -> ApiResult<payments::Model> {
    let form = match PaymentForm::from_multipart(parts).await {
        Ok(form) => form,
        Err(message) => return Ok(CoreResponse::bad_request(message)),
    };

    let Some(contract) = contracts::Entity::find_by_id(form.contract_id)
        .one(&state.db)
        .await?
    else {
        return Ok(CoreResponse::not_found("Contract not found"));
    };

    let fee = late_fee(contract.effective_due_date(), form.date);
    let new_balance = contract.outstanding() - form.amount;

    // Balance decrement and payment row land together or not at all.
    let txn = state.db.begin().await?;

    let mut contract_active: contracts::ActiveModel = contract.into();
    contract_active.remaining_balance = Set(Some(new_balance));
    contract_active.update(&txn).await?;

    let payment = payments::ActiveModel {
        client_id: Set(form.client_id),
        contract_id: Set(form.contract_id),
        amount: Set(form.amount),
        date: Set(form.date),
        late_fee: Set(fee),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    txn.commit().await?;

    let payment = match form.receipt {
        Some(upload) => attach_receipt(&state, payment, upload).await?,
        None => payment,
    };

    Ok(CoreResponse::Created(payment))
}

/// Stores the receipt under the per-payment directory and records its
/// location on the row.
async fn attach_receipt(
    state: &AppState,
    payment: payments::Model,
    upload: ReceiptUpload,
) -> Result<payments::Model, ApiError> {
    let dir = uploads::payment_dir(&state.upload_dir, payment.id);
    let stored_name = uploads::timestamped(&upload.filename);
    let path = uploads::store(&dir, &stored_name, &upload.bytes).await?;

    let mut active: payments::ActiveModel = payment.into();
    active.receipt_path = Set(Some(path.to_string_lossy().into_owned()));
    active.receipt_type = Set(Some(upload.receipt_type.to_string()));

    Ok(active.update(&state.db).await?)
}

#[utoipa::path(
    put,
    path = "/{id}",
    responses(
        (status = 200, body = payments::Model),
        (status = 400, body = ErrorMessage),
        (status = 404, body = ErrorMessage)
    )
)]
async fn update(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    parts: Multipart,
) -> ApiResult<payments::Model> {
    let form = match PaymentForm::from_multipart(parts).await {
        Ok(form) => form,
        Err(message) => return Ok(CoreResponse::bad_request(message)),
    };

    let Some(payment) = payments::Entity::find_by_id(id).one(&state.db).await? else {
        return Ok(CoreResponse::not_found("Payment not found"));
    };

    let Some(contract) = contracts::Entity::find_by_id(form.contract_id)
        .one(&state.db)
        .await?
    else {
        return Ok(CoreResponse::not_found("Contract not found"));
    };

    let fee = late_fee(contract.effective_due_date(), form.date);
    let old_receipt = payment.receipt_path.clone();

    let mut active: payments::ActiveModel = payment.into();
    active.client_id = Set(form.client_id);
    active.contract_id = Set(form.contract_id);
    active.amount = Set(form.amount);
    active.date = Set(form.date);
    active.late_fee = Set(fee);

    if let Some(upload) = &form.receipt {
        let dir = uploads::payment_dir(&state.upload_dir, id);
        let stored_name = uploads::timestamped(&upload.filename);
        let path = uploads::store(&dir, &stored_name, &upload.bytes).await?;

        active.receipt_path = Set(Some(path.to_string_lossy().into_owned()));
        active.receipt_type = Set(Some(upload.receipt_type.to_string()));
    }

    let payment = active.update(&state.db).await?;

    if form.receipt.is_some() {
        if let Some(old) = old_receipt {
            uploads::remove(std::path::Path::new(&old)).await;
        }
    }

    Ok(CoreResponse::Ok(payment))
}

#[utoipa::path(
    delete,
    path = "/{id}",
    responses((status = 200, body = SimpleResponse), (status = 404, body = ErrorMessage))
)]
async fn remove(State(state): State<AppState>, Path(id): Path<i32>) -> ApiResult<SimpleResponse> {
    let Some(payment) = payments::Entity::find_by_id(id).one(&state.db).await? else {
        return Ok(CoreResponse::not_found("Payment not found"));
    };

    // Deleting the payment gives the amount back to the contract balance;
    // both writes share one transaction.
    let txn = state.db.begin().await?;

    if let Some(contract) = contracts::Entity::find_by_id(payment.contract_id)
        .one(&txn)
        .await?
    {
        let restored = contract.outstanding() + payment.amount;

        let mut active: contracts::ActiveModel = contract.into();
        active.remaining_balance = Set(Some(restored));
        active.update(&txn).await?;
    }

    payments::Entity::delete_by_id(id).exec(&txn).await?;

    txn.commit().await?;

    if let Some(path) = &payment.receipt_path {
        uploads::remove(std::path::Path::new(path)).await;
    }

    Ok(CoreResponse::Ok(SimpleResponse::new("Payment deleted")))
}

#[derive(serde::Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PreCheckPayload {
    pub client_id: Option<i32>,
    pub amount: Option<f64>,
    pub date: Option<String>,
}

#[derive(serde::Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PreCheckResponse {
    pub contract_id: i32,
    pub payment_amount: f64,
    pub remaining_balance: f64,
    pub is_overpaid: bool,
    pub overpaid_amount: f64,
}

#[utoipa::path(
    post,
    path = "/{id}/pre-check",
    request_body = PreCheckPayload,
    responses(
        (status = 200, body = PreCheckResponse),
        (status = 400, body = ErrorMessage),
        (status = 404, body = ErrorMessage)
    )
)]
async fn pre_check(
    State(state): State<AppState>,
    Path(_id): Path<i32>,
    Json(payload): Json<PreCheckPayload>,
) -> ApiResult<PreCheckResponse> {
    let (Some(client_id), Some(amount), Some(_date)) =
        (payload.client_id, payload.amount, payload.date.as_deref())
    else {
        return Ok(CoreResponse::bad_request("Missing required fields"));
    };

    // The check runs against the client's most recent contract.
    let Some(contract) = contracts::Entity::find()
        .filter(contracts::Column::ClientId.eq(client_id))
        .order_by_desc(contracts::Column::EndDate)
        .one(&state.db)
        .await?
    else {
        return Ok(CoreResponse::not_found("Associated contract not found"));
    };

    let remaining_balance = contract.outstanding();
    let is_overpaid = amount > remaining_balance;
    let overpaid_amount = if is_overpaid { amount - remaining_balance } else { 0.0 };

    Ok(CoreResponse::Ok(PreCheckResponse {
        contract_id: contract.id,
        payment_amount: amount,
        remaining_balance,
        is_overpaid,
        overpaid_amount,
    }))
}

#[utoipa::path(
    post,
    path = "/{id}/notify",
    responses((status = 200, body = SimpleResponse), (status = 404, body = ErrorMessage))
)]
async fn notify(State(state): State<AppState>, Path(id): Path<i32>) -> ApiResult<SimpleResponse> {
    let Some(payment) = payments::Entity::find_by_id(id).one(&state.db).await? else {
        return Ok(CoreResponse::not_found("Payment not found"));
    };

    // TODO: wire up the email/SMS provider once one is picked.
    tracing::info!(
        client_id = payment.client_id,
        payment_id = payment.id,
        "notification triggered"
    );

    Ok(CoreResponse::Ok(SimpleResponse::new(format!(
        "Notification triggered for payment {id}"
    ))))
}

#[utoipa::path(
    get,
    path = "/{id}/receipt/{filename}",
    responses(
        (status = 200, description = "Receipt file attachment"),
        (status = 404, body = ErrorMessage)
    )
)]
async fn receipt(
    State(state): State<AppState>,
    Path((id, filename)): Path<(i32, String)>,
) -> Result<Response, ApiError> {
    let not_found =
        || CoreResponse::<SimpleResponse>::not_found("Receipt not found").into_response();

    let Some(payment) = payments::Entity::find_by_id(id).one(&state.db).await? else {
        return Ok(not_found());
    };

    let Some(stored) = payment.receipt_path.map(PathBuf::from) else {
        return Ok(not_found());
    };

    // Only the recorded file is served, never an arbitrary path segment.
    if stored.file_name().and_then(|n| n.to_str()) != Some(filename.as_str()) {
        return Ok(not_found());
    }

    let Ok(bytes) = tokio::fs::read(&stored).await else {
        return Ok(not_found());
    };

    let disposition = format!("attachment; filename=\"{filename}\"");

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, uploads::content_type_for(&filename)),
            (header::CONTENT_DISPOSITION, disposition.as_str()),
        ],
        bytes,
    )
        .into_response())
}
