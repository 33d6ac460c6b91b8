use axum::extract::{Path, State};
use axum::routing::{get, put};
use axum::{Json, Router};
use lizsys_core::controller::Controller;
use lizsys_core::response::{ApiResult, CoreResponse};
use sea_orm::{ActiveModelTrait, EntityTrait, QueryOrder, Set};
use utoipa::OpenApi;

use crate::app::entity::clients;
use crate::app::response::DeleteResponse;
use crate::app::state::AppState;

pub struct ClientsController;

#[derive(OpenApi)]
#[openapi(
    paths(list, create, update, remove),
    components(schemas(clients::Model, ClientPayload))
)]
pub struct ClientsApi;

impl Controller for ClientsController {
    type State = AppState;

    fn router() -> Router<AppState> {
        Router::new()
            .route("/", get(list).post(create))
            .route("/{id}", put(update).delete(remove))
    }
}

#[derive(serde::Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClientPayload {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

impl ClientPayload {
    /// All three fields are required and non-empty.
    fn validated(self) -> Option<(String, String, String)> {
        match (self.name, self.email, self.phone) {
            (Some(name), Some(email), Some(phone))
                if !name.trim().is_empty()
                    && !email.trim().is_empty()
                    && !phone.trim().is_empty() =>
            {
                Some((name, email, phone))
            }
            _ => None,
        }
    }
}

#[utoipa::path(
    get,
    path = "/",
    responses((status = 200, description = "All clients, newest first", body = Vec<clients::Model>))
)]
async fn list(State(state): State<AppState>) -> ApiResult<Vec<clients::Model>> {
    let rows = clients::Entity::find()
        .order_by_desc(clients::Column::Id)
        .all(&state.db)
        .await?;

    Ok(CoreResponse::Ok(rows))
}

#[utoipa::path(
    post,
    path = "/",
    request_body = ClientPayload,
    responses((status = 201, body = clients::Model))
)]
async fn create(
    State(state): State<AppState>,
    Json(payload): Json<ClientPayload>,
) -> ApiResult<clients::Model> {
    let Some((name, email, phone)) = payload.validated() else {
        return Ok(CoreResponse::bad_request("Missing fields"));
    };

    let row = clients::ActiveModel {
        name: Set(name),
        email: Set(email),
        phone: Set(phone),
        ..Default::default()
    }
    .insert(&state.db)
    .await?;

    Ok(CoreResponse::Created(row))
}

#[utoipa::path(
    put,
    path = "/{id}",
    request_body = ClientPayload,
    responses((status = 200, body = clients::Model))
)]
async fn update(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(payload): Json<ClientPayload>,
) -> ApiResult<clients::Model> {
    let Some((name, email, phone)) = payload.validated() else {
        return Ok(CoreResponse::bad_request("Missing fields"));
    };

    let Some(existing) = clients::Entity::find_by_id(id).one(&state.db).await? else {
        return Ok(CoreResponse::not_found("Client not found"));
    };

    let mut active: clients::ActiveModel = existing.into();
    active.name = Set(name);
    active.email = Set(email);
    active.phone = Set(phone);

    let row = active.update(&state.db).await?;

    Ok(CoreResponse::Ok(row))
}

#[utoipa::path(
    delete,
    path = "/{id}",
    responses((status = 200, body = DeleteResponse))
)]
async fn remove(State(state): State<AppState>, Path(id): Path<i32>) -> ApiResult<DeleteResponse> {
    let res = clients::Entity::delete_by_id(id).exec(&state.db).await?;

    if res.rows_affected == 0 {
        return Ok(CoreResponse::not_found("Client not found"));
    }

    Ok(CoreResponse::Ok(DeleteResponse::ok()))
}
