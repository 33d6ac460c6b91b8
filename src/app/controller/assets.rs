use axum::body::Bytes;
use axum::extract::{Multipart, Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use chrono::NaiveDateTime;
use lizsys_core::controller::Controller;
use lizsys_core::response::{ApiError, ApiResult, CoreResponse, ErrorMessage};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set,
};
use utoipa::OpenApi;

use crate::app::entity::{asset_documents, assets};
use crate::app::response::{DeleteResponse, SimpleResponse};
use crate::app::state::AppState;
use crate::app::uploads;

pub struct AssetsController;

#[derive(OpenApi)]
#[openapi(
    paths(
        list,
        create,
        update,
        remove,
        upload_document,
        upload_files,
        list_documents,
        download_document,
        remove_document
    ),
    components(schemas(assets::Model, AssetPayload, DocumentResponse))
)]
pub struct AssetsApi;

impl Controller for AssetsController {
    type State = AppState;

    fn router() -> Router<AppState> {
        Router::new()
            .route("/", get(list).post(create))
            .route("/{id}", put(update).delete(remove))
            .route("/{id}/documents", get(list_documents).post(upload_document))
            // Older clients fetch the same listing under /files.
            .route("/{id}/files", get(list_documents))
            .route("/{id}/upload", post(upload_files))
            // GET takes a filename, DELETE a document id; they share the slot.
            .route(
                "/{id}/documents/{key}",
                get(download_document).delete(remove_document),
            )
    }
}

#[derive(serde::Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AssetPayload {
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub vin: Option<String>,
    pub status: Option<String>,
    pub location: Option<String>,
    pub inspection_date: Option<chrono::NaiveDate>,
    pub maintenance_info: Option<String>,
    pub insurance_info: Option<String>,
    pub client_id: Option<i32>,
}

struct ValidAsset {
    name: String,
    kind: String,
    status: String,
    client_id: i32,
}

impl AssetPayload {
    fn validated(&self) -> Option<ValidAsset> {
        let name = self.name.as_deref()?.trim();
        let kind = self.kind.as_deref()?.trim();
        let status = self.status.as_deref()?.trim();
        let client_id = self.client_id?;

        if name.is_empty() || kind.is_empty() || status.is_empty() {
            return None;
        }

        Some(ValidAsset {
            name: name.to_string(),
            kind: kind.to_string(),
            status: status.to_string(),
            client_id,
        })
    }
}

#[utoipa::path(
    get,
    path = "/",
    responses((status = 200, description = "All assets, newest first", body = Vec<assets::Model>))
)]
async fn list(State(state): State<AppState>) -> ApiResult<Vec<assets::Model>> {
    let rows = assets::Entity::find()
        .order_by_desc(assets::Column::Id)
        .all(&state.db)
        .await?;

    Ok(CoreResponse::Ok(rows))
}

#[utoipa::path(
    post,
    path = "/",
    request_body = AssetPayload,
    responses((status = 201, body = assets::Model), (status = 400, body = ErrorMessage))
)]
async fn create(
    State(state): State<AppState>,
    Json(payload): Json<AssetPayload>,
) -> ApiResult<assets::Model> {
    let Some(valid) = payload.validated() else {
        return Ok(CoreResponse::bad_request("Missing required fields"));
    };

    let row = assets::ActiveModel {
        name: Set(valid.name),
        kind: Set(valid.kind),
        vin: Set(payload.vin),
        status: Set(valid.status),
        location: Set(payload.location),
        inspection_date: Set(payload.inspection_date),
        maintenance_info: Set(payload.maintenance_info),
        insurance_info: Set(payload.insurance_info),
        client_id: Set(valid.client_id),
        ..Default::default()
    }
    .insert(&state.db)
    .await?;

    Ok(CoreResponse::Created(row))
}

#[utoipa::path(
    put,
    path = "/{id}",
    request_body = AssetPayload,
    responses(
        (status = 200, body = assets::Model),
        (status = 400, body = ErrorMessage),
        (status = 404, body = ErrorMessage)
    )
)]
async fn update(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(payload): Json<AssetPayload>,
) -> ApiResult<assets::Model> {
    let Some(valid) = payload.validated() else {
        return Ok(CoreResponse::bad_request("Missing required fields"));
    };

    let Some(existing) = assets::Entity::find_by_id(id).one(&state.db).await? else {
        return Ok(CoreResponse::not_found("Asset not found"));
    };

    let mut active: assets::ActiveModel = existing.into();
    active.name = Set(valid.name);
    active.kind = Set(valid.kind);
    active.vin = Set(payload.vin);
    active.status = Set(valid.status);
    active.location = Set(payload.location);
    active.inspection_date = Set(payload.inspection_date);
    active.maintenance_info = Set(payload.maintenance_info);
    active.insurance_info = Set(payload.insurance_info);
    active.client_id = Set(valid.client_id);

    let row = active.update(&state.db).await?;

    Ok(CoreResponse::Ok(row))
}

#[utoipa::path(
    delete,
    path = "/{id}",
    responses((status = 200, body = DeleteResponse), (status = 404, body = ErrorMessage))
)]
async fn remove(State(state): State<AppState>, Path(id): Path<i32>) -> ApiResult<DeleteResponse> {
    let res = assets::Entity::delete_by_id(id).exec(&state.db).await?;

    if res.rows_affected == 0 {
        return Ok(CoreResponse::not_found("Asset not found"));
    }

    Ok(CoreResponse::Ok(DeleteResponse::ok()))
}

struct DocumentUpload {
    filename: String,
    bytes: Bytes,
}

async fn read_file_field(
    field: axum::extract::multipart::Field<'_>,
) -> Result<DocumentUpload, String> {
    let filename = field
        .file_name()
        .and_then(uploads::sanitize_filename)
        .map(str::to_string)
        .ok_or_else(|| "Invalid filename".to_string())?;

    let bytes = field
        .bytes()
        .await
        .map_err(|_| "Malformed multipart body".to_string())?;

    Ok(DocumentUpload { filename, bytes })
}

async fn store_document(
    state: &AppState,
    asset_id: i32,
    doc_type: &str,
    upload: DocumentUpload,
) -> Result<asset_documents::Model, ApiError> {
    let dir = uploads::asset_dir(&state.upload_dir, asset_id);
    let stored_name = uploads::timestamped(&upload.filename);
    let path = uploads::store(&dir, &stored_name, &upload.bytes).await?;

    let row = asset_documents::ActiveModel {
        asset_id: Set(asset_id),
        doc_type: Set(doc_type.to_string()),
        filename: Set(stored_name),
        filepath: Set(path.to_string_lossy().into_owned()),
        ..Default::default()
    }
    .insert(&state.db)
    .await?;

    Ok(row)
}

#[utoipa::path(
    post,
    path = "/{id}/documents",
    responses(
        (status = 201, body = SimpleResponse),
        (status = 400, body = ErrorMessage),
        (status = 404, body = ErrorMessage)
    )
)]
async fn upload_document(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    mut parts: Multipart,
) -> ApiResult<SimpleResponse> {
    if assets::Entity::find_by_id(id).one(&state.db).await?.is_none() {
        return Ok(CoreResponse::not_found("Asset not found"));
    }

    let mut doc_type = "document".to_string();
    let mut file = None;

    while let Ok(Some(field)) = parts.next_field().await {
        let name = field.name().unwrap_or_default().to_string();

        match name.as_str() {
            "type" => {
                if let Ok(value) = field.text().await {
                    doc_type = value;
                }
            }
            "document" => match read_file_field(field).await {
                Ok(upload) => file = Some(upload),
                Err(message) => return Ok(CoreResponse::bad_request(message)),
            },
            _ => {}
        }
    }

    let Some(upload) = file else {
        return Ok(CoreResponse::bad_request("No file uploaded"));
    };

    store_document(&state, id, &doc_type, upload).await?;

    Ok(CoreResponse::Created(SimpleResponse::new(
        "Document uploaded",
    )))
}

#[utoipa::path(
    post,
    path = "/{id}/upload",
    responses(
        (status = 201, body = SimpleResponse),
        (status = 400, body = ErrorMessage),
        (status = 404, body = ErrorMessage)
    )
)]
async fn upload_files(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    mut parts: Multipart,
) -> ApiResult<SimpleResponse> {
    if assets::Entity::find_by_id(id).one(&state.db).await?.is_none() {
        return Ok(CoreResponse::not_found("Asset not found"));
    }

    let mut stored = 0usize;

    while let Ok(Some(field)) = parts.next_field().await {
        let name = field.name().unwrap_or_default().to_string();

        let doc_type = match name.as_str() {
            "maintenanceFile" => "maintenance",
            "insuranceFile" => "insurance",
            _ => continue,
        };

        match read_file_field(field).await {
            Ok(upload) => {
                store_document(&state, id, doc_type, upload).await?;
                stored += 1;
            }
            Err(message) => return Ok(CoreResponse::bad_request(message)),
        }
    }

    if stored == 0 {
        return Ok(CoreResponse::bad_request("No files uploaded"));
    }

    Ok(CoreResponse::Created(SimpleResponse::new(
        "Files uploaded",
    )))
}

#[derive(serde::Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DocumentResponse {
    pub id: i32,
    pub asset_id: i32,
    pub doc_type: String,
    pub filename: String,
    pub filepath: String,
    pub uploaded_at: NaiveDateTime,
    pub url: String,
}

impl DocumentResponse {
    fn from_model(doc: asset_documents::Model) -> Self {
        let url = format!("/api/assets/{}/documents/{}", doc.asset_id, doc.filename);

        DocumentResponse {
            id: doc.id,
            asset_id: doc.asset_id,
            doc_type: doc.doc_type,
            filename: doc.filename,
            filepath: doc.filepath,
            uploaded_at: doc.uploaded_at,
            url,
        }
    }
}

#[utoipa::path(
    get,
    path = "/{id}/documents",
    responses((status = 200, body = Vec<DocumentResponse>))
)]
async fn list_documents(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> ApiResult<Vec<DocumentResponse>> {
    let docs = asset_documents::Entity::find()
        .filter(asset_documents::Column::AssetId.eq(id))
        .order_by_desc(asset_documents::Column::UploadedAt)
        .all(&state.db)
        .await?;

    Ok(CoreResponse::Ok(
        docs.into_iter().map(DocumentResponse::from_model).collect(),
    ))
}

#[utoipa::path(
    get,
    path = "/{id}/documents/{filename}",
    responses((status = 200, description = "Stored document"), (status = 404, body = ErrorMessage))
)]
async fn download_document(
    State(state): State<AppState>,
    Path((id, filename)): Path<(i32, String)>,
) -> Result<Response, ApiError> {
    let not_found = || CoreResponse::<SimpleResponse>::not_found("File not found").into_response();

    let Some(filename) = uploads::sanitize_filename(&filename) else {
        return Ok(not_found());
    };

    let path = uploads::asset_dir(&state.upload_dir, id).join(filename);

    let Ok(bytes) = tokio::fs::read(&path).await else {
        return Ok(not_found());
    };

    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, uploads::content_type_for(filename))],
        bytes,
    )
        .into_response())
}

#[utoipa::path(
    delete,
    path = "/{id}/documents/{doc_id}",
    responses((status = 200, body = DeleteResponse), (status = 404, body = ErrorMessage))
)]
async fn remove_document(
    State(state): State<AppState>,
    Path((_id, doc_id)): Path<(i32, String)>,
) -> ApiResult<DeleteResponse> {
    let Ok(doc_id) = doc_id.parse::<i32>() else {
        return Ok(CoreResponse::not_found("Document not found"));
    };

    let Some(doc) = asset_documents::Entity::find_by_id(doc_id)
        .one(&state.db)
        .await?
    else {
        return Ok(CoreResponse::not_found("Document not found"));
    };

    uploads::remove(std::path::Path::new(&doc.filepath)).await;

    asset_documents::Entity::delete_by_id(doc.id)
        .exec(&state.db)
        .await?;

    Ok(CoreResponse::Ok(DeleteResponse::ok()))
}
