use axum::{response::IntoResponse, http::StatusCode, Json};

#[derive(Debug, Clone, serde::Serialize, utoipa::ToSchema)]
pub struct ErrorMessage {
    pub message: String,
}

impl ErrorMessage {
    pub fn new(message: impl Into<String>) -> Self {
        ErrorMessage { message: message.into() }
    }
}

#[derive(utoipa::IntoResponses)]
pub enum CoreResponse<T>
where T: serde::Serialize + utoipa::ToSchema
{
    #[response(status = 200, description = "Ok")]
    Ok(T),

    #[response(status = 201, description = "Created")]
    Created(T),

    #[response(status = 400, description = "Invalid payload")]
    BadRequest(ErrorMessage),

    #[response(status = 404, description = "Not found")]
    NotFound(ErrorMessage),
}

impl<T> CoreResponse<T>
where T: serde::Serialize + utoipa::ToSchema
{
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(ErrorMessage::new(message))
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(ErrorMessage::new(message))
    }
}

impl<T> IntoResponse for CoreResponse<T>
where T: serde::Serialize + utoipa::ToSchema
{
    fn into_response(self) -> axum::response::Response {
        match self {
            Self::Ok(data) => (StatusCode::OK, Json(data)).into_response(),
            Self::Created(data) => (StatusCode::CREATED, Json(data)).into_response(),
            Self::BadRequest(error) => (StatusCode::BAD_REQUEST, Json(error)).into_response(),
            Self::NotFound(error) => (StatusCode::NOT_FOUND, Json(error)).into_response(),
        }
    }
}

/// Unexpected failure inside a handler. Logged and surfaced as a 500 with a
/// generic body; anything that should map to 4xx belongs in [`CoreResponse`].
pub struct ApiError(anyhow::Error);

pub type ApiResult<T> = Result<CoreResponse<T>, ApiError>;

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        tracing::error!(error = ?self.0, "request failed");

        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorMessage::new("internal server error")),
        )
            .into_response()
    }
}

impl<E> From<E> for ApiError
where E: Into<anyhow::Error>
{
    fn from(err: E) -> Self {
        ApiError(err.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn core_response_maps_status_codes() {
        let ok: CoreResponse<ErrorMessage> = CoreResponse::Ok(ErrorMessage::new("fine"));
        assert_eq!(ok.into_response().status(), StatusCode::OK);

        let created: CoreResponse<ErrorMessage> = CoreResponse::Created(ErrorMessage::new("row"));
        assert_eq!(created.into_response().status(), StatusCode::CREATED);

        let bad: CoreResponse<ErrorMessage> = CoreResponse::bad_request("missing fields");
        assert_eq!(bad.into_response().status(), StatusCode::BAD_REQUEST);

        let missing: CoreResponse<ErrorMessage> = CoreResponse::not_found("no such row");
        assert_eq!(missing.into_response().status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn api_error_is_opaque_500() {
        let err: ApiError = anyhow::anyhow!("db exploded").into();
        assert_eq!(
            err.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
