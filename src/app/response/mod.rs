#[derive(serde::Serialize, utoipa::ToSchema)]
pub struct SimpleResponse {
    pub message: String,
}

impl SimpleResponse {
    pub fn new(message: impl Into<String>) -> Self {
        SimpleResponse { message: message.into() }
    }
}

#[derive(serde::Serialize, utoipa::ToSchema)]
pub struct DeleteResponse {
    pub success: bool,
}

impl DeleteResponse {
    pub fn ok() -> Self {
        DeleteResponse { success: true }
    }
}
