use std::path::Path;

use axum::{
    extract::{Multipart, State},
    Json,
};
use serde::Serialize;

use crate::errors::AppError;
use crate::state::AppState;
use crate::uploads::storage::{self, IncomingFile, StoredFile};

const FILE_FIELD: &str = "files";

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub success: bool,
    pub files: Vec<StoredFile>,
    pub message: String,
}

/// POST /api/upload
pub async fn handle_upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, AppError> {
    let mut files = Vec::new();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Upload(e.body_text()))?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        let name = field.file_name().unwrap_or("upload").to_string();
        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::Upload(e.body_text()))?;
        files.push(IncomingFile {
            name,
            content_type,
            data,
        });
    }

    let stored = storage::store_all(Path::new(&state.config.upload_dir), files).await?;
    Ok(Json(UploadResponse {
        success: true,
        message: format!("Uploaded {} files", stored.len()),
        files: stored,
    }))
}
