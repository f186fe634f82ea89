use std::path::{Path, PathBuf};

use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::errors::AppError;
use crate::store::new_id;
use crate::uploads::classify::{self, DocumentType, MAX_FILE_BYTES};

/// One file part received from the multipart body.
#[derive(Debug)]
pub struct IncomingFile {
    pub name: String,
    pub content_type: String,
    pub data: Bytes,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredFile {
    pub id: String,
    pub name: String,
    pub original_name: String,
    pub size: usize,
    #[serde(rename = "type")]
    pub content_type: String,
    pub document_type: DocumentType,
    pub path: String,
    pub uploaded_at: DateTime<Utc>,
}

/// Rejects the whole batch if any file is too large or of a disallowed type.
pub fn validate(files: &[IncomingFile]) -> Result<(), AppError> {
    if files.is_empty() {
        return Err(AppError::Upload("No files found".to_string()));
    }
    for file in files {
        if file.data.len() > MAX_FILE_BYTES {
            return Err(AppError::Upload(format!(
                "File {} is too large. Maximum size: 10MB",
                file.name
            )));
        }
        if !classify::is_allowed_mime(&file.content_type) {
            return Err(AppError::Upload(format!(
                "File type of {} is not supported",
                file.name
            )));
        }
    }
    Ok(())
}

fn target_path(dir: &Path, original: &str) -> PathBuf {
    let millis = Utc::now().timestamp_millis();
    dir.join(format!("{millis}_{}", classify::sanitise_name(original)))
}

/// Validates then writes every file under `dir`, creating it if needed.
pub async fn store_all(dir: &Path, files: Vec<IncomingFile>) -> Result<Vec<StoredFile>, AppError> {
    validate(&files)?;
    tokio::fs::create_dir_all(dir).await?;

    let mut stored = Vec::with_capacity(files.len());
    for file in files {
        let path = target_path(dir, &file.name);
        tokio::fs::write(&path, &file.data).await?;
        tracing::info!("Stored upload {} ({} bytes)", path.display(), file.data.len());

        stored.push(StoredFile {
            id: new_id(),
            document_type: classify::document_type(&file.name),
            name: file.name.clone(),
            original_name: file.name,
            size: file.data.len(),
            content_type: file.content_type,
            path: path.display().to_string(),
            uploaded_at: Utc::now(),
        });
    }
    Ok(stored)
}
