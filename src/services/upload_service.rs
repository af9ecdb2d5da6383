use std::path::{Path, PathBuf};

use crate::dto::quiz_dto::UploadedImage;
use crate::error::{Error, Result};

const MAX_FILE_SIZE: usize = 5 * 1024 * 1024;
const ALLOWED_MIME_TYPES: &[&str] = &[
    "image/jpeg",
    "image/jpg",
    "image/png",
    "image/gif",
    "image/webp",
];
const ALLOWED_EXTENSIONS: &[&str] = &[".jpg", ".jpeg", ".png", ".gif", ".webp"];

/// Stores quiz asset images on the local filesystem. Files land under the
/// configured uploads directory and are served statically at `/uploads`.
#[derive(Clone)]
pub struct UploadService {
    upload_dir: PathBuf,
}

impl UploadService {
    pub fn new(upload_dir: impl Into<PathBuf>) -> Self {
        Self {
            upload_dir: upload_dir.into(),
        }
    }

    pub fn validate_image(&self, data: &[u8], mime_type: &str, original_name: &str) -> Result<()> {
        if data.len() > MAX_FILE_SIZE {
            return Err(Error::BadRequest(format!(
                "File too large. Maximum size is {}MB",
                MAX_FILE_SIZE / (1024 * 1024)
            )));
        }

        if !ALLOWED_MIME_TYPES.contains(&mime_type) {
            return Err(Error::BadRequest(format!(
                "Unsupported file type. Accepted types: {}",
                ALLOWED_MIME_TYPES.join(", ")
            )));
        }

        let ext = file_extension(original_name);
        if !ALLOWED_EXTENSIONS.contains(&ext.as_str()) {
            return Err(Error::BadRequest(format!(
                "Invalid file extension. Accepted extensions: {}",
                ALLOWED_EXTENSIONS.join(", ")
            )));
        }

        Ok(())
    }

    /// `{prefix}_{timestamp}_{random}{ext}`; the prefix is sanitized to
    /// alphanumerics and underscores.
    pub fn generate_file_name(&self, original_name: &str, prefix: &str) -> String {
        let timestamp = chrono::Utc::now().timestamp_millis();
        let random: String = uuid::Uuid::new_v4().simple().to_string()[..6].to_string();
        let ext = file_extension(original_name);
        let sanitized_prefix: String = prefix
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
            .collect();
        format!("{}_{}_{}{}", sanitized_prefix, timestamp, random, ext)
    }

    pub async fn save_image(
        &self,
        data: &[u8],
        original_name: &str,
        mime_type: &str,
        prefix: &str,
    ) -> Result<UploadedImage> {
        self.validate_image(data, mime_type, original_name)?;

        tokio::fs::create_dir_all(&self.upload_dir).await?;

        let file_name = self.generate_file_name(original_name, prefix);
        let target = self.upload_dir.join(&file_name);
        tokio::fs::write(&target, data).await?;

        tracing::info!(file = %target.display(), size = data.len(), "quiz image stored");

        Ok(UploadedImage {
            file_path: format!("uploads/{}", file_name),
            file_name,
            file_size: data.len(),
            mime_type: mime_type.to_string(),
            original_name: original_name.to_string(),
        })
    }
}

fn file_extension(name: &str) -> String {
    Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{}", e.to_ascii_lowercase()))
        .unwrap_or_default()
}
