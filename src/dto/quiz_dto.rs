use serde::{Deserialize, Serialize};

/// Metadata of a stored quiz image.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadedImage {
    pub file_name: String,
    pub file_path: String,
    pub file_size: usize,
    pub mime_type: String,
    pub original_name: String,
}

/// Shareable links for a quiz: the canonical frontend URL and its
/// shortened form (equal to the normal URL when shortening is unavailable).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizLinks {
    pub normal_url: String,
    pub short_url: String,
}
