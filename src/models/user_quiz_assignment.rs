use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// One user-to-quiz grant. The (user_id, quiz_id) pair is unique for the
/// lifetime of the row; revocation flips `is_active` instead of deleting.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[sqlx(rename_all = "camelCase")]
pub struct UserQuizAssignment {
    pub id: i32,
    pub user_id: i32,
    pub quiz_id: i32,
    pub is_active: bool,
    pub assigned_by: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
