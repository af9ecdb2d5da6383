use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[sqlx(rename_all = "camelCase")]
pub struct Quiz {
    pub id: i32,
    pub title: String,
    pub slug: String,
    pub token: String,
    pub image_url: Option<String>,
    pub location_id: Option<i32>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
