use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use validator::Validate;

use crate::models::user::{User, UserRole};

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateUserQuizAssignmentPayload {
    #[validate(range(min = 1))]
    pub user_id: i32,
    #[validate(range(min = 1))]
    pub quiz_id: i32,
    pub is_active: Option<bool>,
    #[validate(length(max = 255))]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpdateUserQuizAssignmentPayload {
    pub is_active: Option<bool>,
    #[validate(length(max = 255))]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AssignmentListQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub user_id: Option<i32>,
    pub quiz_id: Option<i32>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AssignmentSideQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub role: UserRole,
    pub is_active: bool,
}

impl From<User> for UserSummary {
    fn from(value: User) -> Self {
        Self {
            id: value.id,
            name: value.name,
            email: value.email,
            role: value.role,
            is_active: value.is_active,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizSummary {
    pub id: i32,
    pub title: String,
    pub slug: String,
    pub image_url: Option<String>,
    pub location_id: Option<i32>,
    pub is_active: bool,
}

/// Assignment joined with its user and quiz projections.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssignmentResponse {
    pub id: i32,
    pub user_id: i32,
    pub quiz_id: i32,
    pub is_active: bool,
    pub assigned_by: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub user: UserSummary,
    pub quiz: QuizSummary,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationSummary {
    pub id: i32,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionSummary {
    pub id: i32,
    pub question_text: String,
    pub options: Option<JsonValue>,
    pub correct_option: Option<i32>,
    pub sort_order: i32,
}

/// Quiz side of a user's assignments, with nested questions and location.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizDetail {
    pub id: i32,
    pub title: String,
    pub slug: String,
    pub token: String,
    pub image_url: Option<String>,
    pub is_active: bool,
    pub location: Option<LocationSummary>,
    pub questions: Vec<QuestionSummary>,
}

/// One user assigned to a quiz.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizUserEntry {
    pub assignment_id: i32,
    pub assigned_at: DateTime<Utc>,
    pub is_active: bool,
    pub user: UserSummary,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_query_defaults_to_no_filters() {
        let query: AssignmentListQuery = serde_json::from_str("{}").unwrap();
        assert!(query.page.is_none());
        assert!(query.user_id.is_none());
        assert!(query.is_active.is_none());
    }

    #[test]
    fn create_payload_rejects_non_positive_ids() {
        let payload = CreateUserQuizAssignmentPayload {
            user_id: 0,
            quiz_id: 9,
            is_active: None,
            notes: None,
        };
        assert!(payload.validate().is_err());
    }
}
