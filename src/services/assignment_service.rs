use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};

use crate::dto::assignment_dto::{
    AssignmentListQuery, AssignmentResponse, CreateUserQuizAssignmentPayload, LocationSummary,
    QuestionSummary, QuizDetail, QuizSummary, QuizUserEntry, UpdateUserQuizAssignmentPayload,
    UserSummary,
};
use crate::error::{Error, Result};
use crate::models::question::Question;
use crate::models::user::{User, UserRole};
use crate::models::user_quiz_assignment::UserQuizAssignment;
use crate::services::policy::{AdminOnlyPolicy, AssignmentPolicy};

const ALREADY_ASSIGNED: &str = "User is already assigned to this quiz";

/// Sole authority over user-quiz grants. Validation happens here; the
/// unique constraint on ("userId", "quizId") remains the authoritative
/// duplicate guard under concurrent creates.
#[derive(Clone)]
pub struct AssignmentService {
    pool: PgPool,
    policy: Arc<dyn AssignmentPolicy>,
}

pub struct AssignmentPage {
    pub items: Vec<AssignmentResponse>,
    pub total: i64,
    pub page: i64,
    pub limit: i64,
}

pub struct QuizPage {
    pub items: Vec<QuizDetail>,
    pub total: i64,
    pub page: i64,
    pub limit: i64,
}

pub struct QuizUserPage {
    pub items: Vec<QuizUserEntry>,
    pub total: i64,
    pub page: i64,
    pub limit: i64,
}

#[derive(FromRow)]
struct AssignmentJoinRow {
    id: i32,
    user_id: i32,
    quiz_id: i32,
    is_active: bool,
    assigned_by: Option<String>,
    notes: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    user_name: String,
    user_email: String,
    user_role: UserRole,
    user_is_active: bool,
    quiz_title: String,
    quiz_slug: String,
    quiz_image_url: Option<String>,
    quiz_location_id: Option<i32>,
    quiz_is_active: bool,
}

#[derive(FromRow)]
struct UserQuizRow {
    quiz_id: i32,
    title: String,
    slug: String,
    token: String,
    image_url: Option<String>,
    quiz_is_active: bool,
    location_id: Option<i32>,
    location_name: Option<String>,
}

#[derive(FromRow)]
struct QuizUserRow {
    assignment_id: i32,
    assigned_at: DateTime<Utc>,
    is_active: bool,
    user_id: i32,
    user_name: String,
    user_email: String,
    user_role: UserRole,
    user_is_active: bool,
}

const ASSIGNMENT_JOIN_SELECT: &str = r#"
    SELECT a.id, a."userId" AS user_id, a."quizId" AS quiz_id, a."isActive" AS is_active,
           a."assignedBy" AS assigned_by, a.notes,
           a."createdAt" AS created_at, a."updatedAt" AS updated_at,
           u."name" AS user_name, u.email AS user_email, u."role" AS user_role,
           u."isActive" AS user_is_active,
           q.title AS quiz_title, q.slug AS quiz_slug, q."imageUrl" AS quiz_image_url,
           q."locationId" AS quiz_location_id, q."isActive" AS quiz_is_active
    FROM user_quiz_assignments a
    JOIN users u ON u.id = a."userId"
    JOIN quizzes q ON q.id = a."quizId"
"#;

impl From<AssignmentJoinRow> for AssignmentResponse {
    fn from(row: AssignmentJoinRow) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            quiz_id: row.quiz_id,
            is_active: row.is_active,
            assigned_by: row.assigned_by,
            notes: row.notes,
            created_at: row.created_at,
            updated_at: row.updated_at,
            user: UserSummary {
                id: row.user_id,
                name: row.user_name,
                email: row.user_email,
                role: row.user_role,
                is_active: row.user_is_active,
            },
            quiz: QuizSummary {
                id: row.quiz_id,
                title: row.quiz_title,
                slug: row.quiz_slug,
                image_url: row.quiz_image_url,
                location_id: row.quiz_location_id,
                is_active: row.quiz_is_active,
            },
        }
    }
}

impl AssignmentService {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            policy: Arc::new(AdminOnlyPolicy),
        }
    }

    pub fn with_policy(pool: PgPool, policy: Arc<dyn AssignmentPolicy>) -> Self {
        Self { pool, policy }
    }

    pub async fn create(
        &self,
        payload: CreateUserQuizAssignmentPayload,
        assigned_by: &str,
    ) -> Result<AssignmentResponse> {
        let user = sqlx::query_as::<_, User>(
            r#"SELECT id, "name", email, "passwordHash", "role", "isActive", "createdAt", "updatedAt"
               FROM users WHERE id = $1"#,
        )
        .bind(payload.user_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| Error::NotFound("User not found".to_string()))?;

        self.policy.ensure_assignable(&user)?;

        let quiz_exists = sqlx::query_scalar::<_, i32>("SELECT id FROM quizzes WHERE id = $1")
            .bind(payload.quiz_id)
            .fetch_optional(&self.pool)
            .await?;
        if quiz_exists.is_none() {
            return Err(Error::NotFound("Quiz not found".to_string()));
        }

        // Advisory fast path; the unique constraint below is the real guard.
        let existing = sqlx::query_scalar::<_, i32>(
            r#"SELECT id FROM user_quiz_assignments WHERE "userId" = $1 AND "quizId" = $2"#,
        )
        .bind(payload.user_id)
        .bind(payload.quiz_id)
        .fetch_optional(&self.pool)
        .await?;
        if existing.is_some() {
            return Err(Error::BadRequest(ALREADY_ASSIGNED.to_string()));
        }

        let inserted = sqlx::query_scalar::<_, i32>(
            r#"
            INSERT INTO user_quiz_assignments ("userId", "quizId", "isActive", "assignedBy", notes)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(payload.user_id)
        .bind(payload.quiz_id)
        .bind(payload.is_active.unwrap_or(true))
        .bind(assigned_by)
        .bind(payload.notes.as_deref())
        .fetch_one(&self.pool)
        .await;

        let id = match inserted {
            Ok(id) => id,
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                return Err(Error::BadRequest(ALREADY_ASSIGNED.to_string()));
            }
            Err(other) => return Err(other.into()),
        };

        tracing::info!(
            assignment_id = id,
            user_id = payload.user_id,
            quiz_id = payload.quiz_id,
            assigned_by,
            "user assigned to quiz"
        );

        self.get_with_relations(id).await
    }

    pub async fn get_with_relations(&self, id: i32) -> Result<AssignmentResponse> {
        let query = format!("{} WHERE a.id = $1", ASSIGNMENT_JOIN_SELECT);
        let row = sqlx::query_as::<_, AssignmentJoinRow>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| Error::NotFound("User-quiz assignment not found".to_string()))?;
        Ok(row.into())
    }

    pub async fn list(&self, query: AssignmentListQuery) -> Result<AssignmentPage> {
        let (page, limit, offset) = page_params(query.page, query.limit);

        let mut filters = Vec::new();
        if query.user_id.is_some() {
            filters.push(format!(r#"a."userId" = ${}"#, filters.len() + 1));
        }
        if query.quiz_id.is_some() {
            filters.push(format!(r#"a."quizId" = ${}"#, filters.len() + 1));
        }
        if query.is_active.is_some() {
            filters.push(format!(r#"a."isActive" = ${}"#, filters.len() + 1));
        }
        let where_clause = if filters.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", filters.join(" AND "))
        };

        let items_query = format!(
            r#"{} {} ORDER BY a."createdAt" DESC, a.id DESC LIMIT ${} OFFSET ${}"#,
            ASSIGNMENT_JOIN_SELECT,
            where_clause,
            filters.len() + 1,
            filters.len() + 2
        );
        let total_query = format!(
            "SELECT COUNT(*) FROM user_quiz_assignments a {}",
            where_clause
        );

        let mut items_statement = sqlx::query_as::<_, AssignmentJoinRow>(&items_query);
        let mut total_statement = sqlx::query_scalar::<_, i64>(&total_query);
        if let Some(user_id) = query.user_id {
            items_statement = items_statement.bind(user_id);
            total_statement = total_statement.bind(user_id);
        }
        if let Some(quiz_id) = query.quiz_id {
            items_statement = items_statement.bind(quiz_id);
            total_statement = total_statement.bind(quiz_id);
        }
        if let Some(is_active) = query.is_active {
            items_statement = items_statement.bind(is_active);
            total_statement = total_statement.bind(is_active);
        }
        items_statement = items_statement.bind(limit).bind(offset);

        let rows = items_statement.fetch_all(&self.pool).await?;
        let total = total_statement.fetch_one(&self.pool).await?;

        Ok(AssignmentPage {
            items: rows.into_iter().map(Into::into).collect(),
            total,
            page,
            limit,
        })
    }

    /// Quiz side of a user's assignments, each quiz with its questions and
    /// location.
    pub async fn list_user_quizzes(
        &self,
        user_id: i32,
        page: Option<i64>,
        limit: Option<i64>,
        is_active: Option<bool>,
    ) -> Result<QuizPage> {
        let (page, limit, offset) = page_params(page, limit);

        let mut filters = vec![r#"a."userId" = $1"#.to_string()];
        if is_active.is_some() {
            filters.push(r#"a."isActive" = $2"#.to_string());
        }
        let where_clause = format!("WHERE {}", filters.join(" AND "));
        let next = filters.len() + 1;

        let items_query = format!(
            r#"
            SELECT q.id AS quiz_id, q.title, q.slug, q.token,
                   q."imageUrl" AS image_url, q."isActive" AS quiz_is_active,
                   c.id AS location_id, c."name" AS location_name
            FROM user_quiz_assignments a
            JOIN quizzes q ON q.id = a."quizId"
            LEFT JOIN config_items c ON c.id = q."locationId"
            {}
            ORDER BY a."createdAt" DESC, a.id DESC
            LIMIT ${} OFFSET ${}
            "#,
            where_clause,
            next,
            next + 1
        );
        let total_query = format!(
            "SELECT COUNT(*) FROM user_quiz_assignments a {}",
            where_clause
        );

        let mut items_statement = sqlx::query_as::<_, UserQuizRow>(&items_query).bind(user_id);
        let mut total_statement = sqlx::query_scalar::<_, i64>(&total_query).bind(user_id);
        if let Some(is_active) = is_active {
            items_statement = items_statement.bind(is_active);
            total_statement = total_statement.bind(is_active);
        }
        items_statement = items_statement.bind(limit).bind(offset);

        let rows = items_statement.fetch_all(&self.pool).await?;
        let total = total_statement.fetch_one(&self.pool).await?;

        let quiz_ids: Vec<i32> = rows.iter().map(|r| r.quiz_id).collect();
        let mut questions_by_quiz: HashMap<i32, Vec<QuestionSummary>> = HashMap::new();
        if !quiz_ids.is_empty() {
            let questions = sqlx::query_as::<_, Question>(
                r#"
                SELECT id, "quizId", "questionText", options, "correctOption", "sortOrder",
                       "createdAt", "updatedAt"
                FROM questions
                WHERE "quizId" = ANY($1)
                ORDER BY "sortOrder", id
                "#,
            )
            .bind(&quiz_ids)
            .fetch_all(&self.pool)
            .await?;
            for question in questions {
                questions_by_quiz
                    .entry(question.quiz_id)
                    .or_default()
                    .push(QuestionSummary {
                        id: question.id,
                        question_text: question.question_text,
                        options: question.options,
                        correct_option: question.correct_option,
                        sort_order: question.sort_order,
                    });
            }
        }

        let items = rows
            .into_iter()
            .map(|row| QuizDetail {
                id: row.quiz_id,
                title: row.title,
                slug: row.slug,
                token: row.token,
                image_url: row.image_url,
                is_active: row.quiz_is_active,
                location: match (row.location_id, row.location_name) {
                    (Some(id), Some(name)) => Some(LocationSummary { id, name }),
                    _ => None,
                },
                questions: questions_by_quiz.remove(&row.quiz_id).unwrap_or_default(),
            })
            .collect();

        Ok(QuizPage {
            items,
            total,
            page,
            limit,
        })
    }

    pub async fn list_quiz_users(
        &self,
        quiz_id: i32,
        page: Option<i64>,
        limit: Option<i64>,
        is_active: Option<bool>,
    ) -> Result<QuizUserPage> {
        let (page, limit, offset) = page_params(page, limit);

        let mut filters = vec![r#"a."quizId" = $1"#.to_string()];
        if is_active.is_some() {
            filters.push(r#"a."isActive" = $2"#.to_string());
        }
        let where_clause = format!("WHERE {}", filters.join(" AND "));
        let next = filters.len() + 1;

        let items_query = format!(
            r#"
            SELECT a.id AS assignment_id, a."createdAt" AS assigned_at, a."isActive" AS is_active,
                   u.id AS user_id, u."name" AS user_name, u.email AS user_email,
                   u."role" AS user_role, u."isActive" AS user_is_active
            FROM user_quiz_assignments a
            JOIN users u ON u.id = a."userId"
            {}
            ORDER BY a."createdAt" DESC, a.id DESC
            LIMIT ${} OFFSET ${}
            "#,
            where_clause,
            next,
            next + 1
        );
        let total_query = format!(
            "SELECT COUNT(*) FROM user_quiz_assignments a {}",
            where_clause
        );

        let mut items_statement = sqlx::query_as::<_, QuizUserRow>(&items_query).bind(quiz_id);
        let mut total_statement = sqlx::query_scalar::<_, i64>(&total_query).bind(quiz_id);
        if let Some(is_active) = is_active {
            items_statement = items_statement.bind(is_active);
            total_statement = total_statement.bind(is_active);
        }
        items_statement = items_statement.bind(limit).bind(offset);

        let rows = items_statement.fetch_all(&self.pool).await?;
        let total = total_statement.fetch_one(&self.pool).await?;

        let items = rows
            .into_iter()
            .map(|row| QuizUserEntry {
                assignment_id: row.assignment_id,
                assigned_at: row.assigned_at,
                is_active: row.is_active,
                user: UserSummary {
                    id: row.user_id,
                    name: row.user_name,
                    email: row.user_email,
                    role: row.user_role,
                    is_active: row.user_is_active,
                },
            })
            .collect();

        Ok(QuizUserPage {
            items,
            total,
            page,
            limit,
        })
    }

    /// Soft-revocation / note editing. Fields left out of the payload keep
    /// their current value.
    pub async fn update(
        &self,
        id: i32,
        payload: UpdateUserQuizAssignmentPayload,
    ) -> Result<AssignmentResponse> {
        let updated = sqlx::query_scalar::<_, i32>(
            r#"
            UPDATE user_quiz_assignments
            SET "isActive" = COALESCE($1, "isActive"),
                notes = COALESCE($2, notes),
                "updatedAt" = NOW()
            WHERE id = $3
            RETURNING id
            "#,
        )
        .bind(payload.is_active)
        .bind(payload.notes.as_deref())
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        match updated {
            Some(id) => self.get_with_relations(id).await,
            None => Err(Error::NotFound(
                "User-quiz assignment not found".to_string(),
            )),
        }
    }

    /// Hard delete. Soft revocation goes through `update`.
    pub async fn remove(&self, id: i32) -> Result<()> {
        let result = sqlx::query("DELETE FROM user_quiz_assignments WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(Error::NotFound(
                "User-quiz assignment not found".to_string(),
            ));
        }
        tracing::info!(assignment_id = id, "user-quiz assignment removed");
        Ok(())
    }

    /// The unique active grant for the pair, if any. Capability check for
    /// quiz-access authorization.
    pub async fn find_by_user_and_quiz(
        &self,
        user_id: i32,
        quiz_id: i32,
    ) -> Result<Option<UserQuizAssignment>> {
        let assignment = sqlx::query_as::<_, UserQuizAssignment>(
            r#"
            SELECT id, "userId", "quizId", "isActive", "assignedBy", notes,
                   "createdAt", "updatedAt"
            FROM user_quiz_assignments
            WHERE "userId" = $1 AND "quizId" = $2 AND "isActive" = true
            "#,
        )
        .bind(user_id)
        .bind(quiz_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(assignment)
    }
}

/// Normalizes 1-indexed pagination: page >= 1, limit in 1..=100
/// (default 10), offset = (page - 1) * limit.
pub fn page_params(page: Option<i64>, limit: Option<i64>) -> (i64, i64, i64) {
    let page = page.unwrap_or(1).max(1);
    let limit = limit.unwrap_or(10).clamp(1, 100);
    (page, limit, (page - 1) * limit)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_params_defaults() {
        assert_eq!(page_params(None, None), (1, 10, 0));
    }

    #[test]
    fn page_params_offsets_are_one_indexed() {
        assert_eq!(page_params(Some(2), Some(10)), (2, 10, 10));
        assert_eq!(page_params(Some(3), Some(25)), (3, 25, 50));
    }

    #[test]
    fn page_params_clamps_bad_input() {
        assert_eq!(page_params(Some(0), Some(0)), (1, 1, 0));
        assert_eq!(page_params(Some(-4), Some(1000)), (1, 100, 0));
    }
}
