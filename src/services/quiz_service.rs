use sqlx::PgPool;

use crate::error::{Error, Result};
use crate::models::quiz::Quiz;

#[derive(Clone)]
pub struct QuizService {
    pool: PgPool,
}

impl QuizService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn get_by_id(&self, id: i32) -> Result<Quiz> {
        let quiz = sqlx::query_as::<_, Quiz>(
            r#"SELECT id, title, slug, token, "imageUrl", "locationId", "isActive", "createdAt", "updatedAt"
               FROM quizzes WHERE id = $1"#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| Error::NotFound("Quiz not found".to_string()))?;
        Ok(quiz)
    }

    pub async fn set_image_url(&self, id: i32, image_url: &str) -> Result<Quiz> {
        let quiz = sqlx::query_as::<_, Quiz>(
            r#"
            UPDATE quizzes
            SET "imageUrl" = $1, "updatedAt" = NOW()
            WHERE id = $2
            RETURNING id, title, slug, token, "imageUrl", "locationId", "isActive", "createdAt", "updatedAt"
            "#,
        )
        .bind(image_url)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| Error::NotFound("Quiz not found".to_string()))?;
        Ok(quiz)
    }
}
