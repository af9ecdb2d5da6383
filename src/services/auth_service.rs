use jsonwebtoken::{encode, EncodingKey, Header};
use sqlx::PgPool;

use crate::config::get_config;
use crate::error::{Error, Result};
use crate::middleware::auth::Claims;
use crate::models::user::{User, UserRole};
use crate::utils::crypto::verify_password;

#[derive(Clone)]
pub struct AuthService {
    pool: PgPool,
}

impl AuthService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn get_by_email(&self, email: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"SELECT id, "name", email, "passwordHash", "role", "isActive", "createdAt", "updatedAt"
               FROM users WHERE email = $1"#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<(String, User)> {
        let user = self
            .get_by_email(email)
            .await?
            .ok_or_else(|| Error::Unauthorized("Invalid credentials".to_string()))?;

        if !user.is_active {
            return Err(Error::Unauthorized("Account is disabled".to_string()));
        }

        let valid = verify_password(password, &user.password_hash)
            .map_err(|e| Error::Internal(format!("Password verification failed: {}", e)))?;
        if !valid {
            return Err(Error::Unauthorized("Invalid credentials".to_string()));
        }

        let token = Self::issue_token(&user.email, user.role)?;
        tracing::info!(user_id = user.id, email = %user.email, "user logged in");
        Ok((token, user))
    }

    /// HS256 token with the acting user's email as subject. The email is
    /// what gets stamped into `assignedBy` on assignment creation.
    pub fn issue_token(email: &str, role: UserRole) -> Result<String> {
        let config = get_config();
        let expires_at = chrono::Utc::now() + chrono::Duration::hours(config.jwt_expires_hours);
        let claims = Claims {
            sub: email.to_string(),
            exp: expires_at.timestamp() as usize,
            role: Some(role.as_str().to_string()),
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
        )
        .map_err(|e| Error::Internal(format!("Failed to issue token: {}", e)))
    }
}
