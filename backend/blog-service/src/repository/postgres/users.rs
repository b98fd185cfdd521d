use super::PgRepository;
use crate::error::{AppError, Result};
use crate::models::{NewUser, User};
use crate::repository::UserRepository;
use async_trait::async_trait;

#[async_trait]
impl UserRepository for PgRepository {
    async fn create_user(&self, user: &NewUser) -> Result<User> {
        let created = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (email, password_hash, is_active, activation_code)
            VALUES ($1, $2, FALSE, $3)
            ON CONFLICT (email) DO NOTHING
            RETURNING id, email, password_hash, is_active, activation_code, created_at
            "#,
        )
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.activation_code)
        .fetch_optional(&self.pool)
        .await?;

        created.ok_or_else(|| AppError::Conflict("email already registered".to_string()))
    }

    async fn find_user(&self, user_id: i64) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, password_hash, is_active, activation_code, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, password_hash, is_active, activation_code, created_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn activate_user(&self, code: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET is_active = TRUE, activation_code = NULL
            WHERE activation_code = $1
            RETURNING id, email, password_hash, is_active, activation_code, created_at
            "#,
        )
        .bind(code)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }
}
