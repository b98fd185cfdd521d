use super::PgRepository;
use crate::error::{AppError, Result};
use crate::models::{EntityRef, Tag, TagKind};
use crate::repository::TagRepository;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

#[derive(sqlx::FromRow)]
struct TagRow {
    id: i64,
    tag_kind: String,
    entity_kind: String,
    entity_id: i64,
    user_id: i64,
    created_at: DateTime<Utc>,
}

impl TryFrom<TagRow> for Tag {
    type Error = AppError;

    fn try_from(row: TagRow) -> Result<Self> {
        Ok(Tag {
            id: row.id,
            kind: row.tag_kind.parse().map_err(AppError::Database)?,
            target: EntityRef {
                kind: row.entity_kind.parse().map_err(AppError::Database)?,
                id: row.entity_id,
            },
            user_id: row.user_id,
            created_at: row.created_at,
        })
    }
}

#[async_trait]
impl TagRepository for PgRepository {
    async fn get_or_create_tag(
        &self,
        kind: TagKind,
        target: EntityRef,
        user_id: i64,
    ) -> Result<Tag> {
        // The no-op update makes RETURNING yield the existing row on conflict.
        let row = sqlx::query_as::<_, TagRow>(
            r#"
            INSERT INTO tags (tag_kind, entity_kind, entity_id, user_id)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (tag_kind, entity_kind, entity_id, user_id) DO UPDATE
            SET user_id = EXCLUDED.user_id
            RETURNING id, tag_kind, entity_kind, entity_id, user_id, created_at
            "#,
        )
        .bind(kind.as_str())
        .bind(target.kind.as_str())
        .bind(target.id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        row.try_into()
    }

    async fn delete_tag(&self, kind: TagKind, target: EntityRef, user_id: i64) -> Result<bool> {
        let result = sqlx::query(
            r#"
            DELETE FROM tags
            WHERE tag_kind = $1 AND entity_kind = $2 AND entity_id = $3 AND user_id = $4
            "#,
        )
        .bind(kind.as_str())
        .bind(target.kind.as_str())
        .bind(target.id)
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn tag_exists(&self, kind: TagKind, target: EntityRef, user_id: i64) -> Result<bool> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM tags
                WHERE tag_kind = $1 AND entity_kind = $2 AND entity_id = $3 AND user_id = $4
            )
            "#,
        )
        .bind(kind.as_str())
        .bind(target.kind.as_str())
        .bind(target.id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn count_tags(&self, kind: TagKind, target: EntityRef) -> Result<i64> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM tags
            WHERE tag_kind = $1 AND entity_kind = $2 AND entity_id = $3
            "#,
        )
        .bind(kind.as_str())
        .bind(target.kind.as_str())
        .bind(target.id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }
}
