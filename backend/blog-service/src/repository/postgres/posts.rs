use super::PgRepository;
use crate::error::Result;
use crate::models::{NewPost, Post, PostChanges, PostImage};
use crate::repository::{PostFilter, PostRepository};
use async_trait::async_trait;

#[async_trait]
impl PostRepository for PgRepository {
    async fn create_post(&self, post: &NewPost, image_keys: &[String]) -> Result<Post> {
        let mut tx = self.pool.begin().await?;

        let created = sqlx::query_as::<_, Post>(
            r#"
            INSERT INTO posts (author_id, category_slug, title, text)
            VALUES ($1, $2, $3, $4)
            RETURNING id, author_id, category_slug, title, text, created_at
            "#,
        )
        .bind(post.author_id)
        .bind(&post.category_slug)
        .bind(&post.title)
        .bind(&post.text)
        .fetch_one(&mut *tx)
        .await?;

        for key in image_keys {
            sqlx::query("INSERT INTO post_images (post_id, image) VALUES ($1, $2)")
                .bind(created.id)
                .bind(key)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;

        Ok(created)
    }

    async fn find_post(&self, post_id: i64) -> Result<Option<Post>> {
        let post = sqlx::query_as::<_, Post>(
            r#"
            SELECT id, author_id, category_slug, title, text, created_at
            FROM posts
            WHERE id = $1
            "#,
        )
        .bind(post_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(post)
    }

    async fn list_posts(&self, filter: &PostFilter) -> Result<Vec<Post>> {
        let posts = sqlx::query_as::<_, Post>(
            r#"
            SELECT id, author_id, category_slug, title, text, created_at
            FROM posts
            WHERE ($1::timestamptz IS NULL OR created_at >= $1)
              AND ($2::text IS NULL
                   OR strpos(lower(title), lower($2)) > 0
                   OR strpos(lower(text), lower($2)) > 0)
              AND ($3::bigint IS NULL OR author_id = $3)
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .bind(filter.created_after)
        .bind(filter.search.as_deref())
        .bind(filter.author_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(posts)
    }

    async fn update_post(&self, post_id: i64, changes: &PostChanges) -> Result<Option<Post>> {
        let post = sqlx::query_as::<_, Post>(
            r#"
            UPDATE posts
            SET category_slug = COALESCE($2, category_slug),
                title = COALESCE($3, title),
                text = COALESCE($4, text)
            WHERE id = $1
            RETURNING id, author_id, category_slug, title, text, created_at
            "#,
        )
        .bind(post_id)
        .bind(changes.category_slug.as_deref())
        .bind(changes.title.as_deref())
        .bind(changes.text.as_deref())
        .fetch_optional(&self.pool)
        .await?;

        Ok(post)
    }

    async fn delete_post(&self, post_id: i64) -> Result<bool> {
        // Images, comments and ratings cascade; the posts delete trigger
        // clears the post's tags.
        let result = sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(post_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn post_images(&self, post_id: i64) -> Result<Vec<PostImage>> {
        let images = sqlx::query_as::<_, PostImage>(
            r#"
            SELECT id, post_id, image
            FROM post_images
            WHERE post_id = $1
            ORDER BY id ASC
            "#,
        )
        .bind(post_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(images)
    }
}
