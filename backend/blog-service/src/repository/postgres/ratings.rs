use super::PgRepository;
use crate::error::Result;
use crate::models::Rating;
use crate::repository::RatingRepository;
use async_trait::async_trait;

#[async_trait]
impl RatingRepository for PgRepository {
    async fn upsert_rating(&self, author_id: i64, post_id: i64, value: i16) -> Result<Rating> {
        let rating = sqlx::query_as::<_, Rating>(
            r#"
            INSERT INTO ratings (author_id, post_id, rating)
            VALUES ($1, $2, $3)
            ON CONFLICT (author_id, post_id) DO UPDATE
            SET rating = EXCLUDED.rating
            RETURNING id, author_id, post_id, rating
            "#,
        )
        .bind(author_id)
        .bind(post_id)
        .bind(value)
        .fetch_one(&self.pool)
        .await?;

        Ok(rating)
    }

    async fn list_ratings(&self) -> Result<Vec<Rating>> {
        let ratings = sqlx::query_as::<_, Rating>(
            "SELECT id, author_id, post_id, rating FROM ratings ORDER BY id ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(ratings)
    }

    async fn average_rating(&self, post_id: i64) -> Result<Option<f64>> {
        let average: Option<f64> =
            sqlx::query_scalar("SELECT AVG(rating)::float8 FROM ratings WHERE post_id = $1")
                .bind(post_id)
                .fetch_one(&self.pool)
                .await?;

        Ok(average)
    }
}
