/// Rating service - one 0..=5 rating per (user, post)
use crate::error::{AppError, Result};
use crate::models::{Rating, MAX_RATING, MIN_RATING};
use crate::repository::BlogRepository;
use std::sync::Arc;

/// Accepts values in `MIN_RATING..=MAX_RATING`
pub fn validate_rating(value: i64) -> Result<i16> {
    if value < i64::from(MIN_RATING) || value > i64::from(MAX_RATING) {
        return Err(AppError::Validation(
            "The value must not exceed 5".to_string(),
        ));
    }
    Ok(value as i16)
}

pub struct RatingService<R: BlogRepository + ?Sized> {
    repo: Arc<R>,
}

impl<R: BlogRepository + ?Sized> RatingService<R> {
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    pub async fn list_ratings(&self) -> Result<Vec<Rating>> {
        self.repo.list_ratings().await
    }

    /// Record `author_id`'s rating of a post, replacing any earlier one
    pub async fn rate_post(&self, author_id: i64, post_id: i64, value: i64) -> Result<Rating> {
        let value = validate_rating(value)?;

        if self.repo.find_post(post_id).await?.is_none() {
            return Err(AppError::Validation(format!(
                "post: Invalid pk \"{}\" - object does not exist.",
                post_id
            )));
        }

        let rating = self.repo.upsert_rating(author_id, post_id, value).await?;
        tracing::debug!(author_id, post_id, rating = value, "post rated");
        Ok(rating)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Category, NewPost};
    use crate::repository::{CategoryRepository, MemoryRepository, PostRepository, RatingRepository};

    #[test]
    fn test_bounds() {
        assert_eq!(validate_rating(0).unwrap(), 0);
        assert_eq!(validate_rating(5).unwrap(), 5);
        let err = validate_rating(6).unwrap_err();
        assert_eq!(err.to_string(), "Validation error: The value must not exceed 5");
        assert!(validate_rating(-1).is_err());
    }

    #[tokio::test]
    async fn test_rerating_overwrites() {
        let repo = Arc::new(MemoryRepository::new());
        repo.upsert_category(&Category {
            slug: "misc".to_string(),
            name: "Misc".to_string(),
        })
        .await
        .unwrap();
        let post = repo
            .create_post(
                &NewPost {
                    author_id: 1,
                    category_slug: "misc".to_string(),
                    title: "t".to_string(),
                    text: "x".to_string(),
                },
                &[],
            )
            .await
            .unwrap();
        let ratings = RatingService::new(repo.clone());

        let first = ratings.rate_post(2, post.id, 3).await.unwrap();
        let second = ratings.rate_post(2, post.id, 5).await.unwrap();

        assert_eq!(first.id, second.id);
        let stored = ratings.list_ratings().await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].rating, 5);
        assert_eq!(repo.average_rating(post.id).await.unwrap(), Some(5.0));
    }

    #[tokio::test]
    async fn test_missing_post_rejected() {
        let ratings = RatingService::new(Arc::new(MemoryRepository::new()));
        let err = ratings.rate_post(1, 42, 3).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }
}
