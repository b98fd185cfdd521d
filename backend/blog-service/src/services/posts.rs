/// Post service - handles post creation, retrieval, and management
use crate::error::{AppError, Result};
use crate::middleware::permissions::check_post_ownership;
use crate::models::{NewPost, Post, PostChanges};
use crate::repository::{BlogRepository, PostFilter};
use crate::services::{MediaStorage, MediaUpload};
use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use std::sync::Arc;

/// Query parameters shared by the post listings
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PostListParams {
    /// Only posts from the last `days` days; zero, negative or absent means
    /// no limit
    pub days: Option<i64>,
    /// Case-insensitive search over title and text
    pub q: Option<String>,
}

impl PostListParams {
    fn base_filter(&self) -> PostFilter {
        PostFilter {
            created_after: self.days.filter(|days| *days > 0).and_then(created_since),
            ..Default::default()
        }
    }
}

/// Lower bound for a `days` window. A window reaching past the earliest
/// representable instant has no lower bound.
fn created_since(days: i64) -> Option<DateTime<Utc>> {
    Duration::try_days(days).and_then(|window| Utc::now().checked_sub_signed(window))
}

pub struct PostService<R: BlogRepository + ?Sized> {
    repo: Arc<R>,
    media: Arc<MediaStorage>,
}

impl<R: BlogRepository + ?Sized> PostService<R> {
    pub fn new(repo: Arc<R>, media: Arc<MediaStorage>) -> Self {
        Self { repo, media }
    }

    async fn ensure_category(&self, slug: &str) -> Result<()> {
        match self.repo.find_category(slug).await? {
            Some(_) => Ok(()),
            None => Err(AppError::Validation(format!(
                "category: Invalid pk \"{}\" - object does not exist.",
                slug
            ))),
        }
    }

    /// Create a post with its images. Uploaded files are removed again if the
    /// post cannot be stored.
    pub async fn create_post(&self, post: NewPost, uploads: Vec<MediaUpload>) -> Result<Post> {
        self.ensure_category(&post.category_slug).await?;

        let mut keys = Vec::with_capacity(uploads.len());
        for upload in &uploads {
            match self.media.save(upload.file_name.as_deref(), &upload.bytes).await {
                Ok(key) => keys.push(key),
                Err(e) => {
                    self.discard(&keys).await;
                    return Err(e);
                }
            }
        }

        match self.repo.create_post(&post, &keys).await {
            Ok(created) => {
                tracing::info!(
                    post_id = created.id,
                    author_id = created.author_id,
                    images = keys.len(),
                    "post created"
                );
                Ok(created)
            }
            Err(e) => {
                self.discard(&keys).await;
                Err(e)
            }
        }
    }

    async fn discard(&self, keys: &[String]) {
        for key in keys {
            self.media.remove(key).await;
        }
    }

    /// Get a post by ID
    pub async fn get_post(&self, post_id: i64) -> Result<Post> {
        self.repo
            .find_post(post_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Post {} not found", post_id)))
    }

    pub async fn list_posts(&self, params: &PostListParams) -> Result<Vec<Post>> {
        self.repo.list_posts(&params.base_filter()).await
    }

    /// Posts written by `user_id`
    pub async fn own_posts(&self, user_id: i64, params: &PostListParams) -> Result<Vec<Post>> {
        let filter = PostFilter {
            author_id: Some(user_id),
            ..params.base_filter()
        };
        self.repo.list_posts(&filter).await
    }

    /// Posts whose title or text contains `q`; without `q` this is the plain
    /// listing
    pub async fn search_posts(&self, params: &PostListParams) -> Result<Vec<Post>> {
        let filter = PostFilter {
            search: params.q.clone().filter(|q| !q.is_empty()),
            ..params.base_filter()
        };
        self.repo.list_posts(&filter).await
    }

    pub async fn update_post(&self, user_id: i64, post_id: i64, changes: PostChanges) -> Result<Post> {
        let post = self.get_post(post_id).await?;
        check_post_ownership(user_id, &post)?;

        if changes.is_empty() {
            return Ok(post);
        }
        if let Some(slug) = &changes.category_slug {
            self.ensure_category(slug).await?;
        }

        self.repo
            .update_post(post_id, &changes)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Post {} not found", post_id)))
    }

    /// Delete a post with its comments, ratings, tags and image files
    pub async fn delete_post(&self, user_id: i64, post_id: i64) -> Result<()> {
        let post = self.get_post(post_id).await?;
        check_post_ownership(user_id, &post)?;

        let keys: Vec<String> = self
            .repo
            .post_images(post_id)
            .await?
            .into_iter()
            .filter_map(|image| image.image)
            .collect();

        if !self.repo.delete_post(post_id).await? {
            return Err(AppError::NotFound(format!("Post {} not found", post_id)));
        }
        self.discard(&keys).await;

        tracing::info!(post_id, user_id, "post deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MediaConfig;
    use crate::models::Category;
    use crate::repository::{CategoryRepository, MemoryRepository, PostRepository};

    async fn service(root: &std::path::Path) -> PostService<MemoryRepository> {
        let repo = Arc::new(MemoryRepository::new());
        repo.upsert_category(&Category {
            slug: "pets".to_string(),
            name: "Pets".to_string(),
        })
        .await
        .unwrap();
        let media = Arc::new(MediaStorage::new(&MediaConfig {
            root: root.to_string_lossy().into_owned(),
            url_prefix: "/media/".to_string(),
        }));
        PostService::new(repo, media)
    }

    fn new_post(author_id: i64, category: &str) -> NewPost {
        NewPost {
            author_id,
            category_slug: category.to_string(),
            title: "Concatenation".to_string(),
            text: "strings".to_string(),
        }
    }

    fn window(days: i64) -> PostFilter {
        PostListParams {
            days: Some(days),
            q: None,
        }
        .base_filter()
    }

    #[test]
    fn test_days_window_bounds() {
        let since = window(7).created_after.unwrap();
        let expected = Utc::now() - Duration::days(7);
        assert!((expected - since).num_seconds().abs() < 5);

        assert_eq!(window(0).created_after, None);
        assert_eq!(window(-3).created_after, None);
        assert_eq!(window(200_000_000).created_after, None);
        assert_eq!(window(i64::MAX).created_after, None);
    }

    #[tokio::test]
    async fn test_unknown_category_rejected_without_writing_files() {
        let dir = tempfile::tempdir().unwrap();
        let posts = service(dir.path()).await;

        let upload = MediaUpload {
            file_name: Some("a.png".to_string()),
            bytes: b"img".to_vec(),
        };
        let err = posts
            .create_post(new_post(1, "nope"), vec![upload])
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Validation(_)));
        assert!(!dir.path().join("posts").exists());
    }

    #[tokio::test]
    async fn test_non_author_cannot_update_or_delete() {
        let dir = tempfile::tempdir().unwrap();
        let posts = service(dir.path()).await;
        let post = posts.create_post(new_post(1, "pets"), vec![]).await.unwrap();

        let changes = PostChanges {
            title: Some("Hijacked".to_string()),
            ..Default::default()
        };
        let err = posts.update_post(2, post.id, changes).await.unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));

        let err = posts.delete_post(2, post.id).await.unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));

        assert_eq!(posts.get_post(post.id).await.unwrap().title, "Concatenation");
    }

    #[tokio::test]
    async fn test_search_without_query_lists_everything() {
        let dir = tempfile::tempdir().unwrap();
        let posts = service(dir.path()).await;
        posts.create_post(new_post(1, "pets"), vec![]).await.unwrap();
        let mut other = new_post(1, "pets");
        other.title = "Dogs".to_string();
        other.text = "bark".to_string();
        posts.create_post(other, vec![]).await.unwrap();

        let all = posts.search_posts(&PostListParams::default()).await.unwrap();
        assert_eq!(all.len(), 2);

        let found = posts
            .search_posts(&PostListParams {
                q: Some("cat".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].title, "Concatenation");
    }

    #[tokio::test]
    async fn test_delete_removes_image_files() {
        let dir = tempfile::tempdir().unwrap();
        let posts = service(dir.path()).await;
        let upload = MediaUpload {
            file_name: Some("a.png".to_string()),
            bytes: b"img".to_vec(),
        };
        let post = posts.create_post(new_post(1, "pets"), vec![upload]).await.unwrap();
        let image = posts.repo.post_images(post.id).await.unwrap().remove(0);
        let key = image.image.unwrap();
        assert!(dir.path().join(&key).exists());

        posts.delete_post(1, post.id).await.unwrap();

        assert!(!dir.path().join(&key).exists());
        assert!(matches!(
            posts.get_post(post.id).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[test]
    fn test_zero_days_disables_recency_filter() {
        let params = PostListParams {
            days: Some(0),
            q: None,
        };
        assert_eq!(params.base_filter().created_after, None);
    }
}
