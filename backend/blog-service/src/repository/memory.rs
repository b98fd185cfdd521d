/// Process-local entity store
///
/// Holds every table behind one async mutex, so each trait method is a single
/// critical section and the uniqueness rules hold under concurrent requests.
/// Used by the test-suite and by `STORAGE_BACKEND=memory` deployments.
use crate::error::{AppError, Result};
use crate::models::{
    Category, Comment, CommentChanges, EntityRef, NewComment, NewPost, NewUser, Post, PostChanges,
    PostImage, Rating, Tag, TagKind, User,
};
use crate::repository::{
    CategoryRepository, CommentRepository, PostFilter, PostRepository, RatingRepository,
    TagRepository, UserRepository,
};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use tokio::sync::Mutex;

#[derive(Default)]
struct Tables {
    next_id: i64,
    categories: BTreeMap<String, Category>,
    posts: BTreeMap<i64, Post>,
    images: BTreeMap<i64, PostImage>,
    comments: BTreeMap<i64, Comment>,
    ratings: BTreeMap<i64, Rating>,
    tags: BTreeMap<i64, Tag>,
    users: BTreeMap<i64, User>,
}

impl Tables {
    fn allocate_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn find_tag(&self, kind: TagKind, target: EntityRef, user_id: i64) -> Option<&Tag> {
        self.tags
            .values()
            .find(|tag| tag.kind == kind && tag.target == target && tag.user_id == user_id)
    }
}

#[derive(Default)]
pub struct MemoryRepository {
    tables: Mutex<Tables>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a post with an explicit creation time. Lets tests build
    /// back-dated posts for the recency filter.
    pub async fn insert_post_at(
        &self,
        post: &NewPost,
        created_at: chrono::DateTime<Utc>,
    ) -> Result<Post> {
        let mut tables = self.tables.lock().await;
        let id = tables.allocate_id();
        let created = Post {
            id,
            author_id: post.author_id,
            category_slug: post.category_slug.clone(),
            title: post.title.clone(),
            text: post.text.clone(),
            created_at,
        };
        tables.posts.insert(id, created.clone());
        Ok(created)
    }
}

#[async_trait]
impl CategoryRepository for MemoryRepository {
    async fn list_categories(&self) -> Result<Vec<Category>> {
        let tables = self.tables.lock().await;
        let mut categories: Vec<Category> = tables.categories.values().cloned().collect();
        categories.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(categories)
    }

    async fn find_category(&self, slug: &str) -> Result<Option<Category>> {
        let tables = self.tables.lock().await;
        Ok(tables.categories.get(slug).cloned())
    }

    async fn upsert_category(&self, category: &Category) -> Result<Category> {
        let mut tables = self.tables.lock().await;
        let name_taken = tables
            .categories
            .values()
            .any(|existing| existing.name == category.name && existing.slug != category.slug);
        if name_taken {
            return Err(AppError::Conflict(format!(
                "category name '{}' already exists",
                category.name
            )));
        }
        tables
            .categories
            .insert(category.slug.clone(), category.clone());
        Ok(category.clone())
    }
}

#[async_trait]
impl PostRepository for MemoryRepository {
    async fn create_post(&self, post: &NewPost, image_keys: &[String]) -> Result<Post> {
        let mut tables = self.tables.lock().await;
        if !tables.categories.contains_key(&post.category_slug) {
            return Err(AppError::Database(format!(
                "category '{}' does not exist",
                post.category_slug
            )));
        }

        let id = tables.allocate_id();
        let created = Post {
            id,
            author_id: post.author_id,
            category_slug: post.category_slug.clone(),
            title: post.title.clone(),
            text: post.text.clone(),
            created_at: Utc::now(),
        };
        tables.posts.insert(id, created.clone());

        for key in image_keys {
            let image_id = tables.allocate_id();
            tables.images.insert(
                image_id,
                PostImage {
                    id: image_id,
                    post_id: id,
                    image: Some(key.clone()),
                },
            );
        }

        Ok(created)
    }

    async fn find_post(&self, post_id: i64) -> Result<Option<Post>> {
        let tables = self.tables.lock().await;
        Ok(tables.posts.get(&post_id).cloned())
    }

    async fn list_posts(&self, filter: &PostFilter) -> Result<Vec<Post>> {
        let tables = self.tables.lock().await;
        let mut posts: Vec<Post> = tables
            .posts
            .values()
            .filter(|post| filter.matches(post))
            .cloned()
            .collect();
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(posts)
    }

    async fn update_post(&self, post_id: i64, changes: &PostChanges) -> Result<Option<Post>> {
        let mut tables = self.tables.lock().await;
        if let Some(slug) = &changes.category_slug {
            if !tables.categories.contains_key(slug) {
                return Err(AppError::Database(format!(
                    "category '{}' does not exist",
                    slug
                )));
            }
        }
        Ok(tables.posts.get_mut(&post_id).map(|post| {
            changes.apply(post);
            post.clone()
        }))
    }

    async fn delete_post(&self, post_id: i64) -> Result<bool> {
        let mut tables = self.tables.lock().await;
        if tables.posts.remove(&post_id).is_none() {
            return Ok(false);
        }
        let target = EntityRef::post(post_id);
        tables.images.retain(|_, image| image.post_id != post_id);
        tables.comments.retain(|_, comment| comment.post_id != post_id);
        tables.ratings.retain(|_, rating| rating.post_id != post_id);
        tables.tags.retain(|_, tag| tag.target != target);
        Ok(true)
    }

    async fn post_images(&self, post_id: i64) -> Result<Vec<PostImage>> {
        let tables = self.tables.lock().await;
        Ok(tables
            .images
            .values()
            .filter(|image| image.post_id == post_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl CommentRepository for MemoryRepository {
    async fn create_comment(&self, comment: &NewComment) -> Result<Comment> {
        let mut tables = self.tables.lock().await;
        if !tables.posts.contains_key(&comment.post_id) {
            return Err(AppError::Database(format!(
                "post {} does not exist",
                comment.post_id
            )));
        }
        let id = tables.allocate_id();
        let created = Comment {
            id,
            post_id: comment.post_id,
            user_id: comment.user_id,
            text: comment.text.clone(),
            created_at: Utc::now(),
        };
        tables.comments.insert(id, created.clone());
        Ok(created)
    }

    async fn find_comment(&self, comment_id: i64) -> Result<Option<Comment>> {
        let tables = self.tables.lock().await;
        Ok(tables.comments.get(&comment_id).cloned())
    }

    async fn list_comments(&self) -> Result<Vec<Comment>> {
        let tables = self.tables.lock().await;
        Ok(tables.comments.values().cloned().collect())
    }

    async fn post_comments(&self, post_id: i64) -> Result<Vec<Comment>> {
        let tables = self.tables.lock().await;
        Ok(tables
            .comments
            .values()
            .filter(|comment| comment.post_id == post_id)
            .cloned()
            .collect())
    }

    async fn update_comment(
        &self,
        comment_id: i64,
        changes: &CommentChanges,
    ) -> Result<Option<Comment>> {
        let mut tables = self.tables.lock().await;
        if let Some(post_id) = changes.post_id {
            if !tables.posts.contains_key(&post_id) {
                return Err(AppError::Database(format!("post {} does not exist", post_id)));
            }
        }
        Ok(tables.comments.get_mut(&comment_id).map(|comment| {
            changes.apply(comment);
            comment.clone()
        }))
    }

    async fn delete_comment(&self, comment_id: i64) -> Result<bool> {
        let mut tables = self.tables.lock().await;
        Ok(tables.comments.remove(&comment_id).is_some())
    }
}

#[async_trait]
impl RatingRepository for MemoryRepository {
    async fn upsert_rating(&self, author_id: i64, post_id: i64, value: i16) -> Result<Rating> {
        let mut tables = self.tables.lock().await;
        if !tables.posts.contains_key(&post_id) {
            return Err(AppError::Database(format!("post {} does not exist", post_id)));
        }

        if let Some(existing) = tables
            .ratings
            .values_mut()
            .find(|rating| rating.author_id == author_id && rating.post_id == post_id)
        {
            existing.rating = value;
            return Ok(existing.clone());
        }

        let id = tables.allocate_id();
        let rating = Rating {
            id,
            author_id,
            post_id,
            rating: value,
        };
        tables.ratings.insert(id, rating.clone());
        Ok(rating)
    }

    async fn list_ratings(&self) -> Result<Vec<Rating>> {
        let tables = self.tables.lock().await;
        Ok(tables.ratings.values().cloned().collect())
    }

    async fn average_rating(&self, post_id: i64) -> Result<Option<f64>> {
        let tables = self.tables.lock().await;
        let values: Vec<f64> = tables
            .ratings
            .values()
            .filter(|rating| rating.post_id == post_id)
            .map(|rating| f64::from(rating.rating))
            .collect();

        if values.is_empty() {
            return Ok(None);
        }
        Ok(Some(values.iter().sum::<f64>() / values.len() as f64))
    }
}

#[async_trait]
impl TagRepository for MemoryRepository {
    async fn get_or_create_tag(
        &self,
        kind: TagKind,
        target: EntityRef,
        user_id: i64,
    ) -> Result<Tag> {
        let mut tables = self.tables.lock().await;
        if let Some(existing) = tables.find_tag(kind, target, user_id) {
            return Ok(existing.clone());
        }

        let id = tables.allocate_id();
        let tag = Tag {
            id,
            kind,
            target,
            user_id,
            created_at: Utc::now(),
        };
        tables.tags.insert(id, tag.clone());
        Ok(tag)
    }

    async fn delete_tag(&self, kind: TagKind, target: EntityRef, user_id: i64) -> Result<bool> {
        let mut tables = self.tables.lock().await;
        let before = tables.tags.len();
        tables
            .tags
            .retain(|_, tag| !(tag.kind == kind && tag.target == target && tag.user_id == user_id));
        Ok(tables.tags.len() < before)
    }

    async fn tag_exists(&self, kind: TagKind, target: EntityRef, user_id: i64) -> Result<bool> {
        let tables = self.tables.lock().await;
        Ok(tables.find_tag(kind, target, user_id).is_some())
    }

    async fn count_tags(&self, kind: TagKind, target: EntityRef) -> Result<i64> {
        let tables = self.tables.lock().await;
        Ok(tables
            .tags
            .values()
            .filter(|tag| tag.kind == kind && tag.target == target)
            .count() as i64)
    }
}

#[async_trait]
impl UserRepository for MemoryRepository {
    async fn create_user(&self, user: &NewUser) -> Result<User> {
        let mut tables = self.tables.lock().await;
        if tables.users.values().any(|existing| existing.email == user.email) {
            return Err(AppError::Conflict("email already registered".to_string()));
        }

        let id = tables.allocate_id();
        let created = User {
            id,
            email: user.email.clone(),
            password_hash: user.password_hash.clone(),
            is_active: false,
            activation_code: Some(user.activation_code.clone()),
            created_at: Utc::now(),
        };
        tables.users.insert(id, created.clone());
        Ok(created)
    }

    async fn find_user(&self, user_id: i64) -> Result<Option<User>> {
        let tables = self.tables.lock().await;
        Ok(tables.users.get(&user_id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let tables = self.tables.lock().await;
        Ok(tables.users.values().find(|user| user.email == email).cloned())
    }

    async fn activate_user(&self, code: &str) -> Result<Option<User>> {
        let mut tables = self.tables.lock().await;
        Ok(tables
            .users
            .values_mut()
            .find(|user| user.activation_code.as_deref() == Some(code))
            .map(|user| {
                user.is_active = true;
                user.activation_code = None;
                user.clone()
            }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Taggable;
    use futures::future::join_all;
    use std::sync::Arc;

    async fn repo_with_post() -> (MemoryRepository, Post) {
        let repo = MemoryRepository::new();
        repo.upsert_category(&Category {
            slug: "tech".to_string(),
            name: "Technology".to_string(),
        })
        .await
        .unwrap();
        let post = repo
            .create_post(
                &NewPost {
                    author_id: 1,
                    category_slug: "tech".to_string(),
                    title: "Hello".to_string(),
                    text: "World".to_string(),
                },
                &["posts/a.png".to_string(), "posts/b.png".to_string()],
            )
            .await
            .unwrap();
        (repo, post)
    }

    #[tokio::test]
    async fn test_create_post_rejects_unknown_category() {
        let repo = MemoryRepository::new();
        let result = repo
            .create_post(
                &NewPost {
                    author_id: 1,
                    category_slug: "nope".to_string(),
                    title: "t".to_string(),
                    text: "x".to_string(),
                },
                &[],
            )
            .await;
        assert!(result.is_err());
        assert!(repo.list_posts(&PostFilter::default()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_images_keep_insertion_order() {
        let (repo, post) = repo_with_post().await;
        let images = repo.post_images(post.id).await.unwrap();
        let keys: Vec<_> = images.iter().filter_map(|i| i.image.clone()).collect();
        assert_eq!(keys, vec!["posts/a.png", "posts/b.png"]);
    }

    #[tokio::test]
    async fn test_delete_post_cascades() {
        let (repo, post) = repo_with_post().await;
        repo.create_comment(&NewComment {
            post_id: post.id,
            user_id: 2,
            text: "nice".to_string(),
        })
        .await
        .unwrap();
        repo.upsert_rating(2, post.id, 4).await.unwrap();
        repo.get_or_create_tag(TagKind::Like, post.entity_ref(), 2)
            .await
            .unwrap();

        assert!(repo.delete_post(post.id).await.unwrap());

        assert!(repo.post_images(post.id).await.unwrap().is_empty());
        assert!(repo.post_comments(post.id).await.unwrap().is_empty());
        assert_eq!(repo.average_rating(post.id).await.unwrap(), None);
        assert_eq!(
            repo.count_tags(TagKind::Like, EntityRef::post(post.id))
                .await
                .unwrap(),
            0
        );
        assert!(!repo.delete_post(post.id).await.unwrap());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_tagging_stores_one_tag() {
        let (repo, post) = repo_with_post().await;
        let repo = Arc::new(repo);
        let target = post.entity_ref();

        let tasks = (0..32).map(|_| {
            let repo = repo.clone();
            tokio::spawn(async move { repo.get_or_create_tag(TagKind::Like, target, 7).await })
        });
        let ids: Vec<i64> = join_all(tasks)
            .await
            .into_iter()
            .map(|joined| joined.unwrap().unwrap().id)
            .collect();

        assert!(ids.iter().all(|id| *id == ids[0]));
        assert_eq!(repo.count_tags(TagKind::Like, target).await.unwrap(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_ratings_keep_one_row_per_author() {
        let (repo, post) = repo_with_post().await;
        let repo = Arc::new(repo);

        let tasks = (0..32i16).map(|i| {
            let repo = repo.clone();
            let post_id = post.id;
            tokio::spawn(async move { repo.upsert_rating(7, post_id, i % 6).await })
        });
        for joined in join_all(tasks).await {
            joined.unwrap().unwrap();
        }

        let ratings = repo.list_ratings().await.unwrap();
        assert_eq!(ratings.len(), 1);
        assert!((0..=5).contains(&ratings[0].rating));
    }

    #[tokio::test]
    async fn test_duplicate_email_conflicts() {
        let repo = MemoryRepository::new();
        let user = NewUser {
            email: "a@b.c".to_string(),
            password_hash: "h".to_string(),
            activation_code: "code".to_string(),
        };
        repo.create_user(&user).await.unwrap();
        let err = repo.create_user(&user).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }
}
