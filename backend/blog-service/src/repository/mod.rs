/// Entity store for blog-service
///
/// The store is split into one async trait per record family. Both
/// [`PgRepository`] (PostgreSQL) and [`MemoryRepository`] (process-local)
/// implement all of them, and anything implementing every trait is a
/// [`BlogRepository`].
///
/// Uniqueness-constrained writes (`get_or_create_tag`, `upsert_rating`) must
/// be atomic in every implementation: a single statement backed by a UNIQUE
/// constraint in Postgres, a single critical section in memory.
pub mod memory;
pub mod postgres;

pub use memory::MemoryRepository;
pub use postgres::PgRepository;

use crate::error::Result;
use crate::models::{
    Category, Comment, CommentChanges, EntityRef, NewComment, NewPost, NewUser, Post, PostChanges,
    PostImage, Rating, Tag, TagKind, User,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Filter applied to post listings
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PostFilter {
    /// Keep posts created at or after this instant
    pub created_after: Option<DateTime<Utc>>,
    /// Case-insensitive substring matched against title OR text
    pub search: Option<String>,
    /// Keep posts written by this user
    pub author_id: Option<i64>,
}

impl PostFilter {
    pub fn matches(&self, post: &Post) -> bool {
        if let Some(after) = self.created_after {
            if post.created_at < after {
                return false;
            }
        }
        if let Some(author_id) = self.author_id {
            if post.author_id != author_id {
                return false;
            }
        }
        if let Some(needle) = &self.search {
            let needle = needle.to_lowercase();
            if !post.title.to_lowercase().contains(&needle)
                && !post.text.to_lowercase().contains(&needle)
            {
                return false;
            }
        }
        true
    }
}

#[async_trait]
pub trait CategoryRepository: Send + Sync {
    async fn list_categories(&self) -> Result<Vec<Category>>;

    async fn find_category(&self, slug: &str) -> Result<Option<Category>>;

    /// Insert a category, or rename it if the slug already exists
    async fn upsert_category(&self, category: &Category) -> Result<Category>;
}

#[async_trait]
pub trait PostRepository: Send + Sync {
    /// Insert a post together with one image row per media key, atomically
    async fn create_post(&self, post: &NewPost, image_keys: &[String]) -> Result<Post>;

    async fn find_post(&self, post_id: i64) -> Result<Option<Post>>;

    /// Posts matching `filter`, newest first
    async fn list_posts(&self, filter: &PostFilter) -> Result<Vec<Post>>;

    /// Returns `None` when the post does not exist
    async fn update_post(&self, post_id: i64, changes: &PostChanges) -> Result<Option<Post>>;

    /// Delete a post and everything hanging off it, tags included
    async fn delete_post(&self, post_id: i64) -> Result<bool>;

    /// Images of a post in insertion order
    async fn post_images(&self, post_id: i64) -> Result<Vec<PostImage>>;
}

#[async_trait]
pub trait CommentRepository: Send + Sync {
    async fn create_comment(&self, comment: &NewComment) -> Result<Comment>;

    async fn find_comment(&self, comment_id: i64) -> Result<Option<Comment>>;

    async fn list_comments(&self) -> Result<Vec<Comment>>;

    /// Comments of a post in insertion order
    async fn post_comments(&self, post_id: i64) -> Result<Vec<Comment>>;

    async fn update_comment(
        &self,
        comment_id: i64,
        changes: &CommentChanges,
    ) -> Result<Option<Comment>>;

    async fn delete_comment(&self, comment_id: i64) -> Result<bool>;
}

#[async_trait]
pub trait RatingRepository: Send + Sync {
    /// Create the (author, post) rating or overwrite its value
    async fn upsert_rating(&self, author_id: i64, post_id: i64, value: i16) -> Result<Rating>;

    async fn list_ratings(&self) -> Result<Vec<Rating>>;

    /// Mean rating of a post; `None` when nobody has rated it
    async fn average_rating(&self, post_id: i64) -> Result<Option<f64>>;
}

#[async_trait]
pub trait TagRepository: Send + Sync {
    /// Return the existing tag for the key, creating it first if absent
    async fn get_or_create_tag(&self, kind: TagKind, target: EntityRef, user_id: i64)
        -> Result<Tag>;

    /// Returns whether a tag was removed
    async fn delete_tag(&self, kind: TagKind, target: EntityRef, user_id: i64) -> Result<bool>;

    async fn tag_exists(&self, kind: TagKind, target: EntityRef, user_id: i64) -> Result<bool>;

    async fn count_tags(&self, kind: TagKind, target: EntityRef) -> Result<i64>;
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Fails with `AppError::Conflict` when the e-mail is taken
    async fn create_user(&self, user: &NewUser) -> Result<User>;

    async fn find_user(&self, user_id: i64) -> Result<Option<User>>;

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>>;

    /// Activate the account holding `code` and clear the code
    async fn activate_user(&self, code: &str) -> Result<Option<User>>;
}

/// The whole entity store
pub trait BlogRepository:
    CategoryRepository
    + PostRepository
    + CommentRepository
    + RatingRepository
    + TagRepository
    + UserRepository
{
}

impl<T> BlogRepository for T where
    T: CategoryRepository
        + PostRepository
        + CommentRepository
        + RatingRepository
        + TagRepository
        + UserRepository
{
}
