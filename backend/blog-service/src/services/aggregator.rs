/// Post aggregator - builds the full read model of a post
///
/// A [`PostView`] joins the post with its category, author e-mail, images,
/// comments, average rating, like count and the viewer-relative like and
/// favourite flags. Anonymous viewers always see both flags as `false`.
use crate::error::{AppError, Result};
use crate::models::{Category, Post, TagKind, Taggable};
use crate::repository::BlogRepository;
use crate::services::{MediaStorage, TagService};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// `created_at` rendering, in UTC
pub const DATE_FORMAT: &str = "%d/%m/%Y %H:%M:%S";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostImageView {
    pub id: i64,
    /// Absolute URL, or empty when the image row has no file
    pub image: String,
    pub post: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommentSummary {
    pub text: String,
    pub post: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostView {
    pub id: i64,
    pub title: String,
    pub category: Category,
    pub created_at: String,
    pub text: String,
    pub is_fan: bool,
    pub total_likes: i64,
    pub is_favourite: bool,
    pub author: String,
    pub images: Vec<PostImageView>,
    pub comments: Vec<CommentSummary>,
    pub ratings: Option<f64>,
}

pub struct PostAggregator<R: BlogRepository + ?Sized> {
    repo: Arc<R>,
    media: Arc<MediaStorage>,
}

impl<R: BlogRepository + ?Sized> PostAggregator<R> {
    pub fn new(repo: Arc<R>, media: Arc<MediaStorage>) -> Self {
        Self { repo, media }
    }

    /// Compose the view of `post` as seen by `viewer`. `base_url` is the
    /// `scheme://host` image URLs are made absolute against.
    pub async fn compose(&self, post: &Post, viewer: Option<i64>, base_url: &str) -> Result<PostView> {
        let target = post.entity_ref();
        let tags = TagService::new(self.repo.clone());

        let category = self
            .repo
            .find_category(&post.category_slug)
            .await?
            .ok_or_else(|| {
                AppError::Internal(format!(
                    "post {} references missing category '{}'",
                    post.id, post.category_slug
                ))
            })?;

        let author = match self.repo.find_user(post.author_id).await? {
            Some(user) => user.email,
            None => {
                tracing::warn!(post_id = post.id, author_id = post.author_id, "post author not found");
                String::new()
            }
        };

        let images = self
            .repo
            .post_images(post.id)
            .await?
            .into_iter()
            .map(|image| PostImageView {
                id: image.id,
                image: image
                    .image
                    .as_deref()
                    .map(|key| self.media.absolute_url(base_url, key))
                    .unwrap_or_default(),
                post: image.post_id,
            })
            .collect();

        let comments = self
            .repo
            .post_comments(post.id)
            .await?
            .into_iter()
            .map(|comment| CommentSummary {
                text: comment.text,
                post: comment.post_id,
            })
            .collect();

        Ok(PostView {
            id: post.id,
            title: post.title.clone(),
            category,
            created_at: post.created_at.format(DATE_FORMAT).to_string(),
            text: post.text.clone(),
            is_fan: tags.has_tag(TagKind::Like, target, viewer).await?,
            total_likes: tags.count_tags(TagKind::Like, target).await?,
            is_favourite: tags.has_tag(TagKind::Favourite, target, viewer).await?,
            author,
            images,
            comments,
            ratings: self.repo.average_rating(post.id).await?,
        })
    }

    pub async fn compose_many(
        &self,
        posts: &[Post],
        viewer: Option<i64>,
        base_url: &str,
    ) -> Result<Vec<PostView>> {
        let mut views = Vec::with_capacity(posts.len());
        for post in posts {
            views.push(self.compose(post, viewer, base_url).await?);
        }
        Ok(views)
    }
}
