use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::tag::{EntityRef, Taggable};

pub const MIN_RATING: i16 = 0;
pub const MAX_RATING: i16 = 5;

/// Static reference data posts are filed under
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Category {
    pub slug: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Post {
    pub id: i64,
    pub author_id: i64,
    pub category_slug: String,
    pub title: String,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

impl Taggable for Post {
    fn entity_ref(&self) -> EntityRef {
        EntityRef::post(self.id)
    }
}

/// Image attached to a post; `image` is the media key, absent when the upload
/// carried no file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct PostImage {
    pub id: i64,
    pub post_id: i64,
    pub image: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Comment {
    pub id: i64,
    pub post_id: i64,
    pub user_id: i64,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Rating {
    pub id: i64,
    pub author_id: i64,
    pub post_id: i64,
    pub rating: i16,
}

/// Insert payload for a post. The author always comes from the session.
#[derive(Debug, Clone)]
pub struct NewPost {
    pub author_id: i64,
    pub category_slug: String,
    pub title: String,
    pub text: String,
}

/// Partial update of a post; `None` leaves the field untouched
#[derive(Debug, Clone, Default)]
pub struct PostChanges {
    pub category_slug: Option<String>,
    pub title: Option<String>,
    pub text: Option<String>,
}

impl PostChanges {
    pub fn is_empty(&self) -> bool {
        self.category_slug.is_none() && self.title.is_none() && self.text.is_none()
    }

    pub fn apply(&self, post: &mut Post) {
        if let Some(slug) = &self.category_slug {
            post.category_slug = slug.clone();
        }
        if let Some(title) = &self.title {
            post.title = title.clone();
        }
        if let Some(text) = &self.text {
            post.text = text.clone();
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewComment {
    pub post_id: i64,
    pub user_id: i64,
    pub text: String,
}

#[derive(Debug, Clone, Default)]
pub struct CommentChanges {
    pub post_id: Option<i64>,
    pub text: Option<String>,
}

impl CommentChanges {
    pub fn apply(&self, comment: &mut Comment) {
        if let Some(post_id) = self.post_id {
            comment.post_id = post_id;
        }
        if let Some(text) = &self.text {
            comment.text = text.clone();
        }
    }
}
