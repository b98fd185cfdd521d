/// Data models for blog-service
///
/// - `post`: posts and the records hanging off them (categories, images,
///   comments, ratings)
/// - `tag`: the generic like/favourite association
/// - `user`: accounts
pub mod post;
pub mod tag;
pub mod user;

pub use post::{
    Category, Comment, CommentChanges, NewComment, NewPost, Post, PostChanges, PostImage, Rating,
    MAX_RATING, MIN_RATING,
};
pub use tag::{EntityKind, EntityRef, Tag, TagKind, Taggable};
pub use user::{NewUser, User};
