/// Authorization module for blog-service
///
/// Ownership-based permission checks: only the author of a post or comment
/// may modify or delete it.
use crate::error::{AppError, Result};
use crate::models::{Comment, Post};

/// Check if a user owns a post
pub fn check_post_ownership(user_id: i64, post: &Post) -> Result<()> {
    if post.author_id == user_id {
        Ok(())
    } else {
        Err(AppError::Forbidden(
            "You don't have permission to modify this post".to_string(),
        ))
    }
}

/// Check if a user owns a comment
pub fn check_comment_ownership(user_id: i64, comment: &Comment) -> Result<()> {
    if comment.user_id == user_id {
        Ok(())
    } else {
        Err(AppError::Forbidden(
            "You don't have permission to modify this comment".to_string(),
        ))
    }
}
