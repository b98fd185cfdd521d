/// Comment service - comments on posts, editable only by their author
use crate::error::{AppError, Result};
use crate::middleware::permissions::check_comment_ownership;
use crate::models::{Comment, CommentChanges, NewComment};
use crate::repository::BlogRepository;
use std::sync::Arc;

pub struct CommentService<R: BlogRepository + ?Sized> {
    repo: Arc<R>,
}

impl<R: BlogRepository + ?Sized> CommentService<R> {
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    async fn ensure_post(&self, post_id: i64) -> Result<()> {
        match self.repo.find_post(post_id).await? {
            Some(_) => Ok(()),
            None => Err(AppError::Validation(format!(
                "post: Invalid pk \"{}\" - object does not exist.",
                post_id
            ))),
        }
    }

    pub async fn list_comments(&self) -> Result<Vec<Comment>> {
        self.repo.list_comments().await
    }

    pub async fn get_comment(&self, comment_id: i64) -> Result<Comment> {
        self.repo
            .find_comment(comment_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Comment {} not found", comment_id)))
    }

    pub async fn create_comment(&self, comment: NewComment) -> Result<Comment> {
        self.ensure_post(comment.post_id).await?;
        let created = self.repo.create_comment(&comment).await?;
        tracing::debug!(comment_id = created.id, post_id = created.post_id, "comment created");
        Ok(created)
    }

    pub async fn update_comment(
        &self,
        user_id: i64,
        comment_id: i64,
        changes: CommentChanges,
    ) -> Result<Comment> {
        let comment = self.get_comment(comment_id).await?;
        check_comment_ownership(user_id, &comment)?;

        if let Some(post_id) = changes.post_id {
            self.ensure_post(post_id).await?;
        }

        self.repo
            .update_comment(comment_id, &changes)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Comment {} not found", comment_id)))
    }

    pub async fn delete_comment(&self, user_id: i64, comment_id: i64) -> Result<()> {
        let comment = self.get_comment(comment_id).await?;
        check_comment_ownership(user_id, &comment)?;
        self.repo.delete_comment(comment_id).await?;
        Ok(())
    }
}
