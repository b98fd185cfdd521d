/// Tag service - likes and favourites over any taggable entity
use crate::error::Result;
use crate::models::{EntityRef, Tag, TagKind};
use crate::repository::TagRepository;
use std::sync::Arc;

pub struct TagService<R: TagRepository + ?Sized> {
    repo: Arc<R>,
}

impl<R: TagRepository + ?Sized> TagService<R> {
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    /// Attach a tag, returning the stored one if the user already has it
    pub async fn add_tag(&self, kind: TagKind, target: EntityRef, user_id: i64) -> Result<Tag> {
        let tag = self.repo.get_or_create_tag(kind, target, user_id).await?;
        tracing::debug!(%kind, %target, user_id, tag_id = tag.id, "tag added");
        Ok(tag)
    }

    /// Detach a tag. Removing a tag that is not there is not an error.
    pub async fn remove_tag(&self, kind: TagKind, target: EntityRef, user_id: i64) -> Result<()> {
        let removed = self.repo.delete_tag(kind, target, user_id).await?;
        tracing::debug!(%kind, %target, user_id, removed, "tag removed");
        Ok(())
    }

    /// Anonymous viewers never have tags
    pub async fn has_tag(
        &self,
        kind: TagKind,
        target: EntityRef,
        user_id: Option<i64>,
    ) -> Result<bool> {
        match user_id {
            Some(user_id) => self.repo.tag_exists(kind, target, user_id).await,
            None => Ok(false),
        }
    }

    pub async fn count_tags(&self, kind: TagKind, target: EntityRef) -> Result<i64> {
        self.repo.count_tags(kind, target).await
    }
}
