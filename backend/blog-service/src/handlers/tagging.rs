/// Like and favourite endpoints
///
/// The handlers are generic over a [`TaggableResource`], which resolves the
/// path id to a record that can carry tags. Posts are the only such resource
/// today; another record kind only needs its own `TaggableResource` impl and
/// four routes.
use crate::error::Result;
use crate::middleware::UserId;
use crate::models::{Post, TagKind, Taggable};
use crate::AppState;
use actix_web::{web, HttpResponse};
use async_trait::async_trait;

#[async_trait(?Send)]
pub trait TaggableResource {
    type Entity: Taggable;

    /// Fails with `AppError::NotFound` when no record has this id
    async fn resolve(state: &AppState, id: i64) -> Result<Self::Entity>;
}

pub struct PostResource;

#[async_trait(?Send)]
impl TaggableResource for PostResource {
    type Entity = Post;

    async fn resolve(state: &AppState, id: i64) -> Result<Post> {
        state.posts().get_post(id).await
    }
}

async fn tag<T: TaggableResource>(
    state: &AppState,
    user_id: UserId,
    id: i64,
    kind: TagKind,
    attach: bool,
) -> Result<HttpResponse> {
    let target = T::resolve(state, id).await?.entity_ref();
    let tags = state.tags();
    if attach {
        tags.add_tag(kind, target, user_id.0).await?;
    } else {
        tags.remove_tag(kind, target, user_id.0).await?;
    }
    Ok(HttpResponse::Ok().finish())
}

pub async fn like<T: TaggableResource>(
    state: web::Data<AppState>,
    user_id: UserId,
    id: web::Path<i64>,
) -> Result<HttpResponse> {
    tag::<T>(&state, user_id, id.into_inner(), TagKind::Like, true).await
}

pub async fn unlike<T: TaggableResource>(
    state: web::Data<AppState>,
    user_id: UserId,
    id: web::Path<i64>,
) -> Result<HttpResponse> {
    tag::<T>(&state, user_id, id.into_inner(), TagKind::Like, false).await
}

pub async fn mark<T: TaggableResource>(
    state: web::Data<AppState>,
    user_id: UserId,
    id: web::Path<i64>,
) -> Result<HttpResponse> {
    tag::<T>(&state, user_id, id.into_inner(), TagKind::Favourite, true).await
}

pub async fn unmark<T: TaggableResource>(
    state: web::Data<AppState>,
    user_id: UserId,
    id: web::Path<i64>,
) -> Result<HttpResponse> {
    tag::<T>(&state, user_id, id.into_inner(), TagKind::Favourite, false).await
}
