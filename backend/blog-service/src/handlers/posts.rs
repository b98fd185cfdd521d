/// Post handlers - HTTP endpoints for post operations
use crate::error::Result;
use crate::handlers::request_base_url;
use crate::middleware::{UserId, Viewer};
use crate::models::{NewPost, PostChanges};
use crate::services::{MediaUpload, PostListParams};
use crate::AppState;
use actix_multipart::form::{tempfile::TempFile, text::Text, MultipartForm};
use actix_web::{web, HttpRequest, HttpResponse};
use serde::Deserialize;
use validator::Validate;

/// Multipart body of a new post; `images` may repeat
#[derive(MultipartForm)]
pub struct CreatePostForm {
    pub title: Text<String>,
    pub text: Text<String>,
    pub category: Text<String>,
    pub images: Vec<TempFile>,
}

/// Full replacement of the editable post fields
#[derive(Debug, Deserialize, Validate)]
pub struct PostPayload {
    #[validate(length(min = 1, max = 255))]
    pub title: String,
    #[validate(length(min = 1))]
    pub text: String,
    #[validate(length(min = 1, max = 100))]
    pub category: String,
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct PostPatch {
    #[validate(length(min = 1, max = 255))]
    pub title: Option<String>,
    #[validate(length(min = 1))]
    pub text: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub category: Option<String>,
}

impl From<PostPayload> for PostChanges {
    fn from(payload: PostPayload) -> Self {
        PostChanges {
            category_slug: Some(payload.category),
            title: Some(payload.title),
            text: Some(payload.text),
        }
    }
}

impl From<PostPatch> for PostChanges {
    fn from(patch: PostPatch) -> Self {
        PostChanges {
            category_slug: patch.category,
            title: patch.title,
            text: patch.text,
        }
    }
}

/// Create a new post with its images
pub async fn create_post(
    req: HttpRequest,
    state: web::Data<AppState>,
    user_id: UserId,
    MultipartForm(form): MultipartForm<CreatePostForm>,
) -> Result<HttpResponse> {
    let payload = PostPayload {
        title: form.title.0,
        text: form.text.0,
        category: form.category.0,
    };
    payload.validate()?;

    let mut uploads = Vec::with_capacity(form.images.len());
    for image in form.images {
        // browsers send an empty part for an untouched file input
        if image.size == 0 && image.file_name.as_deref().map_or(true, str::is_empty) {
            continue;
        }
        uploads.push(MediaUpload {
            bytes: tokio::fs::read(image.file.path()).await?,
            file_name: image.file_name,
        });
    }

    let post = state
        .posts()
        .create_post(
            NewPost {
                author_id: user_id.0,
                category_slug: payload.category,
                title: payload.title,
                text: payload.text,
            },
            uploads,
        )
        .await?;

    let view = state
        .aggregator()
        .compose(&post, Some(user_id.0), &request_base_url(&req))
        .await?;
    Ok(HttpResponse::Created().json(view))
}

/// List posts, optionally limited to the last `days` days
pub async fn list_posts(
    req: HttpRequest,
    state: web::Data<AppState>,
    viewer: Viewer,
    query: web::Query<PostListParams>,
) -> Result<HttpResponse> {
    let posts = state.posts().list_posts(&query).await?;
    let views = state
        .aggregator()
        .compose_many(&posts, viewer.0, &request_base_url(&req))
        .await?;
    Ok(HttpResponse::Ok().json(views))
}

/// Posts written by the caller
pub async fn own_posts(
    req: HttpRequest,
    state: web::Data<AppState>,
    user_id: UserId,
    query: web::Query<PostListParams>,
) -> Result<HttpResponse> {
    let posts = state.posts().own_posts(user_id.0, &query).await?;
    let views = state
        .aggregator()
        .compose_many(&posts, Some(user_id.0), &request_base_url(&req))
        .await?;
    Ok(HttpResponse::Ok().json(views))
}

pub async fn search_posts(
    req: HttpRequest,
    state: web::Data<AppState>,
    viewer: Viewer,
    query: web::Query<PostListParams>,
) -> Result<HttpResponse> {
    let posts = state.posts().search_posts(&query).await?;
    let views = state
        .aggregator()
        .compose_many(&posts, viewer.0, &request_base_url(&req))
        .await?;
    Ok(HttpResponse::Ok().json(views))
}

/// Get a post by ID
pub async fn get_post(
    req: HttpRequest,
    state: web::Data<AppState>,
    viewer: Viewer,
    post_id: web::Path<i64>,
) -> Result<HttpResponse> {
    let post = state.posts().get_post(*post_id).await?;
    let view = state
        .aggregator()
        .compose(&post, viewer.0, &request_base_url(&req))
        .await?;
    Ok(HttpResponse::Ok().json(view))
}

async fn apply_update(
    req: &HttpRequest,
    state: &AppState,
    user_id: UserId,
    post_id: i64,
    changes: PostChanges,
) -> Result<HttpResponse> {
    let post = state.posts().update_post(user_id.0, post_id, changes).await?;
    let view = state
        .aggregator()
        .compose(&post, Some(user_id.0), &request_base_url(req))
        .await?;
    Ok(HttpResponse::Ok().json(view))
}

pub async fn update_post(
    req: HttpRequest,
    state: web::Data<AppState>,
    user_id: UserId,
    post_id: web::Path<i64>,
    payload: web::Json<PostPayload>,
) -> Result<HttpResponse> {
    payload.validate()?;
    apply_update(&req, &state, user_id, *post_id, payload.into_inner().into()).await
}

pub async fn partial_update_post(
    req: HttpRequest,
    state: web::Data<AppState>,
    user_id: UserId,
    post_id: web::Path<i64>,
    payload: web::Json<PostPatch>,
) -> Result<HttpResponse> {
    payload.validate()?;
    apply_update(&req, &state, user_id, *post_id, payload.into_inner().into()).await
}

pub async fn delete_post(
    state: web::Data<AppState>,
    user_id: UserId,
    post_id: web::Path<i64>,
) -> Result<HttpResponse> {
    state.posts().delete_post(user_id.0, *post_id).await?;
    Ok(HttpResponse::NoContent().finish())
}
