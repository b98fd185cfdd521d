/// Comment handlers - reading is open, writing requires the comment's author
use crate::error::Result;
use crate::middleware::UserId;
use crate::models::{Comment, CommentChanges, NewComment};
use crate::AppState;
use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Serialize)]
pub struct CommentResponse {
    pub id: i64,
    pub text: String,
    pub post: i64,
}

impl From<Comment> for CommentResponse {
    fn from(comment: Comment) -> Self {
        Self {
            id: comment.id,
            text: comment.text,
            post: comment.post_id,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct CommentPayload {
    #[validate(length(min = 1))]
    pub text: String,
    pub post: i64,
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct CommentPatch {
    #[validate(length(min = 1))]
    pub text: Option<String>,
    pub post: Option<i64>,
}

pub async fn list_comments(state: web::Data<AppState>) -> Result<HttpResponse> {
    let comments: Vec<CommentResponse> = state
        .comments()
        .list_comments()
        .await?
        .into_iter()
        .map(CommentResponse::from)
        .collect();
    Ok(HttpResponse::Ok().json(comments))
}

pub async fn get_comment(
    state: web::Data<AppState>,
    comment_id: web::Path<i64>,
) -> Result<HttpResponse> {
    let comment = state.comments().get_comment(*comment_id).await?;
    Ok(HttpResponse::Ok().json(CommentResponse::from(comment)))
}

pub async fn create_comment(
    state: web::Data<AppState>,
    user_id: UserId,
    payload: web::Json<CommentPayload>,
) -> Result<HttpResponse> {
    payload.validate()?;
    let payload = payload.into_inner();

    let comment = state
        .comments()
        .create_comment(NewComment {
            post_id: payload.post,
            user_id: user_id.0,
            text: payload.text,
        })
        .await?;
    Ok(HttpResponse::Created().json(CommentResponse::from(comment)))
}

pub async fn update_comment(
    state: web::Data<AppState>,
    user_id: UserId,
    comment_id: web::Path<i64>,
    payload: web::Json<CommentPayload>,
) -> Result<HttpResponse> {
    payload.validate()?;
    let payload = payload.into_inner();
    let changes = CommentChanges {
        post_id: Some(payload.post),
        text: Some(payload.text),
    };

    let comment = state
        .comments()
        .update_comment(user_id.0, *comment_id, changes)
        .await?;
    Ok(HttpResponse::Ok().json(CommentResponse::from(comment)))
}

pub async fn partial_update_comment(
    state: web::Data<AppState>,
    user_id: UserId,
    comment_id: web::Path<i64>,
    payload: web::Json<CommentPatch>,
) -> Result<HttpResponse> {
    payload.validate()?;
    let payload = payload.into_inner();
    let changes = CommentChanges {
        post_id: payload.post,
        text: payload.text,
    };

    let comment = state
        .comments()
        .update_comment(user_id.0, *comment_id, changes)
        .await?;
    Ok(HttpResponse::Ok().json(CommentResponse::from(comment)))
}

pub async fn delete_comment(
    state: web::Data<AppState>,
    user_id: UserId,
    comment_id: web::Path<i64>,
) -> Result<HttpResponse> {
    state
        .comments()
        .delete_comment(user_id.0, *comment_id)
        .await?;
    Ok(HttpResponse::NoContent().finish())
}
