/// Rating handlers; both endpoints require authentication
use crate::error::Result;
use crate::middleware::UserId;
use crate::models::Rating;
use crate::AppState;
use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub struct RatingResponse {
    pub post: i64,
    /// Omitted from the response to a rating submission
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<i64>,
    pub rating: i16,
}

impl From<Rating> for RatingResponse {
    fn from(rating: Rating) -> Self {
        Self {
            post: rating.post_id,
            author: Some(rating.author_id),
            rating: rating.rating,
        }
    }
}

/// The author is always the caller and is never read from the body
#[derive(Debug, Deserialize)]
pub struct RatingPayload {
    pub post: i64,
    pub rating: i64,
}

pub async fn list_ratings(state: web::Data<AppState>, _user_id: UserId) -> Result<HttpResponse> {
    let ratings: Vec<RatingResponse> = state
        .ratings()
        .list_ratings()
        .await?
        .into_iter()
        .map(RatingResponse::from)
        .collect();
    Ok(HttpResponse::Ok().json(ratings))
}

pub async fn rate_post(
    state: web::Data<AppState>,
    user_id: UserId,
    payload: web::Json<RatingPayload>,
) -> Result<HttpResponse> {
    let rating = state
        .ratings()
        .rate_post(user_id.0, payload.post, payload.rating)
        .await?;

    Ok(HttpResponse::Created().json(RatingResponse {
        author: None,
        ..RatingResponse::from(rating)
    }))
}
