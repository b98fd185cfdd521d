use crate::error::Result;
use crate::repository::CategoryRepository;
use crate::AppState;
use actix_web::{web, HttpResponse};

/// List every category
pub async fn list_categories(state: web::Data<AppState>) -> Result<HttpResponse> {
    let categories = state.repo.list_categories().await?;
    Ok(HttpResponse::Ok().json(categories))
}
