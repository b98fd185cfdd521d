/// Account handlers - registration, activation and JWT issuance
use crate::error::Result;
use crate::AppState;
use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 6))]
    pub password: String,
    pub password_confirm: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh: String,
}

#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    pub access: String,
}

pub async fn register(
    state: web::Data<AppState>,
    payload: web::Json<RegisterRequest>,
) -> Result<HttpResponse> {
    payload.validate()?;

    let user = state
        .accounts()
        .register(&payload.email, &payload.password, &payload.password_confirm)
        .await?;

    Ok(HttpResponse::Created().json(serde_json::json!({
        "email": user.email,
        "message": "Registration successful. Check your e-mail to activate the account.",
    })))
}

pub async fn activate(state: web::Data<AppState>, code: web::Path<String>) -> Result<HttpResponse> {
    state.accounts().activate(&code).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Your account has been activated",
    })))
}

/// Obtain an access/refresh token pair
pub async fn login(
    state: web::Data<AppState>,
    payload: web::Json<LoginRequest>,
) -> Result<HttpResponse> {
    payload.validate()?;
    let pair = state
        .accounts()
        .login(&payload.email, &payload.password)
        .await?;
    Ok(HttpResponse::Ok().json(pair))
}

pub async fn refresh(
    state: web::Data<AppState>,
    payload: web::Json<RefreshRequest>,
) -> Result<HttpResponse> {
    let access = state.accounts().refresh(&payload.refresh).await?;
    Ok(HttpResponse::Ok().json(RefreshResponse { access }))
}
