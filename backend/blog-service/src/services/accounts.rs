/// Account service - registration, activation and token issuance
use crate::error::{AppError, Result};
use crate::models::{NewUser, User};
use crate::repository::UserRepository;
use crate::security::jwt::{JwtKeys, TokenPair, REFRESH_TOKEN};
use crate::security::password::{hash_password, verify_password};
use crate::services::Mailer;
use rand::{distributions::Alphanumeric, Rng};
use std::sync::Arc;

const ACTIVATION_CODE_LEN: usize = 32;
pub const MIN_PASSWORD_LEN: usize = 6;

pub struct AccountService<R: UserRepository + ?Sized> {
    repo: Arc<R>,
    jwt: Arc<JwtKeys>,
    mailer: Arc<dyn Mailer>,
    activation_base_url: String,
}

impl<R: UserRepository + ?Sized> AccountService<R> {
    pub fn new(
        repo: Arc<R>,
        jwt: Arc<JwtKeys>,
        mailer: Arc<dyn Mailer>,
        activation_base_url: impl Into<String>,
    ) -> Self {
        Self {
            repo,
            jwt,
            mailer,
            activation_base_url: activation_base_url.into(),
        }
    }

    fn activation_url(&self, code: &str) -> String {
        format!("{}{}/", self.activation_base_url, code)
    }

    /// Create an inactive account and mail its activation link
    pub async fn register(&self, email: &str, password: &str, password_confirm: &str) -> Result<User> {
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AppError::Validation(format!(
                "password: Ensure this field has at least {} characters.",
                MIN_PASSWORD_LEN
            )));
        }
        if password != password_confirm {
            return Err(AppError::Validation("Passwords do not match".to_string()));
        }

        let email = email.trim().to_lowercase();
        if self.repo.find_user_by_email(&email).await?.is_some() {
            return Err(AppError::Conflict("email already registered".to_string()));
        }

        let activation_code: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(ACTIVATION_CODE_LEN)
            .map(char::from)
            .collect();

        let user = self
            .repo
            .create_user(&NewUser {
                email,
                password_hash: hash_password(password)?,
                activation_code: activation_code.clone(),
            })
            .await?;

        self.mailer
            .send_activation(&user.email, &self.activation_url(&activation_code))
            .await?;

        tracing::info!(user_id = user.id, "user registered");
        Ok(user)
    }

    pub async fn activate(&self, code: &str) -> Result<User> {
        let user = self
            .repo
            .activate_user(code)
            .await?
            .ok_or_else(|| AppError::NotFound("Activation code not found".to_string()))?;
        tracing::info!(user_id = user.id, "user activated");
        Ok(user)
    }

    /// Exchange credentials of an active account for a token pair
    pub async fn login(&self, email: &str, password: &str) -> Result<TokenPair> {
        let invalid = || AppError::Unauthorized("Invalid email or password".to_string());

        let email = email.trim().to_lowercase();
        let user = self.repo.find_user_by_email(&email).await?.ok_or_else(invalid)?;
        verify_password(password, &user.password_hash)?;

        if !user.is_active {
            return Err(AppError::Unauthorized("Account is not activated".to_string()));
        }

        self.jwt.generate_token_pair(user.id, &user.email)
    }

    /// Issue a new access token from a valid refresh token
    pub async fn refresh(&self, refresh_token: &str) -> Result<String> {
        let claims = self.jwt.validate_token_of_type(refresh_token, REFRESH_TOKEN)?;
        let user_id = claims.user_id()?;

        match self.repo.find_user(user_id).await? {
            Some(user) if user.is_active => self.jwt.generate_access_token(user.id, &user.email),
            _ => Err(AppError::Unauthorized("User not found or inactive".to_string())),
        }
    }
}
