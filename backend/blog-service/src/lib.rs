/// Blog Service Library
///
/// A blogging backend: accounts with e-mail activation, posts filed under
/// categories with images, comments, ratings, likes and favourites.
///
/// # Modules
///
/// - `handlers`: HTTP request handlers and route table
/// - `models`: Records held by the entity store
/// - `services`: Business logic layer, including the tag engine and the post aggregator
/// - `repository`: Entity store traits with PostgreSQL and in-memory backends
/// - `middleware`: JWT authentication and ownership checks
/// - `security`: Password hashing and token handling
/// - `error`: Error types and handling
/// - `config`: Configuration management
pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod repository;
pub mod security;
pub mod services;

pub use config::Config;
pub use error::{AppError, Result};

use models::Category;
use repository::{BlogRepository, CategoryRepository};
use security::JwtKeys;
use services::{
    AccountService, CommentService, Mailer, MediaStorage, PostAggregator, PostService,
    RatingService, TagService,
};
use std::sync::Arc;

/// Shared application state handed to every handler
pub struct AppState {
    pub config: Arc<Config>,
    pub repo: Arc<dyn BlogRepository>,
    pub media: Arc<MediaStorage>,
    pub jwt: Arc<JwtKeys>,
    pub mailer: Arc<dyn Mailer>,
}

impl AppState {
    pub fn new(config: Config, repo: Arc<dyn BlogRepository>, mailer: Arc<dyn Mailer>) -> Self {
        Self {
            media: Arc::new(MediaStorage::new(&config.media)),
            jwt: Arc::new(JwtKeys::from_config(&config.auth)),
            config: Arc::new(config),
            repo,
            mailer,
        }
    }

    pub fn posts(&self) -> PostService<dyn BlogRepository> {
        PostService::new(self.repo.clone(), self.media.clone())
    }

    pub fn aggregator(&self) -> PostAggregator<dyn BlogRepository> {
        PostAggregator::new(self.repo.clone(), self.media.clone())
    }

    pub fn tags(&self) -> TagService<dyn BlogRepository> {
        TagService::new(self.repo.clone())
    }

    pub fn comments(&self) -> CommentService<dyn BlogRepository> {
        CommentService::new(self.repo.clone())
    }

    pub fn ratings(&self) -> RatingService<dyn BlogRepository> {
        RatingService::new(self.repo.clone())
    }

    pub fn accounts(&self) -> AccountService<dyn BlogRepository> {
        AccountService::new(
            self.repo.clone(),
            self.jwt.clone(),
            self.mailer.clone(),
            self.config.mail.activation_base_url.clone(),
        )
    }
}

/// Insert or rename the configured categories
pub async fn seed_categories(repo: &dyn BlogRepository, categories: &[(String, String)]) -> Result<()> {
    for (slug, name) in categories {
        repo.upsert_category(&Category {
            slug: slug.clone(),
            name: name.clone(),
        })
        .await?;
    }
    if !categories.is_empty() {
        tracing::info!(count = categories.len(), "categories seeded");
    }
    Ok(())
}
