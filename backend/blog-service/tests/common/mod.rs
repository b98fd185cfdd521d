#![allow(dead_code)]

use actix_web::http::header;
use actix_web::web;
use blog_service::config::{
    AppConfig, AuthConfig, Config, CorsConfig, DatabaseConfig, MailConfig, MediaConfig,
    StorageBackend,
};
use blog_service::models::{NewPost, Post};
use blog_service::repository::MemoryRepository;
use blog_service::services::LogMailer;
use blog_service::{seed_categories, AppState};
use chrono::{Duration, Utc};
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

pub const HOST: &str = "blog.test";
pub const PASSWORD: &str = "correct-horse";

pub struct TestContext {
    pub repo: Arc<MemoryRepository>,
    pub state: web::Data<AppState>,
    pub media_dir: TempDir,
}

pub fn test_config(media_root: &Path) -> Config {
    Config {
        app: AppConfig {
            env: "test".to_string(),
            host: "127.0.0.1".to_string(),
            port: 0,
            workers: 1,
        },
        cors: CorsConfig {
            allowed_origins: "*".to_string(),
        },
        database: DatabaseConfig {
            backend: StorageBackend::Memory,
            url: String::new(),
            max_connections: 1,
            min_connections: 1,
            acquire_timeout_secs: 1,
            run_migrations: false,
        },
        media: MediaConfig {
            root: media_root.to_string_lossy().into_owned(),
            url_prefix: "/media/".to_string(),
        },
        auth: AuthConfig {
            jwt_secret: "integration-secret".to_string(),
            access_token_ttl_secs: 300,
            refresh_token_ttl_secs: 3600,
        },
        mail: MailConfig {
            from: "test@test.com".to_string(),
            activation_base_url: format!("http://{}/v1/api/account/activate/", HOST),
            smtp_host: String::new(),
            smtp_port: 587,
            smtp_username: None,
            smtp_password: None,
            use_starttls: true,
        },
        seed_categories: vec![
            ("pets".to_string(), "Pets".to_string()),
            ("misc".to_string(), "Misc".to_string()),
        ],
    }
}

/// Fresh in-memory service with the `pets` and `misc` categories
pub async fn context() -> TestContext {
    let media_dir = tempfile::tempdir().expect("media dir");
    let config = test_config(media_dir.path());
    let repo = Arc::new(MemoryRepository::new());

    seed_categories(repo.as_ref(), &config.seed_categories)
        .await
        .expect("seed categories");

    let mailer = Arc::new(LogMailer::new(&config.mail));
    let state = web::Data::new(AppState::new(config, repo.clone(), mailer));

    TestContext {
        repo,
        state,
        media_dir,
    }
}

/// Register and activate an account, returning its id and an access token
pub async fn signup(ctx: &TestContext, email: &str) -> (i64, String) {
    let accounts = ctx.state.accounts();
    let user = accounts
        .register(email, PASSWORD, PASSWORD)
        .await
        .expect("register");
    accounts
        .activate(user.activation_code.as_deref().expect("activation code"))
        .await
        .expect("activate");
    let pair = accounts.login(email, PASSWORD).await.expect("login");
    (user.id, pair.access)
}

pub fn bearer(token: &str) -> (header::HeaderName, String) {
    (header::AUTHORIZATION, format!("Bearer {}", token))
}

/// Store a post created `age_days` ago
pub async fn insert_post(
    ctx: &TestContext,
    author_id: i64,
    title: &str,
    text: &str,
    age_days: i64,
) -> Post {
    ctx.repo
        .insert_post_at(
            &NewPost {
                author_id,
                category_slug: "pets".to_string(),
                title: title.to_string(),
                text: text.to_string(),
            },
            Utc::now() - Duration::days(age_days),
        )
        .await
        .expect("insert post")
}

const BOUNDARY: &str = "----blog-test-boundary";

/// Encode a `multipart/form-data` body; returns the content type and payload
pub fn multipart_body(fields: &[(&str, &str)], files: &[(&str, &str, &[u8])]) -> (String, Vec<u8>) {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
                BOUNDARY, name, value
            )
            .as_bytes(),
        );
    }
    for (name, file_name, bytes) in files {
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: application/octet-stream\r\n\r\n",
                BOUNDARY, name, file_name
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());

    (format!("multipart/form-data; boundary={}", BOUNDARY), body)
}
