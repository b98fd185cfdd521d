/// Configuration management for Blog Service
///
/// Configuration is read once from environment variables (a `.env` file is
/// honoured by `main`) and handed to the components that need it. Nothing in
/// the service reads the environment after startup.
use serde::{Deserialize, Serialize};

const DEFAULT_JWT_SECRET: &str = "insecure-development-secret";

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Application settings
    pub app: AppConfig,
    /// CORS configuration
    pub cors: CorsConfig,
    /// Database configuration
    pub database: DatabaseConfig,
    /// Uploaded media location
    pub media: MediaConfig,
    /// Token settings
    pub auth: AuthConfig,
    /// Activation mail settings
    pub mail: MailConfig,
    /// Categories inserted at startup, as `(slug, name)`
    #[serde(default)]
    pub seed_categories: Vec<(String, String)>,
}

/// Application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Application environment (dev, staging, prod)
    pub env: String,
    /// Server host to bind to
    pub host: String,
    /// Server port to bind to
    pub port: u16,
    /// HTTP worker count
    pub workers: usize,
}

/// CORS configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    /// Comma-separated list of allowed origins
    pub allowed_origins: String,
}

/// Which entity store backs the service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Postgres,
    Memory,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub backend: StorageBackend,
    /// Database URL
    pub url: String,
    /// Max connections in pool
    pub max_connections: u32,
    /// Min connections in pool
    pub min_connections: u32,
    /// Seconds to wait for a pooled connection
    pub acquire_timeout_secs: u64,
    /// Apply the bundled schema on startup
    pub run_migrations: bool,
}

/// Media configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaConfig {
    /// Directory uploaded images are written to
    pub root: String,
    /// URL path prefix media files are published under, e.g. `/media/`
    pub url_prefix: String,
}

/// JWT configuration
#[derive(Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub access_token_ttl_secs: i64,
    pub refresh_token_ttl_secs: i64,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &"[REDACTED]")
            .field("access_token_ttl_secs", &self.access_token_ttl_secs)
            .field("refresh_token_ttl_secs", &self.refresh_token_ttl_secs)
            .finish()
    }
}

/// Mail configuration
#[derive(Clone, Serialize, Deserialize)]
pub struct MailConfig {
    /// Sender address for account mails
    pub from: String,
    /// Activation links are `<activation_base_url><code>/`
    pub activation_base_url: String,
    /// SMTP relay host; empty means mails are only logged
    pub smtp_host: String,
    pub smtp_port: u16,
    pub smtp_username: Option<String>,
    pub smtp_password: Option<String>,
    pub use_starttls: bool,
}

impl std::fmt::Debug for MailConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MailConfig")
            .field("from", &self.from)
            .field("activation_base_url", &self.activation_base_url)
            .field("smtp_host", &self.smtp_host)
            .field("smtp_port", &self.smtp_port)
            .field("smtp_username", &self.smtp_username)
            .field("smtp_password", &self.smtp_password.as_ref().map(|_| "[REDACTED]"))
            .field("use_starttls", &self.use_starttls)
            .finish()
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, String> {
        let app_env = std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string());
        let production = app_env.eq_ignore_ascii_case("production");

        let backend = match std::env::var("STORAGE_BACKEND") {
            Ok(value) => parse_backend(&value)?,
            Err(_) => StorageBackend::Postgres,
        };

        let jwt_secret =
            std::env::var("JWT_SECRET").unwrap_or_else(|_| DEFAULT_JWT_SECRET.to_string());
        if production && jwt_secret == DEFAULT_JWT_SECRET {
            return Err("JWT_SECRET must be set in production".to_string());
        }

        let port = parse_env_or_default("BLOG_SERVICE_PORT", 8000u16)?;

        Ok(Config {
            app: AppConfig {
                env: app_env.clone(),
                host: std::env::var("BLOG_SERVICE_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port,
                workers: parse_env_or_default("BLOG_SERVICE_WORKERS", 4usize)?,
            },
            cors: {
                let allowed_origins = match std::env::var("CORS_ALLOWED_ORIGINS") {
                    Ok(value) => value,
                    Err(_) if production => {
                        return Err("CORS_ALLOWED_ORIGINS must be set in production".to_string())
                    }
                    Err(_) => "http://localhost:3000".to_string(),
                };

                if production && allowed_origins.trim() == "*" {
                    return Err("CORS_ALLOWED_ORIGINS cannot be '*' in production".to_string());
                }

                CorsConfig { allowed_origins }
            },
            database: DatabaseConfig {
                backend,
                url: std::env::var("DATABASE_URL")
                    .unwrap_or_else(|_| "postgresql://localhost/blog".to_string()),
                max_connections: parse_env_or_default("DATABASE_MAX_CONNECTIONS", 10u32)?,
                min_connections: parse_env_or_default("DATABASE_MIN_CONNECTIONS", 1u32)?,
                acquire_timeout_secs: parse_env_or_default("DATABASE_ACQUIRE_TIMEOUT_SECS", 10u64)?,
                run_migrations: parse_env_or_default("DATABASE_RUN_MIGRATIONS", true)?,
            },
            media: MediaConfig {
                root: std::env::var("MEDIA_ROOT").unwrap_or_else(|_| "media".to_string()),
                url_prefix: normalize_prefix(
                    &std::env::var("MEDIA_URL").unwrap_or_else(|_| "/media/".to_string()),
                ),
            },
            auth: AuthConfig {
                jwt_secret,
                access_token_ttl_secs: parse_env_or_default("JWT_ACCESS_TTL_SECS", 300i64)?,
                refresh_token_ttl_secs: parse_env_or_default("JWT_REFRESH_TTL_SECS", 86_400i64)?,
            },
            mail: MailConfig {
                from: std::env::var("MAIL_FROM").unwrap_or_else(|_| "test@test.com".to_string()),
                activation_base_url: std::env::var("ACTIVATION_BASE_URL").unwrap_or_else(|_| {
                    format!("http://localhost:{}/v1/api/account/activate/", port)
                }),
                smtp_host: std::env::var("SMTP_HOST").unwrap_or_default(),
                smtp_port: parse_env_or_default("SMTP_PORT", 587u16)?,
                smtp_username: non_empty_env("SMTP_USERNAME"),
                smtp_password: non_empty_env("SMTP_PASSWORD"),
                use_starttls: parse_env_or_default("SMTP_USE_STARTTLS", true)?,
            },
            seed_categories: std::env::var("SEED_CATEGORIES")
                .map(|raw| parse_categories(&raw))
                .unwrap_or_default(),
        })
    }
}

fn parse_backend(value: &str) -> Result<StorageBackend, String> {
    match value.trim().to_ascii_lowercase().as_str() {
        "postgres" | "postgresql" => Ok(StorageBackend::Postgres),
        "memory" => Ok(StorageBackend::Memory),
        other => Err(format!("Unknown STORAGE_BACKEND '{}'", other)),
    }
}

fn parse_env_or_default<T>(key: &str, default: T) -> Result<T, String>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(val) => val
            .parse()
            .map_err(|e| format!("Failed to parse {}='{}': {}", key, val, e)),
        Err(_) => Ok(default),
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.trim().is_empty())
}

/// Parse `slug=Name;slug2=Other` pairs. Malformed entries are skipped.
fn parse_categories(raw: &str) -> Vec<(String, String)> {
    raw.split(';')
        .filter_map(|entry| {
            let (slug, name) = entry.split_once('=')?;
            let (slug, name) = (slug.trim(), name.trim());
            if slug.is_empty() || name.is_empty() {
                None
            } else {
                Some((slug.to_string(), name.to_string()))
            }
        })
        .collect()
}

fn normalize_prefix(prefix: &str) -> String {
    let trimmed = prefix.trim().trim_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else {
        format!("/{}/", trimmed)
    }
}
