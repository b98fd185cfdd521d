use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpResponse, HttpServer};
use anyhow::Context;
use blog_service::config::StorageBackend;
use blog_service::handlers;
use blog_service::repository::postgres::create_pool;
use blog_service::repository::{BlogRepository, MemoryRepository, PgRepository};
use blog_service::services::mailer_from_config;
use blog_service::{seed_categories, AppState, Config};
use sqlx::PgPool;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

struct HealthState {
    db_pool: Option<PgPool>,
}

async fn health_summary(state: web::Data<HealthState>) -> HttpResponse {
    let check = match &state.db_pool {
        Some(pool) => sqlx::query("SELECT 1").execute(pool).await.map(|_| ()),
        None => Ok(()),
    };

    match check {
        Ok(_) => HttpResponse::Ok().json(serde_json::json!({
            "status": "ok",
            "service": "blog-service",
            "version": env!("CARGO_PKG_VERSION")
        })),
        Err(e) => HttpResponse::ServiceUnavailable().json(serde_json::json!({
            "status": "unhealthy",
            "error": format!("PostgreSQL connection failed: {}", e),
            "service": "blog-service"
        })),
    }
}

async fn liveness_check() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({"alive": true}))
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut terminate) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {},
                    _ = terminate.recv() => {},
                }
            }
            Err(e) => {
                tracing::warn!("Failed to install SIGTERM handler: {}", e);
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}

/// Blog Service
///
/// Serves the blog REST API under `/v1/api` on port 8000 (configurable via
/// BLOG_SERVICE_PORT), backed by PostgreSQL or, with STORAGE_BACKEND=memory,
/// by a process-local store.
#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,actix_web=info,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env().map_err(|e| anyhow::anyhow!(e))?;
    tracing::info!(
        env = %config.app.env,
        backend = ?config.database.backend,
        "Starting blog-service"
    );

    let (repo, db_pool): (Arc<dyn BlogRepository>, Option<PgPool>) = match config.database.backend {
        StorageBackend::Postgres => {
            let pool = create_pool(&config.database)
                .await
                .context("Failed to create database pool")?;
            let repo = PgRepository::new(pool.clone());
            if config.database.run_migrations {
                repo.run_migrations()
                    .await
                    .context("Failed to run database migrations")?;
            }
            let repo: Arc<dyn BlogRepository> = Arc::new(repo);
            (repo, Some(pool))
        }
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory storage; data is lost on restart");
            let repo: Arc<dyn BlogRepository> = Arc::new(MemoryRepository::new());
            (repo, None)
        }
    };

    seed_categories(repo.as_ref(), &config.seed_categories)
        .await
        .context("Failed to seed categories")?;

    tokio::fs::create_dir_all(&config.media.root)
        .await
        .with_context(|| format!("Failed to create media root {}", config.media.root))?;

    let bind_address = format!("{}:{}", config.app.host, config.app.port);
    let workers = config.app.workers;
    let cors_origins = config.cors.allowed_origins.clone();

    let mailer = mailer_from_config(&config.mail).context("Failed to configure mailer")?;
    let app_state = web::Data::new(AppState::new(config, repo, mailer));
    let health_state = web::Data::new(HealthState { db_pool });

    tracing::info!("Starting HTTP server on {}", bind_address);

    let server = HttpServer::new(move || {
        let mut cors = Cors::default();
        for origin in cors_origins.split(',') {
            let origin = origin.trim();
            if origin == "*" {
                cors = cors.allow_any_origin();
            } else if !origin.is_empty() {
                cors = cors.allowed_origin(origin);
            }
        }
        cors = cors.allow_any_method().allow_any_header().max_age(3600);

        App::new()
            .app_data(app_state.clone())
            .app_data(health_state.clone())
            .wrap(cors)
            .wrap(Logger::default())
            .wrap(tracing_actix_web::TracingLogger::default())
            // Health check endpoints
            .route("/api/v1/health", web::get().to(health_summary))
            .route("/api/v1/health/live", web::get().to(liveness_check))
            .configure(handlers::configure)
    })
    .bind(&bind_address)
    .with_context(|| format!("Failed to bind {}", bind_address))?
    .workers(workers)
    .run();

    let server_handle = server.handle();
    let server_task = tokio::spawn(server);

    shutdown_signal().await;
    tracing::info!("Shutdown signal received");
    server_handle.stop(true).await;

    server_task
        .await
        .context("HTTP server task panicked")?
        .context("HTTP server failed")?;

    tracing::info!("blog-service stopped");
    Ok(())
}
