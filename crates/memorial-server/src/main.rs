use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::info;

use memorial_api::rate_limit::{RateLimiter, SUBMISSION_WINDOW};
use memorial_api::state::{AppState, AppStateInner, ApprovalPolicy};
use memorial_api::storage::PhotoStorage;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "memorial=debug,tower_http=debug".into()),
        )
        .init();

    // Config
    let db_path = std::env::var("MEMORIAL_DB_PATH").unwrap_or_else(|_| "memorial.db".into());
    let photo_dir = std::env::var("MEMORIAL_PHOTO_DIR").unwrap_or_else(|_| "./photos".into());
    let static_dir = std::env::var("MEMORIAL_STATIC_DIR").unwrap_or_else(|_| "./public".into());
    let public_url =
        std::env::var("MEMORIAL_PUBLIC_URL").unwrap_or_else(|_| "http://localhost:3000".into());
    let approval: ApprovalPolicy = std::env::var("MEMORIAL_APPROVAL")
        .unwrap_or_else(|_| "auto".into())
        .parse()?;
    let host = std::env::var("MEMORIAL_HOST").unwrap_or_else(|_| "0.0.0.0".into());
    let port: u16 = std::env::var("MEMORIAL_PORT")
        .unwrap_or_else(|_| "3000".into())
        .parse()?;

    // Init database and photo storage
    let db = memorial_db::Database::open(&PathBuf::from(&db_path))?;
    let storage = PhotoStorage::new(PathBuf::from(&photo_dir), public_url).await?;

    // Shared state
    let state: AppState = Arc::new(AppStateInner {
        db,
        storage,
        rate_limiter: RateLimiter::new(SUBMISSION_WINDOW),
        approval,
    });

    // Guestbook API plus the prebuilt static site as fallback
    let app = memorial_api::router(state)
        .fallback_service(ServeDir::new(&static_dir))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    info!("Memorial server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
