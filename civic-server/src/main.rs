use anyhow::{Context, Result};
use civic_server::{app, config, db, state::AppState};
use std::net::SocketAddr;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "civic_server=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let settings = config::Settings::new().context("Failed to load settings")?;

    let db = db::Database::new(&settings.database.path).context("Failed to create database")?;
    db.initialize().context("Failed to initialize database schema")?;
    tracing::info!("Database initialized at {}", settings.database.path);

    let state = AppState::with_session_ttl(db, settings.session.ttl_days);

    match state.session_manager.cleanup_expired_sessions() {
        Ok(count) if count > 0 => {
            tracing::info!("Cleaned up {} expired sessions on startup", count)
        }
        Ok(_) => tracing::info!("No expired sessions to clean up"),
        Err(e) => tracing::error!("Failed to cleanup expired sessions on startup: {}", e),
    }

    // Periodic session cleanup
    let cleanup_state = state.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(tokio::time::Duration::from_secs(3600));
        loop {
            interval.tick().await;
            tracing::debug!("Running periodic session cleanup...");
            if let Err(e) = cleanup_state.session_manager.cleanup_expired_sessions() {
                tracing::error!("Periodic session cleanup failed: {}", e);
            }
        }
    });

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = app(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    let addr: SocketAddr = format!("{}:{}", settings.server.host, settings.server.port)
        .parse()
        .context("Failed to parse server address")?;
    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    axum::serve(listener, app).await.context("Server error")?;
    Ok(())
}
