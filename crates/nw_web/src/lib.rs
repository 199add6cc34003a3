use axum::{
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

pub mod error;
pub mod handlers;
pub mod state;

pub use error::ApiError;
pub use handlers::{MessageResponse, ADDED_MESSAGE, UNCHANGED_MESSAGE};
pub use state::{AppState, BlockingAppState};

pub const ADD_NEWS_PATH: &str = "/add-news";
pub const NEWS_PATH: &str = "/news";
pub const FETCH_NEWS_PATH: &str = "/fetch-news";

/// Router whose handlers await the async store.
pub fn create_app(state: AppState) -> Router {
    Router::new()
        .route(ADD_NEWS_PATH, post(handlers::nonblocking::add_news))
        .route(NEWS_PATH, get(handlers::nonblocking::list_news))
        .route(FETCH_NEWS_PATH, post(handlers::nonblocking::fetch_news))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(Arc::new(state))
}

/// Router whose handlers run each store call on the blocking thread pool.
pub fn create_blocking_app(state: BlockingAppState) -> Router {
    Router::new()
        .route(ADD_NEWS_PATH, post(handlers::blocking::add_news))
        .route(NEWS_PATH, get(handlers::blocking::list_news))
        .route(FETCH_NEWS_PATH, post(handlers::blocking::fetch_news))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(Arc::new(state))
}

/// Serves `app` on `addr` until Ctrl+C or SIGTERM.
pub async fn serve(app: Router, addr: SocketAddr) -> nw_core::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    info!("🌐 Listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("👋 Server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => warn!("Received Ctrl+C, shutting down..."),
        _ = terminate => warn!("Received SIGTERM, shutting down..."),
    }
}
