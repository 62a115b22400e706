//! # HTTP Preview Server
//!
//! Renders ticket sheets from uploaded specs over HTTP.
//!
//! ## Usage
//!
//! ```bash
//! serial-stamp serve --listen 0.0.0.0:8080
//! ```
//!
//! Then open http://localhost:8080 in a browser to upload a spec and image.
//!
//! ## Endpoints
//!
//! | Method | Path | Form fields | Response |
//! |--------|------|-------------|----------|
//! | GET | `/` | | upload form |
//! | POST | `/api/preview` | `spec`, `image`, assets | PNG of the first page |
//! | POST | `/api/generate` | `spec`, `image`, assets | PDF of the whole run |
//! | POST | `/api/plan` | `spec` | JSON stack plan |
//!
//! Any other uploaded field is stored as a project asset under its field
//! name, so `ttf = "fonts/Title.ttf"` resolves against a field of that name.

mod handlers;
mod state;
mod static_files;

pub use state::{AppState, ServerConfig};

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use std::sync::Arc;

use crate::error::StampError;

/// Upload limit for spec, image and assets together.
const MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

/// Build the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(static_files::index_handler))
        .route("/api/preview", post(handlers::stamp::preview))
        .route("/api/generate", post(handlers::stamp::generate))
        .route("/api/plan", post(handlers::stamp::plan))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .with_state(Arc::new(state))
}

/// Start the HTTP server.
///
/// ## Example
///
/// ```no_run
/// use serial_stamp::server::{serve, ServerConfig};
///
/// # async fn example() -> Result<(), serial_stamp::StampError> {
/// let config = ServerConfig {
///     listen_addr: "0.0.0.0:8080".to_string(),
///     font_dirs: Vec::new(),
/// };
///
/// serve(config).await?;
/// # Ok(())
/// # }
/// ```
pub async fn serve(config: ServerConfig) -> Result<(), StampError> {
    let app = router(AppState::new(config.clone()));

    log::info!("serial-stamp HTTP server listening on {}", config.listen_addr);
    println!("Open http://{}/ in your browser", config.listen_addr);

    let listener = tokio::net::TcpListener::bind(&config.listen_addr)
        .await
        .map_err(|e| {
            StampError::Server(format!("Failed to bind to {}: {}", config.listen_addr, e))
        })?;

    axum::serve(listener, app)
        .await
        .map_err(|e| StampError::Server(format!("Server error: {}", e)))?;

    Ok(())
}
