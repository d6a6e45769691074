//! News Hub API Server
//!
//! REST API for creating, listing, updating and deleting posts.

pub mod config;
pub mod error;
pub mod handlers;
pub mod state;

pub use config::Settings;
pub use error::ApiError;
pub use state::AppState;

use axum::{
    routing::{get, put},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

pub fn create_router(app_state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        // Posts
        .route("/api/posts", get(handlers::list_posts).post(handlers::create_post))
        .route("/api/posts/:id", put(handlers::update_post).delete(handlers::delete_post))
        // Middleware
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}
