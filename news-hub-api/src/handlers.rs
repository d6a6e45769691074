//! API request handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use news_hub_core::{CreatePostRequest, Post, PostId, UpdatePostRequest};
use std::sync::Arc;

use crate::{ApiError, AppState};

/// List all posts
pub async fn list_posts(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, ApiError> {
    let posts = state.storage.list().await?;
    Ok(Json(posts))
}

/// Create a new post
pub async fn create_post(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreatePostRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let post = req.into_post()?;
    let saved = state.storage.create(post).await?;

    tracing::info!("Created post {} by '{}'", saved.id, saved.author_name);

    Ok((StatusCode::CREATED, Json(saved)))
}

/// Update the title and content of a post
pub async fn update_post(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<UpdatePostRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let post = req.into_post(PostId::from(id))?;
    let id = post.id.clone();
    state.storage.update(post).await?;

    tracing::info!("Updated post {}", id);

    Ok(StatusCode::NO_CONTENT)
}

/// Delete a post by ID
pub async fn delete_post(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    state.storage.delete(Post::with_id(id.as_str())).await?;

    tracing::info!("Deleted post {}", id);

    Ok(StatusCode::NO_CONTENT)
}

/// Health check endpoint
pub async fn health_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "news-hub",
        "backend": state.storage.backend_name()
    }))
}
