//! BDD Test Harness for News Hub API
//!
//! Run with: cargo test --test bdd
//!
//! Scenarios drive the router in-process against in-memory storage,
//! so no server or database has to be running.

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use cucumber::{given, then, when, World};
use news_hub_api::{create_router, AppState};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tower::ServiceExt;

/// World state shared across steps
#[derive(Default, World)]
pub struct NewsWorld {
    /// Router under test
    app: Option<Router>,

    /// Last HTTP response status
    last_status: Option<StatusCode>,

    /// Last response body as JSON
    last_response: Option<Value>,

    /// Post title -> ID mapping
    post_ids: HashMap<String, String>,
}

impl fmt::Debug for NewsWorld {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewsWorld")
            .field("last_status", &self.last_status)
            .field("last_response", &self.last_response)
            .field("post_ids", &self.post_ids)
            .finish()
    }
}

impl NewsWorld {
    async fn request(&mut self, method: &str, uri: &str, body: Option<Value>) -> Value {
        let app = self.app.clone().expect("Service not started. Add 'Given an empty news service'");

        let builder = Request::builder().method(method).uri(uri);
        let req = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("Failed to build request");

        let resp = app.oneshot(req).await.expect("Request failed");
        self.last_status = Some(resp.status());

        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .expect("Failed to read body");
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("Failed to parse response")
        };
        self.last_response = Some(json.clone());
        json
    }

    async fn list(&mut self) -> Vec<Value> {
        let body = self.request("GET", "/api/posts", None).await;
        body.as_array().cloned().expect("Listing is not an array")
    }

    async fn find_by_title(&mut self, title: &str) -> Value {
        self.list()
            .await
            .into_iter()
            .find(|p| p["title"] == title)
            .unwrap_or_else(|| panic!("No post titled '{}'", title))
    }

    fn id_of(&self, title: &str) -> String {
        self.post_ids
            .get(title)
            .cloned()
            .unwrap_or_else(|| panic!("Post '{}' not created in this scenario", title))
    }

    async fn publish(&mut self, title: &str, content: &str, author: &str) {
        let body = json!({
            "title": title,
            "content": content,
            "author_name": author
        });
        let json = self.request("POST", "/api/posts", Some(body)).await;
        if let Some(id) = json["id"].as_str() {
            self.post_ids.insert(title.to_string(), id.to_string());
        }
    }
}

// ==================== GIVEN Steps ====================

#[given("an empty news service")]
async fn empty_service(world: &mut NewsWorld) {
    world.app = Some(create_router(Arc::new(AppState::new())));
}

#[given(expr = "a post {string} by {string} exists")]
async fn post_exists(world: &mut NewsWorld, title: String, author: String) {
    world.publish(&title, "body", &author).await;
    assert_eq!(world.last_status, Some(StatusCode::CREATED));
}

// ==================== WHEN Steps ====================

#[when(expr = "I publish a post {string} with content {string} by {string}")]
async fn publish_post(world: &mut NewsWorld, title: String, content: String, author: String) {
    world.publish(&title, &content, &author).await;
}

#[when(expr = "I retitle the post {string} to {string}")]
async fn retitle_post(world: &mut NewsWorld, old: String, new: String) {
    let id = world.id_of(&old);
    let body = json!({ "title": new, "content": "body" });
    world.request("PUT", &format!("/api/posts/{}", id), Some(body)).await;
    world.post_ids.insert(new, id);
}

#[when(expr = "I delete the post {string}")]
async fn delete_post(world: &mut NewsWorld, title: String) {
    let id = world.id_of(&title);
    world.request("DELETE", &format!("/api/posts/{}", id), None).await;
}

#[when(expr = "I delete the post with id {string}")]
async fn delete_post_by_id(world: &mut NewsWorld, id: String) {
    world.request("DELETE", &format!("/api/posts/{}", id), None).await;
}

// ==================== THEN Steps ====================

#[then(expr = "the response status should be {int}")]
async fn response_status(world: &mut NewsWorld, expected: u16) {
    let status = world.last_status.expect("No response received");
    assert_eq!(status.as_u16(), expected, "Unexpected status code: {:?}", world.last_response);
}

#[then(expr = "the response should contain {string}")]
async fn response_contains(world: &mut NewsWorld, expected: String) {
    let resp = world.last_response.as_ref().expect("No response received");
    let resp_str = resp.to_string();
    assert!(resp_str.contains(&expected), "Response does not contain '{}': {}", expected, resp_str);
}

#[then(expr = "listing posts returns {int} post(s)")]
async fn listing_count(world: &mut NewsWorld, expected: usize) {
    let posts = world.list().await;
    assert_eq!(posts.len(), expected, "Unexpected posts: {:?}", posts);
}

#[then(expr = "the post {string} is authored by {string}")]
async fn authored_by(world: &mut NewsWorld, title: String, author: String) {
    let post = world.find_by_title(&title).await;
    assert_eq!(post["author_name"], author);
}

#[then(expr = "the post {string} has a creation time")]
async fn has_creation_time(world: &mut NewsWorld, title: String) {
    let post = world.find_by_title(&title).await;
    assert!(post["created_at"].as_i64().unwrap_or(0) > 0, "created_at not stamped: {}", post);
}

// ==================== Main ====================

#[tokio::main]
async fn main() {
    NewsWorld::cucumber()
        .fail_on_skipped()
        .run_and_exit("tests/features")
        .await;
}
