//! MongoDB storage implementation
//!
//! Posts are self-contained documents; the author name is stored inline and
//! no author collection exists. Identities are driver-generated ObjectIds,
//! handed to callers as their 24 character hex form.

use async_trait::async_trait;
use mongodb::bson::{doc, oid::ObjectId};
use mongodb::error::ErrorKind;
use mongodb::{Client, Collection};
use news_hub_core::{Post, PostId};
use serde::{Deserialize, Serialize};
use tokio_stream::StreamExt;

use crate::{PostStorage, StorageError};

/// MongoDB storage configuration
#[derive(Debug, Clone)]
pub struct MongoConfig {
    pub connection_string: String,
    pub database: String,
    pub collection: String,
}

impl MongoConfig {
    pub fn new(connection_string: impl Into<String>) -> Self {
        Self {
            connection_string: connection_string.into(),
            ..Self::default()
        }
    }
}

impl Default for MongoConfig {
    fn default() -> Self {
        Self {
            connection_string: "mongodb://localhost:27017".to_string(),
            database: "news".to_string(),
            collection: "posts".to_string(),
        }
    }
}

/// Stored layout of a post document
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PostDocument {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    id: Option<ObjectId>,
    title: String,
    content: String,
    author_name: String,
    created_at: i64,
    #[serde(default)]
    published_at: i64,
}

impl PostDocument {
    fn from_post(post: &Post) -> Self {
        Self {
            id: None,
            title: post.title.clone(),
            content: post.content.clone(),
            author_name: post.author_name.clone(),
            created_at: post.created_at,
            published_at: post.published_at,
        }
    }

    fn into_post(self) -> Post {
        Post {
            id: self.id.map(|oid| PostId::new(oid.to_hex())).unwrap_or_default(),
            title: self.title,
            content: self.content,
            author_id: 0,
            author_name: self.author_name,
            created_at: self.created_at,
            published_at: self.published_at,
        }
    }
}

/// Convert a caller-facing id into the store's native identifier
fn object_id(id: &PostId) -> Result<ObjectId, StorageError> {
    ObjectId::parse_str(id.as_str()).map_err(|e| StorageError::InvalidId {
        id: id.to_string(),
        reason: e.to_string(),
    })
}

/// Split driver failures into transport, decode and operation errors
fn classify(
    err: mongodb::error::Error,
    context: &str,
    otherwise: fn(String) -> StorageError,
) -> StorageError {
    let message = format!("{}: {}", context, err);
    match err.kind.as_ref() {
        ErrorKind::Io(_) | ErrorKind::ServerSelection { .. } | ErrorKind::ConnectionPoolCleared { .. } => {
            StorageError::Unavailable(message)
        }
        ErrorKind::BsonDeserialization(_) => StorageError::Decode(message),
        _ => otherwise(message),
    }
}

/// MongoDB storage for posts
pub struct MongoStorage {
    collection: Collection<PostDocument>,
}

impl MongoStorage {
    /// Connect to the server and verify it answers a ping
    pub async fn new(config: MongoConfig) -> Result<Self, StorageError> {
        let client = Client::with_uri_str(&config.connection_string)
            .await
            .map_err(|e| StorageError::Connection(format!("Failed to connect to MongoDB: {}", e)))?;

        client
            .database(&config.database)
            .run_command(doc! { "ping": 1 }, None)
            .await
            .map_err(|e| StorageError::Connection(format!("Failed to ping MongoDB: {}", e)))?;

        tracing::info!(
            "Connected to MongoDB, database: {}, collection: {}",
            config.database,
            config.collection
        );

        Ok(Self::from_client(&client, &config.database, &config.collection))
    }

    /// Build on an existing client without checking connectivity
    pub fn from_client(client: &Client, database: &str, collection: &str) -> Self {
        Self {
            collection: client.database(database).collection(collection),
        }
    }
}

#[async_trait]
impl PostStorage for MongoStorage {
    fn backend_name(&self) -> &'static str {
        "mongo"
    }

    async fn list(&self) -> Result<Vec<Post>, StorageError> {
        let mut cursor = self
            .collection
            .find(None, None)
            .await
            .map_err(|e| classify(e, "Failed to find posts", StorageError::Query))?;

        let mut posts = Vec::new();
        while let Some(row) = cursor.next().await {
            // One undecodable document fails the whole listing
            let document = row.map_err(|e| classify(e, "Failed to read posts", StorageError::Query))?;
            posts.push(document.into_post());
        }

        Ok(posts)
    }

    async fn create(&self, mut post: Post) -> Result<Post, StorageError> {
        post.stamp_created_at();
        post.author_id = 0;

        let result = self
            .collection
            .insert_one(PostDocument::from_post(&post), None)
            .await
            .map_err(|e| classify(e, "Failed to add post", StorageError::Write))?;

        let oid = result.inserted_id.as_object_id().ok_or_else(|| {
            StorageError::Write(format!(
                "Inserted post has a non-ObjectId identifier: {}",
                result.inserted_id
            ))
        })?;
        post.id = PostId::new(oid.to_hex());

        tracing::debug!("Saved post {}", post.id);
        Ok(post)
    }

    async fn update(&self, post: Post) -> Result<(), StorageError> {
        let oid = object_id(&post.id)?;

        let mut fields = doc! {
            "title": post.title,
            "content": post.content,
        };
        // Blank denormalized fields mean "leave as stored"
        if !post.author_name.is_empty() {
            fields.insert("authorName", post.author_name);
        }
        if post.created_at != 0 {
            fields.insert("createdAt", post.created_at);
        }

        let result = self
            .collection
            .update_one(doc! { "_id": oid }, doc! { "$set": fields }, None)
            .await
            .map_err(|e| classify(e, "Failed to update post", StorageError::Write))?;

        if result.matched_count == 0 {
            return Err(StorageError::NotFound(format!("Post with id {} not found", oid)));
        }
        Ok(())
    }

    async fn delete(&self, post: Post) -> Result<(), StorageError> {
        let oid = object_id(&post.id)?;

        let result = self
            .collection
            .delete_one(doc! { "_id": oid }, None)
            .await
            .map_err(|e| classify(e, "Failed to delete post", StorageError::Delete))?;

        if result.deleted_count == 0 {
            return Err(StorageError::NotFound(format!("Post with id {} not found", oid)));
        }
        Ok(())
    }
}
