//! Storage traits defining the interface for persistence

use async_trait::async_trait;
use news_hub_core::Post;

use crate::StorageError;

/// Trait for post storage operations
///
/// Every backend honours the same contract: identities are assigned by the
/// backend on create, a zero `created_at` is stamped with the current time,
/// and update/delete report [`StorageError::NotFound`] when no stored post
/// carries the given identity.
#[async_trait]
pub trait PostStorage: Send + Sync {
    /// Short backend name used in logs and health output
    fn backend_name(&self) -> &'static str;

    /// List every stored post; ordering is unspecified
    async fn list(&self) -> Result<Vec<Post>, StorageError>;

    /// Store a new post and return it with its assigned identity
    async fn create(&self, post: Post) -> Result<Post, StorageError>;

    /// Replace the title and content of an existing post
    async fn update(&self, post: Post) -> Result<(), StorageError>;

    /// Remove the post addressed by `post.id`
    async fn delete(&self, post: Post) -> Result<(), StorageError>;

    /// Release the underlying store handle
    async fn close(&self) {}
}
