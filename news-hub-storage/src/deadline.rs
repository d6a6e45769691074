//! Per-operation deadline wrapper for any storage backend

use async_trait::async_trait;
use news_hub_core::Post;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use crate::{PostStorage, StorageError};

/// Bounds every storage call with a fixed deadline.
///
/// The inner future is dropped when the deadline passes, which cancels the
/// pending driver round trip.
pub struct DeadlineStorage {
    inner: Arc<dyn PostStorage>,
    limit: Duration,
}

impl DeadlineStorage {
    pub fn new(inner: Arc<dyn PostStorage>, limit: Duration) -> Self {
        Self { inner, limit }
    }

    async fn bounded<T, F>(&self, operation: &'static str, fut: F) -> Result<T, StorageError>
    where
        F: Future<Output = Result<T, StorageError>>,
    {
        match tokio::time::timeout(self.limit, fut).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!(
                    "{} on {} exceeded {:?}",
                    operation,
                    self.inner.backend_name(),
                    self.limit
                );
                Err(StorageError::Timeout {
                    operation,
                    after: self.limit,
                })
            }
        }
    }
}

#[async_trait]
impl PostStorage for DeadlineStorage {
    fn backend_name(&self) -> &'static str {
        self.inner.backend_name()
    }

    async fn list(&self) -> Result<Vec<Post>, StorageError> {
        self.bounded("list", self.inner.list()).await
    }

    async fn create(&self, post: Post) -> Result<Post, StorageError> {
        self.bounded("create", self.inner.create(post)).await
    }

    async fn update(&self, post: Post) -> Result<(), StorageError> {
        self.bounded("update", self.inner.update(post)).await
    }

    async fn delete(&self, post: Post) -> Result<(), StorageError> {
        self.bounded("delete", self.inner.delete(post)).await
    }

    async fn close(&self) {
        self.inner.close().await
    }
}
