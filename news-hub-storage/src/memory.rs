//! In-memory storage implementation for development and testing

use async_trait::async_trait;
use news_hub_core::{Post, PostId};
use std::collections::BTreeMap;
use tokio::sync::RwLock;

use crate::{PostStorage, StorageError};

#[derive(Default)]
struct Inner {
    next_id: u64,
    posts: BTreeMap<u64, Post>,
}

/// In-memory storage for development and testing
///
/// Identities come from a sequential counter starting at 1 and are never
/// reused, even after a delete.
pub struct InMemoryStorage {
    inner: RwLock<Inner>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner::default()),
        }
    }
}

impl Default for InMemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PostStorage for InMemoryStorage {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn list(&self) -> Result<Vec<Post>, StorageError> {
        let inner = self.inner.read().await;
        Ok(inner.posts.values().cloned().collect())
    }

    async fn create(&self, mut post: Post) -> Result<Post, StorageError> {
        let mut inner = self.inner.write().await;
        inner.next_id += 1;
        let key = inner.next_id;

        post.id = PostId::from(key);
        post.author_id = 0;
        post.stamp_created_at();

        inner.posts.insert(key, post.clone());
        tracing::debug!("Stored post {} in memory", post.id);
        Ok(post)
    }

    async fn update(&self, post: Post) -> Result<(), StorageError> {
        let key: u64 = post.id.parse()?;
        let mut inner = self.inner.write().await;
        match inner.posts.get_mut(&key) {
            Some(existing) => {
                existing.title = post.title;
                existing.content = post.content;
                Ok(())
            }
            None => Err(StorageError::NotFound(format!(
                "Post with id {} not found",
                post.id
            ))),
        }
    }

    async fn delete(&self, post: Post) -> Result<(), StorageError> {
        let key: u64 = post.id.parse()?;
        let mut inner = self.inner.write().await;
        if inner.posts.remove(&key).is_some() {
            Ok(())
        } else {
            Err(StorageError::NotFound(format!(
                "Post with id {} not found",
                post.id
            )))
        }
    }
}
