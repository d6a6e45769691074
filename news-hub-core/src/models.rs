//! Core domain models

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::CoreError;

/// Caller-facing identity of a post.
///
/// The value is opaque: each backend decides what it means (a counter, a
/// serial primary key, an ObjectId hex string) and converts it back into
/// its native type with [`PostId::parse`] or its own parser. Ids are not
/// portable between backends.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PostId(String);

impl PostId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// An empty id marks a post that has not been stored yet
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Convert into a backend-native scalar key
    pub fn parse<T>(&self) -> Result<T, CoreError>
    where
        T: FromStr,
        T::Err: fmt::Display,
    {
        self.0.trim().parse::<T>().map_err(|e| CoreError::InvalidPostId {
            id: self.0.clone(),
            reason: e.to_string(),
        })
    }
}

impl fmt::Display for PostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for PostId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for PostId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<u64> for PostId {
    fn from(value: u64) -> Self {
        Self(value.to_string())
    }
}

impl From<i64> for PostId {
    fn from(value: i64) -> Self {
        Self(value.to_string())
    }
}

/// Current wall-clock time as a Unix timestamp in seconds
pub fn unix_now() -> i64 {
    Utc::now().timestamp()
}

/// A news post, the shape every storage backend reads and writes
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    /// Backend-assigned identity (empty until stored)
    #[serde(default)]
    pub id: PostId,
    pub title: String,
    pub content: String,
    /// Normalized author key; only the relational backend fills it in
    #[serde(default)]
    pub author_id: i64,
    pub author_name: String,
    /// Unix seconds; zero means "stamp on create"
    #[serde(default)]
    pub created_at: i64,
    /// Unix seconds
    #[serde(default)]
    pub published_at: i64,
}

impl Post {
    pub fn new(title: impl Into<String>, content: impl Into<String>, author_name: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            author_name: author_name.into(),
            ..Self::default()
        }
    }

    /// Identity-only value, enough to address a post for deletion
    pub fn with_id(id: impl Into<PostId>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    /// Fill `created_at` with the current time if the caller left it at zero
    pub fn stamp_created_at(&mut self) {
        if self.created_at == 0 {
            self.created_at = unix_now();
        }
    }
}

/// Request to create a new post
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePostRequest {
    pub title: String,
    pub content: String,
    pub author_name: String,
    #[serde(default)]
    pub created_at: i64,
    #[serde(default)]
    pub published_at: i64,
}

impl CreatePostRequest {
    pub fn into_post(self) -> Result<Post, CoreError> {
        require("title", &self.title)?;
        require("content", &self.content)?;
        require("author_name", &self.author_name)?;

        Ok(Post {
            id: PostId::default(),
            title: self.title,
            content: self.content,
            author_id: 0,
            author_name: self.author_name,
            created_at: self.created_at,
            published_at: self.published_at,
        })
    }
}

/// Request to update an existing post
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdatePostRequest {
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub author_name: String,
    #[serde(default)]
    pub created_at: i64,
}

impl UpdatePostRequest {
    pub fn into_post(self, id: PostId) -> Result<Post, CoreError> {
        require("title", &self.title)?;
        require("content", &self.content)?;

        Ok(Post {
            id,
            title: self.title,
            content: self.content,
            author_id: 0,
            author_name: self.author_name,
            created_at: self.created_at,
            published_at: 0,
        })
    }
}

fn require(field: &'static str, value: &str) -> Result<(), CoreError> {
    if value.trim().is_empty() {
        Err(CoreError::MissingField(field))
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stamp_created_at_only_when_zero() {
        let mut post = Post::new("A", "B", "Bob");
        post.stamp_created_at();
        assert!(post.created_at > 0);

        let mut dated = Post::new("A", "B", "Bob");
        dated.created_at = 42;
        dated.stamp_created_at();
        assert_eq!(dated.created_at, 42);
    }

    #[test]
    fn test_post_id_parse() {
        assert_eq!(PostId::from(17_u64).parse::<u64>().unwrap(), 17);

        let err = PostId::from("abc").parse::<i64>().unwrap_err();
        assert!(matches!(err, CoreError::InvalidPostId { ref id, .. } if id == "abc"));
    }

    #[test]
    fn test_create_request_requires_author() {
        let req = CreatePostRequest {
            title: "Title".to_string(),
            content: "Body".to_string(),
            author_name: "  ".to_string(),
            created_at: 0,
            published_at: 0,
        };
        assert_eq!(req.into_post().unwrap_err(), CoreError::MissingField("author_name"));
    }

    #[test]
    fn test_post_deserializes_without_server_fields() {
        let post: Post = serde_json::from_value(serde_json::json!({
            "title": "A",
            "content": "B",
            "author_name": "Bob"
        }))
        .unwrap();

        assert!(post.id.is_empty());
        assert_eq!(post.created_at, 0);
        assert_eq!(post.author_id, 0);
    }
}
