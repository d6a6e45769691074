//! PostgreSQL storage implementation
//!
//! Authors are normalized into their own table and resolved by name on every
//! create. Post identities are the `SERIAL` primary keys of the `posts` table,
//! handed to callers as decimal strings.
//!
//! # Schema
//!
//! ```sql
//! CREATE TABLE IF NOT EXISTS authors (
//!     id SERIAL PRIMARY KEY,
//!     name TEXT NOT NULL UNIQUE
//! );
//! CREATE TABLE IF NOT EXISTS posts (
//!     id SERIAL PRIMARY KEY,
//!     author_id INTEGER NOT NULL REFERENCES authors(id),
//!     title TEXT NOT NULL,
//!     content TEXT NOT NULL,
//!     created_at BIGINT NOT NULL,
//!     published_at BIGINT NOT NULL DEFAULT 0
//! );
//! ALTER TABLE posts ADD COLUMN IF NOT EXISTS published_at BIGINT NOT NULL DEFAULT 0;
//! ```
//!
//! The `ALTER` brings a `posts` table created without `published_at` up to date.

use async_trait::async_trait;
use news_hub_core::{Post, PostId};
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::Row;

use crate::{PostStorage, StorageError};

const SCHEMA: [&str; 3] = [
    r#"
    CREATE TABLE IF NOT EXISTS authors (
        id SERIAL PRIMARY KEY,
        name TEXT NOT NULL UNIQUE
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS posts (
        id SERIAL PRIMARY KEY,
        author_id INTEGER NOT NULL REFERENCES authors(id),
        title TEXT NOT NULL,
        content TEXT NOT NULL,
        created_at BIGINT NOT NULL,
        published_at BIGINT NOT NULL DEFAULT 0
    )
    "#,
    "ALTER TABLE posts ADD COLUMN IF NOT EXISTS published_at BIGINT NOT NULL DEFAULT 0",
];

/// PostgreSQL storage configuration
#[derive(Debug, Clone)]
pub struct PostgresConfig {
    pub connection_string: String,
    pub max_connections: u32,
}

impl PostgresConfig {
    pub fn new(connection_string: impl Into<String>) -> Self {
        Self {
            connection_string: connection_string.into(),
            ..Self::default()
        }
    }
}

impl Default for PostgresConfig {
    fn default() -> Self {
        Self {
            connection_string: "postgres://localhost/news".to_string(),
            max_connections: 10,
        }
    }
}

/// PostgreSQL storage for posts and their authors
pub struct PostgresStorage {
    pool: PgPool,
}

impl PostgresStorage {
    /// Connect, verify the server answers, and make sure the tables exist
    pub async fn new(config: PostgresConfig) -> Result<Self, StorageError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .connect(&config.connection_string)
            .await
            .map_err(|e| StorageError::Connection(format!("Failed to open database: {}", e)))?;

        Self::from_pool(pool).await
    }

    /// Wrap an existing pool, verifying the server answers and bootstrapping the schema
    pub async fn from_pool(pool: PgPool) -> Result<Self, StorageError> {
        sqlx::query("SELECT 1")
            .execute(&pool)
            .await
            .map_err(|e| StorageError::Connection(format!("Failed to ping database: {}", e)))?;

        let storage = Self { pool };
        storage.init_schema().await?;

        tracing::info!("Connected to PostgreSQL");
        Ok(storage)
    }

    async fn init_schema(&self) -> Result<(), StorageError> {
        for statement in SCHEMA {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .map_err(|e| StorageError::Connection(format!("Failed to create schema: {}", e)))?;
        }
        Ok(())
    }

    /// Get the connection pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    async fn find_author(&self, name: &str) -> Result<Option<i64>, StorageError> {
        sqlx::query_scalar("SELECT id::BIGINT FROM authors WHERE name = $1")
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| classify(e, "Failed to get author id", StorageError::AuthorResolution))
    }

    /// Look the author up by name, creating the row on first use.
    ///
    /// The insert tolerates a concurrent create of the same name through the
    /// unique constraint; the loser reads the winner's row.
    async fn resolve_author(&self, name: &str) -> Result<i64, StorageError> {
        if let Some(id) = self.find_author(name).await? {
            return Ok(id);
        }

        let inserted: Option<i64> = sqlx::query_scalar(
            "INSERT INTO authors (name) VALUES ($1) ON CONFLICT (name) DO NOTHING RETURNING id::BIGINT",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| classify(e, "Failed to create author", StorageError::AuthorResolution))?;

        if let Some(id) = inserted {
            tracing::debug!("Created author '{}' with id {}", name, id);
            return Ok(id);
        }

        self.find_author(name).await?.ok_or_else(|| {
            StorageError::AuthorResolution(format!("Author '{}' vanished after conflict", name))
        })
    }
}

/// Split driver failures into transport, decode and operation errors
fn classify(err: sqlx::Error, context: &str, otherwise: fn(String) -> StorageError) -> StorageError {
    let message = format!("{}: {}", context, err);
    match err {
        sqlx::Error::Io(_)
        | sqlx::Error::Tls(_)
        | sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed
        | sqlx::Error::WorkerCrashed => StorageError::Unavailable(message),
        sqlx::Error::ColumnDecode { .. }
        | sqlx::Error::ColumnNotFound(_)
        | sqlx::Error::Decode(_) => StorageError::Decode(message),
        _ => otherwise(message),
    }
}

fn row_to_post(row: &PgRow) -> Result<Post, StorageError> {
    let decode = |e: sqlx::Error| classify(e, "Failed to scan post", StorageError::Decode);

    let id: i64 = row.try_get("id").map_err(decode)?;
    Ok(Post {
        id: PostId::from(id),
        title: row.try_get("title").map_err(decode)?,
        content: row.try_get("content").map_err(decode)?,
        author_id: row.try_get("author_id").map_err(decode)?,
        author_name: row.try_get("author_name").map_err(decode)?,
        created_at: row.try_get("created_at").map_err(decode)?,
        published_at: row.try_get("published_at").map_err(decode)?,
    })
}

#[async_trait]
impl PostStorage for PostgresStorage {
    fn backend_name(&self) -> &'static str {
        "postgres"
    }

    async fn list(&self) -> Result<Vec<Post>, StorageError> {
        let rows = sqlx::query(
            r#"
            SELECT p.id::BIGINT AS id,
                   p.author_id::BIGINT AS author_id,
                   a.name AS author_name,
                   p.title,
                   p.content,
                   p.created_at,
                   p.published_at
            FROM posts p
            JOIN authors a ON p.author_id = a.id
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| classify(e, "Failed to query posts", StorageError::Query))?;

        rows.iter().map(row_to_post).collect()
    }

    async fn create(&self, mut post: Post) -> Result<Post, StorageError> {
        let author_id = self.resolve_author(&post.author_name).await?;
        post.stamp_created_at();

        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO posts (author_id, title, content, created_at, published_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id::BIGINT
            "#,
        )
        .bind(author_id)
        .bind(&post.title)
        .bind(&post.content)
        .bind(post.created_at)
        .bind(post.published_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| classify(e, "Failed to add post", StorageError::Write))?;

        post.id = PostId::from(id);
        post.author_id = author_id;

        tracing::debug!("Saved post {} by author {}", id, author_id);
        Ok(post)
    }

    async fn update(&self, post: Post) -> Result<(), StorageError> {
        let id: i64 = post.id.parse()?;

        let result = sqlx::query("UPDATE posts SET title = $1, content = $2 WHERE id = $3")
            .bind(&post.title)
            .bind(&post.content)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| classify(e, "Failed to update post", StorageError::Write))?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound(format!("Post with id {} not found", id)));
        }
        Ok(())
    }

    async fn delete(&self, post: Post) -> Result<(), StorageError> {
        let id: i64 = post.id.parse()?;

        let result = sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| classify(e, "Failed to delete post", StorageError::Delete))?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound(format!("Post with id {} not found", id)));
        }
        Ok(())
    }

    async fn close(&self) {
        self.pool.close().await;
    }
}
