//! Backend selection at startup

use std::sync::Arc;

use crate::{InMemoryStorage, PostStorage, StorageError};

#[cfg(feature = "mongo")]
use crate::{MongoConfig, MongoStorage};
#[cfg(feature = "postgres")]
use crate::{PostgresConfig, PostgresStorage};

/// Which backend to construct, with the settings it needs
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendConfig {
    Memory,
    Postgres {
        url: String,
    },
    Mongo {
        url: String,
        database: String,
        collection: String,
    },
}

impl BackendConfig {
    /// Resolve a `DATABASE_TYPE` style selector.
    ///
    /// `None`, an empty string and `memory` select the in-memory backend.
    /// A selected external backend must come with a connection string.
    pub fn from_kind(
        kind: Option<&str>,
        postgres_url: Option<String>,
        mongo_url: Option<String>,
    ) -> Result<Self, StorageError> {
        let kind = kind.map(str::trim).unwrap_or_default();
        match kind.to_ascii_lowercase().as_str() {
            "" | "memory" => Ok(BackendConfig::Memory),
            "postgres" => {
                let url = postgres_url.filter(|u| !u.is_empty()).ok_or_else(|| {
                    StorageError::Config("POSTGRES_CONNECTION_STRING is not set".to_string())
                })?;
                Ok(BackendConfig::Postgres { url })
            }
            "mongo" => {
                let url = mongo_url.filter(|u| !u.is_empty()).ok_or_else(|| {
                    StorageError::Config("MONGO_CONNECTION_STRING is not set".to_string())
                })?;
                Ok(BackendConfig::Mongo {
                    url,
                    database: "news".to_string(),
                    collection: "posts".to_string(),
                })
            }
            other => Err(StorageError::Config(format!(
                "Unknown storage backend '{}', expected memory, postgres or mongo",
                other
            ))),
        }
    }

    /// Override the MongoDB database and collection names; other backends are unchanged
    pub fn with_mongo_names(self, database: Option<String>, collection: Option<String>) -> Self {
        match self {
            BackendConfig::Mongo {
                url,
                database: default_database,
                collection: default_collection,
            } => BackendConfig::Mongo {
                url,
                database: database.unwrap_or(default_database),
                collection: collection.unwrap_or(default_collection),
            },
            other => other,
        }
    }
}

/// Construct the one backend this process will use
pub async fn open(config: BackendConfig) -> Result<Arc<dyn PostStorage>, StorageError> {
    match config {
        BackendConfig::Memory => {
            tracing::info!("Initializing InMemory storage...");
            Ok(Arc::new(InMemoryStorage::new()))
        }
        BackendConfig::Postgres { url } => open_postgres(url).await,
        BackendConfig::Mongo {
            url,
            database,
            collection,
        } => open_mongo(url, database, collection).await,
    }
}

#[cfg(feature = "postgres")]
async fn open_postgres(url: String) -> Result<Arc<dyn PostStorage>, StorageError> {
    tracing::info!("Initializing PostgreSQL storage...");
    let store = PostgresStorage::new(PostgresConfig::new(url)).await?;
    Ok(Arc::new(store))
}

#[cfg(not(feature = "postgres"))]
async fn open_postgres(_url: String) -> Result<Arc<dyn PostStorage>, StorageError> {
    Err(StorageError::Config(
        "PostgreSQL storage requested but 'postgres' feature not enabled".to_string(),
    ))
}

#[cfg(feature = "mongo")]
async fn open_mongo(
    url: String,
    database: String,
    collection: String,
) -> Result<Arc<dyn PostStorage>, StorageError> {
    tracing::info!("Initializing MongoDB storage...");
    let store = MongoStorage::new(MongoConfig {
        connection_string: url,
        database,
        collection,
    })
    .await?;
    Ok(Arc::new(store))
}

#[cfg(not(feature = "mongo"))]
async fn open_mongo(
    _url: String,
    _database: String,
    _collection: String,
) -> Result<Arc<dyn PostStorage>, StorageError> {
    Err(StorageError::Config(
        "MongoDB storage requested but 'mongo' feature not enabled".to_string(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(None)]
    #[case(Some(""))]
    #[case(Some("memory"))]
    #[case(Some(" Memory "))]
    fn test_memory_selectors(#[case] kind: Option<&str>) {
        let config = BackendConfig::from_kind(kind, None, None).unwrap();
        assert_eq!(config, BackendConfig::Memory);
    }

    #[rstest]
    #[case("postgres")]
    #[case("mongo")]
    fn test_external_backend_needs_url(#[case] kind: &str) {
        let err = BackendConfig::from_kind(Some(kind), None, Some(String::new())).unwrap_err();
        assert!(matches!(err, StorageError::Config(_)));
    }

    #[test]
    fn test_unknown_kind_rejected() {
        let err = BackendConfig::from_kind(Some("cassandra"), None, None).unwrap_err();
        assert!(err.to_string().contains("cassandra"));
    }

    #[test]
    fn test_mongo_defaults() {
        let config =
            BackendConfig::from_kind(Some("mongo"), None, Some("mongodb://db:27017".to_string())).unwrap();
        assert_eq!(
            config,
            BackendConfig::Mongo {
                url: "mongodb://db:27017".to_string(),
                database: "news".to_string(),
                collection: "posts".to_string(),
            }
        );
    }

    #[test]
    fn test_mongo_name_overrides() {
        let config = BackendConfig::from_kind(Some("mongo"), None, Some("mongodb://db".to_string()))
            .unwrap()
            .with_mongo_names(Some("gazette".to_string()), None);
        assert!(matches!(
            config,
            BackendConfig::Mongo { ref database, ref collection, .. }
                if database == "gazette" && collection == "posts"
        ));

        let memory = BackendConfig::Memory.with_mongo_names(Some("x".to_string()), None);
        assert_eq!(memory, BackendConfig::Memory);
    }

    #[tokio::test]
    async fn test_open_memory_backend() {
        let storage = open(BackendConfig::Memory).await.unwrap();
        assert_eq!(storage.backend_name(), "memory");
        assert!(storage.list().await.unwrap().is_empty());
    }
}
