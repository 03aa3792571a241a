use super::{CacheBackend, ResourceCacheEntry};
use crate::error::CacheError;
use async_trait::async_trait;
use redb::{Database, ReadableTable, TableDefinition};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Single object store keyed by resource URL, values are JSON entries
const RESOURCES_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("resources");

fn db_err(err: impl Into<redb::Error>) -> CacheError {
    CacheError::Database(err.into())
}

fn task_err(err: tokio::task::JoinError) -> CacheError {
    CacheError::Task(err.to_string())
}

/// redb-backed durable cache. Transactions run on the blocking pool.
#[derive(Clone)]
pub struct RedbBackend {
    db: Arc<Database>,
    path: PathBuf,
}

impl RedbBackend {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, CacheError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|err| CacheError::Unavailable(err.to_string()))?;
        }

        let db = Database::create(path).map_err(db_err)?;
        let txn = db.begin_write().map_err(db_err)?;
        txn.open_table(RESOURCES_TABLE).map_err(db_err)?;
        txn.commit().map_err(db_err)?;

        tracing::debug!(path = %path.display(), "resource cache opened");
        Ok(Self {
            db: Arc::new(db),
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl CacheBackend for RedbBackend {
    async fn put(&self, entry: ResourceCacheEntry) -> Result<(), CacheError> {
        let bytes = serde_json::to_vec(&entry)?;
        let db = self.db.clone();

        tokio::task::spawn_blocking(move || -> Result<(), CacheError> {
            let txn = db.begin_write().map_err(db_err)?;
            {
                let mut table = txn.open_table(RESOURCES_TABLE).map_err(db_err)?;
                table
                    .insert(entry.key.as_str(), bytes.as_slice())
                    .map_err(db_err)?;
            }
            txn.commit().map_err(db_err)
        })
        .await
        .map_err(task_err)?
    }

    async fn get(&self, key: &str) -> Result<Option<ResourceCacheEntry>, CacheError> {
        let key = key.to_string();
        let db = self.db.clone();

        let bytes = tokio::task::spawn_blocking(move || -> Result<Option<Vec<u8>>, CacheError> {
            let txn = db.begin_read().map_err(db_err)?;
            let table = txn.open_table(RESOURCES_TABLE).map_err(db_err)?;
            let value = table
                .get(key.as_str())
                .map_err(db_err)?
                .map(|guard| guard.value().to_vec());
            Ok(value)
        })
        .await
        .map_err(task_err)??;

        Ok(bytes
            .map(|bytes| serde_json::from_slice(&bytes))
            .transpose()?)
    }
}
