use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
};

use async_trait::async_trait;
use fs4::tokio::AsyncFileExt;
use thiserror::Error;
use tokio::{
    fs::File,
    io::{AsyncReadExt, AsyncSeekExt, AsyncWriteExt},
};
use tracing::{debug, info, warn};

use super::entities::SessionStore;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("failed to read {path:?}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse {path:?}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("failed to serialize session store: {0}")]
    Serialize(#[source] serde_json::Error),
    #[error("failed to write {path:?}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Interface for abstracting persistence of the [SessionStore].
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SessionStorage: Send + Sync {
    /// Best-effort load. A missing, unreadable or corrupt file results in an empty store, losing
    /// history is preferred over refusing to start.
    async fn load(&self) -> SessionStore;

    /// Overwrites the persisted state with `store`.
    async fn save(&self, store: &SessionStore) -> Result<(), StorageError>;
}

/// The main realization of [SessionStorage]. The whole store lives in a single JSON object.
pub struct JsonFileStorage {
    path: PathBuf,
}

impl JsonFileStorage {
    /// Creates the parent directory of `path` so that the first load/save can succeed.
    pub fn new(path: PathBuf) -> Result<Self, std::io::Error> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Strict version of [SessionStorage::load]. Returns `None` when there is no file yet.
    pub async fn try_load(&self) -> Result<Option<SessionStore>, StorageError> {
        async fn read(path: &Path) -> Result<String, std::io::Error> {
            let mut file = File::open(path).await?;
            file.lock_shared()?;
            let mut contents = String::new();
            let result = file.read_to_string(&mut contents).await;
            file.unlock_async().await?;
            result.map(|_| contents)
        }

        let contents = match read(&self.path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(StorageError::Read {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        let store: SessionStore =
            serde_json::from_str(&contents).map_err(|source| StorageError::Parse {
                path: self.path.clone(),
                source,
            })?;

        for (day, record) in store.iter() {
            if !record.is_consistent() {
                warn!(
                    "Record for {day} has total {} that doesn't match its hourly data",
                    record.total_seconds
                );
            }
        }

        Ok(Some(store))
    }

    async fn write(&self, data: &[u8]) -> Result<(), std::io::Error> {
        let mut file = File::options()
            .write(true)
            .create(true)
            .truncate(false)
            .open(&self.path)
            .await?;

        // Truncation happens under the lock so a concurrent reader never sees a partial object.
        file.lock_exclusive()?;
        let result = async {
            file.set_len(0).await?;
            file.rewind().await?;
            file.write_all(data).await?;
            file.flush().await?;
            file.sync_data().await
        }
        .await;
        file.unlock_async().await?;
        result
    }
}

#[async_trait]
impl SessionStorage for JsonFileStorage {
    async fn load(&self) -> SessionStore {
        match self.try_load().await {
            Ok(Some(store)) => {
                info!("Loaded {} days from {:?}", store.len(), self.path);
                store
            }
            Ok(None) => {
                debug!("No data file at {:?}, starting empty", self.path);
                SessionStore::new()
            }
            Err(e) => {
                warn!("Discarding previous data, {e}");
                SessionStore::new()
            }
        }
    }

    async fn save(&self, store: &SessionStore) -> Result<(), StorageError> {
        let data = serde_json::to_vec(store).map_err(StorageError::Serialize)?;
        self.write(&data)
            .await
            .map_err(|source| StorageError::Write {
                path: self.path.clone(),
                source,
            })?;
        debug!("Saved {} days into {:?}", store.len(), self.path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use anyhow::Result;
    use tempfile::tempdir;

    use crate::tracker::storage::entities::SessionStore;

    use super::{JsonFileStorage, SessionStorage, StorageError};

    fn sample_store() -> SessionStore {
        let mut store = SessionStore::new();
        for _ in 0..90 {
            store.day_mut("2024-03-04").add_second(10);
        }
        for _ in 0..5 {
            store.day_mut("2024-03-05").add_second(23);
        }
        store
    }

    #[tokio::test]
    async fn test_save_then_load_is_lossless() -> Result<()> {
        let dir = tempdir()?;
        let storage = JsonFileStorage::new(dir.path().join("screen-time-data.json"))?;
        let store = sample_store();

        storage.save(&store).await?;

        assert_eq!(storage.load().await, store);
        Ok(())
    }

    #[tokio::test]
    async fn test_save_overwrites_longer_content() -> Result<()> {
        let dir = tempdir()?;
        let storage = JsonFileStorage::new(dir.path().join("data.json"))?;

        storage.save(&sample_store()).await?;
        let mut smaller = SessionStore::new();
        smaller.day_mut("2024-01-01").add_second(0);
        storage.save(&smaller).await?;

        assert_eq!(storage.try_load().await?, Some(smaller));
        Ok(())
    }

    #[tokio::test]
    async fn test_load_missing_file_is_empty() -> Result<()> {
        let dir = tempdir()?;
        let storage = JsonFileStorage::new(dir.path().join("missing.json"))?;

        assert!(storage.try_load().await?.is_none());
        assert!(storage.load().await.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_load_invalid_json_is_empty() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("data.json");
        std::fs::write(&path, "{\"2024-03-04\": {\"totalSeconds\": ")?;
        let storage = JsonFileStorage::new(path)?;

        assert!(matches!(
            storage.try_load().await,
            Err(StorageError::Parse { .. })
        ));
        assert!(storage.load().await.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_new_creates_parent_directory() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("nested").join("storage").join("data.json");
        let storage = JsonFileStorage::new(path.clone())?;

        storage.save(&sample_store()).await?;

        assert!(path.exists());
        Ok(())
    }

    #[tokio::test]
    async fn test_save_into_directory_fails_with_write_error() -> Result<()> {
        let dir = tempdir()?;
        let storage = JsonFileStorage::new(dir.path().to_path_buf())?;

        let result = storage.save(&sample_store()).await;

        assert!(matches!(result, Err(StorageError::Write { .. })));
        Ok(())
    }
}
