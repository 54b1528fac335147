// Address hash persistence.
// Loads the hash map once per run and saves it once at the end.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;

use crate::cache::paths;
use crate::error::Result;

/// Entity id (`store_12`, `salespoint_3_7`) to the hash of its last geocoded address.
pub type AddressHashes = BTreeMap<String, String>;

/// Durable key-value storage for address hashes.
#[async_trait]
pub trait HashStore: Send + Sync {
    /// Load the saved map. A store that was never written loads as empty.
    async fn load(&self) -> Result<AddressHashes>;

    /// Replace the saved map.
    async fn save(&self, hashes: &AddressHashes) -> Result<()>;
}

/// Hash map stored as a pretty-printed JSON object in a local file.
#[derive(Debug, Clone)]
pub struct JsonFileHashStore {
    path: PathBuf,
}

impl JsonFileHashStore {
    /// Store at an explicit file path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store under the platform data directory, one file per spreadsheet.
    pub fn default_for(spreadsheet_id: &str) -> Option<Self> {
        paths::hash_store_path(spreadsheet_id).map(Self::new)
    }

    /// File the hashes are kept in.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl HashStore for JsonFileHashStore {
    async fn load(&self) -> Result<AddressHashes> {
        let contents = match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(AddressHashes::new());
            }
            Err(e) => return Err(e.into()),
        };

        if contents.trim().is_empty() {
            return Ok(AddressHashes::new());
        }
        Ok(serde_json::from_str(&contents)?)
    }

    async fn save(&self, hashes: &AddressHashes) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let json = serde_json::to_string_pretty(hashes)?;

        // Write atomically via temp file
        let temp_path = self.path.with_extension("tmp");
        let mut file = tokio::fs::File::create(&temp_path).await?;
        file.write_all(json.as_bytes()).await?;
        file.sync_all().await?;
        tokio::fs::rename(&temp_path, &self.path).await?;

        Ok(())
    }
}

/// In-memory store for embedding and tests.
#[derive(Debug, Default)]
pub struct MemoryHashStore {
    hashes: Mutex<AddressHashes>,
    saves: Mutex<usize>,
}

impl MemoryHashStore {
    /// Create a store preloaded with `initial`.
    pub fn new(initial: AddressHashes) -> Self {
        Self {
            hashes: Mutex::new(initial),
            saves: Mutex::new(0),
        }
    }

    /// Current contents.
    pub fn snapshot(&self) -> AddressHashes {
        self.hashes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of completed saves.
    pub fn save_count(&self) -> usize {
        *self.saves.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl HashStore for MemoryHashStore {
    async fn load(&self) -> Result<AddressHashes> {
        Ok(self.snapshot())
    }

    async fn save(&self, hashes: &AddressHashes) -> Result<()> {
        *self.hashes.lock().unwrap_or_else(PoisonError::into_inner) = hashes.clone();
        *self.saves.lock().unwrap_or_else(PoisonError::into_inner) += 1;
        Ok(())
    }
}
