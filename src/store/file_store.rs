//! JSON file backed store

use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
};

use anyhow::Context;
use futures::future::{BoxFuture, FutureExt};
use tokio::{fs, sync::Mutex};
use tracing::{debug, info};

use super::{select, StateStore, StoreMap};

/// Store persisted as a single JSON object on disk.
///
/// Entries are loaded once on open and cached. Every `set` rewrites the whole
/// file through a sibling `.tmp` file and a rename, so readers in other
/// processes never see a half-written document. The async mutex is held across
/// the write, which keeps writes in program order.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: Mutex<StoreMap>,
}

impl FileStore {
    /// Open the store, loading any existing entries. A missing file is an empty store.
    pub async fn open(path: impl Into<PathBuf>) -> anyhow::Result<Self> {
        let path = path.into();
        let entries = match fs::read(&path).await {
            Ok(bytes) => serde_json::from_slice::<StoreMap>(&bytes)
                .with_context(|| format!("State file {} is not a JSON object", path.display()))?,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!("No state file at {}, starting empty", path.display());
                StoreMap::new()
            }
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to read state file {}", path.display()));
            }
        };

        debug!("Loaded {} stored entries from {}", entries.len(), path.display());
        Ok(Self::with_entries(path, entries))
    }

    /// Create an empty store at `path` without reading it; the next write replaces the file.
    pub fn empty(path: impl Into<PathBuf>) -> Self {
        Self::with_entries(path.into(), StoreMap::new())
    }

    fn with_entries(path: PathBuf, entries: StoreMap) -> Self {
        Self {
            path,
            entries: Mutex::new(entries),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn write(&self, entries: StoreMap) -> anyhow::Result<()> {
        let mut stored = self.entries.lock().await;
        stored.extend(entries);

        let bytes = serde_json::to_vec_pretty(&*stored).context("Failed to encode state")?;
        let tmp_path = self.path.with_extension("json.tmp");
        fs::write(&tmp_path, bytes)
            .await
            .with_context(|| format!("Failed to write {}", tmp_path.display()))?;
        fs::rename(&tmp_path, &self.path)
            .await
            .with_context(|| format!("Failed to replace {}", self.path.display()))?;
        Ok(())
    }
}

impl StateStore for FileStore {
    fn get<'a>(&'a self, keys: &'a [&'a str]) -> BoxFuture<'a, anyhow::Result<StoreMap>> {
        async move {
            let stored = self.entries.lock().await;
            Ok(select(&stored, keys))
        }
        .boxed()
    }

    fn set(&self, entries: StoreMap) -> BoxFuture<'_, anyhow::Result<()>> {
        self.write(entries).boxed()
    }
}
