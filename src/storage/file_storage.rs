use crate::{error::Result, storage::SnapshotStore};
use async_trait::async_trait;
use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
    sync::atomic::{AtomicU64, Ordering},
};
use tokio::{fs, io::AsyncWriteExt};
use tracing::debug;

static TMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// File-based snapshot storage
///
/// Writes go to a temporary file in the same directory which is then renamed
/// over the snapshot, so readers only ever see a complete file.
pub struct FileSnapshotStore {
    root_path: PathBuf,
    file_name: String,
}

impl FileSnapshotStore {
    const SNAPSHOT_FILE: &'static str = "epics-cache.json";

    /// Creates a store keeping its snapshot in `data_dir`
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        Self {
            root_path: data_dir.as_ref().to_path_buf(),
            file_name: Self::SNAPSHOT_FILE.to_string(),
        }
    }

    /// Overrides the snapshot file name
    pub fn with_file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = file_name.into();
        self
    }

    pub fn snapshot_file(&self) -> PathBuf {
        self.root_path.join(&self.file_name)
    }

    fn tmp_file(&self) -> PathBuf {
        let n = TMP_COUNTER.fetch_add(1, Ordering::Relaxed);
        self.root_path
            .join(format!(".{}.tmp.{}.{}", self.file_name, std::process::id(), n))
    }

    async fn ensure_directory_exists(&self, path: &Path) -> Result<()> {
        if !path.exists() {
            fs::create_dir_all(path).await?;
        }
        Ok(())
    }

    async fn write_tmp(path: &Path, blob: &[u8]) -> Result<()> {
        let mut file = fs::File::create(path).await?;
        file.write_all(blob).await?;
        file.sync_all().await?;
        Ok(())
    }
}

#[async_trait]
impl SnapshotStore for FileSnapshotStore {
    async fn put(&self, blob: &[u8]) -> Result<()> {
        self.ensure_directory_exists(&self.root_path).await?;

        let tmp_path = self.tmp_file();
        let target = self.snapshot_file();

        if let Err(err) = Self::write_tmp(&tmp_path, blob).await {
            let _ = fs::remove_file(&tmp_path).await;
            return Err(err);
        }

        if let Err(err) = fs::rename(&tmp_path, &target).await {
            let _ = fs::remove_file(&tmp_path).await;
            return Err(err.into());
        }

        debug!(path = %target.display(), bytes = blob.len(), "snapshot written");
        Ok(())
    }

    async fn get(&self) -> Result<Option<Vec<u8>>> {
        match fs::read(self.snapshot_file()).await {
            Ok(blob) => Ok(Some(blob)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }
}
