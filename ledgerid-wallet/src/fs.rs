use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use ledgerid_common::{GatewayError, Identity, Result};
use tokio::fs::{self, File};
use tokio::io::AsyncWriteExt;

use crate::store::{is_valid_label, IdentityStore};

const RECORD_EXTENSION: &str = "id";

/// Wallet keeping one `<label>.id` JSON record per identity in a directory.
///
/// Writes land in a uniquely named temp file that is fsynced and then renamed
/// over the target, so concurrent writers resolve last-writer-wins and readers
/// only ever see complete records.
#[derive(Debug, Clone)]
pub struct FileSystemWallet {
    dir: PathBuf,
}

impl FileSystemWallet {
    pub async fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir).await?;
        tracing::debug!("Wallet path: {}", dir.display());
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        &self.dir
    }

    fn record_path(&self, label: &str) -> PathBuf {
        self.dir.join(format!("{}.{}", label, RECORD_EXTENSION))
    }

    async fn sync_dir(&self) {
        // Persists the rename itself. Not supported on every platform.
        #[cfg(unix)]
        if let Ok(dir) = File::open(&self.dir).await {
            if let Err(e) = dir.sync_all().await {
                tracing::debug!("Wallet directory fsync skipped: {}", e);
            }
        }
    }
}

#[async_trait]
impl IdentityStore for FileSystemWallet {
    async fn get(&self, label: &str) -> Result<Option<Identity>> {
        if !is_valid_label(label) {
            return Ok(None);
        }

        let path = self.record_path(label);
        match fs::read(&path).await {
            Ok(bytes) => {
                let identity = serde_json::from_slice(&bytes).map_err(|e| {
                    GatewayError::Storage(format!("Corrupt wallet record {}: {}", path.display(), e))
                })?;
                Ok(Some(identity))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn put(&self, label: &str, identity: &Identity) -> Result<()> {
        if !is_valid_label(label) {
            return Err(GatewayError::Storage(format!("Invalid wallet label '{}'", label)));
        }

        let data = serde_json::to_vec_pretty(identity)?;
        let target = self.record_path(label);
        let tmp = self
            .dir
            .join(format!(".{}.{}.tmp", label, uuid::Uuid::new_v4().simple()));

        let written: std::io::Result<()> = async {
            let mut file = File::create(&tmp).await?;
            file.write_all(&data).await?;
            file.sync_all().await?;
            drop(file);
            fs::rename(&tmp, &target).await
        }
        .await;

        if let Err(e) = written {
            let _ = fs::remove_file(&tmp).await;
            return Err(e.into());
        }

        self.sync_dir().await;
        tracing::debug!("Stored identity {} in {}", label, self.dir.display());
        Ok(())
    }

    async fn contains(&self, label: &str) -> Result<bool> {
        if !is_valid_label(label) {
            return Ok(false);
        }
        Ok(fs::try_exists(self.record_path(label)).await?)
    }

    async fn list(&self) -> Result<Vec<String>> {
        let mut labels = Vec::new();
        let mut entries = fs::read_dir(&self.dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let name = entry.file_name();
            let Some(name) = name.to_str() else { continue };
            if let Some(label) = name.strip_suffix(".id") {
                if is_valid_label(label) {
                    labels.push(label.to_string());
                }
            }
        }
        labels.sort();
        Ok(labels)
    }
}
