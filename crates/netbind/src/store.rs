//! File-backed instance store: one JSON document per instance uuid.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::debug;

use netbind_core::{CoreError, InstanceStore, NetworkInfo};

#[derive(Debug, Clone)]
pub struct FileInstanceStore {
    dir: PathBuf,
}

impl FileInstanceStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, instance_uuid: &str) -> Result<PathBuf, CoreError> {
        let valid = !instance_uuid.is_empty()
            && instance_uuid
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(CoreError::InvalidInput {
                reason: format!("unusable instance uuid '{instance_uuid}'"),
            });
        }
        Ok(self.dir.join(format!("{instance_uuid}.json")))
    }
}

fn io_error(path: &Path, err: &std::io::Error) -> CoreError {
    CoreError::Internal(format!("{}: {err}", path.display()))
}

#[async_trait]
impl InstanceStore for FileInstanceStore {
    async fn load_network_info(
        &self,
        instance_uuid: &str,
    ) -> Result<Option<NetworkInfo>, CoreError> {
        let path = self.path_for(instance_uuid)?;
        let raw = match tokio::fs::read_to_string(&path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(io_error(&path, &e)),
        };
        let info = serde_json::from_str(&raw)
            .map_err(|e| CoreError::Internal(format!("{}: {e}", path.display())))?;
        Ok(Some(info))
    }

    async fn save_network_info(
        &self,
        instance_uuid: &str,
        info: &NetworkInfo,
    ) -> Result<(), CoreError> {
        let path = self.path_for(instance_uuid)?;
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| io_error(&self.dir, &e))?;
        let body = serde_json::to_string_pretty(info)
            .map_err(|e| CoreError::Internal(e.to_string()))?;
        tokio::fs::write(&path, body)
            .await
            .map_err(|e| io_error(&path, &e))?;
        debug!(path = %path.display(), vifs = info.len(), "saved network info");
        Ok(())
    }
}
