use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::{
    errors::AppResult,
    models::domain::{session_snapshot::SNAPSHOT_VERSION, SessionSnapshot},
};

/// Local storage for the in-progress exam. This is the only place the
/// session snapshot is persisted.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    async fn load(&self) -> AppResult<SessionSnapshot>;
    async fn save(&self, snapshot: &SessionSnapshot) -> AppResult<()>;
    async fn clear(&self) -> AppResult<()>;
}

/// JSON file on disk. A missing or unreadable file loads as an idle snapshot.
pub struct FileSnapshotStore {
    path: PathBuf,
}

impl FileSnapshotStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn staging_path(&self) -> PathBuf {
        let mut staging = self.path.clone().into_os_string();
        staging.push(".tmp");
        PathBuf::from(staging)
    }
}

#[async_trait]
impl SnapshotStore for FileSnapshotStore {
    async fn load(&self) -> AppResult<SessionSnapshot> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(SessionSnapshot::default());
            }
            Err(e) => return Err(e.into()),
        };

        match serde_json::from_slice::<SessionSnapshot>(&bytes) {
            Ok(snapshot) if snapshot.version == SNAPSHOT_VERSION => Ok(snapshot),
            Ok(snapshot) => {
                log::warn!(
                    "Ignoring snapshot {} with unsupported version {}",
                    self.path.display(),
                    snapshot.version
                );
                Ok(SessionSnapshot::default())
            }
            Err(e) => {
                log::warn!("Ignoring corrupt snapshot {}: {}", self.path.display(), e);
                Ok(SessionSnapshot::default())
            }
        }
    }

    async fn save(&self, snapshot: &SessionSnapshot) -> AppResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let json = serde_json::to_vec_pretty(snapshot)?;
        let staging = self.staging_path();
        tokio::fs::write(&staging, json).await?;
        tokio::fs::rename(&staging, &self.path).await?;

        log::debug!("Saved {:?} snapshot to {}", snapshot.phase, self.path.display());
        Ok(())
    }

    async fn clear(&self) -> AppResult<()> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
