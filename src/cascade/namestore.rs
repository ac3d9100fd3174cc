//! Directory-backed namestore: the shared filesystem viewed as a flat
//! key-value space of named artifacts.
//!
//! Writes are full replacements through a temp file and rename, so a racing
//! reader sees either the old or the new content, never a torn write.
//! Reads are plain existence/content checks and removal is best-effort and
//! idempotent; there is no locking of any kind.

use std::path::{Path, PathBuf};

use tokio::fs;
use uuid::Uuid;

use ouro_core::{Error, Result};

/// Outcome of a removal attempt. Total: removal never raises.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RemoveStatus {
    Removed,
    NotFound,
    Failed(String),
}

impl RemoveStatus {
    pub fn is_removed(&self) -> bool {
        matches!(self, Self::Removed)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

impl std::fmt::Display for RemoveStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Removed => write!(f, "removed"),
            Self::NotFound => write!(f, "not found"),
            Self::Failed(cause) => write!(f, "failed: {cause}"),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Namestore {
    root: PathBuf,
}

impl Namestore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    pub async fn ensure_root(&self) -> Result<()> {
        fs::create_dir_all(&self.root).await?;
        Ok(())
    }

    /// Full-replacement write: temp file in the store root, then rename
    /// over the target name.
    pub async fn write(&self, name: &str, content: &[u8]) -> Result<()> {
        let tmp = self.root.join(format!(".{name}.{}.tmp", Uuid::new_v4()));
        fs::write(&tmp, content)
            .await
            .map_err(|e| Error::artifact(name, format!("write: {e}")))?;
        fs::rename(&tmp, self.path(name))
            .await
            .map_err(|e| Error::artifact(name, format!("rename: {e}")))?;
        Ok(())
    }

    pub async fn read(&self, name: &str) -> Result<Vec<u8>> {
        fs::read(self.path(name))
            .await
            .map_err(|e| Error::artifact(name, format!("read: {e}")))
    }

    pub async fn exists(&self, name: &str) -> bool {
        fs::try_exists(self.path(name)).await.unwrap_or(false)
    }

    /// Best-effort removal. Removing an absent artifact is not an error;
    /// any other failure is carried in the status for the caller to log.
    pub async fn remove(&self, name: &str) -> RemoveStatus {
        match fs::remove_file(self.path(name)).await {
            Ok(()) => RemoveStatus::Removed,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => RemoveStatus::NotFound,
            Err(e) => RemoveStatus::Failed(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> (tempfile::TempDir, Namestore) {
        let dir = tempfile::tempdir().unwrap();
        let store = Namestore::new(dir.path());
        (dir, store)
    }

    #[tokio::test]
    async fn write_then_read_round_trips() {
        let (_dir, store) = store();
        store.write("a.agent", b"hello").await.unwrap();
        assert!(store.exists("a.agent").await);
        assert_eq!(store.read("a.agent").await.unwrap(), b"hello");
    }

    #[tokio::test]
    async fn write_replaces_in_full() {
        let (_dir, store) = store();
        store.write("a.agent", b"first version").await.unwrap();
        store.write("a.agent", b"second").await.unwrap();
        assert_eq!(store.read("a.agent").await.unwrap(), b"second");
    }

    #[tokio::test]
    async fn write_leaves_no_temp_files() {
        let (dir, store) = store();
        store.write("a.agent", b"x").await.unwrap();
        let mut entries = tokio::fs::read_dir(dir.path()).await.unwrap();
        let mut names = Vec::new();
        while let Some(entry) = entries.next_entry().await.unwrap() {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
        assert_eq!(names, vec!["a.agent".to_string()]);
    }

    #[tokio::test]
    async fn remove_is_idempotent() {
        let (_dir, store) = store();
        store.write("a.agent", b"x").await.unwrap();
        assert_eq!(store.remove("a.agent").await, RemoveStatus::Removed);
        assert_eq!(store.remove("a.agent").await, RemoveStatus::NotFound);
        assert_eq!(store.remove("never-existed").await, RemoveStatus::NotFound);
    }

    #[tokio::test]
    async fn read_of_missing_artifact_carries_name() {
        let (_dir, store) = store();
        let err = store.read("ghost.agent").await.unwrap_err();
        assert!(err.to_string().contains("ghost.agent"));
    }
}
