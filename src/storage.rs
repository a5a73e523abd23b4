use std::path::PathBuf;

use anyhow::Context;
use async_trait::async_trait;
use bytes::Bytes;
use tracing::debug;

#[async_trait]
pub trait StorageClient: Send + Sync {
    /// Store `body` under the client-supplied `file_name` and return the name
    /// it is stored (and served) under.
    async fn put_object(&self, file_name: &str, body: Bytes) -> anyhow::Result<String>;
}

/// Writes uploads into a single local directory, keeping the client's file
/// name. Same-named uploads overwrite each other.
#[derive(Clone)]
pub struct LocalStorage {
    root: PathBuf,
}

impl LocalStorage {
    pub async fn open(root: impl Into<PathBuf>) -> anyhow::Result<Self> {
        let root = root.into();
        tokio::fs::create_dir_all(&root)
            .await
            .with_context(|| format!("create upload dir {}", root.display()))?;
        Ok(Self { root })
    }

    #[cfg(test)]
    pub fn from_existing(root: PathBuf) -> Self {
        Self { root }
    }

    #[cfg(test)]
    pub fn root(&self) -> &std::path::Path {
        &self.root
    }
}

#[async_trait]
impl StorageClient for LocalStorage {
    async fn put_object(&self, file_name: &str, body: Bytes) -> anyhow::Result<String> {
        let name = stored_name(file_name)
            .with_context(|| format!("unusable upload file name {file_name:?}"))?;
        let path = self.root.join(name);
        tokio::fs::write(&path, &body)
            .await
            .with_context(|| format!("write upload {}", path.display()))?;
        debug!(file = %name, bytes = body.len(), "upload stored");
        Ok(name.to_string())
    }
}

/// Last path component of a client file name. Clients may send full paths
/// with either separator.
fn stored_name(original: &str) -> Option<&str> {
    let name = original.rsplit(['/', '\\']).next()?.trim();
    match name {
        "" | "." | ".." => None,
        n => Some(n),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_root() -> PathBuf {
        std::env::temp_dir().join(format!("accounts-api-storage-{}", uuid::Uuid::new_v4()))
    }

    #[test]
    fn test_stored_name() {
        assert_eq!(stored_name("avatar.png"), Some("avatar.png"));
        assert_eq!(stored_name("../../etc/passwd"), Some("passwd"));
        assert_eq!(stored_name("C:\\Users\\me\\cat.jpg"), Some("cat.jpg"));
        assert_eq!(stored_name("my photo.jpg"), Some("my photo.jpg"));
        assert_eq!(stored_name(""), None);
        assert_eq!(stored_name("dir/"), None);
        assert_eq!(stored_name(".."), None);
    }

    #[tokio::test]
    async fn put_object_keeps_original_name_and_overwrites() {
        let storage = LocalStorage::open(temp_root()).await.unwrap();

        let name = storage
            .put_object("pic.png", Bytes::from_static(b"first"))
            .await
            .unwrap();
        assert_eq!(name, "pic.png");

        storage
            .put_object("pic.png", Bytes::from_static(b"second"))
            .await
            .unwrap();
        let on_disk = tokio::fs::read(storage.root().join("pic.png")).await.unwrap();
        assert_eq!(on_disk, b"second");

        tokio::fs::remove_dir_all(storage.root()).await.ok();
    }

    #[tokio::test]
    async fn put_object_stays_inside_root() {
        let storage = LocalStorage::open(temp_root()).await.unwrap();
        let name = storage
            .put_object("../escape.txt", Bytes::from_static(b"x"))
            .await
            .unwrap();
        assert_eq!(name, "escape.txt");
        assert!(storage.root().join("escape.txt").exists());

        assert!(storage.put_object("..", Bytes::new()).await.is_err());
        tokio::fs::remove_dir_all(storage.root()).await.ok();
    }
}
