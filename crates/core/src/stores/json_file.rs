use crate::stores::absent_records;
use crate::traits::DocumentStore;
use crate::{Document, StoreError};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;

/// Durable store kept as one JSON array of `{filename, content, kind}` records.
///
/// A batch is written to a sibling temp file and renamed over the store file.
/// The in-memory copy only changes after the rename succeeded.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    documents: RwLock<Vec<Document>>,
}

impl JsonFileStore {
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let documents = match tokio::fs::read(&path).await {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => Vec::new(),
            Ok(bytes) => serde_json::from_slice::<Vec<Document>>(&bytes)?,
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(error) => return Err(StoreError::Io(error)),
        };

        Ok(Self {
            path,
            documents: RwLock::new(absent_records(&[], documents)),
        })
    }

    async fn persist(&self, documents: &[Document]) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let payload = serde_json::to_vec_pretty(documents)?;
        let staging = staging_path(&self.path);
        tokio::fs::write(&staging, payload).await?;

        if let Err(error) = tokio::fs::rename(&staging, &self.path).await {
            let _ = tokio::fs::remove_file(&staging).await;
            return Err(StoreError::Io(error));
        }

        Ok(())
    }
}

fn staging_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|name| name.to_os_string())
        .unwrap_or_else(|| "documents.json".into());
    name.push(".tmp");
    path.with_file_name(name)
}

#[async_trait]
impl DocumentStore for JsonFileStore {
    async fn contains(&self, filename: &str) -> Result<bool, StoreError> {
        let documents = self.documents.read().await;
        Ok(documents.iter().any(|document| document.filename == filename))
    }

    async fn insert_batch(&self, documents: Vec<Document>) -> Result<usize, StoreError> {
        let mut stored = self.documents.write().await;
        let additions = absent_records(&stored, documents);
        if additions.is_empty() {
            return Ok(0);
        }

        let added = additions.len();
        let mut next = stored.clone();
        next.extend(additions);

        self.persist(&next).await?;
        *stored = next;
        Ok(added)
    }

    async fn list_all(&self) -> Result<Vec<Document>, StoreError> {
        Ok(self.documents.read().await.clone())
    }
}
