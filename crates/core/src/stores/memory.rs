use crate::stores::absent_records;
use crate::traits::DocumentStore;
use crate::{Document, StoreError};
use async_trait::async_trait;
use tokio::sync::RwLock;

/// In-process store. Nothing survives the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    documents: RwLock<Vec<Document>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_documents(documents: Vec<Document>) -> Self {
        Self {
            documents: RwLock::new(absent_records(&[], documents)),
        }
    }

    pub async fn len(&self) -> usize {
        self.documents.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.documents.read().await.is_empty()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn contains(&self, filename: &str) -> Result<bool, StoreError> {
        let documents = self.documents.read().await;
        Ok(documents.iter().any(|document| document.filename == filename))
    }

    async fn insert_batch(&self, documents: Vec<Document>) -> Result<usize, StoreError> {
        let mut stored = self.documents.write().await;
        let additions = absent_records(&stored, documents);
        let added = additions.len();
        stored.extend(additions);
        Ok(added)
    }

    async fn list_all(&self) -> Result<Vec<Document>, StoreError> {
        Ok(self.documents.read().await.clone())
    }
}
