use crate::{Document, QueryMatcher, StoreError};
use async_trait::async_trait;

/// Filename-keyed document persistence.
///
/// `list_all` must return records in a stable order; search results follow it.
#[async_trait]
pub trait DocumentStore {
    async fn contains(&self, filename: &str) -> Result<bool, StoreError>;

    /// Inserts every record whose filename is not stored yet and returns how many
    /// were added. Either the whole batch is committed or nothing is.
    async fn insert_batch(&self, documents: Vec<Document>) -> Result<usize, StoreError>;

    async fn list_all(&self) -> Result<Vec<Document>, StoreError>;

    /// Documents containing at least one occurrence accepted by `matcher`.
    async fn scan_matching(&self, matcher: &QueryMatcher) -> Result<Vec<Document>, StoreError> {
        let documents = self.list_all().await?;
        Ok(documents
            .into_iter()
            .filter(|document| matcher.is_match(&document.content))
            .collect())
    }
}
