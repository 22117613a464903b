use crate::snippet::{QueryMatcher, SnippetStrategy};
use crate::traits::DocumentStore;
use crate::{SearchError, SearchRequest, SearchResultItem, SnippetConfig};
use tracing::debug;

/// Read-only query side over a [`DocumentStore`].
///
/// Each call is independent, so one engine can serve concurrent queries as long
/// as the store tolerates concurrent readers.
pub struct SearchEngine<S>
where
    S: DocumentStore,
{
    store: S,
    config: SnippetConfig,
}

impl<S> SearchEngine<S>
where
    S: DocumentStore + Send + Sync,
{
    pub fn new(store: S) -> Self {
        Self::with_config(store, SnippetConfig::default())
    }

    pub fn with_config(store: S, config: SnippetConfig) -> Self {
        Self { store, config }
    }

    pub async fn handle(&self, request: &SearchRequest) -> Result<Vec<SearchResultItem>, SearchError> {
        self.search(&request.query).await
    }

    /// Snippets for every stored document containing `query`, ignoring case.
    ///
    /// Documents appear in store order, snippets within a document left to right.
    /// Any failure aborts the whole query; no partial results are returned.
    pub async fn search(&self, query: &str) -> Result<Vec<SearchResultItem>, SearchError> {
        if query.is_empty() {
            return Err(SearchError::EmptyQuery);
        }

        let matcher = QueryMatcher::new(query)?;
        let documents = self.store.scan_matching(&matcher).await?;
        debug!(query, candidates = documents.len(), "documents matched pre-filter");

        let mut results = Vec::new();
        for document in documents {
            let strategy = SnippetStrategy::for_kind(document.kind, &self.config);
            let snippets = strategy.snippets(
                &document.content,
                &matcher,
                self.config.max_snippets_per_document,
            );

            results.extend(snippets.into_iter().map(|snippet| SearchResultItem {
                filename: document.filename.clone(),
                snippet,
            }));
        }

        Ok(results)
    }
}
