pub mod classify;
pub mod error;
pub mod extractor;
pub mod ingest;
pub mod models;
pub mod orchestrator;
pub mod snippet;
pub mod stores;
pub mod traits;

pub use classify::{ClassificationRule, ClassificationRules};
pub use error::{ErrorClass, IngestError, SearchError, StoreError};
pub use extractor::{Extraction, LopdfExtractor, PageFailure, TextExtractor};
pub use ingest::{
    discover_pdf_files, document_filename, IngestionPipeline, IngestionReport, SkippedPdf,
};
pub use models::{
    ContextWindow, Document, DocumentKind, ExtractionFailurePolicy, IngestionOptions, MatchSpan,
    SearchRequest, SearchResultItem, SnippetConfig,
};
pub use orchestrator::SearchEngine;
pub use snippet::{QueryMatcher, SnippetStrategy};
pub use stores::{JsonFileStore, MemoryStore};
pub use traits::DocumentStore;
