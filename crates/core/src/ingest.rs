use crate::classify::ClassificationRules;
use crate::extractor::{Extraction, TextExtractor};
use crate::traits::DocumentStore;
use crate::{Document, ExtractionFailurePolicy, IngestError, IngestionOptions};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info, warn};
use walkdir::WalkDir;

pub fn discover_pdf_files(folder: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();

    for entry in WalkDir::new(folder)
        .into_iter()
        .filter_map(|item| item.ok())
    {
        if !entry.file_type().is_file() {
            continue;
        }

        let is_pdf = entry
            .path()
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"));

        if is_pdf {
            files.push(entry.path().to_path_buf());
        }
    }

    files.sort_unstable();
    files
}

pub fn document_filename(path: &Path) -> Result<String, IngestError> {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(str::to_string)
        .ok_or_else(|| IngestError::MissingFileName(path.display().to_string()))
}

#[derive(Debug)]
pub struct SkippedPdf {
    pub path: PathBuf,
    pub reason: String,
}

#[derive(Debug, Default)]
pub struct IngestionReport {
    /// Filenames extracted and staged in this run.
    pub processed: Vec<String>,
    pub already_present: Vec<String>,
    pub missing: Vec<PathBuf>,
    pub failed: Vec<SkippedPdf>,
    /// Pages that failed to convert inside otherwise processed files.
    pub failed_pages: usize,
    /// Records the store actually added; lower than `processed` when another
    /// writer stored the same filename first.
    pub inserted: usize,
    pub committed: bool,
    pub batch_failure: Option<IngestError>,
}

pub struct IngestionPipeline<'s, S, E>
where
    S: DocumentStore,
    E: TextExtractor,
{
    store: &'s S,
    extractor: Arc<E>,
    rules: ClassificationRules,
    options: IngestionOptions,
}

impl<'s, S, E> IngestionPipeline<'s, S, E>
where
    S: DocumentStore + Sync,
    E: TextExtractor + Send + Sync + 'static,
{
    pub fn new(store: &'s S, extractor: E, rules: ClassificationRules) -> Self {
        Self {
            store,
            extractor: Arc::new(extractor),
            rules,
            options: IngestionOptions::default(),
        }
    }

    pub fn with_options(mut self, options: IngestionOptions) -> Self {
        self.options = options;
        self
    }

    /// Extracts every file not stored yet and commits them as one batch.
    ///
    /// Never fails: store errors are logged and returned in the report.
    pub async fn ingest(&self, paths: &[PathBuf]) -> IngestionReport {
        let mut report = IngestionReport::default();
        match self.stage(paths, &mut report).await {
            Ok(staged) => self.commit(staged, &mut report).await,
            Err(failure) => {
                error!(error = %failure, "document ingestion aborted, nothing stored");
                report.batch_failure = Some(failure);
            }
        }
        report
    }

    async fn stage(
        &self,
        paths: &[PathBuf],
        report: &mut IngestionReport,
    ) -> Result<Vec<Document>, IngestError> {
        let mut staged = Vec::new();
        let mut seen = HashSet::new();

        for path in paths {
            if !path.exists() {
                warn!(path = %path.display(), "document not found, skipping");
                report.missing.push(path.clone());
                continue;
            }

            let filename = match document_filename(path) {
                Ok(filename) => filename,
                Err(reason) => {
                    warn!(path = %path.display(), "path has no usable file name, skipping");
                    report.failed.push(SkippedPdf {
                        path: path.clone(),
                        reason: reason.to_string(),
                    });
                    continue;
                }
            };

            if !seen.insert(filename.clone()) || self.store.contains(&filename).await? {
                info!(filename = %filename, "document already stored, skipping");
                report.already_present.push(filename);
                continue;
            }

            info!(filename = %filename, "processing document");
            let content = match self.extract(path).await {
                Extraction::Extracted { text, failed_pages } => {
                    report.failed_pages += failed_pages.len();
                    text
                }
                Extraction::Failed { reason } => match self.options.on_extraction_failure {
                    ExtractionFailurePolicy::StoreEmpty => {
                        warn!(filename = %filename, reason = %reason, "text extraction failed, storing empty content");
                        String::new()
                    }
                    ExtractionFailurePolicy::Skip => {
                        warn!(filename = %filename, reason = %reason, "text extraction failed, skipping");
                        report.failed.push(SkippedPdf {
                            path: path.clone(),
                            reason,
                        });
                        continue;
                    }
                },
            };

            let kind = self.rules.classify(&filename);
            report.processed.push(filename.clone());
            staged.push(Document::new(filename, content, kind));
        }

        Ok(staged)
    }

    /// Runs the extractor on the blocking pool; PDF parsing is CPU and file bound.
    async fn extract(&self, path: &Path) -> Extraction {
        let extractor = Arc::clone(&self.extractor);
        let owned = path.to_path_buf();
        match tokio::task::spawn_blocking(move || extractor.extract(&owned)).await {
            Ok(extraction) => extraction,
            Err(failure) => Extraction::Failed {
                reason: format!("extraction task failed: {failure}"),
            },
        }
    }

    async fn commit(&self, staged: Vec<Document>, report: &mut IngestionReport) {
        if staged.is_empty() {
            report.committed = true;
            return;
        }

        match self.store.insert_batch(staged).await {
            Ok(inserted) => {
                info!(inserted, "document batch committed");
                report.inserted = inserted;
                report.committed = true;
            }
            Err(failure) => {
                error!(error = %failure, "document batch rolled back");
                report.batch_failure = Some(IngestError::Store(failure));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractor::PageFailure;
    use crate::stores::MemoryStore;
    use crate::{DocumentKind, StoreError};
    use async_trait::async_trait;
    use std::fs::{self, File};
    use std::io::Write;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::tempdir;

    #[derive(Default)]
    struct CountingExtractor {
        calls: AtomicUsize,
    }

    impl TextExtractor for CountingExtractor {
        fn extract(&self, path: &Path) -> Extraction {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let name = path.file_name().and_then(|name| name.to_str()).unwrap_or("");
            if name.starts_with("broken") {
                return Extraction::Failed {
                    reason: "cannot open".to_string(),
                };
            }
            Extraction::Extracted {
                text: format!("texto de {name}"),
                failed_pages: if name.starts_with("partial") {
                    vec![PageFailure {
                        page: 2,
                        reason: "bad stream".to_string(),
                    }]
                } else {
                    Vec::new()
                },
            }
        }
    }

    struct RejectingStore;

    #[async_trait]
    impl DocumentStore for RejectingStore {
        async fn contains(&self, _filename: &str) -> Result<bool, StoreError> {
            Ok(false)
        }

        async fn insert_batch(&self, _documents: Vec<Document>) -> Result<usize, StoreError> {
            Err(StoreError::Unavailable("disk full".to_string()))
        }

        async fn list_all(&self) -> Result<Vec<Document>, StoreError> {
            Ok(Vec::new())
        }
    }

    struct PanickingExtractor;

    impl TextExtractor for PanickingExtractor {
        fn extract(&self, _path: &Path) -> Extraction {
            panic!("parser blew up");
        }
    }

    /// Answers every lookup with "absent", as if another writer raced ahead.
    struct StaleLookupStore {
        inner: MemoryStore,
    }

    #[async_trait]
    impl DocumentStore for StaleLookupStore {
        async fn contains(&self, _filename: &str) -> Result<bool, StoreError> {
            Ok(false)
        }

        async fn insert_batch(&self, documents: Vec<Document>) -> Result<usize, StoreError> {
            self.inner.insert_batch(documents).await
        }

        async fn list_all(&self) -> Result<Vec<Document>, StoreError> {
            self.inner.list_all().await
        }
    }

    fn touch(dir: &Path, name: &str) -> Result<PathBuf, std::io::Error> {
        let path = dir.join(name);
        File::create(&path).and_then(|mut file| file.write_all(b"%PDF-1.4\n%fake"))?;
        Ok(path)
    }

    #[test]
    fn discover_pdf_files_is_recursive() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let base = dir.path();
        let nested = base.join("nested");
        fs::create_dir(&nested)?;

        touch(base, "a.pdf")?;
        touch(&nested, "b.PDF")?;
        touch(base, "notes.txt")?;

        let files = discover_pdf_files(base);
        assert_eq!(files.len(), 2);
        Ok(())
    }

    #[tokio::test]
    async fn second_run_neither_extracts_nor_duplicates() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let paths = vec![touch(dir.path(), "a.pdf")?, touch(dir.path(), "b.pdf")?];
        let store = MemoryStore::new();
        let pipeline =
            IngestionPipeline::new(&store, CountingExtractor::default(), ClassificationRules::default());

        let first = pipeline.ingest(&paths).await;
        assert!(first.committed);
        assert_eq!(first.inserted, 2);

        let second = pipeline.ingest(&paths).await;
        assert!(second.committed);
        assert_eq!(second.inserted, 0);
        assert_eq!(second.already_present, vec!["a.pdf", "b.pdf"]);

        assert_eq!(pipeline.extractor.calls.load(Ordering::SeqCst), 2);
        assert_eq!(store.len().await, 2);
        Ok(())
    }

    #[tokio::test]
    async fn missing_paths_are_reported_not_fatal() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let present = touch(dir.path(), "a.pdf")?;
        let absent = dir.path().join("gone.pdf");
        let store = MemoryStore::new();
        let pipeline =
            IngestionPipeline::new(&store, CountingExtractor::default(), ClassificationRules::default());

        let report = pipeline.ingest(&[absent.clone(), present]).await;
        assert_eq!(report.missing, vec![absent]);
        assert_eq!(report.processed, vec!["a.pdf"]);
        assert!(report.committed);
        Ok(())
    }

    #[tokio::test]
    async fn same_filename_in_two_folders_is_stored_once() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let other = dir.path().join("other");
        fs::create_dir(&other)?;
        let paths = vec![touch(dir.path(), "a.pdf")?, touch(&other, "a.pdf")?];
        let store = MemoryStore::new();
        let pipeline =
            IngestionPipeline::new(&store, CountingExtractor::default(), ClassificationRules::default());

        let report = pipeline.ingest(&paths).await;
        assert_eq!(report.processed, vec!["a.pdf"]);
        assert_eq!(report.already_present, vec!["a.pdf"]);
        assert_eq!(store.len().await, 1);
        Ok(())
    }

    #[tokio::test]
    async fn kind_is_decided_at_ingestion() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let paths = vec![
            touch(dir.path(), "TABELA DE PREÇOS ATUALIZADA (1).pdf")?,
            touch(dir.path(), "CONVÊNIOS versão2.pdf")?,
            touch(dir.path(), "MANUAL DE ATENDIMENTO VERSÃO 02 DRIVE (1).pdf")?,
        ];
        let store = MemoryStore::new();
        IngestionPipeline::new(&store, CountingExtractor::default(), ClassificationRules::default())
            .ingest(&paths)
            .await;

        let kinds = store
            .list_all()
            .await?
            .into_iter()
            .map(|document| document.kind)
            .collect::<Vec<_>>();
        assert_eq!(
            kinds,
            vec![DocumentKind::Table, DocumentKind::WideContext, DocumentKind::Default]
        );
        Ok(())
    }

    #[tokio::test]
    async fn extraction_failure_policy_decides_storage() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let paths = vec![touch(dir.path(), "broken.pdf")?, touch(dir.path(), "partial.pdf")?];

        let store = MemoryStore::new();
        let report =
            IngestionPipeline::new(&store, CountingExtractor::default(), ClassificationRules::default())
                .ingest(&paths)
                .await;
        assert_eq!(report.processed, vec!["broken.pdf", "partial.pdf"]);
        assert_eq!(report.failed_pages, 1);
        let stored = store.list_all().await?;
        assert_eq!(stored[0].content, "");
        assert_eq!(stored[1].content, "texto de partial.pdf");

        let skipping_store = MemoryStore::new();
        let report = IngestionPipeline::new(
            &skipping_store,
            CountingExtractor::default(),
            ClassificationRules::default(),
        )
        .with_options(IngestionOptions {
            on_extraction_failure: ExtractionFailurePolicy::Skip,
        })
        .ingest(&paths)
        .await;
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.processed, vec!["partial.pdf"]);
        assert_eq!(skipping_store.len().await, 1);
        Ok(())
    }

    #[tokio::test]
    async fn store_failure_is_reported_in_the_report() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let paths = vec![touch(dir.path(), "a.pdf")?, touch(dir.path(), "b.pdf")?];
        let store = RejectingStore;

        let report =
            IngestionPipeline::new(&store, CountingExtractor::default(), ClassificationRules::default())
                .ingest(&paths)
                .await;

        assert!(!report.committed);
        assert_eq!(report.inserted, 0);
        assert!(matches!(report.batch_failure, Some(IngestError::Store(_))));
        Ok(())
    }

    #[tokio::test]
    async fn inserted_count_comes_from_the_store() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let paths = vec![touch(dir.path(), "a.pdf")?, touch(dir.path(), "b.pdf")?];
        let store = StaleLookupStore {
            inner: MemoryStore::with_documents(vec![Document::new(
                "a.pdf",
                "gravado antes",
                DocumentKind::Default,
            )]),
        };

        let report =
            IngestionPipeline::new(&store, CountingExtractor::default(), ClassificationRules::default())
                .ingest(&paths)
                .await;

        assert!(report.committed);
        assert_eq!(report.processed, vec!["a.pdf", "b.pdf"]);
        assert_eq!(report.inserted, 1);
        assert_eq!(store.list_all().await?[0].content, "gravado antes");
        Ok(())
    }

    #[tokio::test]
    async fn crashing_extractor_counts_as_failed_extraction() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let paths = vec![touch(dir.path(), "a.pdf")?];
        let store = MemoryStore::new();

        let report = IngestionPipeline::new(&store, PanickingExtractor, ClassificationRules::default())
            .ingest(&paths)
            .await;

        assert!(report.committed);
        assert_eq!(report.inserted, 1);
        assert_eq!(store.list_all().await?[0].content, "");
        Ok(())
    }
}
