pub mod json_file;
pub mod memory;

pub use json_file::JsonFileStore;
pub use memory::MemoryStore;

use crate::Document;
use std::collections::HashSet;

/// Records from `batch` whose filename is absent from `existing` and not repeated
/// earlier in the batch.
pub(crate) fn absent_records(existing: &[Document], batch: Vec<Document>) -> Vec<Document> {
    let mut seen: HashSet<String> = existing
        .iter()
        .map(|document| document.filename.clone())
        .collect();

    batch
        .into_iter()
        .filter(|document| seen.insert(document.filename.clone()))
        .collect()
}
