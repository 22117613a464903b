use serde::{Deserialize, Serialize};

/// Snippet behavior a document is served with, decided once at ingestion.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    Table,
    WideContext,
    #[default]
    Default,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Document {
    pub filename: String,
    pub content: String,
    #[serde(default)]
    pub kind: DocumentKind,
}

impl Document {
    pub fn new(filename: impl Into<String>, content: impl Into<String>, kind: DocumentKind) -> Self {
        Self {
            filename: filename.into(),
            content: content.into(),
            kind,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct SearchRequest {
    pub query: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SearchResultItem {
    pub filename: String,
    pub snippet: String,
}

/// One case-insensitive occurrence inside a document's content.
///
/// Stored as byte offsets on UTF-8 character boundaries so the content can be
/// sliced directly; context windows around it are counted in characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchSpan {
    pub start: usize,
    pub end: usize,
}

/// Characters of context kept on each side of a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContextWindow {
    pub chars_before: usize,
    pub chars_after: usize,
}

#[derive(Debug, Clone)]
pub struct SnippetConfig {
    pub default_window: ContextWindow,
    pub wide_window: ContextWindow,
    /// Lower-cased text identifying the header row of a price table.
    pub table_header_marker: String,
    pub max_snippets_per_document: Option<usize>,
}

impl Default for SnippetConfig {
    fn default() -> Self {
        Self {
            default_window: ContextWindow {
                chars_before: 100,
                chars_after: 300,
            },
            wide_window: ContextWindow {
                chars_before: 300,
                chars_after: 300,
            },
            table_header_marker: "tabela de preços ultrassom".to_string(),
            max_snippets_per_document: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExtractionFailurePolicy {
    /// Store the document with empty content so it is not retried on the next run.
    #[default]
    StoreEmpty,
    Skip,
}

#[derive(Debug, Clone, Default)]
pub struct IngestionOptions {
    pub on_extraction_failure: ExtractionFailurePolicy,
}
