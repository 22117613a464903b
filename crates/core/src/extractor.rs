use lopdf::Document;
use std::path::Path;
use tracing::warn;

/// One page that could not be converted to text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageFailure {
    pub page: u32,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extraction {
    /// Text from every readable page, in page order. Failing pages contributed nothing.
    Extracted {
        text: String,
        failed_pages: Vec<PageFailure>,
    },
    /// The document could not be opened at all.
    Failed { reason: String },
}

impl Extraction {
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Extracted { text, .. } => Some(text),
            Self::Failed { .. } => None,
        }
    }
}

pub trait TextExtractor {
    fn extract(&self, path: &Path) -> Extraction;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct LopdfExtractor;

impl TextExtractor for LopdfExtractor {
    fn extract(&self, path: &Path) -> Extraction {
        let document = match Document::load(path) {
            Ok(document) => document,
            Err(error) => {
                return Extraction::Failed {
                    reason: format!("{}: {error}", path.display()),
                }
            }
        };

        let pages = document
            .get_pages()
            .into_keys()
            .map(|page_no| {
                let text = document
                    .extract_text(&[page_no])
                    .map_err(|error| error.to_string());
                (page_no, text)
            })
            .collect::<Vec<_>>();

        join_pages(path, pages)
    }
}

pub(crate) fn join_pages(
    path: &Path,
    pages: Vec<(u32, Result<String, String>)>,
) -> Extraction {
    let mut text = String::new();
    let mut failed_pages = Vec::new();

    for (page, extracted) in pages {
        match extracted {
            Ok(page_text) => text.push_str(&page_text),
            Err(reason) => {
                warn!(path = %path.display(), page, reason = %reason, "page text extraction failed");
                failed_pages.push(PageFailure { page, reason });
            }
        }
    }

    Extraction::Extracted { text, failed_pages }
}
