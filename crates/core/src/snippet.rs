use crate::models::{ContextWindow, DocumentKind, MatchSpan, SnippetConfig};
use regex::{Regex, RegexBuilder};

const ELLIPSIS: &str = "...";

/// Compiled form of one literal query, shared by every document of a search.
#[derive(Debug, Clone)]
pub struct QueryMatcher {
    literal: Regex,
    numeric_token: Regex,
}

impl QueryMatcher {
    pub fn new(query: &str) -> Result<Self, regex::Error> {
        let literal = RegexBuilder::new(&regex::escape(query))
            .case_insensitive(true)
            .build()?;
        let numeric_token = Regex::new(r"\b\d+\b")?;

        Ok(Self {
            literal,
            numeric_token,
        })
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.literal.is_match(text)
    }

    /// Non-overlapping occurrences, left to right.
    pub fn spans<'c>(&'c self, content: &'c str) -> impl Iterator<Item = MatchSpan> + 'c {
        self.literal.find_iter(content).map(|found| MatchSpan {
            start: found.start(),
            end: found.end(),
        })
    }

    fn has_numeric_token(&self, line: &str) -> bool {
        self.numeric_token.is_match(line)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnippetStrategy<'a> {
    /// Header row plus the first priced row mentioning the query; falls back to
    /// `fallback` windows when no such row exists.
    TableExtract {
        header_marker: &'a str,
        fallback: ContextWindow,
    },
    WideContext(ContextWindow),
    DefaultContext(ContextWindow),
}

impl<'a> SnippetStrategy<'a> {
    pub fn for_kind(kind: DocumentKind, config: &'a SnippetConfig) -> Self {
        match kind {
            DocumentKind::Table => Self::TableExtract {
                header_marker: &config.table_header_marker,
                fallback: config.default_window,
            },
            DocumentKind::WideContext => Self::WideContext(config.wide_window),
            DocumentKind::Default => Self::DefaultContext(config.default_window),
        }
    }

    pub fn snippets(
        &self,
        content: &str,
        matcher: &QueryMatcher,
        limit: Option<usize>,
    ) -> Vec<String> {
        match *self {
            Self::TableExtract {
                header_marker,
                fallback,
            } => match table_block(content, header_marker, matcher) {
                Some(block) => vec![block],
                None => context_snippets(content, matcher, fallback, limit),
            },
            Self::WideContext(window) | Self::DefaultContext(window) => {
                context_snippets(content, matcher, window, limit)
            }
        }
    }
}

fn table_block(content: &str, header_marker: &str, matcher: &QueryMatcher) -> Option<String> {
    let header = content
        .split('\n')
        .find(|line| line.to_lowercase().contains(header_marker))
        .map(str::trim);

    let row = content
        .split('\n')
        .find(|line| matcher.is_match(line) && matcher.has_numeric_token(line))
        .map(str::trim)?;

    Some(match header {
        Some(header) if !header.is_empty() => format!("{header}\n{row}"),
        _ => row.to_string(),
    })
}

fn context_snippets(
    content: &str,
    matcher: &QueryMatcher,
    window: ContextWindow,
    limit: Option<usize>,
) -> Vec<String> {
    matcher
        .spans(content)
        .take(limit.unwrap_or(usize::MAX))
        .map(|span| context_snippet(content, span, window))
        .collect()
}

pub fn context_snippet(content: &str, span: MatchSpan, window: ContextWindow) -> String {
    let start = step_back(content, span.start, window.chars_before);
    let end = step_forward(content, span.end, window.chars_after);

    let mut snippet = String::with_capacity(end - start + 2 * ELLIPSIS.len());
    if content[..start].chars().next_back().is_some_and(|c| !is_line_break(c)) {
        snippet.push_str(ELLIPSIS);
    }
    snippet.push_str(&content[start..end]);
    if content[end..].chars().next().is_some_and(|c| !is_line_break(c)) {
        snippet.push_str(ELLIPSIS);
    }

    snippet.trim().to_string()
}

fn is_line_break(c: char) -> bool {
    c == '\n' || c == '\r'
}

/// Byte offset `count` characters before `from`, clamped to the start.
fn step_back(content: &str, from: usize, count: usize) -> usize {
    if count == 0 {
        return from;
    }
    content[..from]
        .char_indices()
        .rev()
        .nth(count - 1)
        .map(|(index, _)| index)
        .unwrap_or(0)
}

/// Byte offset `count` characters after `from`, clamped to the end.
fn step_forward(content: &str, from: usize, count: usize) -> usize {
    content[from..]
        .char_indices()
        .nth(count)
        .map(|(index, _)| from + index)
        .unwrap_or(content.len())
}
