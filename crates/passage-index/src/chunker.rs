//! Token-window text segmentation.
//!
//! Tokens are maximal runs of non-whitespace characters. `split_text` slides
//! a fixed-size token window with overlap; `split_markdown` first cuts the
//! document at headings so chunks do not straddle section boundaries.

use std::sync::LazyLock;

use passage_core::config::ChunkingConfig;
use regex::Regex;
use uuid::Uuid;

use crate::document::{Chunk, Document};

static HEADING_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^#{1,6} ").unwrap_or_else(|e| unreachable!("invalid heading regex: {e}"))
});

/// Split into maximal runs of non-whitespace characters, in order.
#[must_use]
pub fn tokenize(text: &str) -> Vec<&str> {
    text.split_whitespace().collect()
}

/// Slide a window of `max_tokens` tokens with step `max(1, max_tokens -
/// overlap)`; each window is serialized by joining its tokens with single
/// spaces. `max_tokens == 0` returns the whole text as one chunk. Empty text
/// yields no chunks. The final window may be shorter than `max_tokens` but is
/// never skipped or duplicated.
#[must_use]
pub fn split_text(text: &str, max_tokens: usize, overlap: usize) -> Vec<String> {
    if text.is_empty() {
        return Vec::new();
    }
    if max_tokens == 0 {
        return vec![text.to_owned()];
    }

    let tokens = tokenize(text);
    let n = tokens.len();
    let step = max_tokens.saturating_sub(overlap).max(1);
    let mut chunks = Vec::new();
    let mut i = 0;

    while i < n {
        let j = (i + max_tokens).min(n);
        let chunk = tokens[i..j].join(" ");
        if !chunk.is_empty() {
            chunks.push(chunk);
        }
        if j >= n {
            break;
        }
        i += step;
    }

    chunks
}

/// Split at markdown headings first, then token-window each section.
///
/// Sections after the first get a single normalized `"# "` marker reattached
/// regardless of the original heading depth, so heading level is lost here.
/// Sections are emitted as concatenated chunk lists in document order.
#[must_use]
pub fn split_markdown(text: &str, max_tokens: usize, overlap: usize) -> Vec<String> {
    if text.is_empty() {
        return Vec::new();
    }

    let mut sections = Vec::new();
    for (idx, part) in HEADING_RE.split(text).enumerate() {
        if part.is_empty() {
            continue;
        }
        if idx == 0 {
            sections.push(part.to_owned());
        } else {
            sections.push(format!("# {part}"));
        }
    }

    let mut chunks = Vec::new();
    for section in &sections {
        chunks.extend(split_text(section, max_tokens, overlap));
    }
    chunks
}

/// Chunk one loaded document, markdown-aware by source extension, attaching
/// fresh chunk ids and the document's metadata to every chunk.
#[must_use]
pub fn chunk_document(document: &Document, config: ChunkingConfig) -> Vec<Chunk> {
    let text = &document.content;
    if text.is_empty() {
        return Vec::new();
    }

    let parts = if document.metadata.source.to_lowercase().ends_with(".md") {
        split_markdown(text, config.max_tokens, config.overlap)
    } else {
        split_text(text, config.max_tokens, config.overlap)
    };

    parts
        .into_iter()
        .map(|text| Chunk {
            text,
            chunk_id: Uuid::new_v4().simple().to_string(),
            metadata: document.metadata.clone(),
        })
        .collect()
}
