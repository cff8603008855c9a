// src/retrieval/mod.rs — Reference guide corpus and lexical lookup
//
// Guides live as `<knowledge_dir>/<destination>.md` (or `.txt`). A missing
// guide is a hard error: RAG strategies cannot run without one.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::infra::config::RetrievalConfig;
use crate::infra::errors::WayfareError;

/// Anything that can hand back reference passages for a query.
pub trait ReferenceSource: Send + Sync {
    /// Up to `k` passages, best first.
    fn search(&self, query: &str, k: usize) -> Vec<String>;
}

/// Query used to build the RAG context for a destination.
pub fn rag_query(destination: &str) -> String {
    format!("activities and good practices in {destination}")
}

/// Retrieve the reference text a RAG strategy receives: top-k passages joined by a blank line.
pub fn reference_text(source: &dyn ReferenceSource, destination: &str, k: usize) -> String {
    source.search(&rag_query(destination), k).join("\n\n")
}

/// A destination guide split into overlapping chunks.
#[derive(Debug, Clone)]
pub struct GuideCorpus {
    pub destination: String,
    pub path: PathBuf,
    chunks: Vec<String>,
}

impl GuideCorpus {
    /// Locate and chunk the guide for `destination`.
    pub fn load(config: &RetrievalConfig, destination: &str) -> Result<Self, WayfareError> {
        let path = guide_path(&config.knowledge_dir, destination).ok_or_else(|| {
            WayfareError::MissingCorpus {
                destination: destination.to_string(),
                path: config.knowledge_dir.join(format!("{destination}.md")),
            }
        })?;

        let text = std::fs::read_to_string(&path)?;
        let chunks = split_into_chunks(&text, config.chunk_size, config.chunk_overlap);
        tracing::debug!(
            destination,
            path = %path.display(),
            chunks = chunks.len(),
            "loaded reference guide"
        );

        Ok(Self {
            destination: destination.to_string(),
            path,
            chunks,
        })
    }

    pub fn from_text(destination: &str, text: &str, chunk_size: usize, overlap: usize) -> Self {
        Self {
            destination: destination.to_string(),
            path: PathBuf::new(),
            chunks: split_into_chunks(text, chunk_size, overlap),
        }
    }

    pub fn chunks(&self) -> &[String] {
        &self.chunks
    }
}

impl ReferenceSource for GuideCorpus {
    fn search(&self, query: &str, k: usize) -> Vec<String> {
        let terms = terms_in(query);
        let mut scored: Vec<(usize, &String)> = self
            .chunks
            .iter()
            .map(|chunk| (terms.intersection(&terms_in(chunk)).count(), chunk))
            .collect();
        // Stable: ties keep document order.
        scored.sort_by(|a, b| b.0.cmp(&a.0));
        scored.into_iter().take(k).map(|(_, c)| c.clone()).collect()
    }
}

fn guide_path(dir: &Path, destination: &str) -> Option<PathBuf> {
    ["md", "txt"]
        .iter()
        .map(|ext| dir.join(format!("{destination}.{ext}")))
        .find(|p| p.is_file())
}

/// Lowercased alphanumeric terms of at least 3 characters.
fn terms_in(text: &str) -> HashSet<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| w.chars().count() >= 3)
        .map(|w| w.to_lowercase())
        .collect()
}

/// Split text into chunks of at most `size` characters, overlapping by `overlap`.
/// Prefers to cut at a paragraph break, then a line break, then a space.
pub fn split_into_chunks(text: &str, size: usize, overlap: usize) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    let size = size.max(1);
    let overlap = overlap.min(size.saturating_sub(1));
    let mut chunks = Vec::new();
    let mut start = 0;

    while start < chars.len() {
        let hard_end = (start + size).min(chars.len());
        let end = if hard_end == chars.len() {
            hard_end
        } else {
            find_break(&chars, start, hard_end).unwrap_or(hard_end)
        };

        let chunk: String = chars[start..end].iter().collect();
        let chunk = chunk.trim();
        if !chunk.is_empty() {
            chunks.push(chunk.to_string());
        }

        if end == chars.len() {
            break;
        }
        start = end.saturating_sub(overlap).max(start + 1);
    }
    chunks
}

/// Best cut point in `chars[start..end]`, only accepted past the halfway mark.
fn find_break(chars: &[char], start: usize, end: usize) -> Option<usize> {
    let floor = start + (end - start) / 2;
    let window = &chars[start..end];

    let paragraph = window
        .windows(2)
        .rposition(|w| w[0] == '\n' && w[1] == '\n')
        .map(|i| start + i + 2);
    let line = window.iter().rposition(|c| *c == '\n').map(|i| start + i + 1);
    let space = window.iter().rposition(|c| *c == ' ').map(|i| start + i + 1);

    [paragraph, line, space]
        .into_iter()
        .flatten()
        .find(|&cut| cut > floor)
}
