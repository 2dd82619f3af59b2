//! Chunking engine: splits extracted text into overlapping chunks.
//!
//! The splitter walks the text with a sliding window and tries to land chunk
//! boundaries on sentence ends (a period, falling back to a newline) as long
//! as that does not shrink the chunk below half the target size. The cursor
//! advance is clamped to always move forward, so the walk terminates even
//! with degenerate settings such as `overlap >= chunk_size`.

use serde_json::{Map, Value};

use crate::core::config::ChunkingConfig;

/// A bounded substring of a source document, prepared for independent
/// embedding. Immutable once created.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentChunk {
    /// Whitespace-trimmed chunk text; never empty.
    pub content: String,
    /// Zero-based, contiguous index within the document.
    pub index: usize,
    /// Character count of `content`.
    pub char_length: usize,
    /// Source metadata attached during ingestion.
    pub metadata: Map<String, Value>,
}

/// Splits raw text into overlapping chunks.
#[derive(Debug, Clone)]
pub struct ChunkingEngine {
    config: ChunkingConfig,
}

impl ChunkingEngine {
    pub fn new(config: ChunkingConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ChunkingConfig {
        &self.config
    }

    pub fn chunk(&self, text: &str) -> Vec<DocumentChunk> {
        chunk_text(text, self.config.chunk_size, self.config.overlap)
    }
}

impl Default for ChunkingEngine {
    fn default() -> Self {
        Self::new(ChunkingConfig::default())
    }
}

/// Split `text` into chunks of roughly `chunk_size` characters with
/// `overlap` characters shared between consecutive chunks.
///
/// Empty or whitespace-only input yields zero chunks.
pub fn chunk_text(text: &str, chunk_size: usize, overlap: usize) -> Vec<DocumentChunk> {
    let chars: Vec<char> = text.chars().collect();
    let total = chars.len();

    let mut chunks = Vec::new();
    if total == 0 || chunk_size == 0 {
        return chunks;
    }

    let mut start = 0usize;
    let mut index = 0usize;

    while start < total {
        let mut end = (start + chunk_size).min(total);

        // Pull the boundary back to a sentence end, but never below half the
        // target size. Periods beat newlines.
        if start + chunk_size < total {
            let floor = start + chunk_size / 2;
            if let Some(pos) = rfind_char(&chars, start, end, '.').filter(|&p| p >= floor) {
                end = pos + 1;
            } else if let Some(pos) = rfind_char(&chars, start, end, '\n').filter(|&p| p >= floor) {
                end = pos + 1;
            }
        }

        let slice: String = chars[start..end].iter().collect();
        let content = slice.trim();
        if !content.is_empty() {
            chunks.push(DocumentChunk {
                content: content.to_string(),
                index,
                char_length: content.chars().count(),
                metadata: Map::new(),
            });
            index += 1;
        }

        if end >= total {
            break;
        }

        // Step back by the overlap, clamped so the cursor always advances.
        start = end.saturating_sub(overlap).max(start + 1);
    }

    chunks
}

/// Backward search for `needle` in `chars[start..end)`, returning its
/// absolute position.
fn rfind_char(chars: &[char], start: usize, end: usize, needle: char) -> Option<usize> {
    chars[start..end]
        .iter()
        .rposition(|&c| c == needle)
        .map(|offset| start + offset)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_yields_no_chunks() {
        assert!(chunk_text("", 1000, 200).is_empty());
        assert!(chunk_text("   \n\t  ", 1000, 200).is_empty());
    }

    #[test]
    fn short_input_yields_single_chunk() {
        let chunks = chunk_text("Hello world.", 1000, 200);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].content, "Hello world.");
        assert_eq!(chunks[0].index, 0);
        assert_eq!(chunks[0].char_length, 12);
    }

    #[test]
    fn indices_are_contiguous_and_zero_based() {
        let text = "This is a sentence. ".repeat(100);
        let chunks = chunk_text(&text, 200, 50);
        for (expected, chunk) in chunks.iter().enumerate() {
            assert_eq!(chunk.index, expected);
        }
    }

    #[test]
    fn never_emits_empty_chunks() {
        let text = format!("{}\n\n\n   \n{}", "a".repeat(300), "b".repeat(300));
        let chunks = chunk_text(&text, 100, 20);
        assert!(chunks.iter().all(|c| !c.content.trim().is_empty()));
        assert!(chunks.iter().all(|c| c.char_length > 0));
    }

    #[test]
    fn chunk_count_stays_within_bound() {
        let text = "x".repeat(10_000);
        let chunk_size = 1000;
        let overlap = 200;
        let chunks = chunk_text(&text, chunk_size, overlap);
        let bound = text.len().div_ceil(chunk_size - overlap);
        assert!(chunks.len() <= bound, "{} chunks > bound {}", chunks.len(), bound);
    }

    #[test]
    fn terminates_when_overlap_exceeds_chunk_size() {
        // Degenerate settings must still make forward progress.
        let text = "word ".repeat(100);
        let chunks = chunk_text(&text, 10, 50);
        assert!(!chunks.is_empty());
    }

    #[test]
    fn prefers_period_boundary_over_hard_cut() {
        let mut text = String::new();
        text.push_str(&"a".repeat(70));
        text.push_str(". ");
        text.push_str(&"b".repeat(200));
        let chunks = chunk_text(&text, 100, 10);
        // First chunk ends at the period, which sits past the half-size floor.
        assert!(chunks[0].content.ends_with('.'));
        assert!(chunks[0].char_length <= 71);
    }

    #[test]
    fn ignores_boundary_below_half_target() {
        let mut text = String::new();
        text.push_str(&"a".repeat(20));
        text.push('.');
        text.push_str(&"b".repeat(300));
        let chunks = chunk_text(&text, 100, 10);
        // Period at offset 20 is below the floor of 50, so the first chunk is
        // a full-size hard cut.
        assert_eq!(chunks[0].char_length, 100);
    }

    #[test]
    fn coverage_of_non_whitespace_content() {
        let text = "The quick brown fox jumps over the lazy dog. ".repeat(60);
        let chunks = chunk_text(&text, 250, 50);

        let normalize = |s: &str| s.split_whitespace().collect::<Vec<_>>().join(" ");
        let stripped = normalize(&text);

        // Each chunk is a faithful slice of the source.
        for chunk in &chunks {
            assert!(
                stripped.contains(&normalize(&chunk.content)),
                "chunk content missing from source"
            );
        }

        // Together the chunks cover the whole stripped text; overlap means
        // their combined length can only exceed it.
        let total_chunk_chars: usize = chunks
            .iter()
            .map(|c| normalize(&c.content).len())
            .sum();
        assert!(total_chunk_chars >= stripped.len());
    }

    #[test]
    fn target_size_scenario() {
        // 2500 chars at size 1000 / overlap 200: every chunk at most 1000
        // chars, consecutive chunks overlap by up to 200 chars.
        let sentence = "This sentence is exactly fifty characters long!!. ";
        assert_eq!(sentence.len(), 50);
        let text = sentence.repeat(50);
        assert_eq!(text.len(), 2500);

        let chunks = chunk_text(&text, 1000, 200);
        assert!(chunks.len() >= 3);
        for (expected, chunk) in chunks.iter().enumerate() {
            assert_eq!(chunk.index, expected);
            assert!(chunk.char_length <= 1000);
        }
    }

    #[test]
    fn engine_uses_configured_sizes() {
        let engine = ChunkingEngine::new(ChunkingConfig {
            chunk_size: 100,
            overlap: 20,
        });
        let chunks = engine.chunk(&"z".repeat(500));
        assert!(chunks.iter().all(|c| c.char_length <= 100));
    }
}
