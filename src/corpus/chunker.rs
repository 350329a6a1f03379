//! Separator-aware document chunking.
//!
//! A document is cut into consecutive "cores" that prefer separator
//! boundaries, then each chunk is emitted as its core plus the configured
//! overlap of text preceding it. Invariants:
//!
//! - every chunk is at most `chunk_size` characters
//! - chunks are in document order and chunking is deterministic
//! - concatenating the cores (each chunk minus its overlap prefix)
//!   reproduces the document content exactly

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::render::Document;
use crate::core::config::IngestSettings;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkingConfig {
    /// Maximum chunk size in characters
    pub chunk_size: usize,
    /// Characters of preceding text repeated at the start of each chunk
    pub chunk_overlap: usize,
    /// Preferred boundary between chunks
    pub separator: String,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            chunk_overlap: 200,
            separator: "\n".to_string(),
        }
    }
}

impl From<&IngestSettings> for ChunkingConfig {
    fn from(settings: &IngestSettings) -> Self {
        Self {
            chunk_size: settings.chunk_size,
            chunk_overlap: settings.chunk_overlap,
            separator: settings.separator.clone(),
        }
    }
}

/// A bounded slice of a document, carrying the parent metadata unchanged.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chunk {
    pub id: String,
    pub document_id: String,
    pub index: usize,
    pub content: String,
    pub metadata: Value,
}

pub fn chunk_document(document: &Document, config: &ChunkingConfig) -> Vec<Chunk> {
    let content = document.content.as_str();
    if content.is_empty() {
        return Vec::new();
    }

    // An overlap at or above the chunk size would leave no room for new
    // text; clamp it so the size cap always holds.
    let chunk_size = config.chunk_size.max(1);
    let overlap = config.chunk_overlap.min(chunk_size - 1);
    let budget = chunk_size - overlap;

    let pieces = split_pieces(content, &config.separator, budget);
    let cores = pack_cores(&pieces, budget);

    cores
        .iter()
        .enumerate()
        .map(|(index, core)| {
            let start = if index == 0 {
                core.start
            } else {
                walk_back(content, core.start, overlap)
            };
            Chunk {
                id: format!("{}-chunk-{}", document.id, index),
                document_id: document.id.clone(),
                index,
                content: content[start..core.end].to_string(),
                metadata: document.metadata.clone(),
            }
        })
        .collect()
}

// A contiguous byte range of at most `budget` characters, ending on a
// separator where possible.
struct Piece {
    start: usize,
    end: usize,
    chars: usize,
}

struct Core {
    start: usize,
    end: usize,
}

fn split_pieces(content: &str, separator: &str, budget: usize) -> Vec<Piece> {
    let mut pieces = Vec::new();

    if separator.is_empty() {
        hard_split(content, 0, budget, &mut pieces);
        return pieces;
    }

    let mut offset = 0;
    for segment in content.split_inclusive(separator) {
        let chars = segment.chars().count();
        if chars <= budget {
            pieces.push(Piece {
                start: offset,
                end: offset + segment.len(),
                chars,
            });
        } else {
            hard_split(segment, offset, budget, &mut pieces);
        }
        offset += segment.len();
    }

    pieces
}

// Cut a separator-free run at character boundaries.
fn hard_split(text: &str, base: usize, budget: usize, pieces: &mut Vec<Piece>) {
    let mut start = 0;
    let mut chars = 0;
    for (idx, _) in text.char_indices() {
        if chars == budget {
            pieces.push(Piece {
                start: base + start,
                end: base + idx,
                chars,
            });
            start = idx;
            chars = 0;
        }
        chars += 1;
    }
    if chars > 0 {
        pieces.push(Piece {
            start: base + start,
            end: base + text.len(),
            chars,
        });
    }
}

fn pack_cores(pieces: &[Piece], budget: usize) -> Vec<Core> {
    let mut cores = Vec::new();
    let Some(first) = pieces.first() else {
        return cores;
    };

    let mut start = first.start;
    let mut end = first.start;
    let mut chars = 0;
    for piece in pieces {
        if chars > 0 && chars + piece.chars > budget {
            cores.push(Core { start, end });
            start = piece.start;
            chars = 0;
        }
        end = piece.end;
        chars += piece.chars;
    }
    cores.push(Core { start, end });

    cores
}

// Byte index `n_chars` characters before `byte_idx`, clamped at the start.
fn walk_back(content: &str, byte_idx: usize, n_chars: usize) -> usize {
    let mut idx = byte_idx;
    for _ in 0..n_chars {
        match content[..idx].chars().next_back() {
            Some(c) => idx -= c.len_utf8(),
            None => break,
        }
    }
    idx
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(content: &str) -> Document {
        Document {
            id: "product-BM-1".to_string(),
            content: content.to_string(),
            metadata: json!({"doc_type": "product"}),
        }
    }

    fn config(size: usize, overlap: usize) -> ChunkingConfig {
        ChunkingConfig {
            chunk_size: size,
            chunk_overlap: overlap,
            separator: "\n".to_string(),
        }
    }

    fn reconstruct(chunks: &[Chunk], overlap: usize) -> String {
        let mut rebuilt = String::new();
        for chunk in chunks {
            let skip = overlap.min(rebuilt.chars().count());
            if rebuilt.is_empty() {
                rebuilt.push_str(&chunk.content);
            } else {
                rebuilt.extend(chunk.content.chars().skip(skip));
            }
        }
        rebuilt
    }

    #[test]
    fn short_document_is_one_chunk() {
        let document = doc("just one line\nand another");
        let chunks = chunk_document(&document, &config(1000, 200));

        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].content, document.content);
        assert_eq!(chunks[0].id, "product-BM-1-chunk-0");
        assert_eq!(chunks[0].index, 0);
        assert_eq!(chunks[0].metadata, document.metadata);
    }

    #[test]
    fn every_chunk_respects_the_size_cap() {
        let content = (0..60)
            .map(|i| format!("line number {i} with some filler text"))
            .collect::<Vec<_>>()
            .join("\n");
        let document = doc(&content);
        let cfg = config(120, 30);

        let chunks = chunk_document(&document, &cfg);
        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert!(chunk.content.chars().count() <= cfg.chunk_size);
        }
    }

    #[test]
    fn removing_overlaps_reconstructs_the_content() {
        let content = (0..40)
            .map(|i| format!("entry {i}: tensile strength and span ratings"))
            .collect::<Vec<_>>()
            .join("\n");
        let document = doc(&content);
        let cfg = config(150, 40);

        let chunks = chunk_document(&document, &cfg);
        assert!(chunks.len() > 1);
        assert_eq!(reconstruct(&chunks, cfg.chunk_overlap), content);
    }

    #[test]
    fn chunks_start_with_the_preceding_overlap() {
        let content = (0..30)
            .map(|i| format!("row {i} about plywood grades"))
            .collect::<Vec<_>>()
            .join("\n");
        let document = doc(&content);
        let cfg = config(100, 25);

        let chunks = chunk_document(&document, &cfg);
        assert!(chunks.len() > 1);

        let mut seen = String::new();
        for (i, chunk) in chunks.iter().enumerate() {
            if i > 0 {
                let prefix_len = cfg.chunk_overlap.min(seen.chars().count());
                let expected: String = seen
                    .chars()
                    .skip(seen.chars().count() - prefix_len)
                    .collect();
                let actual: String = chunk.content.chars().take(prefix_len).collect();
                assert_eq!(actual, expected);
                seen.extend(chunk.content.chars().skip(prefix_len));
            } else {
                seen.push_str(&chunk.content);
            }
        }
    }

    #[test]
    fn separator_free_runs_are_hard_split() {
        let content = "x".repeat(500);
        let document = doc(&content);
        let cfg = config(100, 20);

        let chunks = chunk_document(&document, &cfg);
        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert!(chunk.content.chars().count() <= 100);
        }
        assert_eq!(reconstruct(&chunks, cfg.chunk_overlap), content);
    }

    #[test]
    fn multibyte_content_is_cut_on_character_boundaries() {
        let content = "断熱材は安全に取り扱うこと。".repeat(40);
        let document = doc(&content);
        let cfg = config(50, 10);

        let chunks = chunk_document(&document, &cfg);
        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert!(chunk.content.chars().count() <= 50);
        }
        assert_eq!(reconstruct(&chunks, cfg.chunk_overlap), content);
    }

    #[test]
    fn chunking_is_deterministic() {
        let content = (0..25)
            .map(|i| format!("deck board option {i}"))
            .collect::<Vec<_>>()
            .join("\n");
        let document = doc(&content);
        let cfg = config(90, 15);

        let first = chunk_document(&document, &cfg);
        let second = chunk_document(&document, &cfg);

        assert_eq!(first.len(), second.len());
        for (a, b) in first.iter().zip(second.iter()) {
            assert_eq!(a.id, b.id);
            assert_eq!(a.content, b.content);
        }
    }

    #[test]
    fn oversized_overlap_is_clamped() {
        let content = "abcdefghij\nklmnopqrst\nuvwxyz";
        let document = doc(content);
        let chunks = chunk_document(&document, &config(10, 50));

        assert!(!chunks.is_empty());
        for chunk in &chunks {
            assert!(chunk.content.chars().count() <= 10);
        }
        assert_eq!(reconstruct(&chunks, 9), content);
    }

    #[test]
    fn empty_content_yields_no_chunks() {
        let document = doc("");
        assert!(chunk_document(&document, &ChunkingConfig::default()).is_empty());
    }
}
