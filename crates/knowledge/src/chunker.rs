//! Page-accumulating text chunker.

use crate::types::Chunk;
use fastrag_core::{AppError, AppResult};

/// Split page texts into retrieval chunks.
///
/// Pages are trimmed and appended to a buffer, separated by a single space.
/// As soon as the buffer holds at least `chunk_size` characters it becomes
/// the next chunk. Whatever remains at the end forms a final, possibly short,
/// chunk. Blank pages are skipped.
///
/// Chunk ids are sequential ("0", "1", ...) in emission order.
pub fn chunk_pages<S: AsRef<str>>(pages: &[S], chunk_size: usize) -> AppResult<Vec<Chunk>> {
    if chunk_size == 0 {
        return Err(AppError::Validation(
            "chunk size must be greater than zero".to_string(),
        ));
    }

    let mut chunks = Vec::new();
    let mut buffer = String::new();
    let mut buffered_chars = 0usize;
    let mut blank_pages = 0usize;

    for page in pages {
        let text = page.as_ref().trim();
        if text.is_empty() {
            blank_pages += 1;
            continue;
        }

        if !buffer.is_empty() {
            buffer.push(' ');
            buffered_chars += 1;
        }
        buffer.push_str(text);
        buffered_chars += text.chars().count();

        if buffered_chars >= chunk_size {
            push_chunk(&mut chunks, std::mem::take(&mut buffer));
            buffered_chars = 0;
        }
    }

    if !buffer.is_empty() {
        push_chunk(&mut chunks, buffer);
    }

    if blank_pages > 0 {
        tracing::warn!("Skipped {} blank pages", blank_pages);
    }

    tracing::debug!(
        "Chunked {} pages into {} chunks (size: {})",
        pages.len(),
        chunks.len(),
        chunk_size
    );

    Ok(chunks)
}

/// Chunk a single text; equivalent to a one-page corpus.
pub fn chunk_text(text: &str, chunk_size: usize) -> AppResult<Vec<Chunk>> {
    chunk_pages(&[text], chunk_size)
}

fn push_chunk(chunks: &mut Vec<Chunk>, text: String) {
    let position = chunks.len();
    chunks.push(Chunk {
        id: position.to_string(),
        text,
        source_order: position,
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_chunk_size_rejected() {
        let result = chunk_pages(&["text"], 0);
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[test]
    fn test_empty_input() {
        let pages: Vec<String> = Vec::new();
        assert!(chunk_pages(&pages, 100).unwrap().is_empty());
        assert!(chunk_text("", 100).unwrap().is_empty());
        assert!(chunk_pages(&["   ", "\n\t"], 100).unwrap().is_empty());
    }

    #[test]
    fn test_pages_accumulate_until_threshold() {
        let pages = ["aaaa", "bbbb", "cccc", "dd"];
        let chunks = chunk_pages(&pages, 9).unwrap();

        let texts: Vec<&str> = chunks.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(texts, vec!["aaaa bbbb", "cccc dd"]);
        assert_eq!(chunks[0].id, "0");
        assert_eq!(chunks[1].id, "1");
        assert_eq!(chunks[1].source_order, 1);
    }

    #[test]
    fn test_long_page_becomes_its_own_chunk() {
        let long = "x".repeat(50);
        let pages = [long.as_str(), "tail"];
        let chunks = chunk_pages(&pages, 10).unwrap();

        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].text, long);
        assert_eq!(chunks[1].text, "tail");
    }

    #[test]
    fn test_pages_are_trimmed() {
        let chunks = chunk_pages(&["  Capítulo 1 \n", "\n Igreja  "], 1000).unwrap();
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text, "Capítulo 1 Igreja");
    }

    #[test]
    fn test_threshold_counts_characters_not_bytes() {
        // 4 characters, 8 bytes
        let chunks = chunk_pages(&["ãéíõ", "fim"], 5).unwrap();
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text, "ãéíõ fim");
    }

    #[test]
    fn test_coverage_and_minimum_length() {
        let pages: Vec<String> = (0..40)
            .map(|i| format!("Página {} {}", i, "texto ".repeat(i % 7)))
            .collect();
        let chunk_size = 60;
        let chunks = chunk_pages(&pages, chunk_size).unwrap();

        let rebuilt = chunks
            .iter()
            .map(|c| c.text.as_str())
            .collect::<Vec<_>>()
            .join(" ");
        let original = pages
            .iter()
            .map(|p| p.trim())
            .filter(|p| !p.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        assert_eq!(rebuilt, original);

        let (last, rest) = chunks.split_last().unwrap();
        assert!(!last.text.is_empty());
        for chunk in rest {
            assert!(chunk.text.chars().count() >= chunk_size, "{:?}", chunk.text);
        }
    }
}
