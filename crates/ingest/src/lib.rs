pub mod chunk;
pub mod chunker;
pub mod page;

pub use chunk::Chunk;
pub use chunker::{Chunker, ChunkerConfig};
pub use page::{PageFetcher, extract_paragraphs};

/// Split a fetched HTML page into extraction chunks.
pub fn chunk_page(url: &str, html: &str, chunker: &Chunker) -> Vec<Chunk> {
    let paragraphs = extract_paragraphs(html);
    let chunks = chunker.chunk_paragraphs(url, &paragraphs);

    tracing::debug!(
        url,
        paragraphs = paragraphs.len(),
        chunks = chunks.len(),
        "Page chunked"
    );

    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunk_page() {
        let html: String = (0..25).map(|i| format!("<p>Sentence {i}.</p>")).collect();
        let chunker = Chunker::new(ChunkerConfig::default());
        let chunks = chunk_page("https://example.org", &html, &chunker);

        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[2].paragraphs, 5);
        assert!(chunks[0].text.starts_with("Sentence 0."));
    }

    #[test]
    fn test_chunk_page_without_text() {
        let chunker = Chunker::new(ChunkerConfig::default());
        assert!(chunk_page("u", "<html><p>  </p></html>", &chunker).is_empty());
    }
}
