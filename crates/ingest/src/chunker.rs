use crate::chunk::Chunk;

pub struct ChunkerConfig {
    pub max_paragraphs: usize,
    pub separator: String,
}

impl Default for ChunkerConfig {
    fn default() -> Self {
        Self {
            max_paragraphs: 10,
            separator: "\n\n".to_string(),
        }
    }
}

pub struct Chunker {
    config: ChunkerConfig,
}

impl Chunker {
    pub fn new(config: ChunkerConfig) -> Self {
        Self { config }
    }

    /// Group non-empty paragraphs into chunks of at most `max_paragraphs`.
    ///
    /// Paragraphs are trimmed first; blank ones are dropped. A page with no
    /// text yields no chunks.
    pub fn chunk_paragraphs<S: AsRef<str>>(&self, page: &str, paragraphs: &[S]) -> Vec<Chunk> {
        let max = self.config.max_paragraphs.max(1);
        let mut chunks = Vec::new();
        let mut buffer: Vec<&str> = Vec::with_capacity(max);

        for para in paragraphs {
            let para = para.as_ref().trim();
            if para.is_empty() {
                continue;
            }

            buffer.push(para);

            if buffer.len() == max {
                chunks.push(self.flush(page, chunks.len(), &buffer));
                buffer.clear();
            }
        }

        // Flush remaining buffer
        if !buffer.is_empty() {
            chunks.push(self.flush(page, chunks.len(), &buffer));
        }

        chunks
    }

    fn flush(&self, page: &str, index: usize, buffer: &[&str]) -> Chunk {
        Chunk::new(
            page,
            index,
            buffer.join(&self.config.separator),
            buffer.len(),
        )
    }
}
