use sha2::{Digest, Sha256};

#[derive(Debug, Clone)]
pub struct Chunk {
    pub chunk_id: String,
    pub index: usize,
    pub text: String,
    pub paragraphs: usize,
}

impl Chunk {
    pub fn new(page: &str, index: usize, text: String, paragraphs: usize) -> Self {
        // Generate stable chunk_id from page and content
        let chunk_id = Self::generate_chunk_id(page, index, &text);

        Self {
            chunk_id,
            index,
            text,
            paragraphs,
        }
    }

    fn generate_chunk_id(page: &str, index: usize, text: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(page.as_bytes());
        hasher.update(index.to_string().as_bytes());
        hasher.update(text.as_bytes());
        let result = hasher.finalize();
        hex::encode(&result[..8]) // First 8 bytes (16 hex chars)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunk_id_is_stable() {
        let a = Chunk::new("https://example.org", 0, "Some text.".to_string(), 1);
        let b = Chunk::new("https://example.org", 0, "Some text.".to_string(), 1);
        let c = Chunk::new("https://example.org", 1, "Some text.".to_string(), 1);

        assert_eq!(a.chunk_id, b.chunk_id);
        assert_ne!(a.chunk_id, c.chunk_id);
        assert_eq!(a.chunk_id.len(), 16);
    }
}
