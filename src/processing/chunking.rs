//! Fixed-width chunking of extracted text.
//!
//! Text is cut every `max_len` characters (Unicode scalar values) starting at offset 0. Chunk
//! boundaries ignore words and sentences; the summarizer tolerates mid-sentence cuts. Chunks
//! partition the input exactly, so concatenating them reproduces the original text.

use super::types::ChunkingError;

/// A contiguous slice of the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chunk<'a> {
    /// Position of the chunk in the sequence, starting at zero.
    pub index: usize,
    /// Character offset of the first character in the source text.
    pub start: usize,
    /// Borrowed chunk contents.
    pub text: &'a str,
}

impl Chunk<'_> {
    /// Number of characters in the chunk.
    pub fn len(&self) -> usize {
        self.text.chars().count()
    }

    /// Whether the chunk holds no characters. Never true for chunks produced by [`chunk_text`].
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// Split `text` into chunks of at most `max_len` characters.
///
/// Returns an empty vector for empty input and [`ChunkingError::InvalidChunkSize`] when
/// `max_len` is zero.
pub fn chunk_text(text: &str, max_len: usize) -> Result<Vec<Chunk<'_>>, ChunkingError> {
    if max_len == 0 {
        return Err(ChunkingError::InvalidChunkSize);
    }

    let mut chunks = Vec::new();
    let mut start_byte = 0;
    let mut start_char = 0;
    let mut taken = 0;

    for (byte, _) in text.char_indices() {
        if taken == max_len {
            chunks.push(Chunk {
                index: chunks.len(),
                start: start_char,
                text: &text[start_byte..byte],
            });
            start_byte = byte;
            start_char += max_len;
            taken = 0;
        }
        taken += 1;
    }

    if taken > 0 {
        chunks.push(Chunk {
            index: chunks.len(),
            start: start_char,
            text: &text[start_byte..],
        });
    }

    Ok(chunks)
}
