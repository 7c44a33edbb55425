//! Fixed-size chunking of response bodies.
//!
//! Bodies are delivered to the client as a sequence of small writes rather
//! than one buffer. [`ChunkStream`] is the source of those writes: a finite
//! iterator over substrings of a fixed character count, in order, with no
//! overlap and no gaps. Concatenating every chunk reproduces the source
//! exactly.
//!
//! A stream is not restartable; once consumed, build a new one to stream the
//! same body again.

/// Default number of characters per chunk.
pub const DEFAULT_CHUNK_SIZE: usize = 50;

/// Lazy iterator over fixed-size character chunks of a source string.
///
/// Every chunk holds exactly `chunk_size` characters except possibly the
/// last, which may be shorter. An empty source yields no chunks. Chunk
/// boundaries respect UTF-8 character boundaries, so each item is always a
/// valid `&str` slice of the source.
pub struct ChunkStream<'a> {
    source: &'a str,
    chunk_size: usize,
    pos: usize,
}

impl<'a> ChunkStream<'a> {
    /// Create a stream over `source` with the given chunk size.
    ///
    /// # Panics
    ///
    /// Panics if `chunk_size` is zero.
    #[must_use]
    pub fn new(source: &'a str, chunk_size: usize) -> Self {
        assert!(chunk_size > 0, "chunk size must be non-zero");
        Self {
            source,
            chunk_size,
            pos: 0,
        }
    }

    /// Create a stream with the default chunk size of 50 characters.
    #[must_use]
    pub fn with_default_size(source: &'a str) -> Self {
        Self::new(source, DEFAULT_CHUNK_SIZE)
    }

    /// Number of chunks this stream will yield in total, regardless of how
    /// many have already been consumed.
    #[must_use]
    pub fn total_chunks(&self) -> usize {
        let chars = self.source.chars().count();
        chars.div_ceil(self.chunk_size)
    }
}

impl<'a> Iterator for ChunkStream<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        let rest = &self.source[self.pos..];
        if rest.is_empty() {
            return None;
        }
        // Byte offset of the chunk_size-th character, or the end of the
        // source for the final short chunk.
        let end = rest
            .char_indices()
            .nth(self.chunk_size)
            .map_or(rest.len(), |(i, _)| i);
        self.pos += end;
        Some(&rest[..end])
    }
}
