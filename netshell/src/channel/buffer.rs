//! Output buffer with tail-only prompt search.
//!
//! Prompt detection only needs to look at the end of the output, so only the
//! last `search_depth` bytes are examined. For large outputs (full routing
//! tables, running configs) this keeps each poll tick cheap.

use super::patterns::{PromptMatcher, strip_ansi};

/// Buffer accumulating the raw output of one command.
///
/// Data is stored exactly as received; escape sequences are only removed
/// from the search window and later by the output cleaner.
#[derive(Debug)]
pub struct PatternBuffer {
    /// The accumulated output buffer.
    buffer: Vec<u8>,

    /// How many bytes from the end to search for patterns.
    search_depth: usize,
}

impl PatternBuffer {
    /// Create a new pattern buffer with the specified search depth.
    pub fn new(search_depth: usize) -> Self {
        Self {
            buffer: Vec::with_capacity(4096),
            search_depth,
        }
    }

    /// Append received data.
    pub fn extend(&mut self, data: &[u8]) {
        self.buffer.extend_from_slice(data);
    }

    /// The last `search_depth` bytes of the buffer.
    pub fn tail(&self) -> &[u8] {
        let start = self.buffer.len().saturating_sub(self.search_depth);
        &self.buffer[start..]
    }

    /// Check whether the tail, with escape sequences removed, matches.
    pub fn tail_matches<M: PromptMatcher + ?Sized>(&self, matcher: &M) -> bool {
        matcher.is_match(&strip_ansi(self.tail()))
    }

    /// The text after the last line break, i.e. the prompt once one matched.
    pub fn last_line(&self) -> String {
        let start = memchr::memrchr(b'\n', &self.buffer).map_or(0, |pos| pos + 1);
        let line = strip_ansi(&self.buffer[start..]);
        String::from_utf8_lossy(&line).trim().to_string()
    }

    /// Take ownership of the buffer contents and reset.
    pub fn take(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.buffer)
    }

    /// Clear the buffer.
    pub fn clear(&mut self) {
        self.buffer.clear();
    }
}

impl Default for PatternBuffer {
    fn default() -> Self {
        Self::new(1000)
    }
}
