//! Parsed manifest representation.

use std::fmt;

/// One `key: values` entry of a manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    key: String,
    raw: String,
    values: Vec<String>,
    block: usize,
}

impl Chunk {
    /// Create a chunk whose raw value is its values joined with `", "`.
    pub fn new(key: impl Into<String>, values: Vec<String>) -> Self {
        let raw = values.join(", ");
        Self {
            key: key.into(),
            raw,
            values,
            block: 0,
        }
    }

    pub(crate) fn parsed(key: String, raw: String, values: Vec<String>, block: usize) -> Self {
        Self {
            key,
            raw,
            values,
            block,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// The trimmed value text before inline splitting.
    pub fn value(&self) -> &str {
        &self.raw
    }

    /// The value split by the inline splitters, in original order.
    pub fn values(&self) -> &[String] {
        &self.values
    }

    /// Index of the block this chunk was read from.
    pub fn block(&self) -> usize {
        self.block
    }

    fn matches(&self, key: &str) -> bool {
        self.key.eq_ignore_ascii_case(key)
    }
}

/// An ordered sequence of [`Chunk`]s.
///
/// Lookups are case-insensitive and the first matching chunk wins: a key that
/// appears twice is shadowed by its first occurrence, never merged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ManifestDocument {
    chunks: Vec<Chunk>,
}

impl ManifestDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, chunk: Chunk) {
        self.chunks.push(chunk);
    }

    /// First chunk whose key matches `key` case-insensitively.
    pub fn chunk(&self, key: &str) -> Option<&Chunk> {
        self.chunks.iter().find(|c| c.matches(key))
    }

    /// Single-value query: the unsplit value of the first matching chunk.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.chunk(key).map(Chunk::value)
    }

    /// Multi-value query: the split values of the first matching chunk.
    pub fn get_all(&self, key: &str) -> Option<&[String]> {
        self.chunk(key).map(Chunk::values)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.chunk(key).is_some()
    }

    /// Keys in document order, duplicates included.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.chunks.iter().map(Chunk::key)
    }

    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Regroup the chunks by the block they were parsed from.
    ///
    /// Blocks that produced no chunks (blank ones) do not appear.
    pub fn blocks(&self) -> Vec<ManifestDocument> {
        let mut blocks: Vec<ManifestDocument> = Vec::new();
        let mut current: Option<usize> = None;
        for chunk in &self.chunks {
            if current != Some(chunk.block) {
                blocks.push(ManifestDocument::new());
                current = Some(chunk.block);
            }
            if let Some(block) = blocks.last_mut() {
                block.push(chunk.clone());
            }
        }
        blocks
    }
}

impl fmt::Display for ManifestDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for chunk in &self.chunks {
            writeln!(f, "{}: {}", chunk.key, chunk.raw)?;
        }
        Ok(())
    }
}
