//! Generic delimiter-driven manifest tokenizer.
//!
//! The tokenizer knows nothing about modules. It splits text into blocks,
//! blocks into chunks and chunks into `key`/`values` pairs according to a
//! [`ParseOptions`] value, so every text dialect in the runtime goes through
//! the same code path.

use crate::document::{Chunk, ManifestDocument};
use crate::error::{Error, Result};

/// Delimiter sets controlling how text is tokenized.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseOptions {
    /// Separate independent blocks. Empty means the text is a single block.
    pub block_splitters: Vec<String>,
    /// Separate chunks (entries) inside a block.
    pub chunk_splitters: Vec<String>,
    /// A marker immediately followed by a newline joins the two lines.
    pub escape_newline_markers: Vec<String>,
    /// Split a value into its value list.
    pub inline_splitters: Vec<String>,
}

impl ParseOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn block_splitter(mut self, splitter: impl Into<String>) -> Self {
        self.block_splitters.push(splitter.into());
        self
    }

    pub fn chunk_splitter(mut self, splitter: impl Into<String>) -> Self {
        self.chunk_splitters.push(splitter.into());
        self
    }

    pub fn escape_newline_marker(mut self, marker: impl Into<String>) -> Self {
        self.escape_newline_markers.push(marker.into());
        self
    }

    pub fn inline_splitter(mut self, splitter: impl Into<String>) -> Self {
        self.inline_splitters.push(splitter.into());
        self
    }
}

/// Preset delimiter sets for the text formats used by the runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    /// Module manifests: one entry per line, comma separated value lists,
    /// trailing `\` continues a line.
    Manifest,
    /// Plain property files: one entry per line, values never split.
    Properties,
    /// Extension declarations: blank-line separated blocks, one entry per line.
    Extensions,
}

impl Dialect {
    pub fn options(self) -> ParseOptions {
        match self {
            Self::Manifest => ParseOptions::new()
                .chunk_splitter("\n")
                .escape_newline_marker("\\")
                .inline_splitter(","),
            Self::Properties => ParseOptions::new()
                .chunk_splitter("\n")
                .escape_newline_marker("\\"),
            Self::Extensions => ParseOptions::new()
                .block_splitter("\n\n")
                .chunk_splitter("\n")
                .escape_newline_marker("\\"),
        }
    }
}

/// Parse `text` with one of the preset dialects.
pub fn parse_dialect(text: &str, dialect: Dialect) -> Result<Option<ManifestDocument>> {
    parse(text, &dialect.options())
}

/// Tokenize `text` into a [`ManifestDocument`].
///
/// Returns `Ok(None)` when the text holds nothing to parse. A chunk without
/// an `=` or `:` fails the whole parse.
pub fn parse(text: &str, options: &ParseOptions) -> Result<Option<ManifestDocument>> {
    if text.trim().is_empty() {
        return Ok(None);
    }

    let mut text = text.replace("\r\n", "\n");
    for marker in options.escape_newline_markers.iter().filter(|m| !m.is_empty()) {
        text = text.replace(&format!("{marker}\n"), "");
    }
    // A line of only whitespace is a blank line, so it still separates blocks.
    let text = text
        .split('\n')
        .map(|line| if line.trim().is_empty() { "" } else { line })
        .collect::<Vec<_>>()
        .join("\n");

    let mut document = ManifestDocument::new();
    let mut position = 0;

    for (block_index, block) in split_any(&text, &options.block_splitters)
        .into_iter()
        .enumerate()
    {
        for raw_chunk in split_any(block, &options.chunk_splitters) {
            let chunk_text = raw_chunk.replace(['\n', '\r'], "");
            let chunk_text = chunk_text.trim();
            if chunk_text.is_empty() {
                continue;
            }
            position += 1;
            document.push(parse_chunk(chunk_text, position, block_index, options)?);
        }
    }

    if document.is_empty() {
        return Ok(None);
    }

    tracing::trace!(chunks = document.len(), "parsed manifest text");
    Ok(Some(document))
}

fn parse_chunk(
    chunk_text: &str,
    position: usize,
    block: usize,
    options: &ParseOptions,
) -> Result<Chunk> {
    let Some(split_at) = chunk_text.find(['=', ':']) else {
        return Err(Error::Parse {
            position,
            chunk: chunk_text.to_string(),
            reason: "expected '=' or ':' between key and value".to_string(),
        });
    };

    let key = chunk_text[..split_at].trim();
    if key.is_empty() {
        return Err(Error::Parse {
            position,
            chunk: chunk_text.to_string(),
            reason: "empty key".to_string(),
        });
    }

    let value = chunk_text[split_at + 1..].trim();
    let parts = split_any(value, &options.inline_splitters);
    let values = if parts.len() <= 1 {
        vec![value.to_string()]
    } else {
        parts.into_iter().map(|p| p.trim().to_string()).collect()
    };

    Ok(Chunk::parsed(
        key.to_string(),
        value.to_string(),
        values,
        block,
    ))
}

/// Split `text` at every occurrence of any delimiter.
///
/// At a given offset the longest matching delimiter wins. Without delimiters
/// the text comes back as a single piece.
fn split_any<'a>(text: &'a str, delimiters: &[String]) -> Vec<&'a str> {
    let delimiters: Vec<&str> = delimiters
        .iter()
        .map(String::as_str)
        .filter(|d| !d.is_empty())
        .collect();
    if delimiters.is_empty() {
        return vec![text];
    }

    let mut pieces = Vec::new();
    let mut start = 0;
    let mut cursor = 0;
    while cursor < text.len() {
        let rest = &text[cursor..];
        let matched = delimiters
            .iter()
            .filter(|d| rest.starts_with(**d))
            .map(|d| d.len())
            .max();
        match matched {
            Some(len) => {
                pieces.push(&text[start..cursor]);
                cursor += len;
                start = cursor;
            }
            None => {
                cursor += rest.chars().next().map_or(1, char::len_utf8);
            }
        }
    }
    pieces.push(&text[start..]);
    pieces
}
