//! Parsed association paths.

use std::fmt;

use smallvec::SmallVec;
use smol_str::SmolStr;

use crate::error::{HydrateError, HydrateResult};

/// Separator between path segments unless configured otherwise.
pub const DEFAULT_DELIMITER: char = '.';

/// A chain of association names, e.g. `customer.address`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssociationPath {
    raw: String,
    segments: SmallVec<[SmolStr; 4]>,
}

impl AssociationPath {
    /// Parse a path delimited by [`DEFAULT_DELIMITER`].
    pub fn parse(path: &str) -> HydrateResult<Self> {
        Self::parse_with(path, DEFAULT_DELIMITER)
    }

    /// Parse a path with a custom delimiter.
    ///
    /// Fails if any segment is empty (`""`, `"a..b"`, `"a."`).
    pub fn parse_with(path: &str, delimiter: char) -> HydrateResult<Self> {
        let segments: SmallVec<[SmolStr; 4]> = path.split(delimiter).map(SmolStr::new).collect();

        if segments.iter().any(|s| s.trim().is_empty()) {
            return Err(HydrateError::invalid_path(path, "empty association name"));
        }

        Ok(Self {
            raw: path.to_string(),
            segments,
        })
    }

    /// Segments traversed in memory before the final association.
    pub fn traversal(&self) -> &[SmolStr] {
        &self.segments[..self.segments.len() - 1]
    }

    /// The association loaded by the batched fetch.
    pub fn final_association(&self) -> &str {
        // parse_with never produces an empty segment list
        self.segments.last().map(SmolStr::as_str).unwrap_or_default()
    }

    /// Check if the path names a single association (no traversal).
    pub fn is_direct(&self) -> bool {
        self.segments.len() == 1
    }

    /// All segments, final association included.
    pub fn segments(&self) -> &[SmolStr] {
        &self.segments
    }

    /// The path as given.
    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

impl fmt::Display for AssociationPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}
