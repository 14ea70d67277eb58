use serde::{Deserialize, Serialize};

use crate::core::contig::Contig;

/// A genomic interval on one contig.
///
/// Coordinates are zero-based and half-open. The derived ordering compares
/// `(rid, beg, end)` in that order, which is the order the rest of the crate
/// relies on for deterministic output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Range {
    /// Index of the contig in the contig catalogue
    pub rid: usize,
    pub beg: u64,
    pub end: u64,
}

impl Range {
    #[must_use]
    pub fn new(rid: usize, beg: u64, end: u64) -> Self {
        Self { rid, beg, end }
    }

    /// Does this range share at least one position with `other`?
    #[must_use]
    pub fn overlaps(&self, other: &Range) -> bool {
        self.rid == other.rid && self.beg < other.end && other.beg < self.end
    }

    /// Render as `name:start-end` (one-based, inclusive) using the contig catalogue.
    ///
    /// Falls back to the numeric contig index if `rid` is outside the catalogue.
    #[must_use]
    pub fn display_with(&self, contigs: &[Contig]) -> String {
        match contigs.get(self.rid) {
            Some(contig) => format!("{}:{}-{}", contig.name, self.beg + 1, self.end),
            None => self.to_string(),
        }
    }
}

impl std::fmt::Display for Range {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "<{}>:{}-{}", self.rid, self.beg + 1, self.end)
    }
}
