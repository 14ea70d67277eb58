use serde::{Deserialize, Serialize};

use crate::core::range::Range;

/// A sequence variant at a genomic range.
///
/// Ordered by `(range, dna)`; two alleles are the same entity iff both match exactly.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Allele {
    pub range: Range,
    /// Uppercase sequence
    pub dna: String,
}

impl Allele {
    pub fn new(range: Range, dna: impl Into<String>) -> Self {
        Self {
            range,
            dna: dna.into(),
        }
    }
}

impl std::fmt::Display for Allele {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}@{}", self.dna, self.range)
    }
}

/// What discovery learned about one allele
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DiscoveredAlleleInfo {
    /// Whether the allele was seen as the reference allele
    pub is_ref: bool,

    /// Number of hard-called copies observed across all samples
    pub observation_count: f64,
}

impl DiscoveredAlleleInfo {
    #[must_use]
    pub fn reference(observation_count: f64) -> Self {
        Self {
            is_ref: true,
            observation_count,
        }
    }

    #[must_use]
    pub fn alternate(observation_count: f64) -> Self {
        Self {
            is_ref: false,
            observation_count,
        }
    }
}
