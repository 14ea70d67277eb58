use serde::{Deserialize, Serialize};

/// A single contig/sequence in the service's coordinate space
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contig {
    /// Sequence name (CHROM in VCF)
    pub name: String,

    /// Sequence length
    pub length: u64,
}

impl Contig {
    pub fn new(name: impl Into<String>, length: u64) -> Self {
        Self {
            name: name.into(),
            length,
        }
    }
}

/// Find the index of a contig by exact name.
///
/// The index is the contig identifier used by [`Range`](crate::core::range::Range).
#[must_use]
pub fn contig_index(contigs: &[Contig], name: &str) -> Option<usize> {
    contigs.iter().position(|c| c.name == name)
}
