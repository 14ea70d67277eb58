use serde::{Deserialize, Serialize};

use crate::core::range::Range;

/// A genomic site with an already-reconciled allele list.
///
/// `alleles[0]` is the reference allele. Sites are the unit of genotyping work.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UnifiedSite {
    pub range: Range,
    pub alleles: Vec<String>,
}

impl UnifiedSite {
    pub fn new(range: Range, alleles: Vec<String>) -> Self {
        Self { range, alleles }
    }

    /// Index of `dna` in this site's allele list, compared case-insensitively
    #[must_use]
    pub fn allele_index(&self, dna: &str) -> Option<usize> {
        self.alleles
            .iter()
            .position(|allele| allele.eq_ignore_ascii_case(dna))
    }
}
