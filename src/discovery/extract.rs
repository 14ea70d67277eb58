//! Per-record allele extraction.

use crate::core::allele::{Allele, DiscoveredAlleleInfo};
use crate::discovery::merge::DiscoveredAlleles;
use crate::storage::{GenotypeCall, VariantRecord};
use crate::utils::validation::normalize_dna;

/// The reference allele of a record is not a literal nucleotide sequence
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidReference {
    /// The offending sequence, uppercased
    pub sequence: String,
}

/// Count hard-called copies of each allele in `record`.
///
/// Each sample's calls are scanned up to its first [`GenotypeCall::VectorEnd`].
/// Missing calls and indices outside the record's allele list count for nothing.
#[must_use]
pub fn observation_counts(record: &VariantRecord) -> Vec<f64> {
    let mut counts = vec![0.0; record.n_alleles()];
    if record.ploidy == 0 {
        return counts;
    }

    for sample_calls in record.calls.chunks(record.ploidy) {
        for call in sample_calls {
            match *call {
                GenotypeCall::VectorEnd => break,
                GenotypeCall::Missing => {}
                GenotypeCall::Allele(i) => {
                    if let Some(count) = counts.get_mut(i) {
                        *count += 1.0;
                    }
                }
            }
        }
    }

    counts
}

/// Extract the alleles one record contributes to discovery.
///
/// Alt alleles qualify when they are non-empty `[ACGT]+` after uppercasing, which
/// excludes symbolic alleles such as gVCF `<NON_REF>`. The reference allele is
/// included only when at least one alt qualified.
///
/// # Errors
///
/// Returns `InvalidReference` if the reference allele is not `[ACGT]+`, whether or
/// not any alt qualified.
pub fn record_alleles(record: &VariantRecord) -> Result<DiscoveredAlleles, InvalidReference> {
    let reference = record.alleles.first().map(String::as_str).unwrap_or_default();
    let Some(ref_dna) = normalize_dna(reference) else {
        return Err(InvalidReference {
            sequence: reference.to_ascii_uppercase(),
        });
    };

    let counts = observation_counts(record);
    let mut alleles = DiscoveredAlleles::new();

    for (i, alt) in record.alleles.iter().enumerate().skip(1) {
        if let Some(dna) = normalize_dna(alt) {
            alleles.add(
                Allele::new(record.range, dna),
                DiscoveredAlleleInfo::alternate(counts[i]),
            );
        }
    }

    if !alleles.is_empty() {
        alleles.add(
            Allele::new(record.range, ref_dna),
            DiscoveredAlleleInfo::reference(counts[0]),
        );
    }

    Ok(alleles)
}
