//! Allele merge engine.
//!
//! Merging is split into two stages that are deliberately kept apart:
//!
//! 1. [`DiscoveredAlleles::merge`] is a pure pairwise combine. It never fails, and it
//!    is commutative and associative, so partial results can be combined in any
//!    order (or in parallel) without changing the outcome.
//! 2. [`DiscoveredAlleles::check_references`] is the global consistency gate, run once
//!    on the fully merged set: every range must carry exactly one reference allele.

use std::collections::btree_map::{self, Entry};
use std::collections::BTreeMap;

use serde::ser::{Serialize, SerializeSeq, Serializer};
use thiserror::Error;
use tracing::debug;

use crate::core::allele::{Allele, DiscoveredAlleleInfo};
use crate::core::range::Range;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReferenceCheckError {
    #[error("inconsistent reference alleles at {range}: {}", sequences.join(" "))]
    Inconsistent { range: Range, sequences: Vec<String> },

    #[error("no reference allele at {range}")]
    Missing { range: Range },
}

/// A set of discovered alleles, keyed and iterated in [`Allele`] order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DiscoveredAlleles {
    alleles: BTreeMap<Allele, DiscoveredAlleleInfo>,
}

impl DiscoveredAlleles {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.alleles.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.alleles.is_empty()
    }

    #[must_use]
    pub fn get(&self, allele: &Allele) -> Option<&DiscoveredAlleleInfo> {
        self.alleles.get(allele)
    }

    pub fn iter(&self) -> btree_map::Iter<'_, Allele, DiscoveredAlleleInfo> {
        self.alleles.iter()
    }

    /// Merge a single observation into the set.
    ///
    /// Observation counts are summed. Reference flags are OR-ed: an allele seen as the
    /// reference by any contributor stays flagged as reference.
    pub fn add(&mut self, allele: Allele, info: DiscoveredAlleleInfo) {
        match self.alleles.entry(allele) {
            Entry::Vacant(entry) => {
                entry.insert(info);
            }
            Entry::Occupied(mut entry) => {
                if entry.get().is_ref != info.is_ref {
                    debug!(allele = %entry.key(), "allele reported as both REF and ALT");
                }
                let existing = entry.get_mut();
                existing.is_ref |= info.is_ref;
                existing.observation_count += info.observation_count;
            }
        }
    }

    /// Merge every entry of `other` into this set.
    pub fn merge(&mut self, other: DiscoveredAlleles) {
        for (allele, info) in other.alleles {
            self.add(allele, info);
        }
    }

    /// Verify that every range has exactly one reference allele.
    ///
    /// Ranges are checked in ascending order and the first offending range is reported.
    ///
    /// # Errors
    ///
    /// Returns `ReferenceCheckError::Inconsistent` if more than one sequence is flagged
    /// as reference at a range, or `ReferenceCheckError::Missing` if none is.
    pub fn check_references(&self) -> Result<(), ReferenceCheckError> {
        let mut iter = self.alleles.iter().peekable();

        while let Some((first, _)) = iter.peek() {
            let range = first.range;
            let mut refs = Vec::new();

            // Keys are unique per (range, dna), so sequences collected here are distinct
            while let Some((allele, info)) = iter.next_if(|(a, _)| a.range == range) {
                if info.is_ref {
                    refs.push(allele.dna.clone());
                }
            }

            match refs.len() {
                1 => {}
                0 => return Err(ReferenceCheckError::Missing { range }),
                _ => {
                    return Err(ReferenceCheckError::Inconsistent {
                        range,
                        sequences: refs,
                    })
                }
            }
        }

        Ok(())
    }
}

/// Merge `from` into `into` and return the combined set.
#[must_use]
pub fn merge(mut into: DiscoveredAlleles, from: DiscoveredAlleles) -> DiscoveredAlleles {
    into.merge(from);
    into
}

impl FromIterator<(Allele, DiscoveredAlleleInfo)> for DiscoveredAlleles {
    fn from_iter<I: IntoIterator<Item = (Allele, DiscoveredAlleleInfo)>>(iter: I) -> Self {
        let mut set = Self::new();
        for (allele, info) in iter {
            set.add(allele, info);
        }
        set
    }
}

impl IntoIterator for DiscoveredAlleles {
    type Item = (Allele, DiscoveredAlleleInfo);
    type IntoIter = btree_map::IntoIter<Allele, DiscoveredAlleleInfo>;

    fn into_iter(self) -> Self::IntoIter {
        self.alleles.into_iter()
    }
}

impl<'a> IntoIterator for &'a DiscoveredAlleles {
    type Item = (&'a Allele, &'a DiscoveredAlleleInfo);
    type IntoIter = btree_map::Iter<'a, Allele, DiscoveredAlleleInfo>;

    fn into_iter(self) -> Self::IntoIter {
        self.alleles.iter()
    }
}

/// Flat JSON entry; struct keys cannot be JSON object keys
#[derive(serde::Serialize)]
struct JsonEntry<'a> {
    range: &'a Range,
    dna: &'a str,
    is_ref: bool,
    observation_count: f64,
}

impl Serialize for DiscoveredAlleles {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.alleles.len()))?;
        for (allele, info) in &self.alleles {
            seq.serialize_element(&JsonEntry {
                range: &allele.range,
                dna: &allele.dna,
                is_ref: info.is_ref,
                observation_count: info.observation_count,
            })?;
        }
        seq.end()
    }
}
