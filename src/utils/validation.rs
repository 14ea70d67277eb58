//! Centralized validation and helper functions.

/// Maximum number of contigs allowed in a catalogue or VCF header (DOS protection)
pub const MAX_CONTIGS: usize = 100_000;

/// Is `s` a literal nucleotide sequence over `A`, `C`, `G`, `T`?
///
/// The check is case-sensitive; callers uppercase first. The empty string passes,
/// so callers that need a non-empty sequence must check that separately.
///
/// # Examples
///
/// ```
/// use jointcall::utils::validation::is_dna;
///
/// assert!(is_dna("ACGT"));
/// assert!(!is_dna("<NON_REF>"));
/// assert!(!is_dna("ACGN"));
/// assert!(!is_dna("acgt"));
/// ```
#[must_use]
pub fn is_dna(s: &str) -> bool {
    s.bytes().all(|b| matches!(b, b'A' | b'C' | b'G' | b'T'))
}

/// Uppercase `s` and return it if it is a non-empty nucleotide sequence.
#[must_use]
pub fn normalize_dna(s: &str) -> Option<String> {
    let upper = s.to_ascii_uppercase();
    if !upper.is_empty() && is_dna(&upper) {
        Some(upper)
    } else {
        None
    }
}
