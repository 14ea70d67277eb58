//! Output sinks for genotyped records.
//!
//! A sink receives records strictly in site order and is finalized only when every
//! site succeeded. What happens to a sink that is never finalized is up to the
//! implementation:
//!
//! - [`VcfFileSink`](writer::VcfFileSink) deletes its partially written file
//! - [`MemorySink`](memory::MemorySink) keeps the records it received and reports
//!   [`finalized`](memory::MemorySink::finalized) as `false`

use std::collections::BTreeSet;

use noodles::vcf::{
    self as vcf,
    header::{
        record::value::{
            map::{Contig as ContigMap, Format},
            Map,
        },
        FileFormat,
    },
    variant::record::samples::keys::key,
};
use thiserror::Error;

use crate::core::contig::Contig;

pub mod memory;
pub mod writer;

#[derive(Error, Debug)]
pub enum SinkError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Sink is already finalized")]
    Closed,
}

/// A destination for output records, written in increasing site order
pub trait OutputSink<R> {
    /// Append one record after the previously written one
    ///
    /// # Errors
    ///
    /// Returns `SinkError` if the record cannot be written.
    fn write(&mut self, record: R) -> Result<(), SinkError>;

    /// Mark the output complete and flush it
    ///
    /// # Errors
    ///
    /// Returns `SinkError` if flushing or closing fails.
    fn finalize(&mut self) -> Result<(), SinkError>;
}

/// Build the output VCF header for a sampleset.
///
/// The header declares `FORMAT=GT`, one `##contig` line per catalogue entry (in
/// catalogue order, so contig index equals `rid`), and one column per sample.
///
/// The file format is pinned to VCFv4.3; under 4.4 noodles writes a leading phasing
/// character on every genotype (`/0/1`).
#[must_use]
pub fn build_header(samples: &BTreeSet<String>, contigs: &[Contig]) -> vcf::Header {
    let mut builder = vcf::Header::builder()
        .set_file_format(FileFormat::new(4, 3))
        .add_format(key::GENOTYPE, Map::<Format>::from(key::GENOTYPE));

    for contig in contigs {
        let mut map = Map::<ContigMap>::new();
        if let Ok(length) = usize::try_from(contig.length) {
            *map.length_mut() = Some(length);
        }
        builder = builder.add_contig(contig.name.clone(), map);
    }

    for sample in samples {
        builder = builder.add_sample_name(sample.clone());
    }

    builder.build()
}
