//! Parsers for loading dataset records from text formats.
//!
//! - **VCF**: plain or gzip-compressed, read with noodles; `##contig` header lines,
//!   sample names from the `#CHROM` line, and hard genotype calls from the `GT` field
//!
//! ## Example
//!
//! ```rust
//! use jointcall::core::contig::Contig;
//! use jointcall::parsing::vcf::parse_vcf_text;
//!
//! let catalogue = vec![Contig::new("chr1", 1_000)];
//! let vcf = "##fileformat=VCFv4.3\n\
//!            #CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO\tFORMAT\tS1\n\
//!            chr1\t10\t.\tA\tG\t.\t.\t.\tGT\t0/1\n";
//! let parsed = parse_vcf_text(vcf, &catalogue).unwrap();
//! assert_eq!(parsed.records.len(), 1);
//! ```

pub mod vcf;
