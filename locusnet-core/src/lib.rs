//! Core models for locusnet.
//!
//! This crate holds everything needed to turn a GWAS ontology into sets of
//! candidate genes:
//!
//! - [`models::Locus`] and [`models::LocusSet`], the trait-associated signals
//! - [`ontology::Ontology`] and [`ontology::Term`], including effective and
//!   strongest-signal locus collapsing
//! - [`refgen::RefGen`], a gene annotation with flank-limited candidate lookup
//!
//! # Example
//!
//! ```no_run
//! use locusnet_core::ontology::Ontology;
//! use locusnet_core::refgen::RefGen;
//!
//! let gwas = Ontology::try_from("traits.gwas.tsv").unwrap();
//! let refgen = RefGen::try_from("genes.bed").unwrap();
//!
//! let term = gwas.term("height").unwrap();
//! let loci = term.effective_loci(50_000);
//! let candidates = refgen.candidate_genes_flat(&loci, 2).unwrap();
//! ```

pub mod errors;
pub mod models;
pub mod ontology;
pub mod refgen;
pub mod utils;

// re-exports
pub use models::{Gene, Locus, LocusSet};
pub use ontology::{Ontology, Term};
pub use refgen::RefGen;
