//! Bootstrap significance of co-expression network density for GWAS terms.
//!
//! For every selected term the loci are resolved, one real and `N`
//! randomized density statistics are drawn from a [`DensityProvider`], and
//! the real statistic is calibrated against the randomized population:
//!
//! - aggregate mode reports an empirical p-value per term
//!   ([`significance::empirical_pvalue`])
//! - gene-specific mode reports a z-score and FDR for every candidate gene
//!   ([`significance::gene_significance`])
//!
//! The results of all terms are concatenated into a single tab separated
//! table by [`output::write_results_to_file`].

pub mod config;
pub mod errors;
pub mod orchestrator;
pub mod output;
pub mod provider;
pub mod sample;
pub mod sampler;
pub mod significance;

// re-exports
pub use config::{DensityConfig, Snp2GeneMethod, TermSelection};
pub use errors::{DensityError, UpstreamError};
pub use orchestrator::{DensityRun, RunMetadata, RunOutcome, SignificanceResult, TermResult, run_density};
pub use provider::{DensityProvider, LocusResolver};
pub use sample::{DensitySample, GeneScore, GeneScores, SampleMode};
