use std::path::{Path, PathBuf};

use anyhow::Result;
use log::{info, warn};

use locusnet_core::ontology::Term;

use crate::config::DensityConfig;
use crate::errors::DensityError;
use crate::output::{derive_output_path, write_results_to_file};
use crate::provider::{DensityProvider, LocusResolver};
use crate::sample::SampleMode;
use crate::sampler::BootstrapSampler;
use crate::significance::{
    GeneSignificanceTable, ScalarSignificance, empirical_pvalue, gene_significance,
};

/// Run parameters stamped on every term result.
#[derive(Debug, Clone, PartialEq)]
pub struct RunMetadata {
    pub ontology: String,
    pub network: String,
    pub snp2gene: String,
    pub window_size: u32,
    pub flank_limit: u32,
    pub num_bootstraps: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SignificanceResult {
    Aggregate {
        num_candidates: usize,
        result: ScalarSignificance,
    },
    GeneSpecific(GeneSignificanceTable),
}

///
/// The significance result of one term together with the run metadata.
///
#[derive(Debug, Clone, PartialEq)]
pub struct TermResult {
    pub term: String,
    /// SNPs of the term before collapsing.
    pub num_snps: usize,
    /// Loci after collapsing.
    pub num_collapsed_snps: usize,
    pub metadata: RunMetadata,
    pub significance: SignificanceResult,
}

impl TermResult {
    pub fn num_rows(&self) -> usize {
        match &self.significance {
            SignificanceResult::Aggregate { .. } => 1,
            SignificanceResult::GeneSpecific(table) => table.genes.len(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    Written {
        path: PathBuf,
        terms: usize,
        rows: usize,
    },
    /// The output existed and overwriting was not forced.
    Skipped(PathBuf),
}

///
/// Evaluates the selected terms of a resolver against a density provider.
///
pub struct DensityRun<'a, R: LocusResolver, P: DensityProvider> {
    config: &'a DensityConfig,
    resolver: &'a R,
    provider: &'a P,
}

impl<'a, R: LocusResolver, P: DensityProvider> DensityRun<'a, R, P> {
    pub fn new(config: &'a DensityConfig, resolver: &'a R, provider: &'a P) -> Result<Self, DensityError> {
        config.validate()?;

        Ok(DensityRun {
            config,
            resolver,
            provider,
        })
    }

    pub fn metadata(&self) -> RunMetadata {
        RunMetadata {
            ontology: self.config.ontology_name.clone(),
            network: self.config.network_name.clone(),
            snp2gene: self.config.snp2gene.to_string(),
            window_size: self.config.snp2gene.window_size(),
            flank_limit: self.config.flank_limit,
            num_bootstraps: self.config.num_bootstraps,
        }
    }

    ///
    /// Evaluate every selected term in order.
    ///
    /// All selected terms are looked up before any sampling. A failing term
    /// fails the run unless `keep_going` is set, in which case it is logged
    /// and left out.
    ///
    pub fn run(&self) -> Result<Vec<TermResult>, DensityError> {
        let terms = self.resolver.select_terms(&self.config.terms)?;

        match self.config.threads {
            Some(num_threads) => {
                let pool = rayon::ThreadPoolBuilder::new()
                    .num_threads(num_threads)
                    .build()
                    .map_err(|e| DensityError::Config(format!("Failed to build thread pool: {}", e)))?;
                pool.install(|| self.run_terms(&terms))
            }
            None => self.run_terms(&terms),
        }
    }

    fn run_terms(&self, terms: &[&Term]) -> Result<Vec<TermResult>, DensityError> {
        let mut results: Vec<TermResult> = Vec::with_capacity(terms.len());

        for term in terms {
            info!(
                "Bootstrapping density for {} of {} in {}",
                term.id,
                self.resolver.name(),
                self.provider.name()
            );

            match self.evaluate_term(term) {
                Ok(result) => results.push(result),
                Err(err) if self.config.keep_going => {
                    warn!("Skipping term {}: {}", term.id, err);
                }
                Err(err) => return Err(err),
            }
        }

        Ok(results)
    }

    pub fn evaluate_term(&self, term: &Term) -> Result<TermResult, DensityError> {
        let loci = self.resolver.resolve_loci(term, &self.config.snp2gene)?;
        let flank_limit = self.config.flank_limit;
        let sampler = BootstrapSampler::new(self.provider, flank_limit, self.config.num_bootstraps)
            .with_progress(self.config.progress);

        let significance = match self.config.mode() {
            SampleMode::Aggregate => {
                let candidates = self.provider.candidate_genes(&loci, flank_limit)?;
                let bootstrap = sampler.sample_scalar(&loci)?;
                SignificanceResult::Aggregate {
                    num_candidates: candidates.len(),
                    result: empirical_pvalue(bootstrap.real, &bootstrap.nulls)?,
                }
            }
            SampleMode::GeneSpecific => {
                let bootstrap = sampler.sample_genes(&loci)?;
                SignificanceResult::GeneSpecific(gene_significance(
                    &bootstrap.real,
                    &bootstrap.nulls,
                    self.config.fdr_step,
                )?)
            }
        };

        Ok(TermResult {
            term: term.id.clone(),
            num_snps: term.num_snps(),
            num_collapsed_snps: loci.len(),
            metadata: self.metadata(),
            significance,
        })
    }
}

///
/// Run a full density analysis and write the result table.
///
/// The output path is resolved first; if it exists and `force` is not set
/// the run is skipped before `load` is called, so no data is read and
/// nothing is computed.
///
/// # Arguments
/// - config: the run configuration
/// - out: explicit output path, derived from the config when `None`
/// - force: overwrite an existing output
/// - load: builds the locus resolver and density provider
pub fn run_density<R, P, F>(
    config: &DensityConfig,
    out: Option<&Path>,
    force: bool,
    load: F,
) -> Result<RunOutcome>
where
    R: LocusResolver,
    P: DensityProvider,
    F: FnOnce() -> Result<(R, P)>,
{
    config.validate()?;

    let path = derive_output_path(config, out);
    if path.exists() && !force {
        warn!("Output for {} exists! Skipping!", path.display());
        return Ok(RunOutcome::Skipped(path));
    }

    let (resolver, provider) = load()?;
    let results = DensityRun::new(config, &resolver, &provider)?.run()?;
    let rows = write_results_to_file(&path, config.mode(), &results)?;

    info!(
        "Wrote {} rows for {} terms to {}",
        rows,
        results.len(),
        path.display()
    );

    Ok(RunOutcome::Written {
        path,
        terms: results.len(),
        rows,
    })
}
