use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;

use locusnet_core::models::LocusSet;

use crate::errors::DensityError;
use crate::provider::DensityProvider;
use crate::sample::{DensitySample, GeneScores, SampleMode};

/// Real aggregate density and its bootstrap population.
#[derive(Debug, Clone, PartialEq)]
pub struct ScalarBootstrap {
    pub real: f64,
    pub nulls: Vec<f64>,
}

/// Real per-gene densities and the per-gene densities of every trial.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneBootstrap {
    pub real: GeneScores,
    pub nulls: Vec<GeneScores>,
}

///
/// Draws one real and `num_bootstraps` randomized density samples for a
/// locus set from a [`DensityProvider`].
///
/// Trials run on the current rayon pool and are returned in trial order.
///
pub struct BootstrapSampler<'a, P: DensityProvider> {
    provider: &'a P,
    flank_limit: u32,
    num_bootstraps: usize,
    progress: bool,
}

impl<'a, P: DensityProvider> BootstrapSampler<'a, P> {
    pub fn new(provider: &'a P, flank_limit: u32, num_bootstraps: usize) -> Self {
        BootstrapSampler {
            provider,
            flank_limit,
            num_bootstraps,
            progress: false,
        }
    }

    pub fn with_progress(mut self, progress: bool) -> Self {
        self.progress = progress;
        self
    }

    pub fn sample_scalar(&self, loci: &LocusSet) -> Result<ScalarBootstrap, DensityError> {
        let real = self
            .provider
            .real_density(loci, self.flank_limit, SampleMode::Aggregate)?
            .into_scalar()?;

        let nulls = self
            .null_population(loci, SampleMode::Aggregate)?
            .into_iter()
            .map(DensitySample::into_scalar)
            .collect::<Result<Vec<f64>, DensityError>>()?;

        Ok(ScalarBootstrap { real, nulls })
    }

    pub fn sample_genes(&self, loci: &LocusSet) -> Result<GeneBootstrap, DensityError> {
        let mut real = self
            .provider
            .real_density(loci, self.flank_limit, SampleMode::GeneSpecific)?
            .into_gene_scores()?;
        real.iter = None;

        let nulls = self
            .null_population(loci, SampleMode::GeneSpecific)?
            .into_iter()
            .enumerate()
            .map(|(i, sample)| sample.into_gene_scores().map(|scores| scores.with_iter(i)))
            .collect::<Result<Vec<GeneScores>, DensityError>>()?;

        Ok(GeneBootstrap { real, nulls })
    }

    fn null_population(&self, loci: &LocusSet, mode: SampleMode) -> Result<Vec<DensitySample>, DensityError> {
        let pb = match self.progress {
            true => ProgressBar::new(self.num_bootstraps as u64),
            false => ProgressBar::hidden(),
        };
        if let Ok(style) =
            ProgressStyle::with_template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} bootstraps")
        {
            pb.set_style(style);
        }

        let population = (0..self.num_bootstraps)
            .into_par_iter()
            .map(|iter| {
                let sample = self.provider.null_density(loci, self.flank_limit, mode, iter);
                pb.inc(1);
                sample.map_err(DensityError::from)
            })
            .collect::<Result<Vec<DensitySample>, DensityError>>();

        pb.finish_and_clear();

        population
    }
}
