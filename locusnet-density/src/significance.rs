//! Calibration of real density statistics against their bootstrap null.
//!
//! Aggregate mode compares one real density with `N` bootstrap densities and
//! reports the fraction of bootstraps at least as dense.
//!
//! Gene-specific mode works on whole per-gene score tables:
//!
//! 1. every bootstrap trial contributes its own mean and standard deviation;
//!    the null moments are the averages of those per-trial moments
//! 2. real and bootstrap scores are turned into z-scores with the null moments
//! 3. z-score thresholds `0, step, 2 * step, ..` up to `floor(max z) + 1` are
//!    swept; at each threshold the FDR is the mean number of bootstrap genes
//!    at or above it over the number of real genes at or above it, capped at 1
//! 4. every gene keeps the statistics of the highest threshold it reaches
//!
//! Only thresholds that some gene keeps are evaluated, so the work grows
//! with the number of genes and not with the largest z-score.
//!
use std::collections::BTreeSet;

use log::{debug, warn};

use crate::errors::DensityError;
use crate::sample::GeneScores;

/// A null standard deviation at or below this fraction of `|bs_mean|` is
/// rounding noise of a constant null.
const RELATIVE_STD_TOLERANCE: f64 = 1e-12;

/// Result of an aggregate density bootstrap.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScalarSignificance {
    pub density: f64,
    pub pvalue: f64,
    pub bs_mean: f64,
    pub bs_std: f64,
}

///
/// Empirical p-value of `density` against the bootstrap densities.
///
/// The p-value is the fraction of bootstraps with a density at least as
/// high as the real one. When no bootstrap reaches it the p-value is 0, not
/// `1 / N`.
///
pub fn empirical_pvalue(density: f64, bootstraps: &[f64]) -> Result<ScalarSignificance, DensityError> {
    if bootstraps.is_empty() {
        return Err(DensityError::EmptyBootstrap(0));
    }

    let num_higher = bootstraps.iter().filter(|&&bs| bs >= density).count();
    // TODO: switch to (c + 1) / (N + 1) once downstream tables no longer expect exact zeros
    let pvalue = match num_higher {
        0 => 0.0,
        c => c as f64 / bootstraps.len() as f64,
    };

    Ok(ScalarSignificance {
        density,
        pvalue,
        bs_mean: mean(bootstraps),
        bs_std: std_dev(bootstraps),
    })
}

///
/// Null moments used to standardize scores.
///
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NullCalibration {
    pub bs_mean: f64,
    pub bs_std: f64,
}

impl NullCalibration {
    ///
    /// Average the per-trial means and standard deviations of the bootstrap
    /// trials. Each trial weighs the same no matter how many genes it holds.
    ///
    pub fn from_trials(trials: &[&GeneScores]) -> Result<Self, DensityError> {
        if trials.is_empty() {
            return Err(DensityError::EmptyBootstrap(0));
        }

        let (means, stds): (Vec<f64>, Vec<f64>) = trials
            .iter()
            .map(|trial| {
                let values = trial.values();
                (mean(&values), std_dev(&values))
            })
            .unzip();

        NullCalibration::new(mean(&means), mean(&stds))
    }

    pub fn new(bs_mean: f64, bs_std: f64) -> Result<Self, DensityError> {
        if !bs_mean.is_finite() {
            return Err(DensityError::NonFiniteStatistic {
                name: "bootstrap mean",
                value: bs_mean,
            });
        }
        if !bs_std.is_finite() {
            return Err(DensityError::NonFiniteStatistic {
                name: "bootstrap standard deviation",
                value: bs_std,
            });
        }
        if bs_std <= RELATIVE_STD_TOLERANCE * bs_mean.abs() {
            return Err(DensityError::ZeroVariance);
        }

        Ok(NullCalibration { bs_mean, bs_std })
    }

    pub fn zscore(&self, score: f64) -> f64 {
        (score - self.bs_mean) / self.bs_std
    }
}

///
/// Statistics of one threshold of the FDR sweep.
///
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThresholdStats {
    pub threshold: f64,
    pub num_real: usize,
    pub num_random: f64,
    pub fdr: f64,
}

impl ThresholdStats {
    pub fn new(threshold: f64, num_real: usize, num_random: f64) -> Self {
        let fdr = if num_real == 0 {
            1.0
        } else if num_random == 0.0 {
            0.0
        } else {
            (num_random / num_real as f64).min(1.0)
        };

        ThresholdStats {
            threshold,
            num_real,
            num_random,
            fdr,
        }
    }
}

/// One row of the gene-specific result table.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneSignificance {
    pub gene: String,
    pub score: f64,
    pub zscore: f64,
    pub fdr: f64,
    /// `None` when the z-score is below the first threshold.
    pub num_real: Option<usize>,
    pub num_random: Option<f64>,
    pub bs_mean: f64,
    pub bs_std: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GeneSignificanceTable {
    /// Genes sorted by ascending FDR, ties in input order.
    pub genes: Vec<GeneSignificance>,
    /// The thresholds kept by at least one gene, ascending.
    pub thresholds: Vec<ThresholdStats>,
    pub calibration: NullCalibration,
    /// Bootstrap trials that contributed genes.
    pub num_trials: usize,
}

///
/// Index `k` of the highest grid point `k * step` at or below `zscore`, or
/// `None` when the z-score is below the first grid point.
///
/// Genes never exceed `floor(max z) + 1`, so the upper end of the grid does
/// not need to be checked here.
///
pub fn grid_index(zscore: f64, step: f64) -> Option<u64> {
    if zscore.is_nan() || zscore < 0.0 {
        return None;
    }

    let mut k = (zscore / step).floor();
    // the division may land one grid point off
    if k * step > zscore {
        k -= 1.0;
    } else if (k + 1.0) * step <= zscore {
        k += 1.0;
    }

    Some(k.max(0.0) as u64)
}

pub fn grid_threshold(k: u64, step: f64) -> f64 {
    k as f64 * step
}

///
/// Evaluate the thresholds `grid` over real z-scores and the z-scores of
/// every bootstrap trial.
///
pub fn fdr_sweep(real_zscores: &[f64], null_zscores: &[Vec<f64>], grid: &[f64]) -> Vec<ThresholdStats> {
    let real = sorted(real_zscores);
    let nulls: Vec<Vec<f64>> = null_zscores.iter().map(|z| sorted(z)).collect();

    grid.iter()
        .map(|&t| {
            let num_real = count_at_least(&real, t);
            let num_random = match nulls.len() {
                0 => 0.0,
                n => nulls.iter().map(|z| count_at_least(z, t) as f64).sum::<f64>() / n as f64,
            };
            ThresholdStats::new(t, num_real, num_random)
        })
        .collect()
}

///
/// Calibrate a real per-gene score table against bootstrap trials.
///
/// Trials without genes are ignored. The gene sets of the trials do not
/// have to match the real one: only counts at or above each threshold are
/// compared.
///
pub fn gene_significance(
    real: &GeneScores,
    bootstraps: &[GeneScores],
    step: f64,
) -> Result<GeneSignificanceTable, DensityError> {
    if real.is_empty() {
        return Err(DensityError::EmptyRealSample);
    }
    if let Some(bad) = real.iter().find(|s| !s.score.is_finite()) {
        return Err(DensityError::NonFiniteStatistic {
            name: "real score",
            value: bad.score,
        });
    }

    let trials: Vec<&GeneScores> = bootstraps.iter().filter(|t| !t.is_empty()).collect();
    if trials.len() < bootstraps.len() {
        warn!(
            "Ignoring {} of {} bootstrap trials without genes",
            bootstraps.len() - trials.len(),
            bootstraps.len()
        );
    }
    if trials.is_empty() {
        return Err(DensityError::EmptyBootstrap(bootstraps.len()));
    }

    let calibration = NullCalibration::from_trials(&trials)?;

    let real_zscores: Vec<f64> = real.iter().map(|s| calibration.zscore(s.score)).collect();
    let null_zscores: Vec<Vec<f64>> = trials
        .iter()
        .map(|trial| trial.iter().map(|s| calibration.zscore(s.score)).collect())
        .collect();

    let indices: Vec<Option<u64>> = real_zscores.iter().map(|&z| grid_index(z, step)).collect();
    let kept: Vec<u64> = indices.iter().flatten().copied().collect::<BTreeSet<u64>>().into_iter().collect();
    let grid: Vec<f64> = kept.iter().map(|&k| grid_threshold(k, step)).collect();
    debug!("FDR sweep over {} thresholds", grid.len());

    let thresholds = fdr_sweep(&real_zscores, &null_zscores, &grid);

    let mut genes: Vec<GeneSignificance> = real
        .iter()
        .zip(&real_zscores)
        .zip(&indices)
        .map(|((gene, &zscore), &index)| {
            let stats = index.and_then(|k| kept.binary_search(&k).ok()).map(|i| &thresholds[i]);

            GeneSignificance {
                gene: gene.gene.clone(),
                score: gene.score,
                zscore,
                fdr: stats.map_or(1.0, |s| s.fdr),
                num_real: stats.map(|s| s.num_real),
                num_random: stats.map(|s| s.num_random),
                bs_mean: calibration.bs_mean,
                bs_std: calibration.bs_std,
            }
        })
        .collect();

    // stable
    genes.sort_by(|a, b| a.fdr.total_cmp(&b.fdr));

    Ok(GeneSignificanceTable {
        genes,
        thresholds,
        calibration,
        num_trials: trials.len(),
    })
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation (ddof = 0).
fn std_dev(values: &[f64]) -> f64 {
    // constant samples have no spread whatever their rounded mean
    if values.windows(2).all(|w| w[0] == w[1]) {
        return 0.0;
    }
    let mu = mean(values);
    let var = values.iter().map(|v| (v - mu).powi(2)).sum::<f64>() / values.len() as f64;
    var.sqrt()
}

fn sorted(values: &[f64]) -> Vec<f64> {
    let mut values = values.to_vec();
    values.sort_by(f64::total_cmp);
    values
}

/// Number of values `>= t` in an ascending slice.
fn count_at_least(sorted: &[f64], t: f64) -> usize {
    sorted.len() - sorted.partition_point(|&v| v < t)
}
