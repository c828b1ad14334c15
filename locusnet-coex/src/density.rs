//! Trans-locus co-expression density.
//!
//! Candidate genes are grouped by the locus they were found at. Only pairs
//! of genes from different loci are scored, so the density of a locus set
//! is not inflated by co-expressed neighbours (tandem duplicates, shared
//! regulatory regions) around a single signal.
//!
use std::hash::{Hash, Hasher};

use fxhash::{FxHashSet, FxHasher64};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::index;

use locusnet_core::models::LocusSet;
use locusnet_core::refgen::RefGen;
use locusnet_density::errors::UpstreamError;
use locusnet_density::{DensityProvider, DensitySample, GeneScore, GeneScores, SampleMode};

use crate::errors::NetworkError;
use crate::network::CoexNetwork;

///
/// Scores locus sets by the co-expression of their candidate genes across
/// loci.
///
/// The null model keeps the number of network candidates of every locus and
/// replaces the genes by a uniform draw without replacement from all
/// network genes. Trial `i` is drawn from a generator seeded with a hash
/// of the run seed, the locus set and `i`, so terms draw independent nulls.
///
pub struct TransLocusDensity {
    network: CoexNetwork,
    refgen: RefGen,
    seed: u64,
}

impl TransLocusDensity {
    pub fn new(network: CoexNetwork, refgen: RefGen, seed: Option<u64>) -> Self {
        let seed = seed.unwrap_or_else(rand::random::<u64>);

        TransLocusDensity {
            network,
            refgen,
            seed,
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn network(&self) -> &CoexNetwork {
        &self.network
    }

    ///
    /// Network genes near every locus, one group per locus.
    ///
    /// A gene near several loci stays with the first one. Loci without
    /// network genes are dropped.
    ///
    pub fn candidate_groups(&self, loci: &LocusSet, flank_limit: u32) -> Result<Vec<Vec<u32>>, UpstreamError> {
        let mut seen: FxHashSet<u32> = FxHashSet::default();
        let groups: Vec<Vec<u32>> = self
            .refgen
            .candidate_genes_per_locus(loci, flank_limit)?
            .into_iter()
            .map(|genes| {
                genes
                    .into_iter()
                    .filter_map(|g| self.network.gene_index(&g.id))
                    .filter(|idx| seen.insert(*idx))
                    .collect::<Vec<u32>>()
            })
            .filter(|group| !group.is_empty())
            .collect();

        if groups.len() < 2 {
            return Err(NetworkError::NoTransPairs.into());
        }

        Ok(groups)
    }

    fn trial_seed(&self, loci: &LocusSet, iter: usize) -> u64 {
        let mut hasher = FxHasher64::default();
        self.seed.hash(&mut hasher);
        for locus in loci.iter() {
            locus.id.hash(&mut hasher);
            locus.chr.hash(&mut hasher);
            locus.start.hash(&mut hasher);
            locus.end.hash(&mut hasher);
        }
        (iter as u64).hash(&mut hasher);
        hasher.finish()
    }

    fn score(&self, groups: &[Vec<u32>], mode: SampleMode, iter: Option<usize>) -> DensitySample {
        match mode {
            SampleMode::Aggregate => DensitySample::Scalar(self.aggregate_density(groups)),
            SampleMode::GeneSpecific => {
                let scores = self.gene_densities(groups);
                DensitySample::PerGene(match iter {
                    Some(i) => scores.with_iter(i),
                    None => scores,
                })
            }
        }
    }

    /// Sum of trans pair scores over the square root of the number of pairs.
    pub fn aggregate_density(&self, groups: &[Vec<u32>]) -> f64 {
        let mut sum = 0.0;
        let mut num_pairs: usize = 0;

        for (i, group) in groups.iter().enumerate() {
            for other in &groups[i + 1..] {
                for &a in group {
                    for &b in other {
                        sum += self.network.score_by_index(a, b);
                        num_pairs += 1;
                    }
                }
            }
        }

        sum / (num_pairs as f64).sqrt()
    }

    /// Trans density of every gene over its own trans pairs, in group order.
    pub fn gene_densities(&self, groups: &[Vec<u32>]) -> GeneScores {
        let total: usize = groups.iter().map(Vec::len).sum();
        let mut scores: Vec<GeneScore> = Vec::with_capacity(total);

        for (i, group) in groups.iter().enumerate() {
            let partners = total - group.len();
            for &a in group {
                let sum: f64 = groups
                    .iter()
                    .enumerate()
                    .filter(|(j, _)| *j != i)
                    .flat_map(|(_, other)| other.iter())
                    .map(|&b| self.network.score_by_index(a, b))
                    .sum();
                scores.push(GeneScore::new(
                    self.network.gene_id(a),
                    sum / (partners as f64).sqrt(),
                ));
            }
        }

        scores.into()
    }
}

///
/// Draw random groups with the given sizes from `universe` genes, without
/// replacement across all groups.
///
fn draw_groups(sizes: &[usize], universe: usize, rng: &mut StdRng) -> Result<Vec<Vec<u32>>, NetworkError> {
    let needed: usize = sizes.iter().sum();
    if needed > universe {
        return Err(NetworkError::UniverseTooSmall {
            needed,
            available: universe,
        });
    }

    let mut drawn = index::sample(rng, universe, needed).into_iter();
    Ok(sizes
        .iter()
        .map(|&size| drawn.by_ref().take(size).map(|i| i as u32).collect())
        .collect())
}

impl DensityProvider for TransLocusDensity {
    fn name(&self) -> &str {
        &self.network.name
    }

    fn real_density(&self, loci: &LocusSet, flank_limit: u32, mode: SampleMode) -> Result<DensitySample, UpstreamError> {
        let groups = self.candidate_groups(loci, flank_limit)?;
        Ok(self.score(&groups, mode, None))
    }

    fn null_density(
        &self,
        loci: &LocusSet,
        flank_limit: u32,
        mode: SampleMode,
        iter: usize,
    ) -> Result<DensitySample, UpstreamError> {
        let sizes: Vec<usize> = self
            .candidate_groups(loci, flank_limit)?
            .iter()
            .map(Vec::len)
            .collect();

        let mut rng = StdRng::seed_from_u64(self.trial_seed(loci, iter));
        let groups = draw_groups(&sizes, self.network.num_genes(), &mut rng)?;

        Ok(self.score(&groups, mode, Some(iter)))
    }

    fn candidate_genes(&self, loci: &LocusSet, flank_limit: u32) -> Result<Vec<String>, UpstreamError> {
        Ok(self
            .refgen
            .candidate_genes_flat(loci, flank_limit)?
            .into_iter()
            .map(|g| g.id.clone())
            .collect())
    }
}
