use serde::{Deserialize, Serialize};

use crate::errors::DensityError;

/// Which shape of density statistic to compute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SampleMode {
    /// One density value per locus set.
    Aggregate,
    /// One density value per candidate gene.
    GeneSpecific,
}

impl SampleMode {
    pub fn from_gene_specific(gene_specific: bool) -> Self {
        match gene_specific {
            true => SampleMode::GeneSpecific,
            false => SampleMode::Aggregate,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GeneScore {
    pub gene: String,
    pub score: f64,
}

impl GeneScore {
    pub fn new(gene: &str, score: f64) -> Self {
        GeneScore {
            gene: gene.to_string(),
            score,
        }
    }
}

///
/// Per-gene density scores from one computation. Bootstrap trials are
/// tagged with their trial index in `iter`; the real sample has none.
///
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GeneScores {
    pub iter: Option<usize>,
    pub scores: Vec<GeneScore>,
}

impl From<Vec<GeneScore>> for GeneScores {
    fn from(scores: Vec<GeneScore>) -> Self {
        GeneScores { iter: None, scores }
    }
}

impl GeneScores {
    pub fn with_iter(mut self, iter: usize) -> Self {
        self.iter = Some(iter);
        self
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, GeneScore> {
        self.scores.iter()
    }

    pub fn values(&self) -> Vec<f64> {
        self.scores.iter().map(|s| s.score).collect()
    }
}

///
/// A density statistic, either for the whole locus set or per gene.
///
#[derive(Debug, Clone, PartialEq)]
pub enum DensitySample {
    Scalar(f64),
    PerGene(GeneScores),
}

impl DensitySample {
    pub fn into_scalar(self) -> Result<f64, DensityError> {
        match self {
            DensitySample::Scalar(value) => Ok(value),
            DensitySample::PerGene(_) => Err(DensityError::MismatchedSample { expected: "scalar" }),
        }
    }

    pub fn into_gene_scores(self) -> Result<GeneScores, DensityError> {
        match self {
            DensitySample::PerGene(scores) => Ok(scores),
            DensitySample::Scalar(_) => Err(DensityError::MismatchedSample { expected: "per-gene" }),
        }
    }
}
