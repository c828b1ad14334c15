use std::fmt::{self, Display};
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::errors::DensityError;
use crate::sample::SampleMode;

pub const DEFAULT_FLANK_LIMIT: u32 = 2;
pub const DEFAULT_NUM_BOOTSTRAPS: usize = 50;
pub const DEFAULT_FDR_STEP: f64 = 0.25;
pub const ALL_TERMS: &str = "all";

///
/// How the SNPs of a term are mapped onto loci before looking for genes.
///
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "lowercase")]
pub enum Snp2GeneMethod {
    /// Collapse SNPs with overlapping windows into effective loci.
    Effective { window_size: u32 },
    /// Collapse like `Effective`, then keep the strongest SNP of each locus
    /// by `attr`: the lowest value, or the highest when `higher` is set.
    Strongest {
        window_size: u32,
        attr: String,
        #[serde(default)]
        higher: bool,
    },
}

impl Snp2GeneMethod {
    pub fn from_parts(
        method: &str,
        window_size: Option<u32>,
        attr: Option<&str>,
        higher: bool,
    ) -> Result<Self, DensityError> {
        let require_window = || {
            window_size.ok_or_else(|| {
                DensityError::Config(format!("snp2gene method '{}' requires a window size", method))
            })
        };

        match method {
            "effective" => Ok(Snp2GeneMethod::Effective {
                window_size: require_window()?,
            }),
            "strongest" => {
                let attr = attr.filter(|a| !a.is_empty()).ok_or_else(|| {
                    DensityError::Config("snp2gene method 'strongest' requires an attribute".to_string())
                })?;
                Ok(Snp2GeneMethod::Strongest {
                    window_size: require_window()?,
                    attr: attr.to_string(),
                    higher,
                })
            }
            other => Err(DensityError::Config(format!(
                "Unknown snp2gene method: {}. Valid options are 'effective' or 'strongest'",
                other
            ))),
        }
    }

    pub fn window_size(&self) -> u32 {
        match self {
            Snp2GeneMethod::Effective { window_size } => *window_size,
            Snp2GeneMethod::Strongest { window_size, .. } => *window_size,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Snp2GeneMethod::Effective { .. } => "effective",
            Snp2GeneMethod::Strongest { .. } => "strongest",
        }
    }
}

impl Display for Snp2GeneMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

///
/// Terms to evaluate. Serialized as a plain list of ids where the literal
/// `all` selects every term of the ontology.
///
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub enum TermSelection {
    All,
    Ids(Vec<String>),
}

impl From<Vec<String>> for TermSelection {
    fn from(ids: Vec<String>) -> Self {
        match ids.iter().any(|id| id == ALL_TERMS) {
            true => TermSelection::All,
            false => TermSelection::Ids(ids),
        }
    }
}

impl From<TermSelection> for Vec<String> {
    fn from(selection: TermSelection) -> Self {
        match selection {
            TermSelection::All => vec![ALL_TERMS.to_string()],
            TermSelection::Ids(ids) => ids,
        }
    }
}

impl TermSelection {
    /// Label used in derived output names.
    pub fn label(&self) -> String {
        match self {
            TermSelection::All => ALL_TERMS.to_string(),
            TermSelection::Ids(ids) => ids.join(":"),
        }
    }
}

///
/// Everything a density run needs besides the data sources themselves.
///
/// ```toml
/// network_name = "ZmRoot"
/// ontology_name = "ZmIonome"
/// terms = ["all"]
/// flank_limit = 2
/// num_bootstraps = 100
/// gene_specific = true
///
/// [snp2gene]
/// method = "strongest"
/// window_size = 50000
/// attr = "pval"
/// ```
///
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DensityConfig {
    pub network_name: String,
    pub ontology_name: String,
    pub terms: TermSelection,
    pub snp2gene: Snp2GeneMethod,
    #[serde(default = "default_flank_limit")]
    pub flank_limit: u32,
    #[serde(default = "default_num_bootstraps")]
    pub num_bootstraps: usize,
    #[serde(default)]
    pub gene_specific: bool,
    #[serde(default = "default_fdr_step")]
    pub fdr_step: f64,
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default)]
    pub threads: Option<usize>,
    #[serde(default)]
    pub keep_going: bool,
    #[serde(default = "default_progress")]
    pub progress: bool,
}

fn default_flank_limit() -> u32 {
    DEFAULT_FLANK_LIMIT
}

fn default_num_bootstraps() -> usize {
    DEFAULT_NUM_BOOTSTRAPS
}

fn default_fdr_step() -> f64 {
    DEFAULT_FDR_STEP
}

fn default_progress() -> bool {
    true
}

impl DensityConfig {
    pub fn new(network_name: &str, ontology_name: &str, snp2gene: Snp2GeneMethod) -> Self {
        DensityConfig {
            network_name: network_name.to_string(),
            ontology_name: ontology_name.to_string(),
            terms: TermSelection::All,
            snp2gene,
            flank_limit: DEFAULT_FLANK_LIMIT,
            num_bootstraps: DEFAULT_NUM_BOOTSTRAPS,
            gene_specific: false,
            fdr_step: DEFAULT_FDR_STEP,
            seed: None,
            threads: None,
            keep_going: false,
            progress: true,
        }
    }

    ///
    /// Load a config from a toml or yaml file, chosen by extension.
    ///
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: DensityConfig = match path.extension().and_then(|e| e.to_str()) {
            Some("toml") => toml::from_str(&content)
                .with_context(|| format!("Failed to parse toml config: {}", path.display()))?,
            Some("yaml") | Some("yml") => serde_yaml::from_str(&content)
                .with_context(|| format!("Failed to parse yaml config: {}", path.display()))?,
            _ => anyhow::bail!(
                "Unsupported config format: {}. Use a .toml or .yaml file",
                path.display()
            ),
        };
        config.validate()?;

        Ok(config)
    }

    pub fn mode(&self) -> SampleMode {
        SampleMode::from_gene_specific(self.gene_specific)
    }

    ///
    /// Check the config before any sampling happens.
    ///
    pub fn validate(&self) -> Result<(), DensityError> {
        if self.num_bootstraps == 0 {
            return Err(DensityError::Config(
                "number of bootstraps must be a positive integer".to_string(),
            ));
        }
        if !(self.fdr_step.is_finite() && self.fdr_step > 0.0) {
            return Err(DensityError::Config(format!(
                "fdr step must be a positive number, got {}",
                self.fdr_step
            )));
        }
        if self.threads == Some(0) {
            return Err(DensityError::Config("threads must be at least 1".to_string()));
        }
        if let TermSelection::Ids(ids) = &self.terms {
            if ids.is_empty() {
                return Err(DensityError::Config(
                    "no terms selected, pass term ids or 'all'".to_string(),
                ));
            }
        }
        if let Snp2GeneMethod::Strongest { attr, .. } = &self.snp2gene {
            if attr.is_empty() {
                return Err(DensityError::Config(
                    "snp2gene method 'strongest' requires an attribute".to_string(),
                ));
            }
        }

        Ok(())
    }
}
