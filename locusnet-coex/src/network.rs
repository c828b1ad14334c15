use std::io::BufRead;
use std::path::{Path, PathBuf};

use anyhow::Result;
use fxhash::FxHashMap;
use log::debug;

use locusnet_core::utils::{dataset_name, get_dynamic_reader, is_comment_line};

use crate::errors::NetworkError;

///
/// CoexNetwork struct, an undirected weighted gene co-expression network.
///
/// Genes are interned in the order they are first seen. Pairs without an
/// edge score 0.
///
#[derive(Clone, Debug, Default)]
pub struct CoexNetwork {
    pub name: String,
    pub path: Option<PathBuf>,
    genes: Vec<String>,
    index: FxHashMap<String, u32>,
    edges: FxHashMap<(u32, u32), f64>,
}

impl TryFrom<&Path> for CoexNetwork {
    type Error = anyhow::Error;

    ///
    /// Create a new [CoexNetwork] from a tab separated edge list:
    /// `gene_a gene_b score`.
    ///
    /// A leading header line is skipped. Self edges and non-finite scores
    /// are ignored; a repeated pair keeps its last score.
    ///
    /// # Arguments:
    /// - value: path to the edge list on disk, optionally gzipped.
    fn try_from(value: &Path) -> Result<Self> {
        let reader = get_dynamic_reader(value)?;
        let mut network = CoexNetwork::new(&dataset_name(value));
        network.path = Some(value.to_owned());

        let mut num_edges: usize = 0;
        for (i, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() || is_comment_line(&line) {
                continue;
            }

            let parts: Vec<&str> = line.split('\t').collect();
            if parts.len() < 3 {
                return Err(NetworkError::EdgeParseError {
                    line: i + 1,
                    msg: format!("expected 3 columns: {:?}", parts),
                }
                .into());
            }

            let Ok(score) = parts[2].trim().parse::<f64>() else {
                // a column header like `gene_a gene_b score`
                if num_edges == 0 && network.genes.is_empty() {
                    continue;
                }
                return Err(NetworkError::EdgeParseError {
                    line: i + 1,
                    msg: format!("invalid score: {}", parts[2]),
                }
                .into());
            };

            network.insert_edge(parts[0].trim(), parts[1].trim(), score);
            num_edges += 1;
        }

        if network.genes.is_empty() {
            return Err(NetworkError::EmptyNetwork(value.display().to_string()).into());
        }
        debug!(
            "Read {} edge lines from {}, kept {} edges over {} genes",
            num_edges,
            value.display(),
            network.num_edges(),
            network.num_genes()
        );

        Ok(network)
    }
}

impl TryFrom<&str> for CoexNetwork {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self> {
        CoexNetwork::try_from(Path::new(value))
    }
}

impl CoexNetwork {
    pub fn new(name: &str) -> Self {
        CoexNetwork {
            name: name.to_string(),
            ..Default::default()
        }
    }

    pub fn from_edges(name: &str, edges: &[(&str, &str, f64)]) -> Self {
        let mut network = CoexNetwork::new(name);
        for (a, b, score) in edges {
            network.insert_edge(a, b, *score);
        }
        network
    }

    fn intern(&mut self, gene: &str) -> u32 {
        if let Some(&idx) = self.index.get(gene) {
            return idx;
        }
        let idx = self.genes.len() as u32;
        self.genes.push(gene.to_string());
        self.index.insert(gene.to_string(), idx);
        idx
    }

    ///
    /// Add or replace an edge. Both genes join the network even when the
    /// edge itself is dropped.
    ///
    pub fn insert_edge(&mut self, a: &str, b: &str, score: f64) {
        let a = self.intern(a);
        let b = self.intern(b);
        if a == b || !score.is_finite() {
            return;
        }
        self.edges.insert(edge_key(a, b), score);
    }

    /// Number of genes in the network.
    pub fn num_genes(&self) -> usize {
        self.genes.len()
    }

    pub fn num_edges(&self) -> usize {
        self.edges.len()
    }

    pub fn contains(&self, gene: &str) -> bool {
        self.index.contains_key(gene)
    }

    pub fn gene_index(&self, gene: &str) -> Option<u32> {
        self.index.get(gene).copied()
    }

    pub fn gene_id(&self, idx: u32) -> &str {
        &self.genes[idx as usize]
    }

    pub fn genes(&self) -> &[String] {
        &self.genes
    }

    /// Score of the pair by gene index, 0 without an edge.
    pub fn score_by_index(&self, a: u32, b: u32) -> f64 {
        self.edges.get(&edge_key(a, b)).copied().unwrap_or(0.0)
    }

    /// Score of the pair by gene id, 0 without an edge or for unknown genes.
    pub fn score(&self, a: &str, b: &str) -> f64 {
        match (self.gene_index(a), self.gene_index(b)) {
            (Some(a), Some(b)) => self.score_by_index(a, b),
            _ => 0.0,
        }
    }
}

fn edge_key(a: u32, b: u32) -> (u32, u32) {
    if a < b { (a, b) } else { (b, a) }
}
