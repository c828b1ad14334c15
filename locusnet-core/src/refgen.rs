use std::collections::{HashMap, HashSet};
use std::io::BufRead;
use std::path::{Path, PathBuf};

use anyhow::Result;
use log::debug;

use crate::errors::RefGenError;
use crate::models::{Gene, Locus, LocusSet};
use crate::utils::{dataset_name, get_dynamic_reader, is_comment_line};

///
/// RefGen struct, a reference gene annotation indexed by chromosome
///
#[derive(Clone, Debug)]
pub struct RefGen {
    pub name: String,
    pub path: Option<PathBuf>,
    genes: Vec<Gene>,
    // gene indices per chromosome, sorted by start
    by_chr: HashMap<String, Vec<usize>>,
}

impl TryFrom<&Path> for RefGen {
    type Error = anyhow::Error;

    ///
    /// Create a new [RefGen] from a bed-like file: `chr start end gene_id`.
    ///
    /// # Arguments:
    /// - value: path to the annotation file on disk, optionally gzipped.
    fn try_from(value: &Path) -> Result<Self> {
        let reader = get_dynamic_reader(value)?;
        let mut genes: Vec<Gene> = Vec::new();

        for line in reader.lines() {
            let line = line?;
            if line.trim().is_empty() || is_comment_line(&line) {
                continue;
            }

            let parts: Vec<&str> = line.split('\t').collect();
            if parts.len() < 4 {
                return Err(RefGenError::GeneParseError(format!(
                    "expected 4 columns: {:?}",
                    parts
                ))
                .into());
            }

            let (Ok(start), Ok(end)) = (parts[1].parse::<u32>(), parts[2].parse::<u32>()) else {
                // a column header like `chr start end gene`
                if genes.is_empty() {
                    debug!("Skipping header line in {}: {}", value.display(), line);
                    continue;
                }
                return Err(RefGenError::GeneParseError(format!(
                    "invalid coordinates: {:?}",
                    parts
                ))
                .into());
            };

            genes.push(Gene::new(parts[3], parts[0], start, end));
        }

        if genes.is_empty() {
            return Err(RefGenError::EmptyAnnotation(value.display().to_string()).into());
        }

        debug!("Read {} genes from {}", genes.len(), value.display());
        let mut refgen = RefGen::from_genes(&dataset_name(value), genes);
        refgen.path = Some(value.to_owned());

        Ok(refgen)
    }
}

impl TryFrom<&str> for RefGen {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self> {
        RefGen::try_from(Path::new(value))
    }
}

impl RefGen {
    pub fn from_genes(name: &str, genes: Vec<Gene>) -> Self {
        let mut by_chr: HashMap<String, Vec<usize>> = HashMap::new();
        for (i, gene) in genes.iter().enumerate() {
            by_chr.entry(gene.chr.clone()).or_default().push(i);
        }
        for indices in by_chr.values_mut() {
            indices.sort_by_key(|&i| (genes[i].start, genes[i].end));
        }

        RefGen {
            name: name.to_string(),
            path: None,
            genes,
            by_chr,
        }
    }

    pub fn len(&self) -> usize {
        self.genes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.genes.is_empty()
    }

    pub fn genes(&self) -> &[Gene] {
        &self.genes
    }

    ///
    /// Candidate genes of a single locus, in genomic order.
    ///
    /// All genes overlapping the locus body are candidates. On top of those,
    /// up to `flank_limit` genes upstream and `flank_limit` genes downstream
    /// are taken, closest first, as long as they overlap the locus window.
    ///
    pub fn candidate_genes(&self, locus: &Locus, flank_limit: u32) -> Vec<&Gene> {
        let Some(indices) = self.by_chr.get(&locus.chr) else {
            return Vec::new();
        };

        let (lo, hi) = (locus.window_start(), locus.window_end());
        let mut body: Vec<&Gene> = Vec::new();
        let mut upstream: Vec<&Gene> = Vec::new();
        let mut downstream: Vec<&Gene> = Vec::new();

        for gene in indices.iter().map(|&i| &self.genes[i]) {
            if gene.start >= hi {
                break;
            }
            if !gene.overlaps(&locus.chr, lo, hi) {
                continue;
            }

            if gene.overlaps(&locus.chr, locus.start, locus.end) {
                body.push(gene);
            } else if gene.end <= locus.start {
                upstream.push(gene);
            } else {
                downstream.push(gene);
            }
        }

        // closest upstream genes end last
        upstream.sort_by_key(|g| std::cmp::Reverse(g.end));
        upstream.truncate(flank_limit as usize);
        downstream.truncate(flank_limit as usize);

        let mut candidates: Vec<&Gene> = upstream
            .into_iter()
            .chain(body)
            .chain(downstream)
            .collect();
        candidates.sort_by_key(|g| (g.start, g.end));

        candidates
    }

    ///
    /// Candidate genes of every locus, one list per locus, in locus order.
    ///
    pub fn candidate_genes_per_locus(
        &self,
        loci: &LocusSet,
        flank_limit: u32,
    ) -> Result<Vec<Vec<&Gene>>, RefGenError> {
        if loci.is_empty() {
            return Err(RefGenError::EmptyLocusSet);
        }

        Ok(loci
            .iter()
            .map(|locus| self.candidate_genes(locus, flank_limit))
            .collect())
    }

    ///
    /// Unique candidate genes across all loci, in locus order.
    ///
    pub fn candidate_genes_flat(
        &self,
        loci: &LocusSet,
        flank_limit: u32,
    ) -> Result<Vec<&Gene>, RefGenError> {
        let mut seen: HashSet<&str> = HashSet::new();
        let candidates: Vec<&Gene> = self
            .candidate_genes_per_locus(loci, flank_limit)?
            .into_iter()
            .flatten()
            .filter(|g| seen.insert(g.id.as_str()))
            .collect();

        if candidates.is_empty() {
            return Err(RefGenError::NoCandidateGenes(loci.to_string()));
        }

        Ok(candidates)
    }
}
