//! GWAS ontologies: named collections of terms, each term carrying the SNPs
//! associated with one phenotype.
//!
//! A term can be resolved into a [`LocusSet`] in two ways:
//!
//! - [`Term::effective_loci`] collapses SNPs whose windows overlap into one
//!   effective locus
//! - [`Term::strongest_loci`] collapses the same way, then keeps only the
//!   strongest SNP of every effective locus according to a numeric attribute
//!
use std::collections::HashMap;
use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::debug;

use crate::errors::OntologyError;
use crate::models::{Locus, LocusSet};
use crate::utils::{dataset_name, get_dynamic_reader};

const TERM_COLUMN: &str = "term";
const CHR_COLUMNS: [&str; 2] = ["chr", "chrom"];
const POS_COLUMN: &str = "pos";
const START_COLUMN: &str = "start";
const END_COLUMN: &str = "end";
const ID_COLUMN: &str = "id";
const DESC_COLUMN: &str = "desc";
const MISSING_VALUES: [&str; 3] = ["", "NA", "nan"];

///
/// Term struct, one phenotype and its associated SNPs
///
#[derive(Clone, Debug, PartialEq)]
pub struct Term {
    pub id: String,
    pub description: Option<String>,
    pub loci: Vec<Locus>,
}

impl Term {
    pub fn new(id: &str, loci: Vec<Locus>) -> Self {
        Term {
            id: id.to_string(),
            description: None,
            loci,
        }
    }

    /// Number of raw SNPs of the term, before any collapsing.
    pub fn num_snps(&self) -> usize {
        self.loci.len()
    }

    ///
    /// Collapse SNPs into effective loci.
    ///
    /// Every SNP gets `window_size` as its window, then SNPs on the same
    /// chromosome whose windows overlap are merged into a single locus
    /// spanning all of them.
    ///
    pub fn effective_loci(&self, window_size: u32) -> LocusSet {
        self.collapsed_groups(window_size)
            .into_iter()
            .filter_map(|group| Locus::collapse(group, window_size))
            .collect::<Vec<Locus>>()
            .into()
    }

    ///
    /// Collapse SNPs into effective loci and keep the strongest SNP of each.
    ///
    /// The strongest SNP has the lowest value of `attr` (e.g. a p-value), or
    /// the highest when `higher` is set. Ties keep the first SNP in genomic
    /// order.
    ///
    pub fn strongest_loci(
        &self,
        window_size: u32,
        attr: &str,
        higher: bool,
    ) -> Result<LocusSet, OntologyError> {
        let mut strongest: Vec<Locus> = Vec::new();

        for group in self.collapsed_groups(window_size) {
            let mut best: Option<(f64, Locus)> = None;

            for locus in group {
                let value = locus.attr(attr).ok_or_else(|| OntologyError::MissingAttribute {
                    locus: locus.id.clone(),
                    attr: attr.to_string(),
                })?;

                let is_better = match &best {
                    None => true,
                    Some((best_value, _)) if higher => value > *best_value,
                    Some((best_value, _)) => value < *best_value,
                };
                if is_better {
                    best = Some((value, locus));
                }
            }

            if let Some((_, locus)) = best {
                strongest.push(locus.with_window(window_size));
            }
        }

        Ok(strongest.into())
    }

    fn collapsed_groups(&self, window_size: u32) -> Vec<Vec<Locus>> {
        let mut loci: Vec<Locus> = self
            .loci
            .iter()
            .map(|l| {
                let mut locus = l.clone().with_window(window_size);
                locus.sub_loci.clear();
                locus
            })
            .collect();
        loci.sort_by(|a, b| (&a.chr, a.start, a.end).cmp(&(&b.chr, b.start, b.end)));

        let mut groups: Vec<Vec<Locus>> = Vec::new();
        // windowed end of the group being built
        let mut group_end: u32 = 0;

        for locus in loci {
            let extends = match groups.last() {
                Some(group) => group[0].chr == locus.chr && locus.window_start() < group_end,
                None => false,
            };

            if extends {
                group_end = group_end.max(locus.window_end());
                if let Some(group) = groups.last_mut() {
                    group.push(locus);
                }
            } else {
                group_end = locus.window_end();
                groups.push(vec![locus]);
            }
        }

        groups
    }
}

///
/// Ontology struct, the terms of one GWAS dataset in file order
///
#[derive(Clone, Debug, Default)]
pub struct Ontology {
    pub name: String,
    pub path: Option<PathBuf>,
    terms: Vec<Term>,
    index: HashMap<String, usize>,
}

impl TryFrom<&Path> for Ontology {
    type Error = anyhow::Error;

    ///
    /// Create a new [Ontology] from a GWAS table.
    ///
    /// The table is tab separated with a header naming the columns: `term`,
    /// `chr`, and either `pos` or `start`/`end` are required; `id` and
    /// `desc` are optional. Every other column is read as a numeric SNP
    /// attribute.
    ///
    /// # Arguments:
    /// - value: path to the GWAS file on disk, optionally gzipped.
    fn try_from(value: &Path) -> Result<Self> {
        let reader = get_dynamic_reader(value)?;
        let mut ontology = Ontology::from_reader(&dataset_name(value), reader)
            .with_context(|| format!("Failed to parse GWAS file: {}", value.display()))?;
        ontology.path = Some(value.to_owned());
        debug!(
            "Read {} terms with {} SNPs from {}",
            ontology.len(),
            ontology.iter_terms().map(Term::num_snps).sum::<usize>(),
            value.display()
        );

        Ok(ontology)
    }
}

impl TryFrom<&str> for Ontology {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self> {
        Ontology::try_from(Path::new(value))
    }
}

impl Ontology {
    pub fn from_terms(name: &str, terms: Vec<Term>) -> Self {
        let index = terms
            .iter()
            .enumerate()
            .map(|(i, t)| (t.id.clone(), i))
            .collect();

        Ontology {
            name: name.to_string(),
            path: None,
            terms,
            index,
        }
    }

    pub fn from_reader<R: Read>(name: &str, reader: R) -> Result<Self, OntologyError> {
        let mut rdr = csv::ReaderBuilder::new()
            .delimiter(b'\t')
            .has_headers(true)
            .from_reader(reader);

        let headers = rdr.headers()?.clone();
        if headers.is_empty() {
            return Ok(Ontology::from_terms(name, Vec::new()));
        }

        let column = |names: &[&str]| {
            headers
                .iter()
                .position(|h| names.iter().any(|n| h.trim_start_matches('#').eq_ignore_ascii_case(n)))
        };

        let term_col = column(&[TERM_COLUMN])
            .ok_or_else(|| OntologyError::MissingColumn(TERM_COLUMN.to_string()))?;
        let chr_col = column(&CHR_COLUMNS)
            .ok_or_else(|| OntologyError::MissingColumn(CHR_COLUMNS[0].to_string()))?;
        let pos_col = column(&[POS_COLUMN]);
        let start_col = column(&[START_COLUMN]);
        let end_col = column(&[END_COLUMN]);
        let id_col = column(&[ID_COLUMN]);
        let desc_col = column(&[DESC_COLUMN]);

        let (start_col, end_col) = match (pos_col, start_col, end_col) {
            (Some(pos), _, _) => (pos, pos),
            (None, Some(start), Some(end)) => (start, end),
            _ => return Err(OntologyError::MissingColumn(POS_COLUMN.to_string())),
        };

        let reserved = [Some(term_col), Some(chr_col), Some(start_col), Some(end_col), id_col, desc_col];
        let attr_cols: Vec<(usize, String)> = headers
            .iter()
            .enumerate()
            .filter(|(i, _)| !reserved.contains(&Some(*i)))
            .map(|(i, h)| (i, h.to_string()))
            .collect();

        let mut terms: Vec<Term> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();

        for record in rdr.records() {
            let record = record?;
            let line = record.position().map(|p| p.line()).unwrap_or_default();
            let field = |i: usize| record.get(i).unwrap_or_default().trim();
            let parse_err = |msg: String| OntologyError::RecordParseError { line, msg };

            let term_id = field(term_col);
            let chr = field(chr_col);
            let start: u32 = field(start_col)
                .parse()
                .map_err(|_| parse_err(format!("invalid position '{}'", field(start_col))))?;
            let end: u32 = if end_col == start_col {
                start
                    .checked_add(1)
                    .ok_or_else(|| parse_err(format!("position out of range '{}'", start)))?
            } else {
                field(end_col)
                    .parse()
                    .map_err(|_| parse_err(format!("invalid end '{}'", field(end_col))))?
            };

            let snp_id = match id_col.map(field) {
                Some(id) if !id.is_empty() => id.to_string(),
                _ => format!("{}:{}", chr, start),
            };

            let mut locus = Locus::new(&snp_id, chr, start, end);
            for (i, attr) in &attr_cols {
                let raw = field(*i);
                if MISSING_VALUES.contains(&raw) {
                    continue;
                }
                let value: f64 = raw
                    .parse()
                    .map_err(|_| parse_err(format!("attribute '{}' is not numeric: '{}'", attr, raw)))?;
                locus.attrs.insert(attr.clone(), value);
            }

            let term_idx = *index.entry(term_id.to_string()).or_insert_with(|| {
                terms.push(Term::new(term_id, Vec::new()));
                terms.len() - 1
            });
            let term = &mut terms[term_idx];
            if term.description.is_none() {
                term.description = desc_col.map(field).filter(|d| !d.is_empty()).map(String::from);
            }
            term.loci.push(locus);
        }

        Ok(Ontology {
            name: name.to_string(),
            path: None,
            terms,
            index,
        })
    }

    pub fn term(&self, id: &str) -> Result<&Term, OntologyError> {
        self.index
            .get(id)
            .map(|&i| &self.terms[i])
            .ok_or_else(|| OntologyError::TermNotFound {
                ontology: self.name.clone(),
                term: id.to_string(),
            })
    }

    pub fn iter_terms(&self) -> impl Iterator<Item = &Term> {
        self.terms.iter()
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }
}
