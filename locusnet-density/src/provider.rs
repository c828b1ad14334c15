//! The collaborators the density engine consumes.
//!
//! [`LocusResolver`] turns ontology terms into locus sets and
//! [`DensityProvider`] computes real and randomized density statistics for
//! them. Errors from either side are returned as [`UpstreamError`] and
//! reach the caller unchanged.
//!
use locusnet_core::models::LocusSet;
use locusnet_core::ontology::{Ontology, Term};

use crate::config::{Snp2GeneMethod, TermSelection};
use crate::errors::UpstreamError;
use crate::sample::{DensitySample, SampleMode};

pub trait DensityProvider: Sync {
    /// Name stamped on results, e.g. the network name.
    fn name(&self) -> &str;

    /// Density of the locus set as observed.
    fn real_density(
        &self,
        loci: &LocusSet,
        flank_limit: u32,
        mode: SampleMode,
    ) -> Result<DensitySample, UpstreamError>;

    /// One randomized density trial. Trials with different `iter` are
    /// independent draws of the null model.
    fn null_density(
        &self,
        loci: &LocusSet,
        flank_limit: u32,
        mode: SampleMode,
        iter: usize,
    ) -> Result<DensitySample, UpstreamError>;

    /// Candidate gene ids near the locus set.
    fn candidate_genes(&self, loci: &LocusSet, flank_limit: u32) -> Result<Vec<String>, UpstreamError>;
}

pub trait LocusResolver: Sync {
    /// Name stamped on results, e.g. the ontology name.
    fn name(&self) -> &str;

    /// The terms to evaluate, in evaluation order.
    fn select_terms(&self, selection: &TermSelection) -> Result<Vec<&Term>, UpstreamError>;

    fn resolve_loci(&self, term: &Term, method: &Snp2GeneMethod) -> Result<LocusSet, UpstreamError>;
}

impl LocusResolver for Ontology {
    fn name(&self) -> &str {
        &self.name
    }

    fn select_terms(&self, selection: &TermSelection) -> Result<Vec<&Term>, UpstreamError> {
        match selection {
            TermSelection::All => Ok(self.iter_terms().collect()),
            TermSelection::Ids(ids) => ids
                .iter()
                .map(|id| self.term(id).map_err(UpstreamError::from))
                .collect(),
        }
    }

    fn resolve_loci(&self, term: &Term, method: &Snp2GeneMethod) -> Result<LocusSet, UpstreamError> {
        match method {
            Snp2GeneMethod::Effective { window_size } => Ok(term.effective_loci(*window_size)),
            Snp2GeneMethod::Strongest {
                window_size,
                attr,
                higher,
            } => Ok(term.strongest_loci(*window_size, attr, *higher)?),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use locusnet_core::models::Locus;
    use locusnet_core::errors::OntologyError;
    use pretty_assertions::assert_eq;
    use rstest::*;

    #[fixture]
    fn ontology() -> Ontology {
        Ontology::from_terms(
            "gwas",
            vec![
                Term::new(
                    "t1",
                    vec![
                        Locus::snp("rs1", "chr1", 100).with_attr("pval", 0.5),
                        Locus::snp("rs2", "chr1", 150).with_attr("pval", 0.1),
                    ],
                ),
                Term::new("t2", vec![Locus::snp("rs3", "chr2", 100)]),
            ],
        )
    }

    #[rstest]
    fn test_select_all(ontology: Ontology) {
        let terms = ontology.select_terms(&TermSelection::All).unwrap();
        assert_eq!(terms.len(), 2);
    }

    #[rstest]
    fn test_select_unknown_term(ontology: Ontology) {
        let selection = TermSelection::Ids(vec!["t2".to_string(), "t9".to_string()]);
        let err = ontology.select_terms(&selection).unwrap_err();
        assert!(err.downcast_ref::<OntologyError>().is_some());
    }

    #[rstest]
    fn test_resolve_methods(ontology: Ontology) {
        let term = ontology.term("t1").unwrap();

        let effective = Snp2GeneMethod::Effective { window_size: 100 };
        assert_eq!(ontology.resolve_loci(term, &effective).unwrap().len(), 1);

        let strongest = Snp2GeneMethod::Strongest {
            window_size: 100,
            attr: "pval".to_string(),
            higher: false,
        };
        let loci = ontology.resolve_loci(term, &strongest).unwrap();
        assert_eq!(loci.as_slice()[0].id, "rs2");
    }
}
