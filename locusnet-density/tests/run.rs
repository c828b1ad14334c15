use std::fs;
use std::path::Path;

use locusnet_core::models::{Locus, LocusSet};
use locusnet_core::ontology::{Ontology, Term};
use locusnet_density::errors::UpstreamError;
use locusnet_density::{
    DensityConfig, DensityError, DensityProvider, DensityRun, DensitySample, GeneScore, GeneScores,
    RunOutcome, SampleMode, SignificanceResult, Snp2GeneMethod, TermSelection, run_density,
};

use pretty_assertions::assert_eq;
use rstest::*;

/// Fixed densities: the real aggregate density is 0.95 and trial `i` has
/// density `i / 100`. Loci on `chrX` make the provider fail.
struct FixedProvider;

impl FixedProvider {
    fn check(loci: &LocusSet) -> Result<(), UpstreamError> {
        match loci.iter().any(|l| l.chr == "chrX") {
            true => Err("chrX is not in the network".into()),
            false => Ok(()),
        }
    }
}

impl DensityProvider for FixedProvider {
    fn name(&self) -> &str {
        "fixed"
    }

    fn real_density(&self, loci: &LocusSet, _flank_limit: u32, mode: SampleMode) -> Result<DensitySample, UpstreamError> {
        FixedProvider::check(loci)?;
        Ok(match mode {
            SampleMode::Aggregate => DensitySample::Scalar(0.95),
            SampleMode::GeneSpecific => DensitySample::PerGene(GeneScores::from(vec![
                GeneScore::new("G1", 5.0),
                GeneScore::new("G2", 2.0),
            ])),
        })
    }

    fn null_density(
        &self,
        loci: &LocusSet,
        _flank_limit: u32,
        mode: SampleMode,
        iter: usize,
    ) -> Result<DensitySample, UpstreamError> {
        FixedProvider::check(loci)?;
        Ok(match mode {
            SampleMode::Aggregate => DensitySample::Scalar(iter as f64 / 100.0),
            SampleMode::GeneSpecific => DensitySample::PerGene(GeneScores::from(vec![
                GeneScore::new("B1", 1.0),
                GeneScore::new("B2", 3.0),
            ])),
        })
    }

    fn candidate_genes(&self, loci: &LocusSet, _flank_limit: u32) -> Result<Vec<String>, UpstreamError> {
        Ok(loci.iter().map(|l| format!("{}_gene", l.id)).collect())
    }
}

#[fixture]
fn ontology() -> Ontology {
    Ontology::from_terms(
        "ZmIonome",
        vec![
            Term::new(
                "Al27",
                vec![
                    Locus::snp("rs1", "chr1", 1_000),
                    Locus::snp("rs2", "chr1", 1_500),
                    Locus::snp("rs3", "chr2", 9_000),
                ],
            ),
            Term::new("Cd111", vec![Locus::snp("rs4", "chrX", 100)]),
            Term::new("Zn66", vec![Locus::snp("rs5", "chr3", 100)]),
        ],
    )
}

#[fixture]
fn config() -> DensityConfig {
    let mut config = DensityConfig::new("ZmRoot", "ZmIonome", Snp2GeneMethod::Effective { window_size: 1_000 });
    config.num_bootstraps = 100;
    config.progress = false;
    config
}

fn read(path: &Path) -> Vec<String> {
    fs::read_to_string(path)
        .unwrap()
        .lines()
        .map(str::to_string)
        .collect()
}

#[rstest]
fn test_aggregate_pvalue_over_hundred_trials(ontology: Ontology, mut config: DensityConfig) {
    config.terms = TermSelection::Ids(vec!["Al27".to_string()]);

    let results = DensityRun::new(&config, &ontology, &FixedProvider)
        .unwrap()
        .run()
        .unwrap();

    assert_eq!(results.len(), 1);
    let result = &results[0];
    assert_eq!(result.num_snps, 3);
    assert_eq!(result.num_collapsed_snps, 2);
    match &result.significance {
        SignificanceResult::Aggregate { num_candidates, result } => {
            assert_eq!(*num_candidates, 2);
            // trials 95..=99 reach the real density
            assert!((result.pvalue - 0.05).abs() < 1e-12);
            assert!((result.bs_mean - 0.495).abs() < 1e-12);
        }
        other => panic!("unexpected result: {:?}", other),
    }
}

#[rstest]
fn test_failing_term_fails_run(ontology: Ontology, config: DensityConfig) {
    let err = DensityRun::new(&config, &ontology, &FixedProvider)
        .unwrap()
        .run()
        .unwrap_err();

    match err {
        DensityError::Upstream(e) => assert_eq!(e.to_string(), "chrX is not in the network"),
        other => panic!("unexpected error: {:?}", other),
    }
}

#[rstest]
fn test_keep_going_skips_failing_term(ontology: Ontology, mut config: DensityConfig) {
    config.keep_going = true;

    let results = DensityRun::new(&config, &ontology, &FixedProvider)
        .unwrap()
        .run()
        .unwrap();

    let terms: Vec<&str> = results.iter().map(|r| r.term.as_str()).collect();
    assert_eq!(terms, vec!["Al27", "Zn66"]);
}

#[rstest]
fn test_unknown_term_fails_before_sampling(ontology: Ontology, mut config: DensityConfig) {
    config.terms = TermSelection::Ids(vec!["Zn66".to_string(), "Fe57".to_string()]);
    config.keep_going = true;

    let run = DensityRun::new(&config, &ontology, &FixedProvider).unwrap();
    assert!(matches!(run.run(), Err(DensityError::Upstream(_))));
}

#[rstest]
fn test_gene_specific_table(ontology: Ontology, mut config: DensityConfig) {
    config.terms = TermSelection::Ids(vec!["Al27".to_string()]);
    config.gene_specific = true;
    config.num_bootstraps = 4;

    let results = DensityRun::new(&config, &ontology, &FixedProvider)
        .unwrap()
        .run()
        .unwrap();

    match &results[0].significance {
        SignificanceResult::GeneSpecific(table) => {
            assert_eq!(table.calibration.bs_mean, 2.0);
            assert_eq!(table.calibration.bs_std, 1.0);
            assert_eq!(table.num_trials, 4);

            let genes: Vec<&str> = table.genes.iter().map(|g| g.gene.as_str()).collect();
            assert_eq!(genes, vec!["G1", "G2"]);
            assert_eq!(table.genes[0].zscore, 3.0);
            assert_eq!(table.genes[0].fdr, 0.0);
            // at z = 0 one of two trial genes is as high as both real genes
            assert_eq!(table.genes[1].fdr, 0.5);
        }
        other => panic!("unexpected result: {:?}", other),
    }
}

#[rstest]
fn test_run_density_writes_and_skips(ontology: Ontology, mut config: DensityConfig) {
    config.terms = TermSelection::Ids(vec!["Al27".to_string(), "Zn66".to_string()]);
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("out/ionome.tsv");

    let outcome = run_density(&config, Some(out.as_path()), false, || Ok((ontology.clone(), FixedProvider))).unwrap();
    let expected = dir.path().join("out/ionome.density.tsv");
    assert_eq!(
        outcome,
        RunOutcome::Written {
            path: expected.clone(),
            terms: 2,
            rows: 2
        }
    );

    let lines = read(&expected);
    assert_eq!(lines.len(), 3);
    assert!(lines[1].ends_with("\tZmIonome\tZmRoot\tAl27\t3\t1000\t2\t100"));

    // an existing output is left alone and no data is loaded
    let outcome = run_density::<Ontology, FixedProvider, _>(&config, Some(out.as_path()), false, || {
        panic!("inputs must not be loaded when the output exists")
    })
    .unwrap();
    assert_eq!(outcome, RunOutcome::Skipped(expected.clone()));

    let outcome = run_density(&config, Some(out.as_path()), true, || Ok((ontology.clone(), FixedProvider))).unwrap();
    assert!(matches!(outcome, RunOutcome::Written { .. }));
}

#[rstest]
fn test_reruns_are_identical(ontology: Ontology, mut config: DensityConfig) {
    config.terms = TermSelection::Ids(vec!["Al27".to_string()]);
    config.gene_specific = true;
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("run");

    run_density(&config, Some(out.as_path()), false, || Ok((ontology.clone(), FixedProvider))).unwrap();
    let first = fs::read(dir.path().join("run.density.tsv")).unwrap();
    run_density(&config, Some(out.as_path()), true, || Ok((ontology.clone(), FixedProvider))).unwrap();
    let second = fs::read(dir.path().join("run.density.tsv")).unwrap();

    assert_eq!(first, second);
}

#[rstest]
fn test_empty_ontology_writes_header_only(config: DensityConfig) {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("empty.tsv");
    let empty = Ontology::from_terms("ZmIonome", vec![]);

    let outcome = run_density(&config, Some(out.as_path()), false, || Ok((empty, FixedProvider))).unwrap();
    match outcome {
        RunOutcome::Written { path, terms, rows } => {
            assert_eq!((terms, rows), (0, 0));
            let lines = read(&path);
            assert_eq!(lines.len(), 1);
            assert!(lines[0].starts_with("NumCollapsedSNPs\tNumCandidates"));
        }
        other => panic!("unexpected outcome: {:?}", other),
    }
}

#[rstest]
fn test_invalid_config_rejected(ontology: Ontology, mut config: DensityConfig) {
    config.num_bootstraps = 0;
    assert!(matches!(
        DensityRun::new(&config, &ontology, &FixedProvider),
        Err(DensityError::Config(_))
    ));
}
