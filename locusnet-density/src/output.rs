use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::config::DensityConfig;
use crate::errors::DensityError;
use crate::orchestrator::{RunMetadata, SignificanceResult, TermResult};
use crate::sample::SampleMode;

pub const OUTPUT_SUFFIX: &str = ".density.tsv";

pub const AGGREGATE_COLUMNS: [&str; 7] = [
    "NumCollapsedSNPs",
    "NumCandidates",
    "Density",
    "PValue",
    "BSMean",
    "BSStd",
    "SNP2GeneMethod",
];

pub const GENE_COLUMNS: [&str; 9] = [
    "gene",
    "score",
    "zscore",
    "fdr",
    "num_real",
    "num_random",
    "bs_mean",
    "bs_std",
    "SNP2GeneMethod",
];

pub const METADATA_COLUMNS: [&str; 7] = [
    "Ontology",
    "Network",
    "Term",
    "NumSNPs",
    "WindowSize",
    "FlankLimit",
    "NumBootstraps",
];

///
/// Resolve where the result table goes.
///
/// An explicit path has its extension replaced by `.density.tsv`. Without
/// one the name is built from the network, ontology, window size, flank
/// limit and selected terms, and the suffix is appended as is, since
/// dataset names may contain dots.
///
pub fn derive_output_path(config: &DensityConfig, out: Option<&Path>) -> PathBuf {
    let base = match out {
        Some(out) => out.with_extension(""),
        None => PathBuf::from(format!(
            "{}_{}_{}_{}_{}",
            config.network_name,
            config.ontology_name,
            config.snp2gene.window_size(),
            config.flank_limit,
            config.terms.label()
        )),
    };

    let mut file_name = base.file_name().unwrap_or_default().to_os_string();
    file_name.push(OUTPUT_SUFFIX);

    base.with_file_name(file_name)
}

pub fn header(mode: SampleMode) -> Vec<&'static str> {
    let columns: &[&str] = match mode {
        SampleMode::Aggregate => &AGGREGATE_COLUMNS,
        SampleMode::GeneSpecific => &GENE_COLUMNS,
    };
    columns.iter().chain(METADATA_COLUMNS.iter()).copied().collect()
}

fn metadata_fields(result: &TermResult) -> Vec<String> {
    let RunMetadata {
        ontology,
        network,
        window_size,
        flank_limit,
        num_bootstraps,
        ..
    } = &result.metadata;

    vec![
        ontology.clone(),
        network.clone(),
        result.term.clone(),
        result.num_snps.to_string(),
        window_size.to_string(),
        flank_limit.to_string(),
        num_bootstraps.to_string(),
    ]
}

fn optional<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

///
/// Write term results as a tab separated table. The header is always
/// written, so zero results give a header-only table.
///
/// Results whose shape does not match `mode` are rejected.
///
/// # Returns
/// The number of data rows written.
pub fn write_results<W: Write>(writer: W, mode: SampleMode, results: &[TermResult]) -> Result<usize, DensityError> {
    let mut wtr = csv::WriterBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .from_writer(writer);

    wtr.write_record(header(mode))?;

    let mut rows = 0;
    for result in results {
        let metadata = metadata_fields(result);
        let snp2gene = result.metadata.snp2gene.clone();

        match (&result.significance, mode) {
            (SignificanceResult::Aggregate { num_candidates, result: sig }, SampleMode::Aggregate) => {
                let mut record = vec![
                    result.num_collapsed_snps.to_string(),
                    num_candidates.to_string(),
                    sig.density.to_string(),
                    sig.pvalue.to_string(),
                    sig.bs_mean.to_string(),
                    sig.bs_std.to_string(),
                    snp2gene,
                ];
                record.extend(metadata);
                wtr.write_record(&record)?;
                rows += 1;
            }
            (SignificanceResult::GeneSpecific(table), SampleMode::GeneSpecific) => {
                for gene in &table.genes {
                    let mut record = vec![
                        gene.gene.clone(),
                        gene.score.to_string(),
                        gene.zscore.to_string(),
                        gene.fdr.to_string(),
                        optional(gene.num_real),
                        optional(gene.num_random),
                        gene.bs_mean.to_string(),
                        gene.bs_std.to_string(),
                        snp2gene.clone(),
                    ];
                    record.extend(metadata.iter().cloned());
                    wtr.write_record(&record)?;
                    rows += 1;
                }
            }
            (_, SampleMode::Aggregate) => {
                return Err(DensityError::MismatchedSample { expected: "scalar" });
            }
            (_, SampleMode::GeneSpecific) => {
                return Err(DensityError::MismatchedSample { expected: "per-gene" });
            }
        }
    }

    wtr.flush()?;

    Ok(rows)
}

///
/// Write term results to `path`, creating parent directories as needed.
///
pub fn write_results_to_file(path: &Path, mode: SampleMode, results: &[TermResult]) -> Result<usize, DensityError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let file = File::create(path)?;
    write_results(BufWriter::new(file), mode, results)
}
