use clap::{Arg, ArgAction, Command, arg, value_parser};

pub const DENSITY_CMD: &str = "density";

pub fn create_density_cli() -> Command {
    Command::new(DENSITY_CMD)
        .about("Bootstrap the significance of co-expression density among the candidate genes of GWAS terms.")
        .arg(
            arg!(--network <NETWORK>)
                .required(true)
                .help("Path to the co-expression edge list: gene_a, gene_b, score (optionally gzipped)"),
        )
        .arg(
            arg!(--genes <GENES>)
                .required(true)
                .help("Path to the gene annotation BED file: chr, start, end, gene id"),
        )
        .arg(
            arg!(--gwas <GWAS>)
                .required(true)
                .help("Path to the GWAS ontology TSV with term, chr and pos columns"),
        )
        .arg(
            Arg::new("network-name")
                .long("network-name")
                .required(false)
                .help("Network name used in results (default: network file name)"),
        )
        .arg(
            Arg::new("gwas-name")
                .long("gwas-name")
                .required(false)
                .help("Ontology name used in results (default: GWAS file name)"),
        )
        .arg(
            arg!(--terms <TERMS>)
                .required(false)
                .num_args(1..)
                .default_value("all")
                .help("Terms to evaluate, or 'all'"),
        )
        .arg(
            arg!(--snp2gene <METHOD>)
                .required(false)
                .value_parser(["effective", "strongest"])
                .default_value("effective")
                .help("How SNPs are mapped to loci"),
        )
        .arg(
            Arg::new("candidate-window-size")
                .long("candidate-window-size")
                .required(false)
                .value_parser(value_parser!(u32))
                .help("Window in bp around every SNP when looking for candidate genes"),
        )
        .arg(
            Arg::new("candidate-flank-limit")
                .long("candidate-flank-limit")
                .required(false)
                .value_parser(value_parser!(u32))
                .default_value("2")
                .help("Maximum number of genes taken upstream and downstream of a locus"),
        )
        .arg(
            Arg::new("num-bootstraps")
                .long("num-bootstraps")
                .required(false)
                .value_parser(value_parser!(usize))
                .default_value("50")
                .help("Number of randomized density trials per term"),
        )
        .arg(
            Arg::new("strongest-attr")
                .long("strongest-attr")
                .required(false)
                .help("Numeric GWAS column used to pick the strongest SNP of a locus"),
        )
        .arg(
            Arg::new("strongest-higher")
                .long("strongest-higher")
                .action(ArgAction::SetTrue)
                .help("The strongest SNP has the highest attribute value instead of the lowest"),
        )
        .arg(
            Arg::new("gene-specific")
                .long("gene-specific")
                .action(ArgAction::SetTrue)
                .help("Report a z-score and FDR for every candidate gene instead of one p-value per term"),
        )
        .arg(
            Arg::new("fdr-step")
                .long("fdr-step")
                .required(false)
                .value_parser(value_parser!(f64))
                .default_value("0.25")
                .help("Spacing of the z-score thresholds of the FDR sweep"),
        )
        .arg(
            arg!(--seed <SEED>)
                .required(false)
                .value_parser(value_parser!(u64))
                .help("Seed of the randomized trials (default: random)"),
        )
        .arg(
            arg!(--threads <THREADS>)
                .required(false)
                .value_parser(value_parser!(usize))
                .help("Number of worker threads (default: all cores)"),
        )
        .arg(
            Arg::new("keep-going")
                .long("keep-going")
                .action(ArgAction::SetTrue)
                .help("Log and skip failing terms instead of aborting"),
        )
        .arg(
            Arg::new("no-progress")
                .long("no-progress")
                .action(ArgAction::SetTrue)
                .help("Hide the bootstrap progress bar"),
        )
        .arg(
            arg!(--config <CONFIG>)
                .required(false)
                .help("Read run parameters from a toml or yaml file instead of the flags above"),
        )
        .arg(
            arg!(--out <OUT>)
                .required(false)
                .help("Output path, the extension is replaced by .density.tsv (default: derived from the run)"),
        )
        .arg(
            arg!(--force)
                .action(ArgAction::SetTrue)
                .help("Overwrite an existing output"),
        )
}
