use std::path::Path;

use anyhow::{Context, Result};
use clap::ArgMatches;
use log::{debug, info};

use locusnet_coex::{CoexNetwork, TransLocusDensity};
use locusnet_core::ontology::Ontology;
use locusnet_core::refgen::RefGen;
use locusnet_core::utils::dataset_name;
use locusnet_density::config::{DEFAULT_FDR_STEP, DEFAULT_FLANK_LIMIT, DEFAULT_NUM_BOOTSTRAPS};
use locusnet_density::{DensityConfig, RunOutcome, Snp2GeneMethod, TermSelection};

fn required<'a>(matches: &'a ArgMatches, name: &str) -> Result<&'a String> {
    matches
        .get_one::<String>(name)
        .with_context(|| format!("--{} is required", name))
}

///
/// Build the run configuration from the command line flags.
///
fn config_from_matches(matches: &ArgMatches, network: &Path, gwas: &Path) -> Result<DensityConfig> {
    let method = required(matches, "snp2gene")?;
    let snp2gene = Snp2GeneMethod::from_parts(
        method,
        matches.get_one::<u32>("candidate-window-size").copied(),
        matches.get_one::<String>("strongest-attr").map(String::as_str),
        matches.get_flag("strongest-higher"),
    )?;

    let network_name = matches
        .get_one::<String>("network-name")
        .cloned()
        .unwrap_or_else(|| dataset_name(network));
    let ontology_name = matches
        .get_one::<String>("gwas-name")
        .cloned()
        .unwrap_or_else(|| dataset_name(gwas));

    let mut config = DensityConfig::new(&network_name, &ontology_name, snp2gene);
    config.terms = TermSelection::from(
        matches
            .get_many::<String>("terms")
            .map(|terms| terms.cloned().collect::<Vec<String>>())
            .unwrap_or_default(),
    );
    config.flank_limit = matches
        .get_one::<u32>("candidate-flank-limit")
        .copied()
        .unwrap_or(DEFAULT_FLANK_LIMIT);
    config.num_bootstraps = matches
        .get_one::<usize>("num-bootstraps")
        .copied()
        .unwrap_or(DEFAULT_NUM_BOOTSTRAPS);
    config.gene_specific = matches.get_flag("gene-specific");
    config.fdr_step = matches
        .get_one::<f64>("fdr-step")
        .copied()
        .unwrap_or(DEFAULT_FDR_STEP);
    config.seed = matches.get_one::<u64>("seed").copied();
    config.threads = matches.get_one::<usize>("threads").copied();
    config.keep_going = matches.get_flag("keep-going");

    Ok(config)
}

pub fn run_density(matches: &ArgMatches) -> Result<()> {
    let network_path = Path::new(required(matches, "network")?);
    let genes_path = Path::new(required(matches, "genes")?);
    let gwas_path = Path::new(required(matches, "gwas")?);

    let mut config = match matches.get_one::<String>("config") {
        Some(path) => DensityConfig::from_file(Path::new(path))?,
        None => config_from_matches(matches, network_path, gwas_path)?,
    };
    if matches.get_flag("no-progress") {
        config.progress = false;
    }
    debug!("Density config: {:?}", config);

    let out = matches.get_one::<String>("out").map(Path::new);
    let force = matches.get_flag("force");

    let outcome = locusnet_density::run_density(&config, out, force, || {
        info!("Loading GWAS ontology from {}", gwas_path.display());
        let ontology = Ontology::try_from(gwas_path)
            .with_context(|| format!("Failed to load GWAS file: {}", gwas_path.display()))?;
        let refgen = RefGen::try_from(genes_path)
            .with_context(|| format!("Failed to load gene annotation: {}", genes_path.display()))?;
        info!("Loading co-expression network from {}", network_path.display());
        let network = CoexNetwork::try_from(network_path)
            .with_context(|| format!("Failed to load network: {}", network_path.display()))?;
        info!(
            "Loaded {} terms, {} genes and a network of {} genes",
            ontology.len(),
            refgen.len(),
            network.num_genes()
        );

        let provider = TransLocusDensity::new(network, refgen, config.seed);
        info!("Bootstrapping with seed {}", provider.seed());

        Ok((ontology, provider))
    })?;

    if let RunOutcome::Written { path, .. } = outcome {
        println!("{}", path.display());
    }

    Ok(())
}
