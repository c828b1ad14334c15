use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use pretty_assertions::assert_eq;
use rstest::*;

#[fixture]
fn path_to_data() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("../tests/data")
        .canonicalize()
        .unwrap()
}

fn locusnet(data: &Path, cwd: &Path, extra: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_locusnet"))
        .current_dir(cwd)
        .arg("density")
        .arg("--network")
        .arg(data.join("root.coex.tsv"))
        .arg("--genes")
        .arg(data.join("genes.bed"))
        .arg("--gwas")
        .arg(data.join("ionome.gwas.tsv"))
        .arg("--no-progress")
        .args(extra)
        .output()
        .unwrap()
}

const AL27_ARGS: [&str; 10] = [
    "--terms",
    "Al27",
    "--candidate-window-size",
    "10000",
    "--candidate-flank-limit",
    "1",
    "--num-bootstraps",
    "10",
    "--seed",
    "7",
];

#[rstest]
fn test_density_derived_output(path_to_data: PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let output = locusnet(&path_to_data, dir.path(), &AL27_ARGS);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let path = dir.path().join("root.coex_ionome.gwas_10000_1_Al27.density.tsv");
    assert!(path.exists());
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), path.file_name().unwrap().to_str().unwrap());

    let content = fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[1].contains("\teffective\tionome.gwas\troot.coex\tAl27\t4\t10000\t1\t10"));
}

#[rstest]
fn test_existing_output_is_skipped(path_to_data: PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("al27.tsv");
    let mut args: Vec<&str> = AL27_ARGS.to_vec();
    args.extend(["--out", out.to_str().unwrap()]);

    let path = dir.path().join("al27.density.tsv");
    fs::write(&path, "keep me\n").unwrap();

    let output = locusnet(&path_to_data, dir.path(), &args);
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("exists! Skipping!"));
    assert_eq!(fs::read_to_string(&path).unwrap(), "keep me\n");

    args.push("--force");
    let output = locusnet(&path_to_data, dir.path(), &args);
    assert!(output.status.success());
    assert!(fs::read_to_string(&path).unwrap().starts_with("NumCollapsedSNPs"));
}

#[rstest]
fn test_missing_window_size_fails(path_to_data: PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let output = locusnet(&path_to_data, dir.path(), &["--terms", "Al27"]);

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("requires a window size"));
}

#[rstest]
fn test_unknown_term_fails(path_to_data: PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let output = locusnet(
        &path_to_data,
        dir.path(),
        &["--terms", "Al27", "Hg202", "--candidate-window-size", "10000"],
    );

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Hg202"));
}

#[rstest]
fn test_config_file(path_to_data: PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("run.toml");
    fs::write(
        &config,
        r#"
network_name = "ZmRoot"
ontology_name = "ZmIonome"
terms = ["Al27", "Cd111"]
flank_limit = 1
num_bootstraps = 10
gene_specific = true
seed = 3

[snp2gene]
method = "strongest"
window_size = 10000
attr = "pval"
"#,
    )
    .unwrap();

    let output = locusnet(
        &path_to_data,
        dir.path(),
        &["--config", config.to_str().unwrap(), "--out", "genes.tsv"],
    );
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let content = fs::read_to_string(dir.path().join("genes.density.tsv")).unwrap();
    let mut lines = content.lines();
    assert!(lines.next().unwrap().starts_with("gene\tscore\tzscore\tfdr"));
    assert!(lines.all(|l| l.contains("\tstrongest\tZmIonome\tZmRoot\t")));
}
