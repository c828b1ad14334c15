use thiserror::Error;

#[derive(Error, Debug)]
pub enum OntologyError {
    #[error("Term not found in {ontology}: {term}")]
    TermNotFound { ontology: String, term: String },

    #[error("Locus {locus} has no attribute '{attr}'")]
    MissingAttribute { locus: String, attr: String },

    #[error("Missing required column in GWAS file: {0}")]
    MissingColumn(String),

    #[error("Error parsing GWAS record on line {line}: {msg}")]
    RecordParseError { line: u64, msg: String },

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[derive(Error, Debug)]
pub enum RefGenError {
    #[error("Locus set is empty")]
    EmptyLocusSet,

    #[error("No candidate genes found near {0}")]
    NoCandidateGenes(String),

    #[error("Error parsing gene: {0}")]
    GeneParseError(String),

    #[error("Corrupted file. 0 genes found in the file: {0}")]
    EmptyAnnotation(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
