use thiserror::Error;

#[derive(Error, Debug)]
pub enum NetworkError {
    #[error("Fewer than two loci have candidate genes in the network, no trans pairs to score")]
    NoTransPairs,

    #[error("Cannot draw {needed} random genes from a network of {available}")]
    UniverseTooSmall { needed: usize, available: usize },

    #[error("Error parsing edge on line {line}: {msg}")]
    EdgeParseError { line: usize, msg: String },

    #[error("Corrupted file. 0 edges found in the file: {0}")]
    EmptyNetwork(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
