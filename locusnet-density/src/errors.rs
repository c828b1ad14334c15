use thiserror::Error;

/// Errors raised by the collaborators the engine consumes (locus resolution,
/// density computation). They are carried through unchanged.
pub type UpstreamError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Error, Debug)]
pub enum DensityError {
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Bootstrap standard deviation is zero, z-scores are undefined")]
    ZeroVariance,

    #[error("Non-finite {name}: {value}")]
    NonFiniteStatistic { name: &'static str, value: f64 },

    #[error("Real density sample contains no genes")]
    EmptyRealSample,

    #[error("No usable bootstrap trials out of {0}")]
    EmptyBootstrap(usize),

    #[error("Expected a {expected} density sample")]
    MismatchedSample { expected: &'static str },

    #[error(transparent)]
    Upstream(#[from] UpstreamError),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
