//! Co-expression networks and the trans-locus density statistic.
//!
//! [`network::CoexNetwork`] holds a weighted gene-gene edge list and
//! [`density::TransLocusDensity`] scores locus sets against it, plugging into
//! the bootstrap engine of `locusnet-density` as a
//! [`locusnet_density::DensityProvider`].
//!
pub mod density;
pub mod errors;
pub mod network;

// re-exports
pub use density::TransLocusDensity;
pub use network::CoexNetwork;
