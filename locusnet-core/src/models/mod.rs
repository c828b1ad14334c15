pub mod gene;
pub mod locus;
pub mod locus_set;

// re-export for cleaner imports
pub use self::gene::Gene;
pub use self::locus::Locus;
pub use self::locus_set::LocusSet;
