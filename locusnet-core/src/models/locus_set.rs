use std::fmt::{self, Display};

use crate::models::Locus;

///
/// LocusSet struct, the ordered loci resolved for one term.
///
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LocusSet {
    loci: Vec<Locus>,
}

impl From<Vec<Locus>> for LocusSet {
    fn from(loci: Vec<Locus>) -> Self {
        LocusSet { loci }
    }
}

impl<'a> IntoIterator for &'a LocusSet {
    type Item = &'a Locus;
    type IntoIter = std::slice::Iter<'a, Locus>;

    fn into_iter(self) -> Self::IntoIter {
        self.loci.iter()
    }
}

impl LocusSet {
    pub fn len(&self) -> usize {
        self.loci.len()
    }

    pub fn is_empty(&self) -> bool {
        self.loci.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Locus> {
        self.loci.iter()
    }

    pub fn as_slice(&self) -> &[Locus] {
        &self.loci
    }

    /// Total number of SNPs behind the (possibly collapsed) loci.
    pub fn num_snps(&self) -> usize {
        self.loci.iter().map(|l| l.snps().len()).sum()
    }
}

impl Display for LocusSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let loci: Vec<String> = self.loci.iter().map(|l| l.to_string()).collect();
        write!(f, "{}", loci.join(","))
    }
}
