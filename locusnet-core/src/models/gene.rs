///
/// Gene struct, one annotated gene of a reference genome
///
#[derive(Eq, PartialEq, Hash, Debug, Clone)]
pub struct Gene {
    pub id: String,
    pub chr: String,
    pub start: u32,
    pub end: u32,
}

impl Gene {
    pub fn new(id: &str, chr: &str, start: u32, end: u32) -> Self {
        Gene {
            id: id.to_string(),
            chr: chr.to_string(),
            start,
            end,
        }
    }

    ///
    /// Whether the gene overlaps the half-open interval `start..end` on `chr`
    ///
    pub fn overlaps(&self, chr: &str, start: u32, end: u32) -> bool {
        self.chr == chr && self.start < end && start < self.end
    }
}
