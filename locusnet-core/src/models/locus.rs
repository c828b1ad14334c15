use std::collections::BTreeMap;
use std::fmt::{self, Display};

///
/// Locus struct, a trait-associated genomic signal.
///
/// Coordinates are half-open (`start..end`). The `window` extends the
/// locus on both sides when looking for candidate genes or collapsing
/// neighbouring signals. A collapsed (effective) locus keeps the signals it
/// was built from in `sub_loci`.
///
#[derive(PartialEq, Debug, Clone)]
pub struct Locus {
    pub id: String,
    pub chr: String,
    pub start: u32,
    pub end: u32,
    pub window: u32,

    pub attrs: BTreeMap<String, f64>,
    pub sub_loci: Vec<Locus>,
}

impl Locus {
    pub fn new(id: &str, chr: &str, start: u32, end: u32) -> Self {
        Locus {
            id: id.to_string(),
            chr: chr.to_string(),
            start,
            end: end.max(start.saturating_add(1)),
            window: 0,
            attrs: BTreeMap::new(),
            sub_loci: Vec::new(),
        }
    }

    ///
    /// A single base pair locus at `pos`.
    ///
    pub fn snp(id: &str, chr: &str, pos: u32) -> Self {
        Locus::new(id, chr, pos, pos.saturating_add(1))
    }

    pub fn with_attr(mut self, name: &str, value: f64) -> Self {
        self.attrs.insert(name.to_string(), value);
        self
    }

    pub fn with_window(mut self, window: u32) -> Self {
        self.window = window;
        self
    }

    pub fn attr(&self, name: &str) -> Option<f64> {
        self.attrs.get(name).copied()
    }

    /// Start of the locus extended by its window.
    pub fn window_start(&self) -> u32 {
        self.start.saturating_sub(self.window)
    }

    /// End of the locus extended by its window.
    pub fn window_end(&self) -> u32 {
        self.end.saturating_add(self.window)
    }

    ///
    /// The signals this locus represents: its sub loci when it was collapsed
    /// from several, otherwise itself.
    ///
    pub fn snps(&self) -> &[Locus] {
        if self.sub_loci.is_empty() {
            std::slice::from_ref(self)
        } else {
            &self.sub_loci
        }
    }

    ///
    /// Collapse a run of loci into a single effective locus spanning all of
    /// them. A single locus is returned unchanged.
    ///
    pub fn collapse(mut group: Vec<Locus>, window: u32) -> Option<Locus> {
        if group.len() <= 1 {
            return group.pop().map(|l| l.with_window(window));
        }

        let first = &group[0];
        let start = group.iter().map(|l| l.start).min()?;
        let end = group.iter().map(|l| l.end).max()?;

        Some(Locus {
            id: format!("{}+{}", first.id, group.len() - 1),
            chr: first.chr.clone(),
            start,
            end,
            window,
            attrs: BTreeMap::new(),
            sub_loci: group,
        })
    }
}

impl Display for Locus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}-{}", self.chr, self.start, self.end)
    }
}
