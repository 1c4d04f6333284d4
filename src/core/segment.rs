use serde::Serialize;

/// Biotype assigned to a segment that no classification rule matched
pub const UNKNOWN_BIOTYPE: &str = "unknown";

/// One half of a hybrid read
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Segment {
    /// Name of the reference sequence the segment aligned to
    pub identifier: String,

    /// Start offset of the segment within the read (1-based, inclusive)
    pub read_start: u64,

    /// End offset of the segment within the read
    pub read_end: u64,

    /// Alignment start on the reference
    pub ref_start: u64,

    /// Alignment end on the reference
    pub ref_end: u64,

    /// Alignment score as written by the mapper (e-values are kept verbatim)
    pub score: String,

    /// `None` until classification has been attempted
    #[serde(skip_serializing_if = "Option::is_none")]
    biotype: Option<String>,
}

impl Segment {
    pub fn new(identifier: impl Into<String>, read_start: u64, read_end: u64) -> Self {
        Self {
            identifier: identifier.into(),
            read_start,
            read_end,
            ref_start: 0,
            ref_end: 0,
            score: ".".to_string(),
            biotype: None,
        }
    }

    #[must_use]
    pub fn with_reference(mut self, ref_start: u64, ref_end: u64, score: impl Into<String>) -> Self {
        self.ref_start = ref_start;
        self.ref_end = ref_end;
        self.score = score.into();
        self
    }

    /// The classified biotype, or `None` if classification never ran.
    ///
    /// A segment that was classified but matched nothing reports
    /// [`UNKNOWN_BIOTYPE`], which is distinct from `None`.
    pub fn biotype(&self) -> Option<&str> {
        self.biotype.as_deref()
    }

    pub fn is_classified(&self) -> bool {
        self.biotype.is_some()
    }

    pub(crate) fn set_biotype(&mut self, biotype: impl Into<String>) {
        self.biotype = Some(biotype.into());
    }

    /// Check if the identifier or (once classified) the biotype contains `value`
    pub fn contains(&self, value: &str) -> bool {
        self.identifier.contains(value) || self.biotype().is_some_and(|b| b.contains(value))
    }
}
