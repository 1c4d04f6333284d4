use indexmap::IndexMap;
use serde::Serialize;

use crate::analysis::target::{TargetAnalyzer, TargetPair};
use crate::core::segment::Segment;
use crate::core::types::{MirnaTypes, PropertyCategory, SegmentSide};
use crate::error::{Error, Result};
use crate::matching::engine::SegmentMatcher;

pub const FLAG_SEG1_TYPE: &str = "seg1_type";
pub const FLAG_SEG2_TYPE: &str = "seg2_type";
pub const FLAG_MIRNA_SEG: &str = "mirna_seg";
pub const FLAG_TARGET_SEG: &str = "target_seg";

/// Flags computed by classification and analysis, never taken from input
pub const DERIVED_FLAGS: [&str; 4] = [
    FLAG_SEG1_TYPE,
    FLAG_SEG2_TYPE,
    FLAG_MIRNA_SEG,
    FLAG_TARGET_SEG,
];

pub fn is_derived_flag(name: &str) -> bool {
    DERIVED_FLAGS.contains(&name)
}

/// One hybrid read: two ligated segments plus metadata.
///
/// Identity and segment coordinates are fixed at construction. Only segment
/// biotypes and the flag map change afterwards, through
/// [`find_seg_types`](Self::find_seg_types) and
/// [`mirna_analysis`](Self::mirna_analysis).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HybRecord {
    id: String,
    seq: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    energy: Option<String>,
    seg1: Segment,
    seg2: Segment,
    flags: IndexMap<String, String>,
    #[serde(skip)]
    mirna_seg: Option<SegmentSide>,
}

impl HybRecord {
    pub fn new(id: impl Into<String>, seq: impl Into<String>, seg1: Segment, seg2: Segment) -> Self {
        Self {
            id: id.into(),
            seq: seq.into(),
            energy: None,
            seg1,
            seg2,
            flags: IndexMap::new(),
            mirna_seg: None,
        }
    }

    #[must_use]
    pub fn with_energy(mut self, energy: Option<String>) -> Self {
        self.energy = energy;
        self
    }

    /// Attach a passthrough flag. Derived flags are ignored since
    /// classification recomputes them.
    #[must_use]
    pub fn with_flag(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into();
        if !is_derived_flag(&name) {
            self.flags.insert(name, value.into());
        }
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn seq(&self) -> &str {
        &self.seq
    }

    pub fn energy(&self) -> Option<&str> {
        self.energy.as_deref()
    }

    pub fn seg1(&self) -> &Segment {
        &self.seg1
    }

    pub fn seg2(&self) -> &Segment {
        &self.seg2
    }

    pub fn flag(&self, name: &str) -> Option<&str> {
        self.flags.get(name).map(String::as_str)
    }

    /// All flags in insertion order
    pub fn flags(&self) -> impl Iterator<Item = (&str, &str)> {
        self.flags.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn is_classified(&self) -> bool {
        self.seg1.is_classified() && self.seg2.is_classified()
    }

    /// Classify both segments with `matcher`, overwriting earlier labels.
    ///
    /// Any previous miRNA analysis is discarded, since it was derived from
    /// the old labels.
    pub fn find_seg_types(&mut self, matcher: &SegmentMatcher) {
        let seg1_type = matcher.classify(&self.seg1.identifier).to_string();
        let seg2_type = matcher.classify(&self.seg2.identifier).to_string();

        self.flags.insert(FLAG_SEG1_TYPE.to_string(), seg1_type.clone());
        self.flags.insert(FLAG_SEG2_TYPE.to_string(), seg2_type.clone());
        self.seg1.set_biotype(seg1_type);
        self.seg2.set_biotype(seg2_type);

        self.mirna_seg = None;
        self.flags.shift_remove(FLAG_MIRNA_SEG);
        self.flags.shift_remove(FLAG_TARGET_SEG);
    }

    /// Determine which segment(s) are miRNA-like and set the
    /// `mirna_seg` / `target_seg` flags.
    ///
    /// # Errors
    ///
    /// Returns `Error::PrecursorState` if the segments were never classified.
    pub fn mirna_analysis(&mut self, mirna_types: &MirnaTypes) -> Result<()> {
        let (Some(seg1_type), Some(seg2_type)) = (self.seg1.biotype(), self.seg2.biotype()) else {
            return Err(Error::precursor(
                &self.id,
                "mirna_analysis requires find_seg_types to run first",
            ));
        };

        let mirna_seg = match (mirna_types.contains(seg1_type), mirna_types.contains(seg2_type)) {
            (true, true) => SegmentSide::Both,
            (true, false) => SegmentSide::Seg1,
            (false, true) => SegmentSide::Seg2,
            (false, false) => SegmentSide::None,
        };

        self.flags
            .insert(FLAG_MIRNA_SEG.to_string(), mirna_seg.to_string());
        self.flags.insert(
            FLAG_TARGET_SEG.to_string(),
            mirna_seg.complement().to_string(),
        );
        self.mirna_seg = Some(mirna_seg);
        Ok(())
    }

    /// Which segment(s) are miRNA-like, once analysed
    pub fn mirna_seg(&self) -> Option<SegmentSide> {
        self.mirna_seg
    }

    /// The target segment, once analysed
    pub fn target_seg(&self) -> Option<SegmentSide> {
        self.mirna_seg.map(SegmentSide::complement)
    }

    /// The (miRNA, target) relationship carried by this record
    ///
    /// # Errors
    ///
    /// Returns `Error::PrecursorState` if `mirna_analysis` has not run.
    pub fn target_pair(&self) -> Result<Option<TargetPair>> {
        TargetAnalyzer::analyze(self)
    }

    /// Evaluate a property predicate given by category name
    ///
    /// # Errors
    ///
    /// Returns `Error::UnrecognizedCategory` for unknown category names and
    /// `Error::PrecursorState` when the predicate needs state that has not
    /// been computed yet.
    pub fn has_property(&self, category: &str, value: &str) -> Result<bool> {
        let category = category.parse::<PropertyCategory>()?;
        self.check_property(category, value)
    }

    /// Evaluate a property predicate
    ///
    /// # Errors
    ///
    /// Returns `Error::PrecursorState` when `seg_type` is queried before
    /// classification or `mirna_seg` / `target_seg` before `mirna_analysis`.
    pub fn check_property(&self, category: PropertyCategory, value: &str) -> Result<bool> {
        let segs = [&self.seg1, &self.seg2];
        let found = match category {
            PropertyCategory::SegContains => segs.iter().any(|s| s.contains(value)),
            PropertyCategory::Seg1Contains => self.seg1.contains(value),
            PropertyCategory::Seg2Contains => self.seg2.contains(value),
            PropertyCategory::SegStartswith => {
                segs.iter().any(|s| s.identifier.starts_with(value))
            }
            PropertyCategory::SegEndswith => segs.iter().any(|s| s.identifier.ends_with(value)),
            PropertyCategory::SegType => {
                if !self.is_classified() {
                    return Err(Error::precursor(
                        &self.id,
                        "seg_type requires find_seg_types to run first",
                    ));
                }
                segs.iter().any(|s| s.biotype() == Some(value))
            }
            PropertyCategory::MirnaSeg | PropertyCategory::TargetSeg => {
                let side = if category == PropertyCategory::MirnaSeg {
                    self.mirna_seg()
                } else {
                    self.target_seg()
                };
                let side = side.ok_or_else(|| {
                    Error::precursor(
                        &self.id,
                        format!("{category} requires mirna_analysis to run first"),
                    )
                })?;
                side.as_str() == value
            }
        };
        Ok(found)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matching::engine::MatchStrategy;
    use crate::matching::legend::parse_legend_text;
    use std::sync::Arc;

    fn matcher() -> SegmentMatcher {
        let legend = parse_legend_text(
            "kshv-miR,kshv_microRNA\nMIMAT,microRNA\nENSG,mRNA\n",
            ',',
        )
        .unwrap();
        SegmentMatcher::new(MatchStrategy::StringMatch(Arc::new(legend)))
    }

    fn mirna_types() -> MirnaTypes {
        MirnaTypes::default().with_extra(["kshv_microRNA"])
    }

    fn record(seg1: &str, seg2: &str) -> HybRecord {
        HybRecord::new(
            "read_1",
            "ACGTACGTACGTACGTACGTACGTACGTACGT",
            Segment::new(seg1, 1, 22),
            Segment::new(seg2, 23, 60),
        )
    }

    #[test]
    fn test_find_seg_types() {
        let mut rec = record("MIMAT0000076_miR-21", "ENSG00000141510_TP53");
        assert!(!rec.is_classified());

        rec.find_seg_types(&matcher());
        assert!(rec.is_classified());
        assert_eq!(rec.seg1().biotype(), Some("microRNA"));
        assert_eq!(rec.seg2().biotype(), Some("mRNA"));
        assert_eq!(rec.flag(FLAG_SEG1_TYPE), Some("microRNA"));
        assert_eq!(rec.flag(FLAG_SEG2_TYPE), Some("mRNA"));
    }

    #[test]
    fn test_find_seg_types_is_idempotent() {
        let matcher = matcher();
        let mut rec = record("kshv-miR-K12-1", "chr5_intergenic");
        rec.find_seg_types(&matcher);
        let first = rec.clone();
        rec.find_seg_types(&matcher);
        assert_eq!(rec, first);
        assert_eq!(rec.seg2().biotype(), Some("unknown"));
    }

    #[test]
    fn test_reclassification_clears_analysis() {
        let mut rec = record("MIMAT0000076_miR-21", "ENSG00000141510_TP53");
        rec.find_seg_types(&matcher());
        rec.mirna_analysis(&mirna_types()).unwrap();
        assert_eq!(rec.mirna_seg(), Some(SegmentSide::Seg1));

        rec.find_seg_types(&matcher());
        assert_eq!(rec.mirna_seg(), None);
        assert_eq!(rec.flag(FLAG_MIRNA_SEG), None);
    }

    #[test]
    fn test_mirna_analysis_roles() {
        let cases = [
            ("MIMAT1", "ENSG1", SegmentSide::Seg1, SegmentSide::Seg2),
            ("ENSG1", "kshv-miR-K12-3", SegmentSide::Seg2, SegmentSide::Seg1),
            ("MIMAT1", "kshv-miR-K12-3", SegmentSide::Both, SegmentSide::None),
            ("ENSG1", "other", SegmentSide::None, SegmentSide::None),
        ];

        for (seg1, seg2, mirna, target) in cases {
            let mut rec = record(seg1, seg2);
            rec.find_seg_types(&matcher());
            rec.mirna_analysis(&mirna_types()).unwrap();
            assert_eq!(rec.mirna_seg(), Some(mirna), "{seg1} / {seg2}");
            assert_eq!(rec.target_seg(), Some(target), "{seg1} / {seg2}");
            assert_eq!(rec.flag(FLAG_MIRNA_SEG), Some(mirna.as_str()));
            assert_eq!(rec.flag(FLAG_TARGET_SEG), Some(target.as_str()));
        }
    }

    #[test]
    fn test_mirna_analysis_requires_classification() {
        let mut rec = record("MIMAT1", "ENSG1");
        let err = rec.mirna_analysis(&mirna_types()).unwrap_err();
        assert!(matches!(err, Error::PrecursorState { ref record, .. } if record == "read_1"));
    }

    #[test]
    fn test_unknown_biotype_is_not_a_precursor_error() {
        let mut rec = record("nothing", "matches");
        rec.find_seg_types(&matcher());
        rec.mirna_analysis(&mirna_types()).unwrap();
        assert_eq!(rec.mirna_seg(), Some(SegmentSide::None));
    }

    #[test]
    fn test_has_property_seg_contains() {
        let mut rec = record("kshv-miR-K12-1", "ENSG00000141510_TP53");
        assert!(rec.has_property("seg_contains", "kshv").unwrap());
        assert!(rec.has_property("seg_contains", "TP53").unwrap());
        assert!(!rec.has_property("seg_contains", "mRNA").unwrap());
        // Case-sensitive
        assert!(!rec.has_property("seg_contains", "KSHV").unwrap());

        rec.find_seg_types(&matcher());
        assert!(rec.has_property("seg_contains", "mRNA").unwrap());
        assert!(rec.has_property("seg1_contains", "kshv").unwrap());
        assert!(!rec.has_property("seg2_contains", "kshv").unwrap());
        assert!(rec.has_property("seg_startswith", "ENSG").unwrap());
        assert!(rec.has_property("seg_endswith", "TP53").unwrap());
        assert!(rec.has_property("seg_type", "kshv_microRNA").unwrap());
    }

    #[test]
    fn test_has_property_mirna_flags() {
        let mut rec = record("ENSG1", "MIMAT1");
        rec.find_seg_types(&matcher());
        assert!(matches!(
            rec.has_property("mirna_seg", "seg2"),
            Err(Error::PrecursorState { .. })
        ));

        rec.mirna_analysis(&mirna_types()).unwrap();
        assert!(rec.has_property("mirna_seg", "seg2").unwrap());
        assert!(!rec.has_property("mirna_seg", "seg1").unwrap());
        assert!(rec.has_property("target_seg", "seg1").unwrap());
    }

    #[test]
    fn test_has_property_seg_type_requires_classification() {
        let rec = record("MIMAT1", "ENSG1");
        assert!(matches!(
            rec.has_property("seg_type", "microRNA"),
            Err(Error::PrecursorState { .. })
        ));
    }

    #[test]
    fn test_has_property_unrecognized_category() {
        let rec = record("MIMAT1", "ENSG1");
        let err = rec.has_property("bogus", "x").unwrap_err();
        assert!(matches!(err, Error::UnrecognizedCategory(ref c) if c == "bogus"));
    }

    #[test]
    fn test_derived_flags_are_not_accepted_from_input() {
        let rec = record("MIMAT1", "ENSG1")
            .with_flag("count_total", "3")
            .with_flag(FLAG_MIRNA_SEG, "seg1");
        assert_eq!(rec.flag("count_total"), Some("3"));
        assert_eq!(rec.flag(FLAG_MIRNA_SEG), None);
        assert_eq!(rec.mirna_seg(), None);
    }
}
