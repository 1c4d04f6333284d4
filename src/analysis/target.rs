use serde::Serialize;

use crate::core::record::HybRecord;
use crate::core::types::SegmentSide;
use crate::error::{Error, Result};

/// A miRNA -> target relationship carried by one hybrid read
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TargetPair {
    pub mirna: String,
    pub target: String,
    /// Both segments are miRNA-like; `mirna` is seg1 and `target` is seg2
    pub is_duplex: bool,
}

impl TargetPair {
    pub fn new(mirna: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            mirna: mirna.into(),
            target: target.into(),
            is_duplex: false,
        }
    }

    pub fn duplex(seg1: impl Into<String>, seg2: impl Into<String>) -> Self {
        Self {
            mirna: seg1.into(),
            target: seg2.into(),
            is_duplex: true,
        }
    }
}

/// Extracts miRNA/target relationships from analysed records
pub struct TargetAnalyzer;

impl TargetAnalyzer {
    /// Returns `Ok(None)` when neither segment is miRNA-like.
    ///
    /// # Errors
    ///
    /// Returns `Error::PrecursorState` if `mirna_analysis` has not run on
    /// the record.
    pub fn analyze(record: &HybRecord) -> Result<Option<TargetPair>> {
        let mirna_seg = record.mirna_seg().ok_or_else(|| {
            Error::precursor(
                record.id(),
                "target analysis requires mirna_analysis to run first",
            )
        })?;

        let (seg1, seg2) = (&record.seg1().identifier, &record.seg2().identifier);
        let pair = match mirna_seg {
            SegmentSide::Seg1 => Some(TargetPair::new(seg1, seg2)),
            SegmentSide::Seg2 => Some(TargetPair::new(seg2, seg1)),
            SegmentSide::Both => Some(TargetPair::duplex(seg1, seg2)),
            SegmentSide::None => None,
        };
        Ok(pair)
    }
}
