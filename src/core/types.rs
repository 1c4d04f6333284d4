use std::collections::HashSet;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Which segment(s) of a hybrid read a role applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SegmentSide {
    Seg1,
    Seg2,
    Both,
    None,
}

impl SegmentSide {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Seg1 => "seg1",
            Self::Seg2 => "seg2",
            Self::Both => "both",
            Self::None => "none",
        }
    }

    /// The opposite segment when exactly one side is selected, `None` otherwise
    #[must_use]
    pub fn complement(self) -> Self {
        match self {
            Self::Seg1 => Self::Seg2,
            Self::Seg2 => Self::Seg1,
            Self::Both | Self::None => Self::None,
        }
    }
}

impl std::fmt::Display for SegmentSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Set of biotype labels treated as microRNA-like during analysis
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MirnaTypes(HashSet<String>);

/// Biotypes considered microRNA-like unless the caller says otherwise
pub const DEFAULT_MIRNA_TYPES: [&str; 2] = ["miRNA", "microRNA"];

impl Default for MirnaTypes {
    fn default() -> Self {
        Self::new(DEFAULT_MIRNA_TYPES)
    }
}

impl MirnaTypes {
    /// Build a set containing exactly the given labels
    pub fn new<I, S>(types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(types.into_iter().map(Into::into).collect())
    }

    /// Default set extended with additional labels
    #[must_use]
    pub fn with_extra<I, S>(mut self, extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.0.extend(extra.into_iter().map(Into::into));
        self
    }

    pub fn contains(&self, biotype: &str) -> bool {
        self.0.contains(biotype)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Recognized categories for [`HybRecord::has_property`](crate::core::record::HybRecord::has_property)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyCategory {
    /// Either segment's identifier or biotype contains the value
    SegContains,
    Seg1Contains,
    Seg2Contains,
    /// Either segment's identifier starts with the value
    SegStartswith,
    /// Either segment's identifier ends with the value
    SegEndswith,
    /// Either segment's biotype equals the value
    SegType,
    MirnaSeg,
    TargetSeg,
}

impl PropertyCategory {
    pub const ALL: [Self; 8] = [
        Self::SegContains,
        Self::Seg1Contains,
        Self::Seg2Contains,
        Self::SegStartswith,
        Self::SegEndswith,
        Self::SegType,
        Self::MirnaSeg,
        Self::TargetSeg,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::SegContains => "seg_contains",
            Self::Seg1Contains => "seg1_contains",
            Self::Seg2Contains => "seg2_contains",
            Self::SegStartswith => "seg_startswith",
            Self::SegEndswith => "seg_endswith",
            Self::SegType => "seg_type",
            Self::MirnaSeg => "mirna_seg",
            Self::TargetSeg => "target_seg",
        }
    }
}

impl FromStr for PropertyCategory {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| Error::UnrecognizedCategory(s.to_string()))
    }
}

impl std::fmt::Display for PropertyCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
