use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::core::segment::UNKNOWN_BIOTYPE;
use crate::error::{Error, Result};
use crate::matching::legend::ClassificationLegend;

/// Names of the available classification strategies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
#[value(rename_all = "snake_case")]
pub enum StrategyName {
    /// First legend entry whose pattern matches the identifier
    StringMatch,
    /// Biotype is the final `_`-delimited field of the identifier
    Hyb,
    /// Exact identifier lookup in the legend
    IdMap,
}

impl StrategyName {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::StringMatch => "string_match",
            Self::Hyb => "hyb",
            Self::IdMap => "id_map",
        }
    }

    fn needs_legend(self) -> bool {
        matches!(self, Self::StringMatch | Self::IdMap)
    }
}

impl std::fmt::Display for StrategyName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A classification strategy together with the reference data it needs
#[derive(Debug, Clone)]
pub enum MatchStrategy {
    StringMatch(Arc<ClassificationLegend>),
    Hyb,
    IdMap(Arc<HashMap<String, String>>),
}

impl MatchStrategy {
    /// Build an exact-lookup strategy from a legend. Earlier rows win on duplicate identifiers.
    pub fn id_map(legend: &ClassificationLegend) -> Self {
        let mut map = HashMap::with_capacity(legend.len());
        for entry in legend.entries() {
            map.entry(entry.pattern.clone())
                .or_insert_with(|| entry.biotype.clone());
        }
        Self::IdMap(Arc::new(map))
    }

    pub fn name(&self) -> StrategyName {
        match self {
            Self::StringMatch(_) => StrategyName::StringMatch,
            Self::Hyb => StrategyName::Hyb,
            Self::IdMap(_) => StrategyName::IdMap,
        }
    }

    /// Classify `identifier`, returning [`UNKNOWN_BIOTYPE`] when nothing matches
    pub fn classify<'a>(&'a self, identifier: &'a str) -> &'a str {
        let found = match self {
            Self::StringMatch(legend) => legend.first_match(identifier),
            Self::Hyb => identifier
                .rsplit_once('_')
                .map(|(_, suffix)| suffix)
                .filter(|suffix| !suffix.is_empty()),
            Self::IdMap(map) => map.get(identifier).map(String::as_str),
        };
        found.unwrap_or(UNKNOWN_BIOTYPE)
    }
}

/// Settings a [`SegmentMatcher`] is built from
#[derive(Debug, Clone, Default)]
pub struct MatchingConfig {
    pub strategy: Option<StrategyName>,
    pub legend: Option<ClassificationLegend>,
}

/// Assigns biotypes to segment identifiers.
///
/// The strategy is fixed when the matcher is built, so every record in a
/// run is classified the same way.
#[derive(Debug, Clone)]
pub struct SegmentMatcher {
    strategy: MatchStrategy,
}

impl SegmentMatcher {
    pub fn new(strategy: MatchStrategy) -> Self {
        Self { strategy }
    }

    /// Build a matcher from configuration
    ///
    /// # Errors
    ///
    /// Returns `Error::Configuration` if no strategy is selected, or if a
    /// legend-backed strategy is selected without a legend.
    pub fn from_config(config: MatchingConfig) -> Result<Self> {
        let name = config.strategy.ok_or_else(|| {
            Error::Configuration("no segment classification strategy selected".to_string())
        })?;

        let strategy = match (name, config.legend) {
            (StrategyName::StringMatch, Some(legend)) => {
                MatchStrategy::StringMatch(Arc::new(legend))
            }
            (StrategyName::IdMap, Some(legend)) => MatchStrategy::id_map(&legend),
            (StrategyName::Hyb, legend) => {
                if legend.is_some() {
                    warn!("Legend is ignored by the 'hyb' classification strategy");
                }
                MatchStrategy::Hyb
            }
            (name, None) => {
                debug_assert!(name.needs_legend());
                return Err(Error::Configuration(format!(
                    "strategy '{name}' requires a classification legend"
                )));
            }
        };

        Ok(Self::new(strategy))
    }

    pub fn strategy_name(&self) -> StrategyName {
        self.strategy.name()
    }

    pub fn classify<'a>(&'a self, identifier: &'a str) -> &'a str {
        self.strategy.classify(identifier)
    }
}
