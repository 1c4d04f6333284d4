//! Analysis configuration.
//!
//! Settings can come from a JSON file and are then overridden by
//! command-line flags:
//!
//! ```json
//! {
//!   "strategy": "string_match",
//!   "legend": "string_match_legend.csv",
//!   "mirna_types": ["kshv_microRNA"],
//!   "double_count_duplexes": true
//! }
//! ```
//!
//! A relative `legend` path is resolved against the config file's directory.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::core::types::MirnaTypes;
use crate::error::{Error, Result};
use crate::matching::engine::{MatchingConfig, SegmentMatcher, StrategyName};
use crate::matching::legend::ClassificationLegend;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnalysisConfig {
    /// Segment classification strategy
    pub strategy: Option<StrategyName>,

    /// Legend file for `string_match` and `id_map`
    pub legend: Option<PathBuf>,

    /// Field delimiter of the legend file
    pub legend_delimiter: char,

    /// Biotypes treated as miRNA-like in addition to `miRNA` and `microRNA`
    pub mirna_types: Vec<String>,

    /// Credit duplex reads in both directions
    pub double_count_duplexes: bool,

    /// Field separator for summary reports
    pub separator: char,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            strategy: None,
            legend: None,
            legend_delimiter: ',',
            mirna_types: Vec::new(),
            double_count_duplexes: false,
            separator: ',',
        }
    }
}

impl AnalysisConfig {
    /// Load configuration from a JSON file
    ///
    /// # Errors
    ///
    /// Returns `Error::Io` if the file cannot be read, or
    /// `Error::Configuration` if it is not valid configuration JSON.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::io(e, path))?;
        let mut config: Self = serde_json::from_str(&content).map_err(|e| {
            Error::Configuration(format!("invalid config file {}: {e}", path.display()))
        })?;

        if let (Some(legend), Some(dir)) = (config.legend.as_ref(), path.parent()) {
            if legend.is_relative() {
                config.legend = Some(dir.join(legend));
            }
        }

        Ok(config)
    }

    /// Build the segment matcher, loading the legend if one is configured
    ///
    /// # Errors
    ///
    /// Returns `Error::Configuration` if no strategy is selected or a
    /// required legend is missing, and legend loading errors otherwise.
    pub fn matcher(&self) -> Result<SegmentMatcher> {
        let legend = self
            .legend
            .as_deref()
            .map(|path| ClassificationLegend::load(path, self.legend_delimiter))
            .transpose()?;

        SegmentMatcher::from_config(MatchingConfig {
            strategy: self.strategy,
            legend,
        })
    }

    /// Default miRNA biotypes plus the configured extras
    pub fn mirna_types(&self) -> MirnaTypes {
        MirnaTypes::default().with_extra(self.mirna_types.iter().cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn test_load_config_resolves_legend() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("legend.csv"), "MIMAT,microRNA\n").unwrap();

        let config_path = dir.path().join("config.json");
        let mut file = std::fs::File::create(&config_path).unwrap();
        write!(
            file,
            r#"{{"strategy": "string_match", "legend": "legend.csv", "mirna_types": ["kshv_microRNA"], "double_count_duplexes": true}}"#
        )
        .unwrap();

        let config = AnalysisConfig::load(&config_path).unwrap();
        assert_eq!(config.strategy, Some(StrategyName::StringMatch));
        assert_eq!(config.legend, Some(dir.path().join("legend.csv")));
        assert!(config.double_count_duplexes);
        assert_eq!(config.separator, ',');
        assert!(config.mirna_types().contains("kshv_microRNA"));
        assert!(config.mirna_types().contains("miRNA"));

        let matcher = config.matcher().unwrap();
        assert_eq!(matcher.classify("MIMAT0000062"), "microRNA");
    }

    #[test]
    fn test_unknown_field_is_configuration_error() {
        let dir = TempDir::new().unwrap();
        let config_path = dir.path().join("config.json");
        std::fs::write(&config_path, r#"{"stratgey": "hyb"}"#).unwrap();

        let err = AnalysisConfig::load(&config_path).unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
    }

    #[test]
    fn test_default_has_no_strategy() {
        let err = AnalysisConfig::default().matcher().unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
    }
}
