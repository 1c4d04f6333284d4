//! Command-line interface for hyb-target.
//!
//! This module implements the CLI using clap. Available commands:
//!
//! - **classify**: Classify segments and write annotated (optionally filtered) records
//! - **targets**: Aggregate miRNA targets from a `.hyb` file into a ranked report
//! - **analyze**: Filter records by a property, then run target analysis on the result
//!
//! ## Usage
//!
//! ```text
//! # Classify with a string-match legend and keep only KSHV reads
//! hyb-target classify reads.hyb -o kshv.hyb \
//!     --strategy string_match --legend string_match_legend.csv \
//!     --property seg_contains --value kshv
//!
//! # Ranked targets, counting duplexes in both directions
//! hyb-target targets kshv.hyb -o kshv.csv --strategy hyb --double-count-duplexes
//!
//! # Whole workflow from a config file
//! hyb-target analyze reads.hyb --out-dir output --config analysis.json \
//!     --property seg_contains --value kshv
//! ```

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::analysis::pipeline::PropertyFilter;
use crate::config::AnalysisConfig;
use crate::error::Result;
use crate::matching::engine::StrategyName;

pub mod analyze;
pub mod classify;
pub mod targets;

#[derive(Parser)]
#[command(name = "hyb-target")]
#[command(author = "Fulcrum Genomics")]
#[command(version)]
#[command(about = "Classify hybrid reads and rank miRNA targets")]
#[command(
    long_about = "hyb-target reads .hyb hybrid-read files, classifies each segment by biotype, and identifies miRNA-target relationships.\n\nIt provides:\n- Pluggable segment classification (string-match legend, identifier suffix, exact id map)\n- Property filters over classified records\n- Ranked per-miRNA target counts with optional duplex double counting"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format for the report printed to stdout
    #[arg(short, long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Classify segments and write annotated records
    Classify(classify::ClassifyArgs),

    /// Aggregate miRNA targets into a ranked report
    Targets(targets::TargetsArgs),

    /// Filter records, then analyse targets of the filtered set
    Analyze(analyze::AnalyzeArgs),
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
    Tsv,
}

/// Classification settings shared by every command
#[derive(clap::Args, Debug)]
pub struct ConfigArgs {
    /// JSON configuration file; the flags below override its values
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Segment classification strategy
    #[arg(short, long, value_enum)]
    pub strategy: Option<StrategyName>,

    /// Classification legend (required by string_match and id_map)
    #[arg(short, long)]
    pub legend: Option<PathBuf>,

    /// Legend field delimiter (default ',')
    #[arg(long)]
    pub legend_delimiter: Option<char>,

    /// Additional biotype treated as miRNA-like (repeatable)
    #[arg(long = "mirna-type", value_name = "BIOTYPE")]
    pub mirna_types: Vec<String>,
}

impl ConfigArgs {
    /// Load the config file, if any, and apply command-line overrides
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be read or parsed.
    pub fn resolve(&self) -> Result<AnalysisConfig> {
        let mut config = match &self.config {
            Some(path) => AnalysisConfig::load(path)?,
            None => AnalysisConfig::default(),
        };

        if self.strategy.is_some() {
            config.strategy = self.strategy;
        }
        if self.legend.is_some() {
            config.legend.clone_from(&self.legend);
        }
        if let Some(delimiter) = self.legend_delimiter {
            config.legend_delimiter = delimiter;
        }
        config.mirna_types.extend(self.mirna_types.iter().cloned());

        Ok(config)
    }
}

/// Target report settings
#[derive(clap::Args, Debug)]
pub struct ReportArgs {
    /// Credit miRNA-miRNA duplexes in both directions
    /// (`--double-count-duplexes=false` overrides a config file)
    #[arg(
        long,
        value_name = "BOOL",
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true"
    )]
    pub double_count_duplexes: Option<bool>,

    /// Field separator for the report file (default ',')
    #[arg(long)]
    pub separator: Option<char>,

    /// Number of miRNAs shown in the stdout report
    #[arg(short = 'n', long, default_value = "10")]
    pub top: usize,
}

impl ReportArgs {
    pub fn apply(&self, config: &mut AnalysisConfig) {
        if let Some(double_count) = self.double_count_duplexes {
            config.double_count_duplexes = double_count;
        }
        if let Some(separator) = self.separator {
            config.separator = separator;
        }
    }
}

/// Optional property filter
#[derive(clap::Args, Debug)]
pub struct FilterArgs {
    /// Property category: seg_contains, seg1_contains, seg2_contains,
    /// seg_startswith, seg_endswith, seg_type, mirna_seg, target_seg
    #[arg(long, requires = "value")]
    pub property: Option<String>,

    /// Value the property is tested against
    #[arg(long, requires = "property")]
    pub value: Option<String>,
}

impl FilterArgs {
    /// # Errors
    ///
    /// Returns `Error::UnrecognizedCategory` for an unknown category.
    pub fn filter(&self) -> Result<Option<PropertyFilter>> {
        match (&self.property, &self.value) {
            (Some(category), Some(value)) => PropertyFilter::new(category, value.clone()).map(Some),
            _ => Ok(None),
        }
    }
}
