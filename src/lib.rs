//! # hyb-target
//!
//! A library for classifying hybrid reads and identifying miRNA targets.
//!
//! Hybrid reads are sequencing reads formed by two ligated RNA fragments,
//! typically a miRNA and the transcript it binds. Each read is stored as one
//! `.hyb` record with two segments. Once every segment carries a biotype,
//! reads with a miRNA-like segment reveal a miRNA -> target relationship.
//!
//! `hyb-target` classifies segments, filters records by their properties, and
//! ranks targets per miRNA across a whole file.
//!
//! ## Features
//!
//! - **Pluggable classification**: string-match legend, identifier suffix, or exact id map
//! - **Property queries**: `seg_contains`, `seg_type`, `mirna_seg`, `target_seg`, ...
//! - **Duplex handling**: miRNA-miRNA reads optionally credited in both directions
//! - **Ranked reports**: miRNAs and their targets sorted by descending count
//! - **Streaming**: records are processed one at a time, gzip input supported
//!
//! ## Example
//!
//! ```rust
//! use hyb_target::{HybRecord, MirnaTypes, Segment, SegmentMatcher, TargetAggregator};
//! use hyb_target::analysis::summary::process_tally;
//! use hyb_target::matching::engine::{MatchingConfig, StrategyName};
//!
//! let matcher = SegmentMatcher::from_config(MatchingConfig {
//!     strategy: Some(StrategyName::Hyb),
//!     legend: None,
//! })
//! .unwrap();
//! let mirna_types = MirnaTypes::default();
//!
//! let mut record = HybRecord::new(
//!     "read_1",
//!     "ACGT",
//!     Segment::new("MIMAT0000062_MirBase_let-7a_microRNA", 1, 22),
//!     Segment::new("ENSG00000136997_ENST00000377970_MYC_mRNA", 23, 60),
//! );
//! record.find_seg_types(&matcher);
//! record.mirna_analysis(&mirna_types).unwrap();
//!
//! let mut aggregator = TargetAggregator::new();
//! aggregator.record_hybrid(&record, false).unwrap();
//!
//! let processed = process_tally(aggregator.tally());
//! assert_eq!(processed.total_count, 1);
//! ```
//!
//! ## Modules
//!
//! - [`core`]: Segments, hybrid records, and shared vocabulary
//! - [`matching`]: Segment classification strategies and legends
//! - [`analysis`]: Target identification, aggregation, and reporting
//! - [`parsing`]: `.hyb` reader and writer
//! - [`config`]: JSON analysis configuration
//! - [`cli`]: Command-line interface implementation

pub mod analysis;
pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod matching;
pub mod parsing;

// Re-export commonly used types for convenience
pub use analysis::aggregate::{TargetAggregator, TargetTally};
pub use analysis::summary::ProcessedTargets;
pub use analysis::target::{TargetAnalyzer, TargetPair};
pub use config::AnalysisConfig;
pub use core::record::HybRecord;
pub use core::segment::Segment;
pub use core::types::*;
pub use error::{Error, Result};
pub use matching::engine::SegmentMatcher;
