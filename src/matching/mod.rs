//! Segment biotype classification.
//!
//! - [`SegmentMatcher`](engine::SegmentMatcher): classifies identifiers with a fixed strategy
//! - [`ClassificationLegend`](legend::ClassificationLegend): ordered pattern -> biotype table
//!
//! ## Strategies
//!
//! | Name | Legend | Rule |
//! |------|--------|------|
//! | `string_match` | required | first legend row whose pattern matches |
//! | `hyb` | unused | last `_`-delimited field of the identifier |
//! | `id_map` | required | exact identifier lookup |
//!
//! Identifiers nothing matches are classified as `"unknown"`.
//!
//! ## Example
//!
//! ```rust
//! use hyb_target::matching::engine::{MatchingConfig, SegmentMatcher, StrategyName};
//! use hyb_target::matching::legend::parse_legend_text;
//!
//! let legend = parse_legend_text("kshv-miR,kshv_microRNA\nMIMAT,microRNA\n", ',').unwrap();
//! let matcher = SegmentMatcher::from_config(MatchingConfig {
//!     strategy: Some(StrategyName::StringMatch),
//!     legend: Some(legend),
//! })
//! .unwrap();
//!
//! assert_eq!(matcher.classify("kshv-miR-K12-1"), "kshv_microRNA");
//! assert_eq!(matcher.classify("ENSG00000141510"), "unknown");
//! ```

pub mod engine;
pub mod legend;
