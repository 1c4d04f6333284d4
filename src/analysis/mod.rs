//! miRNA target analysis.
//!
//! - [`TargetAnalyzer`](target::TargetAnalyzer): one record -> at most one miRNA/target pair
//! - [`TargetAggregator`](aggregate::TargetAggregator): folds pairs into a [`TargetTally`](aggregate::TargetTally)
//! - [`process_tally`](summary::process_tally) / [`write_summary`](summary::write_summary): ranked report
//! - [`pipeline`]: the filter and target passes over a record source
//!
//! ## Duplexes
//!
//! A read whose two segments are both miRNA-like is a duplex. With
//! `double_count_duplexes` it is credited as seg1 -> seg2 and seg2 -> seg1;
//! without, only as seg1 -> seg2.

pub mod aggregate;
pub mod pipeline;
pub mod summary;
pub mod target;
