//! Record-processing passes.
//!
//! The full workflow runs two passes over the data:
//!
//! 1. **Filter pass**: classify every record, run miRNA analysis, and write
//!    the records matching a property filter to an intermediate `.hyb` file.
//! 2. **Target pass**: re-read that file, classify and analyse again, and
//!    fold every record into a [`TargetAggregator`].
//!
//! Both passes are strict left folds over the input order.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::analysis::aggregate::{AggregationStats, TargetAggregator};
use crate::analysis::summary::{process_tally, write_summary, ProcessedTargets};
use crate::config::AnalysisConfig;
use crate::core::record::HybRecord;
use crate::core::types::{MirnaTypes, PropertyCategory};
use crate::error::{Error, Result};
use crate::matching::engine::SegmentMatcher;
use crate::parsing::hyb::{HybReader, HybWriter};

/// Keep records for which `category` holds with `value`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyFilter {
    pub category: PropertyCategory,
    pub value: String,
}

impl PropertyFilter {
    /// # Errors
    ///
    /// Returns `Error::UnrecognizedCategory` for an unknown category name.
    pub fn new(category: &str, value: impl Into<String>) -> Result<Self> {
        Ok(Self {
            category: category.parse()?,
            value: value.into(),
        })
    }

    /// # Errors
    ///
    /// Propagates `Error::PrecursorState` from the record.
    pub fn matches(&self, record: &HybRecord) -> Result<bool> {
        record.check_property(self.category, &self.value)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FilterStats {
    pub records: u64,
    pub written: u64,
}

/// Classify and analyse every record, writing those that pass `filter`
/// (all of them when `filter` is `None`).
///
/// # Errors
///
/// Stops at the first read, parse, analysis or write error.
pub fn classify_records<I>(
    records: I,
    writer: &mut HybWriter,
    matcher: &SegmentMatcher,
    mirna_types: &MirnaTypes,
    filter: Option<&PropertyFilter>,
) -> Result<FilterStats>
where
    I: IntoIterator<Item = Result<HybRecord>>,
{
    let mut stats = FilterStats::default();

    for record in records {
        let mut record = record?;
        stats.records += 1;

        record.find_seg_types(matcher);
        record.mirna_analysis(mirna_types)?;

        let keep = match filter {
            Some(filter) => filter.matches(&record)?,
            None => true,
        };
        if keep {
            writer.write_record(&record)?;
            stats.written += 1;
        }
    }

    Ok(stats)
}

/// Classify, analyse and aggregate every record
///
/// # Errors
///
/// Stops at the first read, parse or analysis error.
pub fn aggregate_targets<I>(
    records: I,
    matcher: &SegmentMatcher,
    mirna_types: &MirnaTypes,
    double_count_duplexes: bool,
) -> Result<TargetAggregator>
where
    I: IntoIterator<Item = Result<HybRecord>>,
{
    let mut aggregator = TargetAggregator::new();

    for record in records {
        let mut record = record?;
        record.find_seg_types(matcher);
        record.mirna_analysis(mirna_types)?;
        aggregator.record_hybrid(&record, double_count_duplexes)?;
    }

    Ok(aggregator)
}

/// Output locations of the two-pass workflow
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorkflowOutputs {
    pub filtered: PathBuf,
    pub summary: PathBuf,
}

impl WorkflowOutputs {
    /// `<out_dir>/<stem>_<label>.hyb` and `.csv`, where `stem` is the input
    /// file name without `.hyb` / `.hyb.gz`
    pub fn for_input(input: &Path, out_dir: &Path, filter: Option<&PropertyFilter>) -> Self {
        let name = input
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "records".to_string());
        let base = name.strip_suffix(".gz").unwrap_or(&name);
        let stem = base.strip_suffix(".hyb").unwrap_or(base);

        let label = match filter {
            Some(filter) => format!("{}_only", sanitize_label(&filter.value)),
            None => "all".to_string(),
        };

        Self {
            filtered: out_dir.join(format!("{stem}_{label}.hyb")),
            summary: out_dir.join(format!("{stem}_{label}.csv")),
        }
    }
}

fn sanitize_label(value: &str) -> String {
    let label: String = value
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if label.is_empty() {
        "filtered".to_string()
    } else {
        label
    }
}

/// Result of [`run_workflow`]
#[derive(Debug, Clone, Serialize)]
pub struct WorkflowReport {
    pub outputs: WorkflowOutputs,
    pub filter: FilterStats,
    pub aggregation: AggregationStats,
    pub targets: ProcessedTargets,
}

/// Run the filter pass then the target pass, writing both outputs
///
/// # Errors
///
/// Returns configuration, IO, parse and analysis errors as they occur.
pub fn run_workflow(
    input: &Path,
    out_dir: &Path,
    config: &AnalysisConfig,
    filter: Option<&PropertyFilter>,
) -> Result<WorkflowReport> {
    let matcher = config.matcher()?;
    let mirna_types = config.mirna_types();
    info!(
        "Classifying segments with '{}' ({} miRNA biotypes)",
        matcher.strategy_name(),
        mirna_types.len()
    );

    if !out_dir.is_dir() {
        info!("Creating output directory {}", out_dir.display());
        std::fs::create_dir_all(out_dir).map_err(|e| Error::io(e, out_dir))?;
    }

    let outputs = WorkflowOutputs::for_input(input, out_dir, filter);

    info!("Filter pass: {} -> {}", input.display(), outputs.filtered.display());
    let mut writer = HybWriter::create(&outputs.filtered)?;
    let filter_stats = classify_records(
        HybReader::open(input)?,
        &mut writer,
        &matcher,
        &mirna_types,
        filter,
    )?;
    writer.finish()?;
    info!(
        "Kept {} of {} records",
        filter_stats.written, filter_stats.records
    );
    if filter_stats.written == 0 {
        warn!("No records passed the filter; the target report will be empty");
    }

    info!("Target pass over {}", outputs.filtered.display());
    let aggregator = aggregate_targets(
        HybReader::open(&outputs.filtered)?,
        &matcher,
        &mirna_types,
        config.double_count_duplexes,
    )?;
    let aggregation = aggregator.stats();
    debug!(
        "{} pairs ({} duplexes), {} records without a miRNA",
        aggregation.pairs, aggregation.duplexes, aggregation.not_applicable
    );

    let targets = process_tally(aggregator.tally());
    write_summary(&outputs.summary, &targets, config.separator)?;
    info!(
        "Wrote {} miRNAs ({} total target counts) to {}",
        targets.counts.len(),
        targets.total_count,
        outputs.summary.display()
    );

    Ok(WorkflowReport {
        outputs,
        filter: filter_stats,
        aggregation,
        targets,
    })
}
