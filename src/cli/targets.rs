//! Targets command - rank miRNA targets across a `.hyb` file.
//!
//! Every record is classified and analysed, then folded into a running
//! tally. The ranked tally is written to a delimited report and a short
//! summary is printed to stdout.

use std::path::PathBuf;

use clap::Args;
use tracing::{debug, info};

use crate::analysis::aggregate::AggregationStats;
use crate::analysis::pipeline::aggregate_targets;
use crate::analysis::summary::{process_tally, write_mirna_counts, write_summary, ProcessedTargets};
use crate::cli::{ConfigArgs, OutputFormat, ReportArgs};
use crate::parsing::hyb::HybReader;

#[derive(Args)]
pub struct TargetsArgs {
    /// Input .hyb file (optionally gzip-compressed)
    #[arg(required = true)]
    pub input: PathBuf,

    /// Output report (miRNA, target, count)
    #[arg(short, long)]
    pub output: PathBuf,

    /// Also write per-miRNA totals to this file
    #[arg(long)]
    pub mirna_counts: Option<PathBuf>,

    #[command(flatten)]
    pub config: ConfigArgs,

    #[command(flatten)]
    pub report: ReportArgs,
}

/// Execute targets subcommand
///
/// # Errors
///
/// Returns an error if configuration is invalid, the input cannot be read
/// or parsed, or a report cannot be written.
#[allow(clippy::needless_pass_by_value)] // CLI entry point, values from clap
pub fn run(args: TargetsArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    let mut config = args.config.resolve()?;
    args.report.apply(&mut config);

    let matcher = config.matcher()?;
    let mirna_types = config.mirna_types();
    info!(
        "Analysing targets in {} (strategy '{}', double-count duplexes: {})",
        args.input.display(),
        matcher.strategy_name(),
        config.double_count_duplexes
    );

    let aggregator = aggregate_targets(
        HybReader::open(&args.input)?,
        &matcher,
        &mirna_types,
        config.double_count_duplexes,
    )?;
    let stats = aggregator.stats();
    debug!(
        "{} records: {} pairs, {} duplexes, {} without a miRNA",
        stats.records, stats.pairs, stats.duplexes, stats.not_applicable
    );

    let processed = process_tally(aggregator.tally());
    write_summary(&args.output, &processed, config.separator)?;
    info!("Wrote target report to {}", args.output.display());

    if let Some(path) = &args.mirna_counts {
        write_mirna_counts(path, &processed, config.separator)?;
        info!("Wrote miRNA totals to {}", path.display());
    }

    print_summary(&processed, &stats, format, args.report.top, verbose)?;
    Ok(())
}

/// Print a ranked summary to stdout
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn print_summary(
    processed: &ProcessedTargets,
    stats: &AggregationStats,
    format: OutputFormat,
    top: usize,
    verbose: bool,
) -> anyhow::Result<()> {
    match format {
        OutputFormat::Text => print_text_summary(processed, stats, top, verbose),
        OutputFormat::Json => print_json_summary(processed, stats, top)?,
        OutputFormat::Tsv => print_tsv_summary(processed, top),
    }
    Ok(())
}

fn print_text_summary(
    processed: &ProcessedTargets,
    stats: &AggregationStats,
    top: usize,
    verbose: bool,
) {
    println!("\nTarget Analysis");
    println!("{}", "=".repeat(60));
    println!(
        "   Records: {} ({} with a miRNA, {} duplexes)",
        stats.records, stats.pairs, stats.duplexes
    );
    println!(
        "   miRNAs: {}   Total target count: {}",
        processed.counts.len(),
        processed.total_count
    );

    if processed.is_empty() {
        println!("\n   No miRNA-target pairs found.");
        return;
    }

    println!();
    for (rank, entry) in processed.sorted.iter().take(top).enumerate() {
        println!(
            "{:>3}. {} ({} reads, {} targets)",
            rank + 1,
            entry.mirna,
            entry.total,
            entry.targets.len()
        );
        if verbose {
            for target in entry.targets.iter().take(5) {
                println!("        {:>6}  {}", target.count, target.target);
            }
        }
    }

    if processed.sorted.len() > top {
        println!("   ... {} more", processed.sorted.len() - top);
    }
}

fn print_json_summary(
    processed: &ProcessedTargets,
    stats: &AggregationStats,
    top: usize,
) -> anyhow::Result<()> {
    let mirnas: Vec<_> = processed.sorted.iter().take(top).collect();
    let output = serde_json::json!({
        "stats": stats,
        "total_count": processed.total_count,
        "mirna_count": processed.counts.len(),
        "mirnas": mirnas,
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn print_tsv_summary(processed: &ProcessedTargets, top: usize) {
    println!("rank\tmirna\ttotal\ttargets\ttop_target\ttop_target_count");
    for (rank, entry) in processed.sorted.iter().take(top).enumerate() {
        let (best, best_count) = entry
            .targets
            .first()
            .map_or(("", 0), |t| (t.target.as_str(), t.count));
        println!(
            "{}\t{}\t{}\t{}\t{}\t{}",
            rank + 1,
            entry.mirna,
            entry.total,
            entry.targets.len(),
            best,
            best_count
        );
    }
}
