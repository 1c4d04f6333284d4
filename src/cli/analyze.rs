use std::path::PathBuf;

use clap::Args;
use tracing::info;

use crate::analysis::pipeline::run_workflow;
use crate::cli::targets::print_summary;
use crate::cli::{ConfigArgs, FilterArgs, OutputFormat, ReportArgs};

#[derive(Args)]
pub struct AnalyzeArgs {
    /// Input .hyb file (optionally gzip-compressed)
    #[arg(required = true)]
    pub input: PathBuf,

    /// Directory for the filtered records and the target report
    #[arg(long, default_value = "output")]
    pub out_dir: PathBuf,

    #[command(flatten)]
    pub config: ConfigArgs,

    #[command(flatten)]
    pub filter: FilterArgs,

    #[command(flatten)]
    pub report: ReportArgs,
}

/// Execute analyze subcommand
///
/// # Errors
///
/// Returns an error if configuration is invalid or either pass fails.
#[allow(clippy::needless_pass_by_value)] // CLI entry point, values from clap
pub fn run(args: AnalyzeArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    let started = chrono::Local::now();
    info!("Starting analysis at {}", started.format("%Y-%m-%d %H:%M:%S"));

    let mut config = args.config.resolve()?;
    args.report.apply(&mut config);
    let filter = args.filter.filter()?;

    let report = run_workflow(&args.input, &args.out_dir, &config, filter.as_ref())?;

    if matches!(format, OutputFormat::Text) {
        println!("Filtered records: {}", report.outputs.filtered.display());
        println!(
            "   Kept {} of {} records",
            report.filter.written, report.filter.records
        );
        println!("Target report: {}", report.outputs.summary.display());
    }
    print_summary(
        &report.targets,
        &report.aggregation,
        format,
        args.report.top,
        verbose,
    )?;

    let finished = chrono::Local::now();
    #[allow(clippy::cast_precision_loss)] // Elapsed milliseconds
    let elapsed = (finished - started).num_milliseconds() as f64 / 1000.0;
    info!(
        "Finished at {} ({:.1}s)",
        finished.format("%Y-%m-%d %H:%M:%S"),
        elapsed
    );
    Ok(())
}
