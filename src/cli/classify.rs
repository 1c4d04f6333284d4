use std::path::PathBuf;

use clap::Args;
use tracing::info;

use crate::analysis::pipeline::{classify_records, FilterStats};
use crate::cli::{ConfigArgs, FilterArgs, OutputFormat};
use crate::parsing::hyb::{HybReader, HybWriter};

#[derive(Args)]
pub struct ClassifyArgs {
    /// Input .hyb file (optionally gzip-compressed)
    #[arg(required = true)]
    pub input: PathBuf,

    /// Output .hyb file for classified records
    #[arg(short, long)]
    pub output: PathBuf,

    #[command(flatten)]
    pub config: ConfigArgs,

    #[command(flatten)]
    pub filter: FilterArgs,
}

/// Execute classify subcommand
///
/// # Errors
///
/// Returns an error if configuration is invalid or any record fails to
/// parse, classify or write.
#[allow(clippy::needless_pass_by_value)] // CLI entry point, values from clap
pub fn run(args: ClassifyArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    let config = args.config.resolve()?;
    let filter = args.filter.filter()?;
    let matcher = config.matcher()?;
    let mirna_types = config.mirna_types();

    info!(
        "Strategy '{}', {} miRNA biotypes",
        matcher.strategy_name(),
        mirna_types.len()
    );

    let mut writer = HybWriter::create(&args.output)?;
    let stats = classify_records(
        HybReader::open(&args.input)?,
        &mut writer,
        &matcher,
        &mirna_types,
        filter.as_ref(),
    )?;
    writer.finish()?;

    info!(
        "Wrote {} of {} records to {}",
        stats.written,
        stats.records,
        args.output.display()
    );

    match format {
        OutputFormat::Text => {
            print_text_stats(&args, &stats);
            if verbose {
                println!("   Strategy: {}", matcher.strategy_name());
            }
        }
        OutputFormat::Json => print_json_stats(&args, &stats)?,
        OutputFormat::Tsv => print_tsv_stats(&args, &stats),
    }

    Ok(())
}

fn print_text_stats(args: &ClassifyArgs, stats: &FilterStats) {
    println!("Classified {} records from {}", stats.records, args.input.display());
    println!("   Written: {} -> {}", stats.written, args.output.display());
    if let (Some(property), Some(value)) = (&args.filter.property, &args.filter.value) {
        println!("   Filter: {property} = {value}");
    }
}

fn print_json_stats(args: &ClassifyArgs, stats: &FilterStats) -> anyhow::Result<()> {
    let output = serde_json::json!({
        "input": args.input.display().to_string(),
        "output": args.output.display().to_string(),
        "records": stats.records,
        "written": stats.written,
        "filter": {
            "property": args.filter.property,
            "value": args.filter.value,
        },
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn print_tsv_stats(args: &ClassifyArgs, stats: &FilterStats) {
    println!("input\toutput\trecords\twritten");
    println!(
        "{}\t{}\t{}\t{}",
        args.input.display(),
        args.output.display(),
        stats.records,
        stats.written
    );
}
