use clap::Parser;
use tracing_subscriber::EnvFilter;

use hyb_target::cli;

fn main() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();

    // Initialize logging based on verbosity flag
    let filter = if cli.verbose {
        EnvFilter::new("hyb_target=debug,info")
    } else {
        EnvFilter::new("hyb_target=warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .init();

    match cli.command {
        cli::Commands::Classify(args) => {
            cli::classify::run(args, cli.format, cli.verbose)?;
        }
        cli::Commands::Targets(args) => {
            cli::targets::run(args, cli.format, cli.verbose)?;
        }
        cli::Commands::Analyze(args) => {
            cli::analyze::run(args, cli.format, cli.verbose)?;
        }
    }

    Ok(())
}
