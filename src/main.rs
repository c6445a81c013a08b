//! kmzkit - bulk KMZ ground-overlay expansion

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "kmzkit")]
#[command(version, about = "Bulk KMZ ground-overlay expansion", long_about = None)]
#[command(after_help = "EXAMPLES:
    kmzkit tiles/ out/          Process every subfolder of tiles/ into out/

Each subfolder must contain one .kmz (the template container) and the .png
overlays to expand it across. The result is '<subfolder> - transparent.kmz'.")]
struct Cli {
    /// Folder whose subfolders are the units to process
    #[arg(value_name = "INPUT_DIR")]
    input: String,

    /// Destination folder for the transformed .kmz files
    #[arg(value_name = "OUTPUT_DIR")]
    output: String,

    /// Only log warnings and errors
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Log per-overlay detail
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_level = if cli.quiet {
        "warn"
    } else if cli.verbose {
        "debug"
    } else {
        "info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_target(false)
        .init();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> kmzkit::Result<()> {
    std::fs::create_dir_all(&cli.output)?;
    let summary = kmzkit::process_root(&cli.input, &cli.output)?;
    if !cli.quiet {
        println!(
            "Processed {} of {} subfolders. KMZ files are in: {}",
            summary.processed,
            summary.total(),
            cli.output
        );
    }
    Ok(())
}
