use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use survey_sidecar::curate::CurationConfig;
use survey_sidecar::output::OutputFormat;
use survey_sidecar::run::{run, RunOptions, RunOutcome};
use survey_sidecar::schema::RunStatus;

#[derive(Parser, Debug)]
#[command(
    name = "svcat",
    version,
    about = "Sidecar metadata catalog generator for geospatial survey datasets"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Extract complete and curated metadata records per artifact
    Extract(RunArgs),
    /// Extract, then aggregate everything into a survey-level catalog
    Catalog(RunArgs),
}

#[derive(Parser, Debug)]
struct RunArgs {
    /// Input directory scanned for *.raw.json extractor sidecars
    #[arg(long, value_name = "DIR", default_value = "data")]
    input_dir: PathBuf,

    /// Specific sidecar files to process instead of scanning the input dir
    #[arg(long, value_name = "PATH", num_args = 1..)]
    files: Vec<PathBuf>,

    /// Output directory for metadata records and catalogs
    #[arg(long, value_name = "DIR", default_value = "output")]
    output_dir: PathBuf,

    /// Output format for every written record
    #[arg(long, value_enum, default_value_t = OutputFormat::Both)]
    format: OutputFormat,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Extract(args) => cmd_run(args, false),
        Commands::Catalog(args) => cmd_run(args, true),
    }
}

fn cmd_run(args: RunArgs, build_catalog: bool) -> Result<()> {
    let options = RunOptions {
        input_dir: args.input_dir,
        files: args.files,
        output_dir: args.output_dir.clone(),
        format: args.format,
        build_catalog,
        curation: CurationConfig::default(),
    };
    let outcome = run(&options)?;
    print_summary(&outcome);
    println!("Outputs written to {}", args.output_dir.display());
    Ok(())
}

fn print_summary(outcome: &RunOutcome) {
    println!(
        "Processed {} artifacts: {} ok, {} skipped",
        outcome.report.processed, outcome.report.succeeded, outcome.report.skipped
    );
    for artifact in &outcome.report.artifacts {
        match artifact.status {
            RunStatus::Ok => println!("  ok     {}", artifact.source_path.display()),
            RunStatus::Failed => println!(
                "  failed {}: {}",
                artifact.source_path.display(),
                artifact.reason.as_deref().unwrap_or("unknown reason")
            ),
        }
    }
    if let Some(catalog) = &outcome.catalog {
        println!(
            "Survey catalog: {} files, {} points, {} artifact types",
            catalog.catalog_info.total_files,
            catalog.catalog_info.total_points,
            catalog.artifact_count_by_type.len()
        );
    }
}
