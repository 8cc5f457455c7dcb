//! cocomerge: merge per-class COCO detection datasets into one.
//!
//! Each input dataset is a folder with one subfolder per split (`train`,
//! `valid`, `test`), each holding images and a COCO manifest. The merge
//! produces the same layout under an output folder, with one category list
//! shared by all splits, images renamed `<dataset>_<file>` and all IDs
//! renumbered.
//!
//! # Modules
//!
//! - [`coco`]: manifest types and JSON I/O
//! - [`merge`]: the category table and the per-split merge
//! - [`config`]: merge configuration and YAML loading
//! - [`validation`]: consistency checks for manifests
//! - [`error`]: error types

pub mod coco;
pub mod config;
pub mod discover;
pub mod error;
pub mod logging;
pub mod merge;
pub mod validation;

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

pub use error::CocomergeError;

/// The cocomerge CLI application.
#[derive(Parser)]
#[command(name = "cocomerge")]
#[command(version, about)]
#[command(propagate_version = true)]
struct Cli {
    /// More log output (repeatable).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Less log output (repeatable).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    quiet: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Merge several COCO datasets into one.
    Merge(MergeArgs),
    /// Validate a COCO manifest.
    Validate(ValidateArgs),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum ReportFormat {
    Text,
    Json,
}

#[derive(clap::Args)]
struct MergeArgs {
    /// Dataset folders, in merge order.
    datasets: Vec<PathBuf>,

    /// Output folder for the merged dataset.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// YAML config file; flags override its values.
    #[arg(long, env = "COCOMERGE_CONFIG")]
    config: Option<PathBuf>,

    /// Also merge every subfolder of this directory (sorted by name).
    #[arg(long)]
    discover: Option<PathBuf>,

    /// Split to merge (repeatable; default: train, valid, test).
    #[arg(long = "split")]
    splits: Vec<String>,

    /// Manifest file name inside each input split folder.
    #[arg(long)]
    input_manifest: Option<String>,

    /// Manifest file name written to each output split folder.
    #[arg(long)]
    output_manifest: Option<String>,

    /// Supercategory for categories that declare none.
    #[arg(long)]
    default_supercategory: Option<String>,

    /// Validate every written manifest.
    #[arg(long)]
    validate: bool,

    /// With --validate, treat warnings as errors.
    #[arg(long, requires = "validate")]
    strict: bool,

    /// Report format.
    #[arg(long, value_enum, default_value = "text")]
    report: ReportFormat,
}

#[derive(clap::Args)]
struct ValidateArgs {
    /// Manifest file to validate.
    input: PathBuf,

    /// Treat warnings as errors.
    #[arg(long)]
    strict: bool,

    /// Report format.
    #[arg(long, value_enum, default_value = "text")]
    report: ReportFormat,
}

/// Run the cocomerge CLI. Called from `main.rs`.
pub fn run() -> Result<(), CocomergeError> {
    let cli = Cli::parse();
    let verbosity = cli.verbose.min(100) as i8 - cli.quiet.min(100) as i8;
    logging::init(verbosity);

    match cli.command {
        Some(Commands::Merge(args)) => run_merge(args),
        Some(Commands::Validate(args)) => run_validate(args),
        None => {
            println!("cocomerge {}", env!("CARGO_PKG_VERSION"));
            println!();
            println!("Merge per-class COCO datasets into one.");
            println!();
            println!("Run 'cocomerge --help' for usage information.");
            Ok(())
        }
    }
}

/// Builds the merge config: file first, then flags on top.
fn build_merge_config(args: &MergeArgs) -> Result<config::MergeConfig, CocomergeError> {
    let mut merge_config = match &args.config {
        Some(path) => config::load_config(path)?,
        None => config::MergeConfig::default(),
    };

    if !args.datasets.is_empty() {
        merge_config.datasets = args.datasets.clone();
    }
    if let Some(output) = &args.output {
        merge_config.output = output.clone();
    }
    if !args.splits.is_empty() {
        merge_config.splits = args.splits.clone();
    }
    if let Some(name) = &args.input_manifest {
        merge_config.input_manifest = name.clone();
    }
    if let Some(name) = &args.output_manifest {
        merge_config.output_manifest = name.clone();
    }
    if let Some(name) = &args.default_supercategory {
        merge_config.default_supercategory = name.clone();
    }
    if let Some(root) = &args.discover {
        let found = discover::discover_datasets(root, &merge_config.output)?;
        discover::append_discovered(&mut merge_config.datasets, found);
    }

    Ok(merge_config)
}

fn run_merge(args: MergeArgs) -> Result<(), CocomergeError> {
    let merge_config = build_merge_config(&args)?;

    let mut report = merge::MergeReport::new();
    let summary = merge::merge_datasets(&merge_config, &mut report)?;

    match args.report {
        ReportFormat::Json => println!("{}", to_json(&report)?),
        ReportFormat::Text => print!("{}", report),
    }

    if args.validate {
        let opts = validation::ValidateOptions {
            strict: args.strict,
        };
        for split in &summary.splits {
            let manifest = coco::io::read_manifest(&split.manifest_path)?;
            let validation_report = validation::validate_manifest(&manifest, &opts);
            if args.report == ReportFormat::Text {
                print!("{}: {}", split.split, validation_report);
            }
            if opts.fails(&validation_report) {
                return Err(validation_failed(validation_report));
            }
        }
    }

    Ok(())
}

fn run_validate(args: ValidateArgs) -> Result<(), CocomergeError> {
    let manifest = coco::io::read_manifest(&args.input)?;
    let opts = validation::ValidateOptions {
        strict: args.strict,
    };
    let report = validation::validate_manifest(&manifest, &opts);

    match args.report {
        ReportFormat::Json => {
            let body = serde_json::json!({
                "error_count": report.error_count(),
                "warning_count": report.warning_count(),
                "issues": report.issues,
            });
            println!("{}", to_json(&body)?);
        }
        ReportFormat::Text => print!("{}", report),
    }

    if opts.fails(&report) {
        Err(validation_failed(report))
    } else {
        Ok(())
    }
}

fn validation_failed(report: validation::ValidationReport) -> CocomergeError {
    CocomergeError::ValidationFailed {
        error_count: report.error_count(),
        warning_count: report.warning_count(),
        report,
    }
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String, CocomergeError> {
    serde_json::to_string_pretty(value).map_err(|e| CocomergeError::Io(e.into()))
}
