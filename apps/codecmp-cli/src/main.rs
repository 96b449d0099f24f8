//! Building Code Additions CLI
//!
//! Compares a base building code against supplemental city codes and
//! reports the sections each supplement adds, removes, or modifies.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use comparison_engine::{
    run_comparison, ConsoleReporter, CsvInventory, EngineConfig, JsonReporter, SupplementalInput,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "codecmp")]
#[command(
    version,
    about = "Building code additions: compare a base code against supplemental city codes"
)]
struct Args {
    /// Base building code document, e.g. 2022 CA Plumbing Code
    #[arg(short = 'b', long)]
    base_document: PathBuf,

    /// Supplemental building code documents, e.g. 2022 SF Plumbing
    #[arg(short = 's', long = "supplemental", required = true, num_args = 1..)]
    supplemental: Vec<PathBuf>,

    /// Labels for the supplemental documents, in order
    /// (defaults to "City 1", "City 2", ...)
    #[arg(long = "label")]
    labels: Vec<String>,

    /// Label for the base document
    #[arg(long, default_value = "State")]
    base_label: String,

    /// Engine configuration TOML file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output format: text or json
    #[arg(long, default_value = "text")]
    format: String,

    /// Write the report to a file instead of stdout
    #[arg(short = 'o', long)]
    output: Option<PathBuf>,

    /// Also write a CSV inventory of parsed section numbers
    #[arg(long)]
    dataset: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if args.labels.len() > args.supplemental.len() {
        anyhow::bail!(
            "{} labels given for {} supplemental documents",
            args.labels.len(),
            args.supplemental.len()
        );
    }

    let config = match &args.config {
        Some(path) => EngineConfig::from_file(path)?,
        None => EngineConfig::default(),
    };

    let inputs: Vec<SupplementalInput> = args
        .supplemental
        .iter()
        .enumerate()
        .map(|(i, path)| {
            let label = args
                .labels
                .get(i)
                .cloned()
                .unwrap_or_else(|| format!("City {}", i + 1));
            SupplementalInput::new(label, path)
        })
        .collect();

    // An unreadable base is fatal; unreadable supplementals surface inside
    // the report and leave the exit code at zero.
    let report = run_comparison(&args.base_document, &args.base_label, &inputs, &config)
        .with_context(|| {
            format!(
                "cannot compare without base document {}",
                args.base_document.display()
            )
        })?;

    if report.failure_count() > 0 {
        tracing::warn!(
            "{} supplemental document(s) could not be read; see report",
            report.failure_count()
        );
    }

    let rendered = match args.format.as_str() {
        "text" => ConsoleReporter::format(&report)?,
        "json" => JsonReporter::format(&report, true)?,
        other => {
            eprintln!("Unknown format: {}. Use 'text' or 'json'", other);
            std::process::exit(2);
        }
    };

    match &args.output {
        Some(path) => {
            std::fs::write(path, &rendered)
                .with_context(|| format!("Failed to write report to {}", path.display()))?;
            tracing::info!("Report written to {}", path.display());
        }
        None => print!("{}", rendered),
    }

    if let Some(path) = &args.dataset {
        std::fs::write(path, CsvInventory::format(&report))
            .with_context(|| format!("Failed to write CSV to {}", path.display()))?;
        println!("finished writing CSV to {}", path.display());
    }

    Ok(())
}
