//! rulebridge CLI: translate an iRule file and print the migration report.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use rulebridge::mapping::MappingTable;
use rulebridge::report::MigrationReport;

#[derive(Parser, Debug)]
#[command(name = "rulebridge")]
#[command(about = "Mechanical iRule to AppShape++ migration with coverage reporting")]
#[command(version)]
struct Args {
    /// Source iRule file to translate
    source: PathBuf,

    /// External mapping table (TOML); falls back to the built-in table
    #[arg(short, long)]
    mappings: Option<PathBuf>,

    /// Print the full report as JSON instead of the human summary
    #[arg(long)]
    json: bool,

    /// Write the generated script to a file instead of inlining it
    #[arg(long)]
    script_out: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn")]
    log_level: String,
}

fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| args.log_level.parse().unwrap_or_default()),
        )
        .init();

    let table = match &args.mappings {
        Some(path) => MappingTable::load(path),
        None => MappingTable::builtin().clone(),
    };
    info!(
        table = %table.version,
        entries = table.len(),
        "mapping table ready"
    );

    let source = fs::read_to_string(&args.source)
        .with_context(|| format!("failed to read {}", args.source.display()))?;

    let report = rulebridge::translate(&source, &table);

    if let Some(path) = &args.script_out {
        fs::write(path, &report.script)
            .with_context(|| format!("failed to write {}", path.display()))?;
    }

    if args.json {
        println!("{}", report.to_json()?);
    } else {
        print_summary(&report, args.script_out.is_none());
    }

    Ok(())
}

fn print_summary(report: &MigrationReport, show_script: bool) {
    println!("status:   {}", report.status.as_str());
    println!("coverage: {:.1}%", report.coverage * 100.0);
    println!(
        "commands: {} mapped, {} unmapped",
        report.mapped_count(),
        report.unmapped.len()
    );

    if !report.diagnostics.is_empty() {
        println!("\ndiagnostics:");
        for diag in &report.diagnostics {
            println!(
                "  [{}] line {}: {}",
                diag.severity.as_str(),
                diag.line,
                diag.message
            );
        }
    }

    if !report.unmapped.is_empty() {
        println!("\nunmapped commands:");
        for record in &report.unmapped {
            println!("  line {}: {}", record.source_line, record.source_command);
        }
    }

    for reason in &report.reasons {
        println!("\nnote: {} ({})", reason.detail, reason.code);
    }

    if show_script {
        println!("\n{}", report.script);
    }
}
