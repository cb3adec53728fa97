//! Functionality related to the `bamalyzer stats` command itself.

use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use prettytable::row;
use prettytable::Table;
use serde::Serialize;
use tracing::info;

use crate::pipeline::analyze_file;
use crate::pipeline::Analysis;
use crate::reports::flagstat::AlignmentSummary;
use crate::reports::idxstats::ReferenceStat;
use crate::reports::ParseDiagnostics;
use crate::utils::args::OutputFormat;
use crate::utils::args::PipelineArgs;
use crate::utils::display::CountFormat;
use crate::utils::display::CoverageFormat;
use crate::utils::display::PercentageFormat;

//========================//
// Command-line arguments //
//========================//

/// Command line arguments for `bamalyzer stats`.
#[derive(Args)]
pub struct StatsArgs {
    /// Path to the alignment file.
    #[arg(value_name = "BAM")]
    src: PathBuf,

    /// How to print the results.
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
    format: OutputFormat,

    #[command(flatten)]
    pipeline: PipelineArgs,
}

//=============//
// JSON output //
//=============//

#[derive(Serialize)]
struct Diagnostics<'a> {
    flagstat: &'a ParseDiagnostics,
    idxstats: &'a ParseDiagnostics,
}

#[derive(Serialize)]
struct StatsOutput<'a> {
    source: &'a str,
    flagstat: &'a AlignmentSummary,
    idxstats: Vec<&'a ReferenceStat>,
    diagnostics: Diagnostics<'a>,
}

/// Renders the analysis as pretty-printed JSON. References are sorted by
/// mapped reads, highest first.
pub fn to_json(analysis: &Analysis) -> anyhow::Result<String> {
    let output = StatsOutput {
        source: &analysis.source_name,
        flagstat: &analysis.summary.value,
        idxstats: analysis.references.value.sorted_by_mapped(),
        diagnostics: Diagnostics {
            flagstat: &analysis.summary.diagnostics,
            idxstats: &analysis.references.diagnostics,
        },
    };

    serde_json::to_string_pretty(&output).context("serializing statistics")
}

//==============//
// Table output //
//==============//

/// Flagstat metrics with their share of the total read count.
pub fn metrics_table(summary: &AlignmentSummary) -> Table {
    let total = summary.get("in total").unwrap_or(0);

    let mut table = Table::new();
    table.add_row(row!["Metric", "Count", "% of Total"]);
    for (description, count) in summary.iter() {
        table.add_row(row![
            description,
            CountFormat(count),
            PercentageFormat(count, total)
        ]);
    }

    table
}

/// Per-reference counts, sorted by mapped reads.
pub fn references_table(rows: &[&ReferenceStat]) -> Table {
    let mut table = Table::new();
    table.add_row(row!["Reference", "Length", "Mapped", "Unmapped", "Coverage"]);
    for row in rows {
        table.add_row(row![
            row.name(),
            CountFormat(row.length()),
            CountFormat(row.mapped()),
            CountFormat(row.unmapped()),
            CoverageFormat(row.coverage())
        ]);
    }

    table
}

fn print_tables(analysis: &Analysis) {
    let summary = &analysis.summary;
    let references = &analysis.references;

    println!("Alignment Summary:");
    println!();
    metrics_table(&summary.value).printstd();
    println!();

    println!("References:");
    println!();
    references_table(&references.value.sorted_by_mapped()).printstd();

    let skipped = summary.diagnostics.skipped() + references.diagnostics.skipped();
    if skipped > 0 {
        println!();
        println!("Skipped {} report line(s):", skipped);
        for line in summary
            .diagnostics
            .skipped_lines
            .iter()
            .chain(references.diagnostics.skipped_lines.iter())
        {
            println!("  {}: {}", line.line_number, line.line);
        }
    }
}

//==============//
// Main command //
//==============//

/// Main method for the `bamalyzer stats` subcommand.
pub fn stats(args: StatsArgs) -> anyhow::Result<()> {
    let config = args.pipeline.config()?;

    info!("analyzing {}", args.src.display());
    let analysis = analyze_file(&config, &args.src)
        .with_context(|| format!("analyzing {}", args.src.display()))?;

    match args.format {
        OutputFormat::Table => print_tables(&analysis),
        OutputFormat::Json => println!("{}", to_json(&analysis)?),
    }

    Ok(())
}
