//! Functionality related to the `bamalyzer report` command itself.

use std::fs;
use std::path::Path;
use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use tracing::info;

use crate::dashboard::html;
use crate::dashboard::html::RenderOptions;
use crate::pipeline::analyze_file;
use crate::utils::args::PipelineArgs;
use crate::utils::pathbuf::AppendExtension;

//========================//
// Command-line arguments //
//========================//

/// Command line arguments for `bamalyzer report`.
#[derive(Args)]
pub struct ReportArgs {
    /// Path to the alignment file.
    #[arg(value_name = "BAM")]
    src: PathBuf,

    /// Where to write the dashboard. Defaults to `<BAM name>.dashboard.html`
    /// in the current directory.
    #[arg(short, long, value_name = "PATH")]
    output: Option<PathBuf>,

    #[command(flatten)]
    pipeline: PipelineArgs,
}

/// The default location of the dashboard for `src`.
pub fn default_output_path(src: &Path) -> anyhow::Result<PathBuf> {
    let file_name = src
        .file_name()
        .with_context(|| format!("{} does not name a file", src.display()))?;

    PathBuf::from(file_name).append_extension("dashboard.html")
}

//==============//
// Main command //
//==============//

/// Main method for the `bamalyzer report` subcommand.
pub fn report(args: ReportArgs) -> anyhow::Result<()> {
    let config = args.pipeline.config()?;

    let output = match args.output {
        Some(path) => path,
        None => default_output_path(&args.src)?,
    };

    info!("analyzing {}", args.src.display());
    let analysis = analyze_file(&config, &args.src)
        .with_context(|| format!("analyzing {}", args.src.display()))?;

    let page = html::render(&analysis.dashboard(config.seed), RenderOptions::default())
        .context("rendering dashboard")?;
    fs::write(&output, page)
        .with_context(|| format!("writing dashboard to {}", output.display()))?;

    info!("  [*] Dashboard written to {}", output.display());
    Ok(())
}
