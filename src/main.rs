use clap::CommandFactory;
use clap::FromArgMatches;
use clap::Parser;
use clap::Subcommand;
use git_testament::git_testament;
use git_testament::render_testament;

use bamalyzer::report;
use bamalyzer::serve;
use bamalyzer::stats;

git_testament!(TESTAMENT);

#[derive(Subcommand)]
enum Subcommands {
    /// Serves the upload page and dashboard over HTTP.
    Serve(serve::command::ServeArgs),

    /// Writes the dashboard for an alignment file to an HTML file.
    Report(report::command::ReportArgs),

    /// Prints the parsed statistics for an alignment file.
    Stats(stats::command::StatsArgs),
}

#[derive(Parser)]
#[command(name = "bamalyzer", author, propagate_version = true)]
#[command(about = "Summarizes BAM files with samtools and presents the results as a dashboard.")]
struct Cli {
    #[command(subcommand)]
    subcommand: Subcommands,

    /// Only errors are printed to the stderr stream.
    #[arg(short, long, global = true)]
    quiet: bool,

    /// All available information, including debug information, is printed to
    /// stderr.
    #[arg(short, long, global = true)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let version = render_testament!(TESTAMENT);
    let matches = Cli::command().version(version).get_matches();
    let cli = Cli::from_arg_matches(&matches)?;

    let mut level = tracing::Level::INFO;
    if cli.quiet {
        level = tracing::Level::ERROR;
    } else if cli.verbose {
        level = tracing::Level::DEBUG;
    }

    let subscriber = tracing_subscriber::fmt::Subscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);

    match cli.subcommand {
        Subcommands::Serve(args) => serve::command::serve(args),
        Subcommands::Report(args) => report::command::report(args),
        Subcommands::Stats(args) => stats::command::stats(args),
    }
}
