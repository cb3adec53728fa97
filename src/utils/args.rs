//! Utilities related to the parsing of arguments.

use std::fmt::Display;
use std::time::Duration;

use anyhow::Context;
use clap::Args;
use tracing::debug;

use crate::pipeline::PipelineConfig;
use crate::reports::ParsePolicy;
use crate::samtools::Samtools;

//=====================//
// Shared pipeline args //
//=====================//

/// Utility method to parse the timeout passed in on the command line and
/// ensure it is a positive number of seconds.
pub fn timeout_in_range(timeout_raw: &str) -> Result<u64, String> {
    let timeout: u64 = timeout_raw
        .parse()
        .map_err(|_| format!("{} isn't a whole number of seconds", timeout_raw))?;

    match timeout {
        0 => Err(String::from("Timeout must be at least one second")),
        _ => Ok(timeout),
    }
}

/// Arguments shared by every subcommand that runs the analysis pipeline.
#[derive(Args, Clone, Debug)]
pub struct PipelineArgs {
    /// Command used to invoke samtools. Split on whitespace, so wrappers such
    /// as `conda run -n bio samtools` are allowed.
    #[arg(
        long,
        value_name = "COMMAND",
        env = "BAMALYZER_SAMTOOLS",
        default_value = "samtools"
    )]
    pub samtools: String,

    /// Maximum number of seconds to wait for each samtools invocation.
    #[arg(
        long,
        value_name = "SECONDS",
        env = "BAMALYZER_TIMEOUT",
        default_value = "300",
        value_parser = timeout_in_range
    )]
    pub timeout: u64,

    /// Seed for the random number generator behind the illustrative charts.
    #[arg(long, value_name = "U64", default_value = "42")]
    pub seed: u64,

    /// Fail on report lines with an unexpected shape instead of skipping them.
    #[arg(long)]
    pub strict: bool,
}

impl PipelineArgs {
    /// Builds the pipeline configuration described by these arguments.
    pub fn config(&self) -> anyhow::Result<PipelineConfig> {
        let samtools =
            Samtools::from_command_line(&self.samtools, Duration::from_secs(self.timeout))
                .with_context(|| "the samtools command must not be empty")?;

        let policy = match self.strict {
            true => ParsePolicy::Strict,
            false => ParsePolicy::Permissive,
        };

        debug!("  [*] Samtools command: {}", self.samtools);
        debug!("  [*] Timeout: {}s", self.timeout);
        debug!("  [*] Parse policy: {:?}", policy);
        debug!("  [*] Seed: {}", self.seed);

        Ok(PipelineConfig {
            samtools,
            policy,
            seed: self.seed,
        })
    }
}

//===============//
// Output format //
//===============//

/// An enum representing how the `stats` subcommand prints its results.
#[derive(clap::ValueEnum, Clone, Copy, Debug, Default)]
pub enum OutputFormat {
    /// Human readable tables.
    #[default]
    Table,

    /// Pretty-printed JSON.
    Json,
}

impl Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Table => write!(f, "table"),
            Self::Json => write!(f, "json"),
        }
    }
}
