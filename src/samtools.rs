//! Invocation of the external `samtools` binary.
//!
//! Three subcommands are run against the same file, in order:
//!
//! 1. `samtools index`, which writes `<file>.bai` alongside the file. Any
//!    failure here aborts the request.
//! 2. `samtools flagstat`, which produces the summary report.
//! 3. `samtools idxstats`, which produces the per-reference report.
//!
//! The report invocations only fail the request when they exit unsuccessfully
//! _and_ produce no output. Every invocation is bounded by a timeout, after
//! which the child process is killed.

use std::ffi::OsString;
use std::path::Path;
use std::process::Output;
use std::process::Stdio;
use std::time::Duration;
use std::time::Instant;

use tokio::process::Command;
use tracing::debug;
use tracing::info;
use tracing::warn;

use crate::errors::Error;
use crate::errors::ToolStep;
use crate::utils::pathbuf::AppendExtension;

/// The raw text of both reports for a single file.
#[derive(Clone, Debug, Default)]
pub struct RawReports {
    /// Output of `samtools flagstat`.
    pub flagstat: String,

    /// Output of `samtools idxstats`.
    pub idxstats: String,
}

/// A configured `samtools` executable.
#[derive(Clone, Debug)]
pub struct Samtools {
    program: OsString,
    leading_args: Vec<OsString>,
    timeout: Duration,
}

impl Samtools {
    /// Creates a runner from a command line such as `samtools` or
    /// `conda run -n bio samtools`. The command line is split on whitespace.
    ///
    /// Returns `None` if the command line is blank.
    pub fn from_command_line(command_line: &str, timeout: Duration) -> Option<Self> {
        let mut parts = command_line.split_whitespace().map(OsString::from);
        let program = parts.next()?;

        Some(Self {
            program,
            leading_args: parts.collect(),
            timeout,
        })
    }

    /// The bounded wait applied to each invocation.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Indexes `bam` and collects both reports for it.
    pub fn run(&self, bam: &Path) -> Result<RawReports, Error> {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;

        rt.block_on(self.run_all(bam))
    }

    async fn run_all(&self, bam: &Path) -> Result<RawReports, Error> {
        info!("indexing {}", bam.display());
        let output = self.invoke(ToolStep::Index, bam).await?;
        if !output.status.success() {
            return Err(Error::tool_failed(
                ToolStep::Index,
                output.status,
                &output.stderr,
            ));
        }

        if let Ok(bai) = bam.to_path_buf().append_extension("bai") {
            debug!("  [*] Index: {} (exists: {})", bai.display(), bai.exists());
        }

        info!("collecting flagstat report");
        let flagstat = self.report(ToolStep::Flagstat, bam).await?;

        info!("collecting idxstats report");
        let idxstats = self.report(ToolStep::Idxstats, bam).await?;

        Ok(RawReports { flagstat, idxstats })
    }

    /// Runs a read-only report step, tolerating a failed exit when output was produced.
    async fn report(&self, step: ToolStep, bam: &Path) -> Result<String, Error> {
        let output = self.invoke(step, bam).await?;
        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();

        if !output.status.success() {
            if stdout.trim().is_empty() {
                return Err(Error::tool_failed(step, output.status, &output.stderr));
            }

            warn!(
                "{} exited with {} but produced output; continuing. stderr: {}",
                step,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }

        Ok(stdout)
    }

    async fn invoke(&self, step: ToolStep, bam: &Path) -> Result<Output, Error> {
        let mut command = Command::new(&self.program);
        command
            .args(&self.leading_args)
            .arg(step.subcommand())
            .arg(bam)
            .stdin(Stdio::null())
            .kill_on_drop(true);

        debug!("  [*] Running: {:?}", command.as_std());
        let start = Instant::now();

        let output = match tokio::time::timeout(self.timeout, command.output()).await {
            Ok(result) => result.map_err(|e| Error::ToolExecution {
                step,
                status: String::from("could not be started"),
                stderr: format!("{}: {}", self.program.to_string_lossy(), e),
            })?,
            Err(_) => {
                return Err(Error::ToolTimeout {
                    step,
                    seconds: self.timeout.as_secs(),
                })
            }
        };

        debug!(
            "  [*] {} finished with {} in {:.2}s",
            step,
            output.status,
            start.elapsed().as_secs_f64()
        );

        Ok(output)
    }
}

#[cfg(all(test, unix))]
mod tests {
    use std::fs;
    use std::path::PathBuf;

    use tempfile::TempDir;

    use super::*;

    const FLAGSTAT: &str = "10 + 0 in total (QC-passed reads + QC-failed reads)";
    const IDXSTATS: &str = "chr1\\t100\\t10\\t0";

    /// Writes a shell script standing in for samtools. Each argument is the
    /// body of the `case` arm for the matching subcommand.
    fn fake_samtools(dir: &TempDir, index: &str, flagstat: &str, idxstats: &str) -> PathBuf {
        let script = format!(
            "case \"$1\" in\n\
             index) {}\n;;\n\
             flagstat) {}\n;;\n\
             idxstats) {}\n;;\n\
             esac\n",
            index, flagstat, idxstats
        );

        let path = dir.path().join("samtools.sh");
        fs::write(&path, script).unwrap();
        path
    }

    fn runner(script: &Path, seconds: u64) -> Samtools {
        let command_line = format!("sh {}", script.display());
        Samtools::from_command_line(&command_line, Duration::from_secs(seconds)).unwrap()
    }

    fn bam(dir: &TempDir) -> PathBuf {
        let path = dir.path().join("sample.bam");
        fs::write(&path, b"BAM\x01").unwrap();
        path
    }

    #[test]
    fn test_blank_command_line_is_rejected() {
        assert!(Samtools::from_command_line("   ", Duration::from_secs(1)).is_none());
    }

    #[test]
    fn test_collects_both_reports() {
        let dir = TempDir::new().unwrap();
        let script = fake_samtools(
            &dir,
            "touch \"$2.bai\"",
            &format!("printf '{}\\n'", FLAGSTAT),
            &format!("printf '{}\\n'", IDXSTATS),
        );
        let bam = bam(&dir);

        let reports = runner(&script, 30).run(&bam).unwrap();

        assert_eq!(reports.flagstat.trim(), FLAGSTAT);
        assert_eq!(reports.idxstats.trim(), "chr1\t100\t10\t0");
        assert!(dir.path().join("sample.bam.bai").exists());
    }

    #[test]
    fn test_index_failure_aborts_with_diagnostics() {
        let dir = TempDir::new().unwrap();
        let script = fake_samtools(
            &dir,
            "echo 'NO_COOR reads not in a single block' >&2; exit 1",
            "echo 'should not run'",
            "echo 'should not run'",
        );
        let bam = bam(&dir);

        let err = runner(&script, 30).run(&bam).unwrap_err();
        match err {
            Error::ToolExecution {
                step,
                status,
                stderr,
            } => {
                assert_eq!(step, ToolStep::Index);
                assert_eq!(status, "exit code 1");
                assert!(stderr.contains("NO_COOR"));
            }
            e => panic!("unexpected error: {}", e),
        }
    }

    #[test]
    fn test_failed_report_with_output_is_kept() {
        let dir = TempDir::new().unwrap();
        let script = fake_samtools(
            &dir,
            "true",
            &format!("printf '{}\\n'; echo 'truncated file' >&2; exit 1", FLAGSTAT),
            &format!("printf '{}\\n'", IDXSTATS),
        );
        let bam = bam(&dir);

        let reports = runner(&script, 30).run(&bam).unwrap();
        assert_eq!(reports.flagstat.trim(), FLAGSTAT);
    }

    #[test]
    fn test_failed_report_without_output_is_an_error() {
        let dir = TempDir::new().unwrap();
        let script = fake_samtools(
            &dir,
            "true",
            &format!("printf '{}\\n'", FLAGSTAT),
            "echo 'fail to load index' >&2; exit 1",
        );
        let bam = bam(&dir);

        let err = runner(&script, 30).run(&bam).unwrap_err();
        match err {
            Error::ToolExecution { step, stderr, .. } => {
                assert_eq!(step, ToolStep::Idxstats);
                assert_eq!(stderr, "fail to load index");
            }
            e => panic!("unexpected error: {}", e),
        }
    }

    #[test]
    fn test_slow_invocation_times_out() {
        let dir = TempDir::new().unwrap();
        let script = fake_samtools(&dir, "true", "sleep 10", "true");
        let bam = bam(&dir);

        let start = Instant::now();
        let err = runner(&script, 1).run(&bam).unwrap_err();

        assert!(matches!(
            err,
            Error::ToolTimeout {
                step: ToolStep::Flagstat,
                seconds: 1
            }
        ));
        assert!(start.elapsed() < Duration::from_secs(10));
    }

    #[test]
    fn test_missing_executable() {
        let dir = TempDir::new().unwrap();
        let bam = bam(&dir);
        let samtools = Samtools::from_command_line(
            "/nonexistent/bamalyzer/samtools",
            Duration::from_secs(5),
        )
        .unwrap();

        let err = samtools.run(&bam).unwrap_err();
        assert!(matches!(
            err,
            Error::ToolExecution {
                step: ToolStep::Index,
                ..
            }
        ));
    }
}
