//! The end-to-end analysis of a single alignment file.
//!
//! Each request gets its own scratch directory. The file is written into it,
//! samtools indexes and summarizes it there, and the directory (index
//! included) is removed when the request ends, whether it succeeded or not.

use std::fs::File;
use std::io;
use std::io::Read;
use std::path::Path;

use tracing::debug;
use tracing::info;

use crate::dashboard;
use crate::dashboard::Dashboard;
use crate::errors::Error;
use crate::reports::flagstat;
use crate::reports::flagstat::AlignmentSummary;
use crate::reports::idxstats;
use crate::reports::idxstats::ReferenceTable;
use crate::reports::ParsePolicy;
use crate::reports::Parsed;
use crate::samtools::RawReports;
use crate::samtools::Samtools;

/// File name used when an upload does not carry a usable one.
const DEFAULT_FILE_NAME: &str = "upload.bam";

/// Everything needed to analyze a file.
#[derive(Clone, Debug)]
pub struct PipelineConfig {
    /// The samtools runner.
    pub samtools: Samtools,

    /// How both parsers treat lines with an unexpected shape.
    pub policy: ParsePolicy,

    /// Seed for the illustrative charts.
    pub seed: u64,
}

/// The parsed results for one file.
#[derive(Clone, Debug)]
pub struct Analysis {
    /// Name of the analyzed file.
    pub source_name: String,

    /// The reports exactly as samtools produced them.
    pub raw: RawReports,

    /// The parsed flagstat report.
    pub summary: Parsed<AlignmentSummary>,

    /// The parsed idxstats report.
    pub references: Parsed<ReferenceTable>,
}

impl Analysis {
    /// Builds the dashboard for this analysis.
    pub fn dashboard(&self, seed: u64) -> Dashboard {
        dashboard::build(
            &self.source_name,
            &self.raw.flagstat,
            &self.summary,
            &self.references,
            seed,
        )
    }
}

/// Reduces a client-supplied name to a bare file name.
pub fn sanitize_file_name(name: &str) -> String {
    let name = name
        .rsplit(|c: char| c == '/' || c == '\\')
        .next()
        .unwrap_or_default()
        .trim();

    match name {
        "" | "." | ".." => String::from(DEFAULT_FILE_NAME),
        name => name.to_string(),
    }
}

/// Parses both raw reports.
pub fn parse_reports(
    source_name: &str,
    raw: RawReports,
    policy: ParsePolicy,
) -> Result<Analysis, Error> {
    let summary = flagstat::parse(&raw.flagstat, policy)?;
    let references = idxstats::parse(&raw.idxstats, policy)?;

    Ok(Analysis {
        source_name: source_name.to_string(),
        raw,
        summary,
        references,
    })
}

/// Analyzes the contents of `reader`, stored under `name` for the duration
/// of the request. An empty body is an [`Error::EmptyInput`].
pub fn analyze_upload<R>(config: &PipelineConfig, name: &str, reader: &mut R) -> Result<Analysis, Error>
where
    R: Read + ?Sized,
{
    let file_name = sanitize_file_name(name);

    let scratch = tempfile::Builder::new().prefix("bamalyzer-").tempdir()?;
    let path = scratch.path().join(&file_name);
    debug!("  [*] Scratch file: {}", path.display());

    let bytes = {
        let mut file = File::create(&path)?;
        io::copy(reader, &mut file)?
    };

    if bytes == 0 {
        return Err(Error::EmptyInput);
    }

    info!("received {} ({} bytes)", file_name, bytes);

    let raw = config.samtools.run(&path)?;
    let analysis = parse_reports(&file_name, raw, config.policy)?;

    debug!("  [*] Removing scratch directory {}", scratch.path().display());
    scratch.close()?;

    Ok(analysis)
}

/// Analyzes a file on disk. The file is copied into scratch space first so
/// that no index is left behind next to it.
pub fn analyze_file(config: &PipelineConfig, path: &Path) -> Result<Analysis, Error> {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let mut file = File::open(path)?;
    analyze_upload(config, &name, &mut file)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_file_name() {
        assert_eq!(sanitize_file_name("sample.bam"), "sample.bam");
        assert_eq!(sanitize_file_name("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_file_name("C:\\reads\\sample.bam"), "sample.bam");
        assert_eq!(sanitize_file_name(""), DEFAULT_FILE_NAME);
        assert_eq!(sanitize_file_name("dir/.."), DEFAULT_FILE_NAME);
    }

    #[test]
    fn test_parse_reports() {
        let raw = RawReports {
            flagstat: String::from("1000 + 0 in total (QC-passed reads + QC-failed reads)\n"),
            idxstats: String::from("chrM\t16569\t300\n"),
        };

        let analysis = parse_reports("sample.bam", raw, ParsePolicy::Permissive).unwrap();
        assert_eq!(analysis.summary.value.get("in total"), Some(1000));
        assert_eq!(analysis.references.value.rows()[0].unmapped(), 0);
        assert_eq!(analysis.dashboard(1).source_name, "sample.bam");
    }

    #[test]
    fn test_malformed_report_aborts() {
        let raw = RawReports {
            flagstat: String::from("abc + 0 total\n"),
            idxstats: String::new(),
        };

        let err = parse_reports("sample.bam", raw, ParsePolicy::Permissive).unwrap_err();
        assert!(matches!(err, Error::MalformedReport { .. }));
    }

    #[cfg(unix)]
    mod with_fake_samtools {
        use std::fs;
        use std::path::PathBuf;
        use std::time::Duration;

        use tempfile::TempDir;

        use super::*;

        /// A fake samtools that records the directory of the file it was given.
        fn config(dir: &TempDir) -> PipelineConfig {
            let script = dir.path().join("samtools.sh");
            let log = dir.path().join("seen");
            fs::write(
                &script,
                format!(
                    "case \"$1\" in\n\
                     index) touch \"$2.bai\"; dirname \"$2\" > {}\n;;\n\
                     flagstat) printf '10 + 0 in total (QC-passed reads + QC-failed reads)\\n5 + 0 mapped\\n'\n;;\n\
                     idxstats) printf 'chr1\\t100\\t5\\t0\\n*\\t0\\t0\\t5\\n'\n;;\n\
                     esac\n",
                    log.display()
                ),
            )
            .unwrap();

            PipelineConfig {
                samtools: Samtools::from_command_line(
                    &format!("sh {}", script.display()),
                    Duration::from_secs(30),
                )
                .unwrap(),
                policy: ParsePolicy::Permissive,
                seed: 42,
            }
        }

        fn seen_directory(dir: &TempDir) -> PathBuf {
            PathBuf::from(fs::read_to_string(dir.path().join("seen")).unwrap().trim())
        }

        #[test]
        fn test_upload_is_analyzed_and_cleaned_up() {
            let dir = TempDir::new().unwrap();
            let config = config(&dir);

            let mut body: &[u8] = b"BAM\x01 not really";
            let analysis = analyze_upload(&config, "reads.bam", &mut body).unwrap();

            assert_eq!(analysis.source_name, "reads.bam");
            assert_eq!(analysis.summary.value.get("mapped"), Some(5));
            assert_eq!(analysis.references.value.len(), 2);

            let scratch = seen_directory(&dir);
            assert!(scratch.starts_with(std::env::temp_dir()));
            assert!(!scratch.exists());
        }

        #[test]
        fn test_empty_upload_is_empty_input() {
            let dir = TempDir::new().unwrap();
            let config = config(&dir);

            let mut body: &[u8] = b"";
            let err = analyze_upload(&config, "reads.bam", &mut body).unwrap_err();

            assert!(err.is_empty_input());
            assert!(!dir.path().join("seen").exists());
        }

        #[test]
        fn test_file_on_disk_keeps_no_index_alongside() {
            let dir = TempDir::new().unwrap();
            let config = config(&dir);

            let bam = dir.path().join("sample.bam");
            fs::write(&bam, b"BAM\x01").unwrap();

            let analysis = analyze_file(&config, &bam).unwrap();

            assert_eq!(analysis.source_name, "sample.bam");
            assert!(!dir.path().join("sample.bam.bai").exists());
            assert!(!seen_directory(&dir).exists());
        }

        #[test]
        fn test_missing_file_is_io_error() {
            let dir = TempDir::new().unwrap();
            let config = config(&dir);

            let err = analyze_file(&config, &dir.path().join("missing.bam")).unwrap_err();
            assert!(matches!(err, Error::Io(_)));
        }
    }
}
