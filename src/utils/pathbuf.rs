//! Extensions to [`PathBuf`] for working with files that live alongside an
//! alignment file.
//!
//! `samtools index` writes its index next to the file it indexes by appending
//! `.bai` to the full file name (including any existing extension). The
//! [`AppendExtension`] trait derives such sibling paths.
//!
//! ```
//! use std::path::PathBuf;
//! // Trait must be in scope to use it.
//! use bamalyzer::utils::pathbuf::AppendExtension;
//!
//! assert_eq!(
//!     PathBuf::from("sample.bam")
//!         .append_extension("bai")
//!         .unwrap(),
//!     PathBuf::from("sample.bam.bai"))
//! ```

use std::ffi::OsStr;
use std::path::PathBuf;

use anyhow::bail;

/// Adds an [`append_extension`][AppendExtension::append_extension] method to
/// [`PathBuf`].
pub trait AppendExtension {
    /// Appends `.<ext>` to the file name, keeping any extension already present.
    ///
    /// ```
    /// use std::path::PathBuf;
    /// use bamalyzer::utils::pathbuf::AppendExtension;
    ///
    /// let bam = PathBuf::from("/tmp/upload/reads");
    /// let bai = bam.append_extension("bai").unwrap();
    /// assert_eq!(bai.file_name().unwrap(), "reads.bai");
    /// ```
    fn append_extension<P>(self, ext: P) -> anyhow::Result<Self>
    where
        Self: Sized,
        P: AsRef<OsStr>;
}

impl AppendExtension for PathBuf {
    fn append_extension<P>(mut self, ext: P) -> anyhow::Result<Self>
    where
        P: AsRef<OsStr>,
    {
        let mut file_name = match self.file_name() {
            Some(name) => name.to_os_string(),
            None => bail!("path does not name a file: {}", self.display()),
        };

        file_name.push(".");
        file_name.push(ext);

        self.set_file_name(file_name);
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_appends_to_existing_extension() {
        let bai = PathBuf::from("/data/sample.sorted.bam")
            .append_extension("bai")
            .unwrap();
        assert_eq!(bai, PathBuf::from("/data/sample.sorted.bam.bai"));
    }

    #[test]
    fn test_rejects_paths_without_file_name() {
        assert!(PathBuf::from("/").append_extension("bai").is_err());
        assert!(PathBuf::from("data/..").append_extension("bai").is_err());
    }
}
