//! `bamalyzer` is a small tool for taking a first look at an alignment file.
//! It runs `samtools index`, `samtools flagstat` and `samtools idxstats` on a
//! BAM file, parses the reports and presents them as an HTML dashboard, either
//! served to a browser (`bamalyzer serve`), written to disk
//! (`bamalyzer report`) or printed as tables or JSON (`bamalyzer stats`).
//!
//! This documentation refers to the library crate, for use by developers of
//! `bamalyzer`. The pieces fit together as follows:
//!
//! - [`samtools`] runs the external tool and captures its reports.
//! - [`reports`] parses the reports into typed records.
//! - [`dashboard`] turns the records into views, charts and HTML.
//! - [`pipeline`] ties the above together for one file.
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]
#![warn(rust_2021_compatibility)]

pub mod dashboard;
pub mod errors;
pub mod pipeline;
pub mod report;
pub mod reports;
pub mod samtools;
pub mod serve;
pub mod stats;
pub mod utils;
