//! Utilities that are used across the `bamalyzer` subcommands.

pub mod args;
pub mod display;
pub mod pathbuf;
