//! Functionality related to the `bamalyzer report` subcommand.

pub mod command;
