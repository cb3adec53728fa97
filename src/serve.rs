//! Functionality related to the `bamalyzer serve` subcommand.

pub mod command;
pub mod server;
