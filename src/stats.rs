//! Functionality related to the `bamalyzer stats` subcommand.

pub mod command;
