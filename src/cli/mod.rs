//! Command line shell for Tallychain

pub mod commands;
pub mod menu;

pub use commands::run_cli;
