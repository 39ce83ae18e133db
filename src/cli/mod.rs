//! CLI module
//!
//! Command-line interface over the Alma APIs.
//!
//! # Commands
//!
//! - `get` - GET any resource or list, optionally reading every page
//! - `report` - Run an Analytics report
//! - `regions` - List hosting regions

mod commands;
mod runner;

pub use commands::{Cli, Commands, OutputFormat};
pub use runner::Runner;
