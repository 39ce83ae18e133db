//! CLI commands and argument parsing

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Command-line client for the Alma REST APIs
#[derive(Parser, Debug)]
#[command(name = "alma")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Settings file (YAML)
    #[arg(short = 'C', long, global = true)]
    pub config: Option<PathBuf>,

    /// API key (overrides settings and ALMA_API_KEY)
    #[arg(short = 'k', long, global = true)]
    pub api_key: Option<String>,

    /// Hosting region: America, Europe, Asia Pacific, Canada or China
    #[arg(short, long, global = true)]
    pub region: Option<String>,

    /// Data format requested from the service: json or xml
    #[arg(short, long, global = true)]
    pub format: Option<String>,

    /// How structured results are printed
    #[arg(short, long, global = true, default_value = "pretty")]
    pub output: OutputFormat,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// GET a resource or list, e.g. `almaws/v1/users`
    Get {
        /// Path relative to the regional host
        path: String,

        /// Extra query parameter (repeatable)
        #[arg(short, long = "param", value_parser = parse_key_val)]
        params: Vec<(String, String)>,

        /// Brief-search filter (repeatable, combined with AND)
        #[arg(short, long, value_parser = parse_key_val)]
        query: Vec<(String, String)>,

        /// Name of the record list field; makes the request a list read
        #[arg(long)]
        container: Option<String>,

        /// Read every page (requires --container)
        #[arg(long)]
        all: bool,

        /// Page size of the first request
        #[arg(long, default_value = "10")]
        limit: u32,

        /// Row number to start with
        #[arg(long, default_value = "0")]
        offset: u64,

        /// Print response bodies without inspecting them
        #[arg(long)]
        raw: bool,
    },

    /// Run an Analytics report
    Report {
        /// Report path, e.g. `/shared/University/Reports/Loans`
        path: String,

        /// Follow resumption tokens until the report is finished
        #[arg(long)]
        all: bool,

        /// Print rows as JSON records keyed by column heading
        #[arg(long)]
        records: bool,

        /// Rows per chunk (multiple of 25, at most 1000)
        #[arg(long, default_value = "25")]
        limit: u32,

        /// OBI filter expression (XML)
        #[arg(long)]
        filter: Option<String>,
    },

    /// List hosting regions and their API hosts
    Regions,
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Compact JSON, one document per line
    Json,
    /// Indented JSON
    Pretty,
}

/// Parse `key=value`
fn parse_key_val(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{s}'"))?;
    if key.is_empty() {
        return Err(format!("empty key in '{s}'"));
    }
    Ok((key.to_string(), value.to_string()))
}
