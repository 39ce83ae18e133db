//! CLI runner - executes commands

use crate::api::{AlmaCnxn, ListOptions, ReadOptions, ReportOptions};
use crate::cli::commands::{Cli, Commands, OutputFormat};
use crate::config::{Region, Settings};
use crate::error::{Error, Result};
use crate::http::Response;
use crate::query::format_query;
use serde_json::{json, Value};
use tracing::debug;

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        match &self.cli.command {
            Commands::Get {
                path,
                params,
                query,
                container,
                all,
                limit,
                offset,
                raw,
            } => {
                let request = GetRequest {
                    path,
                    params,
                    query,
                    container: container.as_deref(),
                    all: *all,
                    limit: *limit,
                    offset: *offset,
                    raw: *raw,
                };
                self.get(request).await
            }
            Commands::Report {
                path,
                all,
                records,
                limit,
                filter,
            } => {
                let mut opts = ReportOptions::new().limit(*limit).all_records(*all);
                if let Some(filter) = filter {
                    opts = opts.filter(filter.as_str());
                }
                self.report(path, &opts, *records).await
            }
            Commands::Regions => {
                self.regions();
                Ok(())
            }
        }
    }

    /// Settings from file and environment, then command-line overrides
    fn settings(&self) -> Result<Settings> {
        let settings = match &self.cli.config {
            Some(path) => Settings::from_file(path)
                .map_err(|e| Error::config(format!("Failed to read settings file: {e}")))?,
            None => Settings::default(),
        };
        let mut settings = settings.apply_env()?;

        if let Some(key) = &self.cli.api_key {
            settings.api_key = Some(key.clone());
        }
        if let Some(region) = &self.cli.region {
            settings.region = region.parse()?;
        }
        if let Some(format) = &self.cli.format {
            settings.format = format.parse()?;
        }
        Ok(settings)
    }

    fn connect(&self) -> Result<AlmaCnxn> {
        let settings = self.settings()?;
        debug!(
            "Connecting to {} ({}, {})",
            settings.region,
            settings.base_uri.as_deref().unwrap_or(settings.region.base_uri()),
            settings.format
        );
        settings.connect()
    }

    async fn get(&self, request: GetRequest<'_>) -> Result<()> {
        let alma = self.connect()?;

        let response = match request.container {
            Some(container) => {
                let mut opts = ListOptions::new()
                    .limit(request.limit)
                    .offset(request.offset)
                    .all_records(request.all)
                    .raw(request.raw);
                for (field, value) in request.query {
                    opts = opts.query(field.as_str(), value.as_str());
                }
                for (key, value) in request.params {
                    opts = opts.param(key.as_str(), value.as_str());
                }
                alma.list(request.path, &opts, container).await?
            }
            None => {
                if request.all {
                    return Err(Error::arg("--all requires --container"));
                }
                let mut opts = ReadOptions::new().raw(request.raw);
                for (key, value) in request.params {
                    opts = opts.param(key.as_str(), value.as_str());
                }
                if !request.query.is_empty() {
                    opts = opts.param("q", format_query(request.query.iter().map(|(f, v)| (f, v))));
                }
                alma.read(request.path, &opts).await?
            }
        };

        self.output_response(&response)
    }

    async fn report(&self, path: &str, opts: &ReportOptions, records: bool) -> Result<()> {
        let alma = self.connect()?;
        if records {
            let rows = alma.analytics.reports.get_records(path, opts).await?;
            self.output_value(&Value::Array(rows.into_iter().map(Value::Object).collect()));
            return Ok(());
        }
        let report = alma.analytics.reports.get(path, opts).await?;
        self.output_response(&report)
    }

    fn regions(&self) {
        let regions: Vec<Value> = Region::ALL
            .iter()
            .map(|region| json!({"name": region.name(), "base_uri": region.base_uri()}))
            .collect();
        self.output_value(&Value::Array(regions));
    }

    fn output_response(&self, response: &Response) -> Result<()> {
        match response {
            Response::Json(value) => self.output_value(value),
            Response::Xml(tree) => println!("{}", tree.to_xml_string()?),
            Response::Text(text) => println!("{text}"),
            Response::Raw(raw) => println!("{}", raw.body),
            Response::RawPages(pages) => {
                for page in pages {
                    println!("{}", page.body);
                }
            }
        }
        Ok(())
    }

    fn output_value(&self, value: &Value) {
        match self.cli.output {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string(value).unwrap_or_default());
            }
            OutputFormat::Pretty => {
                println!("{}", serde_json::to_string_pretty(value).unwrap_or_default());
            }
        }
    }
}

/// Arguments of the `get` command
struct GetRequest<'a> {
    path: &'a str,
    params: &'a [(String, String)],
    query: &'a [(String, String)],
    container: Option<&'a str>,
    all: bool,
    limit: u32,
    offset: u64,
    raw: bool,
}
