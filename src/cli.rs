use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};

use crate::error::{Result, ValidationError};

/// Connect timeout applied when neither the CLI nor a config file sets one.
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;

/// Report formats the tool can emit. The set is closed and exhaustively
/// matched at the render site, so adding a format is a compile-time-checked
/// change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    /// Colored plain-text summary
    #[default]
    Text,
    /// Pretty-printed JSON report
    Json,
    /// YAML report
    Yaml,
    /// JUnit XML report
    Junit,
    /// SARIF 2.1.0 report
    Sarif,
}

/// Validate YAML and JSON configuration files against JSON Schemas
#[derive(Parser, Debug, Clone)]
#[command(name = "validate-config")]
#[command(about = "Validate YAML/JSON configuration files against JSON Schemas")]
#[command(version)]
pub struct Cli {
    /// Files to validate
    #[arg(help = "YAML or JSON files to validate")]
    pub files: Vec<PathBuf>,

    /// Schema path or URL
    #[arg(
        short = 's',
        long = "schema",
        help = "Schema path or URL (applied with --schema-override)"
    )]
    pub schema: Option<String>,

    /// Use the --schema value even when documents embed their own $schema
    #[arg(long = "schema-override", requires = "schema")]
    pub schema_override: bool,

    /// Report format
    #[arg(short = 'r', long = "report", value_enum, default_value_t = ReportFormat::Text)]
    pub report: ReportFormat,

    /// Write the report to a file instead of stdout
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// HTTP connect timeout in seconds for remote schemas
    #[arg(long = "http-timeout", value_name = "SECS")]
    pub http_timeout: Option<u64>,

    /// Accept invalid TLS certificates when fetching remote schemas
    #[arg(long = "ignore-tls-errors")]
    pub ignore_tls_errors: bool,

    /// Disable ANSI colors in the text report
    #[arg(long = "no-color")]
    pub no_color: bool,

    /// Load defaults from a TOML config file (CLI values win)
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,
}

/// Config-file counterpart of the CLI options.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct FileConfig {
    files: Vec<PathBuf>,
    schema: Option<String>,
    schema_override: Option<bool>,
    report: Option<ReportFormat>,
    output: Option<PathBuf>,
    http_timeout_secs: Option<u64>,
    ignore_tls_errors: Option<bool>,
    color: Option<bool>,
}

impl FileConfig {
    fn load(path: &PathBuf) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|error| {
            ValidationError::Config(format!("cannot read config file {}: {error}", path.display()))
        })?;
        toml::from_str(&text).map_err(|error| {
            ValidationError::Config(format!("invalid config file {}: {error}", path.display()))
        })
    }
}

/// Effective configuration for one run, merged from the CLI and an optional
/// TOML config file, validated before any validation begins.
#[derive(Debug, Clone)]
pub struct ValidatorConfig {
    pub files: Vec<PathBuf>,
    pub schema: Option<String>,
    pub schema_override: bool,
    pub report: ReportFormat,
    pub output: Option<PathBuf>,
    pub http_timeout: Duration,
    pub ignore_tls_errors: bool,
    pub color: bool,
}

impl ValidatorConfig {
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let file = match &cli.config {
            Some(path) => FileConfig::load(path)?,
            None => FileConfig::default(),
        };

        let files = if cli.files.is_empty() {
            file.files
        } else {
            cli.files.clone()
        };

        let color = if cli.no_color {
            false
        } else {
            file.color
                .unwrap_or_else(|| atty::is(atty::Stream::Stdout))
        };

        let config = Self {
            files,
            schema: cli.schema.clone().or(file.schema),
            schema_override: cli.schema_override || file.schema_override.unwrap_or(false),
            report: if cli.report == ReportFormat::Text {
                file.report.unwrap_or(cli.report)
            } else {
                cli.report
            },
            output: cli.output.clone().or(file.output),
            http_timeout: Duration::from_secs(
                cli.http_timeout
                    .or(file.http_timeout_secs)
                    .unwrap_or(DEFAULT_HTTP_TIMEOUT_SECS),
            ),
            ignore_tls_errors: cli.ignore_tls_errors || file.ignore_tls_errors.unwrap_or(false),
            color,
        };
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations that cannot produce a meaningful run. These are
    /// the only fatal errors in the tool; everything later is contained
    /// per document.
    pub fn validate(&self) -> Result<()> {
        if self.files.is_empty() {
            return Err(ValidationError::Config(
                "no input files given; pass file paths or configure a file list".to_string(),
            ));
        }
        if self.schema_override && self.schema.is_none() {
            return Err(ValidationError::Config(
                "--schema-override requires a schema value".to_string(),
            ));
        }
        if self.http_timeout.is_zero() {
            return Err(ValidationError::Config(
                "http timeout must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}
