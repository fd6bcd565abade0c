//! # validate-config Library
//!
//! An async-first Rust library for validating YAML and JSON configuration
//! files against JSON Schemas, with remote schema fetching, an in-process
//! compile cache, and multiple report renderers.

pub mod cli;
pub mod compiler;
pub mod engine;
pub mod error;
pub mod fetcher;
pub mod junit;
pub mod orchestrator;
pub mod output;
pub mod report;
pub mod resolver;
pub mod sarif;

pub use cli::{Cli, ReportFormat, ValidatorConfig};
pub use compiler::{CompiledSchema, SchemaCompiler};
pub use error::ValidationError;
pub use fetcher::{FetcherConfig, SchemaFetcher};
pub use orchestrator::Orchestrator;
pub use report::{Report, ValidationOutcome};
