//! Validation orchestrator: drives parsing, schema resolution, compilation,
//! and the schema engine for each input source.
//!
//! The key property here is failure containment: no error ever escapes
//! per-document validation. Every parse, resolve, fetch, or compile failure
//! becomes an invalid outcome for that document, and the rest of the batch
//! keeps going.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use futures::future::join_all;
use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Value;
use tokio::sync::Semaphore;
use tracing::{debug, error};

use crate::compiler::SchemaCompiler;
use crate::engine;
use crate::error::{Result, ValidationError};
use crate::report::{Report, ValidationOutcome};
use crate::resolver;

/// Parse source content into an ordered sequence of documents.
///
/// Whole-content JSON is tried first (single document); on failure the bytes
/// are parsed as a YAML stream of `---`-separated documents, discarding
/// empty/null documents. A stream of only `---` yields zero documents.
pub fn parse_documents(raw: &[u8]) -> Result<Vec<Value>> {
    if let Ok(value) = serde_json::from_slice::<Value>(raw) {
        return Ok(vec![value]);
    }

    let mut documents = Vec::new();
    for deserializer in serde_yaml::Deserializer::from_slice(raw) {
        let yaml = serde_yaml::Value::deserialize(deserializer).map_err(|yaml_error| {
            ValidationError::Parse {
                message: yaml_error.to_string(),
            }
        })?;
        if yaml.is_null() {
            continue;
        }
        let value = serde_json::to_value(&yaml).map_err(|json_error| ValidationError::Parse {
            message: json_error.to_string(),
        })?;
        documents.push(value);
    }
    Ok(documents)
}

/// Drives the full pipeline for one or more sources against a shared schema
/// cache.
pub struct Orchestrator {
    compiler: SchemaCompiler,
    schema_override: Option<String>,
    override_enabled: bool,
}

impl Orchestrator {
    pub fn new(
        compiler: SchemaCompiler,
        schema_override: Option<String>,
        override_enabled: bool,
    ) -> Self {
        Self {
            compiler,
            schema_override,
            override_enabled,
        }
    }

    pub fn compiler(&self) -> &SchemaCompiler {
        &self.compiler
    }

    /// Validate a source from raw bytes. Returns one entry per document,
    /// keyed by the source name for single-document sources or
    /// `"<name>-<1-based index>"` for multi-document sources.
    pub async fn validate_source(
        &self,
        name: &str,
        raw: &[u8],
    ) -> IndexMap<String, ValidationOutcome> {
        let documents = match parse_documents(raw) {
            Ok(documents) => documents,
            Err(parse_error) => {
                error!(source = name, %parse_error, "failed to parse source");
                return single_entry(name, ValidationOutcome::generic_error(parse_error.to_string()));
            }
        };

        match documents.len() {
            0 => single_entry(name, ValidationOutcome::generic_error("no nodes found")),
            1 => single_entry(name, self.validate_one(name, &documents[0]).await),
            _ => {
                let mut results = IndexMap::new();
                for (index, document) in documents.iter().enumerate() {
                    let outcome = self.validate_one(name, document).await;
                    results.insert(format!("{}-{}", name, index + 1), outcome);
                }
                results
            }
        }
    }

    /// Validate one source file from disk. A missing or unreadable input file
    /// is contained as a per-source outcome, never a fatal error.
    pub async fn validate_file(&self, path: &Path) -> IndexMap<String, ValidationOutcome> {
        let name = path.to_string_lossy().into_owned();
        match tokio::fs::read(path).await {
            Ok(raw) => self.validate_source(&name, &raw).await,
            Err(io_error) => {
                let cause = match io_error.kind() {
                    std::io::ErrorKind::NotFound => ValidationError::FileNotFound {
                        path: PathBuf::from(path),
                    },
                    _ => ValidationError::Io(io_error),
                };
                error!(source = %name, %cause, "failed to read source");
                single_entry(&name, ValidationOutcome::generic_error(cause.to_string()))
            }
        }
    }

    /// Validate a batch of source files concurrently, bounded by a semaphore,
    /// and aggregate the per-source results in input order.
    pub async fn validate_batch(
        self: &Arc<Self>,
        files: Vec<PathBuf>,
        max_concurrent: usize,
    ) -> Result<Report> {
        let semaphore = Arc::new(Semaphore::new(max_concurrent.max(1)));

        let tasks: Vec<_> = files
            .into_iter()
            .map(|path| {
                let orchestrator = Arc::clone(self);
                let semaphore = Arc::clone(&semaphore);
                tokio::spawn(async move {
                    let _permit = semaphore.acquire().await.ok();
                    orchestrator.validate_file(&path).await
                })
            })
            .collect();

        let mut parts = Vec::with_capacity(tasks.len());
        for joined in join_all(tasks).await {
            parts.push(joined.map_err(|join_error| {
                ValidationError::Config(format!("validation task failed: {join_error}"))
            })?);
        }

        Ok(Report::aggregate(parts))
    }

    /// Validate one document: resolve its schema, compile it, run the engine.
    /// Every failure along the way collapses into a generic-error outcome.
    async fn validate_one(&self, name: &str, document: &Value) -> ValidationOutcome {
        let reference = match resolver::resolve(
            document,
            Path::new(name),
            self.override_enabled,
            self.schema_override.as_deref(),
        ) {
            Ok(reference) => reference,
            Err(resolve_error) => {
                return ValidationOutcome::generic_error(resolve_error.to_string());
            }
        };

        let schema = match self.compiler.get_compiled(&reference).await {
            Ok(schema) => schema,
            Err(compile_error) => {
                return ValidationOutcome::generic_error(compile_error.to_string());
            }
        };

        debug!(source = name, reference, "validating document");
        engine::evaluate(&schema, document)
    }
}

fn single_entry(name: &str, outcome: ValidationOutcome) -> IndexMap<String, ValidationOutcome> {
    let mut results = IndexMap::new();
    results.insert(name.to_string(), outcome);
    results
}
