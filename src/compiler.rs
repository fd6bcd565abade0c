//! Schema compiler and cache.
//!
//! Turns raw schema text into a compiled, dialect-tagged validator, cached by
//! the exact reference string. The cache is append-only for the process
//! lifetime; `moka` guarantees that concurrent requests for the same
//! reference perform exactly one fetch and compile.

use std::sync::Arc;

use jsonschema::{Draft, Validator};
use moka::future::Cache;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{Result, ValidationError};
use crate::fetcher::SchemaFetcher;

/// Dialect selected when the schema carries no recognizable `$schema` URI.
pub const DEFAULT_DIALECT: Draft = Draft::Draft202012;

/// Version-indicator URIs mapped to schema dialects, scheme and trailing `#`
/// stripped. Lookup never fails; unknown indicators fall back to the default
/// with a warning.
const DIALECTS: &[(&str, Draft)] = &[
    ("json-schema.org/draft-04/schema", Draft::Draft4),
    ("json-schema.org/draft-06/schema", Draft::Draft6),
    ("json-schema.org/draft-07/schema", Draft::Draft7),
    ("json-schema.org/draft/2019-09/schema", Draft::Draft201909),
    ("json-schema.org/draft/2020-12/schema", Draft::Draft202012),
];

/// Determine the schema dialect from the document's own `$schema` field.
pub fn detect_dialect(schema: &Value) -> Draft {
    let Some(indicator) = schema.get("$schema").and_then(Value::as_str) else {
        debug!("schema has no $schema indicator, defaulting to 2020-12");
        return DEFAULT_DIALECT;
    };

    let normalized = indicator
        .trim_end_matches('#')
        .trim_start_matches("http://")
        .trim_start_matches("https://");
    for (uri, dialect) in DIALECTS {
        if *uri == normalized {
            return *dialect;
        }
    }

    warn!(indicator, "unknown schema dialect, defaulting to 2020-12");
    DEFAULT_DIALECT
}

/// A parsed, dialect-tagged schema ready for matching against documents.
pub struct CompiledSchema {
    pub reference: String,
    pub dialect: Draft,
    validator: Validator,
}

impl CompiledSchema {
    pub(crate) fn validator(&self) -> &Validator {
        &self.validator
    }
}

/// Compiles schemas and caches them by reference string.
pub struct SchemaCompiler {
    fetcher: Arc<SchemaFetcher>,
    cache: Cache<String, Arc<CompiledSchema>>,
}

impl SchemaCompiler {
    pub fn new(fetcher: Arc<SchemaFetcher>) -> Self {
        Self {
            fetcher,
            cache: Cache::builder().build(),
        }
    }

    /// Return the compiled schema for a reference, fetching and compiling at
    /// most once per distinct reference string. Concurrent callers for the
    /// same key wait for the single leader to finish.
    pub async fn get_compiled(&self, reference: &str) -> Result<Arc<CompiledSchema>> {
        self.cache
            .try_get_with(reference.to_string(), self.compile(reference))
            .await
            .map_err(ValidationError::Shared)
    }

    /// The fetcher backing this compiler.
    pub fn fetcher(&self) -> &Arc<SchemaFetcher> {
        &self.fetcher
    }

    async fn compile(&self, reference: &str) -> Result<Arc<CompiledSchema>> {
        let raw = self.fetcher.fetch(reference).await?;
        let node = parse_schema_text(reference, &raw)?;
        let dialect = detect_dialect(&node);
        debug!(reference, ?dialect, "compiling schema");

        let validator = jsonschema::options()
            .with_draft(dialect)
            .should_validate_formats(true)
            .build(&node)
            .map_err(|error| ValidationError::Compile {
                reference: reference.to_string(),
                message: error.to_string(),
            })?;

        Ok(Arc::new(CompiledSchema {
            reference: reference.to_string(),
            dialect,
            validator,
        }))
    }
}

/// Parse schema text as JSON first, falling back to YAML. JSON first because
/// it is a strict subset of YAML and faster to reject.
fn parse_schema_text(reference: &str, raw: &str) -> Result<Value> {
    match serde_json::from_str(raw) {
        Ok(node) => Ok(node),
        Err(json_error) => {
            debug!(reference, %json_error, "schema is not JSON, retrying as YAML");
            let yaml: serde_yaml::Value =
                serde_yaml::from_str(raw).map_err(|yaml_error| ValidationError::Compile {
                    reference: reference.to_string(),
                    message: format!("not valid JSON ({json_error}) nor YAML ({yaml_error})"),
                })?;
            serde_json::to_value(&yaml).map_err(|error| ValidationError::Compile {
                reference: reference.to_string(),
                message: error.to_string(),
            })
        }
    }
}
