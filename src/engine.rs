//! Adapter over the `jsonschema` crate: runs a compiled schema against a
//! document and shapes the violations into the report model.

use serde_json::Value;

use crate::compiler::CompiledSchema;
use crate::report::ValidationOutcome;

/// Validate one document against a compiled schema.
///
/// A conforming document yields a valid outcome with no errors or details; a
/// non-conforming one yields one detail per violation, each carrying the
/// instance location (path into the document) and schema location (path into
/// the schema) as JSON pointers.
pub fn evaluate(schema: &CompiledSchema, document: &Value) -> ValidationOutcome {
    let details: Vec<ValidationOutcome> = schema
        .validator()
        .iter_errors(document)
        .map(|error| {
            ValidationOutcome::detail(
                error.instance_path.to_string(),
                error.schema_path.to_string(),
                error.to_string(),
            )
        })
        .collect();

    if details.is_empty() {
        ValidationOutcome::ok()
    } else {
        ValidationOutcome::with_details(details)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::Arc;

    use serde_json::json;
    use tempfile::NamedTempFile;

    use crate::compiler::SchemaCompiler;
    use crate::fetcher::{FetcherConfig, SchemaFetcher};

    async fn compile_inline(schema: &Value) -> Arc<CompiledSchema> {
        let mut schema_file = NamedTempFile::new().unwrap();
        write!(schema_file, "{}", serde_json::to_string(schema).unwrap()).unwrap();
        schema_file.flush().unwrap();

        let fetcher = Arc::new(SchemaFetcher::new(&FetcherConfig::default()).unwrap());
        let compiler = SchemaCompiler::new(fetcher);
        compiler
            .get_compiled(&schema_file.path().to_string_lossy())
            .await
            .unwrap()
    }

    fn sample_schema() -> Value {
        json!({
            "$schema": "https://json-schema.org/draft/2020-12/schema",
            "type": "object",
            "properties": {
                "name": { "type": "string" },
                "port": { "type": "integer" }
            },
            "required": ["name"]
        })
    }

    #[tokio::test]
    async fn conforming_document_is_valid() {
        let schema = compile_inline(&sample_schema()).await;
        let outcome = evaluate(&schema, &json!({ "name": "api", "port": 8080 }));
        assert!(outcome.valid);
        assert!(outcome.errors.is_none());
        assert!(outcome.details.is_none());
    }

    #[tokio::test]
    async fn violations_produce_located_details() {
        let schema = compile_inline(&sample_schema()).await;
        let outcome = evaluate(&schema, &json!({ "name": "api", "port": "eighty" }));
        assert!(!outcome.valid);

        let details = outcome.details.expect("details for invalid document");
        assert!(!details.is_empty());
        for detail in &details {
            assert!(detail.instance_location.is_some());
            assert!(detail.schema_location.is_some());
            assert!(detail.top_error().is_some());
        }
        assert_eq!(details[0].instance_location.as_deref(), Some("/port"));
    }

    #[tokio::test]
    async fn missing_required_field_is_reported_at_root() {
        let schema = compile_inline(&sample_schema()).await;
        let outcome = evaluate(&schema, &json!({ "port": 1 }));
        assert!(!outcome.valid);
        let details = outcome.details.unwrap();
        assert!(details[0].top_error().unwrap().contains("name"));
    }
}
