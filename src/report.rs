//! Report model: per-document validation outcomes and the aggregated report.
//!
//! The shape follows the JSON Schema "list" output format: a top-level
//! validity flag plus optional `errors`/`details`, where each detail carries
//! the instance and schema locations of one violation.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Validity verdict plus structured error detail for one document.
///
/// `valid == true` implies `errors` and `details` are absent. A leaf outcome
/// carries `errors`; an outcome produced by the schema engine carries one
/// detail per violation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationOutcome {
    pub valid: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instance_location: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema_location: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<IndexMap<String, String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<ValidationOutcome>>,
}

impl ValidationOutcome {
    /// A valid outcome with no errors or details.
    pub fn ok() -> Self {
        Self {
            valid: true,
            instance_location: None,
            schema_location: None,
            errors: None,
            details: None,
        }
    }

    /// An invalid outcome carrying a single human-readable cause under the
    /// conventional `error` label. All recoverable per-document failures
    /// (parse, no-schema, fetch, compile) collapse into this shape.
    pub fn generic_error(message: impl Into<String>) -> Self {
        let mut errors = IndexMap::new();
        errors.insert("error".to_string(), message.into());
        Self {
            valid: false,
            instance_location: None,
            schema_location: None,
            errors: Some(errors),
            details: None,
        }
    }

    /// A single violation reported by the schema engine, located within the
    /// document and the schema.
    pub fn detail(
        instance_location: impl Into<String>,
        schema_location: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        let mut errors = IndexMap::new();
        errors.insert("error".to_string(), message.into());
        Self {
            valid: false,
            instance_location: Some(instance_location.into()),
            schema_location: Some(schema_location.into()),
            errors: Some(errors),
            details: None,
        }
    }

    /// An invalid composite outcome wrapping engine violations.
    pub fn with_details(details: Vec<ValidationOutcome>) -> Self {
        Self {
            valid: false,
            instance_location: None,
            schema_location: None,
            errors: None,
            details: Some(details),
        }
    }

    /// The top-level message under the `error` label, if present.
    pub fn top_error(&self) -> Option<&str> {
        self.errors
            .as_ref()
            .and_then(|errors| errors.get("error"))
            .map(String::as_str)
    }
}

/// Aggregated outcomes for an entire run, keyed by resultkey: the source name
/// for single-document sources, `"<name>-<1-based index>"` for multi-document
/// sources. Read-only after construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub valid: bool,
    pub files: IndexMap<String, ValidationOutcome>,
}

impl Report {
    /// Merge per-source result maps in source order. Keys never collide
    /// because each is qualified by its source name. `valid` is the AND over
    /// all outcomes; an empty report is valid.
    pub fn aggregate(parts: impl IntoIterator<Item = IndexMap<String, ValidationOutcome>>) -> Self {
        let mut files = IndexMap::new();
        for part in parts {
            files.extend(part);
        }
        let valid = files.values().all(|outcome| outcome.valid);
        Self { valid, files }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn single(key: &str, outcome: ValidationOutcome) -> IndexMap<String, ValidationOutcome> {
        let mut map = IndexMap::new();
        map.insert(key.to_string(), outcome);
        map
    }

    #[test]
    fn aggregate_is_and_over_outcomes() {
        let report = Report::aggregate(vec![
            single("a.yaml", ValidationOutcome::ok()),
            single("b.yaml", ValidationOutcome::generic_error("boom")),
            single("c.yaml", ValidationOutcome::ok()),
        ]);
        assert!(!report.valid);
        assert_eq!(report.files.len(), 3);
        assert!(report.files["a.yaml"].valid);
        assert!(!report.files["b.yaml"].valid);
    }

    #[test]
    fn aggregate_preserves_source_order() {
        let report = Report::aggregate(vec![
            single("z.yaml", ValidationOutcome::ok()),
            single("a.yaml", ValidationOutcome::ok()),
        ]);
        let keys: Vec<_> = report.files.keys().cloned().collect();
        assert_eq!(keys, vec!["z.yaml", "a.yaml"]);
        assert!(report.valid);
    }

    #[test]
    fn empty_report_is_valid() {
        let report = Report::aggregate(Vec::new());
        assert!(report.valid);
        assert!(report.files.is_empty());
    }

    #[test]
    fn generic_error_shape() {
        let outcome = ValidationOutcome::generic_error("something broke");
        assert!(!outcome.valid);
        assert_eq!(outcome.top_error(), Some("something broke"));
        assert!(outcome.details.is_none());
    }

    #[test]
    fn ok_outcome_serializes_without_null_fields() {
        let json = serde_json::to_value(ValidationOutcome::ok()).unwrap();
        assert_eq!(json, serde_json::json!({ "valid": true }));
    }

    #[test]
    fn detail_serializes_camel_case_locations() {
        let detail = ValidationOutcome::detail("/port", "/properties/port/type", "bad type");
        let json = serde_json::to_value(&detail).unwrap();
        assert_eq!(json["instanceLocation"], "/port");
        assert_eq!(json["schemaLocation"], "/properties/port/type");
        assert_eq!(json["errors"]["error"], "bad type");
    }
}
