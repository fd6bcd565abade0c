//! Schema reference resolution: decide which schema applies to a document.
//!
//! Pure string/path logic, no I/O. Precedence: a configured override (when
//! enabled) always wins; otherwise the document's `$schema` field is used,
//! resolved relative to the source's directory when it is not a URL.

use std::path::Path;

use serde_json::Value;
use tracing::info;

use crate::error::{Result, ValidationError};

/// Field inside a document that points at its schema.
pub const SCHEMA_POINTER_FIELD: &str = "$schema";

/// True for references the fetcher should treat as remote.
pub fn is_http_url(reference: &str) -> bool {
    reference.starts_with("http://") || reference.starts_with("https://")
}

/// Resolve the schema reference for one document.
///
/// Fails with [`ValidationError::NoSchema`] when neither an override nor an
/// embedded pointer is available; the caller treats that as a recoverable
/// per-document error.
pub fn resolve(
    document: &Value,
    source: &Path,
    override_enabled: bool,
    override_ref: Option<&str>,
) -> Result<String> {
    if override_enabled {
        // Config validation rejects an enabled override without a value, so
        // this is only reachable with Some through the CLI.
        return match override_ref {
            Some(reference) => {
                info!(reference, "using schema override");
                Ok(reference.to_string())
            }
            None => Err(ValidationError::NoSchema),
        };
    }

    let pointer = document
        .get(SCHEMA_POINTER_FIELD)
        .and_then(Value::as_str)
        .unwrap_or("");
    if pointer.is_empty() {
        return Err(ValidationError::NoSchema);
    }

    info!(pointer, "using schema reference from document");
    if is_http_url(pointer) {
        Ok(pointer.to_string())
    } else {
        let base = source.parent().unwrap_or_else(|| Path::new("."));
        Ok(base.join(pointer).to_string_lossy().into_owned())
    }
}
