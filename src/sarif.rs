//! SARIF 2.1.0 renderer.
//!
//! One run, one static rule, one result per non-empty error (top-level or
//! per detail). Line/column numbers are never derived from the document; a
//! detail's instance location travels as a region snippet only.

use chrono::{SecondsFormat, Utc};
use serde::Serialize;

use crate::error::{Result, ValidationError};
use crate::report::{Report, ValidationOutcome};

const RULE_ID: &str = "schema-validation";
const SARIF_VERSION: &str = "2.1.0";
const SARIF_SCHEMA: &str = "https://json.schemastore.org/sarif-2.1.0.json";

#[derive(Debug, Serialize)]
struct SarifLog {
    version: &'static str,
    #[serde(rename = "$schema")]
    schema: &'static str,
    runs: Vec<Run>,
}

#[derive(Debug, Serialize)]
struct Run {
    tool: Tool,
    results: Vec<SarifResult>,
    invocations: Vec<Invocation>,
}

#[derive(Debug, Serialize)]
struct Tool {
    driver: ToolComponent,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ToolComponent {
    name: &'static str,
    version: &'static str,
    semantic_version: &'static str,
    rules: Vec<ReportingDescriptor>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ReportingDescriptor {
    id: &'static str,
    short_description: MessageString,
    full_description: MessageString,
    help: MessageString,
    default_configuration: ReportingConfiguration,
}

#[derive(Debug, Serialize)]
struct ReportingConfiguration {
    level: &'static str,
}

#[derive(Debug, Serialize)]
struct MessageString {
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SarifResult {
    rule_id: &'static str,
    level: &'static str,
    message: MessageString,
    locations: Vec<Location>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Location {
    physical_location: PhysicalLocation,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PhysicalLocation {
    artifact_location: ArtifactLocation,
    #[serde(skip_serializing_if = "Option::is_none")]
    region: Option<Region>,
}

#[derive(Debug, Serialize)]
struct ArtifactLocation {
    uri: String,
}

#[derive(Debug, Serialize)]
struct Region {
    snippet: ArtifactContent,
}

#[derive(Debug, Serialize)]
struct ArtifactContent {
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Invocation {
    execution_successful: bool,
    start_time_utc: String,
    end_time_utc: String,
    exit_code: i32,
}

pub fn to_sarif_string(report: &Report) -> Result<String> {
    let timestamp = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);

    let mut results = Vec::new();
    for (resultkey, outcome) in &report.files {
        if !outcome.valid {
            results.extend(results_for_outcome(resultkey, outcome));
        }
    }

    let log = SarifLog {
        version: SARIF_VERSION,
        schema: SARIF_SCHEMA,
        runs: vec![Run {
            tool: build_tool(),
            results,
            invocations: vec![Invocation {
                execution_successful: report.valid,
                start_time_utc: timestamp.clone(),
                end_time_utc: timestamp,
                exit_code: if report.valid { 0 } else { 1 },
            }],
        }],
    };

    serde_json::to_string_pretty(&log).map_err(|error| ValidationError::Render(error.to_string()))
}

fn build_tool() -> Tool {
    Tool {
        driver: ToolComponent {
            name: "validate-config",
            version: env!("CARGO_PKG_VERSION"),
            semantic_version: env!("CARGO_PKG_VERSION"),
            rules: vec![ReportingDescriptor {
                id: RULE_ID,
                short_description: MessageString {
                    text: "Schema validation error".to_string(),
                },
                full_description: MessageString {
                    text: "The file does not conform to the specified JSON/YAML schema"
                        .to_string(),
                },
                help: MessageString {
                    text: "Ensure that the file content matches the schema definition".to_string(),
                },
                default_configuration: ReportingConfiguration { level: "error" },
            }],
        },
    }
}

/// One result per non-empty error: the top-level error message, plus one per
/// invalid detail.
fn results_for_outcome(resultkey: &str, outcome: &ValidationOutcome) -> Vec<SarifResult> {
    let mut results = Vec::new();

    if let Some(message) = outcome.top_error() {
        results.push(build_result(resultkey, message.to_string(), None));
    }

    if let Some(details) = &outcome.details {
        for detail in details {
            if detail.valid {
                continue;
            }
            let mut message = String::new();
            if let Some(location) = &detail.instance_location {
                message.push_str(&format!("At path '{location}': "));
            }
            match detail.top_error() {
                Some(text) => message.push_str(text),
                None => message.push_str("Validation error"),
            }
            results.push(build_result(
                resultkey,
                message,
                detail.instance_location.clone(),
            ));
        }
    }

    results
}

fn build_result(
    resultkey: &str,
    message: String,
    instance_location: Option<String>,
) -> SarifResult {
    // startLine/startColumn are never emitted; the instance location is only
    // available as a JSON pointer, not a text position.
    let region = instance_location.map(|location| Region {
        snippet: ArtifactContent {
            text: format!("Path: {location}"),
        },
    });

    SarifResult {
        rule_id: RULE_ID,
        level: "error",
        message: MessageString { text: message },
        locations: vec![Location {
            physical_location: PhysicalLocation {
                artifact_location: ArtifactLocation {
                    uri: resultkey.to_string(),
                },
                region,
            },
        }],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;

    fn report_of(entries: Vec<(&str, ValidationOutcome)>) -> Report {
        let mut files = IndexMap::new();
        for (key, outcome) in entries {
            files.insert(key.to_string(), outcome);
        }
        Report::aggregate(vec![files])
    }

    #[test]
    fn valid_report_has_no_results_and_exit_code_zero() {
        let report = report_of(vec![("a.yaml", ValidationOutcome::ok())]);
        let sarif: serde_json::Value =
            serde_json::from_str(&to_sarif_string(&report).unwrap()).unwrap();
        assert_eq!(sarif["version"], "2.1.0");
        assert_eq!(sarif["$schema"], SARIF_SCHEMA);
        assert_eq!(sarif["runs"].as_array().unwrap().len(), 1);
        assert!(sarif["runs"][0]["results"].as_array().unwrap().is_empty());
        assert_eq!(sarif["runs"][0]["invocations"][0]["exitCode"], 0);
        assert_eq!(
            sarif["runs"][0]["invocations"][0]["executionSuccessful"],
            true
        );
    }

    #[test]
    fn one_result_per_error_with_rule_and_artifact() {
        let report = report_of(vec![
            ("good.yaml", ValidationOutcome::ok()),
            (
                "bad.yaml-2",
                ValidationOutcome::with_details(vec![
                    ValidationOutcome::detail("/port", "/properties/port/type", "bad type"),
                    ValidationOutcome::detail("/name", "/properties/name/type", "bad name"),
                ]),
            ),
        ]);
        let sarif: serde_json::Value =
            serde_json::from_str(&to_sarif_string(&report).unwrap()).unwrap();

        let results = sarif["runs"][0]["results"].as_array().unwrap();
        assert_eq!(results.len(), 2);
        for result in results {
            assert_eq!(result["ruleId"], "schema-validation");
            assert_eq!(result["level"], "error");
            assert_eq!(
                result["locations"][0]["physicalLocation"]["artifactLocation"]["uri"],
                "bad.yaml-2"
            );
        }
        assert_eq!(
            results[0]["locations"][0]["physicalLocation"]["region"]["snippet"]["text"],
            "Path: /port"
        );
        assert_eq!(results[0]["message"]["text"], "At path '/port': bad type");
    }

    #[test]
    fn line_numbers_are_never_derived() {
        let report = report_of(vec![(
            "bad.yaml",
            ValidationOutcome::with_details(vec![ValidationOutcome::detail(
                "/a", "/s/a", "boom",
            )]),
        )]);
        let sarif: serde_json::Value =
            serde_json::from_str(&to_sarif_string(&report).unwrap()).unwrap();
        let region = &sarif["runs"][0]["results"][0]["locations"][0]["physicalLocation"]["region"];
        assert!(region.get("startLine").is_none());
        assert!(region.get("startColumn").is_none());
    }

    #[test]
    fn top_level_error_result_has_no_region() {
        let report = report_of(vec![(
            "broken.yaml",
            ValidationOutcome::generic_error("YAML parse error: bad indent"),
        )]);
        let sarif: serde_json::Value =
            serde_json::from_str(&to_sarif_string(&report).unwrap()).unwrap();
        let physical = &sarif["runs"][0]["results"][0]["locations"][0]["physicalLocation"];
        assert_eq!(physical["artifactLocation"]["uri"], "broken.yaml");
        assert!(physical.get("region").is_none());
        assert_eq!(sarif["runs"][0]["invocations"][0]["exitCode"], 1);
    }

    #[test]
    fn tool_driver_declares_the_validation_rule() {
        let report = report_of(vec![("a.yaml", ValidationOutcome::ok())]);
        let sarif: serde_json::Value =
            serde_json::from_str(&to_sarif_string(&report).unwrap()).unwrap();
        let driver = &sarif["runs"][0]["tool"]["driver"];
        assert_eq!(driver["name"], "validate-config");
        assert!(driver.get("informationUri").is_none());
        assert_eq!(driver["rules"][0]["id"], "schema-validation");
        assert_eq!(driver["rules"][0]["defaultConfiguration"]["level"], "error");
    }
}
