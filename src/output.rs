//! Report rendering: dispatch over the closed set of formats, plus the
//! colored text renderer.

use crate::cli::ReportFormat;
use crate::error::{Result, ValidationError};
use crate::junit;
use crate::report::Report;
use crate::sarif;

const ANSI_GREEN: &str = "\u{1b}[32m";
const ANSI_RED: &str = "\u{1b}[31m";
const ANSI_RESET: &str = "\u{1b}[0m";

/// Serialize a report in the requested format. Renderers never mutate the
/// report; exactly one runs per invocation.
pub fn render(report: &Report, format: ReportFormat, color: bool) -> Result<String> {
    match format {
        ReportFormat::Text => Ok(to_colored_string(report, color)),
        ReportFormat::Json => serde_json::to_string_pretty(report)
            .map_err(|error| ValidationError::Render(error.to_string())),
        ReportFormat::Yaml => {
            serde_yaml::to_string(report).map_err(|error| ValidationError::Render(error.to_string()))
        }
        ReportFormat::Junit => junit::to_junit_string(report),
        ReportFormat::Sarif => sarif::to_sarif_string(report),
    }
}

/// Render the plain-text summary. ANSI colors wrap only the ok/invalid
/// tokens; with color disabled the output is byte-identical plain text.
pub fn to_colored_string(report: &Report, color: bool) -> String {
    let (green, red, reset) = if color {
        (ANSI_GREEN, ANSI_RED, ANSI_RESET)
    } else {
        ("", "", "")
    };
    let verdict = |valid: bool| {
        if valid {
            format!("{green}ok{reset}")
        } else {
            format!("{red}invalid{reset}")
        }
    };

    let mut out = String::new();
    out.push_str(&format!("Validation Result: {}\n", verdict(report.valid)));

    for (name, outcome) in &report.files {
        out.push_str(&format!("{name}: {}\n", verdict(outcome.valid)));
        if outcome.valid {
            continue;
        }
        if let Some(errors) = &outcome.errors {
            for (label, message) in errors {
                out.push_str(&format!("  {label}: {message}\n"));
            }
        }
        if let Some(details) = &outcome.details {
            for detail in details {
                out.push_str("  Details:\n");
                out.push_str(&format!(
                    "    Path: {}\n",
                    detail.instance_location.as_deref().unwrap_or("")
                ));
                out.push_str(&format!(
                    "    Schema: {}\n",
                    detail.schema_location.as_deref().unwrap_or("")
                ));
                if let Some(errors) = &detail.errors {
                    for (label, message) in errors {
                        out.push_str(&format!("    {label}: {message}\n"));
                    }
                }
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::ValidationOutcome;
    use indexmap::IndexMap;

    fn sample_report() -> Report {
        let mut files = IndexMap::new();
        files.insert("good.yaml".to_string(), ValidationOutcome::ok());
        files.insert(
            "bad.yaml".to_string(),
            ValidationOutcome::with_details(vec![ValidationOutcome::detail(
                "/port",
                "/properties/port/type",
                "\"eighty\" is not of type \"integer\"",
            )]),
        );
        files.insert(
            "broken.yaml".to_string(),
            ValidationOutcome::generic_error("YAML parse error: bad indent"),
        );
        Report::aggregate(vec![files])
    }

    #[test]
    fn plain_text_layout() {
        let text = to_colored_string(&sample_report(), false);
        // Spot-check the layout line by line rather than full-string equality
        // to keep the engine's message text out of the assertion.
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Validation Result: invalid");
        assert_eq!(lines[1], "good.yaml: ok");
        assert_eq!(lines[2], "bad.yaml: invalid");
        assert_eq!(lines[3], "  Details:");
        assert_eq!(lines[4], "    Path: /port");
        assert_eq!(lines[5], "    Schema: /properties/port/type");
        assert!(lines[6].starts_with("    error: "));
        assert_eq!(lines[7], "broken.yaml: invalid");
        assert_eq!(lines[8], "  error: YAML parse error: bad indent");
    }

    #[test]
    fn color_disabled_output_has_no_ansi_escapes() {
        let text = to_colored_string(&sample_report(), false);
        assert!(!text.contains('\u{1b}'));
    }

    #[test]
    fn color_enabled_wraps_only_verdict_tokens() {
        let text = to_colored_string(&sample_report(), true);
        assert!(text.contains("Validation Result: \u{1b}[31minvalid\u{1b}[0m"));
        assert!(text.contains("good.yaml: \u{1b}[32mok\u{1b}[0m"));
        // Error lines stay uncolored.
        assert!(text.contains("  error: YAML parse error: bad indent"));
    }

    #[test]
    fn json_and_yaml_renderers_encode_identical_trees() {
        let report = sample_report();
        let json_text = render(&report, ReportFormat::Json, false).unwrap();
        let yaml_text = render(&report, ReportFormat::Yaml, false).unwrap();

        let from_json: serde_json::Value = serde_json::from_str(&json_text).unwrap();
        let from_yaml: serde_json::Value =
            serde_json::to_value(serde_yaml::from_str::<serde_yaml::Value>(&yaml_text).unwrap())
                .unwrap();
        assert_eq!(from_json, from_yaml);
        assert_eq!(from_json["valid"], false);
        assert!(from_json["files"]["good.yaml"]["valid"].as_bool().unwrap());
    }

    #[test]
    fn structural_formats_round_trip_to_the_report_model() {
        let report = sample_report();
        let json_text = render(&report, ReportFormat::Json, false).unwrap();
        let decoded: Report = serde_json::from_str(&json_text).unwrap();
        assert_eq!(decoded, report);
    }
}
