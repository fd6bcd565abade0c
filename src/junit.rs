//! JUnit XML renderer.
//!
//! One `testcase` per resultkey under a single `testsuite`; invalid outcomes
//! carry a `failure` child whose `message` is a short categorical label and
//! whose body concatenates every top-level and nested error message.

use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};

use crate::error::{Result, ValidationError};
use crate::report::{Report, ValidationOutcome};

const SUITE_NAME: &str = "SchemaValidationSuite";

pub fn to_junit_string(report: &Report) -> Result<String> {
    let tests = report.files.len();
    let failures = report.files.values().filter(|o| !o.valid).count();

    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

    let mut testsuites = BytesStart::new("testsuites");
    push_suite_attributes(&mut testsuites, tests, failures);
    writer.write_event(Event::Start(testsuites))?;

    let mut testsuite = BytesStart::new("testsuite");
    push_suite_attributes(&mut testsuite, tests, failures);
    writer.write_event(Event::Start(testsuite))?;

    for (resultkey, outcome) in &report.files {
        let mut testcase = BytesStart::new("testcase");
        testcase.push_attribute(("classname", "files"));
        testcase.push_attribute(("name", resultkey.as_str()));
        testcase.push_attribute(("time", "0.0"));

        if outcome.valid {
            writer.write_event(Event::Empty(testcase))?;
        } else {
            writer.write_event(Event::Start(testcase))?;

            let mut failure = BytesStart::new("failure");
            failure.push_attribute(("message", failure_label(outcome).as_str()));
            writer.write_event(Event::Start(failure))?;
            writer.write_event(Event::Text(BytesText::new(&failure_body(outcome))))?;
            writer.write_event(Event::End(BytesEnd::new("failure")))?;

            writer.write_event(Event::End(BytesEnd::new("testcase")))?;
        }
    }

    writer.write_event(Event::End(BytesEnd::new("testsuite")))?;
    writer.write_event(Event::End(BytesEnd::new("testsuites")))?;

    String::from_utf8(writer.into_inner())
        .map_err(|error| ValidationError::Render(error.to_string()))
}

fn push_suite_attributes(element: &mut BytesStart<'_>, tests: usize, failures: usize) {
    element.push_attribute(("name", SUITE_NAME));
    element.push_attribute(("tests", tests.to_string().as_str()));
    element.push_attribute(("failures", failures.to_string().as_str()));
    element.push_attribute(("errors", "0"));
    element.push_attribute(("skipped", "0"));
}

/// Short categorical label for a failed outcome, derived from its error
/// content.
fn failure_label(outcome: &ValidationOutcome) -> String {
    if let Some(message) = outcome.top_error() {
        if message.starts_with("No schema") {
            return "No Schema Error".to_string();
        }
        if message.contains("YAML parse error") {
            return "YAML Parse Error".to_string();
        }
        return "Validation Error".to_string();
    }
    if let Some(first) = outcome.details.as_ref().and_then(|details| details.first())
        && let Some(location) = &first.instance_location
        && first.errors.is_some()
    {
        return format!("Type Mismatch at {location}");
    }
    "Validation Failure".to_string()
}

/// All top-level and nested error messages, newline-joined.
fn failure_body(outcome: &ValidationOutcome) -> String {
    let mut messages = Vec::new();
    if let Some(message) = outcome.top_error() {
        messages.push(message.to_string());
    }
    if let Some(details) = &outcome.details {
        for detail in details {
            if let Some(errors) = &detail.errors {
                for message in errors.values() {
                    messages.push(message.clone());
                }
            }
        }
    }
    messages.join("\n")
}
