//! Suite reports: plain text for terminals, JSON for tooling, JUnit XML for CI.

use crate::harness::{ScenarioStatus, SuiteResults};
use crate::result::E2eResult;
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::path::Path;

/// Report output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    #[default]
    Text,
    Json,
    Junit,
}

impl ReportFormat {
    /// Render `results` in this format
    pub fn render(self, results: &SuiteResults) -> E2eResult<String> {
        match self {
            Self::Text => Ok(render_text(results)),
            Self::Json => render_json(results),
            Self::Junit => Ok(render_junit(results)),
        }
    }
}

/// One line per scenario, failure details indented below, then a summary
#[must_use]
pub fn render_text(results: &SuiteResults) -> String {
    let mut out = String::new();
    for result in &results.results {
        let mark = match result.status {
            ScenarioStatus::Passed => "PASS",
            ScenarioStatus::Failed => "FAIL",
            ScenarioStatus::Skipped => "SKIP",
        };
        let _ = writeln!(
            out,
            "{mark} {} ({} ms)",
            result.name,
            result.duration.as_millis()
        );
        if let Some(error) = &result.error {
            let _ = writeln!(out, "     error: {error}");
        }
        if let Some(page) = &result.page_state {
            let _ = writeln!(out, "     page: {page}");
        }
        if let Some(path) = &result.screenshot {
            let _ = writeln!(out, "     screenshot: {}", path.display());
        }
    }
    let _ = writeln!(out, "{}", summary(results));
    out
}

/// `suite: 9/11 passed, 1 failed, 1 skipped in 12.3s`
#[must_use]
pub fn summary(results: &SuiteResults) -> String {
    format!(
        "{}: {}/{} passed, {} failed, {} skipped in {:.1}s",
        results.suite_name,
        results.passed_count(),
        results.total(),
        results.failed_count(),
        results.skipped_count(),
        results.duration.as_secs_f64()
    )
}

/// Pretty-printed JSON with a `passed` flag and per-scenario results
pub fn render_json(results: &SuiteResults) -> E2eResult<String> {
    #[derive(Serialize)]
    struct Report<'a> {
        passed: bool,
        #[serde(flatten)]
        results: &'a SuiteResults,
    }
    Ok(serde_json::to_string_pretty(&Report {
        passed: results.all_passed(),
        results,
    })?)
}

/// JUnit XML for CI integration
#[must_use]
pub fn render_junit(results: &SuiteResults) -> String {
    let mut xml = String::new();
    xml.push_str(r#"<?xml version="1.0" encoding="UTF-8"?>"#);
    xml.push('\n');
    let _ = writeln!(
        xml,
        r#"<testsuite name="{}" tests="{}" failures="{}" skipped="{}" time="{:.3}">"#,
        escape_xml(&results.suite_name),
        results.total(),
        results.failed_count(),
        results.skipped_count(),
        results.duration.as_secs_f64()
    );

    for result in &results.results {
        let _ = writeln!(
            xml,
            r#"  <testcase name="{}" time="{:.3}">"#,
            escape_xml(&result.name),
            result.duration.as_secs_f64()
        );
        match result.status {
            ScenarioStatus::Failed => {
                let error = result.error.as_deref().unwrap_or_default();
                let kind = result
                    .error_kind
                    .map(|k| k.to_string())
                    .unwrap_or_else(|| "panic".to_string());
                let _ = writeln!(
                    xml,
                    r#"    <failure message="{}" type="{kind}">{}</failure>"#,
                    escape_xml(error),
                    escape_xml(error)
                );
            }
            ScenarioStatus::Skipped => xml.push_str("    <skipped/>\n"),
            ScenarioStatus::Passed => {}
        }
        xml.push_str("  </testcase>\n");
    }

    xml.push_str("</testsuite>\n");
    xml
}

/// Write a rendered report to `path`
pub fn write_report(results: &SuiteResults, format: ReportFormat, path: &Path) -> E2eResult<()> {
    let rendered = format.render(results)?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, rendered)?;
    tracing::info!(path = %path.display(), ?format, "report written");
    Ok(())
}

/// Escape XML special characters
fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::harness::ScenarioResult;
    use crate::result::{E2eError, PageState};
    use std::time::Duration;

    fn sample() -> SuiteResults {
        let mut failed = ScenarioResult::fail(
            "login_invalid_credentials",
            &E2eError::AssertionFailed {
                expectation: "text \"Your email or password is incorrect!\"".to_string(),
                actual: "<missing>".to_string(),
                page: PageState::new("Automation Exercise - Signup / Login", "https://automationexercise.com/login"),
            },
        )
        .with_duration(Duration::from_millis(820));
        failed.screenshot = Some("screenshots/failure.png".into());
        SuiteResults {
            suite_name: "automationexercise".to_string(),
            results: vec![
                ScenarioResult::pass("register_and_delete").with_duration(Duration::from_millis(1200)),
                failed,
                ScenarioResult::skipped("contact_form"),
            ],
            duration: Duration::from_millis(2100),
        }
    }

    mod text_tests {
        use super::*;

        #[test]
        fn test_text_lists_every_scenario() {
            let text = render_text(&sample());
            assert!(text.contains("PASS register_and_delete (1200 ms)"));
            assert!(text.contains("FAIL login_invalid_credentials"));
            assert!(text.contains("SKIP contact_form"));
            assert!(text.contains("url=\"https://automationexercise.com/login\""));
            assert!(text.contains("screenshot: screenshots/failure.png"));
        }

        #[test]
        fn test_summary_counts() {
            assert_eq!(
                summary(&sample()),
                "automationexercise: 1/3 passed, 1 failed, 1 skipped in 2.1s"
            );
        }
    }

    mod json_tests {
        use super::*;

        #[test]
        fn test_json_shape() {
            let json: serde_json::Value =
                serde_json::from_str(&render_json(&sample()).unwrap()).unwrap();
            assert_eq!(json["passed"], false);
            assert_eq!(json["suite_name"], "automationexercise");
            assert_eq!(json["results"][1]["error_kind"], "AssertionFailed");
            assert_eq!(json["results"][1]["duration_ms"], 820);
            assert_eq!(json["results"][2]["status"], "skipped");
        }
    }

    mod junit_tests {
        use super::*;

        #[test]
        fn test_junit_escapes_and_counts() {
            let xml = render_junit(&sample());
            assert!(xml.contains(r#"tests="3" failures="1" skipped="1""#));
            assert!(xml.contains("&quot;Your email or password is incorrect!&quot;"));
            assert!(xml.contains(r#"type="assertion-failed""#));
            assert!(xml.contains("<skipped/>"));
        }

        #[test]
        fn test_write_report_creates_parent() {
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join("reports/junit.xml");
            write_report(&sample(), ReportFormat::Junit, &path).unwrap();
            assert!(std::fs::read_to_string(path).unwrap().starts_with("<?xml"));
        }
    }
}
