//! Output formatting and progress reporting

use console::{style, Style, Term};
use indicatif::{ProgressBar, ProgressStyle};
use shopwright::{LifecycleHooks, ScenarioResult, ScenarioStatus, SuiteResults, TestSuite};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

/// Progress reporter for journey execution.
///
/// Registered with the harness as lifecycle hooks: the bar is created in
/// `before_all` and advanced as each journey finishes.
#[derive(Debug)]
pub struct ProgressReporter {
    term: Term,
    progress_bar: Mutex<Option<ProgressBar>>,
    /// Whether to use colors
    pub use_color: bool,
    /// Quiet mode
    pub quiet: bool,
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new(true, false)
    }
}

impl ProgressReporter {
    /// Create a new progress reporter
    #[must_use]
    pub fn new(use_color: bool, quiet: bool) -> Self {
        Self {
            term: Term::stderr(),
            progress_bar: Mutex::new(None),
            use_color,
            quiet,
        }
    }

    fn bar(&self) -> Option<ProgressBar> {
        self.progress_bar
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Start a progress bar for `total` journeys
    pub fn start_progress(&self, total: u64, message: &str) {
        if self.quiet || !self.term.is_term() {
            return;
        }

        let pb = ProgressBar::new(total);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("=>-"),
        );
        pb.set_message(message.to_string());
        pb.enable_steady_tick(Duration::from_millis(120));
        *self
            .progress_bar
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(pb);
    }

    /// Finish progress bar
    pub fn finish(&self) {
        if let Some(pb) = self.bar() {
            pb.finish_and_clear();
        }
    }

    fn write_line(&self, line: &str) {
        match self.bar() {
            Some(pb) => pb.println(line),
            None => {
                let _ = self.term.write_line(line);
            }
        }
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        if self.quiet {
            return;
        }

        let prefix = if self.use_color {
            style("✓").green().bold().to_string()
        } else {
            "PASS".to_string()
        };

        self.write_line(&format!("{prefix} {message}"));
    }

    /// Print a failure message
    pub fn failure(&self, message: &str) {
        // Always print failures, even in quiet mode
        let prefix = if self.use_color {
            style("✗").red().bold().to_string()
        } else {
            "FAIL".to_string()
        };

        self.write_line(&format!("{prefix} {message}"));
    }

    /// Print a skipped message
    pub fn skipped(&self, message: &str) {
        if self.quiet {
            return;
        }

        let prefix = if self.use_color {
            style("-").yellow().bold().to_string()
        } else {
            "SKIP".to_string()
        };

        self.write_line(&format!("{prefix} {message}"));
    }

    /// Print a section header
    pub fn header(&self, title: &str) {
        if self.quiet {
            return;
        }

        let styled = if self.use_color {
            style(title).bold().underlined().to_string()
        } else {
            format!("=== {title} ===")
        };

        let _ = self.term.write_line("");
        let _ = self.term.write_line(&styled);
    }

    /// Print run summary
    pub fn summary(&self, passed: usize, failed: usize, skipped: usize, duration: Duration) {
        if self.quiet && failed == 0 {
            return;
        }

        let _ = self.term.write_line("");

        let total = passed + failed + skipped;
        let duration_secs = duration.as_secs_f64();

        if self.use_color {
            let passed_style = Style::new().green().bold();
            let failed_style = Style::new().red().bold();
            let skipped_style = Style::new().yellow();

            let status = if failed > 0 {
                failed_style.apply_to("FAILED")
            } else {
                passed_style.apply_to("PASSED")
            };

            let _ = self.term.write_line(&format!(
                "{} {} journeys in {:.2}s ({} passed, {} failed, {} skipped)",
                status,
                total,
                duration_secs,
                passed_style.apply_to(passed),
                if failed > 0 {
                    failed_style.apply_to(failed).to_string()
                } else {
                    failed.to_string()
                },
                skipped_style.apply_to(skipped)
            ));
        } else {
            let status = if failed > 0 { "FAILED" } else { "PASSED" };
            let _ = self.term.write_line(&format!(
                "{status} {total} journeys in {duration_secs:.2}s ({passed} passed, {failed} failed, {skipped} skipped)"
            ));
        }
    }
}

/// One-line description of a finished journey
#[must_use]
pub fn describe(result: &ScenarioResult) -> String {
    let mut line = format!("{} ({} ms)", result.name, result.duration.as_millis());
    if let Some(error) = &result.error {
        line.push_str(&format!("\n    {error}"));
    }
    if let Some(path) = &result.screenshot {
        line.push_str(&format!("\n    screenshot: {}", path.display()));
    }
    line
}

impl LifecycleHooks for ProgressReporter {
    fn before_all(&self, suite: &TestSuite) {
        self.header(&format!("{} ({} journeys)", suite.name, suite.len()));
        self.start_progress(suite.len() as u64, "running");
    }

    fn before_each(&self, scenario: &str) {
        if let Some(pb) = self.bar() {
            pb.set_message(scenario.to_string());
        }
    }

    fn after_each(&self, result: &ScenarioResult) {
        match result.status {
            ScenarioStatus::Passed => self.success(&describe(result)),
            ScenarioStatus::Failed => self.failure(&describe(result)),
            ScenarioStatus::Skipped => self.skipped(&result.name),
        }
        if let Some(pb) = self.bar() {
            pb.inc(1);
        }
    }

    fn after_all(&self, results: &SuiteResults) {
        self.finish();
        self.summary(
            results.passed_count(),
            results.failed_count(),
            results.skipped_count(),
            results.duration,
        );
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    mod progress_reporter_tests {
        use super::*;

        #[test]
        fn test_new_reporter() {
            let reporter = ProgressReporter::new(true, false);
            assert!(reporter.use_color);
            assert!(!reporter.quiet);
        }

        #[test]
        fn test_quiet_reporter_has_no_bar() {
            let reporter = ProgressReporter::new(false, true);
            reporter.start_progress(3, "running");
            assert!(reporter.bar().is_none());
        }

        #[test]
        fn test_hooks_do_not_panic_without_terminal() {
            let reporter = ProgressReporter::new(false, false);
            let suite = TestSuite::new("shop");
            reporter.before_all(&suite);
            reporter.before_each("login_logout");
            reporter.after_each(&ScenarioResult::skipped("login_logout"));
            reporter.after_all(&SuiteResults {
                suite_name: "shop".to_string(),
                results: vec![ScenarioResult::skipped("login_logout")],
                duration: Duration::from_millis(5),
            });
        }
    }

    mod describe_tests {
        use super::*;

        #[test]
        fn test_describe_includes_error() {
            let result = ScenarioResult::fail(
                "login_invalid_credentials",
                &shopwright::E2eError::driver("browser session is closed"),
            )
            .with_duration(Duration::from_millis(42));
            let line = describe(&result);
            assert!(line.starts_with("login_invalid_credentials (42 ms)"));
            assert!(line.contains("browser session is closed"));
        }
    }
}
