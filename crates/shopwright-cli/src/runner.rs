//! Journey runner: turns CLI arguments into a configured harness run

use crate::commands::RunArgs;
use crate::config::CliConfig;
use crate::error::{CliError, CliResult};
use crate::output::ProgressReporter;
use shopwright::{
    scenarios, RunConfig, SessionFactory, SimulatorSessions, SuiteResults, TestHarness, TestSuite,
};
use std::sync::Arc;

/// Runs the catalogue with one resolved configuration
#[derive(Debug)]
pub struct JourneyRunner {
    cli: CliConfig,
    run: RunConfig,
}

impl JourneyRunner {
    /// Create a runner from an already resolved configuration
    #[must_use]
    pub const fn new(cli: CliConfig, run: RunConfig) -> Self {
        Self { cli, run }
    }

    /// Layer `args` over the config file and environment
    pub fn from_args(cli: CliConfig, args: &RunArgs) -> CliResult<Self> {
        let run = apply_args(RunConfig::load(args.config.as_deref())?, args)?;
        Ok(Self::new(cli, run))
    }

    /// Effective run configuration
    #[must_use]
    pub const fn config(&self) -> &RunConfig {
        &self.run
    }

    /// Run `suite` and report progress on stderr
    pub async fn run(&self, suite: &TestSuite) -> CliResult<SuiteResults> {
        let factory = self.session_factory()?;
        let reporter = Arc::new(ProgressReporter::new(
            self.cli.color.should_color(),
            self.cli.verbosity.is_quiet(),
        ));
        let harness = TestHarness::new()
            .with_workers(self.run.workers)
            .with_failure_screenshots(self.run.screenshot_on_failure)
            .with_hooks(reporter);
        let harness = if self.run.fail_fast {
            harness.with_fail_fast()
        } else {
            harness
        };

        tracing::info!(
            base_url = %self.run.base_url,
            offline = self.run.offline,
            workers = self.run.workers,
            "running journeys"
        );
        Ok(harness.run(suite, factory.as_ref()).await)
    }

    fn session_factory(&self) -> CliResult<Box<dyn SessionFactory>> {
        let session = self.run.session_config()?;
        if self.run.offline {
            return Ok(Box::new(SimulatorSessions::new(session)));
        }
        browser_sessions(&self.run, session)
    }
}

#[cfg(feature = "browser")]
fn browser_sessions(
    run: &RunConfig,
    session: shopwright::SessionConfig,
) -> CliResult<Box<dyn SessionFactory>> {
    Ok(Box::new(shopwright::ChromiumSessions::new(
        run.browser_config(),
        session,
    )))
}

#[cfg(not(feature = "browser"))]
fn browser_sessions(
    _run: &RunConfig,
    _session: shopwright::SessionConfig,
) -> CliResult<Box<dyn SessionFactory>> {
    Err(CliError::BrowserUnavailable)
}

/// Apply command-line flags on top of `config`
pub fn apply_args(mut config: RunConfig, args: &RunArgs) -> CliResult<RunConfig> {
    if let Some(url) = &args.base_url {
        config.base_url.clone_from(url);
    }
    if let Some(workers) = args.workers {
        config.workers = workers;
    }
    if let Some(dir) = &args.artifacts {
        config.artifacts_dir.clone_from(dir);
    }
    config.offline |= args.offline;
    config.fail_fast |= args.fail_fast;
    if args.headed {
        config.headless = false;
    }
    config.validate()?;
    Ok(config)
}

/// The catalogue narrowed by `filter`; an empty selection is an error
pub fn select_journeys(filter: Option<&str>) -> CliResult<TestSuite> {
    let catalogue = scenarios::catalogue();
    let Some(pattern) = filter else {
        return Ok(catalogue);
    };
    let selected = catalogue.filter(pattern);
    if selected.is_empty() {
        return Err(CliError::invalid_argument(format!(
            "no journey matches {pattern:?}; see `shopwright list`"
        )));
    }
    Ok(selected)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    mod apply_args_tests {
        use super::*;

        #[test]
        fn test_flags_override_config() {
            let args = RunArgs {
                base_url: Some("http://localhost:8080".to_string()),
                workers: Some(3),
                offline: true,
                headed: true,
                artifacts: Some(PathBuf::from("out")),
                ..RunArgs::default()
            };
            let config = apply_args(RunConfig::default(), &args).unwrap();
            assert_eq!(config.base_url, "http://localhost:8080");
            assert_eq!(config.workers, 3);
            assert!(config.offline);
            assert!(!config.headless);
            assert_eq!(config.artifacts_dir, PathBuf::from("out"));
        }

        #[test]
        fn test_flags_are_validated() {
            let args = RunArgs {
                workers: Some(0),
                ..RunArgs::default()
            };
            assert!(apply_args(RunConfig::default(), &args).is_err());
        }
    }

    mod selection_tests {
        use super::*;

        #[test]
        fn test_filter_narrows_catalogue() {
            let suite = select_journeys(Some("contact")).unwrap();
            assert_eq!(suite.names(), vec!["contact_form"]);
        }

        #[test]
        fn test_empty_selection_is_rejected() {
            let err = select_journeys(Some("checkout_with_card")).unwrap_err();
            assert!(matches!(err, CliError::InvalidArgument { .. }));
        }
    }

    mod run_tests {
        use super::*;

        #[tokio::test]
        async fn test_offline_run_of_one_journey() {
            let dir = tempfile::tempdir().unwrap();
            let run = RunConfig {
                offline: true,
                action_timeout_ms: 500,
                expect_timeout_ms: 500,
                artifacts_dir: dir.path().to_path_buf(),
                ..RunConfig::default()
            };
            let cli = CliConfig::new().with_verbosity(crate::config::Verbosity::Quiet);
            let runner = JourneyRunner::new(cli, run);
            let suite = select_journeys(Some("login_invalid")).unwrap();
            let results = runner.run(&suite).await.unwrap();
            assert!(results.all_passed(), "{:?}", results.failures());
        }
    }
}
