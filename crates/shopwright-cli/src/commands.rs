//! CLI command definitions using clap

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Shopwright: end-to-end journeys for the Automation Exercise storefront
#[derive(Parser, Debug)]
#[command(name = "shopwright")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (suppress non-error output)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Log line format on stderr
    #[arg(long, value_enum, default_value = "text", global = true)]
    pub log_format: LogFormatArg,

    /// Color output (auto, always, never)
    #[arg(long, value_enum, default_value = "auto", global = true)]
    pub color: ColorArg,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the journey catalogue
    Run(RunArgs),

    /// List journeys
    List(ListArgs),

    /// Show the effective configuration
    Config(ConfigArgs),
}

/// Arguments for the run command
#[derive(Parser, Debug, Default)]
#[allow(clippy::struct_excessive_bools)]
pub struct RunArgs {
    /// Only run journeys whose name contains this pattern
    #[arg(short, long)]
    pub filter: Option<String>,

    /// Run against the in-memory storefront instead of Chromium
    #[arg(long)]
    pub offline: bool,

    /// Concurrent journeys, each on its own session
    #[arg(short = 'j', long)]
    pub workers: Option<usize>,

    /// Stop starting journeys after the first failure
    #[arg(long)]
    pub fail_fast: bool,

    /// Show the browser window
    #[arg(long)]
    pub headed: bool,

    /// Site under test
    #[arg(long, env = "SHOPWRIGHT_BASE_URL")]
    pub base_url: Option<String>,

    /// YAML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Report format on stdout
    #[arg(long, value_enum, default_value = "text")]
    pub format: ReportFormatArg,

    /// Also write the report to this file
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Directory for screenshots and attachments
    #[arg(long)]
    pub artifacts: Option<PathBuf>,
}

/// Arguments for the list command
#[derive(Parser, Debug, Default)]
pub struct ListArgs {
    /// Only list journeys whose name contains this pattern
    #[arg(short, long)]
    pub filter: Option<String>,
}

/// Arguments for the config command
#[derive(Parser, Debug, Default)]
pub struct ConfigArgs {
    /// YAML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

/// Report format argument
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ReportFormatArg {
    /// Human-readable text
    #[default]
    Text,
    /// JSON
    Json,
    /// JUnit XML
    Junit,
}

impl From<ReportFormatArg> for shopwright::ReportFormat {
    fn from(arg: ReportFormatArg) -> Self {
        match arg {
            ReportFormatArg::Text => Self::Text,
            ReportFormatArg::Json => Self::Json,
            ReportFormatArg::Junit => Self::Junit,
        }
    }
}

/// Log format argument
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LogFormatArg {
    /// Human-readable lines
    #[default]
    Text,
    /// One JSON object per line
    Json,
}

/// Color argument
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ColorArg {
    /// Auto-detect
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

impl From<ColorArg> for crate::config::ColorChoice {
    fn from(arg: ColorArg) -> Self {
        match arg {
            ColorArg::Auto => Self::Auto,
            ColorArg::Always => Self::Always,
            ColorArg::Never => Self::Never,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    mod cli_parsing_tests {
        use super::*;

        #[test]
        fn test_run_flags() {
            let cli = Cli::try_parse_from([
                "shopwright",
                "-vv",
                "run",
                "--offline",
                "--filter",
                "login",
                "-j",
                "4",
                "--fail-fast",
                "--format",
                "json",
            ])
            .unwrap();
            assert_eq!(cli.verbose, 2);
            let Commands::Run(args) = cli.command else {
                panic!("expected run");
            };
            assert!(args.offline);
            assert!(args.fail_fast);
            assert_eq!(args.workers, Some(4));
            assert_eq!(args.filter.as_deref(), Some("login"));
            assert_eq!(args.format, ReportFormatArg::Json);
        }

        #[test]
        fn test_global_flags_after_subcommand() {
            let cli = Cli::try_parse_from(["shopwright", "list", "-q", "--log-format", "json"]).unwrap();
            assert!(cli.quiet);
            assert_eq!(cli.log_format, LogFormatArg::Json);
        }

        #[test]
        fn test_subcommand_required() {
            assert!(Cli::try_parse_from(["shopwright"]).is_err());
        }

        #[test]
        fn test_unknown_format_rejected() {
            assert!(Cli::try_parse_from(["shopwright", "run", "--format", "html"]).is_err());
        }
    }
}
