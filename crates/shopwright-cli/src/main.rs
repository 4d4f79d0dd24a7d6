//! Shopwright CLI: run end-to-end journeys against the Automation Exercise storefront
//!
//! ## Usage
//!
//! ```bash
//! shopwright list                          # Show the catalogue
//! shopwright run                           # Run every journey in Chromium
//! shopwright run --offline -j 4            # Run on the in-memory storefront
//! shopwright run --filter login --format json
//! ```

use clap::Parser;
use shopwright::{write_report, ReportFormat, RunConfig};
use shopwright_cli::{
    init_logging, select_journeys, Cli, CliConfig, CliError, CliResult, Commands, ConfigArgs,
    JourneyRunner, ListArgs, LogFormat, LogFormatArg, RunArgs, Verbosity,
};
use std::process::ExitCode;

fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::from(e.exit_code())
        }
    }
}

fn run() -> CliResult<ExitCode> {
    let cli = Cli::parse();
    let config = build_config(&cli);
    init_logging(&config);

    match cli.command {
        Commands::Run(args) => run_journeys(config, &args),
        Commands::List(args) => {
            run_list(&args)?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Config(args) => {
            run_config(&args)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn build_config(cli: &Cli) -> CliConfig {
    let log_format = match cli.log_format {
        LogFormatArg::Text => LogFormat::Text,
        LogFormatArg::Json => LogFormat::Json,
    };
    CliConfig::new()
        .with_verbosity(Verbosity::from_flags(cli.quiet, cli.verbose))
        .with_color(cli.color.into())
        .with_log_format(log_format)
}

fn run_journeys(config: CliConfig, args: &RunArgs) -> CliResult<ExitCode> {
    let suite = select_journeys(args.filter.as_deref())?;
    let runner = JourneyRunner::from_args(config, args)?;
    let runtime = tokio::runtime::Runtime::new()?;
    // Dropping an interrupted run drops its sessions, which kills the
    // browsers and removes their profiles
    let results = runtime.block_on(async {
        tokio::select! {
            results = runner.run(&suite) => results,
            _ = tokio::signal::ctrl_c() => Err(CliError::Interrupted),
        }
    })?;

    let format = ReportFormat::from(args.format);
    if format != ReportFormat::Text {
        println!("{}", format.render(&results)?);
    }
    if let Some(path) = &args.output {
        write_report(&results, format, path)?;
    }

    Ok(if results.exit_code() == 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn run_list(args: &ListArgs) -> CliResult<()> {
    let suite = select_journeys(args.filter.as_deref())?;
    let width = suite.names().iter().map(|n| n.len()).max().unwrap_or(0);
    for scenario in suite.scenarios() {
        println!("{:width$}  {}", scenario.name(), scenario.description());
    }
    Ok(())
}

fn run_config(args: &ConfigArgs) -> CliResult<()> {
    let config = RunConfig::load(args.config.as_deref())?;
    print!("{}", config.to_yaml()?);
    Ok(())
}
