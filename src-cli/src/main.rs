//! hubcheck: end-to-end checks for the hub web application.
//!
//! ## Usage
//!
//! ```bash
//! hubcheck run --profile development            # Run the profile's groups
//! hubcheck run --group order-list --headed      # One group, visible browser
//! hubcheck list --profile health-check          # Scenarios a profile selects
//! hubcheck health                               # API health checks only
//! hubcheck config --profile staging             # Resolved config, secrets redacted
//! ```

mod runner;
mod scenarios;

use clap::{Args, Parser, Subcommand};
use hubcheck_commands::CommandContext;
use hubcheck_core::SuiteConfig;
use runner::{RunReport, Runner};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::info;

/// Exit code for configuration errors.
const CONFIG_ERROR: u8 = 2;

#[derive(Parser)]
#[command(name = "hubcheck")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Clone)]
struct ConfigArgs {
    /// Profile from the config file
    #[arg(long, short, env = "HUBCHECK_PROFILE")]
    profile: Option<String>,

    /// Config file (default: ./hubcheck.toml when present)
    #[arg(long, short, env = "HUBCHECK_CONFIG")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run scenarios
    Run {
        #[command(flatten)]
        config: ConfigArgs,

        /// Only run these groups (repeatable); overrides the profile's groups
        #[arg(long = "group", short)]
        groups: Vec<String>,

        /// Only run these scenarios (repeatable)
        #[arg(long = "scenario", short)]
        scenarios: Vec<String>,

        /// Show the browser window
        #[arg(long)]
        headed: bool,
    },

    /// List the scenarios a profile selects
    List {
        #[command(flatten)]
        config: ConfigArgs,
    },

    /// Check the dependent APIs
    Health {
        #[command(flatten)]
        config: ConfigArgs,
    },

    /// Print the resolved configuration with secrets redacted
    Config {
        #[command(flatten)]
        config: ConfigArgs,
    },
}

fn init_tracing() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,hubcheck=debug"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true))
        .with(filter)
        .init();
}

fn load_config(args: &ConfigArgs) -> anyhow::Result<SuiteConfig> {
    let config = SuiteConfig::load_with_env(args.config.as_deref(), args.profile.as_deref())?;
    info!(
        "Loaded profile {} for {}",
        args.profile.as_deref().unwrap_or("(base)"),
        config.app.base_url
    );
    Ok(config)
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            config,
            groups,
            scenarios,
            headed,
        } => {
            let Ok(mut config) = load_config(&config).map_err(report_config_error) else {
                return ExitCode::from(CONFIG_ERROR);
            };
            if !groups.is_empty() {
                config.suite.groups = groups;
            }
            if headed {
                config.browser.headless = false;
            }
            run(config, &scenarios).await
        }
        Commands::List { config } => {
            let Ok(config) = load_config(&config).map_err(report_config_error) else {
                return ExitCode::from(CONFIG_ERROR);
            };
            for scenario in scenarios::select(&config.suite.groups, &[]) {
                println!("{:<16} {}", scenario.group, scenario.name);
            }
            ExitCode::SUCCESS
        }
        Commands::Health { config } => {
            let Ok(config) = load_config(&config).map_err(report_config_error) else {
                return ExitCode::from(CONFIG_ERROR);
            };
            health(config).await
        }
        Commands::Config { config } => {
            match load_config(&config).and_then(|c| c.to_redacted_toml().map_err(Into::into)) {
                Ok(toml) => {
                    print!("{toml}");
                    ExitCode::SUCCESS
                }
                Err(e) => {
                    report_config_error(e);
                    ExitCode::from(CONFIG_ERROR)
                }
            }
        }
    }
}

fn report_config_error(e: anyhow::Error) {
    eprintln!("Configuration error: {e:#}");
}

async fn run(config: SuiteConfig, names: &[String]) -> ExitCode {
    let selected = scenarios::select(&config.suite.groups, names);
    if selected.is_empty() {
        eprintln!("No scenarios selected");
        return ExitCode::from(CONFIG_ERROR);
    }
    // Interactive runs use the open-mode retry budget
    let retries = if config.browser.headless {
        config.retries.run_mode
    } else {
        config.retries.open_mode
    };

    let ctx = match CommandContext::from_config(config) {
        Ok(ctx) => ctx,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            return ExitCode::from(CONFIG_ERROR);
        }
    };

    info!(
        "Starting hubcheck v{}: {} scenarios",
        env!("CARGO_PKG_VERSION"),
        selected.len()
    );
    let report = Runner::new(&ctx, retries).run(&selected).await;
    if let Err(e) = ctx.shutdown().await {
        tracing::warn!("Failed to close browser: {}", e);
    }

    print_summary(&report);
    if report.all_passed() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn print_summary(report: &RunReport) {
    println!();
    for scenario in &report.scenarios {
        let mark = if scenario.passed { "✓" } else { "✗" };
        println!(
            "  {mark} {:<16} {} ({:.1}s, {} attempt(s))",
            scenario.group,
            scenario.name,
            scenario.duration.as_secs_f64(),
            scenario.attempts
        );
        if let Some(error) = &scenario.error {
            println!("      {error}");
        }
        for path in &scenario.screenshots {
            println!("      screenshot: {}", path.display());
        }
    }
    println!();
    println!(
        "{} passed, {} failed, {} flaky in {:.1}s",
        report.passed(),
        report.failed(),
        report.flaky().len(),
        report.duration.as_secs_f64()
    );
}

async fn health(config: SuiteConfig) -> ExitCode {
    let checker = match hubcheck_health::HealthChecker::new(&config.health, &config.timeouts) {
        Ok(checker) => checker,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            return ExitCode::from(CONFIG_ERROR);
        }
    };

    let mut healthy = true;
    for endpoint in checker.endpoints() {
        match checker.check_api(endpoint).await {
            Ok(status) => println!(
                "✓ {:<16} {} ({}, {} attempt(s))",
                status.name,
                status.url,
                status.status.map_or_else(|| "-".to_string(), |s| s.to_string()),
                status.attempts
            ),
            Err(e) => {
                healthy = false;
                println!("✗ {e}");
            }
        }
    }
    if healthy {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
