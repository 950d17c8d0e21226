use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use salary_cli::AppConfig;
use salary_cli::input::parse_salary;
use salary_cli::report::{ComparisonTable, ProgressionTable, RegimeList, ResultReport};
use salary_core::calculations::{compare, progression, salary_grid};
use salary_core::{RegimeRegistry, UniversalCalculator};

// ─── CLI definition ──────────────────────────────────────────────────────────

/// Net salary calculator across European and Israeli tax regimes.
///
/// All amounts are annual and in EUR.
#[derive(Debug, Parser)]
struct Cli {
    /// TOML configuration file. A missing file means defaults.
    #[arg(long, default_value = "salary-compare.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Itemized calculation for one regime.
    Calculate {
        /// Regime key, e.g. `germany-salaried`.
        regime: String,
        /// Gross salary; commas are accepted as thousands separators.
        #[arg(value_parser = parse_salary)]
        salary: Decimal,
    },

    /// Same gross salary under several regimes.
    Compare {
        #[arg(value_parser = parse_salary)]
        salary: Decimal,
        /// Regimes to compare. Defaults to `[defaults] regimes`, then to all.
        regimes: Vec<String>,
    },

    /// Registered regime keys.
    List,

    /// Net salary over a range of gross salaries.
    Progression {
        regime: String,
        #[arg(long, default_value = "10000", value_parser = parse_salary)]
        from: Decimal,
        #[arg(long, default_value = "200000", value_parser = parse_salary)]
        to: Decimal,
        #[arg(long, default_value = "10000", value_parser = parse_salary)]
        step: Decimal,
    },
}

// ─── tracing ─────────────────────────────────────────────────────────────────

/// Initialise the tracing subscriber.
///
/// * Honours `RUST_LOG` when set.
/// * Falls back to `info` so normal runs are quiet.
/// * Strips timestamps and target names to keep CLI output clean.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::from("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .without_time()
        .with_target(false)
        .init();
}

// ─── entry point ─────────────────────────────────────────────────────────────

fn main() -> anyhow::Result<()> {
    init_tracing();

    let cli = Cli::parse();

    let config = AppConfig::load(&cli.config)
        .with_context(|| format!("failed to load configuration from {}", cli.config.display()))?;
    let rates = config
        .currency
        .fallback()
        .context("invalid [currency.fallback_rates]")?;

    debug!("building built-in regimes");
    let registry = RegimeRegistry::builtin(&rates).context("failed to build built-in regimes")?;

    match cli.command {
        Command::Calculate { regime, salary } => {
            let regime = registry.get(&regime)?;
            let result = UniversalCalculator::new(regime)
                .with_rate_provider(&rates)
                .calculate(salary)
                .with_context(|| format!("calculation failed for {}", regime.label()))?;
            println!("{}", ResultReport(&result));
        }
        Command::Compare { salary, regimes } => {
            let keys = if !regimes.is_empty() {
                regimes
            } else if !config.defaults.regimes.is_empty() {
                config.defaults.regimes
            } else {
                registry.get_keys().to_vec()
            };
            info!(regimes = keys.len(), "comparing");
            let results = compare(&registry, salary, &keys).context("comparison failed")?;
            println!("{}", ComparisonTable(&results));
        }
        Command::List => {
            print!("{}", RegimeList(&registry));
        }
        Command::Progression { regime, from, to, step } => {
            let regime = registry.get(&regime)?;
            let grid = salary_grid(from, to, step)?;
            let results = progression(regime, &grid)
                .with_context(|| format!("progression failed for {}", regime.label()))?;
            println!("{}", ProgressionTable(&results));
        }
    }

    Ok(())
}
