//! CLI definition and dispatch.

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::Level;

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::csv_report_adapter::CsvReportAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::backtest::{self as backtest_engine, BacktestResult};
use crate::domain::config_validation::{
    parse_date, validate_backtest_config, validate_dates, validate_strategy_config,
};
use crate::domain::error::BacktestError;
use crate::domain::strategy::{SessionWindow, StrategyConfig};
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;
use crate::ports::report_port::ReportPort;

const DEFAULT_DATA_DIR: &str = "data";
const DEFAULT_OUTPUT_DIR: &str = ".";
const BAR_MINUTES: f64 = 5.0;

#[derive(Parser, Debug)]
#[command(
    name = "sessiontrader",
    about = "Session-open level rejection strategy backtester"
)]
pub struct Cli {
    /// Log at debug level
    #[arg(short, long, global = true)]
    pub verbose: bool,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a backtest
    Backtest {
        #[arg(short, long)]
        config: PathBuf,
        /// Directory holding <SYMBOL>.csv files
        #[arg(short, long)]
        data: Option<PathBuf>,
        #[arg(long)]
        symbol: Option<String>,
        /// Directory for backtest_trades.csv and backtest_metrics.json
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[arg(long)]
        dry_run: bool,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
}

/// Installs the stderr log subscriber. Call once, before [`run`].
pub fn init_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(level)
        .with_target(false)
        .init();
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Backtest {
            config,
            data,
            symbol,
            output,
            dry_run,
        } => {
            let overrides = RunOverrides {
                symbol,
                data_dir: data,
                output_dir: output,
            };
            if dry_run {
                run_dry_run(&config, &overrides)
            } else {
                run_backtest(&config, &overrides)
            }
        }
        Command::Validate { config } => run_validate(&config),
    }
}

/// Command-line values that take precedence over `[backtest]`.
#[derive(Debug, Clone, Default)]
pub struct RunOverrides {
    pub symbol: Option<String>,
    pub data_dir: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
}

/// Everything a run needs besides the strategy parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSettings {
    pub symbol: String,
    pub data_dir: PathBuf,
    pub output_dir: PathBuf,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

pub fn load_config(path: &PathBuf) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(|e| {
        let err = BacktestError::ConfigParse {
            file: path.display().to_string(),
            reason: e.to_string(),
        };
        eprintln!("error: {err}");
        ExitCode::from(&err)
    })
}

fn fail(err: BacktestError) -> ExitCode {
    eprintln!("error: {err}");
    (&err).into()
}

fn read_hour(config: &dyn ConfigPort, key: &str, default: u32) -> Result<u32, BacktestError> {
    let hour = config.get_usize("session", key, default as usize)?;
    u32::try_from(hour)
        .map_err(|_| BacktestError::invalid("session", key, format!("{} is out of range", key)))
}

/// Reads `[strategy]` and `[session]`, filling absent keys with defaults,
/// and validates the result.
pub fn build_strategy_config(config: &dyn ConfigPort) -> Result<StrategyConfig, BacktestError> {
    let defaults = StrategyConfig::default();
    let strategy = StrategyConfig {
        volume_multiplier: config.get_double(
            "strategy",
            "volume_multiplier",
            defaults.volume_multiplier,
        )?,
        volume_window: config.get_usize("strategy", "volume_window", defaults.volume_window)?,
        min_wick_pips: config.get_double("strategy", "min_wick_pips", defaults.min_wick_pips)?,
        min_body_pips: config.get_double("strategy", "min_body_pips", defaults.min_body_pips)?,
        trend_length: config.get_usize("strategy", "trend_length", defaults.trend_length)?,
        stop_loss_pips: config.get_double("strategy", "stop_loss_pips", defaults.stop_loss_pips)?,
        tp1_pips: config.get_double("strategy", "tp1_pips", defaults.tp1_pips)?,
        tp2_pips: config.get_double("strategy", "tp2_pips", defaults.tp2_pips)?,
        tolerance_pips: config.get_double("strategy", "tolerance_pips", defaults.tolerance_pips)?,
        max_bars: config.get_usize("strategy", "max_bars", defaults.max_bars)?,
        session_bars: config.get_usize("strategy", "session_bars", defaults.session_bars)?,
        warmup_bars: config.get_usize("strategy", "warmup_bars", defaults.warmup_bars)?,
        session: SessionWindow {
            start_hour: read_hour(config, "start_hour", defaults.session.start_hour)?,
            end_hour: read_hour(config, "end_hour", defaults.session.end_hour)?,
        },
    };
    validate_strategy_config(&strategy)?;
    Ok(strategy)
}

/// Merges `[backtest]` with the command-line overrides.
pub fn resolve_run_settings(
    config: &dyn ConfigPort,
    overrides: &RunOverrides,
) -> Result<RunSettings, BacktestError> {
    let symbol = overrides
        .symbol
        .clone()
        .or_else(|| config.get_string("backtest", "symbol"))
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| BacktestError::ConfigMissing {
            section: "backtest".to_string(),
            key: "symbol".to_string(),
        })?;

    validate_dates(config)?;
    let start_date = parse_date(config, "start_date")?;
    let end_date = parse_date(config, "end_date")?;

    let dir = |flag: &Option<PathBuf>, key: &str, default: &str| {
        flag.clone().unwrap_or_else(|| {
            PathBuf::from(
                config
                    .get_string("backtest", key)
                    .unwrap_or_else(|| default.to_string()),
            )
        })
    };

    Ok(RunSettings {
        symbol,
        data_dir: dir(&overrides.data_dir, "data_dir", DEFAULT_DATA_DIR),
        output_dir: dir(&overrides.output_dir, "output_dir", DEFAULT_OUTPUT_DIR),
        start_date,
        end_date,
    })
}

fn run_backtest(config_path: &PathBuf, overrides: &RunOverrides) -> ExitCode {
    eprintln!("Loading config from {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    let settings = match resolve_run_settings(&adapter, overrides) {
        Ok(s) => s,
        Err(e) => return fail(e),
    };
    let strategy = match build_strategy_config(&adapter) {
        Ok(s) => s,
        Err(e) => return fail(e),
    };

    let data_port = CsvAdapter::new(settings.data_dir.clone());
    let report_port = CsvReportAdapter::new();

    match run_backtest_pipeline(&data_port, &report_port, &settings, &strategy) {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => fail(e),
    }
}

/// Fetch, run, print, persist.
pub fn run_backtest_pipeline(
    data_port: &dyn DataPort,
    report_port: &dyn ReportPort,
    settings: &RunSettings,
    strategy: &StrategyConfig,
) -> Result<BacktestResult, BacktestError> {
    eprintln!(
        "Loading {} bars from {} to {}",
        settings.symbol, settings.start_date, settings.end_date
    );
    let bars = data_port.fetch_bars(&settings.symbol, settings.start_date, settings.end_date)?;
    eprintln!("  Loaded: {} bars", bars.len());

    let result = backtest_engine::run_backtest(&bars, strategy)?;

    if result.trades.is_empty() {
        eprintln!("\nNo signals found. Try adjusting parameters or date range.");
    }
    print_summary(&result);

    report_port.write(&result, &settings.output_dir)?;
    eprintln!("\nResults written to: {}", settings.output_dir.display());
    Ok(result)
}

fn print_summary(result: &BacktestResult) {
    let m = result.metrics.rounded();
    let rule = "=".repeat(70);

    eprintln!("\n{rule}");
    eprintln!("BACKTEST RESULTS");
    eprintln!("{rule}");
    eprintln!("Total Trades:        {}", m.total_trades);
    eprintln!("Winners:             {} ({}%)", m.winners, m.win_rate);
    eprintln!("Losers:              {}", m.losers);
    eprintln!("{}", "-".repeat(70));
    eprintln!("Total Pips:          {:+.1}", m.total_pips);
    eprintln!("Avg Pips/Trade:      {:+.2}", m.avg_pips);
    eprintln!("Avg Win:             +{:.1} pips", m.avg_win_pips);
    eprintln!("Avg Loss:            {:.1} pips", m.avg_loss_pips);
    eprintln!("Profit Factor:       {:.2}", m.profit_factor);
    eprintln!(
        "Avg Time in Trade:   {:.1} bars (~{:.0} min)",
        m.avg_bars_in_trade,
        (m.avg_bars_in_trade * BAR_MINUTES).trunc()
    );
    eprintln!("{rule}");

    let assessment = result.metrics.assessment();
    eprintln!("\n{}: {}", assessment, assessment.message());
}

fn print_strategy(strategy: &StrategyConfig) {
    eprintln!("\nStrategy parameters:");
    eprintln!(
        "  volume spike:   {}x SMA({})",
        strategy.volume_multiplier, strategy.volume_window
    );
    eprintln!("  min wick:       {} pips", strategy.min_wick_pips);
    eprintln!("  min body:       {} pips", strategy.min_body_pips);
    eprintln!("  trend:          EMA({})", strategy.trend_length);
    eprintln!(
        "  exits:          stop {} | TP1 {} | TP2 {} pips, max {} bars",
        strategy.stop_loss_pips, strategy.tp1_pips, strategy.tp2_pips, strategy.max_bars
    );
    eprintln!("  level tolerance: {} pips", strategy.tolerance_pips);
    eprintln!(
        "  prior session:  {} bars, warmup {} bars",
        strategy.session_bars, strategy.warmup_bars
    );
    eprintln!(
        "  session:        {:02}:00-{:02}:00 UTC",
        strategy.session.start_hour, strategy.session.end_hour
    );
}

pub fn run_dry_run(config_path: &PathBuf, overrides: &RunOverrides) -> ExitCode {
    eprintln!("Loading config from {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    let settings = match resolve_run_settings(&adapter, overrides) {
        Ok(s) => s,
        Err(e) => return fail(e),
    };
    let strategy = match build_strategy_config(&adapter) {
        Ok(s) => s,
        Err(e) => return fail(e),
    };
    eprintln!("Config validated successfully");

    eprintln!("\nRun:");
    eprintln!("  symbol: {}", settings.symbol);
    eprintln!("  range:  {} to {}", settings.start_date, settings.end_date);
    eprintln!(
        "  data:   {}",
        settings.data_dir.join(format!("{}.csv", settings.symbol)).display()
    );
    eprintln!("  output: {}", settings.output_dir.display());
    print_strategy(&strategy);

    eprintln!("\nDry run complete: configuration is valid");
    ExitCode::SUCCESS
}

fn run_validate(config_path: &PathBuf) -> ExitCode {
    eprintln!("Validating config: {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    if let Err(e) = validate_backtest_config(&adapter) {
        return fail(e);
    }
    let strategy = match build_strategy_config(&adapter) {
        Ok(s) => s,
        Err(e) => return fail(e),
    };
    print_strategy(&strategy);

    eprintln!("\nConfig is valid");
    ExitCode::SUCCESS
}
