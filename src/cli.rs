//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::csv_report_adapter::CsvReportAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::backtest::{self as backtest_engine, BacktestReport};
use crate::domain::config_validation::{
    read_date_range, validate_backtest_config, validate_strategy_config,
};
use crate::domain::error::CrosstraderError;
use crate::domain::indicator_helpers::{IndicatorSettings, apply_indicators};
use crate::domain::metrics::Performance;
use crate::domain::ohlcv::{Bar, Series};
use crate::domain::signal::{Signal, check_signal};
use crate::domain::strategy::StrategyConfig;
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;
use crate::ports::report_port::ReportPort;

#[derive(Parser, Debug)]
#[command(name = "crosstrader", about = "EMA crossover strategy backtester")]
pub struct Cli {
    /// Log filter used when RUST_LOG is unset (e.g. "debug", "crosstrader=trace")
    #[arg(long, global = true, default_value = "info")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a backtest over a symbol's history
    Backtest {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        symbol: Option<String>,
        /// Directory holding <SYMBOL>.csv
        #[arg(long)]
        data: Option<PathBuf>,
        /// Write the trade ledger to this CSV file
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Do not rerun with forced entries when no trades are produced
        #[arg(long)]
        no_fallback: bool,
    },
    /// Print the BUY/SELL/HOLD signal for the latest bar
    Signal {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        symbol: Option<String>,
        #[arg(long)]
        data: Option<PathBuf>,
    },
    /// Compute indicators and export the enriched series
    Indicators {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        symbol: Option<String>,
        #[arg(long)]
        data: Option<PathBuf>,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
}

/// Install the global tracing subscriber. `RUST_LOG` wins over `level`.
pub fn init_logging(level: &str) {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .try_init();
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Backtest {
            config,
            symbol,
            data,
            output,
            no_fallback,
        } => run_backtest(
            &config,
            symbol.as_deref(),
            data.as_deref(),
            output.as_deref(),
            !no_fallback,
        ),
        Command::Signal {
            config,
            symbol,
            data,
        } => run_signal(&config, symbol.as_deref(), data.as_deref()),
        Command::Indicators {
            config,
            symbol,
            data,
            output,
        } => run_indicators(&config, symbol.as_deref(), data.as_deref(), output.as_deref()),
        Command::Validate { config } => run_validate(&config),
    }
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(|err| {
        eprintln!("error: {err}");
        ExitCode::from(&err)
    })
}

/// Validate `[strategy]` and `[backtest]`, then build the run configuration.
pub fn build_strategy_config(adapter: &dyn ConfigPort) -> Result<StrategyConfig, CrosstraderError> {
    validate_strategy_config(adapter)?;
    validate_backtest_config(adapter)?;

    let defaults = StrategyConfig::default();
    let period = |key: &str, default: usize| {
        let value = adapter.get_int("strategy", key, default as i64);
        usize::try_from(value).unwrap_or(default)
    };

    Ok(StrategyConfig {
        rsi_period: period("rsi_period", defaults.rsi_period),
        ema_period: period("ema_period", defaults.ema_period),
        sma_period: period("sma_period", defaults.sma_period),
        rsi_buy_threshold: adapter.get_double("strategy", "rsi_buy", defaults.rsi_buy_threshold),
        rsi_sell_threshold: adapter.get_double(
            "strategy",
            "rsi_sell",
            defaults.rsi_sell_threshold,
        ),
        adx_min_strength: adapter.get_double(
            "strategy",
            "adx_min_strength",
            defaults.adx_min_strength,
        ),
        use_sma_filter: adapter.get_bool("strategy", "use_sma_filter", defaults.use_sma_filter),
        use_macd_filter: adapter.get_bool("strategy", "use_macd_filter", defaults.use_macd_filter),
        stop_loss_fraction: adapter.get_double(
            "backtest",
            "stop_loss",
            defaults.stop_loss_fraction,
        ),
        take_profit_fraction: adapter.get_double(
            "backtest",
            "take_profit",
            defaults.take_profit_fraction,
        ),
        date_range: read_date_range(adapter)?,
        force_signal: adapter.get_bool("backtest", "force_signal", defaults.force_signal),
    })
}

/// `--symbol` if given, else `[data] symbol`.
pub fn resolve_symbol(
    symbol_override: Option<&str>,
    config: &dyn ConfigPort,
) -> Result<String, CrosstraderError> {
    symbol_override
        .map(str::to_string)
        .or_else(|| config.get_string("data", "symbol"))
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| CrosstraderError::ConfigMissing {
            section: "data".into(),
            key: "symbol".into(),
        })
}

/// `--data` if given, else `[data] path`, else the working directory.
pub fn resolve_data_dir(data_override: Option<&Path>, config: &dyn ConfigPort) -> PathBuf {
    data_override
        .map(Path::to_path_buf)
        .or_else(|| config.get_string("data", "path").map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Fetch, enrich and simulate. With `fallback`, an empty ledger triggers a
/// single rerun with forced entries.
pub fn run_backtest_pipeline(
    data_port: &dyn DataPort,
    symbol: &str,
    config: &StrategyConfig,
    fallback: bool,
) -> Result<BacktestReport, CrosstraderError> {
    let enriched = enrich_series(data_port, symbol, config)?;
    if fallback {
        backtest_engine::run_backtest(&enriched, config)
    } else {
        backtest_engine::simulate(&enriched, config)
    }
}

/// Signal for the latest bar, refusing to decide on less than `sma_period` bars.
pub fn latest_signal(
    data_port: &dyn DataPort,
    symbol: &str,
    config: &StrategyConfig,
) -> Result<(Signal, Bar), CrosstraderError> {
    let enriched = enrich_series(data_port, symbol, config)?;
    if enriched.len() < config.sma_period {
        return Err(CrosstraderError::InsufficientData {
            bars: enriched.len(),
            minimum: config.sma_period,
        });
    }
    let bars = enriched.bars();
    let latest = bars
        .last()
        .cloned()
        .ok_or(CrosstraderError::InsufficientData {
            bars: 0,
            minimum: config.sma_period.max(1),
        })?;
    Ok((check_signal(bars, config), latest))
}

pub fn enrich_series(
    data_port: &dyn DataPort,
    symbol: &str,
    config: &StrategyConfig,
) -> Result<Series, CrosstraderError> {
    let raw = data_port.fetch_series(symbol)?;
    apply_indicators(&raw, &IndicatorSettings::for_strategy(config))
}

struct Setup {
    config: StrategyConfig,
    symbol: String,
    data_port: CsvAdapter,
}

fn setup(
    config_path: &Path,
    symbol_override: Option<&str>,
    data_override: Option<&Path>,
) -> Result<Setup, ExitCode> {
    // Stage 1: Load config
    eprintln!("Loading config from {}", config_path.display());
    let adapter = load_config(config_path)?;

    // Stage 2: Validate and build strategy config
    let config = build_strategy_config(&adapter).map_err(|e| report_error(&e))?;

    // Stage 3: Resolve data source
    let symbol = resolve_symbol(symbol_override, &adapter).map_err(|e| report_error(&e))?;
    let data_dir = resolve_data_dir(data_override, &adapter);
    eprintln!("Loading {} from {}", symbol, data_dir.display());

    Ok(Setup {
        config,
        symbol,
        data_port: CsvAdapter::new(data_dir),
    })
}

fn run_backtest(
    config_path: &Path,
    symbol_override: Option<&str>,
    data_override: Option<&Path>,
    output_path: Option<&Path>,
    fallback: bool,
) -> ExitCode {
    let setup = match setup(config_path, symbol_override, data_override) {
        Ok(s) => s,
        Err(code) => return code,
    };

    // Stage 4: Simulate
    let report = match run_backtest_pipeline(&setup.data_port, &setup.symbol, &setup.config, fallback)
    {
        Ok(r) => r,
        Err(e) => return report_error(&e),
    };
    let performance = Performance::compute(&report.trades);

    // Stage 5: Print results
    print_ledger(&report);
    print_summary(&setup.symbol, &report, performance.as_ref());

    // Stage 6: Export ledger
    if let Some(path) = output_path {
        if let Err(e) = CsvReportAdapter::new().write(&report, performance.as_ref(), path) {
            return report_error(&e);
        }
        eprintln!("\nTrade ledger written to: {}", path.display());
    }
    ExitCode::SUCCESS
}

fn run_signal(
    config_path: &Path,
    symbol_override: Option<&str>,
    data_override: Option<&Path>,
) -> ExitCode {
    let setup = match setup(config_path, symbol_override, data_override) {
        Ok(s) => s,
        Err(code) => return code,
    };

    match latest_signal(&setup.data_port, &setup.symbol, &setup.config) {
        Ok((signal, bar)) => {
            println!(
                "{} {} close={:.2} signal={}",
                setup.symbol, bar.timestamp, bar.close, signal
            );
            eprintln!(
                "  rsi={} ema={} sma={} adx={} macd={} macd_signal={}",
                fmt_opt(bar.rsi),
                fmt_opt(bar.ema),
                fmt_opt(bar.sma),
                fmt_opt(bar.adx),
                fmt_opt(bar.macd),
                fmt_opt(bar.macd_signal),
            );
            ExitCode::SUCCESS
        }
        Err(e) => report_error(&e),
    }
}

fn run_indicators(
    config_path: &Path,
    symbol_override: Option<&str>,
    data_override: Option<&Path>,
    output_path: Option<&Path>,
) -> ExitCode {
    let setup = match setup(config_path, symbol_override, data_override) {
        Ok(s) => s,
        Err(code) => return code,
    };

    let enriched = match enrich_series(&setup.data_port, &setup.symbol, &setup.config) {
        Ok(s) => s,
        Err(e) => return report_error(&e),
    };
    eprintln!("Computed indicators over {} bars", enriched.len());

    match output_path {
        Some(path) => {
            if let Err(e) = CsvReportAdapter::new().write_series(&enriched, path) {
                return report_error(&e);
            }
            eprintln!("Series written to: {}", path.display());
        }
        None => {
            if let Some(bar) = enriched.bars().last() {
                println!(
                    "{} close={:.2} rsi={} ema={} sma={} adx={} macd={} macd_signal={}",
                    bar.timestamp,
                    bar.close,
                    fmt_opt(bar.rsi),
                    fmt_opt(bar.ema),
                    fmt_opt(bar.sma),
                    fmt_opt(bar.adx),
                    fmt_opt(bar.macd),
                    fmt_opt(bar.macd_signal),
                );
            }
        }
    }
    ExitCode::SUCCESS
}

pub fn run_validate(config_path: &Path) -> ExitCode {
    eprintln!("Validating config: {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    let config = match build_strategy_config(&adapter) {
        Ok(c) => c,
        Err(e) => return report_error(&e),
    };

    eprintln!("\nStrategy:");
    eprintln!(
        "  periods:    rsi={} ema={} sma={}",
        config.rsi_period, config.ema_period, config.sma_period
    );
    eprintln!(
        "  rsi:        buy < {} / sell > {}",
        config.rsi_buy_threshold, config.rsi_sell_threshold
    );
    eprintln!(
        "  filters:    sma={} macd={} adx>={}",
        config.use_sma_filter, config.use_macd_filter, config.adx_min_strength
    );
    eprintln!(
        "  exits:      stop={} target={}",
        config.stop_loss_fraction, config.take_profit_fraction
    );
    match &config.date_range {
        Some(range) => eprintln!("  range:      {} to {}", range.start, range.end),
        None => eprintln!("  range:      all bars"),
    }

    eprintln!("\nConfiguration is valid.");
    ExitCode::SUCCESS
}

fn print_ledger(report: &BacktestReport) {
    for trade in &report.trades {
        println!(
            "{}  {}  {:>10.2} -> {:<10.2} {:>+7.2}%  {}",
            trade.entry_timestamp,
            trade.exit_timestamp,
            trade.entry_price,
            trade.exit_price,
            trade.return_pct,
            trade.exit_reason,
        );
    }
}

fn print_summary(symbol: &str, report: &BacktestReport, performance: Option<&Performance>) {
    eprintln!("\n=== Results: {} ({} bars) ===", symbol, report.bars);
    if report.forced {
        eprintln!("Note: entries were forced; no signal-driven trades were found.");
    }
    match performance {
        Some(p) => {
            eprintln!("Total Trades:     {}", p.trades);
            eprintln!("Win Rate:         {:.1}%", p.win_rate * 100.0);
            eprintln!("Average Return:   {:.2}%", p.avg_return);
            eprintln!("Total Return:     {:.2}%", p.total_return * 100.0);
            eprintln!("Best Trade:       {:.2}%", p.best_trade);
            eprintln!("Worst Trade:      {:.2}%", p.worst_trade);
        }
        None => eprintln!("No trades"),
    }

    if !report.debug_counts.is_empty() {
        eprintln!("\n=== Filter Counts ===");
        for (name, count) in &report.debug_counts {
            eprintln!("  {name:<18} {count}");
        }
    }
}

fn fmt_opt(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{v:.2}"))
}

fn report_error(err: &CrosstraderError) -> ExitCode {
    eprintln!("error: {err}");
    err.into()
}
