//! Stock Screener - Main Entry Point
//!
//! Runs a swing or long-term scan over the configured universe and prints
//! the ranked matches.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use stock_screener::config::Config;
use stock_screener::market::{InMemoryProvider, MarketDataProvider, YahooClient};
use stock_screener::strategy::{
    filter_by_strategy, strategy_counts, swing_label, top_n, LongTermResult, ScanReport, Scanner,
    Strategy, SwingResult, LONG_TERM_LABEL,
};
use tracing::{info, warn, Level};
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::EnvFilter;

/// Stock Screener CLI
#[derive(Parser)]
#[command(name = "stock-screener")]
#[command(version, about = "Swing and long-term equity screener")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the swing scan (days-long holding horizon)
    Swing {
        /// Keep only matches of one strategy
        /// (momentum_breakout, trend_continuation, momentum_volatility, all)
        #[arg(short, long, default_value = "all")]
        strategy: String,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Run the long-term scan (technical gate, then fundamentals)
    LongTerm {
        #[command(flatten)]
        output: OutputArgs,
    },

    /// Print the configured symbol universe
    Universe,
}

#[derive(clap::Args)]
struct OutputArgs {
    /// Show only the top N results
    #[arg(short, long)]
    limit: Option<usize>,

    /// Print results as JSON instead of a table
    #[arg(long)]
    json: bool,

    /// Write a scan report to this file or directory
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Read bars from <SYMBOL>.csv files in this directory instead of Yahoo
    #[arg(short, long)]
    data_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging()?;

    let config = Config::load()?;
    config.validate()?;

    match cli.command {
        Commands::Swing { strategy, output } => run_swing(config, &strategy, &output).await,
        Commands::LongTerm { output } => run_long_term(config, &output).await,
        Commands::Universe => {
            for symbol in &config.universe.symbols {
                println!("{symbol}");
            }
            Ok(())
        }
    }
}

/// Initialize logging with daily rotating files.
fn init_logging() -> Result<()> {
    use tracing_subscriber::fmt::writer::MakeWriterExt;

    std::fs::create_dir_all("logs")?;

    let file_appender = tracing_appender::rolling::daily("logs", "stock-screener.log");
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    // Keep the writer flushing for the program duration
    Box::leak(Box::new(guard));

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("stock_screener=debug".parse()?)
                .add_directive(Level::INFO.into()),
        )
        .with_writer(std::io::stderr.and(file_writer))
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .with_span_events(FmtSpan::CLOSE)
        .init();

    Ok(())
}

fn build_provider(config: &Config, data_dir: Option<&Path>) -> Result<Arc<dyn MarketDataProvider>> {
    match data_dir {
        Some(dir) => {
            let provider = InMemoryProvider::from_csv_dir(dir)?;
            info!(dir = %dir.display(), symbols = provider.symbols().len(), "Using local data");
            Ok(Arc::new(provider))
        }
        None => Ok(Arc::new(YahooClient::new(&config.provider)?)),
    }
}

async fn run_swing(config: Config, strategy_key: &str, args: &OutputArgs) -> Result<()> {
    let filter = Strategy::from_key(strategy_key);
    if filter.is_none() && !strategy_key.eq_ignore_ascii_case("all") {
        warn!(strategy = strategy_key, "Unknown strategy, showing all matches");
    }

    let provider = build_provider(&config, args.data_dir.as_deref())?;
    let scanner = Scanner::new(provider, config)?;

    info!(
        symbols = scanner.config().universe.symbols.len(),
        "Starting swing scan"
    );
    let results = filter_by_strategy(scanner.filter_stocks().await?, filter);
    let results = match args.limit {
        Some(n) => top_n(results, n),
        None => results,
    };

    if let Some(path) = &args.output {
        ScanReport::new(swing_label(strategy_key), results.clone()).write_to(path)?;
    }

    if args.json {
        print_json(&results)?;
    } else {
        print_swing_table(&results);
    }

    Ok(())
}

async fn run_long_term(config: Config, args: &OutputArgs) -> Result<()> {
    let provider = build_provider(&config, args.data_dir.as_deref())?;
    let scanner = Scanner::new(provider, config)?;

    info!(
        symbols = scanner.config().universe.symbols.len(),
        "Starting long-term scan"
    );
    let results = scanner.scan_long_term().await?;
    let results = match args.limit {
        Some(n) => top_n(results, n),
        None => results,
    };

    if let Some(path) = &args.output {
        ScanReport::new(LONG_TERM_LABEL, results.clone()).write_to(path)?;
    }

    if args.json {
        print_json(&results)?;
    } else {
        print_long_term_table(&results);
    }

    Ok(())
}

fn print_json<T: Serialize>(results: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(results).context("Failed to serialize results")?;
    println!("{json}");
    Ok(())
}

fn join_strategies(strategies: &[Strategy]) -> String {
    strategies
        .iter()
        .map(Strategy::name)
        .collect::<Vec<_>>()
        .join(", ")
}

fn print_swing_table(results: &[SwingResult]) {
    println!(
        "{:<8} {:>10} {:>8} {:>7} {:>6} {:>5} {:<7} {:<50} {}",
        "CODE", "PRICE", "VOL%", "RSI", "PRIO", "DAYS", "RISK", "STRATEGIES", "REASON"
    );
    for r in results {
        println!(
            "{:<8} {:>10.2} {:>8.1} {:>7.2} {:>6} {:>5} {:<7} {:<50} {}",
            r.code,
            r.price,
            r.volume_change,
            r.rsi,
            r.priority_score,
            r.estimated_holding_period_days,
            r.risk_level.to_string(),
            join_strategies(&r.strategies),
            r.reason
        );
    }

    println!("\n{} matches", results.len());
    for (strategy, count) in strategy_counts(results) {
        println!("  {:<20} {}", strategy.name(), count);
    }
}

fn print_long_term_table(results: &[LongTermResult]) {
    println!(
        "{:<8} {:>10} {:>8} {:>8} {:>8} {:>8} {:>7} {}",
        "CODE", "PRICE", "3M%", "1Y%", "P/E", "D/E", "SCORE", "STRATEGIES"
    );
    for r in results {
        println!(
            "{:<8} {:>10.2} {:>8.1} {:>8.1} {:>8.2} {:>8.2} {:>7.2} {}",
            r.code,
            r.price,
            r.return_3m,
            r.return_1y,
            r.pe_ratio,
            r.debt_to_equity,
            r.score,
            join_strategies(&r.strategies)
        );
    }

    let fundamental = results
        .iter()
        .filter(|r| r.strategies.contains(&Strategy::FundamentalStrength))
        .count();
    println!(
        "\n{} matches, {} with fundamental strength",
        results.len(),
        fundamental
    );
}
