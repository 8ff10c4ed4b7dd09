//! TickLab CLI - replay tick data through the backtesting engine

use anyhow::Result;
use clap::Parser;
use common::{Qty, Tick};
use engine::TickEngine;
use sim::SyntheticConfig;
use std::path::PathBuf;
use std::time::Instant;
use strategies::{MarketMakerStrategy, MomentumStrategy};
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "ticklab")]
#[command(about = "Event-driven market backtester")]
#[command(version)]
struct Cli {
    /// CSV tick data (symbol,timestamp,price,volume,side); synthetic
    /// data is generated when omitted or unreadable
    data: Option<PathBuf>,

    /// Number of synthetic ticks to generate
    #[arg(long, default_value_t = 1_000_000)]
    ticks: usize,

    /// Seed for the synthetic tick generator
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Moving-average window for the momentum strategy
    #[arg(long, default_value_t = 20)]
    momentum_window: usize,

    /// Quoted spread in price ticks for the market maker
    #[arg(long, default_value_t = 100)]
    mm_spread: i64,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let ticks = load_or_generate(&cli);
    info!("loaded {} ticks", ticks.len());

    let mut engine = TickEngine::new();
    engine.add_strategy(Box::new(MomentumStrategy::new(
        cli.momentum_window,
        Qty::from_i64(100),
    )));
    engine.add_strategy(Box::new(MarketMakerStrategy::new(
        cli.mm_spread,
        Qty::from_i64(50),
        500,
    )));

    let start = Instant::now();
    engine.run_backtest(&ticks);
    let elapsed = start.elapsed();

    let stats = engine.stats();
    info!("=== backtest results ===");
    info!("ticks processed:  {}", stats.ticks_processed);
    info!("orders submitted: {}", stats.orders_submitted);
    info!("trades executed:  {}", stats.trades_executed);
    info!("total time:       {} ms", elapsed.as_millis());
    #[allow(clippy::cast_precision_loss)]
    let throughput = stats.ticks_processed as f64 / elapsed.as_secs_f64();
    info!("throughput:       {throughput:.0} ticks/sec");
    info!("avg latency:      {:.3} us/tick", stats.avg_latency_us());

    if let Some(tick) = ticks.first() {
        if let Some(book) = engine.get_order_book(&tick.symbol) {
            info!(
                "{} book: best bid {} / best ask {} ({} resting bid, {} resting ask, {} trades)",
                book.symbol(),
                book.best_bid(),
                book.best_ask(),
                book.bid_volume(),
                book.ask_volume(),
                book.total_trades()
            );
        }
    }

    Ok(())
}

fn load_or_generate(cli: &Cli) -> Vec<Tick> {
    let synthetic = || {
        sim::generate_ticks(&SyntheticConfig {
            count: cli.ticks,
            seed: cli.seed,
            ..SyntheticConfig::default()
        })
    };

    match &cli.data {
        Some(path) => match sim::load_ticks(path) {
            Ok(ticks) => ticks,
            Err(err) => {
                warn!("{err}; falling back to synthetic data");
                synthetic()
            }
        },
        None => synthetic(),
    }
}
