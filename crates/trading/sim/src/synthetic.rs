//! Seeded synthetic tick generation

use common::{Px, Qty, Side, Tick, Ts};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Parameters for the synthetic random walk
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyntheticConfig {
    /// Number of ticks to generate
    pub count: usize,
    /// Symbol stamped on every tick
    pub symbol: String,
    /// Starting price
    pub base_price: Px,
    /// RNG seed; identical seeds produce identical streams
    pub seed: u64,
    /// Timestamp of the first tick
    pub start_ts: Ts,
    /// Nanoseconds between consecutive ticks
    pub tick_interval_ns: u64,
}

impl Default for SyntheticConfig {
    fn default() -> Self {
        Self {
            count: 1_000_000,
            symbol: "AAPL".to_string(),
            base_price: Px::from_i64(1_000_000), // $100.00
            seed: 42,
            start_ts: Ts::from_nanos(1_700_000_000_000_000_000),
            tick_interval_ns: 1_000_000, // 1ms between ticks
        }
    }
}

/// Generate a deterministic random-walk tick stream
///
/// Prices step by up to ±0.1% per tick and are floored at one price
/// tick so the walk cannot cross zero. Volumes are uniform in
/// [100, 1000], sides a fair coin.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
pub fn generate_ticks(config: &SyntheticConfig) -> Vec<Tick> {
    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut ticks = Vec::with_capacity(config.count);

    let mut price = config.base_price.as_i64();
    let mut ts = config.start_ts.as_nanos();

    for _ in 0..config.count {
        let drift: f64 = rng.gen_range(-0.001..0.001);
        price += (price as f64 * drift) as i64;
        price = price.max(1);

        ticks.push(Tick {
            symbol: config.symbol.clone(),
            price: Px::from_i64(price),
            volume: Qty::from_i64(rng.gen_range(100..=1000)),
            timestamp: Ts::from_nanos(ts),
            side: if rng.gen_bool(0.5) { Side::Buy } else { Side::Sell },
        });
        ts += config.tick_interval_ns;
    }

    info!("generated {} synthetic ticks for {}", ticks.len(), config.symbol);
    ticks
}
