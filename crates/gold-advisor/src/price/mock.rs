//! Mock Price Source
//!
//! Offline quotes around a base price. A seeded generator keeps the walk
//! reproducible, so two sources with the same seed agree.

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use chrono::{Duration, Local, NaiveDateTime};

use super::{GoldPrice, PriceSource};
use crate::error::Result;

const BASE_PRICE: f64 = 2650.0;
const DEFAULT_SEED: u64 = 0x9e37_79b9_7f4a_7c15;

/// Spot quotes deviate at most this far from the base, in USD
const SPOT_SPREAD: f64 = 50.0;
/// Daily moves stay within this many percent
const DAILY_MOVE_PCT: f64 = 2.0;
/// Reported 24h changes stay within this many USD
const CHANGE_SPREAD: f64 = 30.0;

pub struct MockPriceSource {
    base_price: f64,
    seed: u64,
    /// Advanced on every spot quote
    calls: AtomicU64,
}

impl Default for MockPriceSource {
    fn default() -> Self {
        Self::new()
    }
}

impl MockPriceSource {
    pub fn new() -> Self {
        Self::with_seed(DEFAULT_SEED)
    }

    pub fn with_seed(seed: u64) -> Self {
        Self {
            base_price: BASE_PRICE,
            seed,
            calls: AtomicU64::new(0),
        }
    }

    #[must_use]
    pub fn with_base_price(mut self, base_price: f64) -> Self {
        self.base_price = base_price;
        self
    }

    /// Spot quote for the `n`th call
    pub fn quote_at(&self, n: u64, at: NaiveDateTime) -> GoldPrice {
        let mut rng = Lcg::new(self.seed ^ n.wrapping_mul(0xa076_1d64_78bd_642f));
        let price = self.base_price + rng.between(-SPOT_SPREAD, SPOT_SPREAD);
        let change = rng.between(-CHANGE_SPREAD, CHANGE_SPREAD);
        GoldPrice::new(at, price, change, "模拟数据")
    }

    /// Daily walk of `days` quotes ending at `end`
    pub fn history_until(&self, days: usize, end: NaiveDateTime) -> Vec<GoldPrice> {
        let mut rng = Lcg::new(self.seed);
        let mut price = self.base_price;

        (0..days)
            .map(|i| {
                price *= 1.0 + rng.between(-DAILY_MOVE_PCT, DAILY_MOVE_PCT) / 100.0;
                let change = rng.between(-CHANGE_SPREAD, CHANGE_SPREAD);
                let back = i64::try_from(days - i - 1).unwrap_or(i64::MAX);
                let at = Duration::try_days(back)
                    .and_then(|d| end.checked_sub_signed(d))
                    .unwrap_or(NaiveDateTime::MIN);
                GoldPrice::new(at, price, change, "模拟历史数据")
            })
            .collect()
    }
}

#[async_trait]
impl PriceSource for MockPriceSource {
    async fn current_price(&self) -> Result<GoldPrice> {
        let n = self.calls.fetch_add(1, Ordering::Relaxed);
        Ok(self.quote_at(n, Local::now().naive_local()))
    }

    async fn historical_prices(&self, days: usize) -> Result<Vec<GoldPrice>> {
        Ok(self.history_until(days, Local::now().naive_local()))
    }

    fn name(&self) -> &str {
        "mock"
    }
}

/// 64-bit linear congruential generator
struct Lcg(u64);

impl Lcg {
    const fn new(seed: u64) -> Self {
        Self(seed)
    }

    /// Uniform in [0, 1)
    fn next_unit(&mut self) -> f64 {
        self.0 = self
            .0
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);
        (self.0 >> 11) as f64 / (1u64 << 53) as f64
    }

    fn between(&mut self, low: f64, high: f64) -> f64 {
        low + (high - low) * self.next_unit()
    }
}
