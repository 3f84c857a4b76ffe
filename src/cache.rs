use crate::config::CacheConfig;
use crate::errors::Result;
use crate::payoff::{PayoffEngine, PayoffSeries};
use crate::types::{OptionPosition, OptionType, Side};
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

/// Value-equality key over every input of a payoff request.
///
/// Floats are keyed by their bit pattern with `-0.0` folded into `0.0`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PayoffKey {
    positions: Vec<(u64, OptionType, i64, Side)>,
    start_price: u64,
    end_price: u64,
    num_points: usize,
}

fn float_key(value: f64) -> u64 {
    (value + 0.0).to_bits()
}

impl PayoffKey {
    pub fn new(
        positions: &[OptionPosition],
        start_price: f64,
        end_price: f64,
        num_points: usize,
    ) -> Self {
        Self {
            positions: positions
                .iter()
                .map(|p| (float_key(p.strike_price()), p.option_type(), p.lots(), p.side()))
                .collect(),
            start_price: float_key(start_price),
            end_price: float_key(end_price),
            num_points,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
}

#[derive(Debug, Default)]
struct CacheState {
    entries: HashMap<PayoffKey, Arc<PayoffSeries>>,
    order: VecDeque<PayoffKey>,
}

/// Bounded memo of payoff series, shared across threads.
///
/// Sits beside the engine rather than inside it; failed builds are never stored.
#[derive(Debug)]
pub struct PayoffCache {
    config: CacheConfig,
    state: RwLock<CacheState>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl PayoffCache {
    pub fn new(config: CacheConfig) -> Self {
        Self {
            config,
            state: RwLock::new(CacheState::default()),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    pub fn get_or_build(
        &self,
        engine: &PayoffEngine,
        positions: &[OptionPosition],
        start_price: f64,
        end_price: f64,
        num_points: usize,
    ) -> Result<Arc<PayoffSeries>> {
        if !self.config.enabled || self.config.capacity == 0 {
            let series = engine.build_payoff_series(positions, start_price, end_price, num_points)?;
            return Ok(Arc::new(series));
        }

        // Keys carry no engine settings; every request is checked against this engine.
        engine.validate_range(start_price, end_price, num_points)?;

        let key = PayoffKey::new(positions, start_price, end_price, num_points);

        {
            let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(series) = state.entries.get(&key) {
                self.hits.fetch_add(1, Ordering::Relaxed);
                tracing::trace!(num_points, "Payoff cache hit");
                return Ok(Arc::clone(series));
            }
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        let series = Arc::new(engine.build_payoff_series(
            positions,
            start_price,
            end_price,
            num_points,
        )?);

        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(existing) = state.entries.get(&key) {
            // Another caller built the same series first.
            return Ok(Arc::clone(existing));
        }
        while state.entries.len() >= self.config.capacity {
            match state.order.pop_front() {
                Some(oldest) => {
                    state.entries.remove(&oldest);
                }
                None => break,
            }
        }
        state.order.push_back(key.clone());
        state.entries.insert(key, Arc::clone(&series));
        tracing::debug!(entries = state.entries.len(), "Cached payoff series");

        Ok(series)
    }

    pub fn len(&self) -> usize {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .entries
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        state.entries.clear();
        state.order.clear();
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }
}

impl Default for PayoffCache {
    fn default() -> Self {
        Self::new(CacheConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PayoffConfig;
    use crate::errors::OptionsError;
    use std::thread;

    fn long_call(strike: f64) -> OptionPosition {
        OptionPosition::new(strike, OptionType::Call, 1, Side::Buy).unwrap()
    }

    #[test]
    fn test_key_equality() {
        let a = PayoffKey::new(&[long_call(100.0)], 0.0, 200.0, 100);
        let b = PayoffKey::new(&[long_call(100.0)], -0.0, 200.0, 100);
        let c = PayoffKey::new(&[long_call(101.0)], 0.0, 200.0, 100);
        let d = PayoffKey::new(&[long_call(100.0)], 0.0, 200.0, 101);
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_ne!(a, d);
    }

    #[test]
    fn test_hit_returns_same_series() {
        let cache = PayoffCache::default();
        let engine = PayoffEngine::default();
        let positions = vec![long_call(100.0)];

        let first = cache.get_or_build(&engine, &positions, 0.0, 200.0, 50).unwrap();
        let second = cache.get_or_build(&engine, &positions, 0.0, 200.0, 50).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.stats(), CacheStats { hits: 1, misses: 1 });
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_errors_not_cached() {
        let cache = PayoffCache::default();
        let engine = PayoffEngine::default();
        let err = cache
            .get_or_build(&engine, &[long_call(100.0)], 10.0, 5.0, 10)
            .unwrap_err();
        assert!(matches!(err, OptionsError::InvalidPriceRange { .. }));
        assert!(cache.is_empty());
    }

    #[test]
    fn test_capacity_evicts_oldest() {
        let cache = PayoffCache::new(CacheConfig {
            enabled: true,
            capacity: 2,
        });
        let engine = PayoffEngine::default();
        for strike in [90.0, 100.0, 110.0] {
            cache
                .get_or_build(&engine, &[long_call(strike)], 0.0, 200.0, 10)
                .unwrap();
        }
        assert_eq!(cache.len(), 2);

        // 90 was evicted, so this is a miss; 110 is still cached.
        cache.get_or_build(&engine, &[long_call(90.0)], 0.0, 200.0, 10).unwrap();
        cache.get_or_build(&engine, &[long_call(110.0)], 0.0, 200.0, 10).unwrap();
        assert_eq!(cache.stats(), CacheStats { hits: 1, misses: 4 });

        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_shared_cache_respects_each_engine_ceiling() {
        let cache = PayoffCache::default();
        let loose = PayoffEngine::default();
        let strict = PayoffEngine::new(PayoffConfig {
            max_points: 100,
            ..PayoffConfig::default()
        });
        let positions = vec![long_call(100.0)];

        let series = cache.get_or_build(&loose, &positions, 0.0, 200.0, 1000).unwrap();
        assert_eq!(series.len(), 1000);

        let err = cache
            .get_or_build(&strict, &positions, 0.0, 200.0, 1000)
            .unwrap_err();
        assert!(matches!(err, OptionsError::TooManyPoints { requested: 1000, max: 100 }));
        assert_eq!(cache.stats(), CacheStats { hits: 0, misses: 1 });

        let within = cache.get_or_build(&strict, &positions, 0.0, 200.0, 100).unwrap();
        assert_eq!(within.len(), 100);
    }

    #[test]
    fn test_disabled_cache_builds_fresh() {
        let cache = PayoffCache::new(CacheConfig {
            enabled: false,
            capacity: 8,
        });
        let engine = PayoffEngine::default();
        let positions = vec![long_call(100.0)];
        let first = cache.get_or_build(&engine, &positions, 0.0, 200.0, 5).unwrap();
        let second = cache.get_or_build(&engine, &positions, 0.0, 200.0, 5).unwrap();
        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(first, second);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_concurrent_access() {
        let cache = Arc::new(PayoffCache::default());
        let engine = Arc::new(PayoffEngine::default());

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let cache = Arc::clone(&cache);
                let engine = Arc::clone(&engine);
                thread::spawn(move || {
                    let strike = 100.0 + (i % 2) as f64;
                    cache
                        .get_or_build(&engine, &[long_call(strike)], 0.0, 200.0, 101)
                        .unwrap()
                        .len()
                })
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.join().unwrap(), 101);
        }
        assert_eq!(cache.len(), 2);
        let stats = cache.stats();
        assert_eq!(stats.hits + stats.misses, 8);
    }
}
