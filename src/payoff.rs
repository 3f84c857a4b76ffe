use crate::config::PayoffConfig;
use crate::errors::{OptionsError, Result};
use crate::types::OptionPosition;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PayoffPoint {
    pub underlying_price: f64,
    pub total_payoff: f64,
}

/// Aggregate payoff sampled over ascending underlying prices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayoffSeries {
    points: Vec<PayoffPoint>,
}

impl PayoffSeries {
    pub fn points(&self) -> &[PayoffPoint] {
        &self.points
    }

    pub fn prices(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.underlying_price).collect()
    }

    pub fn payoffs(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.total_payoff).collect()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn max_payoff(&self) -> Option<f64> {
        self.points.iter().map(|p| p.total_payoff).reduce(f64::max)
    }

    pub fn min_payoff(&self) -> Option<f64> {
        self.points.iter().map(|p| p.total_payoff).reduce(f64::min)
    }
}

/// `n` evenly spaced values from `start` to `end`, both inclusive.
pub fn linspace(start: f64, end: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (n - 1) as f64;
            let mut values: Vec<f64> = (0..n).map(|i| start + i as f64 * step).collect();
            values[n - 1] = end;
            values
        }
    }
}

/// Sum of every position's intrinsic payoff at `underlying_price`.
pub fn total_payoff(positions: &[OptionPosition], underlying_price: f64) -> f64 {
    positions
        .iter()
        .map(|position| position.intrinsic_payoff(underlying_price))
        .sum()
}

#[derive(Debug, Clone, Default)]
pub struct PayoffEngine {
    config: PayoffConfig,
}

impl PayoffEngine {
    /// Builds an engine without checking `config`; run `PayoffConfig::validate`
    /// first when the settings come from outside the crate.
    pub fn new(config: PayoffConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PayoffConfig {
        &self.config
    }

    pub(crate) fn validate_range(&self, start_price: f64, end_price: f64, num_points: usize) -> Result<()> {
        if num_points < 1 {
            return Err(OptionsError::InvalidPointCount(num_points));
        }
        if num_points > self.config.max_points {
            return Err(OptionsError::TooManyPoints {
                requested: num_points,
                max: self.config.max_points,
            });
        }
        // Equal endpoints are allowed and sample the same price repeatedly.
        if !start_price.is_finite()
            || !end_price.is_finite()
            || start_price < 0.0
            || start_price > end_price
        {
            return Err(OptionsError::InvalidPriceRange {
                start: start_price,
                end: end_price,
            });
        }
        Ok(())
    }

    pub fn build_payoff_series(
        &self,
        positions: &[OptionPosition],
        start_price: f64,
        end_price: f64,
        num_points: usize,
    ) -> Result<PayoffSeries> {
        if let Err(e) = self.validate_range(start_price, end_price, num_points) {
            tracing::warn!(error = %e, "Rejected payoff range");
            return Err(e);
        }

        let prices = linspace(start_price, end_price, num_points);
        let sample = |&underlying_price: &f64| PayoffPoint {
            underlying_price,
            total_payoff: total_payoff(positions, underlying_price),
        };

        let points: Vec<PayoffPoint> = if num_points >= self.config.parallel_threshold {
            prices.par_iter().map(sample).collect()
        } else {
            prices.iter().map(sample).collect()
        };

        if let Some(point) = points.iter().find(|p| !p.total_payoff.is_finite()) {
            tracing::warn!(
                underlying_price = point.underlying_price,
                total_payoff = point.total_payoff,
                "Payoff series produced a non-finite value"
            );
            return Err(OptionsError::NonFiniteResult("total_payoff"));
        }

        tracing::debug!(
            positions = positions.len(),
            start_price,
            end_price,
            num_points,
            "Built payoff series"
        );

        Ok(PayoffSeries { points })
    }
}

/// Build a payoff series with the default point ceiling.
pub fn build_payoff_series(
    positions: &[OptionPosition],
    start_price: f64,
    end_price: f64,
    num_points: usize,
) -> Result<PayoffSeries> {
    PayoffEngine::default().build_payoff_series(positions, start_price, end_price, num_points)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{OptionType, Side};

    fn position(strike: f64, option_type: OptionType, lots: i64, side: Side) -> OptionPosition {
        OptionPosition::new(strike, option_type, lots, side).unwrap()
    }

    #[test]
    fn test_linspace() {
        assert_eq!(linspace(80.0, 120.0, 3), vec![80.0, 100.0, 120.0]);
        assert_eq!(linspace(5.0, 10.0, 1), vec![5.0]);
        assert!(linspace(0.0, 1.0, 0).is_empty());

        let values = linspace(0.0, 1.0, 11);
        assert_eq!(values.len(), 11);
        assert_eq!(values[10], 1.0);
        assert!((values[3] - 0.3).abs() < 1e-12);
    }

    #[test]
    fn test_single_long_call() {
        let positions = vec![position(100.0, OptionType::Call, 1, Side::Buy)];
        let series = build_payoff_series(&positions, 80.0, 120.0, 3).unwrap();
        assert_eq!(series.prices(), vec![80.0, 100.0, 120.0]);
        assert_eq!(series.payoffs(), vec![0.0, 0.0, 20.0]);
    }

    #[test]
    fn test_lot_scaling_is_linear() {
        let single = vec![position(100.0, OptionType::Put, 1, Side::Buy)];
        let double = vec![position(100.0, OptionType::Put, 2, Side::Buy)];
        let a = build_payoff_series(&single, 0.0, 200.0, 41).unwrap();
        let b = build_payoff_series(&double, 0.0, 200.0, 41).unwrap();
        for (x, y) in a.points().iter().zip(b.points()) {
            assert_eq!(x.underlying_price, y.underlying_price);
            assert_eq!(y.total_payoff, 2.0 * x.total_payoff);
        }
    }

    #[test]
    fn test_single_point_series() {
        let positions = vec![
            position(90.0, OptionType::Call, 3, Side::Buy),
            position(110.0, OptionType::Put, 1, Side::Buy),
        ];
        let series = build_payoff_series(&positions, 100.0, 150.0, 1).unwrap();
        assert_eq!(series.len(), 1);
        assert_eq!(series.points()[0].underlying_price, 100.0);
        assert_eq!(series.points()[0].total_payoff, total_payoff(&positions, 100.0));
        assert_eq!(series.points()[0].total_payoff, 40.0);
    }

    #[test]
    fn test_equal_endpoints_allowed() {
        let positions = vec![position(100.0, OptionType::Call, 1, Side::Buy)];
        let series = build_payoff_series(&positions, 110.0, 110.0, 4).unwrap();
        assert_eq!(series.prices(), vec![110.0; 4]);
        assert_eq!(series.payoffs(), vec![10.0; 4]);
    }

    #[test]
    fn test_straddle_and_spread() {
        let straddle = vec![
            position(100.0, OptionType::Call, 1, Side::Buy),
            position(100.0, OptionType::Put, 1, Side::Buy),
        ];
        let series = build_payoff_series(&straddle, 50.0, 150.0, 5).unwrap();
        assert_eq!(series.payoffs(), vec![50.0, 25.0, 0.0, 25.0, 50.0]);
        assert_eq!(series.min_payoff(), Some(0.0));
        assert_eq!(series.max_payoff(), Some(50.0));

        // Sell legs use the mirrored intrinsic value, so a short call behaves like a long put.
        let mixed = vec![
            position(90.0, OptionType::Call, 1, Side::Buy),
            position(110.0, OptionType::Call, 1, Side::Sell),
        ];
        let series = build_payoff_series(&mixed, 80.0, 120.0, 5).unwrap();
        assert_eq!(series.payoffs(), vec![30.0, 20.0, 20.0, 20.0, 30.0]);
    }

    #[test]
    fn test_empty_portfolio() {
        let series = build_payoff_series(&[], 0.0, 10.0, 3).unwrap();
        assert_eq!(series.payoffs(), vec![0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let positions = vec![
            position(95.0, OptionType::Call, 2, Side::Buy),
            position(105.0, OptionType::Put, -1, Side::Sell),
            position(120.0, OptionType::Call, 5, Side::Sell),
        ];
        let sequential = PayoffEngine::new(PayoffConfig {
            max_points: 10_000,
            parallel_threshold: usize::MAX,
        });
        let parallel = PayoffEngine::new(PayoffConfig {
            max_points: 10_000,
            parallel_threshold: 1,
        });
        let a = sequential.build_payoff_series(&positions, 0.0, 250.0, 5_000).unwrap();
        let b = parallel.build_payoff_series(&positions, 0.0, 250.0, 5_000).unwrap();
        assert_eq!(a, b);
        assert!(b.prices().windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_invalid_ranges() {
        let positions = vec![position(100.0, OptionType::Call, 1, Side::Buy)];
        assert!(matches!(
            build_payoff_series(&positions, 0.0, 100.0, 0),
            Err(OptionsError::InvalidPointCount(0))
        ));
        assert!(matches!(
            build_payoff_series(&positions, 120.0, 80.0, 10),
            Err(OptionsError::InvalidPriceRange { .. })
        ));
        assert!(matches!(
            build_payoff_series(&positions, -10.0, 80.0, 10),
            Err(OptionsError::InvalidPriceRange { .. })
        ));
        assert!(matches!(
            build_payoff_series(&positions, 0.0, f64::INFINITY, 10),
            Err(OptionsError::InvalidPriceRange { .. })
        ));

        let engine = PayoffEngine::new(PayoffConfig {
            max_points: 100,
            ..PayoffConfig::default()
        });
        let err = engine.build_payoff_series(&positions, 0.0, 100.0, 101).unwrap_err();
        assert!(matches!(err, OptionsError::TooManyPoints { requested: 101, max: 100 }));
        assert!(err.is_invalid_input());
    }

    #[test]
    fn test_overflowing_payoff_rejected() {
        let positions = vec![position(1.0, OptionType::Call, i64::MAX, Side::Buy)];
        assert!(matches!(
            build_payoff_series(&positions, 0.0, f64::MAX, 2),
            Err(OptionsError::NonFiniteResult(_))
        ));
    }
}
