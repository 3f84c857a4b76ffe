//! Black-Scholes pricing and option portfolio payoff profiles.
//!
//! Two independent, stateless engines:
//!
//! - [`PricingEngine`] maps spot, strike, daily volatility (%), risk free
//!   rate (%) and months to expiry onto call/put prices and Greeks.
//! - [`PayoffEngine`] sums the gross intrinsic payoff of a list of
//!   [`OptionPosition`]s over an evenly spaced range of underlying prices.
//!
//! ```rust,no_run
//! use options_calc::{build_payoff_series, price, OptionPosition, OptionType, Side};
//!
//! let result = price(100.0, 100.0, 2.0, 5.0, 12.0).unwrap();
//! println!("{}", result.report());
//!
//! let positions = vec![OptionPosition::new(100.0, OptionType::Call, 1, Side::Buy).unwrap()];
//! let series = build_payoff_series(&positions, 0.0, 200.0, 100).unwrap();
//! assert_eq!(series.len(), 100);
//! ```
//!
//! [`PayoffCache`] memoizes payoff series and [`chart`] renders them with
//! plotters. Both are optional; neither engine depends on them.

pub mod cache;
pub mod chart;
pub mod config;
pub mod errors;
pub mod payoff;
pub mod pricing;
pub mod types;

pub use crate::cache::{CacheStats, PayoffCache, PayoffKey};
pub use crate::chart::{render_payoff_svg, save_payoff_svg};
pub use crate::config::{CacheConfig, ChartConfig, EngineConfig, PayoffConfig};
pub use crate::errors::{OptionsError, Result};
pub use crate::payoff::{build_payoff_series, PayoffEngine, PayoffPoint, PayoffSeries};
pub use crate::pricing::{price, Greeks, MarketInputs, PricingEngine, PricingReport, PricingResult};
pub use crate::types::{OptionPosition, OptionType, Side};
