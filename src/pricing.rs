use crate::errors::{OptionsError, Result};
use crate::types::OptionType;
use serde::{Deserialize, Serialize};
use statrs::distribution::{Continuous, ContinuousCDF, Normal};

pub mod report;

pub use report::{PricingReport, ReportTable};

const TRADING_DAYS_PER_YEAR: f64 = 252.0;
const MONTHS_PER_YEAR: f64 = 12.0;
const PERCENT: f64 = 100.0;

/// Validated Black-Scholes inputs in the units a user types them.
///
/// Volatility is a daily percentage, the rate a percentage and the expiry in
/// months. Construction rejects every input that would make the closed form
/// divide by zero or take the log of a non-positive number.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "MarketInputsSpec")]
pub struct MarketInputs {
    spot: f64,
    strike: f64,
    daily_vol_pct: f64,
    risk_free_rate_pct: f64,
    time_to_expiry_months: f64,
}

#[derive(Deserialize)]
struct MarketInputsSpec {
    spot: f64,
    strike: f64,
    daily_vol_pct: f64,
    risk_free_rate_pct: f64,
    time_to_expiry_months: f64,
}

impl TryFrom<MarketInputsSpec> for MarketInputs {
    type Error = OptionsError;

    fn try_from(spec: MarketInputsSpec) -> Result<Self> {
        MarketInputs::new(
            spec.spot,
            spec.strike,
            spec.daily_vol_pct,
            spec.risk_free_rate_pct,
            spec.time_to_expiry_months,
        )
    }
}

impl MarketInputs {
    pub fn new(
        spot: f64,
        strike: f64,
        daily_vol_pct: f64,
        risk_free_rate_pct: f64,
        time_to_expiry_months: f64,
    ) -> Result<Self> {
        if !spot.is_finite() || spot <= 0.0 {
            return Err(OptionsError::InvalidSpot(spot));
        }
        if !strike.is_finite() || strike <= 0.0 {
            return Err(OptionsError::InvalidStrike(strike));
        }
        if !daily_vol_pct.is_finite() || daily_vol_pct <= 0.0 {
            return Err(OptionsError::InvalidVolatility(daily_vol_pct));
        }
        if !risk_free_rate_pct.is_finite() {
            return Err(OptionsError::InvalidRate(risk_free_rate_pct));
        }
        if !time_to_expiry_months.is_finite() || time_to_expiry_months <= 0.0 {
            return Err(OptionsError::InvalidExpiry(time_to_expiry_months));
        }

        let inputs = Self {
            spot,
            strike,
            daily_vol_pct,
            risk_free_rate_pct,
            time_to_expiry_months,
        };

        // Underflow can still zero the product for tiny positive inputs.
        let vt12 = inputs.vol_sqrt_time();
        if vt12 == 0.0 || !vt12.is_finite() {
            return Err(OptionsError::DegenerateVolatility);
        }

        Ok(inputs)
    }

    pub fn spot(&self) -> f64 {
        self.spot
    }

    pub fn strike(&self) -> f64 {
        self.strike
    }

    pub fn daily_vol_pct(&self) -> f64 {
        self.daily_vol_pct
    }

    pub fn risk_free_rate_pct(&self) -> f64 {
        self.risk_free_rate_pct
    }

    pub fn time_to_expiry_months(&self) -> f64 {
        self.time_to_expiry_months
    }

    /// Annualized volatility as a fraction.
    pub fn annual_vol(&self) -> f64 {
        self.daily_vol_pct * TRADING_DAYS_PER_YEAR.sqrt() / PERCENT
    }

    pub fn rate(&self) -> f64 {
        self.risk_free_rate_pct / PERCENT
    }

    /// Time to expiry in years.
    pub fn years(&self) -> f64 {
        self.time_to_expiry_months / MONTHS_PER_YEAR
    }

    pub fn discounted_strike(&self) -> f64 {
        self.strike * (-self.rate() * self.years()).exp()
    }

    pub fn vol_sqrt_time(&self) -> f64 {
        self.annual_vol() * self.years().sqrt()
    }
}

/// First order sensitivities of one option, per unit of underlying.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Greeks {
    pub delta: f64,
    pub gamma: f64,
    pub theta: f64,
    pub vega: f64,
    pub rho: f64,
}

impl Greeks {
    /// Scale by a contract multiplier such as lots times lot size.
    pub fn scale(&self, factor: f64) -> Self {
        Self {
            delta: self.delta * factor,
            gamma: self.gamma * factor,
            theta: self.theta * factor,
            vega: self.vega * factor,
            rho: self.rho * factor,
        }
    }
}

/// Prices and Greeks for both legs, produced from one `MarketInputs`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricingResult {
    pub annual_vol: f64,
    pub d1: f64,
    pub d2: f64,
    pub call_price: f64,
    pub put_price: f64,
    pub call_delta: f64,
    pub put_delta: f64,
    pub call_gamma: f64,
    pub put_gamma: f64,
    pub call_theta: f64,
    pub put_theta: f64,
    pub call_vega: f64,
    pub put_vega: f64,
    pub call_rho: f64,
    pub put_rho: f64,
}

impl PricingResult {
    pub fn price(&self, option_type: OptionType) -> f64 {
        match option_type {
            OptionType::Call => self.call_price,
            OptionType::Put => self.put_price,
        }
    }

    pub fn greeks(&self, option_type: OptionType) -> Greeks {
        match option_type {
            OptionType::Call => self.call_greeks(),
            OptionType::Put => self.put_greeks(),
        }
    }

    pub fn call_greeks(&self) -> Greeks {
        Greeks {
            delta: self.call_delta,
            gamma: self.call_gamma,
            theta: self.call_theta,
            vega: self.call_vega,
            rho: self.call_rho,
        }
    }

    pub fn put_greeks(&self) -> Greeks {
        Greeks {
            delta: self.put_delta,
            gamma: self.put_gamma,
            theta: self.put_theta,
            vega: self.put_vega,
            rho: self.put_rho,
        }
    }

    fn fields(&self) -> [(&'static str, f64); 15] {
        [
            ("annual_vol", self.annual_vol),
            ("d1", self.d1),
            ("d2", self.d2),
            ("call_price", self.call_price),
            ("put_price", self.put_price),
            ("call_delta", self.call_delta),
            ("put_delta", self.put_delta),
            ("call_gamma", self.call_gamma),
            ("put_gamma", self.put_gamma),
            ("call_theta", self.call_theta),
            ("put_theta", self.put_theta),
            ("call_vega", self.call_vega),
            ("put_vega", self.put_vega),
            ("call_rho", self.call_rho),
            ("put_rho", self.put_rho),
        ]
    }
}

/// Closed-form European pricing under Black-Scholes-Merton without dividends.
#[derive(Debug, Clone)]
pub struct PricingEngine {
    normal: Normal,
}

impl PricingEngine {
    pub fn new() -> Result<Self> {
        let normal = Normal::new(0.0, 1.0)
            .map_err(|e| OptionsError::Distribution(e.to_string()))?;
        Ok(Self { normal })
    }

    /// Standard normal CDF.
    pub fn cdf(&self, x: f64) -> f64 {
        self.normal.cdf(x)
    }

    /// Standard normal density.
    pub fn pdf(&self, x: f64) -> f64 {
        self.normal.pdf(x)
    }

    pub fn price(&self, inputs: &MarketInputs) -> Result<PricingResult> {
        let spot = inputs.spot();
        let vol = inputs.annual_vol();
        let rate = inputs.rate();
        let time = inputs.years();
        let sqrt_t = time.sqrt();
        let vt12 = inputs.vol_sqrt_time();
        let discounted_strike = inputs.discounted_strike();

        let d1 = ((spot / inputs.strike()).ln() + (rate + vol * vol / 2.0) * time) / vt12;
        let d2 = d1 - vt12;

        let nd1 = self.cdf(d1);
        let nd2 = self.cdf(d2);
        let nd1_neg = self.cdf(-d1);
        let nd2_neg = self.cdf(-d2);
        let npd1 = self.pdf(d1);

        let call_price = spot * nd1 - discounted_strike * nd2;
        let put_price = discounted_strike * nd2_neg - spot * nd1_neg;

        let gamma = npd1 / (spot * vt12);
        let vega = spot * npd1 * sqrt_t;
        let decay = -(spot * npd1 * vol) / (2.0 * sqrt_t);

        let result = PricingResult {
            annual_vol: vol,
            d1,
            d2,
            call_price,
            put_price,
            call_delta: nd1,
            put_delta: nd1 - 1.0,
            call_gamma: gamma,
            put_gamma: gamma,
            call_theta: decay - rate * discounted_strike * nd2,
            put_theta: decay + rate * discounted_strike * nd2_neg,
            call_vega: vega,
            put_vega: vega,
            call_rho: discounted_strike * time * nd2,
            put_rho: -discounted_strike * time * nd2_neg,
        };

        if let Some(&(field, _)) = result.fields().iter().find(|(_, v)| !v.is_finite()) {
            tracing::warn!(?inputs, field, "Pricing produced a non-finite value");
            return Err(OptionsError::NonFiniteResult(field));
        }

        tracing::debug!(
            spot,
            strike = inputs.strike(),
            annual_vol = vol,
            call_price,
            put_price,
            "Priced option pair"
        );

        Ok(result)
    }
}

/// Price a call/put pair from the five raw market inputs.
pub fn price(
    spot: f64,
    strike: f64,
    daily_vol_pct: f64,
    risk_free_rate_pct: f64,
    time_to_expiry_months: f64,
) -> Result<PricingResult> {
    let inputs = MarketInputs::new(
        spot,
        strike,
        daily_vol_pct,
        risk_free_rate_pct,
        time_to_expiry_months,
    )
    .map_err(|e| {
        tracing::warn!(error = %e, "Rejected market inputs");
        e
    })?;
    PricingEngine::new()?.price(&inputs)
}
