use crate::errors::{OptionsError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OptionType {
    Call,
    Put,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Buy,
    Sell,
}

impl OptionType {
    /// Exercise value of one unit at `spot`.
    pub fn intrinsic(&self, spot: f64, strike: f64) -> f64 {
        match self {
            OptionType::Call => (spot - strike).max(0.0),
            OptionType::Put => (strike - spot).max(0.0),
        }
    }
}

impl fmt::Display for OptionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionType::Call => write!(f, "Call"),
            OptionType::Put => write!(f, "Put"),
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Buy => write!(f, "Buy"),
            Side::Sell => write!(f, "Sell"),
        }
    }
}

/// A single leg of a payoff portfolio.
///
/// `lots` is the contract multiplier and may be negative; zero is rejected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "PositionSpec")]
pub struct OptionPosition {
    strike_price: f64,
    option_type: OptionType,
    lots: i64,
    side: Side,
}

#[derive(Deserialize)]
struct PositionSpec {
    strike_price: f64,
    option_type: OptionType,
    lots: i64,
    side: Side,
}

impl TryFrom<PositionSpec> for OptionPosition {
    type Error = OptionsError;

    fn try_from(spec: PositionSpec) -> Result<Self> {
        OptionPosition::new(spec.strike_price, spec.option_type, spec.lots, spec.side)
    }
}

impl OptionPosition {
    pub fn new(strike_price: f64, option_type: OptionType, lots: i64, side: Side) -> Result<Self> {
        if !strike_price.is_finite() || strike_price <= 0.0 {
            return Err(OptionsError::InvalidStrike(strike_price));
        }
        if lots == 0 {
            return Err(OptionsError::InvalidLots);
        }

        Ok(Self {
            strike_price,
            option_type,
            lots,
            side,
        })
    }

    pub fn strike_price(&self) -> f64 {
        self.strike_price
    }

    pub fn option_type(&self) -> OptionType {
        self.option_type
    }

    pub fn lots(&self) -> i64 {
        self.lots
    }

    pub fn side(&self) -> Side {
        self.side
    }

    /// Gross intrinsic payoff at `underlying_price`, premium not included.
    ///
    /// Sell legs mirror the buy leg of the opposite type.
    pub fn intrinsic_payoff(&self, underlying_price: f64) -> f64 {
        let effective = match (self.option_type, self.side) {
            (OptionType::Call, Side::Buy) | (OptionType::Put, Side::Sell) => OptionType::Call,
            (OptionType::Call, Side::Sell) | (OptionType::Put, Side::Buy) => OptionType::Put,
        };
        effective.intrinsic(underlying_price, self.strike_price) * self.lots as f64
    }
}
