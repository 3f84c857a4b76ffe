use thiserror::Error;

#[derive(Error, Debug)]
pub enum OptionsError {
    #[error("Invalid spot price: {0}")]
    InvalidSpot(f64),

    #[error("Invalid strike price: {0}")]
    InvalidStrike(f64),

    #[error("Invalid time to expiry: {0} months")]
    InvalidExpiry(f64),

    #[error("Invalid volatility: {0}")]
    InvalidVolatility(f64),

    #[error("Invalid risk free rate: {0}")]
    InvalidRate(f64),

    #[error("Degenerate input: volatility * sqrt(time) is zero")]
    DegenerateVolatility,

    #[error("Invalid lots: must be non-zero")]
    InvalidLots,

    #[error("Invalid point count: {0}")]
    InvalidPointCount(usize),

    #[error("Invalid price range: start {start}, end {end}")]
    InvalidPriceRange { start: f64, end: f64 },

    #[error("Too many points: requested {requested}, max {max}")]
    TooManyPoints { requested: usize, max: usize },

    #[error("Non-finite result: {0}")]
    NonFiniteResult(&'static str),

    #[error("Distribution error: {0}")]
    Distribution(String),

    #[error("Chart error: {0}")]
    Chart(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl OptionsError {
    /// True for the precondition failures a caller can fix by re-entering inputs.
    pub fn is_invalid_input(&self) -> bool {
        matches!(
            self,
            OptionsError::InvalidSpot(_)
                | OptionsError::InvalidStrike(_)
                | OptionsError::InvalidExpiry(_)
                | OptionsError::InvalidVolatility(_)
                | OptionsError::InvalidRate(_)
                | OptionsError::DegenerateVolatility
                | OptionsError::InvalidLots
                | OptionsError::InvalidPointCount(_)
                | OptionsError::InvalidPriceRange { .. }
                | OptionsError::TooManyPoints { .. }
                | OptionsError::NonFiniteResult(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, OptionsError>;
