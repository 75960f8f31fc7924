use serde::Serialize;

pub const DIVIDEND_GROWTH_RATE: f64 = 0.03;
pub const PRICE_GROWTH_RATE: f64 = 0.07;

pub const DEFAULT_HORIZONS: [u32; 6] = [1, 3, 5, 7, 10, 20];

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Holding {
    pub price: f64,
    pub annual_dividend_per_share: f64,
}

impl Holding {
    // NaN compares false, so it is degenerate too.
    pub fn is_projectable(&self) -> bool {
        self.price > 0.0 && self.annual_dividend_per_share > 0.0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProjectionParams {
    pub holding: Holding,
    pub investment: f64,
    pub reinvest: bool,
    // Percent, applied unclamped.
    pub tax_rate_percent: f64,
    pub horizons: Vec<u32>,
}

impl ProjectionParams {
    pub fn new(holding: Holding, investment: f64, reinvest: bool, tax_rate_percent: f64) -> Self {
        Self {
            holding,
            investment,
            reinvest,
            tax_rate_percent,
            horizons: DEFAULT_HORIZONS.to_vec(),
        }
    }

    pub fn with_horizons(mut self, horizons: Vec<u32>) -> Self {
        self.horizons = horizons;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectionYear {
    pub years: u32,
    pub initial_shares: f64,
    pub annual_dividend_income: f64,
    pub annual_dividend_income_after_tax: f64,
    pub year_end_shares: f64,
    pub total_dividends: f64,
    pub portfolio_value_no_reinvest: f64,
    pub portfolio_value_with_reinvest: f64,
}
