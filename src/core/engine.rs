use super::types::{
    DIVIDEND_GROWTH_RATE, Holding, PRICE_GROWTH_RATE, ProjectionParams, ProjectionYear,
};

#[derive(Debug, Clone, Copy)]
struct HorizonState {
    shares: f64,
    total_dividends: f64,
}

pub fn project_dividends(params: &ProjectionParams) -> Vec<ProjectionYear> {
    if !params.holding.is_projectable() {
        return Vec::new();
    }

    params
        .horizons
        .iter()
        .map(|&years| project_horizon(params, years))
        .collect()
}

pub fn project_default_horizons(
    holding: Holding,
    investment: f64,
    reinvest: bool,
    tax_rate_percent: f64,
) -> Vec<ProjectionYear> {
    project_dividends(&ProjectionParams::new(
        holding,
        investment,
        reinvest,
        tax_rate_percent,
    ))
}

pub fn current_yield(holding: Holding) -> Option<f64> {
    holding
        .is_projectable()
        .then(|| holding.annual_dividend_per_share / holding.price)
}

// Every horizon restarts from year 1. Sampling one long timeline would change
// the reported numbers, so partial sums are never carried between horizons.
fn project_horizon(params: &ProjectionParams, years: u32) -> ProjectionYear {
    let holding = params.holding;
    let initial_shares = params.investment / holding.price;
    let keep_after_tax = after_tax_fraction(params.tax_rate_percent);

    let mut state = HorizonState {
        shares: initial_shares,
        total_dividends: 0.0,
    };
    for year in 1..=years {
        simulate_year(&mut state, holding, year, keep_after_tax, params.reinvest);
    }

    let final_price = price_at_year(holding.price, years);
    let annual_dividend_income =
        state.shares * dividend_per_share_at(holding.annual_dividend_per_share, years);

    ProjectionYear {
        years,
        initial_shares,
        annual_dividend_income,
        annual_dividend_income_after_tax: annual_dividend_income * keep_after_tax,
        year_end_shares: state.shares,
        total_dividends: state.total_dividends,
        portfolio_value_no_reinvest: initial_shares * final_price,
        portfolio_value_with_reinvest: state.shares * final_price,
    }
}

fn simulate_year(
    state: &mut HorizonState,
    holding: Holding,
    year: u32,
    keep_after_tax: f64,
    reinvest: bool,
) {
    let dividend_per_share = dividend_per_share_at(holding.annual_dividend_per_share, year - 1);
    let yearly_dividend = state.shares * dividend_per_share;
    state.total_dividends += yearly_dividend;

    if reinvest {
        let yearly_dividend_after_tax = yearly_dividend * keep_after_tax;
        state.shares += yearly_dividend_after_tax / price_at_year(holding.price, year);
    }
}

fn dividend_per_share_at(base: f64, elapsed_years: u32) -> f64 {
    base * growth_factor(DIVIDEND_GROWTH_RATE, elapsed_years)
}

fn price_at_year(base: f64, year: u32) -> f64 {
    base * growth_factor(PRICE_GROWTH_RATE, year)
}

fn growth_factor(rate: f64, years: u32) -> f64 {
    match i32::try_from(years) {
        Ok(exponent) => (1.0 + rate).powi(exponent),
        Err(_) => (1.0 + rate).powf(f64::from(years)),
    }
}

fn after_tax_fraction(tax_rate_percent: f64) -> f64 {
    1.0 - tax_rate_percent / 100.0
}
