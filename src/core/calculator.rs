use super::engine::project_dividends;
use super::types::{Holding, ProjectionParams, ProjectionYear};

// Every setter recomputes all horizons before returning.
#[derive(Debug, Clone)]
pub struct DividendCalculator {
    params: ProjectionParams,
    projections: Vec<ProjectionYear>,
}

impl DividendCalculator {
    pub fn new(params: ProjectionParams) -> Self {
        let mut calculator = Self {
            params,
            projections: Vec::new(),
        };
        calculator.params.tax_rate_percent = clamp_tax_rate(calculator.params.tax_rate_percent);
        calculator.recompute();
        calculator
    }

    pub fn params(&self) -> &ProjectionParams {
        &self.params
    }

    pub fn projections(&self) -> &[ProjectionYear] {
        &self.projections
    }

    pub fn set_price(&mut self, price: f64) {
        self.params.holding.price = price;
        self.recompute();
    }

    pub fn set_annual_dividend_per_share(&mut self, dividend: f64) {
        self.params.holding.annual_dividend_per_share = dividend;
        self.recompute();
    }

    pub fn set_holding(&mut self, holding: Holding) {
        self.params.holding = holding;
        self.recompute();
    }

    pub fn set_investment(&mut self, investment: f64) {
        self.params.investment = investment;
        self.recompute();
    }

    pub fn set_reinvest(&mut self, reinvest: bool) {
        self.params.reinvest = reinvest;
        self.recompute();
    }

    pub fn set_tax_rate_percent(&mut self, tax_rate_percent: f64) {
        self.params.tax_rate_percent = clamp_tax_rate(tax_rate_percent);
        self.recompute();
    }

    pub fn set_horizons(&mut self, horizons: Vec<u32>) {
        self.params.horizons = horizons;
        self.recompute();
    }

    fn recompute(&mut self) {
        self.projections = project_dividends(&self.params);
    }
}

fn clamp_tax_rate(tax_rate_percent: f64) -> f64 {
    if tax_rate_percent.is_nan() {
        return 0.0;
    }
    tax_rate_percent.clamp(0.0, 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::{Strategy, any, prop_assert_eq, prop_oneof, proptest};

    fn sample_params() -> ProjectionParams {
        ProjectionParams::new(
            Holding {
                price: 50.0,
                annual_dividend_per_share: 2.5,
            },
            20_000.0,
            false,
            15.0,
        )
    }

    #[test]
    fn new_calculator_has_projection_for_every_default_horizon() {
        let calculator = DividendCalculator::new(sample_params());
        assert_eq!(calculator.projections().len(), 6);
        assert_eq!(calculator.projections()[5].years, 20);
    }

    #[test]
    fn toggling_reinvest_recomputes_share_counts() {
        let mut calculator = DividendCalculator::new(sample_params());
        let before = calculator.projections()[5].year_end_shares;
        assert_eq!(before, 400.0);

        calculator.set_reinvest(true);
        assert!(calculator.projections()[5].year_end_shares > before);

        calculator.set_reinvest(false);
        assert_eq!(calculator.projections()[5].year_end_shares, before);
    }

    #[test]
    fn degenerate_price_clears_projection_until_fixed() {
        let mut calculator = DividendCalculator::new(sample_params());
        calculator.set_price(0.0);
        assert!(calculator.projections().is_empty());

        calculator.set_price(25.0);
        assert_eq!(calculator.projections().len(), 6);
        assert_eq!(calculator.projections()[0].initial_shares, 800.0);
    }

    #[test]
    fn tax_rate_is_clamped_by_the_calculator() {
        let mut calculator = DividendCalculator::new(sample_params());

        calculator.set_tax_rate_percent(150.0);
        assert_eq!(calculator.params().tax_rate_percent, 100.0);
        assert_eq!(
            calculator.projections()[0].annual_dividend_income_after_tax,
            0.0
        );

        calculator.set_tax_rate_percent(-5.0);
        assert_eq!(calculator.params().tax_rate_percent, 0.0);

        calculator.set_tax_rate_percent(f64::NAN);
        assert_eq!(calculator.params().tax_rate_percent, 0.0);
    }

    #[test]
    fn custom_horizons_replace_defaults() {
        let mut calculator = DividendCalculator::new(sample_params());
        calculator.set_horizons(vec![2, 4]);
        let years: Vec<u32> = calculator.projections().iter().map(|p| p.years).collect();
        assert_eq!(years, vec![2, 4]);
    }

    #[derive(Debug, Clone)]
    enum Edit {
        Price(f64),
        Dividend(f64),
        Investment(f64),
        Reinvest(bool),
        TaxRate(f64),
    }

    fn edit_strategy() -> impl Strategy<Value = Edit> {
        prop_oneof![
            (-10.0f64..500.0).prop_map(Edit::Price),
            (-1.0f64..20.0).prop_map(Edit::Dividend),
            (1.0f64..100_000.0).prop_map(Edit::Investment),
            any::<bool>().prop_map(Edit::Reinvest),
            (-20.0f64..120.0).prop_map(Edit::TaxRate),
        ]
    }

    proptest! {
        #![proptest_config(proptest::test_runner::Config::with_cases(48))]

        #[test]
        fn prop_projection_always_matches_latest_inputs(
            edits in proptest::collection::vec(edit_strategy(), 1..12),
        ) {
            let mut calculator = DividendCalculator::new(sample_params());
            for edit in edits {
                match edit {
                    Edit::Price(v) => calculator.set_price(v),
                    Edit::Dividend(v) => calculator.set_annual_dividend_per_share(v),
                    Edit::Investment(v) => calculator.set_investment(v),
                    Edit::Reinvest(v) => calculator.set_reinvest(v),
                    Edit::TaxRate(v) => calculator.set_tax_rate_percent(v),
                }
            }
            let fresh = project_dividends(calculator.params());
            prop_assert_eq!(calculator.projections(), fresh.as_slice());
        }
    }
}
