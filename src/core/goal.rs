use thiserror::Error;

use super::engine::project_dividends;
use super::types::{Holding, ProjectionParams, ProjectionYear};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IncomeGoalConfig {
    // After tax, in the final year of the horizon.
    pub target_annual_income: f64,
    pub horizon_years: u32,
    pub reinvest: bool,
    pub tax_rate_percent: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IncomeGoalResult {
    pub config: IncomeGoalConfig,
    pub required_investment: f64,
    pub projection: ProjectionYear,
}

#[derive(Debug, Error, PartialEq)]
pub enum GoalError {
    #[error("target annual income must be a finite amount > 0, got {0}")]
    InvalidTarget(f64),
    #[error("tax rate must be between 0 and 100, got {0}")]
    InvalidTaxRate(f64),
    #[error("holding pays no dividend income after tax, so no investment can reach the target")]
    NoIncome,
}

// Shares bought, dividends paid and reinvested shares all scale with the
// initial investment, so the after-tax income is linear in it. Projecting a
// single unit of currency is enough to solve for the target exactly.
pub fn solve_income_goal(
    holding: Holding,
    config: IncomeGoalConfig,
) -> Result<IncomeGoalResult, GoalError> {
    validate_config(config)?;

    let unit_income = project_single(holding, config, 1.0)
        .map(|row| row.annual_dividend_income_after_tax)
        .filter(|income| *income > 0.0 && income.is_finite())
        .ok_or(GoalError::NoIncome)?;

    let required_investment = config.target_annual_income / unit_income;
    let projection =
        project_single(holding, config, required_investment).ok_or(GoalError::NoIncome)?;

    Ok(IncomeGoalResult {
        config,
        required_investment,
        projection,
    })
}

fn project_single(
    holding: Holding,
    config: IncomeGoalConfig,
    investment: f64,
) -> Option<ProjectionYear> {
    let params = ProjectionParams::new(
        holding,
        investment,
        config.reinvest,
        config.tax_rate_percent,
    )
    .with_horizons(vec![config.horizon_years]);
    project_dividends(&params).into_iter().next()
}

fn validate_config(config: IncomeGoalConfig) -> Result<(), GoalError> {
    if !config.target_annual_income.is_finite() || config.target_annual_income <= 0.0 {
        return Err(GoalError::InvalidTarget(config.target_annual_income));
    }

    if !(0.0..=100.0).contains(&config.tax_rate_percent) {
        return Err(GoalError::InvalidTaxRate(config.tax_rate_percent));
    }

    Ok(())
}
