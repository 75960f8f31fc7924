mod calculator;
mod engine;
mod goal;
mod types;

pub use calculator::DividendCalculator;
pub use engine::{current_yield, project_default_horizons, project_dividends};
pub use goal::{GoalError, IncomeGoalConfig, IncomeGoalResult, solve_income_goal};
pub use types::{
    DEFAULT_HORIZONS, DIVIDEND_GROWTH_RATE, Holding, PRICE_GROWTH_RATE, ProjectionParams,
    ProjectionYear,
};
