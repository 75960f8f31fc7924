mod error;

use axum::{
    Router,
    extract::{
        Json, Query,
        rejection::{JsonRejection, QueryRejection},
    },
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use clap::{Args, ValueEnum};
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use tokio::net::TcpListener;

pub use error::ApiError;

use crate::config::ServerConfig;
use crate::core::{
    DEFAULT_HORIZONS, Holding, IncomeGoalConfig, IncomeGoalResult, ProjectionParams,
    ProjectionYear, current_yield, project_dividends, solve_income_goal,
};

const MAX_HORIZON_YEARS: u32 = 100;
const MAX_HORIZON_COUNT: usize = 32;

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

// JSON bodies send an array, query strings send "1,3,5".
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum HorizonsField {
    List(Vec<u32>),
    Csv(String),
}

impl HorizonsField {
    fn into_years(self) -> Result<Vec<u32>, String> {
        match self {
            HorizonsField::List(years) => Ok(years),
            HorizonsField::Csv(raw) => raw
                .split(',')
                .map(str::trim)
                .filter(|part| !part.is_empty())
                .map(|part| {
                    part.parse::<u32>()
                        .map_err(|_| format!("horizons must be whole years, got {part:?}"))
                })
                .collect(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct ProjectionPayload {
    price: Option<f64>,
    annual_dividend_per_share: Option<f64>,
    investment: Option<f64>,
    reinvest: Option<bool>,
    tax_rate_percent: Option<f64>,
    horizons: Option<HorizonsField>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct GoalPayload {
    price: Option<f64>,
    annual_dividend_per_share: Option<f64>,
    target_income: Option<f64>,
    horizon: Option<u32>,
    reinvest: Option<bool>,
    tax_rate_percent: Option<f64>,
}

#[derive(Args, Debug, Clone)]
pub struct ProjectArgs {
    #[arg(long, help = "Current share price")]
    pub price: f64,
    #[arg(long = "dividend", help = "Annual dividend paid per share")]
    pub annual_dividend_per_share: f64,
    #[arg(long, help = "Amount invested at year 0")]
    pub investment: f64,
    #[arg(long, help = "Reinvest after-tax dividends at the projected share price")]
    pub reinvest: bool,
    #[arg(
        long = "tax-rate",
        default_value_t = 0.0,
        help = "Flat dividend tax in percent, clamped to 0..=100"
    )]
    pub tax_rate_percent: f64,
    #[arg(
        long,
        value_delimiter = ',',
        help = "Comma-separated horizons in years, defaults to 1,3,5,7,10,20"
    )]
    pub horizons: Vec<u32>,
    #[arg(
        long,
        value_enum,
        default_value_t = OutputFormat::Table,
        help = "Print a table or pretty JSON"
    )]
    pub format: OutputFormat,
}

#[derive(Args, Debug, Clone)]
pub struct GoalArgs {
    #[arg(long, help = "Current share price")]
    pub price: f64,
    #[arg(long = "dividend", help = "Annual dividend paid per share")]
    pub annual_dividend_per_share: f64,
    #[arg(long, help = "After-tax annual dividend income to reach")]
    pub target_income: f64,
    #[arg(long, default_value_t = 10, help = "Years until the income is needed")]
    pub horizon: u32,
    #[arg(long, help = "Reinvest after-tax dividends at the projected share price")]
    pub reinvest: bool,
    #[arg(
        long = "tax-rate",
        default_value_t = 0.0,
        help = "Flat dividend tax in percent, clamped to 0..=100"
    )]
    pub tax_rate_percent: f64,
    #[arg(
        long,
        value_enum,
        default_value_t = OutputFormat::Table,
        help = "Print a table or pretty JSON"
    )]
    pub format: OutputFormat,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectionResponse {
    price: f64,
    annual_dividend_per_share: f64,
    investment: f64,
    reinvest: bool,
    tax_rate_percent: f64,
    current_yield: Option<f64>,
    horizons: Vec<u32>,
    projections: Vec<ProjectionYear>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalResponse {
    price: f64,
    annual_dividend_per_share: f64,
    target_income: f64,
    horizon: u32,
    reinvest: bool,
    tax_rate_percent: f64,
    required_investment: f64,
    projection: ProjectionYear,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
}

fn require_finite(name: &str, value: f64) -> Result<f64, String> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(format!("{name} must be a finite number"))
    }
}

// The engine does not clamp.
fn clamp_tax_rate(name: &str, value: f64) -> Result<f64, String> {
    Ok(require_finite(name, value)?.clamp(0.0, 100.0))
}

fn build_horizons(horizons: Vec<u32>) -> Result<Vec<u32>, String> {
    if horizons.is_empty() {
        return Ok(DEFAULT_HORIZONS.to_vec());
    }

    if horizons.len() > MAX_HORIZON_COUNT {
        return Err(format!(
            "--horizons accepts at most {MAX_HORIZON_COUNT} entries"
        ));
    }

    if let Some(years) = horizons.iter().find(|&&years| years > MAX_HORIZON_YEARS) {
        return Err(format!(
            "--horizons must be <= {MAX_HORIZON_YEARS} years, got {years}"
        ));
    }

    Ok(horizons)
}

pub fn build_params(args: &ProjectArgs) -> Result<ProjectionParams, String> {
    let price = require_finite("--price", args.price)?;
    let dividend = require_finite("--dividend", args.annual_dividend_per_share)?;

    let investment = require_finite("--investment", args.investment)?;
    if investment <= 0.0 {
        return Err("--investment must be > 0".to_string());
    }

    let tax_rate_percent = clamp_tax_rate("--tax-rate", args.tax_rate_percent)?;
    let horizons = build_horizons(args.horizons.clone())?;

    Ok(ProjectionParams::new(
        Holding {
            price,
            annual_dividend_per_share: dividend,
        },
        investment,
        args.reinvest,
        tax_rate_percent,
    )
    .with_horizons(horizons))
}

pub fn build_goal(args: &GoalArgs) -> Result<(Holding, IncomeGoalConfig), String> {
    let price = require_finite("--price", args.price)?;
    let dividend = require_finite("--dividend", args.annual_dividend_per_share)?;
    let target_income = require_finite("--target-income", args.target_income)?;

    if args.horizon > MAX_HORIZON_YEARS {
        return Err(format!("--horizon must be <= {MAX_HORIZON_YEARS} years"));
    }

    Ok((
        Holding {
            price,
            annual_dividend_per_share: dividend,
        },
        IncomeGoalConfig {
            target_annual_income: target_income,
            horizon_years: args.horizon,
            reinvest: args.reinvest,
            tax_rate_percent: clamp_tax_rate("--tax-rate", args.tax_rate_percent)?,
        },
    ))
}

pub fn build_projection_response(params: &ProjectionParams) -> ProjectionResponse {
    ProjectionResponse {
        price: params.holding.price,
        annual_dividend_per_share: params.holding.annual_dividend_per_share,
        investment: params.investment,
        reinvest: params.reinvest,
        tax_rate_percent: params.tax_rate_percent,
        current_yield: current_yield(params.holding),
        horizons: params.horizons.clone(),
        projections: project_dividends(params),
    }
}

pub fn build_goal_response(holding: Holding, result: IncomeGoalResult) -> GoalResponse {
    GoalResponse {
        price: holding.price,
        annual_dividend_per_share: holding.annual_dividend_per_share,
        target_income: result.config.target_annual_income,
        horizon: result.config.horizon_years,
        reinvest: result.config.reinvest,
        tax_rate_percent: result.config.tax_rate_percent,
        required_investment: result.required_investment,
        projection: result.projection,
    }
}

pub fn run_projection(args: &ProjectArgs) -> Result<String, ApiError> {
    let params = build_params(args)?;
    let response = build_projection_response(&params);
    tracing::debug!(
        horizons = response.horizons.len(),
        rows = response.projections.len(),
        "projection computed"
    );

    match args.format {
        OutputFormat::Json => to_json(&response),
        OutputFormat::Table => Ok(render_projection_table(&response)),
    }
}

pub fn run_goal(args: &GoalArgs) -> Result<String, ApiError> {
    let (holding, config) = build_goal(args)?;
    let result = solve_income_goal(holding, config)?;
    let response = build_goal_response(holding, result);

    match args.format {
        OutputFormat::Json => to_json(&response),
        OutputFormat::Table => Ok(render_goal_summary(&response)),
    }
}

fn to_json<T: Serialize>(value: &T) -> Result<String, ApiError> {
    Ok(format!("{}\n", serde_json::to_string_pretty(value)?))
}

fn render_projection_table(response: &ProjectionResponse) -> String {
    if response.projections.is_empty() {
        return "No projection: price and annual dividend must both be > 0\n".to_string();
    }

    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:>5} {:>12} {:>14} {:>14} {:>14} {:>16} {:>16}",
        "Years", "Shares", "Income", "After tax", "Total paid", "Value (hold)", "Value (reinv)"
    );
    for row in &response.projections {
        let _ = writeln!(
            out,
            "{:>5} {:>12.4} {:>14.2} {:>14.2} {:>14.2} {:>16.2} {:>16.2}",
            row.years,
            row.year_end_shares,
            row.annual_dividend_income,
            row.annual_dividend_income_after_tax,
            row.total_dividends,
            row.portfolio_value_no_reinvest,
            row.portfolio_value_with_reinvest,
        );
    }
    out
}

fn render_goal_summary(response: &GoalResponse) -> String {
    format!(
        "Invest {:.2} today to earn {:.2} a year after tax in {} years ({:.4} shares, {:.2} paid out along the way)\n",
        response.required_investment,
        response.projection.annual_dividend_income_after_tax,
        response.horizon,
        response.projection.year_end_shares,
        response.projection.total_dividends,
    )
}

pub fn router() -> Router {
    Router::new()
        .route("/healthz", get(health_handler))
        .route(
            "/api/projections",
            get(projections_get_handler).post(projections_post_handler),
        )
        .route("/api/goal", get(goal_get_handler).post(goal_post_handler))
        .fallback(not_found_handler)
}

pub async fn run_http_server(config: ServerConfig) -> std::io::Result<()> {
    let addr = config.socket_addr();
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "dividend projection API listening");

    axum::serve(listener, router()).await
}

async fn health_handler() -> Response {
    json_response(StatusCode::OK, HealthResponse { status: "ok" })
}

async fn not_found_handler() -> Response {
    ApiError::NotFound.into_response()
}

// Extractor failures go through `reject` so malformed requests still get a
// JSON 400 with no-store instead of axum's plain-text rejection.
async fn projections_get_handler(
    payload: Result<Query<ProjectionPayload>, QueryRejection>,
) -> Response {
    match payload {
        Ok(Query(payload)) => projections_handler_impl(payload),
        Err(e) => reject(e.body_text()),
    }
}

async fn projections_post_handler(
    payload: Result<Json<ProjectionPayload>, JsonRejection>,
) -> Response {
    match payload {
        Ok(Json(payload)) => projections_handler_impl(payload),
        Err(e) => reject(e.body_text()),
    }
}

async fn goal_get_handler(payload: Result<Query<GoalPayload>, QueryRejection>) -> Response {
    match payload {
        Ok(Query(payload)) => goal_handler_impl(payload),
        Err(e) => reject(e.body_text()),
    }
}

async fn goal_post_handler(payload: Result<Json<GoalPayload>, JsonRejection>) -> Response {
    match payload {
        Ok(Json(payload)) => goal_handler_impl(payload),
        Err(e) => reject(e.body_text()),
    }
}

fn projections_handler_impl(payload: ProjectionPayload) -> Response {
    let params = match project_args_from_payload(payload).and_then(|args| build_params(&args)) {
        Ok(params) => params,
        Err(msg) => return reject(msg),
    };

    let response = build_projection_response(&params);
    tracing::debug!(
        price = params.holding.price,
        reinvest = params.reinvest,
        rows = response.projections.len(),
        "projection request served"
    );
    json_response(StatusCode::OK, response)
}

fn goal_handler_impl(payload: GoalPayload) -> Response {
    let (holding, config) = match build_goal(&goal_args_from_payload(payload)) {
        Ok(goal) => goal,
        Err(msg) => return reject(msg),
    };

    match solve_income_goal(holding, config) {
        Ok(result) => json_response(StatusCode::OK, build_goal_response(holding, result)),
        Err(e) => reject(e.to_string()),
    }
}

fn reject(msg: String) -> Response {
    tracing::warn!(reason = %msg, "rejected request");
    ApiError::Validation(msg).into_response()
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    let mut response = (status, Json(body)).into_response();
    response
        .headers_mut()
        .insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
    response
}

fn project_args_from_payload(payload: ProjectionPayload) -> Result<ProjectArgs, String> {
    let mut args = default_project_args_for_api();

    if let Some(v) = payload.price {
        args.price = v;
    }
    if let Some(v) = payload.annual_dividend_per_share {
        args.annual_dividend_per_share = v;
    }
    if let Some(v) = payload.investment {
        args.investment = v;
    }
    if let Some(v) = payload.reinvest {
        args.reinvest = v;
    }
    if let Some(v) = payload.tax_rate_percent {
        args.tax_rate_percent = v;
    }
    if let Some(v) = payload.horizons {
        args.horizons = v.into_years()?;
    }

    Ok(args)
}

fn goal_args_from_payload(payload: GoalPayload) -> GoalArgs {
    let mut args = default_goal_args_for_api();

    if let Some(v) = payload.price {
        args.price = v;
    }
    if let Some(v) = payload.annual_dividend_per_share {
        args.annual_dividend_per_share = v;
    }
    if let Some(v) = payload.target_income {
        args.target_income = v;
    }
    if let Some(v) = payload.horizon {
        args.horizon = v;
    }
    if let Some(v) = payload.reinvest {
        args.reinvest = v;
    }
    if let Some(v) = payload.tax_rate_percent {
        args.tax_rate_percent = v;
    }

    args
}

fn default_project_args_for_api() -> ProjectArgs {
    ProjectArgs {
        price: 100.0,
        annual_dividend_per_share: 4.0,
        investment: 10_000.0,
        reinvest: false,
        tax_rate_percent: 0.0,
        horizons: Vec::new(),
        format: OutputFormat::Json,
    }
}

fn default_goal_args_for_api() -> GoalArgs {
    GoalArgs {
        price: 100.0,
        annual_dividend_per_share: 4.0,
        target_income: 12_000.0,
        horizon: 10,
        reinvest: true,
        tax_rate_percent: 0.0,
        format: OutputFormat::Json,
    }
}
