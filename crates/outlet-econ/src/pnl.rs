//! Profit-and-loss waterfall and a synthetic trailing-year history.

use crate::calendar::MONTH_ABBREVIATIONS;
use crate::insight::{classify, money, pct, percent_of, Bands, Bound, CURRENCY};
use crate::EngineError;
use chrono::{Datelike, NaiveDate};
use outlet_core::{validate_percent, Percent, ValidationError};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use tracing::debug;

const DEPRECIATION_RATE: f64 = 0.03;
const INTEREST_RATE: f64 = 0.01;
const TAX_RATE: f64 = 0.15;
/// History approximates tax drag with a flat 15% of operating profit.
const HISTORY_NET_SHARE: f64 = 0.85;

const GROSS_MARGIN_BANDS: &Bands = &[
    (Bound::Above(70.0), "excellent"),
    (Bound::Above(65.0), "good"),
    (Bound::Above(60.0), "average"),
    (Bound::Any, "below average"),
];

const EBITDA_MARGIN_BANDS: &Bands = &[
    (Bound::Above(25.0), "excellent"),
    (Bound::Above(20.0), "good"),
    (Bound::Above(15.0), "average"),
    (Bound::Any, "below average"),
];

const NET_MARGIN_BANDS: &Bands = &[
    (Bound::Above(15.0), "excellent"),
    (Bound::Above(10.0), "good"),
    (Bound::Above(5.0), "average"),
    (Bound::Any, "below average"),
];

const LABOR_BANDS: &Bands = &[
    (Bound::Below(22.0), "excellent"),
    (Bound::Below(25.0), "good"),
    (Bound::Below(30.0), "average"),
    (Bound::Any, "high"),
];

const COGS_BANDS: &Bands = &[
    (Bound::Below(25.0), "excellent"),
    (Bound::Below(28.0), "good"),
    (Bound::Below(32.0), "average"),
    (Bound::Any, "high"),
];

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlParams {
    pub monthly_revenue: f64,
    pub food_revenue: f64,
    pub beverage_revenue: f64,
    pub food_cost: Percent,
    pub beverage_cost: Percent,
    pub labor: Percent,
    pub rent: Percent,
    pub marketing: Percent,
    pub utilities: Percent,
    pub other: Percent,
    /// History ends at this date's month.
    pub as_of: NaiveDate,
    /// Display-only selectors carried through from the caller.
    #[serde(default)]
    pub timeframe: Option<String>,
    #[serde(default)]
    pub selected_month: Option<String>,
}

impl PlParams {
    fn operating_percent(&self) -> f64 {
        self.labor.value()
            + self.rent.value()
            + self.marketing.value()
            + self.utilities.value()
            + self.other.value()
    }
}

/// One month's P&L waterfall.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlStatement {
    pub total_revenue: f64,
    pub food_revenue: f64,
    pub beverage_revenue: f64,
    pub food_cost: f64,
    pub beverage_cost: f64,
    pub total_cogs: f64,
    pub gross_profit: f64,
    pub gross_profit_margin: f64,
    pub labor_cost: f64,
    pub rent: f64,
    pub marketing: f64,
    pub utilities: f64,
    pub other_expenses: f64,
    pub total_operating_expenses: f64,
    pub operating_profit: f64,
    pub operating_profit_margin: f64,
    pub depreciation_amortization: f64,
    pub ebit: f64,
    pub interest_expense: f64,
    pub ebt: f64,
    pub taxes: f64,
    pub net_profit: f64,
    pub net_profit_margin: f64,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PlHistory {
    pub labels: Vec<String>,
    pub revenue: Vec<i64>,
    pub cogs: Vec<i64>,
    pub operating_expenses: Vec<i64>,
    pub operating_profit: Vec<i64>,
    pub net_profit: Vec<i64>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlReport {
    pub statement: PlStatement,
    pub history: PlHistory,
    pub insights: Vec<String>,
    pub optimization_opportunities: Vec<String>,
}

fn validate(p: &PlParams) -> Result<(), EngineError> {
    for (field, v) in [
        ("monthly_revenue", p.monthly_revenue),
        ("food_revenue", p.food_revenue),
        ("beverage_revenue", p.beverage_revenue),
    ] {
        if !v.is_finite() {
            return Err(ValidationError::NonFinite(field).into());
        }
        if v < 0.0 {
            return Err(ValidationError::Negative(field).into());
        }
    }
    for (field, v) in [
        ("food_cost", p.food_cost),
        ("beverage_cost", p.beverage_cost),
        ("labor", p.labor),
        ("rent", p.rent),
        ("marketing", p.marketing),
        ("utilities", p.utilities),
        ("other", p.other),
    ] {
        validate_percent(field, v)?;
    }
    if p.monthly_revenue == 0.0 {
        return Err(EngineError::DivisionByZero {
            what: "monthly_revenue",
        });
    }
    Ok(())
}

fn statement(p: &PlParams) -> PlStatement {
    let revenue = p.monthly_revenue;
    let food_cost = p.food_revenue * p.food_cost.fraction();
    let beverage_cost = p.beverage_revenue * p.beverage_cost.fraction();
    let total_cogs = food_cost + beverage_cost;
    let gross_profit = revenue - total_cogs;

    let labor_cost = revenue * p.labor.fraction();
    let rent = revenue * p.rent.fraction();
    let marketing = revenue * p.marketing.fraction();
    let utilities = revenue * p.utilities.fraction();
    let other_expenses = revenue * p.other.fraction();
    let total_operating_expenses = labor_cost + rent + marketing + utilities + other_expenses;

    let operating_profit = gross_profit - total_operating_expenses;
    let depreciation_amortization = revenue * DEPRECIATION_RATE;
    let ebit = operating_profit - depreciation_amortization;
    let interest_expense = revenue * INTEREST_RATE;
    let ebt = ebit - interest_expense;
    let taxes = (ebt * TAX_RATE).max(0.0);
    let net_profit = ebt - taxes;

    PlStatement {
        total_revenue: revenue,
        food_revenue: p.food_revenue,
        beverage_revenue: p.beverage_revenue,
        food_cost,
        beverage_cost,
        total_cogs,
        gross_profit,
        gross_profit_margin: gross_profit / revenue * 100.0,
        labor_cost,
        rent,
        marketing,
        utilities,
        other_expenses,
        total_operating_expenses,
        operating_profit,
        operating_profit_margin: operating_profit / revenue * 100.0,
        depreciation_amortization,
        ebit,
        interest_expense,
        ebt,
        taxes,
        net_profit,
        net_profit_margin: net_profit / revenue * 100.0,
    }
}

/// Twelve months ending at `p.as_of`. Draws exactly twelve values from `rng`.
fn history<R: Rng + ?Sized>(p: &PlParams, rng: &mut R) -> PlHistory {
    let month0 = p.as_of.month0() as usize;
    let cogs_share = (p.food_cost.value() * 0.7 + p.beverage_cost.value() * 0.3) / 100.0;
    let opex_share = p.operating_percent() / 100.0;

    let mut h = PlHistory::default();
    for i in 0..12 {
        h.labels
            .push(MONTH_ABBREVIATIONS[(month0 + 1 + i) % 12].to_string());

        let seasonal = 1.0 + (i as f64 / 11.0 * PI * 2.0).sin() * 0.2;
        let random = 0.9 + rng.gen::<f64>() * 0.2;
        let revenue = p.monthly_revenue * seasonal * random;
        let cogs = revenue * cogs_share;
        let opex = revenue * opex_share;
        let op_profit = revenue - cogs - opex;

        h.revenue.push(revenue.round() as i64);
        h.cogs.push(cogs.round() as i64);
        h.operating_expenses.push(opex.round() as i64);
        h.operating_profit.push(op_profit.round() as i64);
        h.net_profit.push((op_profit * HISTORY_NET_SHARE).round() as i64);
    }
    h
}

/// Build the waterfall, history and commentary for one month of trading.
///
/// Fails with [`EngineError::DivisionByZero`] when `monthly_revenue` is zero,
/// since every margin is a share of revenue.
pub fn calculate_profit_loss<R: Rng + ?Sized>(
    p: &PlParams,
    rng: &mut R,
) -> Result<PlReport, EngineError> {
    validate(p)?;
    let statement = statement(p);
    let history = history(p, rng);

    debug!(
        revenue = statement.total_revenue,
        net_profit = statement.net_profit,
        "profit and loss calculated"
    );

    let cogs_pct = percent_of(statement.total_cogs, statement.total_revenue);
    let insights = vec![
        format!(
            "Gross profit margin of {:.1}% is {} for the F&B industry",
            statement.gross_profit_margin,
            classify(GROSS_MARGIN_BANDS, statement.gross_profit_margin)
        ),
        format!(
            "Operating profit (EBITDA) of {:.1}% is {} for the F&B industry",
            statement.operating_profit_margin,
            classify(EBITDA_MARGIN_BANDS, statement.operating_profit_margin)
        ),
        format!(
            "Net profit margin of {:.1}% is {} for the F&B industry",
            statement.net_profit_margin,
            classify(NET_MARGIN_BANDS, statement.net_profit_margin)
        ),
        format!(
            "Labor cost at {} of revenue is {} for the F&B industry",
            p.labor,
            classify(LABOR_BANDS, p.labor.value())
        ),
        format!(
            "Combined food and beverage cost of {}% is {}",
            pct(cogs_pct),
            classify(COGS_BANDS, cogs_pct.unwrap_or_default())
        ),
    ];

    let optimization_opportunities = vec![
        format!(
            "Reducing food cost by 2% would increase gross profit by {CURRENCY} {} monthly",
            money(p.food_revenue * 0.02)
        ),
        format!(
            "Reducing labor cost by 2% would increase operating profit by {CURRENCY} {} monthly",
            money(statement.total_revenue * 0.02)
        ),
        "Increasing beverage sales by 5% would improve overall margins due to higher profitability"
            .to_string(),
        "Implementing energy efficiency measures could reduce utilities by 1% of revenue"
            .to_string(),
        "Optimizing staffing during non-peak hours could reduce labor costs by 3-5%".to_string(),
    ];

    Ok(PlReport {
        statement,
        history,
        insights,
        optimization_opportunities,
    })
}
