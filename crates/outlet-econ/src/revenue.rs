//! Multi-period revenue projections.
//!
//! Each period's revenue is
//! `avg_check × daily_covers × split × days × seasonal × growth`, where the
//! seasonal factor comes from a fixed month table (optionally damped for
//! Ramadan) and growth compounds annually across periods.

use crate::calendar::{days_in_month, shift_month};
use crate::insight::{millions, money, percent_of, pct, CURRENCY};
use crate::EngineError;
use chrono::{Datelike, NaiveDate};
use outlet_core::{validate_percent, Percent, ValidationError};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Baseline demand multiplier per calendar month, January first.
pub const MONTHLY_SEASONALITY: [f64; 12] =
    [0.90, 0.95, 1.00, 1.05, 1.10, 0.90, 0.85, 0.90, 1.00, 1.10, 1.15, 1.20];

/// Calendar month treated as Ramadan.
pub const RAMADAN_MONTH: u32 = 9;

const RAMADAN_MONTHLY: f64 = 0.7;
const RAMADAN_QUARTERLY: f64 = 0.9;
const RAMADAN_YEARLY: f64 = 0.95;
const DAYS_PER_QUARTER: u32 = 90;
const DAYS_PER_YEAR: u32 = 365;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectionPeriod {
    Monthly,
    Quarterly,
    Yearly,
}

impl ProjectionPeriod {
    pub fn periods_per_year(self) -> f64 {
        match self {
            ProjectionPeriod::Monthly => 12.0,
            ProjectionPeriod::Quarterly => 4.0,
            ProjectionPeriod::Yearly => 1.0,
        }
    }

    fn noun(self) -> &'static str {
        match self {
            ProjectionPeriod::Monthly => "month",
            ProjectionPeriod::Quarterly => "quarter",
            ProjectionPeriod::Yearly => "year",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RevenueParams {
    pub period: ProjectionPeriod,
    /// Number of periods to project (>= 1).
    pub length: u32,
    pub avg_check: f64,
    pub daily_covers: u32,
    /// Food share of revenue; beverage takes the rest.
    pub food_bev_ratio: Percent,
    /// Multiplier applied on top of the month table.
    pub seasonality_factor: f64,
    /// Annual growth, in percent. May be negative.
    pub growth_rate: f64,
    #[serde(default)]
    pub apply_ramadan: bool,
    /// First projected period starts in this date's month.
    pub start: NaiveDate,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub outlet: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RevenueSummary {
    pub total_revenue: i64,
    pub total_food: i64,
    pub total_beverage: i64,
    pub average_period_revenue: f64,
    /// Second projected year over first; monthly projections of 24+ periods only.
    pub yoy_growth: Option<f64>,
    pub peak_revenue: i64,
    pub peak_period: String,
    pub lowest_revenue: i64,
    pub lowest_period: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RevenueProjection {
    pub periods: Vec<String>,
    pub food: Vec<i64>,
    pub beverage: Vec<i64>,
    pub total: Vec<i64>,
    pub summary: RevenueSummary,
    pub insights: Vec<String>,
    pub optimization_opportunities: Vec<String>,
}

/// Label, day count and seasonal factor for one period.
struct PeriodShape {
    label: String,
    days: u32,
    seasonal: f64,
}

fn seasonality(month: u32) -> f64 {
    MONTHLY_SEASONALITY[(month - 1) as usize]
}

fn period_shape(p: &RevenueParams, index: u32) -> PeriodShape {
    let (y0, m0) = (p.start.year(), p.start.month());
    match p.period {
        ProjectionPeriod::Monthly => {
            let (year, month) = shift_month(y0, m0, index);
            let mut seasonal = seasonality(month) * p.seasonality_factor;
            if p.apply_ramadan && month == RAMADAN_MONTH {
                seasonal *= RAMADAN_MONTHLY;
            }
            PeriodShape {
                label: format!("{month}/{year}"),
                days: days_in_month(year, month),
                seasonal,
            }
        }
        ProjectionPeriod::Quarterly => {
            let (year, start_month) = shift_month(y0, m0, index * 3);
            let quarter = (start_month - 1) / 3 + 1;
            let mean = (0..3)
                .map(|j| seasonality(shift_month(year, start_month, j).1))
                .sum::<f64>()
                / 3.0;
            let mut seasonal = mean * p.seasonality_factor;
            if p.apply_ramadan && (start_month..start_month + 3).contains(&RAMADAN_MONTH) {
                seasonal *= RAMADAN_QUARTERLY;
            }
            PeriodShape {
                label: format!("Q{quarter}/{year}"),
                days: DAYS_PER_QUARTER,
                seasonal,
            }
        }
        ProjectionPeriod::Yearly => {
            let mut seasonal = p.seasonality_factor;
            if p.apply_ramadan {
                seasonal *= RAMADAN_YEARLY;
            }
            PeriodShape {
                label: (y0 + index as i32).to_string(),
                days: DAYS_PER_YEAR,
                seasonal,
            }
        }
    }
}

fn validate(p: &RevenueParams) -> Result<(), EngineError> {
    if p.length == 0 {
        return Err(EngineError::EmptyProjection);
    }
    for (field, v) in [
        ("avg_check", p.avg_check),
        ("seasonality_factor", p.seasonality_factor),
    ] {
        if !v.is_finite() {
            return Err(ValidationError::NonFinite(field).into());
        }
        if v < 0.0 {
            return Err(ValidationError::Negative(field).into());
        }
    }
    if !p.growth_rate.is_finite() {
        return Err(ValidationError::NonFinite("growth_rate").into());
    }
    validate_percent("food_bev_ratio", p.food_bev_ratio)?;
    Ok(())
}

/// Rounded amount as `i64`. Fails when the value is not finite or does not
/// fit.
fn checked_amount(field: &'static str, v: f64) -> Result<i64, ValidationError> {
    if !v.is_finite() {
        return Err(ValidationError::NonFinite(field));
    }
    let v = v.round();
    // i64::MAX as f64 rounds up to 2^63, which is already out of range.
    if v < i64::MIN as f64 || v >= i64::MAX as f64 {
        return Err(ValidationError::OutOfRange(field));
    }
    Ok(v as i64)
}

fn checked_sum(field: &'static str, values: &[i64]) -> Result<i64, ValidationError> {
    values
        .iter()
        .try_fold(0i64, |acc, &v| acc.checked_add(v))
        .ok_or(ValidationError::OutOfRange(field))
}

/// Index of the first maximum (or minimum, with `better = lt`).
fn first_extreme(values: &[i64], better: fn(&i64, &i64) -> bool) -> usize {
    let mut best = 0;
    for (i, v) in values.iter().enumerate().skip(1) {
        if better(v, &values[best]) {
            best = i;
        }
    }
    best
}

/// Project revenue over `p.length` periods.
pub fn project_revenue(p: &RevenueParams) -> Result<RevenueProjection, EngineError> {
    validate(p)?;

    let growth = p.growth_rate / 100.0;
    let base_daily = p.avg_check * f64::from(p.daily_covers);
    let base_food = base_daily * p.food_bev_ratio.fraction();
    let base_bev = base_daily * p.food_bev_ratio.complement();

    let n = p.length as usize;
    let mut periods = Vec::with_capacity(n);
    let mut food = Vec::with_capacity(n);
    let mut beverage = Vec::with_capacity(n);
    let mut total = Vec::with_capacity(n);

    for i in 0..p.length {
        let shape = period_shape(p, i);
        let growth_factor = (1.0 + growth).powf(f64::from(i) / p.period.periods_per_year());
        let scale = f64::from(shape.days) * shape.seasonal * growth_factor;
        let f = checked_amount("food", base_food * scale)?;
        let b = checked_amount("beverage", base_bev * scale)?;
        periods.push(shape.label);
        food.push(f);
        beverage.push(b);
        // Summing the rounded parts keeps food + beverage == total exactly.
        total.push(f.checked_add(b).ok_or(ValidationError::OutOfRange("total"))?);
    }

    let total_revenue = checked_sum("total_revenue", &total)?;
    let total_food = checked_sum("total_food", &food)?;
    let total_beverage = checked_sum("total_beverage", &beverage)?;

    let yoy_growth = if p.period == ProjectionPeriod::Monthly && n >= 24 {
        let first = checked_sum("total_revenue", &total[..12])?;
        let second = checked_sum("total_revenue", &total[12..24])?;
        percent_of(second as f64 - first as f64, first as f64)
    } else {
        None
    };

    let peak = first_extreme(&total, |a, b| a > b);
    let low = first_extreme(&total, |a, b| a < b);

    let summary = RevenueSummary {
        total_revenue,
        total_food,
        total_beverage,
        average_period_revenue: total_revenue as f64 / n as f64,
        yoy_growth,
        peak_revenue: total[peak],
        peak_period: periods[peak].clone(),
        lowest_revenue: total[low],
        lowest_period: periods[low].clone(),
    };

    debug!(
        periods = n,
        total_revenue,
        peak_period = %summary.peak_period,
        "revenue projected"
    );

    let insights = insights(p, &summary);
    let optimization_opportunities = opportunities(p, &summary);

    Ok(RevenueProjection {
        periods,
        food,
        beverage,
        total,
        summary,
        insights,
        optimization_opportunities,
    })
}

fn insights(p: &RevenueParams, s: &RevenueSummary) -> Vec<String> {
    let direction = if p.growth_rate > 0.0 {
        "Projected growth"
    } else {
        "Projected decline"
    };
    let daily = p.avg_check * f64::from(p.daily_covers);
    vec![
        format!(
            "{direction} of {:.1}% annually will result in total revenue of {CURRENCY} {}M over {} {}s",
            p.growth_rate,
            millions(s.total_revenue as f64),
            p.length,
            p.period.noun()
        ),
        format!(
            "Food revenue accounts for {}% of total revenue",
            pct(percent_of(s.total_food as f64, s.total_revenue as f64))
        ),
        format!(
            "Seasonal variations result in peak revenue during {}",
            s.peak_period
        ),
        format!("Average daily revenue: {CURRENCY} {}", money(daily)),
        format!(
            "Projected annual revenue: {CURRENCY} {}M (without seasonality)",
            millions(daily * 365.0)
        ),
    ]
}

fn opportunities(p: &RevenueParams, s: &RevenueSummary) -> Vec<String> {
    let annual = p.avg_check * f64::from(p.daily_covers) * 365.0;
    vec![
        format!(
            "Increase average check by 10% to achieve {CURRENCY} {}M annual revenue",
            millions(annual * 1.1)
        ),
        "Focus on beverage sales to improve overall margins".to_string(),
        format!(
            "Implement seasonal promotions to boost revenue during {}",
            s.lowest_period
        ),
        "Consider special Ramadan offerings to mitigate the 30% reduction in revenue".to_string(),
        format!(
            "Develop strategies to increase daily covers by 15% to achieve {CURRENCY} {}M annual revenue",
            millions(annual * 1.15)
        ),
    ]
}
