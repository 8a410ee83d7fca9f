//! What-if analysis: sparse overrides on a scenario's financial snapshot.

use crate::insight::{money, pct, percent_of, CURRENCY};
use crate::EngineError;
use outlet_core::{
    validate_percent, validate_revenue_drivers, Percent, ScenarioConfig, ValidationError,
};
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// Revenue share attributed to food; beverage takes the rest.
const FOOD_SHARE: f64 = 0.7;
/// Costs outside food, beverage and labor, as a share of revenue.
const OTHER_COST_SHARE: f64 = 0.25;
const DAYS_PER_MONTH: f64 = 30.0;

/// Monthly financials for one variant of a scenario.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FinancialSnapshot {
    pub id: String,
    pub name: String,
    pub avg_check: f64,
    pub daily_covers: f64,
    pub food_cost_percentage: f64,
    pub beverage_cost_percentage: f64,
    pub labor_cost_percentage: f64,
    pub total_revenue: f64,
    pub total_cost: f64,
    pub profit: f64,
    /// `None` when revenue is zero.
    pub profit_margin: Option<f64>,
}

impl FinancialSnapshot {
    /// Snapshot of a stored scenario. Revenue is the explicit monthly figure
    /// when set, else average spend × daily covers × 30.
    pub fn of(s: &ScenarioConfig) -> Result<Self, EngineError> {
        let drivers = s
            .revenue_drivers
            .as_ref()
            .ok_or(EngineError::MissingField("revenue_drivers"))?;
        validate_revenue_drivers(drivers)?;
        let ratios = s.cost_ratios.clone().unwrap_or_default();
        let daily_covers = f64::from(drivers.daily_covers.unwrap_or(0));
        let total_revenue = drivers
            .monthly_revenue
            .filter(|r| *r > 0.0)
            .unwrap_or(drivers.avg_spending * daily_covers * DAYS_PER_MONTH);
        let labor = s.total_labor_cost().to_f64().unwrap_or_default();

        let mut snap = FinancialSnapshot {
            id: s.id.clone(),
            name: s.name.clone(),
            avg_check: drivers.avg_spending,
            daily_covers,
            food_cost_percentage: ratios.food_cost.value(),
            beverage_cost_percentage: ratios.beverage_cost.value(),
            labor_cost_percentage: percent_of(labor, total_revenue).unwrap_or(0.0),
            total_revenue,
            total_cost: 0.0,
            profit: 0.0,
            profit_margin: None,
        };
        snap.recompute_costs();
        Ok(snap)
    }

    fn recompute_costs(&mut self) {
        let r = self.total_revenue;
        let food = r * FOOD_SHARE * self.food_cost_percentage / 100.0;
        let beverage = r * (1.0 - FOOD_SHARE) * self.beverage_cost_percentage / 100.0;
        let labor = r * self.labor_cost_percentage / 100.0;
        let other = r * OTHER_COST_SHARE;
        self.total_cost = food + beverage + labor + other;
        self.profit = r - self.total_cost;
        self.profit_margin = percent_of(self.profit, r);
    }

    /// Field slot for an override key. Derived fields are not settable.
    /// Percentages are the `*_percentage` fields.
    fn slot(&mut self, key: &str) -> Option<(&'static str, &mut f64)> {
        match key {
            "avg_check" => Some(("avg_check", &mut self.avg_check)),
            "daily_covers" => Some(("daily_covers", &mut self.daily_covers)),
            "food_cost_percentage" => {
                Some(("food_cost_percentage", &mut self.food_cost_percentage))
            }
            "beverage_cost_percentage" => Some((
                "beverage_cost_percentage",
                &mut self.beverage_cost_percentage,
            )),
            "labor_cost_percentage" => {
                Some(("labor_cost_percentage", &mut self.labor_cost_percentage))
            }
            "total_revenue" => Some(("total_revenue", &mut self.total_revenue)),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Impact {
    pub revenue_change: f64,
    pub revenue_change_percentage: Option<f64>,
    pub cost_change: f64,
    pub cost_change_percentage: Option<f64>,
    pub profit_change: f64,
    pub profit_change_percentage: Option<f64>,
    /// Percentage points; `None` when either margin is undefined.
    pub margin_change: Option<f64>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WhatIfResult {
    pub base: FinancialSnapshot,
    pub modified: FinancialSnapshot,
    /// Override keys that changed the snapshot.
    pub applied: Vec<String>,
    /// Override keys that were not recognised or name derived fields.
    pub ignored: Vec<String>,
    pub impact: Impact,
    pub insights: Vec<String>,
}

/// Drivers and revenue must be finite and non-negative; percentages must lie
/// in [0, 100].
fn check_override(field: &'static str, value: f64) -> Result<(), ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::NonFinite(field));
    }
    if field.ends_with("_percentage") {
        validate_percent(field, Percent(value))
    } else if value < 0.0 {
        Err(ValidationError::Negative(field))
    } else {
        Ok(())
    }
}

/// Apply `overrides` to the scenario's snapshot and report the impact.
///
/// Keys are snapshot field names. Unknown keys and derived fields
/// (`total_cost`, `profit`, `profit_margin`) are ignored. Revenue is
/// recomputed as `avg_check × daily_covers × 30` when either driver is
/// overridden.
pub fn run_what_if(
    scenario: &ScenarioConfig,
    overrides: &BTreeMap<String, f64>,
) -> Result<WhatIfResult, EngineError> {
    let base = FinancialSnapshot::of(scenario)?;
    let mut modified = base.clone();
    modified.id = format!("{}-modified", base.id);
    modified.name = "Modified Scenario".to_string();

    let mut applied = Vec::new();
    let mut ignored = Vec::new();
    for (key, value) in overrides {
        match modified.slot(key) {
            Some((field, slot)) => {
                check_override(field, *value)?;
                *slot = *value;
                applied.push(key.clone());
            }
            None => {
                debug!(%key, "what-if override ignored");
                ignored.push(key.clone());
            }
        }
    }

    if overrides.contains_key("avg_check") || overrides.contains_key("daily_covers") {
        modified.total_revenue = modified.avg_check * modified.daily_covers * DAYS_PER_MONTH;
    }
    modified.recompute_costs();

    let revenue_change = modified.total_revenue - base.total_revenue;
    let cost_change = modified.total_cost - base.total_cost;
    let profit_change = modified.profit - base.profit;
    let impact = Impact {
        revenue_change,
        revenue_change_percentage: percent_of(revenue_change, base.total_revenue),
        cost_change,
        cost_change_percentage: percent_of(cost_change, base.total_cost),
        profit_change,
        profit_change_percentage: percent_of(profit_change, base.profit),
        margin_change: modified
            .profit_margin
            .zip(base.profit_margin)
            .map(|(m, b)| m - b),
    };

    debug!(
        scenario = %scenario.id,
        applied = applied.len(),
        profit_change,
        "what-if evaluated"
    );

    let insights = insights(&impact);
    Ok(WhatIfResult {
        base,
        modified,
        applied,
        ignored,
        impact,
        insights,
    })
}

fn change_sentence(noun: &str, delta: f64, percent: Option<f64>) -> String {
    let verb = if delta > 0.0 { "Increasing" } else { "Decreasing" };
    format!(
        "{verb} {noun} by {CURRENCY} {} ({}%)",
        money(delta.abs()),
        pct(percent.map(f64::abs))
    )
}

fn insights(impact: &Impact) -> Vec<String> {
    let margin = match impact.margin_change {
        Some(m) => format!(
            "{} profit margin by {:.1} percentage points",
            if m > 0.0 { "Improving" } else { "Reducing" },
            m.abs()
        ),
        None => "Profit margin change is n/a".to_string(),
    };
    let roi = if impact.cost_change > 0.0 {
        format!(
            "Return on investment: {:.1}%",
            impact.profit_change / impact.cost_change.max(1.0) * 100.0
        )
    } else {
        "Cost reduction with maintained or improved profitability".to_string()
    };
    vec![
        change_sentence(
            "revenue",
            impact.revenue_change,
            impact.revenue_change_percentage,
        ),
        change_sentence("costs", impact.cost_change, impact.cost_change_percentage),
        change_sentence(
            "profit",
            impact.profit_change,
            impact.profit_change_percentage,
        ),
        margin,
        roi,
    ]
}
