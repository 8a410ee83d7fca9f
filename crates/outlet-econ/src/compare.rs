//! Side-by-side comparison of two or more scenarios.
//!
//! The first scenario is the base; every later one is diffed against it.

use crate::insight::{money, pct, percent_of, CURRENCY};
use crate::EngineError;
use outlet_core::{headcount, labor_cost, validate_scenario, ScenarioConfig};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Monthly revenue assumed for scenarios that do not state one.
pub const FALLBACK_MONTHLY_REVENUE: f64 = 1_200_000.0;

const RECOMMENDATIONS: [&str; 5] = [
    "Consider implementing the scenario with the lowest labor cost percentage for optimal profitability",
    "Balance staffing reductions with service quality considerations",
    "Evaluate the impact of each scenario on guest experience and revenue potential",
    "Consider testing the most promising scenario in a single location before full implementation",
    "Regularly review and adjust staffing models based on seasonal demand patterns",
];

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScenarioSummary {
    pub id: String,
    pub name: String,
    pub foh_staff: u32,
    pub boh_staff: u32,
    pub total_staff: u32,
    pub foh_labor: Decimal,
    pub boh_labor: Decimal,
    pub total_labor: Decimal,
    pub estimated_revenue: f64,
    pub labor_percentage: f64,
}

impl ScenarioSummary {
    pub fn of(s: &ScenarioConfig) -> Self {
        let foh_staff = headcount(&s.foh_positions);
        let boh_staff = headcount(&s.boh_positions);
        let foh_labor = labor_cost(&s.foh_positions);
        let boh_labor = labor_cost(&s.boh_positions);
        let total_labor = foh_labor + boh_labor;
        // A stated revenue of zero counts as unstated.
        let estimated_revenue = s
            .estimated_monthly_revenue()
            .filter(|r| *r > 0.0)
            .unwrap_or(FALLBACK_MONTHLY_REVENUE);
        Self {
            id: s.id.clone(),
            name: s.name.clone(),
            foh_staff,
            boh_staff,
            total_staff: foh_staff + boh_staff,
            foh_labor,
            boh_labor,
            total_labor,
            estimated_revenue,
            labor_percentage: total_labor.to_f64().unwrap_or_default() / estimated_revenue * 100.0,
        }
    }
}

/// One later scenario measured against the base.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScenarioDifference {
    pub base: String,
    pub other: String,
    pub staff_difference: i64,
    pub staff_percentage: Option<f64>,
    pub labor_difference: Decimal,
    pub labor_percentage: Option<f64>,
    pub revenue_difference: f64,
    pub revenue_percentage: Option<f64>,
    /// Change in labor-to-revenue percentage, in points.
    pub labor_ratio_difference: f64,
}

impl ScenarioDifference {
    fn between(base: &ScenarioSummary, other: &ScenarioSummary) -> Self {
        let staff_difference = i64::from(other.total_staff) - i64::from(base.total_staff);
        let labor_difference = other.total_labor - base.total_labor;
        let revenue_difference = other.estimated_revenue - base.estimated_revenue;
        Self {
            base: base.name.clone(),
            other: other.name.clone(),
            staff_difference,
            staff_percentage: percent_of(staff_difference as f64, f64::from(base.total_staff)),
            labor_difference,
            labor_percentage: percent_of(
                labor_difference.to_f64().unwrap_or_default(),
                base.total_labor.to_f64().unwrap_or_default(),
            ),
            revenue_difference,
            revenue_percentage: percent_of(revenue_difference, base.estimated_revenue),
            labor_ratio_difference: other.labor_percentage - base.labor_percentage,
        }
    }

    /// Zero to three sentences; a metric that did not move is not mentioned.
    fn insights(&self) -> Vec<String> {
        let (a, b) = (&self.base, &self.other);
        let mut out = Vec::new();

        let staff_pct = pct(self.staff_percentage.map(f64::abs));
        if self.staff_difference < 0 {
            out.push(format!(
                "{b} requires {} fewer staff ({staff_pct}% reduction) compared to {a}",
                self.staff_difference.abs()
            ));
        } else if self.staff_difference > 0 {
            out.push(format!(
                "{b} requires {} more staff ({staff_pct}% increase) compared to {a}",
                self.staff_difference
            ));
        }

        let labor_pct = pct(self.labor_percentage.map(f64::abs));
        let labor_abs = money(self.labor_difference.abs().to_f64().unwrap_or_default());
        if self.labor_difference < Decimal::ZERO {
            out.push(format!(
                "{b} reduces labor cost by {CURRENCY} {labor_abs} ({labor_pct}% reduction) compared to {a}"
            ));
        } else if self.labor_difference > Decimal::ZERO {
            out.push(format!(
                "{b} increases labor cost by {CURRENCY} {labor_abs} ({labor_pct}% increase) compared to {a}"
            ));
        }

        let ratio = self.labor_ratio_difference;
        if ratio < 0.0 {
            out.push(format!(
                "{b} improves labor cost percentage by {:.1} percentage points compared to {a}",
                ratio.abs()
            ));
        } else if ratio > 0.0 {
            out.push(format!(
                "{b} increases labor cost percentage by {ratio:.1} percentage points compared to {a}"
            ));
        }
        out
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ComparisonResult {
    pub scenarios: Vec<ScenarioSummary>,
    pub differences: Vec<ScenarioDifference>,
    pub insights: Vec<String>,
    pub recommendations: Vec<String>,
}

/// Compare `scenarios`, diffing each one after the first against the first.
pub fn compare_scenarios(scenarios: &[ScenarioConfig]) -> Result<ComparisonResult, EngineError> {
    if scenarios.len() < 2 {
        return Err(EngineError::NotEnoughScenarios {
            got: scenarios.len(),
        });
    }
    for s in scenarios {
        validate_scenario(s)?;
    }

    let summaries: Vec<ScenarioSummary> = scenarios.iter().map(ScenarioSummary::of).collect();
    let base = &summaries[0];
    let differences: Vec<ScenarioDifference> = summaries[1..]
        .iter()
        .map(|other| ScenarioDifference::between(base, other))
        .collect();
    let insights = differences.iter().flat_map(|d| d.insights()).collect();

    debug!(
        scenarios = summaries.len(),
        base = %base.id,
        "scenarios compared"
    );

    Ok(ComparisonResult {
        scenarios: summaries,
        differences,
        insights,
        recommendations: RECOMMENDATIONS.iter().map(|r| r.to_string()).collect(),
    })
}
