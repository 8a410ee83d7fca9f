//! Alternative staffing plans for a scenario.
//!
//! The default policy is a lookup: each [`OptimizationTarget`] owns a fixed
//! headcount per catalogue role. A [`StaffingModel`] may be consulted
//! instead; when it fails the lookup result is used.

use outlet_core::{
    headcount, labor_cost, ModelStaffing, Role, ScenarioConfig, StaffPosition,
    StaffingConstraints, StaffingFeatures, StaffingModel,
};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use tracing::{debug, warn};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OptimizationTarget {
    LaborCost,
    Efficiency,
    Revenue,
}

impl OptimizationTarget {
    pub fn as_str(self) -> &'static str {
        match self {
            OptimizationTarget::LaborCost => "labor_cost",
            OptimizationTarget::Efficiency => "efficiency",
            OptimizationTarget::Revenue => "revenue",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "labor_cost" => Some(OptimizationTarget::LaborCost),
            "efficiency" => Some(OptimizationTarget::Efficiency),
            "revenue" => Some(OptimizationTarget::Revenue),
            _ => None,
        }
    }

    /// Headcount per catalogue role for this target.
    pub fn policy(self) -> &'static [(Role, u32)] {
        match self {
            OptimizationTarget::LaborCost => LABOR_COST_POLICY,
            OptimizationTarget::Efficiency => EFFICIENCY_POLICY,
            OptimizationTarget::Revenue => REVENUE_POLICY,
        }
    }

    fn recommendations(self) -> &'static [&'static str] {
        match self {
            OptimizationTarget::LaborCost => &[
                "Reduce runner to waiter ratio from 1:2 to 1:3",
                "Consolidate cashier positions during non-peak hours",
                "Reduce line cook staffing by implementing more efficient kitchen workflows",
                "Cross-train prep cooks to handle multiple stations",
                "Implement a single dishwasher system with improved equipment",
            ],
            OptimizationTarget::Efficiency => &[
                "Optimize waiter sections to improve service efficiency",
                "Implement runner zones to reduce travel time",
                "Cross-train staff between FOH and BOH positions",
                "Streamline kitchen processes to reduce preparation time",
                "Implement technology solutions for order taking and processing",
            ],
            OptimizationTarget::Revenue => &[
                "Increase waiter staffing to improve service quality and upselling",
                "Add dedicated runners to ensure prompt food delivery",
                "Increase line cook staffing to handle higher volume",
                "Maintain full prep cook staffing to ensure food quality",
                "Focus on staff training for suggestive selling techniques",
            ],
        }
    }

    fn efficiency_improvement(self) -> u32 {
        if self == OptimizationTarget::Efficiency {
            15
        } else {
            5
        }
    }

    fn revenue_improvement(self) -> u32 {
        if self == OptimizationTarget::Revenue {
            10
        } else {
            0
        }
    }
}

impl fmt::Display for OptimizationTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

const LABOR_COST_POLICY: &[(Role, u32)] = &[
    (Role::Waiter, 6),
    (Role::Runner, 2),
    (Role::Host, 2),
    (Role::Cashier, 1),
    (Role::Manager, 2),
    (Role::Chef, 1),
    (Role::SousChef, 1),
    (Role::LineCook, 3),
    (Role::PrepCook, 2),
    (Role::KitchenHelper, 2),
    (Role::Dishwasher, 1),
];

const EFFICIENCY_POLICY: &[(Role, u32)] = &[
    (Role::Waiter, 7),
    (Role::Runner, 2),
    (Role::Host, 2),
    (Role::Cashier, 1),
    (Role::Manager, 2),
    (Role::Chef, 1),
    (Role::SousChef, 1),
    (Role::LineCook, 4),
    (Role::PrepCook, 2),
    (Role::KitchenHelper, 2),
    (Role::Dishwasher, 1),
];

const REVENUE_POLICY: &[(Role, u32)] = &[
    (Role::Waiter, 9),
    (Role::Runner, 3),
    (Role::Host, 2),
    (Role::Cashier, 2),
    (Role::Manager, 2),
    (Role::Chef, 1),
    (Role::SousChef, 1),
    (Role::LineCook, 5),
    (Role::PrepCook, 3),
    (Role::KitchenHelper, 2),
    (Role::Dishwasher, 2),
];

/// Positions and totals of one plan.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlanSnapshot {
    pub id: String,
    pub name: String,
    pub foh_positions: Vec<StaffPosition>,
    pub boh_positions: Vec<StaffPosition>,
    pub total_staff: u32,
    pub labor_cost: Decimal,
}

impl PlanSnapshot {
    fn new(
        id: String,
        name: String,
        foh_positions: Vec<StaffPosition>,
        boh_positions: Vec<StaffPosition>,
    ) -> Self {
        let total_staff = headcount(&foh_positions) + headcount(&boh_positions);
        let labor_cost = labor_cost(&foh_positions) + labor_cost(&boh_positions);
        Self {
            id,
            name,
            foh_positions,
            boh_positions,
            total_staff,
            labor_cost,
        }
    }

    pub fn of(s: &ScenarioConfig) -> Self {
        Self::new(
            s.id.clone(),
            s.name.clone(),
            s.foh_positions.clone(),
            s.boh_positions.clone(),
        )
    }
}

/// Where the optimized counts came from.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PlanSource {
    PolicyTable,
    Model { model_type: String },
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Improvements {
    /// Positive when the optimized plan employs fewer people.
    pub staff_reduction: i64,
    pub staff_reduction_percentage: f64,
    pub cost_savings: Decimal,
    pub cost_savings_percentage: f64,
    pub efficiency_improvement: u32,
    pub revenue_improvement: u32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OptimizationResult {
    pub target: OptimizationTarget,
    pub source: PlanSource,
    pub original: PlanSnapshot,
    pub optimized: PlanSnapshot,
    pub improvements: Improvements,
    pub recommendations: Vec<String>,
}

fn reassign(positions: &[StaffPosition], counts: &BTreeMap<Role, u32>) -> Vec<StaffPosition> {
    positions
        .iter()
        .map(|p| {
            let mut p = p.clone();
            if let Some(count) = p.role().and_then(|r| counts.get(&r)) {
                p.count = *count;
            }
            p
        })
        .collect()
}

fn improvements(
    original: &PlanSnapshot,
    optimized: &PlanSnapshot,
    target: OptimizationTarget,
) -> Improvements {
    let staff_reduction = i64::from(original.total_staff) - i64::from(optimized.total_staff);
    let staff_reduction_percentage = if staff_reduction > 0 {
        staff_reduction as f64 / f64::from(original.total_staff) * 100.0
    } else {
        0.0
    };
    let cost_savings = original.labor_cost - optimized.labor_cost;
    let cost_savings_percentage = if cost_savings > Decimal::ZERO {
        (cost_savings / original.labor_cost * Decimal::ONE_HUNDRED)
            .to_f64()
            .unwrap_or_default()
    } else {
        0.0
    };
    Improvements {
        staff_reduction,
        staff_reduction_percentage,
        cost_savings,
        cost_savings_percentage,
        efficiency_improvement: target.efficiency_improvement(),
        revenue_improvement: target.revenue_improvement(),
    }
}

fn build(
    scenario: &ScenarioConfig,
    target: OptimizationTarget,
    counts: &BTreeMap<Role, u32>,
    source: PlanSource,
) -> OptimizationResult {
    let original = PlanSnapshot::of(scenario);
    let optimized = PlanSnapshot::new(
        format!("{}-optimized", scenario.id),
        format!("Optimized Scenario ({target})"),
        reassign(&scenario.foh_positions, counts),
        reassign(&scenario.boh_positions, counts),
    );
    let improvements = improvements(&original, &optimized, target);
    debug!(
        scenario = %scenario.id,
        %target,
        staff_reduction = improvements.staff_reduction,
        "staffing optimized"
    );
    OptimizationResult {
        target,
        source,
        original,
        optimized,
        improvements,
        recommendations: target
            .recommendations()
            .iter()
            .map(|r| r.to_string())
            .collect(),
    }
}

fn policy_counts(target: OptimizationTarget) -> BTreeMap<Role, u32> {
    target.policy().iter().copied().collect()
}

/// Table-driven plan. Catalogue roles take the target's counts; other
/// positions keep theirs. Salaries always come from the scenario.
pub fn optimize_staffing(scenario: &ScenarioConfig, target: OptimizationTarget) -> OptimizationResult {
    build(
        scenario,
        target,
        &policy_counts(target),
        PlanSource::PolicyTable,
    )
}

/// Plan from a staffing model, layered over the policy table. Any model
/// failure is logged and the plain table plan is returned.
pub fn optimize_staffing_with_model<M: StaffingModel + ?Sized>(
    scenario: &ScenarioConfig,
    target: OptimizationTarget,
    constraints: &StaffingConstraints,
    model: &M,
) -> OptimizationResult {
    let features = StaffingFeatures::from_scenario(scenario);
    match model.optimize(&features, constraints) {
        Ok(ModelStaffing {
            staffing,
            model_type,
            ..
        }) => {
            let mut counts = policy_counts(target);
            counts.extend(staffing);
            build(scenario, target, &counts, PlanSource::Model { model_type })
        }
        Err(error) => {
            warn!(scenario = %scenario.id, %error, "staffing model failed, using policy table");
            optimize_staffing(scenario, target)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use outlet_core::{ModelError, SalaryTable};

    /// The reference outlet: 31 staff, 128,100 monthly labor.
    fn outlet() -> ScenarioConfig {
        let mut s = ScenarioConfig::named("s1", "Original Scenario");
        let salaries = SalaryTable::default();
        let pos = |role: Role, n| StaffPosition::for_role(role, salaries.salary(role), n);
        s.foh_positions = vec![
            pos(Role::Waiter, 8),
            pos(Role::Runner, 4),
            pos(Role::Host, 2),
            pos(Role::Cashier, 2),
            pos(Role::Manager, 2),
        ];
        s.boh_positions = vec![
            pos(Role::Chef, 1),
            pos(Role::SousChef, 1),
            pos(Role::LineCook, 4),
            pos(Role::PrepCook, 3),
            pos(Role::KitchenHelper, 2),
            pos(Role::Dishwasher, 2),
        ];
        s
    }

    struct FixedModel(BTreeMap<Role, u32>);

    impl StaffingModel for FixedModel {
        fn optimize(
            &self,
            _features: &StaffingFeatures,
            _constraints: &StaffingConstraints,
        ) -> Result<ModelStaffing, ModelError> {
            Ok(ModelStaffing {
                staffing: self.0.clone(),
                total_staff: self.0.values().sum(),
                labor_cost: Decimal::ZERO,
                model_type: "fixed".into(),
            })
        }
    }

    struct DownModel;

    impl StaffingModel for DownModel {
        fn optimize(
            &self,
            _features: &StaffingFeatures,
            _constraints: &StaffingConstraints,
        ) -> Result<ModelStaffing, ModelError> {
            Err(ModelError::Unavailable("offline".into()))
        }
    }

    #[test]
    fn reference_outlet_baseline() {
        let snap = PlanSnapshot::of(&outlet());
        assert_eq!(snap.total_staff, 31);
        assert_eq!(snap.labor_cost, Decimal::from(128_100));
    }

    #[test]
    fn labor_cost_target_matches_policy() {
        let r = optimize_staffing(&outlet(), OptimizationTarget::LaborCost);
        assert_eq!(r.optimized.id, "s1-optimized");
        assert_eq!(r.optimized.name, "Optimized Scenario (labor_cost)");
        assert_eq!(r.optimized.total_staff, 23);
        assert_eq!(r.optimized.labor_cost, Decimal::from(100_800));
        assert_eq!(r.improvements.staff_reduction, 8);
        assert_eq!(r.improvements.cost_savings, Decimal::from(27_300));
        assert!((r.improvements.cost_savings_percentage - 21.311475).abs() < 1e-4);
        assert_eq!(r.improvements.efficiency_improvement, 5);
        assert_eq!(r.improvements.revenue_improvement, 0);
        assert_eq!(r.source, PlanSource::PolicyTable);
        assert_eq!(r.recommendations.len(), 5);
    }

    #[test]
    fn efficiency_and_revenue_targets() {
        let e = optimize_staffing(&outlet(), OptimizationTarget::Efficiency);
        assert_eq!(e.optimized.total_staff, 25);
        assert_eq!(e.optimized.labor_cost, Decimal::from(108_800));
        assert_eq!(e.improvements.efficiency_improvement, 15);

        let r = optimize_staffing(&outlet(), OptimizationTarget::Revenue);
        assert_eq!(r.optimized.total_staff, 32);
        assert_eq!(r.optimized.labor_cost, Decimal::from(133_100));
        assert_eq!(r.improvements.staff_reduction, -1);
        assert_eq!(r.improvements.staff_reduction_percentage, 0.0);
        assert_eq!(r.improvements.cost_savings_percentage, 0.0);
        assert_eq!(r.improvements.revenue_improvement, 10);
    }

    #[test]
    fn uncatalogued_positions_keep_their_count() {
        let mut s = outlet();
        s.foh_positions.push(StaffPosition {
            id: "sommelier".into(),
            title: "Sommelier".into(),
            salary: Decimal::from(9000),
            department: "foh".into(),
            level: 2,
            count: 1,
        });
        let r = optimize_staffing(&s, OptimizationTarget::LaborCost);
        assert_eq!(r.optimized.total_staff, 24);
        assert_eq!(r.optimized.foh_positions.last().map(|p| p.count), Some(1));
    }

    #[test]
    fn plans_are_deterministic() {
        let a = optimize_staffing(&outlet(), OptimizationTarget::Efficiency);
        let b = optimize_staffing(&outlet(), OptimizationTarget::Efficiency);
        assert_eq!(a, b);
    }

    #[test]
    fn model_counts_override_table() {
        let model = FixedModel([(Role::Waiter, 10)].into_iter().collect());
        let r = optimize_staffing_with_model(
            &outlet(),
            OptimizationTarget::LaborCost,
            &StaffingConstraints::default(),
            &model,
        );
        assert_eq!(
            r.source,
            PlanSource::Model {
                model_type: "fixed".into()
            }
        );
        // labor-cost table (23) with 4 extra waiters
        assert_eq!(r.optimized.total_staff, 27);
        assert_eq!(r.optimized.labor_cost, Decimal::from(100_800 + 4 * 3_500));
    }

    #[test]
    fn failing_model_falls_back_to_table() {
        let r = optimize_staffing_with_model(
            &outlet(),
            OptimizationTarget::Revenue,
            &StaffingConstraints::default(),
            &DownModel,
        );
        assert_eq!(r, optimize_staffing(&outlet(), OptimizationTarget::Revenue));
    }

    #[test]
    fn target_names_round_trip() {
        for t in [
            OptimizationTarget::LaborCost,
            OptimizationTarget::Efficiency,
            OptimizationTarget::Revenue,
        ] {
            assert_eq!(OptimizationTarget::parse(t.as_str()), Some(t));
        }
        assert_eq!(OptimizationTarget::parse("speed"), None);
    }
}
