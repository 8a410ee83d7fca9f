//! Headcount and labor cost from space, service and efficiency parameters.
//!
//! Waiters scale with seated capacity and the efficiency levers, runners
//! follow waiters by ratio, line and prep cooks follow kitchen stations, and
//! every other role is a fixed complement.

use crate::EngineError;
use outlet_core::{
    checked_count, validate_efficiency, validate_service, validate_space, EfficiencyDrivers,
    OperationalHours, Role, SalaryTable, ScenarioConfig, ServiceParameters, SpaceParameters,
    ValidationError,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

const HOSTS: u32 = 2;
const CASHIERS: u32 = 2;
const MANAGERS: u32 = 2;
const CHEFS: u32 = 1;
const SOUS_CHEFS: u32 = 1;
const KITCHEN_HELPERS: u32 = 2;
const DISHWASHERS: u32 = 2;
const PREP_COOKS_PER_STATION: f64 = 0.75;

/// Display order of the staffing tree, per department.
const FOH_TREE: [Role; 5] = [Role::Manager, Role::Host, Role::Waiter, Role::Runner, Role::Cashier];
const BOH_TREE: [Role; 6] = [
    Role::Chef,
    Role::SousChef,
    Role::LineCook,
    Role::PrepCook,
    Role::KitchenHelper,
    Role::Dishwasher,
];

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StaffingParams {
    pub space: SpaceParameters,
    pub service: ServiceParameters,
    pub efficiency: EfficiencyDrivers,
    pub hours: OperationalHours,
    #[serde(default)]
    pub salaries: SalaryTable,
}

impl StaffingParams {
    /// Gather the sub-records a stored scenario must carry for staffing.
    pub fn from_scenario(s: &ScenarioConfig, salaries: SalaryTable) -> Result<Self, EngineError> {
        Ok(Self {
            space: s.space.clone().ok_or(EngineError::MissingField("space"))?,
            service: s.service.clone().ok_or(EngineError::MissingField("service"))?,
            efficiency: s
                .efficiency
                .clone()
                .ok_or(EngineError::MissingField("efficiency"))?,
            hours: s
                .operational_hours
                .clone()
                .ok_or(EngineError::MissingField("operational_hours"))?,
            salaries,
        })
    }
}

/// One node of the leveled staffing tree.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PositionNode {
    pub position: String,
    pub role: Role,
    pub count: u32,
    pub level: u8,
    pub salary: Decimal,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StaffingStructure {
    pub foh: Vec<PositionNode>,
    pub boh: Vec<PositionNode>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StaffingResult {
    pub foh_area: f64,
    pub foh_capacity: u32,
    pub total_capacity: u32,
    pub efficiency_factor: f64,
    /// Relative intensity of the service style. Informational only.
    pub service_style_factor: f64,
    pub foh_staff: BTreeMap<Role, u32>,
    pub boh_staff: BTreeMap<Role, u32>,
    pub total_staff: u32,
    pub foh_labor_cost: Decimal,
    pub boh_labor_cost: Decimal,
    pub labor_cost: Decimal,
    pub structure: StaffingStructure,
    pub recommendations: Vec<String>,
}

/// Size the outlet's team.
///
/// Fails with [`EngineError::DivisionByZero`] when area per cover, covers per
/// waiter or the combined efficiency factor is zero, and with
/// [`ValidationError::OutOfRange`] when a count does not fit a `u32`.
pub fn calculate_staffing(p: &StaffingParams) -> Result<StaffingResult, EngineError> {
    validate_space(&p.space)?;
    validate_service(&p.service)?;
    validate_efficiency(&p.efficiency)?;

    if p.space.area_per_cover == 0.0 {
        return Err(EngineError::DivisionByZero {
            what: "area_per_cover",
        });
    }
    let foh_capacity = p
        .space
        .foh_capacity()
        .ok_or(ValidationError::OutOfRange("foh_capacity"))?;
    let total_capacity = p
        .space
        .total_capacity()
        .ok_or(ValidationError::OutOfRange("total_capacity"))?;

    if p.service.covers_per_waiter == 0.0 {
        return Err(EngineError::DivisionByZero {
            what: "covers_per_waiter",
        });
    }
    let efficiency_factor = p.efficiency.efficiency_factor();
    if efficiency_factor == 0.0 {
        return Err(EngineError::DivisionByZero {
            what: "efficiency_factor",
        });
    }

    // Near-zero factors blow the counts up; they are refused rather than saturated.
    let waiters = checked_count(
        "waiters",
        (f64::from(total_capacity) / p.service.covers_per_waiter / efficiency_factor).ceil(),
    )?;
    let runners = checked_count(
        "runners",
        (f64::from(waiters) * p.service.runner_ratio.fraction()).ceil(),
    )?;
    let stations = p.service.kitchen_stations;
    let prep_cooks = checked_count(
        "prep_cooks",
        (f64::from(stations) * PREP_COOKS_PER_STATION).ceil(),
    )?;

    let foh_staff = BTreeMap::from([
        (Role::Waiter, waiters),
        (Role::Runner, runners),
        (Role::Host, HOSTS),
        (Role::Cashier, CASHIERS),
        (Role::Manager, MANAGERS),
    ]);
    let boh_staff = BTreeMap::from([
        (Role::Chef, CHEFS),
        (Role::SousChef, SOUS_CHEFS),
        (Role::LineCook, stations),
        (Role::PrepCook, prep_cooks),
        (Role::KitchenHelper, KITCHEN_HELPERS),
        (Role::Dishwasher, DISHWASHERS),
    ]);

    let cost = |staff: &BTreeMap<Role, u32>| -> Result<Decimal, ValidationError> {
        staff
            .iter()
            .try_fold(Decimal::ZERO, |acc, (&role, &count)| {
                p.salaries
                    .salary(role)
                    .checked_mul(Decimal::from(count))
                    .and_then(|c| acc.checked_add(c))
            })
            .ok_or(ValidationError::OutOfRange("labor_cost"))
    };
    let foh_labor_cost = cost(&foh_staff)?;
    let boh_labor_cost = cost(&boh_staff)?;
    let labor_cost = foh_labor_cost
        .checked_add(boh_labor_cost)
        .ok_or(ValidationError::OutOfRange("labor_cost"))?;
    let total_staff = foh_staff
        .values()
        .chain(boh_staff.values())
        .try_fold(0u32, |acc, &n| acc.checked_add(n))
        .ok_or(ValidationError::OutOfRange("total_staff"))?;

    let tree = |order: &[Role], staff: &BTreeMap<Role, u32>| -> Vec<PositionNode> {
        order
            .iter()
            .map(|&role| PositionNode {
                position: role.title().to_string(),
                role,
                count: staff.get(&role).copied().unwrap_or(0),
                level: role.level(),
                salary: p.salaries.salary(role),
            })
            .collect()
    };
    let structure = StaffingStructure {
        foh: tree(&FOH_TREE, &foh_staff),
        boh: tree(&BOH_TREE, &boh_staff),
    };
    debug!(
        total_capacity,
        efficiency_factor, waiters, runners, total_staff, "staffing calculated"
    );

    Ok(StaffingResult {
        foh_area: p.space.foh_area(),
        foh_capacity,
        total_capacity,
        efficiency_factor,
        service_style_factor: p.service.service_style.staffing_factor(),
        foh_staff,
        boh_staff,
        total_staff,
        foh_labor_cost,
        boh_labor_cost,
        labor_cost,
        structure,
        recommendations: recommendations(&p.service, &p.efficiency),
    })
}

fn recommendations(service: &ServiceParameters, eff: &EfficiencyDrivers) -> Vec<String> {
    let rules: [(bool, &str); 5] = [
        (
            eff.staff_utilization.value() < 85.0,
            "Increase staff utilization through better scheduling to reduce overall staff requirements",
        ),
        (
            eff.cross_training.value() < 20.0,
            "Implement cross-training program to improve staff flexibility and reduce headcount",
        ),
        (
            eff.tech_impact.value() < 15.0,
            "Invest in technology solutions like POS and KDS to improve operational efficiency",
        ),
        (
            service.covers_per_waiter < 20.0,
            "Consider increasing covers per waiter through service optimization",
        ),
        (
            service.runner_ratio.value() > 50.0,
            "Optimize runner to waiter ratio to reduce FOH labor costs",
        ),
    ];
    rules
        .into_iter()
        .filter(|(applies, _)| *applies)
        .map(|(_, text)| text.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use outlet_core::{Percent, ServiceStyle};
    use proptest::prelude::*;

    fn params() -> StaffingParams {
        StaffingParams {
            space: SpaceParameters {
                total_area: 500.0,
                foh_percentage: Percent(60.0),
                area_per_cover: 1.5,
                external_seating: 20,
            },
            service: ServiceParameters {
                covers_per_waiter: 20.0,
                runner_ratio: Percent(50.0),
                kitchen_stations: 4,
                service_style: ServiceStyle::Premium,
            },
            efficiency: EfficiencyDrivers {
                staff_utilization: Percent(85.0),
                tech_impact: Percent(10.0),
                cross_training: Percent(15.0),
                seasonality_factor: 1.0,
            },
            hours: OperationalHours {
                operating_days: 7,
                daily_hours: 14,
                ramadan_adjustment: false,
            },
            salaries: SalaryTable::default(),
        }
    }

    #[test]
    fn reference_outlet() {
        let r = calculate_staffing(&params()).unwrap();
        assert_eq!(r.foh_capacity, 200);
        assert_eq!(r.total_capacity, 220);
        assert!((r.efficiency_factor - 0.65025).abs() < 1e-12);
        assert_eq!(r.foh_staff[&Role::Waiter], 17);
        assert_eq!(r.foh_staff[&Role::Runner], 9);
        assert_eq!(r.boh_staff[&Role::LineCook], 4);
        assert_eq!(r.boh_staff[&Role::PrepCook], 3);
        assert_eq!(r.total_staff, 17 + 9 + 2 + 2 + 2 + 1 + 1 + 4 + 3 + 2 + 2);
        // 17×3500 + 9×3000 + 2×4000 + 2×3500 + 2×8000
        assert_eq!(r.foh_labor_cost, Decimal::from(117_500));
        // 10000 + 7000 + 4×4500 + 3×3500 + 2×3000 + 2×2800
        assert_eq!(r.boh_labor_cost, Decimal::from(57_100));
        assert_eq!(r.labor_cost, Decimal::from(174_600));
        assert_eq!(r.service_style_factor, 2.0);
    }

    #[test]
    fn structure_follows_hierarchy() {
        let r = calculate_staffing(&params()).unwrap();
        let titles: Vec<&str> = r.structure.foh.iter().map(|n| n.position.as_str()).collect();
        assert_eq!(
            titles,
            ["Restaurant Manager", "Host/Hostess", "Waiter", "Runner", "Cashier"]
        );
        assert_eq!(r.structure.boh[0].position, "Executive Chef");
        assert_eq!(r.structure.boh[0].level, 0);
        assert_eq!(r.structure.foh[3].level, 3);
    }

    #[test]
    fn recommendations_fire_independently() {
        let r = calculate_staffing(&params()).unwrap();
        // cross-training 15 < 20 and tech 10 < 15; utilization 85 is not < 85
        assert_eq!(r.recommendations.len(), 2);

        let mut p = params();
        p.efficiency.staff_utilization = Percent(95.0);
        p.efficiency.cross_training = Percent(30.0);
        p.efficiency.tech_impact = Percent(20.0);
        assert!(calculate_staffing(&p).unwrap().recommendations.is_empty());

        p.efficiency.staff_utilization = Percent(70.0);
        p.efficiency.cross_training = Percent(10.0);
        p.efficiency.tech_impact = Percent(5.0);
        p.service.covers_per_waiter = 12.0;
        p.service.runner_ratio = Percent(60.0);
        assert_eq!(calculate_staffing(&p).unwrap().recommendations.len(), 5);
    }

    #[test]
    fn zero_denominators_fail() {
        let mut p = params();
        p.service.covers_per_waiter = 0.0;
        assert_eq!(
            calculate_staffing(&p).unwrap_err(),
            EngineError::DivisionByZero {
                what: "covers_per_waiter"
            }
        );

        let mut p = params();
        p.efficiency.seasonality_factor = 0.0;
        assert_eq!(
            calculate_staffing(&p).unwrap_err(),
            EngineError::DivisionByZero {
                what: "efficiency_factor"
            }
        );

        let mut p = params();
        p.space.area_per_cover = 0.0;
        assert!(matches!(
            calculate_staffing(&p),
            Err(EngineError::DivisionByZero { what: "area_per_cover" })
        ));
    }

    #[test]
    fn near_zero_factors_are_out_of_range() {
        let mut p = params();
        p.efficiency.seasonality_factor = 1e-9;
        assert_eq!(
            calculate_staffing(&p).unwrap_err(),
            EngineError::Validation(ValidationError::OutOfRange("waiters"))
        );

        let mut p = params();
        p.service.covers_per_waiter = 1e-300;
        assert!(matches!(
            calculate_staffing(&p),
            Err(EngineError::Validation(ValidationError::OutOfRange(_)))
        ));
    }

    #[test]
    fn oversized_space_is_out_of_range() {
        let mut p = params();
        p.space.total_area = 1e12;
        assert_eq!(
            calculate_staffing(&p).unwrap_err(),
            EngineError::Validation(ValidationError::OutOfRange("foh_capacity"))
        );

        let mut p = params();
        p.space.external_seating = u32::MAX;
        assert_eq!(
            calculate_staffing(&p).unwrap_err(),
            EngineError::Validation(ValidationError::OutOfRange("total_capacity"))
        );
    }

    #[test]
    fn huge_salaries_do_not_overflow_cost() {
        let mut p = params();
        p.salaries = SalaryTable::default().with(Role::Waiter, Decimal::MAX);
        assert_eq!(
            calculate_staffing(&p).unwrap_err(),
            EngineError::Validation(ValidationError::OutOfRange("labor_cost"))
        );
    }

    #[test]
    fn salary_overrides_flow_into_cost() {
        let mut p = params();
        p.salaries = SalaryTable::default().with(Role::Waiter, Decimal::from(4000));
        let r = calculate_staffing(&p).unwrap();
        assert_eq!(r.foh_labor_cost, Decimal::from(117_500 + 17 * 500));
    }

    proptest! {
        #[test]
        fn totals_are_consistent(area in 50.0f64..5000.0,
                                 foh in 10.0f64..90.0,
                                 apc in 0.8f64..4.0,
                                 ext in 0u32..100,
                                 cpw in 5.0f64..40.0,
                                 runner in 0.0f64..100.0,
                                 stations in 1u32..12,
                                 util in 40.0f64..100.0,
                                 tech in 0.0f64..50.0,
                                 cross in 0.0f64..50.0) {
            let mut p = params();
            p.space.total_area = area;
            p.space.foh_percentage = Percent(foh);
            p.space.area_per_cover = apc;
            p.space.external_seating = ext;
            p.service.covers_per_waiter = cpw;
            p.service.runner_ratio = Percent(runner);
            p.service.kitchen_stations = stations;
            p.efficiency.staff_utilization = Percent(util);
            p.efficiency.tech_impact = Percent(tech);
            p.efficiency.cross_training = Percent(cross);
            let r = calculate_staffing(&p).unwrap();
            let counted: u32 = r.foh_staff.values().chain(r.boh_staff.values()).sum();
            prop_assert_eq!(r.total_staff, counted);
            let expected: Decimal = r
                .foh_staff
                .iter()
                .chain(&r.boh_staff)
                .map(|(&role, &n)| SalaryTable::standard(role) * Decimal::from(n))
                .sum();
            prop_assert_eq!(r.labor_cost, expected);
            let tree_total: u32 = r.structure.foh.iter().chain(&r.structure.boh).map(|n| n.count).sum();
            prop_assert_eq!(tree_total, r.total_staff);
        }
    }
}
