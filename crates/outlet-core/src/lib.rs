#![deny(warnings)]

//! Core domain models and invariants for outlet staffing scenarios.
//!
//! This crate defines the serializable scenario configuration shared by the
//! calculators, the unit newtypes used at the input boundary, the collaborator
//! interfaces the engine consumes, and validation helpers that guarantee basic
//! invariants before any arithmetic runs.

pub mod collaborators;
pub mod config;
pub mod units;

pub use collaborators::*;
pub use config::{EngineConfig, SalaryTable};
pub use units::{lenient_f64, Percent};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Front-of-house or back-of-house.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Department {
    /// Front of house: guest-facing roles.
    Foh,
    /// Back of house: kitchen roles.
    Boh,
}

/// The fixed catalogue of positions the calculators know how to size.
///
/// Declaration order is the reporting order, so maps keyed by `Role` iterate
/// waiters first and dishwashers last.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Role {
    Waiter,
    Runner,
    Host,
    Cashier,
    Manager,
    Chef,
    SousChef,
    LineCook,
    PrepCook,
    KitchenHelper,
    Dishwasher,
}

impl Role {
    /// Every role, FOH first.
    pub const ALL: [Role; 11] = [
        Role::Waiter,
        Role::Runner,
        Role::Host,
        Role::Cashier,
        Role::Manager,
        Role::Chef,
        Role::SousChef,
        Role::LineCook,
        Role::PrepCook,
        Role::KitchenHelper,
        Role::Dishwasher,
    ];

    /// Stable position id used in scenario files.
    pub fn id(self) -> &'static str {
        match self {
            Role::Waiter => "waiter",
            Role::Runner => "runner",
            Role::Host => "host",
            Role::Cashier => "cashier",
            Role::Manager => "manager",
            Role::Chef => "chef",
            Role::SousChef => "sous-chef",
            Role::LineCook => "line-cook",
            Role::PrepCook => "prep-cook",
            Role::KitchenHelper => "kitchen-helper",
            Role::Dishwasher => "dishwasher",
        }
    }

    /// Look a role up by its position id.
    pub fn from_id(id: &str) -> Option<Role> {
        Role::ALL.into_iter().find(|r| r.id() == id)
    }

    /// Display title used in staffing trees.
    pub fn title(self) -> &'static str {
        match self {
            Role::Waiter => "Waiter",
            Role::Runner => "Runner",
            Role::Host => "Host/Hostess",
            Role::Cashier => "Cashier",
            Role::Manager => "Restaurant Manager",
            Role::Chef => "Executive Chef",
            Role::SousChef => "Sous Chef",
            Role::LineCook => "Line Cook",
            Role::PrepCook => "Prep Cook",
            Role::KitchenHelper => "Kitchen Helper",
            Role::Dishwasher => "Dishwasher",
        }
    }

    pub fn department(self) -> Department {
        match self {
            Role::Waiter | Role::Runner | Role::Host | Role::Cashier | Role::Manager => {
                Department::Foh
            }
            _ => Department::Boh,
        }
    }

    /// Depth in the reporting hierarchy (0 = head of department).
    pub fn level(self) -> u8 {
        match self {
            Role::Manager | Role::Chef => 0,
            Role::Host | Role::SousChef => 1,
            Role::Waiter | Role::Cashier | Role::LineCook => 2,
            Role::Runner | Role::PrepCook | Role::KitchenHelper | Role::Dishwasher => 3,
        }
    }
}

/// One staffed position within a scenario.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StaffPosition {
    /// Position id; catalogue ids (see [`Role::id`]) are recognised by the optimizer.
    pub id: String,
    pub title: String,
    /// Monthly salary per head (>= 0).
    pub salary: Decimal,
    #[serde(default)]
    pub department: String,
    #[serde(default)]
    pub level: u8,
    /// Headcount (>= 0).
    pub count: u32,
}

impl StaffPosition {
    /// Build a position for a catalogue role.
    pub fn for_role(role: Role, salary: Decimal, count: u32) -> Self {
        Self {
            id: role.id().to_string(),
            title: role.title().to_string(),
            salary,
            department: match role.department() {
                Department::Foh => "foh".to_string(),
                Department::Boh => "boh".to_string(),
            },
            level: role.level(),
            count,
        }
    }

    pub fn role(&self) -> Option<Role> {
        Role::from_id(&self.id)
    }

    /// count × salary.
    pub fn labor_cost(&self) -> Decimal {
        self.salary * Decimal::from(self.count)
    }
}

/// Total headcount over a position list.
pub fn headcount(positions: &[StaffPosition]) -> u32 {
    positions.iter().map(|p| p.count).sum()
}

/// Σ(count × salary) over a position list.
pub fn labor_cost(positions: &[StaffPosition]) -> Decimal {
    positions.iter().map(StaffPosition::labor_cost).sum()
}

/// Floor space and seating.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpaceParameters {
    /// Total floor area in m².
    pub total_area: f64,
    /// Share of the floor given to guests.
    pub foh_percentage: Percent,
    /// m² per seated guest (> 0).
    #[serde(deserialize_with = "lenient_f64")]
    pub area_per_cover: f64,
    #[serde(default)]
    pub external_seating: u32,
}

impl SpaceParameters {
    pub fn foh_area(&self) -> f64 {
        self.total_area * self.foh_percentage.fraction()
    }

    /// Indoor covers, floored. Returns `None` when `area_per_cover` is not
    /// positive or the capacity does not fit a `u32`.
    pub fn foh_capacity(&self) -> Option<u32> {
        if self.area_per_cover <= 0.0 {
            return None;
        }
        checked_count("foh_capacity", (self.foh_area() / self.area_per_cover).floor()).ok()
    }

    pub fn total_capacity(&self) -> Option<u32> {
        self.foh_capacity()?.checked_add(self.external_seating)
    }
}

/// Service model of the outlet.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ServiceStyle {
    FastCasual,
    #[default]
    Casual,
    Premium,
    FineDining,
}

impl ServiceStyle {
    /// Relative staffing intensity of the style.
    ///
    /// Reported alongside staffing results but not applied to any headcount.
    pub fn staffing_factor(self) -> f64 {
        match self {
            ServiceStyle::Premium => 2.0,
            ServiceStyle::Casual => 1.5,
            ServiceStyle::FastCasual | ServiceStyle::FineDining => 1.0,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ServiceStyle::FastCasual => "fast-casual",
            ServiceStyle::Casual => "casual",
            ServiceStyle::Premium => "premium",
            ServiceStyle::FineDining => "fine-dining",
        }
    }
}

/// Service ratios.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ServiceParameters {
    /// Guests one waiter can look after.
    #[serde(deserialize_with = "lenient_f64")]
    pub covers_per_waiter: f64,
    /// Runners per waiter, as a percentage.
    pub runner_ratio: Percent,
    /// Number of cooking stations (>= 1).
    pub kitchen_stations: u32,
    #[serde(default)]
    pub service_style: ServiceStyle,
}

/// Demand and spend drivers.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RevenueDrivers {
    /// Average spend per cover.
    pub avg_spending: f64,
    /// Minutes a party stays.
    pub dwelling_time: u32,
    /// Minutes to reset a table.
    pub table_turn_time: u32,
    pub peak_factor: f64,
    #[serde(default)]
    pub table_turns: Option<f64>,
    #[serde(default)]
    pub daily_covers: Option<u32>,
    #[serde(default)]
    pub monthly_revenue: Option<f64>,
}

impl RevenueDrivers {
    /// avg spending × daily covers × 30, when covers are known.
    pub fn implied_monthly_revenue(&self) -> Option<f64> {
        self.daily_covers
            .map(|covers| self.avg_spending * f64::from(covers) * 30.0)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OperationalHours {
    pub operating_days: u8,
    pub daily_hours: u8,
    #[serde(default)]
    pub ramadan_adjustment: bool,
}

/// Efficiency levers applied to waiter sizing.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EfficiencyDrivers {
    pub staff_utilization: Percent,
    pub tech_impact: Percent,
    pub cross_training: Percent,
    /// Multiplicative demand modifier (1.0 = baseline).
    pub seasonality_factor: f64,
}

impl EfficiencyDrivers {
    /// utilization × (1 − tech) × (1 − cross-training) × seasonality.
    pub fn efficiency_factor(&self) -> f64 {
        self.staff_utilization.fraction()
            * self.tech_impact.complement()
            * self.cross_training.complement()
            * self.seasonality_factor
    }
}

/// Cost-of-goods ratios used by what-if snapshots.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CostRatios {
    pub food_cost: Percent,
    pub beverage_cost: Percent,
}

impl Default for CostRatios {
    fn default() -> Self {
        Self {
            food_cost: Percent(28.0),
            beverage_cost: Percent(22.0),
        }
    }
}

/// Headcount and labor for one department (or the whole outlet).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DepartmentTotals {
    pub staff: u32,
    pub labor_cost: Decimal,
}

/// Cached aggregate snapshot.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Totals {
    pub foh: DepartmentTotals,
    pub boh: DepartmentTotals,
    pub grand: DepartmentTotals,
}

/// A complete outlet scenario as stored by the repository.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScenarioConfig {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub outlet: Option<String>,
    #[serde(default)]
    pub foh_positions: Vec<StaffPosition>,
    #[serde(default)]
    pub boh_positions: Vec<StaffPosition>,
    #[serde(default)]
    pub space: Option<SpaceParameters>,
    #[serde(default)]
    pub service: Option<ServiceParameters>,
    #[serde(default)]
    pub revenue_drivers: Option<RevenueDrivers>,
    #[serde(default)]
    pub operational_hours: Option<OperationalHours>,
    #[serde(default)]
    pub efficiency: Option<EfficiencyDrivers>,
    #[serde(default)]
    pub cost_ratios: Option<CostRatios>,
    #[serde(default)]
    pub totals: Option<Totals>,
}

impl ScenarioConfig {
    /// A scenario with only identity set.
    pub fn named(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            brand: None,
            outlet: None,
            foh_positions: vec![],
            boh_positions: vec![],
            space: None,
            service: None,
            revenue_drivers: None,
            operational_hours: None,
            efficiency: None,
            cost_ratios: None,
            totals: None,
        }
    }

    pub fn total_staff(&self) -> u32 {
        headcount(&self.foh_positions) + headcount(&self.boh_positions)
    }

    pub fn total_labor_cost(&self) -> Decimal {
        labor_cost(&self.foh_positions) + labor_cost(&self.boh_positions)
    }

    /// Recompute the aggregate snapshot from the position lists.
    pub fn totals(&self) -> Totals {
        let foh = DepartmentTotals {
            staff: headcount(&self.foh_positions),
            labor_cost: labor_cost(&self.foh_positions),
        };
        let boh = DepartmentTotals {
            staff: headcount(&self.boh_positions),
            labor_cost: labor_cost(&self.boh_positions),
        };
        let grand = DepartmentTotals {
            staff: foh.staff + boh.staff,
            labor_cost: foh.labor_cost + boh.labor_cost,
        };
        Totals { foh, boh, grand }
    }

    /// Explicit monthly revenue from the revenue drivers, if set.
    pub fn estimated_monthly_revenue(&self) -> Option<f64> {
        self.revenue_drivers.as_ref().and_then(|d| d.monthly_revenue)
    }
}

/// Validation errors for domain invariants.
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    /// Scenario name must not be blank.
    #[error("scenario name must not be empty")]
    EmptyName,
    /// Numeric field must be finite.
    #[error("non-finite value in {0}")]
    NonFinite(&'static str),
    /// Field must be >= 0.
    #[error("{0} must not be negative")]
    Negative(&'static str),
    /// Percentage outside [0, 100].
    #[error("{field} must be within [0, 100], got {value}")]
    PercentOutOfRange { field: &'static str, value: f64 },
    /// A kitchen needs at least one station.
    #[error("kitchen_stations must be >= 1")]
    NoKitchenStations,
    /// Required sub-record missing from a scenario.
    #[error("missing {0}")]
    Missing(&'static str),
    /// A derived count or amount does not fit its integer type.
    #[error("{0} is out of range")]
    OutOfRange(&'static str),
}

/// Whole count from an already rounded float. Fails when the value is not
/// finite, is negative or exceeds `u32::MAX`.
pub fn checked_count(field: &'static str, v: f64) -> Result<u32, ValidationError> {
    check_non_negative(field, v)?;
    if v > f64::from(u32::MAX) {
        return Err(ValidationError::OutOfRange(field));
    }
    Ok(v as u32)
}

fn check_non_negative(field: &'static str, v: f64) -> Result<(), ValidationError> {
    if !v.is_finite() {
        return Err(ValidationError::NonFinite(field));
    }
    if v < 0.0 {
        return Err(ValidationError::Negative(field));
    }
    Ok(())
}

/// Validate a percentage field.
pub fn validate_percent(field: &'static str, p: Percent) -> Result<(), ValidationError> {
    if !p.is_valid() {
        return Err(ValidationError::PercentOutOfRange {
            field,
            value: p.value(),
        });
    }
    Ok(())
}

/// Validate space parameters. A zero `area_per_cover` passes here and is
/// reported by the staffing calculator as a division hazard.
pub fn validate_space(s: &SpaceParameters) -> Result<(), ValidationError> {
    check_non_negative("total_area", s.total_area)?;
    validate_percent("foh_percentage", s.foh_percentage)?;
    check_non_negative("area_per_cover", s.area_per_cover)
}

/// Validate service parameters.
pub fn validate_service(s: &ServiceParameters) -> Result<(), ValidationError> {
    check_non_negative("covers_per_waiter", s.covers_per_waiter)?;
    if !s.runner_ratio.value().is_finite() {
        return Err(ValidationError::NonFinite("runner_ratio"));
    }
    if s.runner_ratio.value() < 0.0 {
        return Err(ValidationError::Negative("runner_ratio"));
    }
    if s.kitchen_stations == 0 {
        return Err(ValidationError::NoKitchenStations);
    }
    Ok(())
}

/// Validate efficiency drivers.
pub fn validate_efficiency(e: &EfficiencyDrivers) -> Result<(), ValidationError> {
    validate_percent("staff_utilization", e.staff_utilization)?;
    validate_percent("tech_impact", e.tech_impact)?;
    validate_percent("cross_training", e.cross_training)?;
    check_non_negative("seasonality_factor", e.seasonality_factor)
}

/// Validate revenue drivers.
pub fn validate_revenue_drivers(d: &RevenueDrivers) -> Result<(), ValidationError> {
    check_non_negative("avg_spending", d.avg_spending)?;
    check_non_negative("peak_factor", d.peak_factor)?;
    if let Some(t) = d.table_turns {
        check_non_negative("table_turns", t)?;
    }
    if let Some(m) = d.monthly_revenue {
        check_non_negative("monthly_revenue", m)?;
    }
    Ok(())
}

/// Validate a single staff position.
pub fn validate_position(p: &StaffPosition) -> Result<(), ValidationError> {
    if p.salary < Decimal::ZERO {
        return Err(ValidationError::Negative("salary"));
    }
    Ok(())
}

/// Validate a scenario and every sub-record it carries.
pub fn validate_scenario(s: &ScenarioConfig) -> Result<(), ValidationError> {
    if s.name.trim().is_empty() {
        return Err(ValidationError::EmptyName);
    }
    for p in s.foh_positions.iter().chain(&s.boh_positions) {
        validate_position(p)?;
    }
    if let Some(space) = &s.space {
        validate_space(space)?;
    }
    if let Some(service) = &s.service {
        validate_service(service)?;
    }
    if let Some(eff) = &s.efficiency {
        validate_efficiency(eff)?;
    }
    if let Some(d) = &s.revenue_drivers {
        validate_revenue_drivers(d)?;
    }
    if let Some(c) = &s.cost_ratios {
        validate_percent("food_cost", c.food_cost)?;
        validate_percent("beverage_cost", c.beverage_cost)?;
    }
    Ok(())
}
