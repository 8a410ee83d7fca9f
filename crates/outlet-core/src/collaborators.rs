//! Interfaces to the collaborators the engine consumes but does not own:
//! scenario storage and trained-model inference.

use crate::{Role, ScenarioConfig, ServiceStyle};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Read access to stored scenarios.
pub trait ScenarioRepository {
    /// Fetch a scenario by id, or `None` when absent.
    fn get(&self, id: &str) -> Option<ScenarioConfig>;
}

/// Failures raised by model collaborators. The engine recovers from these
/// locally; they never reach a caller of the optimizer.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum ModelError {
    #[error("model has not been trained")]
    NotTrained,
    #[error("model service unavailable: {0}")]
    Unavailable(String),
    #[error("invalid feature {0}")]
    InvalidFeature(&'static str),
    #[error("model output {0} is out of range")]
    OutOfRange(&'static str),
}

/// Inputs to a covers forecast for a single day.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DemandFeatures {
    /// 0 = Monday.
    pub day_of_week: u8,
    pub is_weekend: bool,
    pub is_holiday: bool,
    pub is_ramadan: bool,
    /// Degrees Celsius.
    pub temperature: f64,
    /// Millimetres.
    pub precipitation: f64,
    pub special_event: Option<String>,
    pub marketing_campaign: bool,
    pub menu_change: bool,
    pub competitor_promotion: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DemandPrediction {
    pub predicted_covers: u32,
    pub model_type: String,
}

/// Covers forecasting service.
pub trait DemandModel {
    fn predict(&self, features: &DemandFeatures) -> Result<DemandPrediction, ModelError>;
}

/// Scenario features fed to a staffing model.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StaffingFeatures {
    pub covers: u32,
    pub service_style: ServiceStyle,
    pub area_per_cover: f64,
    pub avg_check: f64,
    pub dwelling_time: u32,
    pub peak_factor: f64,
    pub staff_utilization: f64,
    pub tech_impact: f64,
    pub cross_training: f64,
}

impl Default for StaffingFeatures {
    fn default() -> Self {
        Self {
            covers: 250,
            service_style: ServiceStyle::Casual,
            area_per_cover: 1.67,
            avg_check: 120.0,
            dwelling_time: 75,
            peak_factor: 1.5,
            staff_utilization: 85.0,
            tech_impact: 10.0,
            cross_training: 15.0,
        }
    }
}

impl StaffingFeatures {
    /// Extract features from a scenario, filling gaps with outlet averages.
    pub fn from_scenario(s: &ScenarioConfig) -> Self {
        let mut f = StaffingFeatures::default();
        if let Some(d) = &s.revenue_drivers {
            if let Some(covers) = d.daily_covers {
                f.covers = covers;
            }
            f.avg_check = d.avg_spending;
            f.dwelling_time = d.dwelling_time;
            f.peak_factor = d.peak_factor;
        }
        if let Some(service) = &s.service {
            f.service_style = service.service_style;
        }
        if let Some(space) = &s.space {
            f.area_per_cover = space.area_per_cover;
        }
        if let Some(e) = &s.efficiency {
            f.staff_utilization = e.staff_utilization.value();
            f.tech_impact = e.tech_impact.value();
            f.cross_training = e.cross_training.value();
        }
        f
    }
}

/// Bounds a staffing model must respect.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StaffingConstraints {
    pub max_total_staff: Option<u32>,
    pub min_by_role: BTreeMap<Role, u32>,
    pub max_by_role: BTreeMap<Role, u32>,
}

impl StaffingConstraints {
    pub fn is_empty(&self) -> bool {
        self.max_total_staff.is_none() && self.min_by_role.is_empty() && self.max_by_role.is_empty()
    }
}

/// A staffing model's answer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ModelStaffing {
    pub staffing: BTreeMap<Role, u32>,
    pub total_staff: u32,
    pub labor_cost: Decimal,
    pub model_type: String,
}

/// Staffing optimization service.
pub trait StaffingModel {
    fn optimize(
        &self,
        features: &StaffingFeatures,
        constraints: &StaffingConstraints,
    ) -> Result<ModelStaffing, ModelError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{EfficiencyDrivers, Percent, RevenueDrivers};

    #[test]
    fn features_default_when_scenario_is_bare() {
        let s = ScenarioConfig::named("x", "Bare");
        assert_eq!(StaffingFeatures::from_scenario(&s), StaffingFeatures::default());
    }

    #[test]
    fn features_pick_up_scenario_values() {
        let mut s = ScenarioConfig::named("x", "Full");
        s.revenue_drivers = Some(RevenueDrivers {
            avg_spending: 95.0,
            dwelling_time: 60,
            table_turn_time: 10,
            peak_factor: 1.2,
            table_turns: None,
            daily_covers: Some(400),
            monthly_revenue: None,
        });
        s.efficiency = Some(EfficiencyDrivers {
            staff_utilization: Percent(90.0),
            tech_impact: Percent(20.0),
            cross_training: Percent(25.0),
            seasonality_factor: 1.0,
        });
        let f = StaffingFeatures::from_scenario(&s);
        assert_eq!(f.covers, 400);
        assert_eq!(f.avg_check, 95.0);
        assert_eq!(f.staff_utilization, 90.0);
        assert_eq!(f.service_style, ServiceStyle::Casual);
    }

    #[test]
    fn constraints_from_yaml() {
        let c: StaffingConstraints =
            serde_yaml::from_str("max_total_staff: 20\nmin_by_role:\n  waiter: 4\n").unwrap();
        assert_eq!(c.max_total_staff, Some(20));
        assert_eq!(c.min_by_role.get(&Role::Waiter), Some(&4));
        assert!(!c.is_empty());
        assert!(StaffingConstraints::default().is_empty());
    }
}
