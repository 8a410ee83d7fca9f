//! Ratio-based staffing model.
//!
//! Peak load is the number of covers seated at once during the rush:
//! `covers × peak_factor × dwelling_time / service_minutes`. Floor and
//! kitchen roles scale with that load, discounted by the efficiency levers;
//! supervisory roles are a fixed complement.

use outlet_core::{
    checked_count, ModelError, ModelStaffing, Role, SalaryTable, ServiceStyle,
    StaffingConstraints, StaffingFeatures, StaffingModel,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RatioStaffingModel {
    /// Minutes of service per day the daily covers are spread over.
    pub service_minutes: f64,
    /// Concurrent covers one line cook handles.
    pub covers_per_line_cook: f64,
    /// Daily covers per dishwasher.
    pub covers_per_dishwasher: f64,
    pub salaries: SalaryTable,
}

impl Default for RatioStaffingModel {
    fn default() -> Self {
        Self {
            service_minutes: 720.0,
            covers_per_line_cook: 10.0,
            covers_per_dishwasher: 150.0,
            salaries: SalaryTable::default(),
        }
    }
}

/// Concurrent covers one waiter handles for a service style.
fn covers_per_waiter(style: ServiceStyle) -> f64 {
    match style {
        ServiceStyle::FastCasual => 24.0,
        ServiceStyle::Casual => 16.0,
        ServiceStyle::Premium => 12.0,
        ServiceStyle::FineDining => 8.0,
    }
}

fn efficiency(f: &StaffingFeatures) -> f64 {
    (f.staff_utilization / 100.0) * (1.0 - f.tech_impact / 100.0) * (1.0 - f.cross_training / 100.0)
}

/// Headcount from a rounded float, at least one.
fn headcount(role: &'static str, v: f64) -> Result<u32, ModelError> {
    checked_count(role, v)
        .map(|n| n.max(1))
        .map_err(|_| ModelError::OutOfRange(role))
}

fn check(name: &'static str, v: f64) -> Result<f64, ModelError> {
    if v.is_finite() && v >= 0.0 {
        Ok(v)
    } else {
        Err(ModelError::InvalidFeature(name))
    }
}

impl RatioStaffingModel {
    pub const MODEL_TYPE: &'static str = "ratio";

    pub fn with_salaries(salaries: SalaryTable) -> Self {
        Self {
            salaries,
            ..Self::default()
        }
    }

    /// Unconstrained headcount per role.
    pub fn predict(&self, f: &StaffingFeatures) -> Result<BTreeMap<Role, u32>, ModelError> {
        let peak_factor = check("peak_factor", f.peak_factor)?;
        let eff = check("efficiency", efficiency(f))?;
        if eff == 0.0 {
            return Err(ModelError::InvalidFeature("efficiency"));
        }
        if self.service_minutes.is_nan() || self.service_minutes <= 0.0 {
            return Err(ModelError::InvalidFeature("service_minutes"));
        }

        let covers = f64::from(f.covers);
        let peak_load =
            covers * peak_factor * f64::from(f.dwelling_time) / self.service_minutes;
        let waiters = (peak_load / covers_per_waiter(f.service_style) / eff).ceil();
        let line_cooks = (peak_load / self.covers_per_line_cook / eff).ceil();
        let hosts = if f.covers >= 200 { 2 } else { 1 };

        let counts = [
            (Role::Waiter, headcount("waiters", waiters)?),
            (Role::Runner, headcount("runners", (waiters * 0.5).ceil())?),
            (Role::Host, hosts),
            (Role::Cashier, 1),
            (Role::Manager, 2),
            (Role::Chef, 1),
            (Role::SousChef, 1),
            (Role::LineCook, headcount("line_cooks", line_cooks)?),
            (Role::PrepCook, headcount("prep_cooks", (line_cooks * 0.75).ceil())?),
            (Role::KitchenHelper, 2),
            (
                Role::Dishwasher,
                headcount("dishwashers", (covers / self.covers_per_dishwasher).ceil())?,
            ),
        ];
        Ok(counts.into_iter().collect())
    }

    fn labor_cost(&self, counts: &BTreeMap<Role, u32>) -> Result<Decimal, ModelError> {
        counts
            .iter()
            .try_fold(Decimal::ZERO, |acc, (role, n)| {
                self.salaries
                    .salary(*role)
                    .checked_mul(Decimal::from(*n))
                    .and_then(|c| acc.checked_add(c))
            })
            .ok_or(ModelError::OutOfRange("labor_cost"))
    }
}

/// Apply constraints in order: proportional scale-down to
/// `max_total_staff` (each role keeps at least one), then per-role minimums,
/// then per-role maximums. Per-role bounds only touch roles already present.
pub fn apply_constraints(counts: &mut BTreeMap<Role, u32>, c: &StaffingConstraints) {
    if let Some(max_total) = c.max_total_staff {
        let total: u64 = counts.values().map(|&n| u64::from(n)).sum();
        if total > u64::from(max_total) {
            let scale = f64::from(max_total) / total as f64;
            for n in counts.values_mut() {
                *n = ((f64::from(*n) * scale).round() as u32).max(1);
            }
        }
    }
    for (role, min) in &c.min_by_role {
        if let Some(n) = counts.get_mut(role) {
            *n = (*n).max(*min);
        }
    }
    for (role, max) in &c.max_by_role {
        if let Some(n) = counts.get_mut(role) {
            *n = (*n).min(*max);
        }
    }
}

impl StaffingModel for RatioStaffingModel {
    fn optimize(
        &self,
        features: &StaffingFeatures,
        constraints: &StaffingConstraints,
    ) -> Result<ModelStaffing, ModelError> {
        let mut staffing = self.predict(features)?;
        apply_constraints(&mut staffing, constraints);
        let total_staff = staffing
            .values()
            .try_fold(0u32, |acc, &n| acc.checked_add(n))
            .ok_or(ModelError::OutOfRange("total_staff"))?;
        let labor_cost = self.labor_cost(&staffing)?;
        debug!(total_staff, %labor_cost, "ratio staffing model answered");
        Ok(ModelStaffing {
            staffing,
            total_staff,
            labor_cost,
            model_type: Self::MODEL_TYPE.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn default_features_give_a_small_team() {
        let counts = RatioStaffingModel::default()
            .predict(&StaffingFeatures::default())
            .unwrap();
        // 250 × 1.5 × 75 / 720 ≈ 39.06 seated; efficiency 0.65025
        assert_eq!(counts[&Role::Waiter], 4);
        assert_eq!(counts[&Role::Runner], 2);
        assert_eq!(counts[&Role::LineCook], 7);
        assert_eq!(counts[&Role::PrepCook], 6);
        assert_eq!(counts[&Role::Dishwasher], 2);
        assert_eq!(counts[&Role::Host], 2);
        assert_eq!(counts.len(), Role::ALL.len());
    }

    #[test]
    fn finer_service_needs_more_waiters() {
        let m = RatioStaffingModel::default();
        let casual = m.predict(&StaffingFeatures::default()).unwrap();
        let fine = m
            .predict(&StaffingFeatures {
                service_style: ServiceStyle::FineDining,
                ..StaffingFeatures::default()
            })
            .unwrap();
        assert!(fine[&Role::Waiter] > casual[&Role::Waiter]);
    }

    #[test]
    fn optimize_reports_totals_and_cost() {
        let m = RatioStaffingModel::default();
        let r = m
            .optimize(&StaffingFeatures::default(), &StaffingConstraints::default())
            .unwrap();
        assert_eq!(r.model_type, "ratio");
        assert_eq!(r.total_staff, r.staffing.values().sum::<u32>());
        let expected: Decimal = r
            .staffing
            .iter()
            .map(|(role, n)| SalaryTable::standard(*role) * Decimal::from(*n))
            .sum();
        assert_eq!(r.labor_cost, expected);
    }

    #[test]
    fn constraints_apply_in_order() {
        let mut counts: BTreeMap<Role, u32> =
            [(Role::Waiter, 10), (Role::Runner, 6), (Role::Chef, 1), (Role::Dishwasher, 3)]
                .into_iter()
                .collect();
        let c = StaffingConstraints {
            max_total_staff: Some(10),
            min_by_role: [(Role::Dishwasher, 3), (Role::Host, 2)].into_iter().collect(),
            max_by_role: [(Role::Waiter, 4)].into_iter().collect(),
        };
        apply_constraints(&mut counts, &c);
        // scale 0.5 gives 5, 3, 1, 2; then the minimum and maximum apply
        assert_eq!(counts[&Role::Waiter], 4);
        assert_eq!(counts[&Role::Runner], 3);
        assert_eq!(counts[&Role::Chef], 1);
        assert_eq!(counts[&Role::Dishwasher], 3);
        assert!(!counts.contains_key(&Role::Host));
    }

    #[test]
    fn invalid_features_are_rejected() {
        let m = RatioStaffingModel::default();
        let f = StaffingFeatures {
            staff_utilization: 0.0,
            ..StaffingFeatures::default()
        };
        assert_eq!(
            m.predict(&f).unwrap_err(),
            ModelError::InvalidFeature("efficiency")
        );
        let f = StaffingFeatures {
            peak_factor: f64::NAN,
            ..StaffingFeatures::default()
        };
        assert_eq!(
            m.predict(&f).unwrap_err(),
            ModelError::InvalidFeature("peak_factor")
        );
    }

    #[test]
    fn near_zero_efficiency_is_out_of_range() {
        let f = StaffingFeatures {
            staff_utilization: 1e-12,
            ..StaffingFeatures::default()
        };
        assert_eq!(
            RatioStaffingModel::default().predict(&f).unwrap_err(),
            ModelError::OutOfRange("waiters")
        );
    }

    #[test]
    fn large_counts_scale_down_without_overflow() {
        let mut counts: BTreeMap<Role, u32> =
            [(Role::Waiter, u32::MAX), (Role::LineCook, u32::MAX)]
                .into_iter()
                .collect();
        let c = StaffingConstraints {
            max_total_staff: Some(10),
            ..StaffingConstraints::default()
        };
        apply_constraints(&mut counts, &c);
        assert_eq!(counts[&Role::Waiter], 5);
        assert_eq!(counts[&Role::LineCook], 5);
    }

    proptest! {
        #[test]
        fn scale_down_keeps_every_role(counts in proptest::collection::vec(0u32..40, 11),
                                       max_total in 11u32..60) {
            let mut map: BTreeMap<Role, u32> = Role::ALL.iter().copied().zip(counts).collect();
            let c = StaffingConstraints { max_total_staff: Some(max_total), ..Default::default() };
            let before: u32 = map.values().sum();
            apply_constraints(&mut map, &c);
            if before > max_total {
                prop_assert!(map.values().all(|n| *n >= 1));
            }
        }
    }
}
