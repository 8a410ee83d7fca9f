#![deny(warnings)]

//! Scenario analytics for food-and-beverage outlets.
//!
//! Seven calculators turn typed configuration into typed results, each
//! paired with generated insight text:
//! - [`staffing`]: FOH/BOH headcount and labor cost from space and service ratios
//! - [`revenue`]: calendar-aware revenue projections with seasonality and growth
//! - [`pnl`]: profit-and-loss waterfall plus a synthetic 12-month history
//! - [`peak_hours`]: day × hour staffing-demand heatmap
//! - [`optimizer`]: table-driven alternative staffing plans, with an optional model
//! - [`what_if`]: sparse overrides applied to a baseline financial snapshot
//! - [`compare`]: pairwise deltas across two or more scenarios
//!
//! [`forecast`] asks a demand model for daily covers and falls back to the
//! scenario's planned covers when the model fails.
//!
//! All calculators are pure. Randomness is passed in as `&mut impl Rng` and
//! "today" is passed in as a date, so identical inputs give identical outputs.

pub mod calendar;
pub mod compare;
pub mod forecast;
pub mod insight;
pub mod optimizer;
pub mod peak_hours;
pub mod pnl;
pub mod revenue;
pub mod staffing;
pub mod what_if;

pub use compare::{compare_scenarios, ComparisonResult};
pub use forecast::{forecast_covers, CoversForecast, ForecastSource};
pub use optimizer::{
    optimize_staffing, optimize_staffing_with_model, OptimizationResult, OptimizationTarget,
};
pub use peak_hours::{analyze_peak_hours, PeakHourParams, PeakHourReport};
pub use pnl::{calculate_profit_loss, PlParams, PlReport};
pub use revenue::{project_revenue, ProjectionPeriod, RevenueParams, RevenueProjection};
pub use staffing::{calculate_staffing, StaffingParams, StaffingResult};
pub use what_if::{run_what_if, WhatIfResult};

use outlet_core::{
    DemandFeatures, DemandModel, EngineConfig, ScenarioConfig, ScenarioRepository,
    StaffingConstraints, StaffingModel, ValidationError,
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::collections::BTreeMap;
use thiserror::Error;

/// Errors produced by the calculators.
#[derive(Debug, Error, PartialEq)]
pub enum EngineError {
    /// Input failed a domain invariant.
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// A headcount formula would divide by zero.
    #[error("division by zero: {what} is zero")]
    DivisionByZero { what: &'static str },
    /// Comparison needs a base and at least one alternative.
    #[error("at least two scenarios are required for comparison, got {got}")]
    NotEnoughScenarios { got: usize },
    /// The repository has no scenario with this id.
    #[error("scenario not found: {0}")]
    ScenarioNotFound(String),
    /// A scenario lacks a sub-record the calculator needs.
    #[error("missing required field: {0}")]
    MissingField(&'static str),
    /// A projection must cover at least one period.
    #[error("projection length must be at least 1")]
    EmptyProjection,
}

/// Deterministic generator for the given seed.
pub fn seeded_rng(seed: u64) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(seed)
}

/// Repository-backed entry points for the calculators that work on stored
/// scenarios. Lookups happen here; the calculators themselves never see ids.
pub struct ScenarioEngine<R> {
    repo: R,
    config: EngineConfig,
}

impl<R: ScenarioRepository> ScenarioEngine<R> {
    pub fn new(repo: R, config: EngineConfig) -> Self {
        Self { repo, config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// A fresh generator seeded from the engine config.
    pub fn rng(&self) -> ChaCha8Rng {
        seeded_rng(self.config.rng_seed)
    }

    pub fn scenario(&self, id: &str) -> Result<ScenarioConfig, EngineError> {
        self.repo
            .get(id)
            .ok_or_else(|| EngineError::ScenarioNotFound(id.to_string()))
    }

    /// Staffing for a stored scenario, using the configured salary table.
    pub fn staffing(&self, id: &str) -> Result<StaffingResult, EngineError> {
        let scenario = self.scenario(id)?;
        let params = StaffingParams::from_scenario(&scenario, self.config.salaries.clone())?;
        calculate_staffing(&params)
    }

    pub fn optimize(
        &self,
        id: &str,
        target: OptimizationTarget,
    ) -> Result<OptimizationResult, EngineError> {
        Ok(optimize_staffing(&self.scenario(id)?, target))
    }

    /// Optimize through a model collaborator, falling back to the policy table
    /// when the model fails.
    pub fn optimize_with_model<M: StaffingModel + ?Sized>(
        &self,
        id: &str,
        target: OptimizationTarget,
        constraints: &StaffingConstraints,
        model: &M,
    ) -> Result<OptimizationResult, EngineError> {
        let scenario = self.scenario(id)?;
        Ok(optimize_staffing_with_model(&scenario, target, constraints, model))
    }

    pub fn what_if(
        &self,
        id: &str,
        overrides: &BTreeMap<String, f64>,
    ) -> Result<WhatIfResult, EngineError> {
        run_what_if(&self.scenario(id)?, overrides)
    }

    /// Covers forecast for a stored scenario. A failing model falls back to
    /// the scenario's planned covers.
    pub fn forecast<M: DemandModel + ?Sized>(
        &self,
        id: &str,
        features: &DemandFeatures,
        model: &M,
    ) -> Result<CoversForecast, EngineError> {
        Ok(forecast_covers(&self.scenario(id)?, features, model))
    }

    /// Compare stored scenarios; the first id is the base.
    pub fn compare(&self, ids: &[&str]) -> Result<ComparisonResult, EngineError> {
        if ids.len() < 2 {
            return Err(EngineError::NotEnoughScenarios { got: ids.len() });
        }
        let scenarios = ids
            .iter()
            .map(|id| self.scenario(id))
            .collect::<Result<Vec<_>, _>>()?;
        compare_scenarios(&scenarios)
    }
}
