//! Daily covers forecast for a scenario through a demand model.
//!
//! The model is best-effort: when it fails, the forecast is the scenario's
//! own daily covers and the failure is logged.

use crate::insight::percent_of;
use outlet_core::{DemandFeatures, DemandModel, ScenarioConfig, StaffingFeatures};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Where the forecast came from.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ForecastSource {
    Model { model_type: String },
    Baseline,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CoversForecast {
    pub scenario_id: String,
    pub features: DemandFeatures,
    pub predicted_covers: u32,
    /// Daily covers the scenario is planned for.
    pub baseline_covers: u32,
    pub change: i64,
    pub change_percentage: Option<f64>,
    pub source: ForecastSource,
}

/// Planned daily covers: the scenario's figure, else the feature default.
pub fn baseline_covers(s: &ScenarioConfig) -> u32 {
    StaffingFeatures::from_scenario(s).covers
}

pub fn forecast_covers<M: DemandModel + ?Sized>(
    scenario: &ScenarioConfig,
    features: &DemandFeatures,
    model: &M,
) -> CoversForecast {
    let baseline = baseline_covers(scenario);
    let (predicted_covers, source) = match model.predict(features) {
        Ok(p) => (
            p.predicted_covers,
            ForecastSource::Model {
                model_type: p.model_type,
            },
        ),
        Err(error) => {
            warn!(scenario = %scenario.id, %error, "demand model failed, using planned covers");
            (baseline, ForecastSource::Baseline)
        }
    };
    let change = i64::from(predicted_covers) - i64::from(baseline);
    debug!(scenario = %scenario.id, predicted_covers, baseline, "covers forecast");
    CoversForecast {
        scenario_id: scenario.id.clone(),
        features: features.clone(),
        predicted_covers,
        baseline_covers: baseline,
        change,
        change_percentage: percent_of(change as f64, f64::from(baseline)),
        source,
    }
}
