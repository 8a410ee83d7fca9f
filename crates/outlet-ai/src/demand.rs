//! Linear covers forecast.

use outlet_core::{DemandFeatures, DemandModel, DemandPrediction, ModelError};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Weights of the linear covers model. Booleans contribute their weight
/// when set; `day_of_week` holds per-day offsets, Monday first.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DemandCoefficients {
    pub intercept: f64,
    pub day_of_week: [f64; 7],
    pub weekend: f64,
    pub holiday: f64,
    pub ramadan: f64,
    /// Per degree Celsius.
    pub temperature: f64,
    /// Per millimetre.
    pub precipitation: f64,
    pub special_event: f64,
    pub marketing_campaign: f64,
    pub menu_change: f64,
    pub competitor_promotion: f64,
}

fn flag(on: bool, weight: f64) -> f64 {
    if on {
        weight
    } else {
        0.0
    }
}

impl DemandCoefficients {
    fn score(&self, f: &DemandFeatures) -> f64 {
        self.intercept
            + self.day_of_week[usize::from(f.day_of_week)]
            + flag(f.is_weekend, self.weekend)
            + flag(f.is_holiday, self.holiday)
            + flag(f.is_ramadan, self.ramadan)
            + self.temperature * f.temperature
            + self.precipitation * f.precipitation
            + flag(f.special_event.is_some(), self.special_event)
            + flag(f.marketing_campaign, self.marketing_campaign)
            + flag(f.menu_change, self.menu_change)
            + flag(f.competitor_promotion, self.competitor_promotion)
    }
}

/// Intercept plus weighted features. Predictions are rounded and floored at
/// zero covers.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LinearDemandModel {
    coefficients: Option<DemandCoefficients>,
}

impl LinearDemandModel {
    pub const MODEL_TYPE: &'static str = "linear_regression";

    pub fn new(coefficients: DemandCoefficients) -> Self {
        Self {
            coefficients: Some(coefficients),
        }
    }

    /// A model with no coefficients; every prediction fails.
    pub fn untrained() -> Self {
        Self::default()
    }

    /// Load coefficients from a YAML document.
    pub fn from_yaml(src: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str::<DemandCoefficients>(src).map(Self::new)
    }

    pub fn is_trained(&self) -> bool {
        self.coefficients.is_some()
    }
}

impl DemandModel for LinearDemandModel {
    fn predict(&self, features: &DemandFeatures) -> Result<DemandPrediction, ModelError> {
        let c = self.coefficients.as_ref().ok_or(ModelError::NotTrained)?;
        if features.day_of_week > 6 {
            return Err(ModelError::InvalidFeature("day_of_week"));
        }
        if !features.temperature.is_finite() {
            return Err(ModelError::InvalidFeature("temperature"));
        }
        if !features.precipitation.is_finite() {
            return Err(ModelError::InvalidFeature("precipitation"));
        }
        let score = c.score(features);
        let predicted_covers = score.max(0.0).round() as u32;
        debug!(score, predicted_covers, "covers predicted");
        Ok(DemandPrediction {
            predicted_covers,
            model_type: Self::MODEL_TYPE.to_string(),
        })
    }
}
