#![deny(warnings)]

//! Model collaborators for the outlet engine: a linear covers forecaster, a
//! ratio-driven staffing model, and a stand-in for a model service that is
//! down.

pub mod demand;
pub mod staffing;

pub use demand::{DemandCoefficients, LinearDemandModel};
pub use staffing::{apply_constraints, RatioStaffingModel};

use outlet_core::{
    DemandFeatures, DemandModel, DemandPrediction, ModelError, ModelStaffing,
    StaffingConstraints, StaffingFeatures, StaffingModel,
};

/// A model endpoint that always fails with [`ModelError::Unavailable`].
#[derive(Clone, Debug, Default)]
pub struct UnavailableModel {
    pub reason: String,
}

impl UnavailableModel {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    fn error(&self) -> ModelError {
        ModelError::Unavailable(self.reason.clone())
    }
}

impl DemandModel for UnavailableModel {
    fn predict(&self, _features: &DemandFeatures) -> Result<DemandPrediction, ModelError> {
        Err(self.error())
    }
}

impl StaffingModel for UnavailableModel {
    fn optimize(
        &self,
        _features: &StaffingFeatures,
        _constraints: &StaffingConstraints,
    ) -> Result<ModelStaffing, ModelError> {
        Err(self.error())
    }
}
