use super::{MohrCoulomb, PlasticityTrait, TensileCutoff, WeakPlaneShear, WeakPlaneTensile};
use crate::base::ParamPlasticity;
use crate::StrError;

/// Allocates plasticity models from parameters
pub struct Plasticity {}

impl Plasticity {
    /// Allocates a new model according to the given parameters
    pub fn new(param: &ParamPlasticity) -> Result<Box<dyn PlasticityTrait>, StrError> {
        let model: Box<dyn PlasticityTrait> = match param {
            ParamPlasticity::MohrCoulomb {
                cohesion,
                friction,
                dilation,
                tip_smoother,
                edge_angle,
            } => Box::new(MohrCoulomb::new(cohesion, friction, dilation, *tip_smoother, *edge_angle)?),
            ParamPlasticity::TensileCutoff {
                strength,
                tip_smoother,
                edge_angle,
            } => Box::new(TensileCutoff::new(strength, *tip_smoother, *edge_angle)?),
            ParamPlasticity::WeakPlaneShear {
                cohesion,
                friction,
                dilation,
                tip_smoother,
            } => Box::new(WeakPlaneShear::new(cohesion, friction, dilation, *tip_smoother)?),
            ParamPlasticity::WeakPlaneTensile { strength } => Box::new(WeakPlaneTensile::new(strength)?),
        };
        Ok(model)
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
