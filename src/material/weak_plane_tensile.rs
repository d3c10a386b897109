use super::{ExponentialHardening, PlasticityTrait};
use crate::base::ParamHardening;
use crate::StrError;
use russell_lab::{Matrix, Vector};

/// Implements the weak-plane tensile model
///
/// The surface limits the normal stress on the plane of weakness (normal
/// along the z-axis):
///
/// ```text
/// f(σ, z) = σzz - T(z)
/// ```
///
/// The surface is a plane in stress space, so all second derivatives vanish
/// and the return map converges in one iteration when T is constant. The
/// tensile strength follows the exponential softening law; the flow rule is
/// associated.
pub struct WeakPlaneTensile {
    strength: ExponentialHardening,
}

impl WeakPlaneTensile {
    /// Allocates a new instance
    pub fn new(strength: &ParamHardening) -> Result<Self, StrError> {
        if strength.initial < 0.0 || strength.residual < 0.0 {
            return Err("tensile strength must be ≥ 0.0");
        }
        Ok(WeakPlaneTensile {
            strength: ExponentialHardening::new(strength)?,
        })
    }
}

impl PlasticityTrait for WeakPlaneTensile {
    fn associated(&self) -> bool {
        true
    }

    fn n_surfaces(&self) -> usize {
        1
    }

    fn n_internal_values(&self) -> usize {
        1
    }

    fn initialize_internal_values(&self, z: &mut Vector) -> Result<(), StrError> {
        z[0] = 0.0;
        Ok(())
    }

    fn yield_function(&self, f: &mut Vector, sigma: &Vector, z: &Vector) -> Result<(), StrError> {
        f[0] = sigma[2] - self.strength.value(z[0]);
        Ok(())
    }

    fn df_dsigma(&self, d: &mut [Vector], _sigma: &Vector, _z: &Vector) -> Result<(), StrError> {
        d[0].fill(0.0);
        d[0][2] = 1.0;
        Ok(())
    }

    fn df_dz(&self, d: &mut Matrix, _sigma: &Vector, z: &Vector) -> Result<(), StrError> {
        d.set(0, 0, -self.strength.deriv(z[0]));
        Ok(())
    }

    fn dg_dsigma(&self, d: &mut [Vector], sigma: &Vector, z: &Vector) -> Result<(), StrError> {
        self.df_dsigma(d, sigma, z)
    }

    fn d2g_dsigma_dsigma(&self, d: &mut [Matrix], _sigma: &Vector, _z: &Vector) -> Result<(), StrError> {
        d[0].fill(0.0);
        Ok(())
    }

    fn d2g_dsigma_dz(&self, d: &mut [Vector], _sigma: &Vector, _z: &Vector) -> Result<(), StrError> {
        d[0].fill(0.0);
        Ok(())
    }

    fn hardening(&self, h: &mut Matrix, _sigma: &Vector, _z: &Vector) -> Result<(), StrError> {
        h.set(0, 0, -1.0);
        Ok(())
    }

    fn dh_dsigma(&self, d: &mut [Vector], _sigma: &Vector, _z: &Vector) -> Result<(), StrError> {
        d[0].fill(0.0);
        Ok(())
    }

    fn dh_dz(&self, d: &mut [Matrix], _sigma: &Vector, _z: &Vector) -> Result<(), StrError> {
        d[0].fill(0.0);
        Ok(())
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
