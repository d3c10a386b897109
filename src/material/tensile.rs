use super::{ConeTerms, ExponentialHardening, PlasticityTrait, SmoothedCone};
use crate::base::ParamHardening;
use crate::material::invariants::NSYM;
use crate::StrError;
use russell_lab::{Matrix, Vector};
use russell_tensor::{IDENTITY2, SQRT_3};

/// Implements the tensile cutoff model limiting the maximum principal stress
///
/// The surface is the cone of [SmoothedCone] with k = 1/√3, for which
/// σm + √J2·K(θ) equals the maximum principal stress (away from the smoothed
/// regions):
///
/// ```text
/// f(σ, z) = σm + √(J2 K(θ)² + a²) - T(z)
/// ```
///
/// The tensile strength T follows the exponential softening law. The flow
/// rule is associated.
pub struct TensileCutoff {
    strength: ExponentialHardening,
    cone: SmoothedCone,
}

impl TensileCutoff {
    /// Allocates a new instance
    pub fn new(strength: &ParamHardening, tip_smoother: f64, edge_angle: f64) -> Result<Self, StrError> {
        if strength.initial < 0.0 || strength.residual < 0.0 {
            return Err("tensile strength must be ≥ 0.0");
        }
        let cone = SmoothedCone::new(tip_smoother, edge_angle)?;
        cone.check_convexity(1.0 / SQRT_3)?;
        Ok(TensileCutoff {
            strength: ExponentialHardening::new(strength)?,
            cone,
        })
    }
}

impl PlasticityTrait for TensileCutoff {
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
        let mut terms = ConeTerms::new();
        self.cone.eval(&mut terms, sigma, 1.0 / SQRT_3);
        let mean = (sigma[0] + sigma[1] + sigma[2]) / 3.0;
        f[0] = mean + terms.value - self.strength.value(z[0]);
        Ok(())
    }

    fn df_dsigma(&self, d: &mut [Vector], sigma: &Vector, _z: &Vector) -> Result<(), StrError> {
        let mut terms = ConeTerms::new();
        self.cone.eval(&mut terms, sigma, 1.0 / SQRT_3);
        for i in 0..NSYM {
            d[0][i] = IDENTITY2[i] / 3.0 + terms.grad[i];
        }
        Ok(())
    }

    fn df_dz(&self, d: &mut Matrix, _sigma: &Vector, z: &Vector) -> Result<(), StrError> {
        d.set(0, 0, -self.strength.deriv(z[0]));
        Ok(())
    }

    fn dg_dsigma(&self, d: &mut [Vector], sigma: &Vector, z: &Vector) -> Result<(), StrError> {
        self.df_dsigma(d, sigma, z)
    }

    fn d2g_dsigma_dsigma(&self, d: &mut [Matrix], sigma: &Vector, _z: &Vector) -> Result<(), StrError> {
        let mut terms = ConeTerms::new();
        self.cone.eval(&mut terms, sigma, 1.0 / SQRT_3);
        for i in 0..NSYM {
            for j in 0..NSYM {
                d[0].set(i, j, terms.hess.get(i, j));
            }
        }
        Ok(())
    }

    fn d2g_dsigma_dz(&self, d: &mut [Vector], _sigma: &Vector, _z: &Vector) -> Result<(), StrError> {
        d[0].fill(0.0); // k is constant
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
