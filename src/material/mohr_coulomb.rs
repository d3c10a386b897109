use super::{ConeTerms, ExponentialHardening, PlasticityTrait, SmoothedCone};
use crate::base::ParamHardening;
use crate::material::invariants::NSYM;
use crate::StrError;
use russell_lab::{Matrix, Vector};
use russell_tensor::{IDENTITY2, SQRT_3};

/// Implements the Mohr-Coulomb model with smoothed tip and Lode-angle edges
///
/// The yield surface is
///
/// ```text
/// f(σ, z) = σm·sinφ + √(J2 K(θ)² + a²) - c·cosφ
/// ```
///
/// with the smoothed shape function K of [SmoothedCone] and k = sinφ/√3.
/// Cohesion c, friction angle φ, and dilation angle ψ all follow the
/// exponential hardening law driven by a single internal variable z, the
/// accumulated consistency parameter. The plastic potential uses ψ in place
/// of φ; the flow rule is associated when ψ ≡ φ.
pub struct MohrCoulomb {
    cohesion: ExponentialHardening,
    friction: ExponentialHardening,
    dilation: ExponentialHardening,
    cone: SmoothedCone,
    associated: bool,
}

impl MohrCoulomb {
    /// Allocates a new instance
    ///
    /// # Input
    ///
    /// * `cohesion` -- cohesion law (stress units, values ≥ 0)
    /// * `friction` -- friction angle law in degrees, values in (0, 90)
    /// * `dilation` -- dilation angle law in degrees, values in [0, friction]
    /// * `tip_smoother` -- tip smoothing constant (stress units, > 0)
    /// * `edge_angle` -- Lode transition angle in degrees, 0 < θT < 30
    pub fn new(
        cohesion: &ParamHardening,
        friction: &ParamHardening,
        dilation: &ParamHardening,
        tip_smoother: f64,
        edge_angle: f64,
    ) -> Result<Self, StrError> {
        if cohesion.initial < 0.0 || cohesion.residual < 0.0 {
            return Err("cohesion must be ≥ 0.0");
        }
        for angle in [friction.initial, friction.residual] {
            if angle <= 0.0 || angle >= 90.0 {
                return Err("friction angle must satisfy 0 < φ < 90 degrees");
            }
        }
        if dilation.initial < 0.0 || dilation.residual < 0.0 {
            return Err("dilation angle must be ≥ 0.0");
        }
        if dilation.initial > friction.initial || dilation.residual > friction.residual {
            return Err("dilation angle must not exceed the friction angle");
        }
        let associated = friction.initial == dilation.initial
            && friction.residual == dilation.residual
            && friction.rate == dilation.rate;
        let to_rad = |p: &ParamHardening| ParamHardening {
            initial: p.initial.to_radians(),
            residual: p.residual.to_radians(),
            rate: p.rate,
        };
        let friction = ExponentialHardening::new(&to_rad(friction))?;
        let cone = SmoothedCone::new(tip_smoother, edge_angle)?;
        // convexity must hold over the whole hardening range of φ
        let phi_max = f64::max(friction.initial(), friction.residual());
        cone.check_convexity(f64::sin(phi_max) / SQRT_3)?;
        Ok(MohrCoulomb {
            cohesion: ExponentialHardening::new(cohesion)?,
            friction,
            dilation: ExponentialHardening::new(&to_rad(dilation))?,
            cone,
            associated,
        })
    }

    /// Evaluates the cone terms at a given angle (friction or dilation)
    fn cone_at(&self, terms: &mut ConeTerms, sigma: &Vector, angle: f64) {
        let k = f64::sin(angle) / SQRT_3;
        self.cone.eval(terms, sigma, k);
    }
}

fn mean_stress(sigma: &Vector) -> f64 {
    (sigma[0] + sigma[1] + sigma[2]) / 3.0
}

impl PlasticityTrait for MohrCoulomb {
    fn associated(&self) -> bool {
        self.associated
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
        let phi = self.friction.value(z[0]);
        let mut terms = ConeTerms::new();
        self.cone_at(&mut terms, sigma, phi);
        f[0] = mean_stress(sigma) * f64::sin(phi) + terms.value - self.cohesion.value(z[0]) * f64::cos(phi);
        Ok(())
    }

    fn df_dsigma(&self, d: &mut [Vector], sigma: &Vector, z: &Vector) -> Result<(), StrError> {
        let phi = self.friction.value(z[0]);
        let mut terms = ConeTerms::new();
        self.cone_at(&mut terms, sigma, phi);
        let sa = f64::sin(phi);
        for i in 0..NSYM {
            d[0][i] = sa * IDENTITY2[i] / 3.0 + terms.grad[i];
        }
        Ok(())
    }

    fn df_dz(&self, d: &mut Matrix, sigma: &Vector, z: &Vector) -> Result<(), StrError> {
        let phi = self.friction.value(z[0]);
        let mut terms = ConeTerms::new();
        self.cone_at(&mut terms, sigma, phi);
        let (sa, ca) = (f64::sin(phi), f64::cos(phi));
        let dphi = self.friction.deriv(z[0]);
        let c = self.cohesion.value(z[0]);
        let dc = self.cohesion.deriv(z[0]);
        // dk/dφ = cosφ/√3
        let val = mean_stress(sigma) * ca * dphi + terms.value_k * (ca / SQRT_3) * dphi - dc * ca + c * sa * dphi;
        d.set(0, 0, val);
        Ok(())
    }

    fn dg_dsigma(&self, d: &mut [Vector], sigma: &Vector, z: &Vector) -> Result<(), StrError> {
        let psi = self.dilation.value(z[0]);
        let mut terms = ConeTerms::new();
        self.cone_at(&mut terms, sigma, psi);
        let sa = f64::sin(psi);
        for i in 0..NSYM {
            d[0][i] = sa * IDENTITY2[i] / 3.0 + terms.grad[i];
        }
        Ok(())
    }

    fn d2g_dsigma_dsigma(&self, d: &mut [Matrix], sigma: &Vector, z: &Vector) -> Result<(), StrError> {
        let psi = self.dilation.value(z[0]);
        let mut terms = ConeTerms::new();
        self.cone_at(&mut terms, sigma, psi);
        for i in 0..NSYM {
            for j in 0..NSYM {
                d[0].set(i, j, terms.hess.get(i, j));
            }
        }
        Ok(())
    }

    fn d2g_dsigma_dz(&self, d: &mut [Vector], sigma: &Vector, z: &Vector) -> Result<(), StrError> {
        let psi = self.dilation.value(z[0]);
        let mut terms = ConeTerms::new();
        self.cone_at(&mut terms, sigma, psi);
        let ca = f64::cos(psi);
        let dpsi = self.dilation.deriv(z[0]);
        for i in 0..NSYM {
            d[0][i] = ca * dpsi * IDENTITY2[i] / 3.0 + terms.grad_k[i] * (ca / SQRT_3) * dpsi;
        }
        Ok(())
    }

    fn hardening(&self, h: &mut Matrix, _sigma: &Vector, _z: &Vector) -> Result<(), StrError> {
        h.set(0, 0, -1.0); // z accumulates the consistency parameter
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
