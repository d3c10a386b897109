use super::{ExponentialHardening, PlasticityTrait};
use crate::base::ParamHardening;
use crate::StrError;
use russell_lab::{Matrix, Vector};

/// Implements the weak-plane shear model
///
/// The plane of weakness has its normal along the z-axis. With the resolved
/// shear stress τ = √(σyz² + σxz²) smoothed at the origin, the surface is
///
/// ```text
/// f(σ, z) = √(τ² + a²) + σzz·tanφ - c
/// ```
///
/// In Mandel components τ² = (v₄² + v₅²)/2. The plastic potential uses the
/// dilation angle ψ in place of φ.
pub struct WeakPlaneShear {
    cohesion: ExponentialHardening,
    friction: ExponentialHardening,
    dilation: ExponentialHardening,
    tip: f64,
    associated: bool,
}

impl WeakPlaneShear {
    /// Allocates a new instance
    ///
    /// # Input
    ///
    /// * `cohesion` -- cohesion law (stress units, values ≥ 0)
    /// * `friction` -- friction angle law in degrees, values in (0, 90)
    /// * `dilation` -- dilation angle law in degrees, values in [0, friction]
    /// * `tip_smoother` -- shear-stress smoothing constant (stress units, > 0)
    pub fn new(
        cohesion: &ParamHardening,
        friction: &ParamHardening,
        dilation: &ParamHardening,
        tip_smoother: f64,
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
        if !tip_smoother.is_finite() || tip_smoother <= 0.0 {
            return Err("tip smoothing constant must be > 0.0");
        }
        let associated = friction.initial == dilation.initial
            && friction.residual == dilation.residual
            && friction.rate == dilation.rate;
        let to_rad = |p: &ParamHardening| ParamHardening {
            initial: p.initial.to_radians(),
            residual: p.residual.to_radians(),
            rate: p.rate,
        };
        Ok(WeakPlaneShear {
            cohesion: ExponentialHardening::new(cohesion)?,
            friction: ExponentialHardening::new(&to_rad(friction))?,
            dilation: ExponentialHardening::new(&to_rad(dilation))?,
            tip: tip_smoother,
            associated,
        })
    }

    /// Calculates the smoothed resolved shear stress
    fn shear(&self, sigma: &Vector) -> f64 {
        f64::sqrt((sigma[4] * sigma[4] + sigma[5] * sigma[5]) / 2.0 + self.tip * self.tip)
    }

    /// Writes the gradient for a given tangent (of friction or dilation)
    fn gradient(&self, d: &mut Vector, sigma: &Vector, tan_angle: f64) {
        let w = self.shear(sigma);
        d.fill(0.0);
        d[2] = tan_angle;
        d[4] = sigma[4] / (2.0 * w);
        d[5] = sigma[5] / (2.0 * w);
    }
}

impl PlasticityTrait for WeakPlaneShear {
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
        f[0] = self.shear(sigma) + sigma[2] * f64::tan(phi) - self.cohesion.value(z[0]);
        Ok(())
    }

    fn df_dsigma(&self, d: &mut [Vector], sigma: &Vector, z: &Vector) -> Result<(), StrError> {
        self.gradient(&mut d[0], sigma, f64::tan(self.friction.value(z[0])));
        Ok(())
    }

    fn df_dz(&self, d: &mut Matrix, sigma: &Vector, z: &Vector) -> Result<(), StrError> {
        let phi = self.friction.value(z[0]);
        let sec2 = 1.0 / (f64::cos(phi) * f64::cos(phi));
        d.set(0, 0, sigma[2] * self.friction.deriv(z[0]) * sec2 - self.cohesion.deriv(z[0]));
        Ok(())
    }

    fn dg_dsigma(&self, d: &mut [Vector], sigma: &Vector, z: &Vector) -> Result<(), StrError> {
        self.gradient(&mut d[0], sigma, f64::tan(self.dilation.value(z[0])));
        Ok(())
    }

    fn d2g_dsigma_dsigma(&self, d: &mut [Matrix], sigma: &Vector, _z: &Vector) -> Result<(), StrError> {
        let w = self.shear(sigma);
        let w3 = 4.0 * w * w * w;
        d[0].fill(0.0);
        d[0].set(4, 4, 1.0 / (2.0 * w) - sigma[4] * sigma[4] / w3);
        d[0].set(5, 5, 1.0 / (2.0 * w) - sigma[5] * sigma[5] / w3);
        d[0].set(4, 5, -sigma[4] * sigma[5] / w3);
        d[0].set(5, 4, -sigma[4] * sigma[5] / w3);
        Ok(())
    }

    fn d2g_dsigma_dz(&self, d: &mut [Vector], _sigma: &Vector, z: &Vector) -> Result<(), StrError> {
        let psi = self.dilation.value(z[0]);
        let sec2 = 1.0 / (f64::cos(psi) * f64::cos(psi));
        d[0].fill(0.0);
        d[0][2] = self.dilation.deriv(z[0]) * sec2;
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
