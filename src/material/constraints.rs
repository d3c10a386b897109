use super::PlasticityTrait;
use crate::base::Config;
use crate::material::invariants::NSYM;
use crate::StrError;
use russell_lab::{Matrix, Vector};

/// Holds the residual groups of the closest-point-projection system
///
/// The unknowns are stacked as x = [σ (6), λ (ns), z (nz)].
#[derive(Clone, Debug)]
pub struct Residuals {
    /// Holds the plastic-strain-direction residual R_ε = Σ λ_s·g_s - Cₑ:(σ_trial - σ)
    pub direction: Vector,

    /// Holds the consistency residual R_f = f_s(σ, z)
    pub consistency: Vector,

    /// Holds the internal-variable residual R_z = (z - z_old) + Σ λ_s·h_s
    pub internal: Vector,
}

impl Residuals {
    /// Allocates a new instance (zeroed)
    pub fn new(n_surfaces: usize, n_internal_values: usize) -> Self {
        Residuals {
            direction: Vector::new(NSYM),
            consistency: Vector::new(n_surfaces),
            internal: Vector::new(n_internal_values),
        }
    }
}

/// Evaluates the residual groups and the scalar merit function
///
/// Every residual is normalized by its tolerance, so the merit
///
/// ```text
/// m = ½ Σ (r / tol)²
/// ```
///
/// is below ½ exactly when every residual is inside its tolerance band.
pub struct ConstraintEvaluator {
    ns: usize,
    nz: usize,
    f_tol: Vec<f64>,
    z_tol: Vec<f64>,
    eps_tol: f64,
    sigma: Vector,
    lam: Vector,
    z: Vector,
    g: Vec<Vector>,
    f: Vector,
    h: Matrix,
}

impl ConstraintEvaluator {
    /// Allocates a new instance
    pub fn new(config: &Config, n_surfaces: usize, n_internal_values: usize) -> Result<Self, StrError> {
        if config.f_tol.len() != n_surfaces {
            return Err("the number of yield tolerances must match the number of surfaces");
        }
        if config.z_tol.len() != n_internal_values {
            return Err("the number of internal-variable tolerances must match the model");
        }
        Ok(ConstraintEvaluator {
            ns: n_surfaces,
            nz: n_internal_values,
            f_tol: config.f_tol.clone(),
            z_tol: config.z_tol.clone(),
            eps_tol: config.eps_tol,
            sigma: Vector::new(NSYM),
            lam: Vector::new(n_surfaces),
            z: Vector::new(n_internal_values),
            g: vec![Vector::new(NSYM); n_surfaces],
            f: Vector::new(n_surfaces),
            h: Matrix::new(n_internal_values, n_surfaces),
        })
    }

    /// Unpacks the stacked unknowns into the internal scratch vectors
    fn unpack(&mut self, x: &Vector) {
        for i in 0..NSYM {
            self.sigma[i] = x[i];
        }
        for s in 0..self.ns {
            self.lam[s] = x[NSYM + s];
        }
        for i in 0..self.nz {
            self.z[i] = x[NSYM + self.ns + i];
        }
    }

    /// Evaluates the residual groups at the stacked unknowns
    ///
    /// # Input
    ///
    /// * `x` -- stacked unknowns [σ, λ, z]
    /// * `compliance` -- elastic compliance matrix Cₑ (6 × 6 Mandel)
    /// * `sigma_trial` -- trial stress of the current substep
    /// * `z_old` -- internal variables at the start of the substep
    pub fn evaluate(
        &mut self,
        res: &mut Residuals,
        model: &dyn PlasticityTrait,
        compliance: &Matrix,
        x: &Vector,
        sigma_trial: &Vector,
        z_old: &Vector,
    ) -> Result<(), StrError> {
        self.unpack(x);
        model.dg_dsigma(&mut self.g, &self.sigma, &self.z)?;
        model.yield_function(&mut self.f, &self.sigma, &self.z)?;
        model.hardening(&mut self.h, &self.sigma, &self.z)?;
        for i in 0..NSYM {
            let mut sum = 0.0;
            for s in 0..self.ns {
                sum += self.lam[s] * self.g[s][i];
            }
            for j in 0..NSYM {
                sum -= compliance.get(i, j) * (sigma_trial[j] - self.sigma[j]);
            }
            res.direction[i] = sum;
        }
        for s in 0..self.ns {
            res.consistency[s] = self.f[s];
        }
        for i in 0..self.nz {
            let mut sum = self.z[i] - z_old[i];
            for s in 0..self.ns {
                sum += self.lam[s] * self.h.get(i, s);
            }
            res.internal[i] = sum;
        }
        Ok(())
    }

    /// Calculates the scalar merit function (signed residuals)
    pub fn merit(&self, res: &Residuals) -> f64 {
        let mut sum = 0.0;
        for i in 0..NSYM {
            let r = res.direction[i] / self.eps_tol;
            sum += r * r;
        }
        for s in 0..self.ns {
            let r = res.consistency[s] / self.f_tol[s];
            sum += r * r;
        }
        for i in 0..self.nz {
            let r = res.internal[i] / self.z_tol[i];
            sum += r * r;
        }
        0.5 * sum
    }

    /// Calculates the merit of a trial state using only positive yield values
    ///
    /// A trial state with every f_s within tolerance (or negative) is
    /// admissible and the elastic update can be accepted directly.
    pub fn trial_merit(&self, f_trial: &Vector) -> f64 {
        let mut sum = 0.0;
        for s in 0..self.ns {
            let r = f64::max(f_trial[s], 0.0) / self.f_tol[s];
            sum += r * r;
        }
        0.5 * sum
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
