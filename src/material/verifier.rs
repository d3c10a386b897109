use super::{ConstraintEvaluator, JacobianAssembler, PlasticityTrait, Residuals};
use crate::base::Config;
use crate::material::invariants::NSYM;
use crate::StrError;
use russell_lab::{Matrix, Vector};

/// Holds the worst absolute deviations between analytic and numerical derivatives
#[derive(Clone, Copy, Debug)]
pub struct DerivativeReport {
    /// Worst deviation of ∂f/∂σ
    pub df_dsigma: f64,

    /// Worst deviation of ∂f/∂z
    pub df_dz: f64,

    /// Worst deviation of ∂²G/∂σ∂σ
    pub d2g_dsigma_dsigma: f64,

    /// Worst deviation of ∂²G/∂σ∂z
    pub d2g_dsigma_dz: f64,

    /// Worst deviation of ∂h/∂σ
    pub dh_dsigma: f64,

    /// Worst deviation of ∂h/∂z
    pub dh_dz: f64,
}

impl DerivativeReport {
    /// Returns the worst deviation over all derivative blocks
    pub fn worst(&self) -> f64 {
        let mut w = self.df_dsigma;
        for v in [
            self.df_dz,
            self.d2g_dsigma_dsigma,
            self.d2g_dsigma_dz,
            self.dh_dsigma,
            self.dh_dz,
        ] {
            w = f64::max(w, v);
        }
        w
    }
}

/// Holds the worst absolute deviations between the assembled Jacobian and finite differences
#[derive(Clone, Copy, Debug)]
pub struct JacobianReport {
    /// Worst deviation in the plastic-strain-direction rows
    pub direction: f64,

    /// Worst deviation in the consistency rows
    pub consistency: f64,

    /// Worst deviation in the internal-variable rows
    pub internal: f64,
}

impl JacobianReport {
    /// Returns the worst deviation over all row groups
    pub fn worst(&self) -> f64 {
        f64::max(self.direction, f64::max(self.consistency, self.internal))
    }
}

/// Checks the derivative callbacks of a plasticity model by finite differences
///
/// Every analytic derivative block is compared against central differences of
/// the lower-order callback at a given probe state. This is the first tool to
/// reach for when the return map stagnates on a new model: a wrong Jacobian
/// block shows up here directly, decoupled from the Newton iteration.
pub struct DerivativeVerifier {
    step: f64,
}

impl DerivativeVerifier {
    /// Allocates a new instance with the default step (1e-6)
    pub fn new() -> Self {
        DerivativeVerifier { step: 1e-6 }
    }

    /// Sets the finite-difference step
    pub fn set_step(&mut self, value: f64) -> Result<&mut Self, StrError> {
        if value <= 0.0 {
            return Err("finite-difference step must be > 0.0");
        }
        self.step = value;
        Ok(self)
    }

    /// Compares all derivative callbacks at the given probe state
    pub fn verify(&self, model: &dyn PlasticityTrait, sigma: &Vector, z: &Vector) -> Result<DerivativeReport, StrError> {
        let ns = model.n_surfaces();
        let nz = model.n_internal_values();
        let h = self.step;
        let mut report = DerivativeReport {
            df_dsigma: 0.0,
            df_dz: 0.0,
            d2g_dsigma_dsigma: 0.0,
            d2g_dsigma_dz: 0.0,
            dh_dsigma: 0.0,
            dh_dz: 0.0,
        };
        let mut f_p = Vector::new(ns);
        let mut f_m = Vector::new(ns);
        let mut g_p = vec![Vector::new(NSYM); ns];
        let mut g_m = vec![Vector::new(NSYM); ns];
        let mut h_p = Matrix::new(nz, ns);
        let mut h_m = Matrix::new(nz, ns);
        // analytic blocks
        let mut df = vec![Vector::new(NSYM); ns];
        let mut dfz = Matrix::new(ns, nz);
        let mut d2g = vec![Matrix::new(NSYM, NSYM); ns];
        let mut d2gz = vec![Vector::new(NSYM); ns * nz];
        let mut dhs = vec![Vector::new(NSYM); nz * ns];
        let mut dhz = vec![Matrix::new(nz, nz); ns];
        model.df_dsigma(&mut df, sigma, z)?;
        model.df_dz(&mut dfz, sigma, z)?;
        model.d2g_dsigma_dsigma(&mut d2g, sigma, z)?;
        model.d2g_dsigma_dz(&mut d2gz, sigma, z)?;
        model.dh_dsigma(&mut dhs, sigma, z)?;
        model.dh_dz(&mut dhz, sigma, z)?;
        // stress-direction probes
        for j in 0..NSYM {
            let mut sp = sigma.clone();
            let mut sm = sigma.clone();
            sp[j] += h;
            sm[j] -= h;
            model.yield_function(&mut f_p, &sp, z)?;
            model.yield_function(&mut f_m, &sm, z)?;
            model.dg_dsigma(&mut g_p, &sp, z)?;
            model.dg_dsigma(&mut g_m, &sm, z)?;
            model.hardening(&mut h_p, &sp, z)?;
            model.hardening(&mut h_m, &sm, z)?;
            for s in 0..ns {
                let num = (f_p[s] - f_m[s]) / (2.0 * h);
                report.df_dsigma = f64::max(report.df_dsigma, f64::abs(df[s][j] - num));
                for i in 0..NSYM {
                    let num = (g_p[s][i] - g_m[s][i]) / (2.0 * h);
                    report.d2g_dsigma_dsigma =
                        f64::max(report.d2g_dsigma_dsigma, f64::abs(d2g[s].get(i, j) - num));
                }
            }
            for iz in 0..nz {
                for s in 0..ns {
                    let num = (h_p.get(iz, s) - h_m.get(iz, s)) / (2.0 * h);
                    report.dh_dsigma = f64::max(report.dh_dsigma, f64::abs(dhs[iz * ns + s][j] - num));
                }
            }
        }
        // internal-variable probes
        for j in 0..nz {
            let mut zp = z.clone();
            let mut zm = z.clone();
            zp[j] += h;
            zm[j] -= h;
            model.yield_function(&mut f_p, sigma, &zp)?;
            model.yield_function(&mut f_m, sigma, &zm)?;
            model.dg_dsigma(&mut g_p, sigma, &zp)?;
            model.dg_dsigma(&mut g_m, sigma, &zm)?;
            model.hardening(&mut h_p, sigma, &zp)?;
            model.hardening(&mut h_m, sigma, &zm)?;
            for s in 0..ns {
                let num = (f_p[s] - f_m[s]) / (2.0 * h);
                report.df_dz = f64::max(report.df_dz, f64::abs(dfz.get(s, j) - num));
                for i in 0..NSYM {
                    let num = (g_p[s][i] - g_m[s][i]) / (2.0 * h);
                    report.d2g_dsigma_dz =
                        f64::max(report.d2g_dsigma_dz, f64::abs(d2gz[s * nz + j][i] - num));
                }
            }
            for iz in 0..nz {
                for s in 0..ns {
                    let num = (h_p.get(iz, s) - h_m.get(iz, s)) / (2.0 * h);
                    report.dh_dz = f64::max(report.dh_dz, f64::abs(dhz[s].get(iz, j) - num));
                }
            }
        }
        Ok(report)
    }

    /// Compares the assembled Newton matrix against finite differences of the residuals
    ///
    /// Reconstructs every column of the Jacobian by central differences of the
    /// residual assembly and reports the worst deviation per row group. This
    /// checks the assembled system itself, complementing [DerivativeVerifier::verify]
    /// which probes the model callbacks in isolation; a recorded failure state
    /// (trial stress, internal variables) can be fed straight into it.
    ///
    /// # Input
    ///
    /// * `x` -- stacked unknowns [σ, λ, z] at which the Jacobian is probed
    /// * `compliance` -- elastic compliance matrix Cₑ (6 × 6 Mandel)
    /// * `sigma_trial` -- trial stress of the substep
    /// * `z_old` -- internal variables at the start of the substep
    pub fn verify_jacobian(
        &self,
        model: &dyn PlasticityTrait,
        compliance: &Matrix,
        x: &Vector,
        sigma_trial: &Vector,
        z_old: &Vector,
    ) -> Result<JacobianReport, StrError> {
        let ns = model.n_surfaces();
        let nz = model.n_internal_values();
        let n = NSYM + ns + nz;
        if x.dim() != n {
            return Err("the stacked unknowns must have dimension 6 + ns + nz");
        }
        // the residual assembly does not use the tolerances
        let config = Config::new(&vec![1.0; ns], &vec![1.0; nz])?;
        let mut evaluator = ConstraintEvaluator::new(&config, ns, nz)?;
        let mut assembler = JacobianAssembler::new(ns, nz);
        let mut jj = Matrix::new(n, n);
        assembler.assemble(&mut jj, model, compliance, x)?;
        let mut res_p = Residuals::new(ns, nz);
        let mut res_m = Residuals::new(ns, nz);
        let h = self.step;
        let mut report = JacobianReport {
            direction: 0.0,
            consistency: 0.0,
            internal: 0.0,
        };
        for j in 0..n {
            let mut xp = x.clone();
            let mut xm = x.clone();
            xp[j] += h;
            xm[j] -= h;
            evaluator.evaluate(&mut res_p, model, compliance, &xp, sigma_trial, z_old)?;
            evaluator.evaluate(&mut res_m, model, compliance, &xm, sigma_trial, z_old)?;
            for i in 0..NSYM {
                let num = (res_p.direction[i] - res_m.direction[i]) / (2.0 * h);
                report.direction = f64::max(report.direction, f64::abs(jj.get(i, j) - num));
            }
            for s in 0..ns {
                let num = (res_p.consistency[s] - res_m.consistency[s]) / (2.0 * h);
                report.consistency = f64::max(report.consistency, f64::abs(jj.get(NSYM + s, j) - num));
            }
            for i in 0..nz {
                let num = (res_p.internal[i] - res_m.internal[i]) / (2.0 * h);
                report.internal = f64::max(report.internal, f64::abs(jj.get(NSYM + ns + i, j) - num));
            }
        }
        Ok(report)
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::DerivativeVerifier;
    use crate::base::ParamPlasticity;
    use crate::material::testing::elastic_matrices;
    use crate::material::Plasticity;
    use russell_lab::Vector;

    #[test]
    fn set_step_captures_errors() {
        let mut verifier = DerivativeVerifier::new();
        assert_eq!(
            verifier.set_step(0.0).err(),
            Some("finite-difference step must be > 0.0")
        );
        verifier.set_step(1e-7).unwrap();
    }

    #[test]
    fn verify_accepts_correct_derivatives() {
        let model = Plasticity::new(&ParamPlasticity::sample_mohr_coulomb_softening()).unwrap();
        let verifier = DerivativeVerifier::new();
        let sigma = Vector::from(&[-10.0, -12.0, -60.0, 2.0, 1.0, -3.0]);
        let report = verifier
            .verify(model.as_ref(), &sigma, &Vector::from(&[0.004]))
            .unwrap();
        assert!(report.worst() < 1e-5);
        assert_eq!(report.dh_dsigma, 0.0);
        assert_eq!(report.dh_dz, 0.0);
    }

    #[test]
    fn verify_jacobian_accepts_the_assembled_matrix() {
        let model = Plasticity::new(&ParamPlasticity::sample_mohr_coulomb_softening()).unwrap();
        let verifier = DerivativeVerifier::new();
        let (_, cc) = elastic_matrices(1500.0, 0.3);
        let sigma_trial = Vector::from(&[-10.0, -12.0, -60.0, 2.0, 1.0, -3.0]);
        let z_old = Vector::from(&[0.0]);
        let x = Vector::from(&[-12.0, -14.0, -55.0, 1.5, 0.8, -2.0, 0.004, 0.004]);
        let report = verifier
            .verify_jacobian(model.as_ref(), &cc, &x, &sigma_trial, &z_old)
            .unwrap();
        assert!(report.worst() < 1e-5);
        assert_eq!(
            verifier
                .verify_jacobian(model.as_ref(), &cc, &Vector::new(7), &sigma_trial, &z_old)
                .err(),
            Some("the stacked unknowns must have dimension 6 + ns + nz")
        );
    }
}
