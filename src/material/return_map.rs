use super::{ConstraintEvaluator, JacobianAssembler, LineSearch, LocalState, Plasticity, PlasticityTrait, Residuals};
use crate::base::{Config, ParamPlasticity};
use crate::material::invariants::NSYM;
use crate::StrError;
use russell_lab::{mat_inverse, mat_vec_mul, solve_lin_sys, vec_copy, Matrix, Vector};
use russell_tensor::{Mandel, Tensor2, Tensor4};
use serde::{Deserialize, Serialize};

/// Holds diagnostic data recorded when the return map exhausts its budget
///
/// The report is serializable so a failing stress update can be dumped to
/// JSON and replayed offline (e.g., through the derivative verifier).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FailureReport {
    /// Holds the stress at the entry of the failed update
    pub stress: Vector,

    /// Holds the elastic trial stress of the full (undivided) increment
    pub trial_stress: Vector,

    /// Holds the internal variables at the entry of the failed update
    pub internal_values: Vector,

    /// Holds the plastic multipliers at the entry of the failed update
    pub multipliers: Vector,

    /// Holds the largest subdivision count attempted
    pub subdivisions: usize,
}

impl FailureReport {
    /// Writes a JSON file with this report
    pub fn write_json(&self, full_path: &str) -> Result<(), StrError> {
        let path = std::path::Path::new(full_path);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|_| "cannot create directory")?;
        }
        let mut file = std::fs::File::create(path).map_err(|_| "cannot create report file")?;
        serde_json::to_writer(&mut file, &self).map_err(|_| "cannot write report file")?;
        Ok(())
    }
}

/// Outcome of a single Newton-Raphson substep
enum Substep {
    Converged { iterations: usize, plastic: bool },
    Failed,
}

/// Outcome of one attempt at the full increment with a fixed substep count
struct Attempt {
    sigma: Vector,
    z: Vector,
    ep: Vector,
    lam_last: Vector,
    iterations: usize,
    plastic: bool,
}

/// Implements the implicit stress-return (closest-point-projection) update
///
/// Given a strain increment Δε, the engine forms the elastic trial stress
/// σ_trial = σ + Dₑ:Δε and, when the trial state is inadmissible, solves
///
/// ```text
/// R_ε = Σ λ_s·g_s(σ, z) - Cₑ:(σ_trial - σ) = 0
/// R_f = f_s(σ, z) = 0
/// R_z = (z - z_old) + Σ λ_s·h_s(σ, z) = 0
/// ```
///
/// by Newton-Raphson with a backtracking line search on the merit function.
/// When a substep fails (iteration budget, singular system, or stalled line
/// search) the strain increment is re-attempted in 2, 4, 8, ... equal
/// substeps up to `max_subdivisions`; each attempt restarts from the entry
/// state. The state is only written back after a fully successful attempt.
pub struct ReturnMap {
    model: Box<dyn PlasticityTrait>,
    config: Config,
    rigidity: Matrix,
    compliance: Matrix,
    evaluator: ConstraintEvaluator,
    assembler: JacobianAssembler,
    line_search: LineSearch,
    failure: Option<FailureReport>,
}

impl ReturnMap {
    /// Allocates a new instance
    ///
    /// # Input
    ///
    /// * `config` -- solver configuration (tolerances sized for the model)
    /// * `param` -- plasticity model parameters
    /// * `stiffness` -- elastic stiffness tensor Dₑ (`Mandel::Symmetric`)
    pub fn new(config: &Config, param: &ParamPlasticity, stiffness: &Tensor4) -> Result<Self, StrError> {
        if stiffness.mandel() != Mandel::Symmetric {
            return Err("the elastic stiffness must use Mandel::Symmetric");
        }
        let model = Plasticity::new(param)?;
        let ns = model.n_surfaces();
        let nz = model.n_internal_values();
        let evaluator = ConstraintEvaluator::new(config, ns, nz)?;
        let mut compliance = Matrix::new(NSYM, NSYM);
        mat_inverse(&mut compliance, stiffness.matrix()).map_err(|_| "cannot invert the elastic stiffness")?;
        Ok(ReturnMap {
            model,
            config: config.clone(),
            rigidity: stiffness.matrix().clone(),
            compliance,
            evaluator,
            assembler: JacobianAssembler::new(ns, nz),
            line_search: LineSearch::new(config.factor_min),
            failure: None,
        })
    }

    /// Returns the plasticity model
    pub fn model(&self) -> &dyn PlasticityTrait {
        self.model.as_ref()
    }

    /// Returns the failure report of the last unsuccessful update, if any
    pub fn failure_report(&self) -> Option<&FailureReport> {
        self.failure.as_ref()
    }

    /// Allocates a state with initialized internal variables (zero stress)
    pub fn new_state(&self) -> Result<LocalState, StrError> {
        let ns = self.model.n_surfaces();
        let nz = self.model.n_internal_values();
        let mut state = LocalState::new(ns, nz);
        self.model.initialize_internal_values(&mut state.internal_values)?;
        self.model.yield_function(
            &mut state.yield_values,
            state.stress.vector(),
            &state.internal_values,
        )?;
        Ok(state)
    }

    /// Updates the stress state for a given strain increment
    ///
    /// On success the state carries the converged stress, the accumulated
    /// plastic strain, the updated internal variables, and the iteration and
    /// subdivision counters. On failure the state is left untouched, a
    /// [FailureReport] is recorded, and an error is returned.
    pub fn update_stress(&mut self, state: &mut LocalState, delta_strain: &Tensor2) -> Result<(), StrError> {
        if delta_strain.mandel() != Mandel::Symmetric {
            return Err("the strain increment must use Mandel::Symmetric");
        }
        let sigma_in = state.stress.vector().clone();
        let z_in = state.internal_values.clone();
        let ep_in = state.plastic_strain.vector().clone();
        let deps = delta_strain.vector();
        let mut nsub = 1;
        while nsub <= self.config.max_subdivisions {
            if let Some(att) = self.attempt(&sigma_in, &z_in, &ep_in, deps, nsub)? {
                vec_copy(state.stress.vector_mut(), &att.sigma).unwrap();
                vec_copy(state.plastic_strain.vector_mut(), &att.ep).unwrap();
                vec_copy(&mut state.internal_values, &att.z).unwrap();
                vec_copy(&mut state.algo_lagrange, &att.lam_last).unwrap();
                self.model
                    .yield_function(&mut state.yield_values, &att.sigma, &att.z)?;
                state.elastic = !att.plastic;
                state.iteration_count = att.iterations;
                state.subdivisions = nsub;
                self.failure = None;
                return Ok(());
            }
            nsub *= 2;
        }
        let mut trial = Vector::new(NSYM);
        mat_vec_mul(&mut trial, 1.0, &self.rigidity, deps)?;
        for i in 0..NSYM {
            trial[i] += sigma_in[i];
        }
        self.failure = Some(FailureReport {
            stress: sigma_in,
            trial_stress: trial,
            internal_values: z_in,
            multipliers: state.algo_lagrange.clone(),
            subdivisions: nsub / 2,
        });
        Err("return map exceeded the subdivision budget")
    }

    /// Attempts the full increment with a fixed number of equal substeps
    fn attempt(
        &mut self,
        sigma_in: &Vector,
        z_in: &Vector,
        ep_in: &Vector,
        deps: &Vector,
        nsub: usize,
    ) -> Result<Option<Attempt>, StrError> {
        let ns = self.model.n_surfaces();
        let mut sigma = sigma_in.clone();
        let mut z = z_in.clone();
        let mut ep = ep_in.clone();
        let mut lam_last = Vector::new(ns);
        let mut sub_deps = Vector::new(NSYM);
        for i in 0..NSYM {
            sub_deps[i] = deps[i] / (nsub as f64);
        }
        let mut d_elast = Vector::new(NSYM);
        mat_vec_mul(&mut d_elast, 1.0, &self.rigidity, &sub_deps)?;
        let mut sigma_trial = Vector::new(NSYM);
        let mut iterations = 0;
        let mut plastic = false;
        for _ in 0..nsub {
            for i in 0..NSYM {
                sigma_trial[i] = sigma[i] + d_elast[i];
            }
            match self.substep(&mut sigma, &mut z, &mut ep, &mut lam_last, &sigma_trial)? {
                Substep::Converged { iterations: it, plastic: pl } => {
                    iterations += it;
                    plastic = plastic || pl;
                }
                Substep::Failed => return Ok(None),
            }
        }
        Ok(Some(Attempt {
            sigma,
            z,
            ep,
            lam_last,
            iterations,
            plastic,
        }))
    }

    /// Solves one substep, writing the converged (σ, z) and multipliers back
    fn substep(
        &mut self,
        sigma: &mut Vector,
        z: &mut Vector,
        ep: &mut Vector,
        lam_out: &mut Vector,
        sigma_trial: &Vector,
    ) -> Result<Substep, StrError> {
        let ReturnMap {
            model,
            config,
            compliance,
            evaluator,
            assembler,
            line_search,
            ..
        } = self;
        let model = model.as_ref();
        let ns = model.n_surfaces();
        let nz = model.n_internal_values();
        let n = NSYM + ns + nz;
        // elastic trial acceptance (positive parts only)
        let mut f_trial = Vector::new(ns);
        model.yield_function(&mut f_trial, sigma_trial, z)?;
        if evaluator.trial_merit(&f_trial) < 0.5 {
            vec_copy(sigma, sigma_trial).unwrap();
            lam_out.fill(0.0);
            return Ok(Substep::Converged {
                iterations: 0,
                plastic: false,
            });
        }
        // Newton-Raphson on the stacked unknowns x = [σ, λ, z]
        let z_old = z.clone();
        let mut x = Vector::new(n);
        for i in 0..NSYM {
            x[i] = sigma_trial[i];
        }
        for i in 0..nz {
            x[NSYM + ns + i] = z_old[i];
        }
        let mut res = Residuals::new(ns, nz);
        evaluator.evaluate(&mut res, model, compliance, &x, sigma_trial, &z_old)?;
        let mut merit = evaluator.merit(&res);
        let mut jj = Matrix::new(n, n);
        let mut neg_r = Vector::new(n);
        let mut x_new = Vector::new(n);
        for it in 1..=config.max_iterations {
            assembler.assemble(&mut jj, model, compliance, &x)?;
            for i in 0..NSYM {
                neg_r[i] = -res.direction[i];
            }
            for s in 0..ns {
                neg_r[NSYM + s] = -res.consistency[s];
            }
            for i in 0..nz {
                neg_r[NSYM + ns + i] = -res.internal[i];
            }
            if solve_lin_sys(&mut neg_r, &mut jj).is_err() {
                return Ok(Substep::Failed); // singular system: subdivide
            }
            let found = line_search.find(&mut x_new, &x, &neg_r, merit, |cand| {
                match evaluator.evaluate(&mut res, model, compliance, cand, sigma_trial, &z_old) {
                    Ok(()) => Some(evaluator.merit(&res)),
                    Err(_) => None,
                }
            });
            match found {
                Ok((_, m1)) => {
                    vec_copy(&mut x, &x_new).unwrap();
                    merit = m1;
                }
                Err(_) => return Ok(Substep::Failed),
            }
            if merit < 0.5 {
                for i in 0..NSYM {
                    sigma[i] = x[i];
                }
                for s in 0..ns {
                    lam_out[s] = x[NSYM + s];
                }
                for i in 0..nz {
                    z[i] = x[NSYM + ns + i];
                }
                // εᵖ accumulates Σ λ_s·g_s at the converged state
                let mut g = vec![Vector::new(NSYM); ns];
                model.dg_dsigma(&mut g, sigma, z)?;
                for s in 0..ns {
                    for i in 0..NSYM {
                        ep[i] += lam_out[s] * g[s][i];
                    }
                }
                return Ok(Substep::Converged {
                    iterations: it,
                    plastic: true,
                });
            }
        }
        Ok(Substep::Failed) // iteration budget: subdivide
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
