use crate::StrError;

/// Holds configuration data for the implicit stress-return solver
///
/// The yield-function tolerances have stress units and must be sized by the
/// caller; there is no sensible default. The internal-variable and
/// plastic-strain-direction tolerances have the units of the corresponding
/// residuals.
#[derive(Clone, Debug)]
pub struct Config {
    /// Tolerance for each yield function value (stress units)
    pub f_tol: Vec<f64>,

    /// Tolerance for each internal-variable residual
    pub z_tol: Vec<f64>,

    /// Tolerance for the plastic-strain-direction residual (strain units)
    pub eps_tol: f64,

    /// Maximum number of Newton-Raphson iterations per substep (default = 20)
    pub max_iterations: usize,

    /// Maximum number of strain-increment subdivisions (default = 4096)
    ///
    /// The subdivision count doubles on every retry (1, 2, 4, 8, ...).
    pub max_subdivisions: usize,

    /// Minimum step-length factor accepted by the line search (default = 1e-10)
    pub factor_min: f64,
}

impl Config {
    /// Allocates a new instance
    ///
    /// # Input
    ///
    /// * `f_tol` -- one positive tolerance per yield surface (stress units)
    /// * `z_tol` -- one positive tolerance per internal variable
    pub fn new(f_tol: &[f64], z_tol: &[f64]) -> Result<Self, StrError> {
        if f_tol.is_empty() {
            return Err("at least one yield function tolerance is required");
        }
        if f_tol.iter().any(|tol| *tol <= 0.0) {
            return Err("yield function tolerances must be > 0.0");
        }
        if z_tol.iter().any(|tol| *tol <= 0.0) {
            return Err("internal variable tolerances must be > 0.0");
        }
        Ok(Config {
            f_tol: f_tol.to_vec(),
            z_tol: z_tol.to_vec(),
            eps_tol: 1e-8,
            max_iterations: 20,
            max_subdivisions: 4096,
            factor_min: 1e-10,
        })
    }

    /// Sets the tolerance for the plastic-strain-direction residual
    pub fn set_eps_tol(&mut self, value: f64) -> Result<&mut Self, StrError> {
        if value <= 0.0 {
            return Err("eps_tol must be > 0.0");
        }
        self.eps_tol = value;
        Ok(self)
    }

    /// Sets the maximum number of Newton-Raphson iterations per substep
    pub fn set_max_iterations(&mut self, value: usize) -> Result<&mut Self, StrError> {
        if value < 1 {
            return Err("max_iterations must be ≥ 1");
        }
        self.max_iterations = value;
        Ok(self)
    }

    /// Sets the maximum number of strain-increment subdivisions
    pub fn set_max_subdivisions(&mut self, value: usize) -> Result<&mut Self, StrError> {
        if value < 1 {
            return Err("max_subdivisions must be ≥ 1");
        }
        self.max_subdivisions = value;
        Ok(self)
    }

    /// Sets the minimum step-length factor accepted by the line search
    pub fn set_factor_min(&mut self, value: f64) -> Result<&mut Self, StrError> {
        if value <= 0.0 || value >= 1.0 {
            return Err("factor_min must satisfy 0.0 < factor_min < 1.0");
        }
        self.factor_min = value;
        Ok(self)
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
