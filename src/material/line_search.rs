use crate::StrError;
use russell_lab::Vector;

/// Sufficient-decrease constant of the acceptance test
const C_ARMIJO: f64 = 1e-4;

/// Implements a backtracking line search on the merit function
///
/// Given a Newton direction d and the merit m(x) = ½ Σ (r/tol)², the
/// directional derivative along d is slope = -2·m(x) (the direction solves
/// J·d = -r exactly). Steps are accepted under the sufficient-decrease test
///
/// ```text
/// m(x + β·d) ≤ m(x) + c·β·slope
/// ```
///
/// The first backtrack minimizes a quadratic model of m along d; subsequent
/// backtracks minimize a cubic built from the last two evaluations. Every new
/// factor is clamped to [0.1·β, 0.5·β].
pub struct LineSearch {
    factor_min: f64,
}

impl LineSearch {
    /// Allocates a new instance
    ///
    /// `factor_min` is the smallest step factor tried before giving up.
    pub fn new(factor_min: f64) -> Self {
        LineSearch { factor_min }
    }

    /// Finds an acceptable step along the direction d
    ///
    /// Writes x_new = x + β·d and returns (β, merit at x_new). The `eval`
    /// callback computes the merit at a candidate point, returning None when
    /// the point is not evaluable (non-finite residuals).
    pub fn find<F>(
        &self,
        x_new: &mut Vector,
        x: &Vector,
        d: &Vector,
        merit0: f64,
        mut eval: F,
    ) -> Result<(f64, f64), StrError>
    where
        F: FnMut(&Vector) -> Option<f64>,
    {
        let n = x.dim();
        let slope = -2.0 * merit0;
        let mut beta = 1.0;
        let mut beta_prev = 1.0;
        let mut merit_prev = merit0;
        loop {
            for i in 0..n {
                x_new[i] = x[i] + beta * d[i];
            }
            let merit = eval(x_new).filter(|m| m.is_finite());
            if let Some(m1) = merit {
                if m1 <= merit0 + C_ARMIJO * beta * slope {
                    return Ok((beta, m1));
                }
            }
            let beta_new = match merit {
                None => 0.5 * beta,
                Some(m1) => {
                    let raw = if beta == 1.0 && beta_prev == 1.0 {
                        // quadratic model through m(0), m'(0), m(1)
                        -slope / (2.0 * (m1 - merit0 - slope))
                    } else {
                        // cubic model through the last two evaluations
                        let r1 = m1 - merit0 - beta * slope;
                        let r2 = merit_prev - merit0 - beta_prev * slope;
                        let den = beta - beta_prev;
                        let a = (r1 / (beta * beta) - r2 / (beta_prev * beta_prev)) / den;
                        let b = (-beta_prev * r1 / (beta * beta) + beta * r2 / (beta_prev * beta_prev)) / den;
                        if a == 0.0 {
                            -slope / (2.0 * b)
                        } else {
                            let disc = b * b - 3.0 * a * slope;
                            if disc < 0.0 {
                                0.5 * beta
                            } else if b <= 0.0 {
                                (-b + f64::sqrt(disc)) / (3.0 * a)
                            } else {
                                -slope / (b + f64::sqrt(disc))
                            }
                        }
                    };
                    beta_prev = beta;
                    merit_prev = m1;
                    f64::min(f64::max(raw, 0.1 * beta), 0.5 * beta)
                }
            };
            beta = beta_new;
            if beta < self.factor_min {
                return Err("line search cannot reduce the merit function");
            }
        }
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
