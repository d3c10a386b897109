use crate::material::invariants::{
    deriv1_sin3_lode, deriv2_sin3_lode, deviator, jj2, jj3, sin3_lode, NSYM,
};
use crate::StrError;
use russell_lab::{Matrix, Vector};
use russell_tensor::P_SYMDEV;

/// Below this J2 the Lode angle is frozen at t = 0 (hydrostatic axis)
const J2_CUTOFF: f64 = 1e-10;

/// Allowance on the convexity margin of the edge polynomial
const CONVEXITY_ALLOWANCE: f64 = 1e-3;

/// Holds the deviatoric part of a smoothed cone and its derivatives
///
/// The cone function is
///
/// ```text
/// W(σ, k) = √(J2 K(θ,k)² + tip²)
/// ```
///
/// where `K` is the smoothed Lode-angle shape function and `k` is the
/// friction-like constant of the owning yield surface.
#[derive(Clone, Debug)]
pub struct ConeTerms {
    /// The value W
    pub value: f64,

    /// The gradient dW/dσ (Mandel components)
    pub grad: Vector,

    /// The Hessian d²W/dσ²
    pub hess: Matrix,

    /// The derivative dW/dk
    pub value_k: f64,

    /// The mixed derivative d(dW/dσ)/dk
    pub grad_k: Vector,
}

impl ConeTerms {
    /// Allocates a new instance (zeroed)
    pub fn new() -> Self {
        ConeTerms {
            value: 0.0,
            grad: Vector::new(NSYM),
            hess: Matrix::new(NSYM, NSYM),
            value_k: 0.0,
            grad_k: Vector::new(NSYM),
        }
    }
}

/// Implements the hyperbolic tip and Lode-angle edge smoothing of conical yield surfaces
///
/// Away from the edges (|sin3θ| ≤ sin3θT) the shape function is the exact
/// cone K(θ) = cosθ - k·sinθ. Inside the edge bands it is replaced by a
/// quadratic in t = sin3θ matching K, dK/dθ, and d²K/dθ² at the transition,
/// which makes W twice continuously differentiable everywhere. The tip
/// constant rounds off the apex so that W ≥ tip > 0 on the hydrostatic axis.
#[derive(Clone, Copy, Debug)]
pub struct SmoothedCone {
    tip: f64,
    sin3tt: f64,
    cos3tt: f64,
}

impl SmoothedCone {
    /// Allocates a new instance
    ///
    /// # Input
    ///
    /// * `tip` -- tip smoothing constant (stress units, > 0)
    /// * `edge_angle` -- transition angle θT in degrees, 0 < θT < 30
    pub fn new(tip: f64, edge_angle: f64) -> Result<Self, StrError> {
        if !tip.is_finite() || tip <= 0.0 {
            return Err("tip smoothing constant must be > 0.0");
        }
        if !edge_angle.is_finite() || edge_angle <= 0.0 || edge_angle >= 30.0 {
            return Err("edge transition angle must satisfy 0 < θT < 30 degrees");
        }
        let rad = 3.0 * edge_angle * std::f64::consts::PI / 180.0;
        Ok(SmoothedCone {
            tip,
            sin3tt: f64::sin(rad),
            cos3tt: f64::cos(rad),
        })
    }

    /// Returns the tip smoothing constant
    pub fn tip(&self) -> f64 {
        self.tip
    }

    /// Calculates the coefficients of the edge polynomial K̃ = A + B·t + C·t²
    ///
    /// Also returns the derivatives of (A, B, C) with respect to k. The
    /// polynomial matches K, dK/dθ, and d²K/dθ² at θE = sign·θT.
    fn edge_coefficients(&self, k: f64, sign: f64) -> (f64, f64, f64, f64, f64, f64) {
        let t_e = sign * self.sin3tt;
        let c_e = self.cos3tt;
        let theta_e = sign * f64::asin(self.sin3tt) / 3.0;
        let (sin_e, cos_e) = (f64::sin(theta_e), f64::cos(theta_e));
        let d0 = cos_e - k * sin_e;
        let d1 = -sin_e - k * cos_e;
        let d2 = -d0;
        let cc = (d2 + 3.0 * t_e * d1 / c_e) / (18.0 * c_e * c_e);
        let bb = d1 / (3.0 * c_e) - 2.0 * cc * t_e;
        let aa = d0 - bb * t_e - cc * t_e * t_e;
        // the coefficients are linear in k
        let (e0, e1, e2) = (-sin_e, -cos_e, sin_e);
        let cck = (e2 + 3.0 * t_e * e1 / c_e) / (18.0 * c_e * c_e);
        let bbk = e1 / (3.0 * c_e) - 2.0 * cck * t_e;
        let aak = e0 - bbk * t_e - cck * t_e * t_e;
        (aa, bb, cc, aak, bbk, cck)
    }

    /// Calculates the shape function K and its derivatives at t = sin3θ
    ///
    /// Returns (K, dK/dt, d²K/dt², dK/dk, d²K/dtdk).
    fn kappa(&self, t: f64, k: f64) -> (f64, f64, f64, f64, f64) {
        if f64::abs(t) <= self.sin3tt {
            let theta = f64::asin(t) / 3.0;
            let u = 3.0 * theta;
            let (sin_t, cos_t) = (f64::sin(theta), f64::cos(theta));
            let cos_u = f64::cos(u);
            let kk = cos_t - k * sin_t;
            let k_th = -sin_t - k * cos_t;
            let kt = k_th / (3.0 * cos_u);
            let ktt = -kk / (9.0 * cos_u * cos_u) + k_th * f64::sin(u) / (3.0 * cos_u * cos_u * cos_u);
            let kk_k = -sin_t;
            let ktk = -cos_t / (3.0 * cos_u);
            return (kk, kt, ktt, kk_k, ktk);
        }
        let sign = if t >= 0.0 { 1.0 } else { -1.0 };
        let (aa, bb, cc, aak, bbk, cck) = self.edge_coefficients(k, sign);
        (
            aa + bb * t + cc * t * t,
            bb + 2.0 * cc * t,
            2.0 * cc,
            aak + bbk * t + cck * t * t,
            bbk + 2.0 * cck * t,
        )
    }

    /// Evaluates W and its derivatives at the given stress and friction constant
    pub fn eval(&self, terms: &mut ConeTerms, sigma: &Vector, k: f64) {
        let mut s = Vector::new(NSYM);
        deviator(&mut s, sigma);
        let j2 = jj2(&s);
        let mut gt = Vector::new(NSYM);
        let mut ht = Matrix::new(NSYM, NSYM);
        let (kk, kt, ktt, kk_k, ktk) = if j2 <= J2_CUTOFF {
            // frozen Lode angle near the hydrostatic axis
            let (kk, _, _, kk_k, _) = self.kappa(0.0, k);
            (kk, 0.0, 0.0, kk_k, 0.0)
        } else {
            let j3 = jj3(&s);
            let t = sin3_lode(j2, j3);
            deriv1_sin3_lode(&mut gt, &s, j2, j3);
            deriv2_sin3_lode(&mut ht, &s, j2, j3);
            self.kappa(t, k)
        };
        let w = f64::sqrt(j2 * kk * kk + self.tip * self.tip);
        // P = dW²/dσ = K² s + 2 J2 K Kt gt, W = √(…): grad = P/(2W)
        let mut pp = Vector::new(NSYM);
        for i in 0..NSYM {
            pp[i] = kk * kk * s[i] + 2.0 * j2 * kk * kt * gt[i];
        }
        terms.value = w;
        for i in 0..NSYM {
            terms.grad[i] = pp[i] / (2.0 * w);
        }
        for i in 0..NSYM {
            for j in 0..NSYM {
                let dp = 2.0 * kk * kt * (s[i] * gt[j] + gt[i] * s[j])
                    + kk * kk * P_SYMDEV[i][j]
                    + 2.0 * j2 * (kt * kt + kk * ktt) * gt[i] * gt[j]
                    + 2.0 * j2 * kk * kt * ht.get(i, j);
                terms
                    .hess
                    .set(i, j, dp / (2.0 * w) - pp[i] * pp[j] / (4.0 * w * w * w));
            }
        }
        terms.value_k = j2 * kk * kk_k / w;
        for i in 0..NSYM {
            let dp_dk = 2.0 * kk * kk_k * s[i] + 2.0 * j2 * (kk_k * kt + kk * ktk) * gt[i];
            terms.grad_k[i] = dp_dk / (2.0 * w) - terms.value_k * pp[i] / (2.0 * w * w);
        }
    }

    /// Checks that the smoothed surface remains convex up to a given friction constant
    ///
    /// The edge polynomial can lose convexity for steep cones combined with a
    /// small transition angle. The check evaluates the worst value of
    /// (K̃ + K̃'') over both edge bands and rejects the combination when it
    /// falls below the allowance.
    pub fn check_convexity(&self, k_max: f64) -> Result<(), StrError> {
        let mut worst = f64::INFINITY;
        for sign in [1.0, -1.0] {
            let (aa, bb, cc, _, _, _) = self.edge_coefficients(k_max, sign);
            // lower bound on K̃ + K̃'' over the band, quadratic in t
            let q = |t: f64| (aa + 18.0 * cc) - 8.0 * bb * t - 35.0 * cc * t * t;
            let (lo, hi) = if sign > 0.0 {
                (self.sin3tt, 1.0)
            } else {
                (-1.0, -self.sin3tt)
            };
            worst = f64::min(worst, f64::min(q(lo), q(hi)));
            if f64::abs(cc) > 1e-14 {
                let ts = -8.0 * bb / (70.0 * cc);
                if ts >= lo && ts <= hi {
                    worst = f64::min(worst, q(ts));
                }
            }
        }
        if worst < -CONVEXITY_ALLOWANCE {
            return Err("edge smoothing loses convexity; increase the transition angle");
        }
        Ok(())
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
