use crate::base::ParamHardening;
use crate::StrError;

/// Implements the exponential hardening/softening law
///
/// ```text
/// p(z) = residual + (initial - residual) · exp(-rate · z)
/// ```
///
/// This law drives cohesion, friction angle, dilation angle, and tensile
/// strength in the plasticity models; each property carries its own instance.
#[derive(Clone, Copy, Debug)]
pub struct ExponentialHardening {
    initial: f64,
    residual: f64,
    rate: f64,
}

impl ExponentialHardening {
    /// Allocates a new instance
    pub fn new(param: &ParamHardening) -> Result<Self, StrError> {
        if !param.initial.is_finite() || !param.residual.is_finite() || !param.rate.is_finite() {
            return Err("hardening parameters must be finite");
        }
        if param.rate < 0.0 {
            return Err("hardening rate must be ≥ 0.0");
        }
        Ok(ExponentialHardening {
            initial: param.initial,
            residual: param.residual,
            rate: param.rate,
        })
    }

    /// Returns the initial value (at z = 0)
    pub fn initial(&self) -> f64 {
        self.initial
    }

    /// Returns the residual value (as z → ∞)
    pub fn residual(&self) -> f64 {
        self.residual
    }

    /// Calculates the property value at a given internal variable
    pub fn value(&self, z: f64) -> f64 {
        self.residual + (self.initial - self.residual) * f64::exp(-self.rate * z)
    }

    /// Calculates the derivative of the property with respect to the internal variable
    pub fn deriv(&self, z: f64) -> f64 {
        -self.rate * (self.initial - self.residual) * f64::exp(-self.rate * z)
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
