use serde::{Deserialize, Serialize};

/// Holds parameters for the exponential hardening/softening law
///
/// ```text
/// p(z) = residual + (initial - residual) · exp(-rate · z)
/// ```
///
/// where `z` is the internal (history) variable. A constant property has
/// `residual == initial` or `rate == 0`.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct ParamHardening {
    /// Initial value of the property (at z = 0)
    pub initial: f64,

    /// Residual value approached as z grows
    pub residual: f64,

    /// Softening/hardening rate (≥ 0)
    pub rate: f64,
}

impl ParamHardening {
    /// Returns parameters for a constant (non-evolving) property
    pub fn constant(value: f64) -> Self {
        ParamHardening {
            initial: value,
            residual: value,
            rate: 0.0,
        }
    }
}

/// Holds parameters for the plasticity models
///
/// All angles are given in degrees.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub enum ParamPlasticity {
    /// Mohr-Coulomb model with smoothed tip and Lode-angle edges
    MohrCoulomb {
        /// Cohesion c (stress units, ≥ 0)
        cohesion: ParamHardening,

        /// Friction angle φ in degrees (0 < φ < 90)
        friction: ParamHardening,

        /// Dilation angle ψ in degrees (0 ≤ ψ ≤ φ)
        dilation: ParamHardening,

        /// Tip smoothing constant (stress units, > 0)
        tip_smoother: f64,

        /// Edge smoothing (transition) angle θT in degrees (0 < θT < 30)
        edge_angle: f64,
    },

    /// Tensile (cutoff) model limiting the maximum principal stress
    TensileCutoff {
        /// Tensile strength T (stress units, ≥ 0)
        strength: ParamHardening,

        /// Tip smoothing constant (stress units, > 0)
        tip_smoother: f64,

        /// Edge smoothing (transition) angle θT in degrees (0 < θT < 30)
        edge_angle: f64,
    },

    /// Weak-plane shear model acting on the plane with normal = z-axis
    WeakPlaneShear {
        /// Cohesion c (stress units, ≥ 0)
        cohesion: ParamHardening,

        /// Friction angle φ in degrees (0 < φ < 90)
        friction: ParamHardening,

        /// Dilation angle ψ in degrees (0 ≤ ψ ≤ φ)
        dilation: ParamHardening,

        /// Shear-stress smoothing constant (stress units, > 0)
        tip_smoother: f64,
    },

    /// Weak-plane tensile model limiting the normal stress on the z-plane
    WeakPlaneTensile {
        /// Tensile strength T (stress units, ≥ 0)
        strength: ParamHardening,
    },
}

impl ParamPlasticity {
    /// Returns sample parameters for the Mohr-Coulomb model (associative)
    pub fn sample_mohr_coulomb() -> Self {
        ParamPlasticity::MohrCoulomb {
            cohesion: ParamHardening::constant(10.0),
            friction: ParamHardening::constant(30.0),
            dilation: ParamHardening::constant(30.0),
            tip_smoother: 1.0,
            edge_angle: 25.0,
        }
    }

    /// Returns sample parameters for the Mohr-Coulomb model with cohesion softening
    pub fn sample_mohr_coulomb_softening() -> Self {
        ParamPlasticity::MohrCoulomb {
            cohesion: ParamHardening {
                initial: 10.0,
                residual: 5.0,
                rate: 100.0,
            },
            friction: ParamHardening::constant(30.0),
            dilation: ParamHardening::constant(30.0),
            tip_smoother: 1.0,
            edge_angle: 25.0,
        }
    }

    /// Returns sample parameters for the tensile cutoff model
    pub fn sample_tensile_cutoff() -> Self {
        ParamPlasticity::TensileCutoff {
            strength: ParamHardening::constant(5.0),
            tip_smoother: 0.5,
            edge_angle: 25.0,
        }
    }

    /// Returns sample parameters for the weak-plane shear model (non-associative)
    pub fn sample_weak_plane_shear() -> Self {
        ParamPlasticity::WeakPlaneShear {
            cohesion: ParamHardening::constant(1.0),
            friction: ParamHardening::constant(35.0),
            dilation: ParamHardening::constant(20.0),
            tip_smoother: 0.1,
        }
    }

    /// Returns sample parameters for the weak-plane tensile model with softening
    pub fn sample_weak_plane_tensile() -> Self {
        ParamPlasticity::WeakPlaneTensile {
            strength: ParamHardening {
                initial: 2.0,
                residual: 0.5,
                rate: 10.0,
            },
        }
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
