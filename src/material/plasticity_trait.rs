use crate::StrError;
use russell_lab::{Matrix, Vector};

/// Defines the contract implemented by rate-independent plasticity models
///
/// A model exposes `ns` yield surfaces f_s(σ, z) and `nz` internal variables z
/// with hardening rules ż_i = Σ_s λ̇_s · h_is(σ, z). Stress is given as the
/// 6-component Mandel vector `[σxx, σyy, σzz, √2·σxy, √2·σyz, √2·σxz]`.
///
/// Derivative blocks are written into caller-allocated storage:
///
/// * `df_dsigma`, `dg_dsigma` -- one 6-vector per surface
/// * `df_dz` -- an (ns × nz) matrix
/// * `d2g_dsigma_dsigma` -- one (6 × 6) matrix per surface
/// * `d2g_dsigma_dz` -- 6-vectors indexed by `s * nz + i` (surface-major)
/// * `hardening` -- an (nz × ns) matrix
/// * `dh_dsigma` -- 6-vectors indexed by `i * ns + s` (variable-major)
/// * `dh_dz` -- one (nz × nz) matrix per surface
pub trait PlasticityTrait: Send {
    /// Indicates whether the flow rule is associated (g ≡ f)
    fn associated(&self) -> bool;

    /// Returns the number of yield surfaces
    fn n_surfaces(&self) -> usize;

    /// Returns the number of internal variables
    fn n_internal_values(&self) -> usize;

    /// Initializes the internal variables
    fn initialize_internal_values(&self, z: &mut Vector) -> Result<(), StrError>;

    /// Calculates the yield function values
    fn yield_function(&self, f: &mut Vector, sigma: &Vector, z: &Vector) -> Result<(), StrError>;

    /// Calculates the derivative of the yield functions with respect to stress
    fn df_dsigma(&self, d: &mut [Vector], sigma: &Vector, z: &Vector) -> Result<(), StrError>;

    /// Calculates the derivative of the yield functions with respect to the internal variables
    fn df_dz(&self, d: &mut Matrix, sigma: &Vector, z: &Vector) -> Result<(), StrError>;

    /// Calculates the plastic flow directions g_s = ∂G_s/∂σ
    fn dg_dsigma(&self, d: &mut [Vector], sigma: &Vector, z: &Vector) -> Result<(), StrError>;

    /// Calculates the derivative of the flow directions with respect to stress
    fn d2g_dsigma_dsigma(&self, d: &mut [Matrix], sigma: &Vector, z: &Vector) -> Result<(), StrError>;

    /// Calculates the derivative of the flow directions with respect to the internal variables
    fn d2g_dsigma_dz(&self, d: &mut [Vector], sigma: &Vector, z: &Vector) -> Result<(), StrError>;

    /// Calculates the hardening moduli h_is
    fn hardening(&self, h: &mut Matrix, sigma: &Vector, z: &Vector) -> Result<(), StrError>;

    /// Calculates the derivative of the hardening moduli with respect to stress
    fn dh_dsigma(&self, d: &mut [Vector], sigma: &Vector, z: &Vector) -> Result<(), StrError>;

    /// Calculates the derivative of the hardening moduli with respect to the internal variables
    fn dh_dz(&self, d: &mut [Matrix], sigma: &Vector, z: &Vector) -> Result<(), StrError>;
}
