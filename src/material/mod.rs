//! Implements the implicit stress-return (closest-point-projection) solver
//! and the plasticity models plugged into it

mod constraints;
mod hardening;
mod invariants;
mod jacobian;
mod line_search;
mod local_state;
mod mohr_coulomb;
mod plasticity;
mod plasticity_trait;
mod return_map;
mod smoothing;
mod tensile;
mod verifier;
mod weak_plane_shear;
mod weak_plane_tensile;
pub use crate::material::constraints::*;
pub use crate::material::hardening::*;
pub use crate::material::jacobian::*;
pub use crate::material::line_search::*;
pub use crate::material::local_state::*;
pub use crate::material::mohr_coulomb::*;
pub use crate::material::plasticity::*;
pub use crate::material::plasticity_trait::*;
pub use crate::material::return_map::*;
pub use crate::material::smoothing::*;
pub use crate::material::tensile::*;
pub use crate::material::verifier::*;
pub use crate::material::weak_plane_shear::*;
pub use crate::material::weak_plane_tensile::*;

#[cfg(test)]
mod testing;
