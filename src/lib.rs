/// Defines a type alias for the error type as a static string
pub type StrError = &'static str;

pub mod base;
pub mod material;

pub mod prelude {
    //! Makes the most commonly used structures available

    pub use crate::base::{Config, ParamHardening, ParamPlasticity};
    pub use crate::material::{DerivativeVerifier, LocalState, Plasticity, PlasticityTrait, ReturnMap};
    pub use crate::StrError;
}
