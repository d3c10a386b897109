//! Implements the base structures: configuration and parameters

mod config;
mod parameters;
pub use crate::base::config::*;
pub use crate::base::parameters::*;
