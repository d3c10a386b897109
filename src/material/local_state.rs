use crate::StrError;
use russell_lab::{vec_copy, Vector};
use russell_tensor::{Mandel, Tensor2};
use serde::{Deserialize, Serialize};
use std::ffi::OsStr;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Holds the local (integration-point) state of an elastoplastic material
///
/// All tensors use the 6-component Mandel representation (`Mandel::Symmetric`).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LocalState {
    /// Holds the stress tensor σ
    pub stress: Tensor2,

    /// Holds the accumulated plastic strain tensor εᵖ
    pub plastic_strain: Tensor2,

    /// Holds the internal (hardening) variables z
    pub internal_values: Vector,

    /// Holds the yield function values evaluated at the current state
    pub yield_values: Vector,

    /// Holds the plastic multipliers Δλ of the last converged substep
    pub algo_lagrange: Vector,

    /// Indicates that the last strain increment was purely elastic
    pub elastic: bool,

    /// Holds the total number of Newton-Raphson iterations of the last update
    pub iteration_count: usize,

    /// Holds the number of substeps used by the last update (power of two)
    pub subdivisions: usize,
}

impl LocalState {
    /// Allocates a new instance with zeroed tensors
    ///
    /// # Input
    ///
    /// * `n_surfaces` -- number of yield surfaces of the plasticity model
    /// * `n_internal_values` -- number of internal (hardening) variables
    pub fn new(n_surfaces: usize, n_internal_values: usize) -> Self {
        LocalState {
            stress: Tensor2::new(Mandel::Symmetric),
            plastic_strain: Tensor2::new(Mandel::Symmetric),
            internal_values: Vector::new(n_internal_values),
            yield_values: Vector::new(n_surfaces),
            algo_lagrange: Vector::new(n_surfaces),
            elastic: true,
            iteration_count: 0,
            subdivisions: 0,
        }
    }

    /// Copies the contents of another state into this one
    pub fn mirror(&mut self, other: &LocalState) {
        self.stress.set_tensor(1.0, &other.stress);
        self.plastic_strain.set_tensor(1.0, &other.plastic_strain);
        vec_copy(&mut self.internal_values, &other.internal_values).unwrap();
        vec_copy(&mut self.yield_values, &other.yield_values).unwrap();
        vec_copy(&mut self.algo_lagrange, &other.algo_lagrange).unwrap();
        self.elastic = other.elastic;
        self.iteration_count = other.iteration_count;
        self.subdivisions = other.subdivisions;
    }

    /// Reads a JSON file containing a state
    pub fn read_json<P>(full_path: &P) -> Result<Self, StrError>
    where
        P: AsRef<OsStr> + ?Sized,
    {
        let path = Path::new(full_path).to_path_buf();
        let file = File::open(path).map_err(|_| "cannot open state file")?;
        let reader = BufReader::new(file);
        let state = serde_json::from_reader(reader).map_err(|_| "cannot parse state file")?;
        Ok(state)
    }

    /// Writes a JSON file with this state
    pub fn write_json<P>(&self, full_path: &P) -> Result<(), StrError>
    where
        P: AsRef<OsStr> + ?Sized,
    {
        let path = Path::new(full_path).to_path_buf();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|_| "cannot create directory")?;
        }
        let mut file = File::create(&path).map_err(|_| "cannot create state file")?;
        serde_json::to_writer(&mut file, &self).map_err(|_| "cannot write state file")?;
        Ok(())
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::LocalState;

    #[test]
    fn new_and_mirror_work() {
        let mut a = LocalState::new(1, 1);
        a.stress.vector_mut()[0] = -10.0;
        a.stress.vector_mut()[3] = 2.0;
        a.internal_values[0] = 0.04;
        a.algo_lagrange[0] = 0.01;
        a.elastic = false;
        a.iteration_count = 5;
        a.subdivisions = 2;
        let mut b = LocalState::new(1, 1);
        b.mirror(&a);
        assert_eq!(b.stress.vector()[0], -10.0);
        assert_eq!(b.stress.vector()[3], 2.0);
        assert_eq!(b.internal_values[0], 0.04);
        assert_eq!(b.algo_lagrange[0], 0.01);
        assert!(!b.elastic);
        assert_eq!(b.iteration_count, 5);
        assert_eq!(b.subdivisions, 2);
    }

    #[test]
    fn serde_round_trip_works() {
        let mut a = LocalState::new(1, 1);
        a.stress.vector_mut()[2] = -30.0;
        a.plastic_strain.vector_mut()[2] = -0.001;
        a.yield_values[0] = -2.5;
        let json = serde_json::to_string(&a).unwrap();
        let b: LocalState = serde_json::from_str(&json).unwrap();
        assert_eq!(b.stress.vector()[2], -30.0);
        assert_eq!(b.plastic_strain.vector()[2], -0.001);
        assert_eq!(b.yield_values[0], -2.5);
        assert!(b.elastic);
    }

    #[test]
    fn read_write_json_work() {
        let mut a = LocalState::new(1, 1);
        a.stress.vector_mut()[0] = 123.0;
        let path = "/tmp/geoplast/test_local_state.json";
        a.write_json(path).unwrap();
        let b = LocalState::read_json(path).unwrap();
        assert_eq!(b.stress.vector()[0], 123.0);
    }
}
