use super::{DerivativeVerifier, PlasticityTrait};
use crate::material::invariants::NSYM;
use russell_lab::{mat_inverse, Matrix, Vector};
use russell_tensor::LinElasticity;

/// Returns the 3D elastic stiffness and compliance matrices (6 × 6 Mandel)
pub(crate) fn elastic_matrices(young: f64, poisson: f64) -> (Matrix, Matrix) {
    let ela = LinElasticity::new(young, poisson, false, false);
    let dd = ela.get_modulus().matrix().clone();
    let mut cc = Matrix::new(NSYM, NSYM);
    mat_inverse(&mut cc, &dd).unwrap();
    (dd, cc)
}

/// Checks every derivative callback of a model against central differences
pub(crate) fn check_model_derivatives(model: &dyn PlasticityTrait, sigma: &Vector, z: &Vector, tol: f64) {
    let verifier = DerivativeVerifier::new();
    let report = verifier.verify(model, sigma, z).unwrap();
    assert!(
        report.worst() < tol,
        "derivative deviation too large: {:?}",
        report
    );
}
