use geoplast::material::FailureReport;
use geoplast::prelude::*;
use russell_lab::*;
use geoplast::StrError;
use russell_tensor::{LinElasticity, Mandel, Tensor2, SQRT_2};

// Structural properties of the stress-return engine
//
// These tests exercise the engine across sequences of increments and failure
// paths, checking the properties that must hold for any admissible update:
// non-negative multipliers, yield values within tolerance, power-of-two
// subdivision counts, and state serialization that survives a round trip.

const YOUNG: f64 = 1500.0;
const POISSON: f64 = 0.3;

fn strain_increment_for_trial(target: &[f64]) -> Result<Tensor2, StrError> {
    let ela = LinElasticity::new(YOUNG, POISSON, false, false);
    let mut cc = Matrix::new(6, 6);
    mat_inverse(&mut cc, ela.get_modulus().matrix())?;
    let mut deps = Vector::new(6);
    mat_vec_mul(&mut deps, 1.0, &cc, &Vector::from(&target))?;
    let mut t = Tensor2::new(Mandel::Symmetric);
    for i in 0..6 {
        t.vector_mut()[i] = deps[i];
    }
    Ok(t)
}

fn new_engine(config: &Config, param: &ParamPlasticity) -> Result<ReturnMap, StrError> {
    let ela = LinElasticity::new(YOUNG, POISSON, false, false);
    ReturnMap::new(config, param, ela.get_modulus())
}

#[test]
fn test_sequential_loading_stays_admissible() -> Result<(), StrError> {
    // four equal compressive increments: the first is elastic, the rest
    // return to the surface while the internal variable accumulates
    let config = Config::new(&[1e-6], &[1e-8])?;
    let mut engine = new_engine(&config, &ParamPlasticity::sample_mohr_coulomb())?;
    let mut state = engine.new_state()?;
    let deps = strain_increment_for_trial(&[-4.0, -4.0, -28.0, 0.0, 0.0, 0.0])?;
    let mut z_prev = 0.0;
    for step in 0..4 {
        engine.update_stress(&mut state, &deps)?;
        assert!(state.algo_lagrange[0] >= 0.0);
        assert!(state.yield_values[0] < 1e-6);
        // the subdivision count is always a power of two
        let n = state.subdivisions;
        assert!(n >= 1 && n & (n - 1) == 0);
        // z never decreases along the path
        assert!(state.internal_values[0] >= z_prev);
        z_prev = state.internal_values[0];
        if step == 0 {
            assert!(state.elastic);
            assert_eq!(state.iteration_count, 0);
        } else {
            assert!(!state.elastic);
        }
    }
    approx_eq(state.internal_values[0], 0.013746667066326877, 1e-9);
    approx_eq(state.algo_lagrange[0], 0.006842285511793843, 1e-9);
    let sigma = state.stress.vector();
    approx_eq(sigma[0], -28.006491436951, 1e-6);
    approx_eq(sigma[1], -28.006491436951, 1e-6);
    approx_eq(sigma[2], -113.76201787546, 1e-6);
    let ep = state.plastic_strain.vector();
    approx_eq(ep[0], 0.005250625728, 1e-8);
    approx_eq(ep[2], -0.003627917923, 1e-8);
    Ok(())
}

#[test]
fn test_failure_report_can_be_written_and_replayed() -> Result<(), StrError> {
    let mut config = Config::new(&[1e-6], &[1e-8])?;
    config.set_max_iterations(2)?.set_max_subdivisions(2)?;
    let mut engine = new_engine(&config, &ParamPlasticity::sample_mohr_coulomb())?;
    let mut state = engine.new_state()?;
    let deps = strain_increment_for_trial(&[30.0, 30.0, 24.0, 0.0, 0.0, 0.0])?;
    assert_eq!(
        engine.update_stress(&mut state, &deps).err(),
        Some("return map exceeded the subdivision budget")
    );
    let report = engine.failure_report().unwrap();
    assert_eq!(report.subdivisions, 2);
    let path = "/tmp/geoplast/test_failure_report.json";
    report.write_json(path)?;
    let text = std::fs::read_to_string(path).map_err(|_| "cannot read report file")?;
    let replay: FailureReport = serde_json::from_str(&text).map_err(|_| "cannot parse report file")?;
    approx_eq(replay.trial_stress[0], 30.0, 1e-12);
    approx_eq(replay.trial_stress[2], 24.0, 1e-12);
    // the recorded trial state can be probed by the derivative verifier
    let verifier = DerivativeVerifier::new();
    let check = verifier.verify(engine.model(), &replay.trial_stress, &replay.internal_values)?;
    assert!(check.worst() < 1e-5);
    // ... and fed into the Jacobian cross-check
    let ela = LinElasticity::new(YOUNG, POISSON, false, false);
    let mut cc = Matrix::new(6, 6);
    mat_inverse(&mut cc, ela.get_modulus().matrix())?;
    let mut x = Vector::new(8);
    for i in 0..6 {
        x[i] = replay.trial_stress[i];
    }
    x[6] = 0.01; // probe at a non-zero multiplier
    x[7] = replay.internal_values[0];
    let jac = verifier.verify_jacobian(engine.model(), &cc, &x, &replay.trial_stress, &replay.internal_values)?;
    assert!(jac.worst() < 1e-5);
    Ok(())
}

#[test]
fn test_derivative_verifier_accepts_all_models() -> Result<(), StrError> {
    // stress sweep spanning admissible and inadmissible states, edge-band
    // (axisymmetric) and off-edge Lode angles, tension and compression
    let stresses = [
        Vector::from(&[-10.0, -12.0, -60.0, 2.0, 1.0, -3.0]),
        Vector::from(&[30.0, 30.0, 24.0, 0.0, 0.0, 0.0]),
        Vector::from(&[-5.0, -4.0, -3.0, 1.0, 0.5, 0.2]),
        Vector::from(&[5.0, 1.0, -3.0, 0.8, 0.3, -0.4]),
        Vector::from(&[0.1, 7.0, -2.5, -1.2, 0.9, 2.2]),
        Vector::from(&[-3.0, -3.0, -2.0, 0.0, 2.0 * SQRT_2, 3.0 * SQRT_2]),
    ];
    let params = [
        (ParamPlasticity::sample_mohr_coulomb(), Vector::from(&[0.0])),
        (ParamPlasticity::sample_mohr_coulomb_softening(), Vector::from(&[0.003])),
        (ParamPlasticity::sample_tensile_cutoff(), Vector::from(&[0.02])),
        (ParamPlasticity::sample_weak_plane_shear(), Vector::from(&[0.001])),
        (ParamPlasticity::sample_weak_plane_tensile(), Vector::from(&[0.001])),
    ];
    let verifier = DerivativeVerifier::new();
    for (param, z) in &params {
        let model = Plasticity::new(param)?;
        for sigma in &stresses {
            let report = verifier.verify(model.as_ref(), sigma, z)?;
            assert!(report.worst() < 1e-5, "model failed at {:?}: {:?}", sigma, report);
        }
    }
    Ok(())
}

#[test]
fn test_state_survives_a_json_round_trip() -> Result<(), StrError> {
    let config = Config::new(&[1e-6], &[1e-8])?;
    let mut engine = new_engine(&config, &ParamPlasticity::sample_mohr_coulomb())?;
    let mut state = engine.new_state()?;
    let deps = strain_increment_for_trial(&[-10.0, -10.0, -80.0, 0.0, 0.0, 0.0])?;
    engine.update_stress(&mut state, &deps)?;
    let path = "/tmp/geoplast/test_state_round_trip.json";
    state.write_json(path)?;
    let loaded = LocalState::read_json(path)?;
    for i in 0..6 {
        assert_eq!(loaded.stress.vector()[i], state.stress.vector()[i]);
        assert_eq!(loaded.plastic_strain.vector()[i], state.plastic_strain.vector()[i]);
    }
    assert_eq!(loaded.internal_values[0], state.internal_values[0]);
    assert_eq!(loaded.algo_lagrange[0], state.algo_lagrange[0]);
    assert_eq!(loaded.yield_values[0], state.yield_values[0]);
    assert_eq!(loaded.elastic, state.elastic);
    assert_eq!(loaded.iteration_count, state.iteration_count);
    assert_eq!(loaded.subdivisions, state.subdivisions);
    Ok(())
}
