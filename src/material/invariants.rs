use russell_lab::{Matrix, Vector};
use russell_tensor::{IDENTITY2, P_SYMDEV, SQRT_2, SQRT_3};

/// Number of components of a symmetric tensor in Mandel representation (3D)
pub(crate) const NSYM: usize = 6;

/// Coefficient of the Lode invariant: t = -(3√3/2) J3 / J2^(3/2)
const LODE_COEF: f64 = 3.0 * SQRT_3 / 2.0;

/// Calculates the deviator s = dev(v) of a Mandel vector
pub(crate) fn deviator(s: &mut Vector, v: &Vector) {
    let mean = (v[0] + v[1] + v[2]) / 3.0;
    for i in 0..NSYM {
        s[i] = v[i] - mean * IDENTITY2[i];
    }
}

/// Calculates J2 = ½ s:s given the deviator
pub(crate) fn jj2(s: &Vector) -> f64 {
    let mut sum = 0.0;
    for i in 0..NSYM {
        sum += s[i] * s[i];
    }
    0.5 * sum
}

/// Calculates J3 = det(s) given the deviator
pub(crate) fn jj3(s: &Vector) -> f64 {
    let (a, b, c) = (s[0], s[1], s[2]);
    let (p, q, r) = (s[3] / SQRT_2, s[4] / SQRT_2, s[5] / SQRT_2);
    a * (b * c - q * q) - p * (p * c - q * r) + r * (p * q - b * r)
}

/// Calculates the Mandel components of s·s given the deviator
fn squared(y: &mut Vector, s: &Vector) {
    let (a, b, c, x3, x4, x5) = (s[0], s[1], s[2], s[3], s[4], s[5]);
    y[0] = a * a + (x3 * x3 + x5 * x5) / 2.0;
    y[1] = b * b + (x3 * x3 + x4 * x4) / 2.0;
    y[2] = c * c + (x4 * x4 + x5 * x5) / 2.0;
    y[3] = x3 * (a + b) + x4 * x5 / SQRT_2;
    y[4] = x4 * (b + c) + x3 * x5 / SQRT_2;
    y[5] = x5 * (a + c) + x3 * x4 / SQRT_2;
}

/// Calculates the Jacobian of the map s ↦ s·s (Mandel components)
fn squared_jacobian(m: &mut Matrix, s: &Vector) {
    let (a, b, c, x3, x4, x5) = (s[0], s[1], s[2], s[3], s[4], s[5]);
    let rows = [
        [2.0 * a, 0.0, 0.0, x3, 0.0, x5],
        [0.0, 2.0 * b, 0.0, x3, x4, 0.0],
        [0.0, 0.0, 2.0 * c, 0.0, x4, x5],
        [x3, x3, 0.0, a + b, x5 / SQRT_2, x4 / SQRT_2],
        [0.0, x4, x4, x5 / SQRT_2, b + c, x3 / SQRT_2],
        [x5, 0.0, x5, x4 / SQRT_2, x3 / SQRT_2, a + c],
    ];
    for i in 0..NSYM {
        for j in 0..NSYM {
            m.set(i, j, rows[i][j]);
        }
    }
}

/// Calculates dJ3/dσ = dev(s·s) given the deviator and J2
pub(crate) fn deriv1_jj3(d1: &mut Vector, s: &Vector, j2: f64) {
    squared(d1, s);
    for i in 0..NSYM {
        d1[i] -= (2.0 / 3.0) * j2 * IDENTITY2[i];
    }
}

/// Calculates d²J3/dσ² given the deviator
pub(crate) fn deriv2_jj3(d2: &mut Matrix, s: &Vector) {
    let mut msq = Matrix::new(NSYM, NSYM);
    squared_jacobian(&mut msq, s);
    for i in 0..NSYM {
        for j in 0..NSYM {
            let mut sum = 0.0;
            for l in 0..NSYM {
                sum += msq.get(i, l) * P_SYMDEV[l][j];
            }
            d2.set(i, j, sum - (2.0 / 3.0) * IDENTITY2[i] * s[j]);
        }
    }
}

/// Calculates the Lode invariant t = sin3θ = -(3√3/2) J3 / J2^(3/2)
///
/// Returns a value in [-1, 1]; +1 at triaxial compression, -1 at triaxial extension.
pub(crate) fn sin3_lode(j2: f64, j3: f64) -> f64 {
    let t = -LODE_COEF * j3 / f64::powf(j2, 1.5);
    f64::max(-1.0, f64::min(1.0, t))
}

/// Calculates d(sin3θ)/dσ given the deviator and J2, J3
pub(crate) fn deriv1_sin3_lode(d1: &mut Vector, s: &Vector, j2: f64, j3: f64) {
    deriv1_jj3(d1, s, j2); // d1 ← dJ3/dσ
    let c1 = -LODE_COEF / f64::powf(j2, 1.5);
    let c2 = LODE_COEF * 1.5 * j3 / f64::powf(j2, 2.5);
    for i in 0..NSYM {
        d1[i] = c1 * d1[i] + c2 * s[i]; // dJ2/dσ = s
    }
}

/// Calculates d²(sin3θ)/dσ² given the deviator and J2, J3
pub(crate) fn deriv2_sin3_lode(d2: &mut Matrix, s: &Vector, j2: f64, j3: f64) {
    let mut g3 = Vector::new(NSYM);
    deriv1_jj3(&mut g3, s, j2);
    deriv2_jj3(d2, s); // d2 ← d²J3/dσ²
    let c1 = -LODE_COEF / f64::powf(j2, 1.5);
    let c2 = LODE_COEF * 1.5 / f64::powf(j2, 2.5);
    let c3 = LODE_COEF * 1.5 * j3 / f64::powf(j2, 2.5);
    let c4 = -LODE_COEF * 3.75 * j3 / f64::powf(j2, 3.5);
    for i in 0..NSYM {
        for j in 0..NSYM {
            let val = c1 * d2.get(i, j)
                + c2 * (g3[i] * s[j] + s[i] * g3[j])
                + c3 * P_SYMDEV[i][j]
                + c4 * s[i] * s[j];
            d2.set(i, j, val);
        }
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;
    use russell_lab::{approx_eq, Vector};

    // probe states away from the hydrostatic axis and the Lode edges
    fn probes() -> Vec<Vector> {
        vec![
            Vector::from(&[2.0, -1.0, 0.5, 0.8, -0.3, 0.4]),
            Vector::from(&[-10.0, -12.0, -60.0, 2.0, 1.0, -3.0]),
            Vector::from(&[5.0, 1.0, -3.0, 0.8, 0.3, -0.4]),
            Vector::from(&[0.1, 7.0, -2.5, -1.2, 0.9, 2.2]),
        ]
    }

    fn num_deriv1<F>(fun: F, v: &Vector, h: f64) -> Vector
    where
        F: Fn(&Vector) -> f64,
    {
        let mut d = Vector::new(NSYM);
        for i in 0..NSYM {
            let mut vp = v.clone();
            let mut vm = v.clone();
            vp[i] += h;
            vm[i] -= h;
            d[i] = (fun(&vp) - fun(&vm)) / (2.0 * h);
        }
        d
    }

    fn jj2_of(v: &Vector) -> f64 {
        let mut s = Vector::new(NSYM);
        deviator(&mut s, v);
        jj2(&s)
    }

    fn jj3_of(v: &Vector) -> f64 {
        let mut s = Vector::new(NSYM);
        deviator(&mut s, v);
        jj3(&s)
    }

    fn lode_of(v: &Vector) -> f64 {
        sin3_lode(jj2_of(v), jj3_of(v))
    }

    #[test]
    fn jj2_and_jj3_work() {
        // diag(2, -1, -1): J2 = 3, J3 = 2
        let v = Vector::from(&[2.0, -1.0, -1.0, 0.0, 0.0, 0.0]);
        approx_eq(jj2_of(&v), 3.0, 1e-15);
        approx_eq(jj3_of(&v), 2.0, 1e-15);
        // triaxial extension: t = -1; triaxial compression: t = +1
        approx_eq(lode_of(&v), -1.0, 1e-14);
        let v = Vector::from(&[-2.0, 1.0, 1.0, 0.0, 0.0, 0.0]);
        approx_eq(lode_of(&v), 1.0, 1e-14);
    }

    #[test]
    fn deriv1_jj3_works() {
        for v in &probes() {
            let mut s = Vector::new(NSYM);
            deviator(&mut s, v);
            let mut ana = Vector::new(NSYM);
            deriv1_jj3(&mut ana, &s, jj2(&s));
            let num = num_deriv1(jj3_of, v, 1e-6);
            for i in 0..NSYM {
                approx_eq(ana[i], num[i], 1e-8);
            }
        }
    }

    #[test]
    fn deriv2_jj3_works() {
        for v in &probes() {
            let mut s = Vector::new(NSYM);
            deviator(&mut s, v);
            let mut ana = Matrix::new(NSYM, NSYM);
            deriv2_jj3(&mut ana, &s);
            let h = 1e-6;
            for j in 0..NSYM {
                let mut vp = v.clone();
                let mut vm = v.clone();
                vp[j] += h;
                vm[j] -= h;
                let mut sp = Vector::new(NSYM);
                let mut sm = Vector::new(NSYM);
                deviator(&mut sp, &vp);
                deviator(&mut sm, &vm);
                let mut gp = Vector::new(NSYM);
                let mut gm = Vector::new(NSYM);
                deriv1_jj3(&mut gp, &sp, jj2(&sp));
                deriv1_jj3(&mut gm, &sm, jj2(&sm));
                for i in 0..NSYM {
                    approx_eq(ana.get(i, j), (gp[i] - gm[i]) / (2.0 * h), 1e-7);
                }
            }
        }
    }

    #[test]
    fn deriv1_sin3_lode_works() {
        for v in &probes() {
            let mut s = Vector::new(NSYM);
            deviator(&mut s, v);
            let mut ana = Vector::new(NSYM);
            deriv1_sin3_lode(&mut ana, &s, jj2(&s), jj3(&s));
            let num = num_deriv1(lode_of, v, 1e-6);
            for i in 0..NSYM {
                approx_eq(ana[i], num[i], 1e-7);
            }
        }
    }

    #[test]
    fn deriv2_sin3_lode_works() {
        for v in &probes() {
            let mut s = Vector::new(NSYM);
            deviator(&mut s, v);
            let mut ana = Matrix::new(NSYM, NSYM);
            deriv2_sin3_lode(&mut ana, &s, jj2(&s), jj3(&s));
            let h = 1e-6;
            for j in 0..NSYM {
                let mut vp = v.clone();
                let mut vm = v.clone();
                vp[j] += h;
                vm[j] -= h;
                let mut sp = Vector::new(NSYM);
                let mut sm = Vector::new(NSYM);
                deviator(&mut sp, &vp);
                deviator(&mut sm, &vm);
                let mut gp = Vector::new(NSYM);
                let mut gm = Vector::new(NSYM);
                deriv1_sin3_lode(&mut gp, &sp, jj2(&sp), jj3(&sp));
                deriv1_sin3_lode(&mut gm, &sm, jj2(&sm), jj3(&sm));
                for i in 0..NSYM {
                    approx_eq(ana.get(i, j), (gp[i] - gm[i]) / (2.0 * h), 1e-5);
                }
            }
        }
    }
}
