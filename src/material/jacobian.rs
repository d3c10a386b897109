use super::PlasticityTrait;
use crate::material::invariants::NSYM;
use crate::StrError;
use russell_lab::{Matrix, Vector};

/// Assembles the Jacobian of the closest-point-projection system
///
/// With the unknowns stacked as x = [σ (6), λ (ns), z (nz)], the blocks are
///
/// ```text
///         ⎡ Cₑ + Σλ_s·∂²g_s   g_s    Σλ_s·∂g_s/∂z ⎤
/// J(x) =  ⎢ ∂f_s/∂σ            0     ∂f_s/∂z      ⎥
///         ⎣ Σλ_s·∂h_is/∂σ     h_is   I + Σλ_s·∂h_is/∂z ⎦
/// ```
pub struct JacobianAssembler {
    ns: usize,
    nz: usize,
    sigma: Vector,
    lam: Vector,
    z: Vector,
    g: Vec<Vector>,
    d2g: Vec<Matrix>,
    d2gz: Vec<Vector>,
    df: Vec<Vector>,
    dfz: Matrix,
    h: Matrix,
    dhs: Vec<Vector>,
    dhz: Vec<Matrix>,
}

impl JacobianAssembler {
    /// Allocates a new instance
    pub fn new(n_surfaces: usize, n_internal_values: usize) -> Self {
        JacobianAssembler {
            ns: n_surfaces,
            nz: n_internal_values,
            sigma: Vector::new(NSYM),
            lam: Vector::new(n_surfaces),
            z: Vector::new(n_internal_values),
            g: vec![Vector::new(NSYM); n_surfaces],
            d2g: vec![Matrix::new(NSYM, NSYM); n_surfaces],
            d2gz: vec![Vector::new(NSYM); n_surfaces * n_internal_values],
            df: vec![Vector::new(NSYM); n_surfaces],
            dfz: Matrix::new(n_surfaces, n_internal_values),
            h: Matrix::new(n_internal_values, n_surfaces),
            dhs: vec![Vector::new(NSYM); n_internal_values * n_surfaces],
            dhz: vec![Matrix::new(n_internal_values, n_internal_values); n_surfaces],
        }
    }

    /// Returns the dimension of the assembled system
    pub fn dim(&self) -> usize {
        NSYM + self.ns + self.nz
    }

    /// Assembles the Jacobian matrix at the stacked unknowns
    pub fn assemble(
        &mut self,
        jj: &mut Matrix,
        model: &dyn PlasticityTrait,
        compliance: &Matrix,
        x: &Vector,
    ) -> Result<(), StrError> {
        let (ns, nz) = (self.ns, self.nz);
        for i in 0..NSYM {
            self.sigma[i] = x[i];
        }
        for s in 0..ns {
            self.lam[s] = x[NSYM + s];
        }
        for i in 0..nz {
            self.z[i] = x[NSYM + ns + i];
        }
        model.dg_dsigma(&mut self.g, &self.sigma, &self.z)?;
        model.d2g_dsigma_dsigma(&mut self.d2g, &self.sigma, &self.z)?;
        model.d2g_dsigma_dz(&mut self.d2gz, &self.sigma, &self.z)?;
        model.df_dsigma(&mut self.df, &self.sigma, &self.z)?;
        model.df_dz(&mut self.dfz, &self.sigma, &self.z)?;
        model.hardening(&mut self.h, &self.sigma, &self.z)?;
        model.dh_dsigma(&mut self.dhs, &self.sigma, &self.z)?;
        model.dh_dz(&mut self.dhz, &self.sigma, &self.z)?;
        // direction rows
        for i in 0..NSYM {
            for j in 0..NSYM {
                let mut sum = compliance.get(i, j);
                for s in 0..ns {
                    sum += self.lam[s] * self.d2g[s].get(i, j);
                }
                jj.set(i, j, sum);
            }
            for s in 0..ns {
                jj.set(i, NSYM + s, self.g[s][i]);
            }
            for iz in 0..nz {
                let mut sum = 0.0;
                for s in 0..ns {
                    sum += self.lam[s] * self.d2gz[s * nz + iz][i];
                }
                jj.set(i, NSYM + ns + iz, sum);
            }
        }
        // consistency rows
        for s in 0..ns {
            let row = NSYM + s;
            for j in 0..NSYM {
                jj.set(row, j, self.df[s][j]);
            }
            for q in 0..ns {
                jj.set(row, NSYM + q, 0.0);
            }
            for iz in 0..nz {
                jj.set(row, NSYM + ns + iz, self.dfz.get(s, iz));
            }
        }
        // internal rows
        for iz in 0..nz {
            let row = NSYM + ns + iz;
            for j in 0..NSYM {
                let mut sum = 0.0;
                for s in 0..ns {
                    sum += self.lam[s] * self.dhs[iz * ns + s][j];
                }
                jj.set(row, j, sum);
            }
            for s in 0..ns {
                jj.set(row, NSYM + s, self.h.get(iz, s));
            }
            for jz in 0..nz {
                let mut sum = if iz == jz { 1.0 } else { 0.0 };
                for s in 0..ns {
                    sum += self.lam[s] * self.dhz[s].get(iz, jz);
                }
                jj.set(row, NSYM + ns + jz, sum);
            }
        }
        Ok(())
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
