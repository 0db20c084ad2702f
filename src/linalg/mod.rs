// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Dense linear algebra used by the network model.
//!
//! - [`matrix_exp`]: Padé(13) scaling-and-squaring exponential, for `f64`
//!   and `Complex64` matrices
//! - [`expm_frechet`]: exponential together with its Fréchet derivative
//! - [`expm_frechet_adjoint`]: reverse-mode pullback through `exp`
//! - [`kron_all`]: Kronecker product of a sequence of operators

pub mod expm;

pub use expm::{expm_frechet, expm_frechet_adjoint, matrix_exp, ExpmScalar};

use ndarray::{linalg::kron, Array2};
use num_complex::Complex64;

/// Kronecker product `ops[0] ⊗ ops[1] ⊗ ...`, with `ops[0]` the most
/// significant factor.
pub fn kron_all(ops: &[Array2<Complex64>]) -> Array2<Complex64> {
    ops.iter()
        .fold(Array2::from_elem((1, 1), Complex64::new(1.0, 0.0)), |acc, op| {
            kron(&acc, op)
        })
}

/// Conjugate transpose.
pub fn dagger(m: &Array2<Complex64>) -> Array2<Complex64> {
    m.t().mapv(|z| z.conj())
}

/// Max-abs deviation of `m · m†` from the identity.
pub fn unitarity_defect(m: &Array2<Complex64>) -> f64 {
    let product = m.dot(&dagger(m));
    product
        .indexed_iter()
        .map(|((i, j), z)| {
            let expected = if i == j { 1.0 } else { 0.0 };
            (z - Complex64::new(expected, 0.0)).norm()
        })
        .fold(0.0, f64::max)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kron_all_dimensions_and_order() {
        let mut x = Array2::zeros((2, 2));
        x[[0, 1]] = Complex64::new(1.0, 0.0);
        x[[1, 0]] = Complex64::new(1.0, 0.0);
        let eye = Array2::from_diag_elem(2, Complex64::new(1.0, 0.0));

        let xi = kron_all(&[x.clone(), eye.clone()]);
        assert_eq!(xi.dim(), (4, 4));
        // X ⊗ I maps |00⟩ → |10⟩ (index 0 → 2)
        assert_eq!(xi[[2, 0]], Complex64::new(1.0, 0.0));
        assert_eq!(xi[[1, 0]], Complex64::new(0.0, 0.0));

        let ix = kron_all(&[eye, x]);
        assert_eq!(ix[[1, 0]], Complex64::new(1.0, 0.0));
    }

    #[test]
    fn test_kron_all_empty_is_scalar_one() {
        let k = kron_all(&[]);
        assert_eq!(k.dim(), (1, 1));
        assert_eq!(k[[0, 0]], Complex64::new(1.0, 0.0));
    }

    #[test]
    fn test_unitarity_defect() {
        let eye = Array2::from_diag_elem(4, Complex64::new(1.0, 0.0));
        assert!(unitarity_defect(&eye) < 1e-15);
        let twice = &eye * Complex64::new(2.0, 0.0);
        assert!((unitarity_defect(&twice) - 3.0).abs() < 1e-12);
    }
}
