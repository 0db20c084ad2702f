// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Matrix exponential via scaling-and-squaring with Padé(13) approximation.
//!
//! Implements the algorithm from:
//!   Higham (2005), "The Scaling and Squaring Method for the Matrix
//!   Exponential Revisited", SIAM J. Matrix Anal. Appl. 26(4), 1179.
//!
//! The same code serves big-real `f64` matrices (training) and `Complex64`
//! matrices (inspection of the complex gate). The Fréchet derivative is
//! obtained from the block identity
//!
//! ```text
//!     ┌      ┐     ┌              ┐
//! exp │ A  E │  =  │ e^A  L(A, E) │
//!     │ 0  A │     │  0     e^A   │
//!     └      ┘     └              ┘
//! ```
//!
//! Ref: Najfeld & Havel (1995), Adv. Appl. Math. 16, 321.

use std::ops::SubAssign;

use ndarray::{s, Array2, LinalgScalar, ScalarOperand};
use num_complex::Complex64;

use crate::error::{Error, Result};

/// Scalars the exponential can operate on.
pub trait ExpmScalar: LinalgScalar + ScalarOperand + SubAssign {
    /// Embed a real number.
    fn from_real(x: f64) -> Self;
    /// Absolute value / modulus.
    fn modulus(self) -> f64;
    /// Scalar exponential, for the 1 × 1 case.
    fn exp_scalar(self) -> Self;
    /// Whether the value is finite.
    fn finite(self) -> bool;
}

impl ExpmScalar for f64 {
    #[inline]
    fn from_real(x: f64) -> Self {
        x
    }
    #[inline]
    fn modulus(self) -> f64 {
        self.abs()
    }
    #[inline]
    fn exp_scalar(self) -> Self {
        self.exp()
    }
    #[inline]
    fn finite(self) -> bool {
        self.is_finite()
    }
}

impl ExpmScalar for Complex64 {
    #[inline]
    fn from_real(x: f64) -> Self {
        Complex64::new(x, 0.0)
    }
    #[inline]
    fn modulus(self) -> f64 {
        self.norm()
    }
    #[inline]
    fn exp_scalar(self) -> Self {
        self.exp()
    }
    #[inline]
    fn finite(self) -> bool {
        self.is_finite()
    }
}

/// Compute the matrix exponential exp(A) using scaling-and-squaring
/// with Padé(13) approximation.
///
/// # Errors
/// `Error::Numerical` if the Padé denominator is singular or the result
/// contains non-finite entries.
///
/// # Panics
/// Panics if `a` is not square.
pub fn matrix_exp<A: ExpmScalar>(a: &Array2<A>) -> Result<Array2<A>> {
    let n = a.nrows();
    assert_eq!(n, a.ncols(), "matrix_exp requires a square matrix");

    if n == 0 {
        return Ok(Array2::zeros((0, 0)));
    }
    if n == 1 {
        let mut result = Array2::zeros((1, 1));
        result[[0, 0]] = a[[0, 0]].exp_scalar();
        return check_finite(result);
    }

    let norm = matrix_1_norm(a);
    if !norm.is_finite() {
        return Err(Error::Numerical(
            "matrix exponential input contains non-finite entries".into(),
        ));
    }

    // theta_13 = 5.37 (Higham Table 10.2)
    let theta_13: f64 = 5.37;
    let s = if norm > theta_13 {
        (norm / theta_13).log2().ceil() as u32
    } else {
        0
    };

    let scale = A::from_real(1.0 / 2f64.powi(s as i32));
    let a_scaled = a * scale;

    let result = pade13(&a_scaled)?;
    check_finite(square_repeatedly(result, s))
}

/// Exponential and Fréchet derivative `L(A, E)` in one call.
///
/// Returns `(exp(A), L(A, E))`.
pub fn expm_frechet<A: ExpmScalar>(a: &Array2<A>, e: &Array2<A>) -> Result<(Array2<A>, Array2<A>)> {
    let n = a.nrows();
    assert_eq!(n, a.ncols(), "expm_frechet requires a square matrix");
    assert_eq!(e.dim(), (n, n), "direction must match the matrix shape");

    let mut aug = Array2::zeros((2 * n, 2 * n));
    aug.slice_mut(s![..n, ..n]).assign(a);
    aug.slice_mut(s![..n, n..]).assign(e);
    aug.slice_mut(s![n.., n..]).assign(a);

    let big = matrix_exp(&aug)?;
    Ok((
        big.slice(s![..n, ..n]).to_owned(),
        big.slice(s![..n, n..]).to_owned(),
    ))
}

/// Pull a cotangent `G` on exp(A) back onto A: returns `L(Aᵀ, G)`, so that
/// `⟨G, L(A, E)⟩ = ⟨E, L(Aᵀ, G)⟩` for every direction E.
pub fn expm_frechet_adjoint(a: &Array2<f64>, g: &Array2<f64>) -> Result<Array2<f64>> {
    let a_t = a.t().to_owned();
    let (_, l) = expm_frechet(&a_t, g)?;
    Ok(l)
}

/// Padé(13,13) approximation coefficients.
/// From Higham (2005), equation (10.33).
const PADE_COEFFS: [f64; 14] = [
    1.0,
    0.5,
    0.12,
    1.833_333_333_333_333_4e-2,
    1.992_753_623_188_405_8e-3,
    1.630_434_782_608_696e-4,
    1.035_196_687_401_6e-5,
    5.175_983_437_008_01e-7,
    2.043_151_356_652_5e-8,
    6.306_022_705_717_593e-10,
    1.483_770_048_404_14e-11,
    2.529_153_491_597_966e-13,
    2.810_170_546_219_962_4e-15,
    1.544_049_750_670_309e-17,
];

fn pade13<A: ExpmScalar>(a: &Array2<A>) -> Result<Array2<A>> {
    let n = a.nrows();
    let c = |i: usize| A::from_real(PADE_COEFFS[i]);
    let eye = Array2::from_diag_elem(n, A::from_real(1.0));

    let a2 = a.dot(a);
    let a4 = a2.dot(&a2);
    let a6 = a2.dot(&a4);

    // U = A · [A6·(b13·A6 + b11·A4 + b9·A2) + b7·A6 + b5·A4 + b3·A2 + b1·I]
    let w1 = &a6 * c(13) + &a4 * c(11) + &a2 * c(9);
    let w2 = w1.dot(&a6) + &a6 * c(7) + &a4 * c(5) + &a2 * c(3) + &eye * c(1);
    let u = a.dot(&w2);

    // V = A6·(b12·A6 + b10·A4 + b8·A2) + b6·A6 + b4·A4 + b2·A2 + b0·I
    let v1 = &a6 * c(12) + &a4 * c(10) + &a2 * c(8);
    let v = v1.dot(&a6) + &a6 * c(6) + &a4 * c(4) + &a2 * c(2) + &eye * c(0);

    // exp(A) ≈ (V - U)^{-1} (V + U)
    let numerator = &v + &u;
    let denominator = &v - &u;
    solve_linear(denominator, numerator)
}

/// Solve A · X = B with Gaussian elimination and partial pivoting.
fn solve_linear<A: ExpmScalar>(a: Array2<A>, b: Array2<A>) -> Result<Array2<A>> {
    let n = a.nrows();
    assert_eq!(n, a.ncols());
    assert_eq!(n, b.nrows());
    let m = b.ncols();

    let mut aug = Array2::zeros((n, n + m));
    aug.slice_mut(s![.., ..n]).assign(&a);
    aug.slice_mut(s![.., n..]).assign(&b);

    for col in 0..n {
        let mut max_val = 0.0;
        let mut max_row = col;
        for row in col..n {
            let val = aug[[row, col]].modulus();
            if val > max_val {
                max_val = val;
                max_row = row;
            }
        }

        if max_row != col {
            for j in 0..(n + m) {
                aug.swap([col, j], [max_row, j]);
            }
        }

        let pivot = aug[[col, col]];
        if pivot.modulus() < 1e-15 {
            return Err(Error::Numerical(format!(
                "singular Padé denominator (pivot {:.3e} at column {})",
                pivot.modulus(),
                col
            )));
        }

        for row in (col + 1)..n {
            let factor = aug[[row, col]] / pivot;
            for j in col..(n + m) {
                let val = aug[[col, j]];
                aug[[row, j]] -= factor * val;
            }
        }
    }

    let mut x = Array2::<A>::zeros((n, m));
    for col in (0..n).rev() {
        let pivot = aug[[col, col]];
        for j in 0..m {
            let mut sum = aug[[col, n + j]];
            for k in (col + 1)..n {
                sum -= aug[[col, k]] * x[[k, j]];
            }
            x[[col, j]] = sum / pivot;
        }
    }
    Ok(x)
}

/// M^(2^s)
fn square_repeatedly<A: ExpmScalar>(mut m: Array2<A>, s: u32) -> Array2<A> {
    for _ in 0..s {
        m = m.dot(&m);
    }
    m
}

/// Max column sum of absolute values.
fn matrix_1_norm<A: ExpmScalar>(a: &Array2<A>) -> f64 {
    a.columns()
        .into_iter()
        .map(|col| col.iter().map(|x| x.modulus()).sum::<f64>())
        .fold(0.0, f64::max)
}

fn check_finite<A: ExpmScalar>(m: Array2<A>) -> Result<Array2<A>> {
    if m.iter().all(|x| x.finite()) {
        Ok(m)
    } else {
        Err(Error::Numerical(
            "matrix exponential produced non-finite entries".into(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bigreal::operator_to_bigreal;
    use crate::test_utils::{assert_matrix_close, random_real_matrix, seeded_rng};
    use approx::assert_relative_eq;
    use std::f64::consts::PI;

    #[test]
    fn test_expm_zero_is_identity() {
        let zero = Array2::<Complex64>::zeros((4, 4));
        let result = matrix_exp(&zero).unwrap();
        let eye = Array2::from_diag_elem(4, Complex64::new(1.0, 0.0));
        assert_matrix_close(&result, &eye, 1e-14);

        let zero = Array2::<f64>::zeros((8, 8));
        let result = matrix_exp(&zero).unwrap();
        for ((i, j), v) in result.indexed_iter() {
            let expected = if i == j { 1.0 } else { 0.0 };
            assert_relative_eq!(*v, expected, epsilon = 1e-14);
        }
    }

    #[test]
    fn test_expm_real_rotation_generator() {
        // exp([[0, θ], [-θ, 0]]) = [[cos θ, sin θ], [-sin θ, cos θ]]
        let theta = 0.7;
        let mut a = Array2::<f64>::zeros((2, 2));
        a[[0, 1]] = theta;
        a[[1, 0]] = -theta;
        let r = matrix_exp(&a).unwrap();
        assert_relative_eq!(r[[0, 0]], theta.cos(), epsilon = 1e-13);
        assert_relative_eq!(r[[0, 1]], theta.sin(), epsilon = 1e-13);
        assert_relative_eq!(r[[1, 0]], -theta.sin(), epsilon = 1e-13);
        assert_relative_eq!(r[[1, 1]], theta.cos(), epsilon = 1e-13);
    }

    #[test]
    fn test_expm_pauli_x_produces_rotation() {
        let theta = PI / 2.0;
        let mut a = Array2::zeros((2, 2));
        let factor = Complex64::new(0.0, -theta / 2.0);
        a[[0, 1]] = factor;
        a[[1, 0]] = factor;

        let result = matrix_exp(&a).unwrap();

        let c = (theta / 2.0).cos();
        let s = (theta / 2.0).sin();
        assert!((result[[0, 0]] - Complex64::new(c, 0.0)).norm() < 1e-12);
        assert!((result[[0, 1]] - Complex64::new(0.0, -s)).norm() < 1e-12);
        assert!((result[[1, 0]] - Complex64::new(0.0, -s)).norm() < 1e-12);
        assert!((result[[1, 1]] - Complex64::new(c, 0.0)).norm() < 1e-12);
    }

    #[test]
    fn test_expm_commutes_with_bigreal_encoding() {
        // exp(big(M)) == big(exp(M))
        let mut m = Array2::zeros((2, 2));
        m[[0, 0]] = Complex64::new(0.3, -0.2);
        m[[0, 1]] = Complex64::new(-1.1, 0.4);
        m[[1, 0]] = Complex64::new(0.5, 0.9);
        m[[1, 1]] = Complex64::new(0.0, 1.3);

        let lhs = matrix_exp(&operator_to_bigreal(&m)).unwrap();
        let rhs = operator_to_bigreal(&matrix_exp(&m).unwrap());
        for (x, y) in lhs.iter().zip(rhs.iter()) {
            assert_relative_eq!(x, y, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_expm_antisymmetric_is_orthogonal() {
        let mut rng = seeded_rng(1);
        let m = random_real_matrix(8, 8, &mut rng);
        let a = &m - &m.t();
        let q = matrix_exp(&a).unwrap();
        let product = q.t().dot(&q);
        for ((i, j), v) in product.indexed_iter() {
            let expected = if i == j { 1.0 } else { 0.0 };
            assert_relative_eq!(*v, expected, epsilon = 1e-10);
        }
    }

    #[test]
    fn test_expm_large_norm_needs_scaling() {
        let mut a = Array2::<f64>::zeros((2, 2));
        a[[0, 0]] = 100.0;
        a[[1, 1]] = -100.0;
        let result = matrix_exp(&a).unwrap();
        let e100 = 100.0_f64.exp();
        assert!((result[[0, 0]] - e100).abs() / e100 < 1e-10);
        assert!(result[[1, 1]].abs() < 1e-30);
    }

    #[test]
    fn test_expm_rejects_non_finite_input() {
        let mut a = Array2::<f64>::zeros((2, 2));
        a[[0, 1]] = f64::NAN;
        assert!(matches!(matrix_exp(&a), Err(Error::Numerical(_))));
    }

    #[test]
    fn test_expm_overflow_is_reported() {
        let mut a = Array2::<f64>::zeros((2, 2));
        a[[0, 0]] = 1000.0;
        assert!(matches!(matrix_exp(&a), Err(Error::Numerical(_))));
    }

    #[test]
    fn test_frechet_matches_finite_difference() {
        let mut rng = seeded_rng(2);
        let a = random_real_matrix(4, 4, &mut rng);
        let e = random_real_matrix(4, 4, &mut rng);
        let (expa, l) = expm_frechet(&a, &e).unwrap();

        let direct = matrix_exp(&a).unwrap();
        for (x, y) in expa.iter().zip(direct.iter()) {
            assert_relative_eq!(x, y, epsilon = 1e-11);
        }

        let h = 1e-6;
        let plus = matrix_exp(&(&a + &(&e * h))).unwrap();
        let minus = matrix_exp(&(&a - &(&e * h))).unwrap();
        let fd = (&plus - &minus) / (2.0 * h);
        for (x, y) in l.iter().zip(fd.iter()) {
            assert_relative_eq!(x, y, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_frechet_adjoint_identity() {
        // ⟨G, L(A, E)⟩ == ⟨E, L(Aᵀ, G)⟩
        let mut rng = seeded_rng(4);
        let a = random_real_matrix(6, 6, &mut rng);
        let e = random_real_matrix(6, 6, &mut rng);
        let g = random_real_matrix(6, 6, &mut rng);

        let (_, l) = expm_frechet(&a, &e).unwrap();
        let lhs: f64 = (&g * &l).sum();
        let adj = expm_frechet_adjoint(&a, &g).unwrap();
        let rhs: f64 = (&e * &adj).sum();
        assert_relative_eq!(lhs, rhs, epsilon = 1e-10, max_relative = 1e-10);
    }
}
