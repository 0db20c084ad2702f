// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Pauli generators and their big-real basis matrices.
//!
//! For a term P (a tensor product of Pauli matrices and identities) the
//! basis matrix is `big(-i · P)`. With these, `Σ J_k B_k` is the big-real
//! image of `-i H`, and its exponential is the big-real image of the
//! evolution `exp(-i H)`.

use ndarray::Array2;
use num_complex::Complex64;

use super::interaction::{Axis, Interaction, SymbolTable};
use crate::bigreal::operator_to_bigreal;
use crate::linalg::kron_all;

pub fn identity2() -> Array2<Complex64> {
    Array2::from_diag_elem(2, Complex64::new(1.0, 0.0))
}

/// Pauli matrix for `axis`.
pub fn pauli(axis: Axis) -> Array2<Complex64> {
    let mut m = Array2::zeros((2, 2));
    match axis {
        Axis::X => {
            m[[0, 1]] = Complex64::new(1.0, 0.0);
            m[[1, 0]] = Complex64::new(1.0, 0.0);
        }
        Axis::Y => {
            m[[0, 1]] = Complex64::new(0.0, -1.0);
            m[[1, 0]] = Complex64::new(0.0, 1.0);
        }
        Axis::Z => {
            m[[0, 0]] = Complex64::new(1.0, 0.0);
            m[[1, 1]] = Complex64::new(-1.0, 0.0);
        }
    }
    m
}

/// Complex generator of one term on `num_qubits` qubits (qubit 0 is the
/// most significant tensor factor).
pub fn term_operator(term: &Interaction, num_qubits: usize) -> Array2<Complex64> {
    let mut factors: Vec<Array2<Complex64>> = (0..num_qubits).map(|_| identity2()).collect();
    for (qubit, axis) in term.factors() {
        factors[qubit] = pauli(axis);
    }
    kron_all(&factors)
}

/// Complex generator of a symbol: the sum of its terms.
pub fn symbol_operator(terms: &[Interaction], num_qubits: usize) -> Array2<Complex64> {
    let dim = 1usize << num_qubits;
    terms
        .iter()
        .fold(Array2::zeros((dim, dim)), |acc, t| acc + term_operator(t, num_qubits))
}

/// Big-real basis matrix `big(-i · P)` of one term.
pub fn term_basis(term: &Interaction, num_qubits: usize) -> Array2<f64> {
    let minus_i = Complex64::new(0.0, -1.0);
    operator_to_bigreal(&(term_operator(term, num_qubits) * minus_i))
}

/// One basis matrix per symbol, each the sum over its aggregated terms.
/// Every matrix is `2·2^n × 2·2^n`.
pub fn build_basis(table: &SymbolTable, num_qubits: usize) -> Vec<Array2<f64>> {
    let dim = 2 * (1usize << num_qubits);
    table
        .iter()
        .map(|(_, terms)| {
            terms
                .iter()
                .fold(Array2::zeros((dim, dim)), |acc, t| acc + term_basis(t, num_qubits))
        })
        .collect()
}
