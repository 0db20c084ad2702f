// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Hamiltonian assembly from a parameter vector.
//!
//! Two evaluation paths produce the same evolution:
//!
//! - big-real: `A = Σ J_k B_k` (already multiplied by `-i`), `U = exp(A)`;
//!   this is the path the gradient flows through
//! - complex: `H = Σ J_k P_k`, `U = exp(-i H)`; used for inspection and
//!   cross-checks

use ndarray::{Array1, Array2, Zip};
use num_complex::Complex64;

use super::basis::symbol_operator;
use super::interaction::SymbolTable;
use crate::error::{Result, ValidationError};
use crate::linalg::matrix_exp;

fn check_len(parameters: &Array1<f64>, expected: usize) -> Result<()> {
    if parameters.len() != expected {
        return Err(ValidationError::DimensionMismatch {
            what: "parameter vector".into(),
            expected,
            actual: parameters.len(),
        }
        .into());
    }
    Ok(())
}

/// `Σ_k J[k] · basis[k]`, the big-real image of `-i H`.
pub fn assemble(parameters: &Array1<f64>, basis: &[Array2<f64>]) -> Result<Array2<f64>> {
    check_len(parameters, basis.len())?;
    let dim = basis.first().map(|b| b.nrows()).unwrap_or(0);
    let mut h = Array2::zeros((dim, dim));
    for (&j, b) in parameters.iter().zip(basis) {
        Zip::from(&mut h).and(b).for_each(|acc, &x| *acc += j * x);
    }
    Ok(h)
}

/// `exp(A)` for an assembled big-real generator.
pub fn evolution_operator(generator: &Array2<f64>) -> Result<Array2<f64>> {
    matrix_exp(generator)
}

/// Complex Hamiltonian `H = Σ_k J[k] · P_k`.
pub fn complex_hamiltonian(
    parameters: &Array1<f64>,
    table: &SymbolTable,
    num_qubits: usize,
) -> Result<Array2<Complex64>> {
    check_len(parameters, table.len())?;
    let dim = 1usize << num_qubits;
    let mut h = Array2::zeros((dim, dim));
    for (&j, (_, terms)) in parameters.iter().zip(table.iter()) {
        h = h + symbol_operator(terms, num_qubits) * Complex64::new(j, 0.0);
    }
    Ok(h)
}

/// Complex gate `exp(-i H)`.
pub fn complex_gate(
    parameters: &Array1<f64>,
    table: &SymbolTable,
    num_qubits: usize,
) -> Result<Array2<Complex64>> {
    let h = complex_hamiltonian(parameters, table, num_qubits)?;
    matrix_exp(&(h * Complex64::new(0.0, -1.0)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bigreal::operator_to_bigreal;
    use crate::network::basis::build_basis;
    use crate::network::interaction::{Axis, Interaction, InteractionSpec};
    use crate::test_utils::seeded_rng;
    use approx::assert_relative_eq;
    use rand_distr::{Distribution, StandardNormal};

    #[test]
    fn test_assemble_is_linear() {
        let table = SymbolTable::build(&InteractionSpec::All, 2).unwrap();
        let basis = build_basis(&table, 2);
        let mut j = Array1::zeros(table.len());
        j[3] = 2.5;
        let h = assemble(&j, &basis).unwrap();
        let expected = &basis[3] * 2.5;
        for (a, b) in h.iter().zip(expected.iter()) {
            assert_relative_eq!(a, b, epsilon = 1e-15);
        }
    }

    #[test]
    fn test_assemble_rejects_wrong_length() {
        let table = SymbolTable::build(&InteractionSpec::All, 2).unwrap();
        let basis = build_basis(&table, 2);
        assert!(assemble(&Array1::zeros(3), &basis).is_err());
    }

    #[test]
    fn test_big_real_and_complex_paths_agree() {
        let mut rng = seeded_rng(21);
        let table = SymbolTable::build(&InteractionSpec::All, 2).unwrap();
        let basis = build_basis(&table, 2);
        let j: Array1<f64> = (0..table.len())
            .map(|_| StandardNormal.sample(&mut rng))
            .collect();

        let big = evolution_operator(&assemble(&j, &basis).unwrap()).unwrap();
        let from_complex = operator_to_bigreal(&complex_gate(&j, &table, 2).unwrap());
        for (a, b) in big.iter().zip(from_complex.iter()) {
            assert_relative_eq!(a, b, epsilon = 1e-10);
        }
    }

    #[test]
    fn test_zero_parameters_give_identity() {
        let table = SymbolTable::build(&InteractionSpec::All, 2).unwrap();
        let basis = build_basis(&table, 2);
        let u = evolution_operator(&assemble(&Array1::zeros(table.len()), &basis).unwrap()).unwrap();
        for ((i, k), v) in u.indexed_iter() {
            let expected = if i == k { 1.0 } else { 0.0 };
            assert_relative_eq!(*v, expected, epsilon = 1e-14);
        }
    }

    #[test]
    fn test_complex_hamiltonian_is_hermitian() {
        let spec = InteractionSpec::List(vec![
            Interaction::single(0, Axis::Y),
            Interaction::pair(0, 1, Axis::X, Axis::Y),
        ]);
        let table = SymbolTable::build(&spec, 2).unwrap();
        let h = complex_hamiltonian(&Array1::from(vec![0.4, -1.2]), &table, 2).unwrap();
        for ((i, k), v) in h.indexed_iter() {
            assert!((v - h[[k, i]].conj()).norm() < 1e-15);
        }
    }
}
