// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Target gates the network is trained to reproduce.

use ndarray::{Array1, Array2};
use num_complex::Complex64;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result, ValidationError};
use crate::linalg::unitarity_defect;

/// Tolerance on `‖U U† − I‖_max` for a target to count as unitary.
const UNITARITY_TOL: f64 = 1e-8;

/// Target map acting on the system qubits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetGate {
    /// Unitary gate, `2^m × 2^m`.
    Unitary(Array2<Complex64>),
    /// Superoperator of a non-unitary map, `4^m × 4^m`. Recognized, not
    /// trainable.
    OpenMap(Array2<Complex64>),
}

impl TargetGate {
    /// Number of system qubits the gate acts on.
    pub fn num_qubits(&self) -> usize {
        let dim = match self {
            TargetGate::Unitary(u) => u.nrows(),
            TargetGate::OpenMap(s) => (s.nrows() as f64).sqrt().round() as usize,
        };
        dim.trailing_zeros() as usize
    }

    /// The unitary matrix, or `Unsupported` for open maps.
    pub fn unitary(&self) -> Result<&Array2<Complex64>> {
        match self {
            TargetGate::Unitary(u) => Ok(u),
            TargetGate::OpenMap(_) => Err(Error::Unsupported(
                "open-map (non-unitary) targets are not implemented".into(),
            )),
        }
    }

    /// Apply the target to a system ket.
    pub fn apply(&self, ket: &Array1<Complex64>) -> Result<Array1<Complex64>> {
        Ok(self.unitary()?.dot(ket))
    }

    /// Check shape (and unitarity) against `num_system_qubits`.
    pub fn validate(&self, num_system_qubits: usize) -> Result<()> {
        let (matrix, expected) = match self {
            TargetGate::Unitary(u) => (u, 1usize << num_system_qubits),
            TargetGate::OpenMap(s) => (s, 1usize << (2 * num_system_qubits)),
        };
        if matrix.nrows() != matrix.ncols() {
            return Err(ValidationError::Field {
                field: "target".into(),
                message: format!(
                    "matrix must be square, got {} × {}",
                    matrix.nrows(),
                    matrix.ncols()
                ),
            }
            .into());
        }
        if matrix.nrows() != expected {
            return Err(ValidationError::DimensionMismatch {
                what: "target gate".into(),
                expected,
                actual: matrix.nrows(),
            }
            .into());
        }
        if let TargetGate::Unitary(u) = self {
            let defect = unitarity_defect(u);
            if defect > UNITARITY_TOL {
                return Err(ValidationError::PhysicsConstraint(format!(
                    "target gate is not unitary (max |UU† - I| = {:.3e})",
                    defect
                ))
                .into());
            }
        }
        Ok(())
    }
}

/// Named gates and explicit matrices, as written in configuration files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetSpec {
    /// Identity on all system qubits.
    Identity,
    X,
    Hadamard,
    Cnot,
    Toffoli,
    Fredkin,
    /// Rows of `[re, im]` entries.
    Unitary(Vec<Vec<[f64; 2]>>),
    /// Superoperator rows of `[re, im]` entries, `4^m × 4^m`.
    OpenMap(Vec<Vec<[f64; 2]>>),
}

impl TargetSpec {
    /// Build the gate for a network with `num_system_qubits` system qubits.
    pub fn resolve(&self, num_system_qubits: usize) -> Result<TargetGate> {
        let gate = match self {
            TargetSpec::Identity => identity(num_system_qubits),
            TargetSpec::X => pauli_x(),
            TargetSpec::Hadamard => hadamard(),
            TargetSpec::Cnot => cnot(),
            TargetSpec::Toffoli => toffoli(),
            TargetSpec::Fredkin => fredkin(),
            TargetSpec::Unitary(rows) => TargetGate::Unitary(square_matrix(rows, "target.unitary")?),
            TargetSpec::OpenMap(rows) => TargetGate::OpenMap(square_matrix(rows, "target.open_map")?),
        };
        gate.validate(num_system_qubits)?;
        Ok(gate)
    }
}

fn square_matrix(rows: &[Vec<[f64; 2]>], field: &str) -> Result<Array2<Complex64>> {
    let n = rows.len();
    if n == 0 || rows.iter().any(|r| r.len() != n) {
        return Err(ValidationError::Field {
            field: field.into(),
            message: "matrix must be non-empty with every row as long as the row count".into(),
        }
        .into());
    }
    Ok(Array2::from_shape_fn((n, n), |(i, j)| {
        Complex64::new(rows[i][j][0], rows[i][j][1])
    }))
}

fn re(x: f64) -> Complex64 {
    Complex64::new(x, 0.0)
}

/// Permutation matrix sending basis state `j` to `perm[j]`.
fn permutation(perm: &[usize]) -> TargetGate {
    let n = perm.len();
    let mut m = Array2::zeros((n, n));
    for (j, &i) in perm.iter().enumerate() {
        m[[i, j]] = re(1.0);
    }
    TargetGate::Unitary(m)
}

pub fn identity(num_qubits: usize) -> TargetGate {
    TargetGate::Unitary(Array2::from_diag_elem(1 << num_qubits, re(1.0)))
}

pub fn pauli_x() -> TargetGate {
    permutation(&[1, 0])
}

pub fn hadamard() -> TargetGate {
    let h = std::f64::consts::FRAC_1_SQRT_2;
    let mut m = Array2::from_elem((2, 2), re(h));
    m[[1, 1]] = re(-h);
    TargetGate::Unitary(m)
}

/// Control on qubit 0, target qubit 1.
pub fn cnot() -> TargetGate {
    permutation(&[0, 1, 3, 2])
}

/// Controls on qubits 0 and 1, target qubit 2.
pub fn toffoli() -> TargetGate {
    permutation(&[0, 1, 2, 3, 4, 5, 7, 6])
}

/// Control on qubit 0, swaps qubits 1 and 2.
pub fn fredkin() -> TargetGate {
    permutation(&[0, 1, 2, 3, 4, 6, 5, 7])
}
