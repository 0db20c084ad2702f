// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Shared test utilities for network and training tests.

use ndarray::{Array1, Array2};
use num_complex::Complex64;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, StandardNormal};

use crate::network::interaction::InteractionSpec;
use crate::network::gates::TargetSpec;
use crate::network::QubitNetwork;

/// Deterministic RNG for reproducible tests.
pub fn seeded_rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

pub fn random_real_matrix(rows: usize, cols: usize, rng: &mut StdRng) -> Array2<f64> {
    Array2::from_shape_fn((rows, cols), |_| StandardNormal.sample(rng))
}

pub fn random_complex_matrix(rows: usize, cols: usize, rng: &mut StdRng) -> Array2<Complex64> {
    Array2::from_shape_fn((rows, cols), |_| {
        Complex64::new(StandardNormal.sample(rng), StandardNormal.sample(rng))
    })
}

/// Normalized random complex ket of length `dim`.
pub fn random_ket(dim: usize, rng: &mut StdRng) -> Array1<Complex64> {
    let raw: Array1<Complex64> = random_complex_matrix(dim, 1, rng).column(0).to_owned();
    let norm = raw.iter().map(|z| z.norm_sqr()).sum::<f64>().sqrt();
    raw.mapv(|z| z / norm)
}

pub fn assert_matrix_close(a: &Array2<Complex64>, b: &Array2<Complex64>, tol: f64) {
    assert_eq!(a.dim(), b.dim(), "shape mismatch");
    for ((i, j), x) in a.indexed_iter() {
        let d = (x - b[[i, j]]).norm();
        assert!(d < tol, "entry ({}, {}) differs by {:.3e}", i, j, d);
    }
}

/// Two-qubit network (one system qubit, one ancilla) with every
/// interaction and an identity target.
pub fn small_network() -> QubitNetwork {
    QubitNetwork::builder(2)
        .system_qubits(1)
        .interactions(InteractionSpec::All)
        .target(TargetSpec::Identity)
        .build()
        .expect("small test network")
}

/// Network without ancillae on `n` qubits targeting `target`.
pub fn closed_network(n: usize, target: TargetSpec) -> QubitNetwork {
    QubitNetwork::builder(n)
        .system_qubits(n)
        .interactions(InteractionSpec::All)
        .target(target)
        .build()
        .expect("closed test network")
}
