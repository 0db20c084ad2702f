// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Training and test data: Haar-random inputs and exact target outputs.
//!
//! Every call draws a fresh, independent sample. Nothing is cached between
//! calls.

use ndarray::{Array1, Array2};
use num_complex::Complex64;
use rand::Rng;
use rand_distr::{Distribution, StandardNormal};

use crate::bigreal::ket_to_bigreal;
use crate::error::{Error, Result};
use crate::network::QubitNetwork;

/// Haar-random normalized ket of dimension `dim`: a complex Gaussian
/// vector divided by its norm.
pub fn random_ket_haar<R: Rng + ?Sized>(dim: usize, rng: &mut R) -> Array1<Complex64> {
    loop {
        let raw: Array1<Complex64> = (0..dim)
            .map(|_| Complex64::new(StandardNormal.sample(rng), StandardNormal.sample(rng)))
            .collect();
        let norm = raw.iter().map(|z| z.norm_sqr()).sum::<f64>().sqrt();
        if norm > f64::EPSILON {
            return raw.mapv(|z| z / norm);
        }
    }
}

/// Paired inputs and target outputs, rows are samples.
#[derive(Debug, Clone)]
pub struct TrainingBatch {
    /// Big-real inputs on all qubits (system ⊗ ancilla), `2·2^n` columns.
    pub inputs: Array2<f64>,
    /// Big-real target outputs on the system qubits, `2·2^m` columns.
    pub outputs: Array2<f64>,
}

impl TrainingBatch {
    pub fn len(&self) -> usize {
        self.inputs.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.inputs.nrows() == 0
    }
}

/// Draw `num_states` system inputs, apply the target, and pad the inputs
/// with the ancilla state.
pub fn generate<R: Rng + ?Sized>(
    network: &QubitNetwork,
    num_states: usize,
    rng: &mut R,
) -> Result<TrainingBatch> {
    let target = network.target()?;
    // Fails with Unsupported for open maps before any sampling.
    target.unitary()?;
    if num_states == 0 {
        return Err(Error::Config("cannot generate an empty dataset".into()));
    }

    let system_dim = 1usize << network.num_system_qubits();
    let full_dim = 1usize << network.num_qubits();
    let mut inputs = Array2::zeros((num_states, 2 * full_dim));
    let mut outputs = Array2::zeros((num_states, 2 * system_dim));

    for k in 0..num_states {
        let ket = random_ket_haar(system_dim, rng);
        let expected = target.apply(&ket)?;
        inputs
            .row_mut(k)
            .assign(&ket_to_bigreal(&network.pad_with_ancillae(&ket)));
        outputs.row_mut(k).assign(&ket_to_bigreal(&expected));
    }

    Ok(TrainingBatch { inputs, outputs })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bigreal::bigreal_to_ket;
    use crate::network::gates::{TargetGate, TargetSpec};
    use crate::network::interaction::InteractionSpec;
    use crate::test_utils::{seeded_rng, small_network};
    use approx::assert_relative_eq;

    #[test]
    fn test_random_kets_are_normalized() {
        let mut rng = seeded_rng(40);
        for dim in [1usize, 2, 4, 8] {
            let ket = random_ket_haar(dim, &mut rng);
            let norm: f64 = ket.iter().map(|z| z.norm_sqr()).sum();
            assert_relative_eq!(norm, 1.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_generate_shapes() {
        let net = small_network();
        let mut rng = seeded_rng(41);
        let batch = generate(&net, 7, &mut rng).unwrap();
        assert_eq!(batch.len(), 7);
        assert_eq!(batch.inputs.dim(), (7, 8));
        assert_eq!(batch.outputs.dim(), (7, 4));
    }

    #[test]
    fn test_generated_sets_differ_and_are_normalized() {
        let net = small_network();
        let mut rng = seeded_rng(42);
        let first = generate(&net, 10, &mut rng).unwrap();
        let second = generate(&net, 10, &mut rng).unwrap();
        assert_ne!(first.inputs, second.inputs);

        for batch in [&first, &second] {
            for row in batch.outputs.outer_iter() {
                // identity target: outputs are the unpadded inputs
                let ket = bigreal_to_ket(row).unwrap();
                let norm: f64 = ket.iter().map(|z| z.norm_sqr()).sum();
                assert!((norm - 1.0).abs() < 1e-9);
            }
        }
    }

    #[test]
    fn test_inputs_are_padded_with_zero_ancilla() {
        let net = small_network();
        let mut rng = seeded_rng(43);
        let batch = generate(&net, 5, &mut rng).unwrap();
        for (input, output) in batch.inputs.outer_iter().zip(batch.outputs.outer_iter()) {
            let full = bigreal_to_ket(input).unwrap();
            let system = bigreal_to_ket(output).unwrap();
            // |s⟩ ⊗ |0⟩: odd indices carry the ancilla |1⟩ component
            assert_eq!(full[1], Complex64::new(0.0, 0.0));
            assert_eq!(full[3], Complex64::new(0.0, 0.0));
            assert!((full[0] - system[0]).norm() < 1e-15);
            assert!((full[2] - system[1]).norm() < 1e-15);
        }
    }

    #[test]
    fn test_target_is_applied() {
        let net = QubitNetwork::builder(1)
            .target(TargetSpec::X)
            .build()
            .unwrap();
        let mut rng = seeded_rng(44);
        let batch = generate(&net, 4, &mut rng).unwrap();
        for (input, output) in batch.inputs.outer_iter().zip(batch.outputs.outer_iter()) {
            let i = bigreal_to_ket(input).unwrap();
            let o = bigreal_to_ket(output).unwrap();
            assert!((o[0] - i[1]).norm() < 1e-15);
            assert!((o[1] - i[0]).norm() < 1e-15);
        }
    }

    #[test]
    fn test_missing_target() {
        let net = QubitNetwork::builder(2).build().unwrap();
        let mut rng = seeded_rng(45);
        assert!(matches!(
            generate(&net, 3, &mut rng),
            Err(Error::MissingTarget)
        ));
    }

    #[test]
    fn test_open_map_target_is_unsupported() {
        let rows: Vec<Vec<[f64; 2]>> = (0..4)
            .map(|i| (0..4).map(|j| if i == j { [1.0, 0.0] } else { [0.0, 0.0] }).collect())
            .collect();
        let net = QubitNetwork::builder(2)
            .system_qubits(1)
            .interactions(InteractionSpec::All)
            .target(TargetSpec::OpenMap(rows))
            .build()
            .unwrap();
        assert!(matches!(net.target(), Ok(TargetGate::OpenMap(_))));
        let mut rng = seeded_rng(46);
        assert!(matches!(
            generate(&net, 3, &mut rng),
            Err(Error::Unsupported(_))
        ));
    }
}
