// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Input validation for network and training configurations.
//!
//! All checks run eagerly, at construction time, never inside the
//! training loop.

use crate::error::{Result, ValidationError};

/// Largest supported network. Basis matrices are `2·2^n` square and the
/// gradient exponentiates a matrix twice that size.
pub const MAX_QUBITS: usize = 10;

/// Validate qubit counts.
pub fn validate_network_shape(num_qubits: usize, num_system_qubits: usize) -> Result<()> {
    if num_qubits == 0 {
        return Err(ValidationError::Field {
            field: "num_qubits".into(),
            message: "must be greater than 0".into(),
        }
        .into());
    }

    if num_qubits > MAX_QUBITS {
        return Err(ValidationError::ResourceLimit {
            resource: "num_qubits".into(),
            limit: MAX_QUBITS as u64,
            requested: num_qubits as u64,
        }
        .into());
    }

    if num_system_qubits == 0 || num_system_qubits > num_qubits {
        return Err(ValidationError::Field {
            field: "num_system_qubits".into(),
            message: format!(
                "must be between 1 and num_qubits ({}), got {}",
                num_qubits, num_system_qubits
            ),
        }
        .into());
    }

    Ok(())
}

/// Validate a parameter vector against the number of symbols.
pub fn validate_parameters(values: &[f64], expected: usize) -> Result<()> {
    if values.len() != expected {
        return Err(ValidationError::DimensionMismatch {
            what: "parameter vector".into(),
            expected,
            actual: values.len(),
        }
        .into());
    }

    for (i, val) in values.iter().enumerate() {
        if !val.is_finite() {
            return Err(ValidationError::Field {
                field: "parameters".into(),
                message: format!("non-finite value {} at index {}", val, i),
            }
            .into());
        }
    }

    Ok(())
}

/// Validate dataset and mini-batch sizes.
pub fn validate_dataset_sizes(
    batch_size: usize,
    train_dataset_size: usize,
    test_dataset_size: usize,
) -> Result<()> {
    if batch_size == 0 {
        return Err(ValidationError::Field {
            field: "batch_size".into(),
            message: "must be greater than 0".into(),
        }
        .into());
    }

    if train_dataset_size < batch_size {
        return Err(ValidationError::Field {
            field: "train_dataset_size".into(),
            message: format!(
                "must be at least batch_size ({}), got {}",
                batch_size, train_dataset_size
            ),
        }
        .into());
    }

    if test_dataset_size == 0 {
        return Err(ValidationError::Field {
            field: "test_dataset_size".into(),
            message: "must be greater than 0".into(),
        }
        .into());
    }

    Ok(())
}

/// Validate the learning-rate schedule `lr₀ / (1 + decay·epoch)`.
pub fn validate_learning_rate(learning_rate: f64, decay_rate: f64) -> Result<()> {
    if !(learning_rate.is_finite() && learning_rate > 0.0) {
        return Err(ValidationError::Field {
            field: "learning_rate".into(),
            message: format!("must be positive and finite, got {}", learning_rate),
        }
        .into());
    }

    if !(decay_rate.is_finite() && decay_rate >= 0.0) {
        return Err(ValidationError::Field {
            field: "decay_rate".into(),
            message: format!("must be non-negative and finite, got {}", decay_rate),
        }
        .into());
    }

    Ok(())
}

pub fn validate_momentum(momentum: f64) -> Result<()> {
    if !(0.0..1.0).contains(&momentum) {
        return Err(ValidationError::Field {
            field: "momentum".into(),
            message: format!("must be in [0, 1), got {}", momentum),
        }
        .into());
    }
    Ok(())
}

pub fn validate_adadelta(rho: f64, epsilon: f64) -> Result<()> {
    if !(rho > 0.0 && rho < 1.0) {
        return Err(ValidationError::Field {
            field: "rho".into(),
            message: format!("must be in (0, 1), got {}", rho),
        }
        .into());
    }
    if !(epsilon.is_finite() && epsilon > 0.0) {
        return Err(ValidationError::Field {
            field: "epsilon".into(),
            message: format!("must be positive, got {}", epsilon),
        }
        .into());
    }
    Ok(())
}
