// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Gradient-ascent training of network parameters.
//!
//! The [`Trainer`] owns a network, its parameter vector and a run log. Each
//! epoch draws fresh training and test sets, steps through mini-batches with
//! the configured update rule, records the mean test fidelity and applies
//! the learning-rate schedule. Runs end converged, exhausted or interrupted.
//!
//! # Example
//!
//! ```no_run
//! use qubit_os_network::network::{InitialValues, QubitNetwork};
//! use qubit_os_network::network::gates::TargetSpec;
//! use qubit_os_network::training::{Trainer, TrainingConfig};
//!
//! let network = QubitNetwork::builder(2)
//!     .system_qubits(1)
//!     .target(TargetSpec::X)
//!     .build()?;
//! let mut trainer = Trainer::new(network, TrainingConfig::default(), &InitialValues::Random)?;
//! let outcome = trainer.run()?;
//! println!("{:?} after {} epochs", outcome.state, outcome.epochs_run);
//! # Ok::<(), qubit_os_network::Error>(())
//! ```

pub mod checkpoint;
pub mod optimize;
pub mod types;
pub mod update;

pub use checkpoint::{Checkpoint, CheckpointFormat};
pub use optimize::{cost_and_gradient, Trainer};
pub use types::{
    AbortHandle, ProgressObserver, ProgressSnapshot, RunLog, TrainingConfig, TrainingOutcome,
    TrainingState, UpdateRule,
};
