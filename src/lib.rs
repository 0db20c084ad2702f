// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! QubitOS qubit-network trainer
//!
//! Learns the coupling strengths of a fixed-topology qubit network so that
//! its time evolution `U = exp(-iH)` implements a target gate on a subset of
//! system qubits, with the remaining qubits acting as ancillae that are
//! traced out.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │          Trainer (training)              │
//! ├──────────────────┬──────────────────────┤
//! │  dataset         │  fidelity            │
//! │  (Haar kets)     │  (partial trace)     │
//! ├──────────────────┴──────────────────────┤
//! │  QubitNetwork: basis, H(J), exp(H)       │
//! ├─────────────────────────────────────────┤
//! │  bigreal encoding │ linalg (expm)        │
//! └─────────────────────────────────────────┘
//! ```
//!
//! Complex quantities are carried in the real "big-real" encoding: a ket
//! `v` becomes `[Re v; Im v]` and an operator `A + iB` becomes
//! `[[A, -B], [B, A]]`, so the whole forward pass is real linear algebra.
//!
//! # Modules
//!
//! - [`config`]: Configuration management
//! - [`network`]: Interaction basis, Hamiltonian and target gates
//! - [`fidelity`]: Partial trace and fidelity evaluation
//! - [`dataset`]: Training and test data generation
//! - [`training`]: Optimizer, run log and checkpoints
//! - [`validation`]: Input validation utilities
//! - [`error`]: Error types

pub mod bigreal;
pub mod config;
pub mod dataset;
pub mod error;
pub mod fidelity;
pub mod linalg;
pub mod network;
pub mod training;
pub mod validation;

pub use config::Config;
pub use error::{Error, Result};
pub use network::QubitNetwork;
pub use training::{Checkpoint, Trainer, TrainingConfig};

#[cfg(test)]
pub mod test_utils;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
