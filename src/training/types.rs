// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Training configuration, state and run-log types.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::validation::{
    validate_adadelta, validate_dataset_sizes, validate_learning_rate, validate_momentum,
};

/// Fidelities closer to 1 than this count as converged, both for early
/// stopping and for log truncation.
pub const CONVERGENCE_EPS: f64 = 1e-10;

fn default_learning_rate() -> f64 {
    0.1
}

fn default_decay_rate() -> f64 {
    0.01
}

fn default_batch_size() -> usize {
    5
}

fn default_epochs() -> usize {
    50
}

fn default_train_dataset_size() -> usize {
    20
}

fn default_test_dataset_size() -> usize {
    10
}

fn default_true() -> bool {
    true
}

fn default_tolerance() -> f64 {
    CONVERGENCE_EPS
}

/// Hyperparameters of a training run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingConfig {
    /// Initial learning rate `lr₀`.
    #[serde(default = "default_learning_rate")]
    pub learning_rate: f64,
    /// After epoch `e` the learning rate becomes `lr₀ / (1 + decay_rate·e)`.
    #[serde(default = "default_decay_rate")]
    pub decay_rate: f64,
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    #[serde(default = "default_epochs")]
    pub epochs: usize,
    /// Training states drawn per epoch.
    #[serde(default = "default_train_dataset_size")]
    pub train_dataset_size: usize,
    /// Test states drawn per epoch.
    #[serde(default = "default_test_dataset_size")]
    pub test_dataset_size: usize,
    #[serde(default)]
    pub update_rule: UpdateRule,
    /// Record the parameter vector after every epoch.
    #[serde(default = "default_true")]
    pub save_parameters: bool,
    #[serde(default = "default_tolerance")]
    pub convergence_tolerance: f64,
    /// RNG seed; `None` seeds from entropy.
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            learning_rate: default_learning_rate(),
            decay_rate: default_decay_rate(),
            batch_size: default_batch_size(),
            epochs: default_epochs(),
            train_dataset_size: default_train_dataset_size(),
            test_dataset_size: default_test_dataset_size(),
            update_rule: UpdateRule::default(),
            save_parameters: true,
            convergence_tolerance: default_tolerance(),
            seed: None,
        }
    }
}

impl TrainingConfig {
    /// Validate configuration parameters.
    pub fn validate(&self) -> Result<()> {
        validate_learning_rate(self.learning_rate, self.decay_rate)?;
        validate_dataset_sizes(
            self.batch_size,
            self.train_dataset_size,
            self.test_dataset_size,
        )?;
        if self.epochs == 0 {
            return Err(crate::error::ValidationError::Field {
                field: "epochs".into(),
                message: "must be greater than 0".into(),
            }
            .into());
        }
        if !(self.convergence_tolerance > 0.0 && self.convergence_tolerance < 1.0) {
            return Err(crate::error::ValidationError::Field {
                field: "convergence_tolerance".into(),
                message: format!("must be in (0, 1), got {}", self.convergence_tolerance),
            }
            .into());
        }
        self.update_rule.validate()
    }

    /// Mini-batches per epoch; a trailing partial batch is dropped.
    pub fn batches_per_epoch(&self) -> usize {
        self.train_dataset_size / self.batch_size
    }

    /// Learning rate in effect after `epoch` (zero-based) completes.
    pub fn scheduled_learning_rate(&self, epoch: usize) -> f64 {
        self.learning_rate / (1.0 + self.decay_rate * epoch as f64)
    }
}

/// Parameter update rule. All rules ascend, the cost being a fidelity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpdateRule {
    /// `v ← μ·v + lr·g`, `p ← p + v`.
    Momentum { momentum: f64 },
    /// Adadelta with running averages of squared gradients and updates.
    /// Ignores the learning rate.
    Adadelta { rho: f64, epsilon: f64 },
    /// `p ← p + lr·g`.
    Plain,
}

impl Default for UpdateRule {
    fn default() -> Self {
        UpdateRule::Momentum { momentum: 0.5 }
    }
}

impl UpdateRule {
    /// Adadelta with `ρ = 0.95`, `ε = 1e-6`.
    pub fn adadelta() -> Self {
        UpdateRule::Adadelta {
            rho: 0.95,
            epsilon: 1e-6,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            UpdateRule::Momentum { .. } => "momentum",
            UpdateRule::Adadelta { .. } => "adadelta",
            UpdateRule::Plain => "plain",
        }
    }

    pub fn validate(&self) -> Result<()> {
        match *self {
            UpdateRule::Momentum { momentum } => validate_momentum(momentum),
            UpdateRule::Adadelta { rho, epsilon } => validate_adadelta(rho, epsilon),
            UpdateRule::Plain => Ok(()),
        }
    }
}

/// Trainer lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrainingState {
    Uninitialized,
    Compiled,
    Running,
    /// Test fidelity reached 1 within tolerance.
    Converged,
    /// Epoch budget used up.
    Exhausted,
    /// Stopped by an abort request.
    Interrupted,
}

impl TrainingState {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            TrainingState::Converged | TrainingState::Exhausted | TrainingState::Interrupted
        )
    }
}

/// Per-epoch history of a run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunLog {
    /// Mean test fidelity after each epoch.
    pub fidelities: Vec<f64>,
    /// Parameter vector after each epoch, when recorded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Vec<Vec<f64>>>,
    /// Learning rate used during each epoch.
    #[serde(default)]
    pub learning_rates: Vec<f64>,
}

impl RunLog {
    pub fn new(save_parameters: bool) -> Self {
        Self {
            fidelities: Vec::new(),
            parameters: save_parameters.then(Vec::new),
            learning_rates: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.fidelities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fidelities.is_empty()
    }

    pub fn push(&mut self, fidelity: f64, parameters: &[f64], learning_rate: f64) {
        self.fidelities.push(fidelity);
        if let Some(history) = self.parameters.as_mut() {
            history.push(parameters.to_vec());
        }
        self.learning_rates.push(learning_rate);
    }

    pub fn last_fidelity(&self) -> Option<f64> {
        self.fidelities.last().copied()
    }

    pub fn best_fidelity(&self) -> Option<f64> {
        self.fidelities.iter().copied().reduce(f64::max)
    }

    /// Number of leading epochs worth persisting.
    ///
    /// A trailing run of fidelities within `tolerance` of 1 is cut after
    /// its first entry. A
    /// trailing run of exact zeros (placeholders) is cut entirely. If the
    /// log has no transition into such a run, all of it is kept.
    pub fn meaningful_len(&self, tolerance: f64) -> usize {
        let fids = &self.fidelities;
        let near_one: Vec<bool> = fids.iter().map(|f| (1.0 - f).abs() < tolerance).collect();
        if near_one.last() == Some(&true) {
            if let Some(i) = last_transition(&near_one) {
                return i + 2;
            }
            return fids.len();
        }

        let zero: Vec<bool> = fids.iter().map(|&f| f == 0.0).collect();
        if zero.last() == Some(&true) {
            if let Some(i) = last_transition(&zero) {
                return i + 1;
            }
        }
        fids.len()
    }

    /// Copy of the log truncated to [`meaningful_len`](Self::meaningful_len).
    pub fn meaningful(&self, tolerance: f64) -> RunLog {
        let n = self.meaningful_len(tolerance);
        RunLog {
            fidelities: self.fidelities[..n].to_vec(),
            parameters: self
                .parameters
                .as_ref()
                .map(|p| p[..n.min(p.len())].to_vec()),
            learning_rates: self.learning_rates[..n.min(self.learning_rates.len())].to_vec(),
        }
    }
}

/// Last index `i` with `mask[i] != mask[i + 1]`.
fn last_transition(mask: &[bool]) -> Option<usize> {
    mask.windows(2).rposition(|w| w[0] != w[1])
}

/// Summary returned by a training run.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingOutcome {
    pub state: TrainingState,
    /// Epochs completed in this call.
    pub epochs_run: usize,
    pub final_fidelity: Option<f64>,
    pub best_fidelity: Option<f64>,
}

/// Read-only view of training progress handed to observers.
#[derive(Debug, Clone, Copy)]
pub struct ProgressSnapshot<'a> {
    pub epoch: usize,
    pub fidelities: &'a [f64],
    pub learning_rate: f64,
}

/// Receives a snapshot after every epoch. Failures are logged and ignored.
pub trait ProgressObserver {
    fn on_epoch(&mut self, snapshot: &ProgressSnapshot<'_>) -> Result<()>;
}

impl<F> ProgressObserver for F
where
    F: FnMut(&ProgressSnapshot<'_>) -> Result<()>,
{
    fn on_epoch(&mut self, snapshot: &ProgressSnapshot<'_>) -> Result<()> {
        self(snapshot)
    }
}

/// Cooperative abort flag, checked at epoch boundaries.
#[derive(Debug, Clone, Default)]
pub struct AbortHandle(Arc<AtomicBool>);

impl AbortHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn abort(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_aborted(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    pub(crate) fn reset(&self) {
        self.0.store(false, Ordering::SeqCst);
    }
}
