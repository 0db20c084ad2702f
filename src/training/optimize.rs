// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Training loop for qubit networks.
//!
//! One epoch: draw fresh training and test sets, take one update step per
//! mini-batch, then log the mean test fidelity. The gradient of the mean
//! batch fidelity with respect to `J` is computed in reverse mode through
//! the matrix exponential (see [`cost_and_gradient`]).

use ndarray::{s, Array1, Array2, ArrayView2};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info, trace, warn};

use super::types::{
    AbortHandle, ProgressObserver, ProgressSnapshot, RunLog, TrainingConfig, TrainingOutcome,
    TrainingState,
};
use super::update::UpdateState;
use crate::dataset::{self, TrainingBatch};
use crate::error::{Error, Result};
use crate::fidelity::{ancillae_for, fidelity_gradient, mean_fidelity};
use crate::linalg::{expm_frechet_adjoint, matrix_exp};
use crate::network::{InitialValues, QubitNetwork};
use crate::validation::validate_parameters;

/// Mean fidelity of a batch and its gradient with respect to `parameters`.
///
/// With `A = Σ J_i B_i`, `U = exp(A)` and `φ_k = U ψ_k`:
///
/// 1. `g_k = ∂F(φ_k, t_k)/∂φ_k`
/// 2. `G = (1/N) Σ_k g_k ψ_kᵀ`, the gradient with respect to `U`
/// 3. `∂cost/∂J_i = ⟨B_i, L(Aᵀ, G)⟩`, `L` the Fréchet derivative of `exp`
pub fn cost_and_gradient(
    network: &QubitNetwork,
    parameters: &Array1<f64>,
    inputs: ArrayView2<'_, f64>,
    targets: ArrayView2<'_, f64>,
) -> Result<(f64, Array1<f64>)> {
    let n = inputs.nrows();
    if n == 0 || targets.nrows() != n {
        return Err(Error::Config(format!(
            "batch has {} inputs and {} targets",
            n,
            targets.nrows()
        )));
    }
    let num_ancillae = ancillae_for(inputs.ncols(), targets.ncols())?;

    let generator = network.hamiltonian(parameters)?;
    let evolution = matrix_exp(&generator)?;
    let outputs = inputs.dot(&evolution.t());

    let mut cost = 0.0;
    let mut output_grads = Array2::zeros(outputs.raw_dim());
    for (k, (output, target)) in outputs.outer_iter().zip(targets.outer_iter()).enumerate() {
        let (f, g) = fidelity_gradient(output, target, num_ancillae)?;
        cost += f;
        output_grads.row_mut(k).assign(&g);
    }
    let scale = 1.0 / n as f64;
    cost *= scale;

    let grad_u = output_grads.t().dot(&inputs) * scale;
    let pullback = expm_frechet_adjoint(&generator, &grad_u)?;
    let grad: Array1<f64> = network
        .basis()
        .iter()
        .map(|b| (b * &pullback).sum())
        .collect();

    if !cost.is_finite() || grad.iter().any(|g| !g.is_finite()) {
        return Err(Error::Numerical("non-finite cost or gradient".into()));
    }
    Ok((cost, grad))
}

/// Owns the parameter vector and drives training of one network.
pub struct Trainer {
    network: QubitNetwork,
    config: TrainingConfig,
    parameters: Array1<f64>,
    initial_parameters: Array1<f64>,
    update: Option<UpdateState>,
    learning_rate: f64,
    state: TrainingState,
    log: RunLog,
    rng: StdRng,
    abort: AbortHandle,
}

impl Trainer {
    /// Create a trainer, drawing initial parameters from `init`.
    pub fn new(network: QubitNetwork, config: TrainingConfig, init: &InitialValues) -> Result<Self> {
        config.validate()?;
        let mut rng = make_rng(config.seed);
        let parameters = network.initial_parameters(init, &mut rng)?;
        let log = RunLog::new(config.save_parameters);
        Self::assemble(network, config, parameters, log, rng)
    }

    /// Create a trainer from an existing parameter vector and log, e.g. a
    /// loaded checkpoint.
    pub fn with_parameters(
        network: QubitNetwork,
        config: TrainingConfig,
        parameters: Array1<f64>,
        log: RunLog,
    ) -> Result<Self> {
        config.validate()?;
        let rng = make_rng(config.seed);
        Self::assemble(network, config, parameters, log, rng)
    }

    /// Carry over the starting parameters and final state of a saved run.
    ///
    /// Only terminal states survive; anything else restarts from
    /// `Uninitialized`, since update-rule accumulators are not saved.
    pub(crate) fn restore(
        mut self,
        initial_parameters: Array1<f64>,
        state: TrainingState,
    ) -> Result<Self> {
        validate_parameters(&initial_parameters.to_vec(), self.network.num_parameters())?;
        self.initial_parameters = initial_parameters;
        if state.is_terminal() {
            self.state = state;
        }
        Ok(self)
    }

    fn assemble(
        network: QubitNetwork,
        config: TrainingConfig,
        parameters: Array1<f64>,
        mut log: RunLog,
        rng: StdRng,
    ) -> Result<Self> {
        validate_parameters(&parameters.to_vec(), network.num_parameters())?;
        if log.parameters.is_none() && log.is_empty() && config.save_parameters {
            log.parameters = Some(Vec::new());
        }
        let learning_rate = log
            .len()
            .checked_sub(1)
            .map_or(config.learning_rate, |e| config.scheduled_learning_rate(e));
        Ok(Self {
            network,
            initial_parameters: parameters.clone(),
            parameters,
            update: None,
            learning_rate,
            state: TrainingState::Uninitialized,
            log,
            rng,
            config,
            abort: AbortHandle::new(),
        })
    }

    pub fn network(&self) -> &QubitNetwork {
        &self.network
    }

    pub fn config(&self) -> &TrainingConfig {
        &self.config
    }

    pub fn parameters(&self) -> &Array1<f64> {
        &self.parameters
    }

    /// Parameters the trainer started from.
    pub fn initial_parameters(&self) -> &Array1<f64> {
        &self.initial_parameters
    }

    pub fn state(&self) -> TrainingState {
        self.state
    }

    pub fn log(&self) -> &RunLog {
        &self.log
    }

    pub fn learning_rate(&self) -> f64 {
        self.learning_rate
    }

    /// Handle that stops the run at the next epoch boundary.
    pub fn abort_handle(&self) -> AbortHandle {
        self.abort.clone()
    }

    /// Check that the network can be trained and reset the update-rule
    /// accumulators. `Uninitialized → Compiled`.
    pub fn compile(&mut self) -> Result<()> {
        if self.state == TrainingState::Running {
            return Err(Error::Config("cannot compile while training is running".into()));
        }
        self.network.target()?.unitary()?;
        self.update = Some(UpdateState::new(
            self.config.update_rule,
            self.network.num_parameters(),
        ));
        self.state = TrainingState::Compiled;
        debug!(
            rule = self.config.update_rule.name(),
            num_parameters = self.network.num_parameters(),
            "Compiled trainer"
        );
        Ok(())
    }

    /// Mean fidelity of the current parameters on a fresh test set.
    pub fn test_fidelity(&mut self) -> Result<f64> {
        let batch = dataset::generate(&self.network, self.config.test_dataset_size, &mut self.rng)?;
        self.batch_fidelity(&batch)
    }

    fn batch_fidelity(&self, batch: &TrainingBatch) -> Result<f64> {
        let evolution = self.network.evolution(&self.parameters)?;
        let outputs = batch.inputs.dot(&evolution.t());
        mean_fidelity(outputs.view(), batch.outputs.view())
    }

    /// Train for `config.epochs` epochs or until converged or aborted.
    pub fn run(&mut self) -> Result<TrainingOutcome> {
        self.run_with_observer(&mut NoProgress)
    }

    /// As [`run`](Self::run), reporting progress after every epoch.
    ///
    /// Runs from a terminal state resume from the current parameters and
    /// append to the existing log.
    pub fn run_with_observer(
        &mut self,
        observer: &mut dyn ProgressObserver,
    ) -> Result<TrainingOutcome> {
        if self.state == TrainingState::Uninitialized || self.state.is_terminal() {
            self.compile()?;
        }
        self.state = TrainingState::Running;
        info!(
            epochs = self.config.epochs,
            rule = self.config.update_rule.name(),
            learning_rate = self.learning_rate,
            num_parameters = self.network.num_parameters(),
            "Starting training"
        );

        let mut epochs_run = 0;
        let mut final_state = TrainingState::Exhausted;
        for _ in 0..self.config.epochs {
            if self.abort.is_aborted() {
                self.abort.reset();
                final_state = TrainingState::Interrupted;
                info!(epochs_run, "Training interrupted");
                break;
            }

            let fidelity = match self.train_epoch() {
                Ok(f) => f,
                Err(e) => {
                    self.state = TrainingState::Compiled;
                    return Err(e);
                }
            };
            epochs_run += 1;
            let epoch = self.log.len() - 1;

            let snapshot = ProgressSnapshot {
                epoch,
                fidelities: &self.log.fidelities,
                learning_rate: self.learning_rate,
            };
            if let Err(e) = observer.on_epoch(&snapshot) {
                warn!(epoch, error = %e, "Progress observer failed");
            }

            if (1.0 - fidelity).abs() < self.config.convergence_tolerance {
                final_state = TrainingState::Converged;
                info!(epoch, fidelity, "Fidelity 1 reached, stopping");
                break;
            }

            self.learning_rate = self.config.scheduled_learning_rate(epoch);
        }

        // An abort raised during the last epoch is consumed here, not by the next run.
        if self.abort.is_aborted() {
            self.abort.reset();
            if final_state == TrainingState::Exhausted {
                final_state = TrainingState::Interrupted;
                info!(epochs_run, "Training interrupted");
            }
        }

        self.state = final_state;
        let outcome = TrainingOutcome {
            state: final_state,
            epochs_run,
            final_fidelity: self.log.last_fidelity(),
            best_fidelity: self.log.best_fidelity(),
        };
        info!(
            state = ?outcome.state,
            epochs_run,
            final_fidelity = ?outcome.final_fidelity,
            "Training finished"
        );
        Ok(outcome)
    }

    /// One epoch; returns the logged test fidelity.
    fn train_epoch(&mut self) -> Result<f64> {
        let train = dataset::generate(&self.network, self.config.train_dataset_size, &mut self.rng)?;
        let test = dataset::generate(&self.network, self.config.test_dataset_size, &mut self.rng)?;

        let batch_size = self.config.batch_size;
        for b in 0..self.config.batches_per_epoch() {
            let rows = s![b * batch_size..(b + 1) * batch_size, ..];
            let (cost, grad) = cost_and_gradient(
                &self.network,
                &self.parameters,
                train.inputs.slice(rows),
                train.outputs.slice(rows),
            )?;
            let update = self
                .update
                .as_mut()
                .ok_or_else(|| Error::Config("trainer has not been compiled".into()))?;
            update.apply(&mut self.parameters, &grad, self.learning_rate);
            trace!(batch = b, cost, "Applied update");
        }

        let fidelity = self.batch_fidelity(&test)?;
        let parameters = self.parameters.to_vec();
        self.log.push(fidelity, &parameters, self.learning_rate);
        debug!(
            epoch = self.log.len() - 1,
            fidelity,
            learning_rate = self.learning_rate,
            "Epoch complete"
        );
        Ok(fidelity)
    }
}

struct NoProgress;

impl ProgressObserver for NoProgress {
    fn on_epoch(&mut self, _snapshot: &ProgressSnapshot<'_>) -> Result<()> {
        Ok(())
    }
}

fn make_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}
