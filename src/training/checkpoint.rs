// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Persisted training runs.
//!
//! A checkpoint holds everything needed to rebuild the network and resume
//! training: qubit counts, interactions, target, hyperparameters, the
//! parameter vector and the (truncated) run log. JSON and YAML files are
//! supported, chosen by extension.

use std::fs;
use std::path::Path;

use ndarray::Array1;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::optimize::Trainer;
use super::types::{RunLog, TrainingConfig, TrainingState};
use crate::error::{Error, Result, ValidationError};
use crate::network::gates::TargetSpec;
use crate::network::interaction::InteractionSpec;
use crate::network::{ParameterEntry, QubitNetwork};

/// Current checkpoint layout version.
pub const FORMAT_VERSION: u32 = 1;

/// On-disk encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckpointFormat {
    Json,
    Yaml,
}

impl CheckpointFormat {
    /// Format implied by the file extension.
    pub fn from_path(path: &Path) -> Result<Self> {
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Ok(CheckpointFormat::Json),
            Some("yaml") | Some("yml") => Ok(CheckpointFormat::Yaml),
            other => Err(Error::Unsupported(format!(
                "checkpoint format {:?} (use .json, .yaml or .yml)",
                other.unwrap_or("")
            ))),
        }
    }
}

/// Serializable record of a training run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Checkpoint {
    pub version: u32,
    pub num_qubits: usize,
    pub num_system_qubits: usize,
    #[serde(with = "serde_yaml::with::singleton_map_recursive")]
    pub interactions: InteractionSpec,
    #[serde(default, with = "serde_yaml::with::singleton_map_recursive")]
    pub target: Option<TargetSpec>,
    /// Symbol labels in parameter order.
    pub symbols: Vec<String>,
    pub parameters: Vec<f64>,
    pub initial_parameters: Vec<f64>,
    #[serde(with = "serde_yaml::with::singleton_map_recursive")]
    pub hyperparameters: TrainingConfig,
    pub state: TrainingState,
    pub log: RunLog,
}

impl Checkpoint {
    /// Snapshot a trainer, truncating its log.
    pub fn from_trainer(trainer: &Trainer) -> Self {
        let network = trainer.network();
        Self {
            version: FORMAT_VERSION,
            num_qubits: network.num_qubits(),
            num_system_qubits: network.num_system_qubits(),
            interactions: network.interactions().clone(),
            target: network.target_spec().cloned(),
            symbols: network.symbols().symbols().to_vec(),
            parameters: trainer.parameters().to_vec(),
            initial_parameters: trainer.initial_parameters().to_vec(),
            hyperparameters: trainer.config().clone(),
            state: trainer.state(),
            log: trainer
                .log()
                .meaningful(trainer.config().convergence_tolerance),
        }
    }

    /// Rebuild the network described by this checkpoint.
    pub fn network(&self) -> Result<QubitNetwork> {
        let network = QubitNetwork::builder(self.num_qubits)
            .system_qubits(self.num_system_qubits)
            .interactions(self.interactions.clone())
            .maybe_target(self.target.clone())
            .build()?;

        if network.symbols().symbols() != self.symbols.as_slice() {
            return Err(Error::Config(format!(
                "checkpoint symbols {:?} do not match the rebuilt network {:?}",
                self.symbols,
                network.symbols().symbols()
            )));
        }
        if self.parameters.len() != network.num_parameters() {
            return Err(ValidationError::DimensionMismatch {
                what: "checkpoint parameters".into(),
                expected: network.num_parameters(),
                actual: self.parameters.len(),
            }
            .into());
        }
        Ok(network)
    }

    /// Trainer holding the saved parameters and log, ready to resume.
    pub fn into_trainer(self) -> Result<Trainer> {
        let network = self.network()?;
        Trainer::with_parameters(
            network,
            self.hyperparameters,
            Array1::from(self.parameters),
            self.log,
        )?
        .restore(Array1::from(self.initial_parameters), self.state)
    }

    /// Parameter table of the saved parameters.
    pub fn parameter_table(&self, renormalize: bool) -> Result<Vec<ParameterEntry>> {
        self.network()?
            .parameter_table(&Array1::from(self.parameters.clone()), renormalize)
    }

    pub fn to_string_as(&self, format: CheckpointFormat) -> Result<String> {
        Ok(match format {
            CheckpointFormat::Json => serde_json::to_string_pretty(self)?,
            CheckpointFormat::Yaml => serde_yaml::to_string(self)?,
        })
    }

    pub fn from_str_as(content: &str, format: CheckpointFormat) -> Result<Self> {
        let checkpoint: Checkpoint = match format {
            CheckpointFormat::Json => serde_json::from_str(content)?,
            CheckpointFormat::Yaml => serde_yaml::from_str(content)?,
        };
        if checkpoint.version != FORMAT_VERSION {
            return Err(Error::Unsupported(format!(
                "checkpoint version {} (expected {})",
                checkpoint.version, FORMAT_VERSION
            )));
        }
        Ok(checkpoint)
    }

    /// Write to `path`; the extension selects the format.
    pub fn save(&self, path: &Path) -> Result<()> {
        let format = CheckpointFormat::from_path(path)?;
        fs::write(path, self.to_string_as(format)?)?;
        info!(
            path = %path.display(),
            epochs = self.log.len(),
            "Saved checkpoint"
        );
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self> {
        let format = CheckpointFormat::from_path(path)?;
        let content = fs::read_to_string(path)?;
        Self::from_str_as(&content, format)
    }
}

impl Trainer {
    /// Save a checkpoint of this run.
    pub fn save(&self, path: &Path) -> Result<()> {
        Checkpoint::from_trainer(self).save(path)
    }

    /// Load a checkpoint and rebuild its trainer.
    pub fn load(path: &Path) -> Result<Self> {
        Checkpoint::load(path)?.into_trainer()
    }
}
