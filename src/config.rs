// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Configuration for training runs.
//!
//! Configuration is loaded from multiple sources with the following priority
//! (later sources override earlier ones):
//!
//! 1. Built-in defaults
//! 2. qnet.yaml file
//! 3. Environment variables (QNET_*)
//! 4. CLI arguments
//!
//! Enum-valued settings use the single-key map form in YAML:
//!
//! ```yaml
//! network:
//!   num_qubits: 3
//!   num_system_qubits: 2
//!   interactions:
//!     axes: [x, z, xx, zz]
//!   target: cnot
//! training:
//!   update_rule:
//!     momentum:
//!       momentum: 0.5
//! ```

use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;
use tracing::warn;

use crate::error::{Error, Result};
use crate::network::gates::TargetSpec;
use crate::network::interaction::InteractionSpec;
use crate::network::{AncillaState, InitialValues, QubitNetwork};
use crate::training::TrainingConfig;
use crate::validation::validate_network_shape;

/// Main configuration structure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Network layout and target
    #[serde(default, with = "serde_yaml::with::singleton_map_recursive")]
    pub network: NetworkConfig,

    /// Training hyperparameters
    #[serde(default, with = "serde_yaml::with::singleton_map_recursive")]
    pub training: TrainingConfig,

    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from file and environment.
    ///
    /// An explicit path must exist. Without one, the default locations are
    /// tried in order and built-in defaults are used if none is found.
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let mut config = Config::default();

        if let Some(path) = config_path {
            if !path.exists() {
                return Err(Error::Config(format!(
                    "config file {} does not exist",
                    path.display()
                )));
            }
            config = Self::from_yaml(&std::fs::read_to_string(path)?)?;
        } else {
            for path in &["qnet.yaml", "qnet.yml", "/etc/qubitos/qnet.yaml"] {
                let path = Path::new(path);
                if path.exists() {
                    config = Self::from_yaml(&std::fs::read_to_string(path)?)?;
                    break;
                }
            }
        }

        config.apply_env_overrides();

        Ok(config)
    }

    /// Parse a YAML document. Missing sections take their defaults.
    pub fn from_yaml(content: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(content)?)
    }

    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Apply environment variable overrides. Unparseable values are ignored.
    fn apply_env_overrides(&mut self) {
        if let Ok(val) = env::var("QNET_LOG_LEVEL") {
            self.logging.level = val;
        }
        if let Ok(val) = env::var("QNET_LOG_FORMAT") {
            self.logging.format = val;
        }
        if let Ok(val) = env::var("QNET_EPOCHS") {
            match val.parse() {
                Ok(epochs) => self.training.epochs = epochs,
                Err(_) => warn!(value = %val, "Ignoring invalid QNET_EPOCHS"),
            }
        }
        if let Ok(val) = env::var("QNET_LEARNING_RATE") {
            match val.parse() {
                Ok(lr) => self.training.learning_rate = lr,
                Err(_) => warn!(value = %val, "Ignoring invalid QNET_LEARNING_RATE"),
            }
        }
        if let Ok(val) = env::var("QNET_SEED") {
            match val.parse() {
                Ok(seed) => self.training.seed = Some(seed),
                Err(_) => warn!(value = %val, "Ignoring invalid QNET_SEED"),
            }
        }
    }

    /// Validate configuration.
    ///
    /// Checks shapes and hyperparameters only; interaction labels and
    /// target dimensions are checked when the network is built.
    pub fn validate(&self) -> Result<()> {
        validate_network_shape(self.network.num_qubits, self.network.num_system_qubits)?;
        self.training.validate()?;
        match self.logging.format.as_str() {
            "pretty" | "json" => {}
            other => {
                return Err(Error::Config(format!(
                    "log format must be 'pretty' or 'json', got '{}'",
                    other
                )));
            }
        }
        if self.network.target.is_none() {
            warn!("No target gate configured; training will fail until one is set");
        }
        Ok(())
    }
}

/// Network configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// Total qubits, system plus ancillae
    #[serde(default = "default_num_qubits")]
    pub num_qubits: usize,

    /// Qubits the target acts on
    #[serde(default = "default_num_system_qubits")]
    pub num_system_qubits: usize,

    #[serde(default)]
    pub interactions: InteractionSpec,

    #[serde(default)]
    pub target: Option<TargetSpec>,

    #[serde(default)]
    pub ancilla: AncillaState,

    #[serde(default)]
    pub initial_values: InitialValues,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            num_qubits: default_num_qubits(),
            num_system_qubits: default_num_system_qubits(),
            interactions: InteractionSpec::default(),
            target: Some(TargetSpec::Identity),
            ancilla: AncillaState::default(),
            initial_values: InitialValues::default(),
        }
    }
}

impl NetworkConfig {
    /// Build the described network.
    pub fn build(&self) -> Result<QubitNetwork> {
        QubitNetwork::builder(self.num_qubits)
            .system_qubits(self.num_system_qubits)
            .interactions(self.interactions.clone())
            .maybe_target(self.target.clone())
            .ancilla(self.ancilla.clone())
            .build()
    }
}

fn default_num_qubits() -> usize {
    2
}

fn default_num_system_qubits() -> usize {
    1
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level or filter directive (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format (json, pretty)
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String {
    "info".into()
}

fn default_log_format() -> String {
    "pretty".into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::interaction::{Axis, Interaction};
    use crate::training::UpdateRule;
    use std::io::Write as _;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.network.num_qubits, 2);
        assert_eq!(config.network.num_system_qubits, 1);
        assert_eq!(config.network.interactions, InteractionSpec::All);
        assert_eq!(config.network.target, Some(TargetSpec::Identity));
        assert_eq!(config.training.batch_size, 5);
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.format, "pretty");
    }

    #[test]
    fn test_config_validation() {
        let config = Config::default();
        assert!(config.validate().is_ok());

        let mut bad_config = Config::default();
        bad_config.training.batch_size = 0;
        assert!(bad_config.validate().is_err());

        let mut bad_config = Config::default();
        bad_config.network.num_system_qubits = 3;
        assert!(bad_config.validate().unwrap_err().is_configuration());
    }

    #[test]
    fn test_validate_log_format() {
        let mut config = Config::default();
        config.logging.format = "xml".into();
        let msg = format!("{}", config.validate().unwrap_err());
        assert!(msg.contains("log format"));

        config.logging.format = "json".into();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_update_rule() {
        let mut config = Config::default();
        config.training.update_rule = UpdateRule::Momentum { momentum: 1.0 };
        assert!(config.validate().is_err());

        config.training.update_rule = UpdateRule::Adadelta {
            rho: 0.9,
            epsilon: 0.0,
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_load_from_file() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            f,
            r#"
network:
  num_qubits: 3
  num_system_qubits: 2
  interactions:
    axes: [x, z, xx]
  target: cnot
  initial_values:
    constant: 0.25
training:
  batch_size: 4
  train_dataset_size: 16
  update_rule:
    adadelta:
      rho: 0.9
      epsilon: 1.0e-8
logging:
  format: json
"#
        )
        .unwrap();

        let config = Config::load(Some(f.path())).unwrap();
        assert_eq!(config.network.num_qubits, 3);
        assert_eq!(config.network.num_system_qubits, 2);
        assert_eq!(
            config.network.interactions,
            InteractionSpec::Axes(vec!["x".into(), "z".into(), "xx".into()])
        );
        assert_eq!(config.network.target, Some(TargetSpec::Cnot));
        assert_eq!(config.network.initial_values, InitialValues::Constant(0.25));
        assert_eq!(config.training.batch_size, 4);
        assert_eq!(config.training.train_dataset_size, 16);
        assert_eq!(
            config.training.update_rule,
            UpdateRule::Adadelta {
                rho: 0.9,
                epsilon: 1e-8
            }
        );
        assert_eq!(config.logging.format, "json");
        assert!(config.validate().is_ok());

        let network = config.network.build().unwrap();
        // 3·2 self terms + 3 pairs · 1 pair axis
        assert_eq!(network.num_parameters(), 9);
    }

    #[test]
    fn test_config_topology_and_unitary_target() {
        let yaml = r#"
network:
  num_qubits: 2
  num_system_qubits: 1
  interactions:
    topology:
      - interaction: J_0_z
        symbol: a
      - interaction: J_0_1_xx
        symbol: b
      - interaction: J_0_1_yy
        symbol: b
  target:
    unitary:
      - [[0.0, 0.0], [1.0, 0.0]]
      - [[1.0, 0.0], [0.0, 0.0]]
training:
  update_rule: plain
"#;
        let config = Config::from_yaml(yaml).unwrap();
        assert_eq!(config.training.update_rule, UpdateRule::Plain);
        assert_eq!(
            config.network.interactions,
            InteractionSpec::topology([
                (Interaction::single(0, Axis::Z), "a"),
                (Interaction::pair(0, 1, Axis::X, Axis::X), "b"),
                (Interaction::pair(0, 1, Axis::Y, Axis::Y), "b"),
            ])
        );
        let network = config.network.build().unwrap();
        assert_eq!(network.num_parameters(), 2);
        assert!(network.target().is_ok());
    }

    #[test]
    fn test_missing_sections_use_defaults() {
        let config = Config::from_yaml("logging:\n  level: debug\n").unwrap();
        assert_eq!(config.network, NetworkConfig::default());
        assert_eq!(config.training, TrainingConfig::default());
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_yaml_roundtrip() {
        let mut config = Config::default();
        config.network.interactions = InteractionSpec::List(vec![
            Interaction::single(0, Axis::X),
            Interaction::pair(0, 1, Axis::Z, Axis::Z),
        ]);
        config.training.update_rule = UpdateRule::adadelta();
        config.training.seed = Some(7);

        let yaml = config.to_yaml().unwrap();
        assert!(yaml.contains("adadelta"));
        let back = Config::from_yaml(&yaml).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn test_config_load_nonexistent_file() {
        let path = std::path::Path::new("/tmp/does_not_exist_qnet_test.yaml");
        let result = Config::load(Some(path));
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_config_load_invalid_yaml() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        writeln!(f, "{{{{not: valid: yaml::::").unwrap();

        let result = Config::load(Some(f.path()));
        assert!(matches!(result, Err(Error::Serialization(_))));
    }

    #[test]
    fn test_unknown_interaction_label_fails_at_build() {
        let yaml = r#"
network:
  interactions:
    list: [J_0_x, J_0_7_xx]
"#;
        let config = Config::from_yaml(yaml);
        // Labels are parsed eagerly; out-of-range qubits surface at build.
        match config {
            Ok(config) => assert!(config.network.build().is_err()),
            Err(e) => assert!(matches!(e, Error::Serialization(_))),
        }
    }

    #[test]
    fn test_custom_ancilla_is_unsupported() {
        let mut config = Config::default();
        config.network.ancilla = AncillaState::Custom(vec![[1.0, 0.0], [0.0, 0.0]]);
        assert!(matches!(
            config.network.build(),
            Err(Error::Unsupported(_))
        ));
    }

    #[test]
    fn test_env_override_log_level() {
        let mut config = Config::default();
        std::env::set_var("QNET_LOG_LEVEL", "debug");
        config.apply_env_overrides();
        assert_eq!(config.logging.level, "debug");
        std::env::remove_var("QNET_LOG_LEVEL");
    }

    #[test]
    fn test_env_override_log_format() {
        let mut config = Config::default();
        std::env::set_var("QNET_LOG_FORMAT", "json");
        config.apply_env_overrides();
        assert_eq!(config.logging.format, "json");
        std::env::remove_var("QNET_LOG_FORMAT");
    }

    #[test]
    fn test_env_override_epochs() {
        let mut config = Config::default();
        std::env::set_var("QNET_EPOCHS", "123");
        config.apply_env_overrides();
        assert_eq!(config.training.epochs, 123);

        // unparseable values keep the current setting
        std::env::set_var("QNET_EPOCHS", "many");
        config.apply_env_overrides();
        assert_eq!(config.training.epochs, 123);
        std::env::remove_var("QNET_EPOCHS");
    }

    #[test]
    fn test_env_override_learning_rate() {
        let mut config = Config::default();
        std::env::set_var("QNET_LEARNING_RATE", "0.025");
        config.apply_env_overrides();
        assert_eq!(config.training.learning_rate, 0.025);
        std::env::remove_var("QNET_LEARNING_RATE");
    }

    #[test]
    fn test_env_override_seed() {
        let mut config = Config::default();
        std::env::set_var("QNET_SEED", "42");
        config.apply_env_overrides();
        assert_eq!(config.training.seed, Some(42));
        std::env::remove_var("QNET_SEED");
    }
}
