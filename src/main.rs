// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! QubitOS qubit-network trainer CLI
//!
//! # Usage
//!
//! ```bash
//! # Train with a configuration file and save the run
//! qubit-os-qnet train --config qnet.yaml --output run.json
//!
//! # Continue a saved run
//! qubit-os-qnet train --resume run.json --output run.json
//!
//! # Show the learned parameters of a saved run
//! qubit-os-qnet inspect run.json --renormalize
//!
//! # Show effective configuration
//! qubit-os-qnet config
//! ```
//!
//! Ctrl-C stops training at the next epoch boundary; the partial run is
//! still saved.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use qubit_os_network::training::{
    Checkpoint, ProgressSnapshot, Trainer, TrainingConfig, TrainingState,
};
use qubit_os_network::{config::Config, Result, VERSION};

/// QubitOS qubit-network trainer
#[derive(Parser)]
#[command(name = "qubit-os-qnet")]
#[command(author = "QubitOS Contributors")]
#[command(version = VERSION)]
#[command(about = "Train qubit-network Hamiltonians to implement target gates")]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error); overrides the config file
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Train a network
    Train {
        /// Number of epochs
        #[arg(long, env = "QNET_EPOCHS")]
        epochs: Option<usize>,

        /// RNG seed
        #[arg(long, env = "QNET_SEED")]
        seed: Option<u64>,

        /// Resume from a saved checkpoint instead of the configured network
        #[arg(long)]
        resume: Option<PathBuf>,

        /// Checkpoint file to write (.json, .yaml or .yml)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print the parameters and fidelity of a saved checkpoint
    Inspect {
        /// Checkpoint file
        checkpoint: PathBuf,

        /// Report pair couplings ×4 and self couplings ×2
        #[arg(long)]
        renormalize: bool,
    },

    /// Show effective configuration
    Config,

    /// Validate configuration file
    Validate,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(level) = cli.log_level {
        config.logging.level = level;
    }

    init_logging(&config.logging.level, &config.logging.format);

    match cli.command {
        Commands::Train {
            epochs,
            seed,
            resume,
            output,
        } => {
            apply_overrides(&mut config.training, epochs, seed);

            let mut trainer = match resume {
                Some(path) => {
                    info!(path = %path.display(), "Resuming from checkpoint");
                    let mut checkpoint = Checkpoint::load(&path)?;
                    apply_overrides(&mut checkpoint.hyperparameters, epochs, seed);
                    checkpoint.into_trainer()?
                }
                None => {
                    config.validate()?;
                    let network = config.network.build()?;
                    Trainer::new(
                        network,
                        config.training.clone(),
                        &config.network.initial_values,
                    )?
                }
            };

            let abort = trainer.abort_handle();
            if let Err(e) = ctrlc::set_handler(move || abort.abort()) {
                warn!(error = %e, "Failed to install Ctrl-C handler");
            }

            info!(
                version = VERSION,
                num_qubits = trainer.network().num_qubits(),
                num_system_qubits = trainer.network().num_system_qubits(),
                num_parameters = trainer.network().num_parameters(),
                "Training qubit network"
            );

            let mut report = |snapshot: &ProgressSnapshot<'_>| -> Result<()> {
                if let Some(fidelity) = snapshot.fidelities.last() {
                    println!(
                        "epoch {:>5}  fidelity {:.8}  lr {:.6}",
                        snapshot.epoch, fidelity, snapshot.learning_rate
                    );
                }
                Ok(())
            };
            let outcome = trainer.run_with_observer(&mut report)?;

            match outcome.state {
                TrainingState::Converged => println!("Converged after {} epochs", outcome.epochs_run),
                TrainingState::Interrupted => println!("Interrupted after {} epochs", outcome.epochs_run),
                _ => println!("Finished {} epochs", outcome.epochs_run),
            }
            if let Some(best) = outcome.best_fidelity {
                println!("Best test fidelity: {:.8}", best);
            }

            if let Some(path) = output {
                trainer.save(&path)?;
                println!("Saved run to {}", path.display());
            }
        }

        Commands::Inspect {
            checkpoint,
            renormalize,
        } => {
            let checkpoint = Checkpoint::load(&checkpoint)?;
            print_checkpoint(&checkpoint, renormalize)?;
        }

        Commands::Config => {
            // Show effective configuration
            println!("{}", config.to_yaml()?);
        }

        Commands::Validate => {
            let result = config.validate().and_then(|()| config.network.build().map(|_| ()));
            match result {
                Ok(()) => {
                    println!("Configuration is valid");
                }
                Err(e) => {
                    eprintln!("Configuration error: {}", e);
                    std::process::exit(1);
                }
            }
        }
    }

    Ok(())
}

/// Apply `train` flags on top of configured or checkpointed hyperparameters.
fn apply_overrides(training: &mut TrainingConfig, epochs: Option<usize>, seed: Option<u64>) {
    if let Some(epochs) = epochs {
        training.epochs = epochs;
    }
    if let Some(seed) = seed {
        training.seed = Some(seed);
    }
}

/// Initialize logging with tracing.
fn init_logging(level: &str, format: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let registry = tracing_subscriber::registry().with(filter);

    if format == "json" {
        registry.with(fmt::layer().json().with_target(true)).init();
    } else {
        registry.with(fmt::layer().with_target(true)).init();
    }
}

fn print_checkpoint(checkpoint: &Checkpoint, renormalize: bool) -> Result<()> {
    println!(
        "{} qubits ({} system), {} parameters, state {:?}",
        checkpoint.num_qubits,
        checkpoint.num_system_qubits,
        checkpoint.parameters.len(),
        checkpoint.state
    );
    println!(
        "update rule {}, {} logged epochs",
        checkpoint.hyperparameters.update_rule.name(),
        checkpoint.log.len()
    );
    match checkpoint.log.last_fidelity() {
        Some(fidelity) => println!("final test fidelity {:.8}", fidelity),
        None => println!("final test fidelity n/a"),
    }
    println!();

    let table = checkpoint.parameter_table(renormalize)?;
    let width = table.iter().map(|e| e.label.len()).max().unwrap_or(0);
    for entry in &table {
        let flag = if renormalize && !entry.renormalized {
            "  (not renormalized)"
        } else {
            ""
        };
        println!(
            "{:<width$}  {:>14.8}  {}{}",
            entry.label,
            entry.value,
            entry.terms.join(", "),
            flag,
            width = width
        );
    }
    Ok(())
}
