// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Parametrized qubit networks.
//!
//! A [`QubitNetwork`] fixes everything about the model except the
//! parameter vector `J`: the qubit counts, the interaction symbols and
//! their big-real basis matrices, the ancilla state and the target gate.
//! The parameter vector itself is owned by the trainer and passed in by
//! reference.
//!
//! # Example
//!
//! ```
//! use qubit_os_network::network::{QubitNetwork, InitialValues};
//! use qubit_os_network::network::gates::TargetSpec;
//! use qubit_os_network::network::interaction::InteractionSpec;
//!
//! let net = QubitNetwork::builder(2)
//!     .system_qubits(1)
//!     .interactions(InteractionSpec::All)
//!     .target(TargetSpec::Identity)
//!     .build()
//!     .unwrap();
//!
//! // 6 self terms + 9 pair terms
//! assert_eq!(net.num_parameters(), 15);
//! let j = net
//!     .initial_parameters(&InitialValues::Constant(0.0), &mut rand::thread_rng())
//!     .unwrap();
//! assert_eq!(j.len(), 15);
//! ```

pub mod basis;
pub mod gates;
pub mod hamiltonian;
pub mod interaction;

use std::collections::BTreeMap;

use ndarray::{Array1, Array2};
use num_complex::Complex64;
use rand::Rng;
use rand_distr::{Distribution, StandardNormal};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::dataset::random_ket_haar;
use crate::error::{Error, Result, ValidationError};
use crate::fidelity::reduced_density_matrix;
use crate::validation::{validate_network_shape, validate_parameters};
use gates::{TargetGate, TargetSpec};
use interaction::{InteractionSpec, SymbolTable};

/// State the ancilla qubits are prepared in.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AncillaState {
    /// Every ancilla in |0⟩.
    #[default]
    Zero,
    /// Arbitrary ancilla ket as `[re, im]` amplitudes. Recognized, not
    /// implemented.
    Custom(Vec<[f64; 2]>),
}

/// How the parameter vector is initialized.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InitialValues {
    /// Independent standard-normal draws.
    #[default]
    Random,
    /// Same value for every parameter.
    Constant(f64),
    /// Explicit vector in symbol order.
    Vector(Vec<f64>),
    /// Values by symbol label; unspecified parameters start at zero.
    Labeled(BTreeMap<String, f64>),
}

/// One row of the exported parameter table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterEntry {
    pub label: String,
    /// Labels of the physical terms driven by this parameter.
    pub terms: Vec<String>,
    pub value: f64,
    /// Whether `value` carries the pair ×4 / self ×2 factor.
    pub renormalized: bool,
}

/// Builder for [`QubitNetwork`].
#[derive(Debug, Clone)]
pub struct NetworkBuilder {
    num_qubits: usize,
    num_system_qubits: Option<usize>,
    interactions: InteractionSpec,
    target: Option<TargetSpec>,
    ancilla: AncillaState,
}

impl NetworkBuilder {
    /// Number of system qubits (defaults to all of them).
    pub fn system_qubits(mut self, n: usize) -> Self {
        self.num_system_qubits = Some(n);
        self
    }

    pub fn interactions(mut self, spec: InteractionSpec) -> Self {
        self.interactions = spec;
        self
    }

    pub fn target(mut self, target: TargetSpec) -> Self {
        self.target = Some(target);
        self
    }

    pub fn maybe_target(mut self, target: Option<TargetSpec>) -> Self {
        self.target = target;
        self
    }

    pub fn ancilla(mut self, state: AncillaState) -> Self {
        self.ancilla = state;
        self
    }

    /// Validate the configuration and build the basis matrices.
    pub fn build(self) -> Result<QubitNetwork> {
        let num_system_qubits = self.num_system_qubits.unwrap_or(self.num_qubits);
        validate_network_shape(self.num_qubits, num_system_qubits)?;

        if let AncillaState::Custom(_) = self.ancilla {
            return Err(Error::Unsupported(
                "custom ancilla states are not implemented".into(),
            ));
        }

        let table = SymbolTable::build(&self.interactions, self.num_qubits)?;
        let basis = basis::build_basis(&table, self.num_qubits);
        let target = self
            .target
            .as_ref()
            .map(|spec| spec.resolve(num_system_qubits))
            .transpose()?;

        debug!(
            num_qubits = self.num_qubits,
            num_system_qubits,
            num_parameters = table.len(),
            has_target = target.is_some(),
            "Built qubit network"
        );

        Ok(QubitNetwork {
            num_qubits: self.num_qubits,
            num_system_qubits,
            interactions: self.interactions,
            target_spec: self.target,
            ancilla: self.ancilla,
            table,
            basis,
            target,
        })
    }
}

/// A qubit network: interaction symbols, fixed basis and target.
#[derive(Debug, Clone)]
pub struct QubitNetwork {
    num_qubits: usize,
    num_system_qubits: usize,
    interactions: InteractionSpec,
    target_spec: Option<TargetSpec>,
    ancilla: AncillaState,
    table: SymbolTable,
    basis: Vec<Array2<f64>>,
    target: Option<TargetGate>,
}

impl QubitNetwork {
    pub fn builder(num_qubits: usize) -> NetworkBuilder {
        NetworkBuilder {
            num_qubits,
            num_system_qubits: None,
            interactions: InteractionSpec::All,
            target: None,
            ancilla: AncillaState::Zero,
        }
    }

    pub fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    pub fn num_system_qubits(&self) -> usize {
        self.num_system_qubits
    }

    pub fn num_ancillae(&self) -> usize {
        self.num_qubits - self.num_system_qubits
    }

    pub fn num_parameters(&self) -> usize {
        self.table.len()
    }

    pub fn interactions(&self) -> &InteractionSpec {
        &self.interactions
    }

    pub fn target_spec(&self) -> Option<&TargetSpec> {
        self.target_spec.as_ref()
    }

    pub fn ancilla_state(&self) -> &AncillaState {
        &self.ancilla
    }

    pub fn symbols(&self) -> &SymbolTable {
        &self.table
    }

    /// Big-real basis matrices, one per parameter.
    pub fn basis(&self) -> &[Array2<f64>] {
        &self.basis
    }

    /// The target gate, or `MissingTarget`.
    pub fn target(&self) -> Result<&TargetGate> {
        self.target.as_ref().ok_or(Error::MissingTarget)
    }

    /// Label of parameter `index`.
    pub fn symbol(&self, index: usize) -> Option<&str> {
        self.table.symbols().get(index).map(String::as_str)
    }

    /// Index of the parameter labelled `label`.
    pub fn index_of(&self, label: &str) -> Result<usize> {
        self.table
            .index_of(label)
            .ok_or_else(|| ValidationError::UnknownLabel(label.to_string()).into())
    }

    /// Big-real generator `Σ J_k B_k`.
    pub fn hamiltonian(&self, parameters: &Array1<f64>) -> Result<Array2<f64>> {
        hamiltonian::assemble(parameters, &self.basis)
    }

    /// Big-real evolution operator `exp(Σ J_k B_k)`.
    pub fn evolution(&self, parameters: &Array1<f64>) -> Result<Array2<f64>> {
        hamiltonian::evolution_operator(&self.hamiltonian(parameters)?)
    }

    /// Complex Hamiltonian `Σ J_k P_k`.
    pub fn complex_hamiltonian(&self, parameters: &Array1<f64>) -> Result<Array2<Complex64>> {
        hamiltonian::complex_hamiltonian(parameters, &self.table, self.num_qubits)
    }

    /// Complex gate `exp(-i H)` realised by `parameters`.
    pub fn gate(&self, parameters: &Array1<f64>) -> Result<Array2<Complex64>> {
        hamiltonian::complex_gate(parameters, &self.table, self.num_qubits)
    }

    /// Ket of the ancilla register.
    pub fn ancilla_ket(&self) -> Array1<Complex64> {
        let mut ket = Array1::zeros(1usize << self.num_ancillae());
        ket[0] = Complex64::new(1.0, 0.0);
        ket
    }

    /// `system ⊗ ancilla`, with the ancillae as the least significant
    /// factors.
    pub fn pad_with_ancillae(&self, system: &Array1<Complex64>) -> Array1<Complex64> {
        let ancilla = self.ancilla_ket();
        let block = ancilla.len();
        Array1::from_shape_fn(system.len() * block, |k| system[k / block] * ancilla[k % block])
    }

    /// Initial parameter vector in symbol order.
    pub fn initial_parameters<R: Rng + ?Sized>(
        &self,
        init: &InitialValues,
        rng: &mut R,
    ) -> Result<Array1<f64>> {
        let n = self.num_parameters();
        let values: Array1<f64> = match init {
            InitialValues::Random => (0..n).map(|_| StandardNormal.sample(rng)).collect(),
            InitialValues::Constant(c) => Array1::from_elem(n, *c),
            InitialValues::Vector(v) => Array1::from(v.clone()),
            InitialValues::Labeled(map) => {
                let mut j = Array1::zeros(n);
                for (label, &value) in map {
                    j[self.index_of(label)?] = value;
                }
                j
            }
        };
        validate_parameters(values.as_slice().unwrap_or(&[]), n)?;
        Ok(values)
    }

    /// `(label, value)` rows for reporting.
    ///
    /// With `renormalize`, pair-term symbols are multiplied by 4 and
    /// self-term symbols by 2. A symbol that drives both kinds of term has
    /// no single factor; its value is reported unscaled with
    /// `renormalized: false`.
    pub fn parameter_table(
        &self,
        parameters: &Array1<f64>,
        renormalize: bool,
    ) -> Result<Vec<ParameterEntry>> {
        validate_parameters(&parameters.to_vec(), self.num_parameters())?;

        Ok(self
            .table
            .iter()
            .zip(parameters.iter())
            .map(|((label, terms), &value)| {
                let factor = if renormalize {
                    renormalization_factor(label, terms)
                } else {
                    None
                };
                ParameterEntry {
                    label: label.to_string(),
                    terms: terms.iter().map(|t| t.label()).collect(),
                    value: factor.map_or(value, |f| value * f),
                    renormalized: factor.is_some(),
                }
            })
            .collect())
    }

    /// Mean fidelity over `num_states` Haar-random inputs, evaluated with
    /// complex arithmetic and an explicit reduced density matrix.
    ///
    /// Independent of the big-real path used in training, so the two can
    /// be compared.
    pub fn fidelity_test<R: Rng + ?Sized>(
        &self,
        parameters: &Array1<f64>,
        num_states: usize,
        rng: &mut R,
    ) -> Result<f64> {
        let target = self.target()?;
        if num_states == 0 {
            return Err(ValidationError::Field {
                field: "num_states".into(),
                message: "must be greater than 0".into(),
            }
            .into());
        }
        let gate = self.gate(parameters)?;
        let system_dim = 1usize << self.num_system_qubits;

        let mut total = 0.0;
        for _ in 0..num_states {
            let input = random_ket_haar(system_dim, rng);
            let expected = target.apply(&input)?;
            let output = gate.dot(&self.pad_with_ancillae(&input));
            let rho = reduced_density_matrix(&output, self.num_ancillae());
            let overlap = expected.mapv(|z| z.conj()).dot(&rho.dot(&expected));
            total += overlap.re;
        }
        Ok(total / num_states as f64)
    }
}

fn renormalization_factor(label: &str, terms: &[interaction::Interaction]) -> Option<f64> {
    let pairs = terms.iter().filter(|t| t.arity() == 2).count();
    if pairs == terms.len() {
        Some(4.0)
    } else if pairs == 0 {
        Some(2.0)
    } else {
        warn!(
            symbol = label,
            pair_terms = pairs,
            self_terms = terms.len() - pairs,
            "Symbol mixes self and pair interactions, exporting unnormalized value"
        );
        None
    }
}
